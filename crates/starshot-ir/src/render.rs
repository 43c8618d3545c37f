//! Surface-syntax rendering.
//!
//! `Display` for every tree node prints source that parses back to the same
//! tree, so `parse(&program.to_string())` is the identity on parsed programs.

use std::fmt::{self, Display, Formatter, Write};

use crate::ast::{
    Contract, Definition, Effect, Expr, Graph, Literal, MatchArm, Operator, Param, Pattern, Prim,
    Program, TypeDef, TypeExpr,
};
use crate::builtins::Builtin;

/// Form heads that cannot be used as the short `(f args)` call spelling.
const KEYWORDS: &[&str] = &[
    "let", "if", "match", "lambda", "pipe", "do", "call", "list", "record", "get", "set", "some",
    "none", "try", "error",
];

fn needs_call_keyword(func: &str) -> bool {
    KEYWORDS.contains(&func) || Operator::from_symbol(func).is_some() || Builtin::from_name(func).is_some()
}

/// Writes `items` separated by single spaces, each preceded by one space.
fn spaced<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for item in items {
        write!(f, " {item}")?;
    }
    Ok(())
}

fn write_string(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl Display for Prim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Prim(prim) => write!(f, "{prim}"),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::List(elem) => write!(f, "(List {elem})"),
            TypeExpr::Option(elem) => write!(f, "(Option {elem})"),
            TypeExpr::Tuple(elems) => {
                f.write_str("(Tuple")?;
                spaced(f, elems)?;
                f.write_char(')')
            }
            TypeExpr::Record(fields) => {
                f.write_str("(Record")?;
                for (name, ty) in fields {
                    write!(f, " ({name} {ty})")?;
                }
                f.write_char(')')
            }
            TypeExpr::Function(param, ret) => write!(f, "(-> {param} {ret})"),
            TypeExpr::Enum(variants) => {
                f.write_str("(Enum")?;
                for (name, payload) in variants {
                    write!(f, " ({name}")?;
                    spaced(f, payload)?;
                    f.write_char(')')?;
                }
                f.write_char(')')
            }
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => {
                let text = x.to_string();
                if text.contains('.') {
                    f.write_str(&text)
                } else {
                    write!(f, "{text}.0")
                }
            }
            Literal::Str(s) => write_string(f, s),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Unit => f.write_str("unit"),
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Wildcard => f.write_char('_'),
            Pattern::Literal(lit) => write!(f, "{lit}"),
            Pattern::Bind(name) => f.write_str(name),
            Pattern::Constructor(name, subs) => {
                write!(f, "({name}")?;
                spaced(f, subs)?;
                f.write_char(')')
            }
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "({} {ty})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Display for MatchArm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.pattern, self.body)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Lit(lit) => write!(f, "{lit}"),
            Expr::Ident(name) => f.write_str(name),
            Expr::Let { name, value, body } => write!(f, "(let {name} {value} {body})"),
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "(if {cond} {then_branch} {else_branch})"),
            Expr::Match { target, arms } => {
                write!(f, "(match {target}")?;
                spaced(f, arms)?;
                f.write_char(')')
            }
            Expr::Lambda { params, body } => {
                f.write_str("(lambda (")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") {body})")
            }
            Expr::Pipe { value, steps } => {
                write!(f, "(pipe {value}")?;
                spaced(f, steps)?;
                f.write_char(')')
            }
            Expr::Do(items) => {
                f.write_str("(do")?;
                spaced(f, items)?;
                f.write_char(')')
            }
            Expr::Op { op, args } => {
                write!(f, "({op}")?;
                spaced(f, args)?;
                f.write_char(')')
            }
            Expr::Call { func, args } => {
                if needs_call_keyword(func) {
                    write!(f, "(call {func}")?;
                } else {
                    write!(f, "({func}")?;
                }
                spaced(f, args)?;
                f.write_char(')')
            }
            Expr::List(items) => {
                f.write_str("(list")?;
                spaced(f, items)?;
                f.write_char(')')
            }
            Expr::Record { type_name, fields } => {
                write!(f, "(record {type_name}")?;
                for (name, value) in fields {
                    write!(f, " ({name} {value})")?;
                }
                f.write_char(')')
            }
            Expr::Get { object, field } => write!(f, "(get {object} {field})"),
            Expr::Set {
                object,
                field,
                value,
            } => write!(f, "(set {object} {field} {value})"),
            Expr::Builtin { builtin, args } => {
                write!(f, "({builtin}")?;
                spaced(f, args)?;
                f.write_char(')')
            }
            Expr::Some(value) => write!(f, "(some {value})"),
            Expr::None => f.write_str("none"),
            Expr::Try {
                body,
                catch_var,
                handler,
            } => write!(f, "(try {body} (catch {catch_var} {handler}))"),
            Expr::Error(message) => write!(f, "(error {message})"),
        }
    }
}

impl Display for Contract {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(contract")?;
        for pre in &self.preconditions {
            write!(f, " (pre {pre})")?;
        }
        for post in &self.postconditions {
            write!(f, " (post {post})")?;
        }
        f.write_char(')')
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "(graph {}", self.name)?;
        f.write_str("    (input")?;
        for (name, ty) in &self.inputs {
            write!(f, " ({name} {ty})")?;
        }
        writeln!(f, ")")?;
        writeln!(f, "    (output {})", self.output)?;
        f.write_str("    (effect")?;
        for effect in &self.effects {
            write!(f, " {effect}")?;
        }
        writeln!(f, ")")?;
        if let Some(contract) = &self.contract {
            writeln!(f, "    {contract}")?;
        }
        write!(f, "    (body {}))", self.body)
    }
}

impl Display for TypeDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(type {} {})", self.name, self.type_expr)
    }
}

impl Display for Definition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Type(def) => write!(f, "{def}"),
            Definition::Graph(graph) => write!(f, "{graph}"),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("(program")?;
        for def in &self.definitions {
            // Indent every line of the definition by two spaces.
            let text = def.to_string();
            for line in text.lines() {
                write!(f, "\n  {line}")?;
            }
        }
        f.write_char(')')
    }
}
