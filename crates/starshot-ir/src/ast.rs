//! Syntax tree for Starshot programs.
//!
//! The tree is plain data: it is built once by the parser and only read by
//! the checking passes and the emitters.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::builtins::Builtin;

/// Primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Prim {
    Int,
    Float,
    String,
    Bool,
    Unit,
}

impl Prim {
    pub fn from_name(name: &str) -> Option<Prim> {
        match name {
            "Int" => Some(Prim::Int),
            "Float" => Some(Prim::Float),
            "String" => Some(Prim::String),
            "Bool" => Some(Prim::Bool),
            "Unit" => Some(Prim::Unit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Prim::Int => "Int",
            Prim::Float => "Float",
            Prim::String => "String",
            Prim::Bool => "Bool",
            Prim::Unit => "Unit",
        }
    }
}

/// Type expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeExpr {
    Prim(Prim),
    List(Box<TypeExpr>),
    Option(Box<TypeExpr>),
    /// At least two elements.
    Tuple(Vec<TypeExpr>),
    /// Fields in declaration order.
    Record(Vec<(String, TypeExpr)>),
    Function(Box<TypeExpr>, Box<TypeExpr>),
    /// Variants in declaration order, each with its positional payload types.
    Enum(Vec<(String, Vec<TypeExpr>)>),
    /// Reference to a `type` definition, resolved by the checker.
    Named(String),
}

impl TypeExpr {
    pub const INT: TypeExpr = TypeExpr::Prim(Prim::Int);
    pub const FLOAT: TypeExpr = TypeExpr::Prim(Prim::Float);
    pub const STRING: TypeExpr = TypeExpr::Prim(Prim::String);
    pub const BOOL: TypeExpr = TypeExpr::Prim(Prim::Bool);
    pub const UNIT: TypeExpr = TypeExpr::Prim(Prim::Unit);

    pub fn list(elem: TypeExpr) -> TypeExpr {
        TypeExpr::List(Box::new(elem))
    }

    pub fn option(elem: TypeExpr) -> TypeExpr {
        TypeExpr::Option(Box::new(elem))
    }

    pub fn function(param: TypeExpr, ret: TypeExpr) -> TypeExpr {
        TypeExpr::Function(Box::new(param), Box::new(ret))
    }

    pub fn named(name: impl Into<String>) -> TypeExpr {
        TypeExpr::Named(name.into())
    }

    pub fn is_prim(&self, prim: Prim) -> bool {
        matches!(self, TypeExpr::Prim(p) if *p == prim)
    }
}

/// Literal values, shared by expressions and patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Unit,
}

impl Literal {
    pub fn type_expr(&self) -> TypeExpr {
        match self {
            Literal::Int(_) => TypeExpr::INT,
            Literal::Float(_) => TypeExpr::FLOAT,
            Literal::Str(_) => TypeExpr::STRING,
            Literal::Bool(_) => TypeExpr::BOOL,
            Literal::Unit => TypeExpr::UNIT,
        }
    }
}

/// Match arm patterns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Pattern {
    Wildcard,
    Literal(Literal),
    Bind(String),
    Constructor(String, Vec<Pattern>),
}

impl Pattern {
    /// Wildcard and bind patterns match anything.
    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Wildcard | Pattern::Bind(_))
    }

    /// Names bound by this pattern, left to right.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Bind(name) => out.push(name),
            Pattern::Constructor(_, subs) => {
                for sub in subs {
                    sub.collect_names(out);
                }
            }
            Pattern::Wildcard | Pattern::Literal(_) => {}
        }
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
        Operator::Le,
        Operator::Ge,
        Operator::And,
        Operator::Or,
    ];

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

/// A lambda parameter, optionally annotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub body: Expr,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Lit(Literal),
    Ident(String),
    /// Always has a body; body-less lets inside `do` are threaded by the parser.
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Arms are tried in order; the first match wins.
    Match {
        target: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },
    /// `value` is threaded left to right through `steps`.
    Pipe {
        value: Box<Expr>,
        steps: Vec<Expr>,
    },
    Do(Vec<Expr>),
    Op {
        op: Operator,
        args: Vec<Expr>,
    },
    /// Call of a named graph (or a variant constructor).
    Call {
        func: String,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
    Record {
        type_name: String,
        fields: Vec<(String, Expr)>,
    },
    Get {
        object: Box<Expr>,
        field: String,
    },
    /// Functional update: a copy of `object` with `field` replaced.
    Set {
        object: Box<Expr>,
        field: String,
        value: Box<Expr>,
    },
    Builtin {
        builtin: Builtin,
        args: Vec<Expr>,
    },
    Some(Box<Expr>),
    None,
    Try {
        body: Box<Expr>,
        catch_var: String,
        handler: Box<Expr>,
    },
    Error(Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Expr {
        Expr::Lit(Literal::Int(n))
    }

    pub fn string(s: impl Into<String>) -> Expr {
        Expr::Lit(Literal::Str(s.into()))
    }

    pub fn bool(b: bool) -> Expr {
        Expr::Lit(Literal::Bool(b))
    }

    pub fn unit() -> Expr {
        Expr::Lit(Literal::Unit)
    }

    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn op(op: Operator, args: Vec<Expr>) -> Expr {
        Expr::Op { op, args }
    }

    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: func.into(),
            args,
        }
    }

    pub fn builtin(builtin: Builtin, args: Vec<Expr>) -> Expr {
        Expr::Builtin { builtin, args }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Expr::Lambda { .. })
    }
}

/// Capabilities a graph may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Pure,
    Io,
    Fail,
}

impl Effect {
    pub fn from_name(name: &str) -> Option<Effect> {
        match name {
            "pure" => Some(Effect::Pure),
            "io" => Some(Effect::Io),
            "fail" => Some(Effect::Fail),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::Pure => "pure",
            Effect::Io => "io",
            Effect::Fail => "fail",
        }
    }
}

/// Runtime-checked pre/postconditions of a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contract {
    pub preconditions: Vec<Expr>,
    pub postconditions: Vec<Expr>,
}

/// A named, typed, effect-annotated function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub name: String,
    pub inputs: Vec<(String, TypeExpr)>,
    pub output: TypeExpr,
    pub effects: BTreeSet<Effect>,
    pub contract: Option<Contract>,
    pub body: Expr,
}

impl Graph {
    pub fn is_pure(&self) -> bool {
        self.effects.len() == 1 && self.effects.contains(&Effect::Pure)
    }

    pub fn postconditions(&self) -> &[Expr] {
        self.contract
            .as_ref()
            .map(|c| c.postconditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn preconditions(&self) -> &[Expr] {
        self.contract
            .as_ref()
            .map(|c| c.preconditions.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub type_expr: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    Type(TypeDef),
    Graph(Graph),
}

/// A whole source unit. Definition order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub definitions: Vec<Definition>,
}

impl Program {
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Graph(g) => Some(g),
            Definition::Type(_) => None,
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Type(t) => Some(t),
            Definition::Graph(_) => None,
        })
    }

    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.graphs().find(|g| g.name == name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types().find(|t| t.name == name)
    }
}
