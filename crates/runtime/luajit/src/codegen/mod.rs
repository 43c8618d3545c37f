//! Program to Lua code generation.

mod bool;
mod list;
mod math;
mod obj;
mod opt;
mod prelude;
mod std;
mod str;
mod writer;

use ::std::collections::{HashMap, HashSet};

use starshot_check::{TypeEnv, Typer};
use starshot_ir::{
    Builtin, Definition, Expr, Graph, Literal, Operator, Param, Prim, Program, TypeDef, TypeExpr,
};
use thiserror::Error;
use tracing::debug;

use self::std::Tail;
use self::writer::LuaWriter;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid argument count for {builtin}: expected {expected}, got {got}")]
    InvalidArgCount {
        builtin: &'static str,
        expected: String,
        got: usize,
    },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Lua reserved keywords that need escaping.
const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Convert a surface name to a safe Lua identifier.
///
/// Names starting with `__` belong to the runtime prelude and compiler
/// temporaries, so user names of that shape are prefixed. Distinct names
/// may map to the same identifier; [`Locals`] keeps them apart.
pub(crate) fn to_lua_name(name: &str) -> String {
    // Replace invalid characters with _
    let mut safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if safe.is_empty() || safe.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        safe = format!("_{safe}");
    }
    if safe.starts_with("__") {
        return format!("S{safe}");
    }
    if LUA_KEYWORDS.contains(&safe.as_str()) {
        format!("_{safe}")
    } else {
        safe
    }
}

/// Surface names to Lua locals, one to one across a chunk.
///
/// The first name to claim an identifier keeps it; later names that mangle
/// the same way get a numeric suffix.
#[derive(Debug, Default)]
pub(crate) struct Locals {
    names: HashMap<String, String>,
    taken: HashSet<String>,
}

impl Locals {
    pub fn get(&mut self, name: &str) -> String {
        if let Some(local) = self.names.get(name) {
            return local.clone();
        }
        let base = to_lua_name(name);
        let mut local = base.clone();
        let mut n = 1;
        while self.taken.contains(&local) {
            n += 1;
            local = format!("{base}_{n}");
        }
        self.taken.insert(local.clone());
        self.names.insert(name.to_string(), local.clone());
        local
    }
}

pub(crate) fn lua_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => out.push_str(&format!("\\{}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "(0/0)".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "(1/0)" } else { "(-1/0)" }.to_string()
    } else if f.is_sign_negative() {
        format!("({f:?})")
    } else {
        format!("{f:?}")
    }
}

pub(crate) fn literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(n) if *n < 0 => format!("({n})"),
        Literal::Int(n) => n.to_string(),
        Literal::Float(f) => float_literal(*f),
        Literal::Str(s) => lua_string_literal(s),
        Literal::Bool(b) => b.to_string(),
        Literal::Unit => "nil".to_string(),
    }
}

fn graph_ref(name: &str) -> String {
    format!("__graphs[{}]", lua_string_literal(name))
}

fn type_ref(name: &str) -> String {
    format!("__types[{}]", lua_string_literal(name))
}

fn variant_ref(name: &str) -> String {
    format!("__variants[{}]", lua_string_literal(name))
}

/// One lowered argument plus what the lowering rules need to know about its
/// source form.
#[derive(Debug, Clone)]
pub(crate) struct Arg {
    pub code: String,
    pub lambda: bool,
    /// Inferred type with aliases resolved.
    pub ty: Option<TypeExpr>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Args(Vec<Arg>);

impl Args {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn code(&self, i: usize) -> &str {
        self.0.get(i).map_or("nil", |a| a.code.as_str())
    }

    pub fn ty(&self, i: usize) -> Option<&TypeExpr> {
        self.0.get(i).and_then(|a| a.ty.as_ref())
    }

    pub fn is_lambda(&self, i: usize) -> bool {
        self.0.get(i).is_some_and(|a| a.lambda)
    }

    pub fn is_float(&self, i: usize) -> bool {
        self.ty(i).is_some_and(|ty| ty.is_prim(Prim::Float))
    }

    /// `Some(true)` for a known list, `Some(false)` for a known non-list.
    pub fn is_list(&self, i: usize) -> Option<bool> {
        self.ty(i).map(|ty| matches!(ty, TypeExpr::List(_)))
    }

    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(|a| a.code.as_str()).collect()
    }

    pub fn joined(&self) -> String {
        self.codes().join(", ")
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeExpr> {
        self.0.iter().filter_map(|a| a.ty.as_ref())
    }

    /// Rewrites every argument's code, keeping what is known about it.
    pub fn map_codes(mut self, mut f: impl FnMut(&Arg) -> String) -> Self {
        for arg in &mut self.0 {
            arg.code = f(arg);
        }
        self
    }

    /// Adds the value a pipe threads into this step.
    ///
    /// A step holding exactly one lambda, in first position, receives the
    /// value last; every other step receives it first.
    fn threaded(mut self, arg: Arg) -> Self {
        let lambdas: Vec<usize> = (0..self.len()).filter(|&i| self.is_lambda(i)).collect();
        if lambdas == [0] {
            self.0.push(arg);
        } else {
            self.0.insert(0, arg);
        }
        self
    }
}

/// `name(arg, ...)` over every argument.
pub(crate) fn helper(name: &str, args: &Args) -> String {
    format!("{name}({})", args.joined())
}

fn expected_arity(min: usize, max: usize) -> String {
    if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {min}")
    } else {
        format!("{min} to {max}")
    }
}

/// Lowers one builtin application. Every builtin has exactly one rule here.
fn lower_builtin(builtin: Builtin, args: &Args) -> Result<String, CompileError> {
    let (min, max) = builtin.arity();
    if args.len() < min || args.len() > max {
        return Err(CompileError::InvalidArgCount {
            builtin: builtin.name(),
            expected: expected_arity(min, max),
            got: args.len(),
        });
    }

    use Builtin::*;
    Ok(match builtin {
        Not => bool::not(args),
        Map => list::map(args),
        Filter => list::filter(args),
        Reduce => list::reduce(args),
        SortBy => list::sort_by(args),
        FlatMap => list::flat_map(args),
        Any => list::quantifier("__any", args),
        All => list::quantifier("__all", args),
        Head | First => list::element(args, 1),
        Second => list::element(args, 2),
        Last => format!("__nth({}, -1)", args.code(0)),
        Nth | ListGet => helper("__nth", args),
        Builtin::Tail => helper("__tail", args),
        Cons => helper("__cons", args),
        Append => helper("__append", args),
        Range => helper("__range", args),
        IsEmpty => format!("(__len({}) == 0)", args.code(0)),
        Length => helper("__len", args),
        Reverse => helper("__reverse", args),
        Contains => helper("__contains", args),
        Take => helper("__take", args),
        Drop => helper("__drop", args),
        Slice => helper("__slice", args),
        IndexOf => helper("__index_of", args),
        Sum => helper("__sum", args),
        Product => helper("__product", args),
        Zip => helper("__zip", args),
        Enumerate => helper("__enumerate", args),
        Tuple => list::literal(&args.codes()),
        Concat => str::concat(&str::show_floats(args)),
        Format => str::format(&str::show_floats(args)),
        Substr => helper("__slice", args),
        Split => helper("__split", args),
        Join => helper("__join", args),
        ToString | IntToString => str::to_string(args),
        ToLower => helper("__lower", args),
        ToUpper => helper("__upper", args),
        StringLength => str::length(args),
        CharAt => str::char_at(args),
        StartsWith => helper("__starts_with", args),
        EndsWith => helper("__ends_with", args),
        StringContains => helper("__contains", args),
        StringReplace => helper("__replace", args),
        StringTrim => helper("__trim", args),
        Abs => helper("__abs", args),
        Min => helper("__min", args),
        Max => helper("__max", args),
        ToInt => helper("__to_int", args),
        ToFloat => helper("__to_float", args),
        Print => helper("__print", &str::show_floats(args)),
        ReadLine => "__read_line()".to_string(),
        IsSome => opt::is_some(args),
        Unwrap => helper("__unwrap", args),
        MapOpt => opt::map_opt(args),
        OrElse => helper("__or_else", args),
        Dict => obj::dict(args)?,
        Keys => helper("__keys", args),
        Values => helper("__values", args),
        HasKey => obj::has_key(args),
        GetOr => helper("__get_or", args),
    })
}

/// Lowers a program into one Lua chunk whose value is the table of graphs.
pub(crate) struct Emitter<'p> {
    typer: Typer<'p>,
    out: LuaWriter,
    locals: Locals,
    temps: usize,
}

impl<'p> Emitter<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            typer: Typer::new(program),
            out: LuaWriter::new(),
            locals: Locals::default(),
            temps: 0,
        }
    }

    fn out(&mut self, line: impl AsRef<str>) {
        self.out.line(line);
    }

    fn indented<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        self.out.indent();
        let result = f(self);
        self.out.dedent();
        result
    }

    /// Runs `f` against a fresh inline writer and returns what it wrote.
    fn capture(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), CompileError>,
    ) -> Result<String, CompileError> {
        let outer = ::std::mem::replace(&mut self.out, LuaWriter::inline());
        let result = f(self);
        let inner = ::std::mem::replace(&mut self.out, outer);
        result.map(|()| inner.finish())
    }

    /// A compiler temporary, unique within the chunk.
    fn temp(&mut self, stem: &str) -> String {
        self.temps += 1;
        format!("__{stem}{}", self.temps)
    }

    /// The Lua local for a surface variable name.
    pub(crate) fn local(&mut self, name: &str) -> String {
        self.locals.get(name)
    }

    /// Inferred type of `expr` with aliases resolved.
    fn resolved(&self, expr: &Expr, env: &TypeEnv) -> Option<TypeExpr> {
        self.typer.infer(expr, env).map(|ty| self.typer.resolve(&ty))
    }

    fn program(&mut self, program: &Program) -> Result<(), CompileError> {
        for line in prelude::PRELUDE.lines() {
            self.out(line);
        }
        self.out("");

        // The checker resolves names to their first definition; so does the chunk.
        let mut types = HashSet::new();
        let mut variants = HashSet::new();
        let mut graphs = HashSet::new();
        for def in &program.definitions {
            match def {
                Definition::Type(def) => {
                    if types.insert(def.name.as_str()) {
                        self.type_def(def, &mut variants);
                    }
                }
                Definition::Graph(graph) => {
                    if graphs.insert(graph.name.as_str()) {
                        self.graph(graph)?;
                    }
                }
            }
        }

        self.out("return __graphs");
        Ok(())
    }

    fn type_def<'d>(&mut self, def: &'d TypeDef, variants: &mut HashSet<&'d str>) {
        let name = type_ref(&def.name);
        match &def.type_expr {
            TypeExpr::Record(_) => {
                self.out(format!("{name} = __record({})", lua_string_literal(&def.name)));
            }
            TypeExpr::Enum(members) => {
                self.out(format!("{name} = __enum({})", lua_string_literal(&def.name)));
                for (variant, payload) in members {
                    if !variants.insert(variant.as_str()) {
                        continue;
                    }
                    self.out(format!(
                        "{} = __variant({name}, {}, {})",
                        variant_ref(variant),
                        lua_string_literal(variant),
                        payload.len()
                    ));
                }
            }
            // Aliases only exist for the checker.
            _ => {}
        }
    }

    fn graph(&mut self, graph: &Graph) -> Result<(), CompileError> {
        let params: Vec<String> = graph.inputs.iter().map(|(name, _)| self.local(name)).collect();
        let env = self.typer.graph_env(graph);
        self.out(format!(
            "{} = function({})",
            graph_ref(&graph.name),
            params.join(", ")
        ));
        self.indented(|this| {
            for pre in graph.preconditions() {
                let cond = this.expr(pre, &env)?;
                this.out(format!("__assert({cond}, \"precondition failed\")"));
            }

            let posts = graph.postconditions();
            if posts.is_empty() {
                return this.stmts(&graph.body, &env, Tail::Return);
            }

            this.out("local __result");
            this.stmts(&graph.body, &env, Tail::Assign("__result"))?;
            let result = this.local("result");
            this.out(format!("local {result} = __result"));
            let post_env = env.bind("result", Some(graph.output.clone()));
            for post in posts {
                let cond = this.expr(post, &post_env)?;
                this.out(format!("__assert({cond}, \"postcondition failed\")"));
            }
            this.out(format!("return {result}"));
            Ok(())
        })?;
        self.out("end");
        self.out("");
        Ok(())
    }

    /// `function(params) ... end` with `body` as its return value.
    fn function(&mut self, params: &str, body: &Expr, env: &TypeEnv) -> Result<String, CompileError> {
        self.capture(|this| {
            this.out(format!("function({params})"));
            this.indented(|this| this.stmts(body, env, Tail::Return))?;
            this.out("end");
            Ok(())
        })
    }

    /// A statement form used as a value: an immediately-invoked function.
    fn iife(&mut self, expr: &Expr, env: &TypeEnv) -> Result<String, CompileError> {
        Ok(format!("({})()", self.function("", expr, env)?))
    }

    fn exprs(&mut self, exprs: &[Expr], env: &TypeEnv) -> Result<Vec<String>, CompileError> {
        exprs.iter().map(|e| self.expr(e, env)).collect()
    }

    fn arg(&mut self, expr: &Expr, env: &TypeEnv) -> Result<Arg, CompileError> {
        Ok(Arg {
            code: self.expr(expr, env)?,
            lambda: expr.is_lambda(),
            ty: self.resolved(expr, env),
        })
    }

    fn args(&mut self, exprs: &[Expr], env: &TypeEnv) -> Result<Args, CompileError> {
        let mut args = Vec::with_capacity(exprs.len());
        for e in exprs {
            args.push(self.arg(e, env)?);
        }
        Ok(Args(args))
    }

    /// Arguments of a builtin, plus the value a pipe threads into it.
    ///
    /// Unannotated lambda parameters take their types from the data
    /// arguments the builtin passes them, so arithmetic inside the lambda
    /// sees the element type.
    fn builtin_args(
        &mut self,
        builtin: Builtin,
        exprs: &[Expr],
        env: &TypeEnv,
        piped: Option<Arg>,
    ) -> Result<Args, CompileError> {
        let mut shape = Args(
            exprs
                .iter()
                .map(|e| Arg {
                    code: String::new(),
                    lambda: e.is_lambda(),
                    ty: if e.is_lambda() { None } else { self.resolved(e, env) },
                })
                .collect(),
        );
        if let Some(piped) = &piped {
            shape = shape.threaded(piped.clone());
        }
        let hints = self.lambda_hints(builtin, &shape);

        let mut args = Vec::with_capacity(exprs.len() + 1);
        for e in exprs {
            args.push(match e {
                Expr::Lambda { params, body } => Arg {
                    code: self.lambda(params, body, env, &hints)?,
                    lambda: true,
                    ty: None,
                },
                other => self.arg(other, env)?,
            });
        }
        let args = Args(args);
        Ok(match piped {
            Some(piped) => args.threaded(piped),
            None => args,
        })
    }

    /// Parameter types a builtin gives the function it applies.
    fn lambda_hints(&self, builtin: Builtin, shape: &Args) -> Vec<Option<TypeExpr>> {
        use Builtin::*;
        match builtin {
            Map | Filter | SortBy | FlatMap | Any | All => {
                let (_, xs) = list::fn_and_list(shape);
                vec![self.element(shape.ty(xs))]
            }
            Reduce if shape.len() == 2 => {
                let (_, xs) = list::fn_and_list(shape);
                let elem = self.element(shape.ty(xs));
                vec![elem.clone(), elem]
            }
            Reduce => {
                let layout = list::reduce_layout(shape);
                vec![shape.ty(layout.init).cloned(), self.element(shape.ty(layout.xs))]
            }
            MapOpt => {
                let (_, value) = list::fn_and_list(shape);
                let inner = match shape.ty(value) {
                    Some(TypeExpr::Option(inner)) => Some(self.typer.resolve(inner)),
                    _ => None,
                };
                vec![inner]
            }
            _ => Vec::new(),
        }
    }

    fn element(&self, ty: Option<&TypeExpr>) -> Option<TypeExpr> {
        match ty {
            Some(TypeExpr::List(elem)) => Some(self.typer.resolve(elem)),
            _ => None,
        }
    }

    pub(crate) fn expr(&mut self, expr: &Expr, env: &TypeEnv) -> Result<String, CompileError> {
        match expr {
            Expr::Lit(lit) => Ok(literal(lit)),
            Expr::Ident(name) => Ok(self.ident(name, env)),
            Expr::Do(items) if items.len() == 1 => self.expr(&items[0], env),
            Expr::Let { .. } | Expr::Do(_) | Expr::If { .. } | Expr::Match { .. } | Expr::Try { .. } => {
                self.iife(expr, env)
            }
            Expr::Lambda { params, body } => self.lambda(params, body, env, &[]),
            Expr::Pipe { value, steps } => self.pipe(value, steps, env),
            Expr::Op { op, args } => {
                let args = self.args(args, env)?;
                self.op(*op, &args)
            }
            Expr::Call { func, args } => {
                let args = self.args(args, env)?;
                self.call(func, &args, env)
            }
            Expr::List(items) => {
                let items = self.exprs(items, env)?;
                Ok(list::literal(&items))
            }
            Expr::Record { type_name, fields } => self.record(type_name, fields, env),
            Expr::Get { object, field } => {
                let object = self.expr(object, env)?;
                Ok(obj::get(&object, field))
            }
            Expr::Set {
                object,
                field,
                value,
            } => {
                let object = self.expr(object, env)?;
                let value = self.expr(value, env)?;
                Ok(obj::set(&object, field, &value))
            }
            Expr::Builtin { builtin, args } => {
                let args = self.builtin_args(*builtin, args, env, None)?;
                lower_builtin(*builtin, &args)
            }
            Expr::Some(inner) => self.expr(inner, env),
            Expr::None => Ok("nil".to_string()),
            Expr::Error(message) => Ok(format!("__raise({})", self.expr(message, env)?)),
        }
    }

    fn ident(&mut self, name: &str, env: &TypeEnv) -> String {
        if env.contains(name) {
            return self.local(name);
        }
        if self.typer.graph(name).is_some() {
            return graph_ref(name);
        }
        match self.typer.variant(name) {
            Some(variant) if variant.payload.is_empty() => format!("{}()", variant_ref(name)),
            Some(_) => variant_ref(name),
            None => self.local(name),
        }
    }

    fn lambda(
        &mut self,
        params: &[Param],
        body: &Expr,
        env: &TypeEnv,
        hints: &[Option<TypeExpr>],
    ) -> Result<String, CompileError> {
        let names: Vec<String> = params.iter().map(|p| self.local(&p.name)).collect();
        let inner = params.iter().enumerate().fold(env.clone(), |env, (i, p)| {
            let ty = p.ty.clone().or_else(|| hints.get(i).cloned().flatten());
            env.bind(p.name.clone(), ty)
        });
        self.function(&names.join(", "), body, &inner)
    }

    fn pipe(&mut self, value: &Expr, steps: &[Expr], env: &TypeEnv) -> Result<String, CompileError> {
        let mut acc = self.arg(value, env)?;
        for step in steps {
            let code = match step {
                Expr::Builtin { builtin, args } => {
                    let args = self.builtin_args(*builtin, args, env, Some(acc.clone()))?;
                    lower_builtin(*builtin, &args)?
                }
                Expr::Call { func, args } => {
                    let args = self.args(args, env)?.threaded(acc.clone());
                    self.call(func, &args, env)?
                }
                Expr::Op { op, args } => {
                    let args = self.args(args, env)?.threaded(acc.clone());
                    self.op(*op, &args)?
                }
                other => format!("({})({})", self.expr(other, env)?, acc.code),
            };
            // Steps that keep the shape of their input keep its type.
            let ty = match step {
                Expr::Builtin {
                    builtin:
                        Builtin::Filter
                        | Builtin::SortBy
                        | Builtin::Reverse
                        | Builtin::Take
                        | Builtin::Drop
                        | Builtin::Tail
                        | Builtin::Slice,
                    ..
                } => acc.ty.take(),
                _ => None,
            };
            acc = Arg {
                code,
                lambda: false,
                ty,
            };
        }
        Ok(acc.code)
    }

    fn op(&mut self, op: Operator, args: &Args) -> Result<String, CompileError> {
        if args.len() == 0 {
            return Err(CompileError::InvalidArguments(format!(
                "operator '{}' needs operands",
                op.symbol()
            )));
        }
        if op.is_arithmetic() {
            let float = args.types().any(|ty| ty.is_prim(Prim::Float));
            Ok(math::arithmetic(op, args, float))
        } else if op.is_comparison() {
            let codes = args.codes();
            let repeated = codes.len() > 2
                && !codes[1..codes.len() - 1].iter().all(|c| bool::is_simple(c));
            if repeated {
                let temps: Vec<String> = codes.iter().map(|_| self.temp("c")).collect();
                Ok(bool::chained(op, &codes, &temps))
            } else {
                Ok(bool::comparison(op, args))
            }
        } else {
            Ok(bool::logical(op, args))
        }
    }

    /// A named call. Locals, graphs and variant constructors win over
    /// builtin and operator spellings, which `(call ...)` may also name.
    fn call(&mut self, func: &str, args: &Args, env: &TypeEnv) -> Result<String, CompileError> {
        if env.contains(func) {
            return Ok(helper(&self.local(func), args));
        }
        if self.typer.graph(func).is_some() {
            return Ok(helper(&graph_ref(func), args));
        }
        if self.typer.variant(func).is_some() {
            return Ok(helper(&variant_ref(func), args));
        }
        if let Some(builtin) = Builtin::from_name(func) {
            return lower_builtin(builtin, args);
        }
        if let Some(op) = Operator::from_symbol(func) {
            return self.op(op, args);
        }
        Ok(helper(&self.local(func), args))
    }

    fn record(
        &mut self,
        type_name: &str,
        fields: &[(String, Expr)],
        env: &TypeEnv,
    ) -> Result<String, CompileError> {
        let mut lowered = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            lowered.push((name.as_str(), self.expr(value, env)?));
        }
        Ok(obj::record(&type_ref(type_name), &lowered))
    }
}

/// Compile a program to a Lua chunk.
///
/// The chunk evaluates to a table mapping each graph's surface name to its
/// function. Output depends only on `program`, and the number of top-level
/// locals is the same for every program.
pub fn compile(program: &Program) -> Result<String, CompileError> {
    let mut emitter = Emitter::new(program);
    emitter.program(program)?;
    let code = emitter.out.finish();
    debug!(bytes = code.len(), "emitted lua chunk");
    Ok(code)
}
