//! Lenient type inference and checking.
//!
//! Inference returns `None` whenever a type is underdetermined (lambdas,
//! pipes, `error`, branches that disagree); such values are accepted
//! anywhere. The goal is to catch the obvious mistakes, not to prove
//! programs well-typed.

use std::collections::{HashMap, HashSet};

use starshot_ir::{Builtin, Expr, Graph, Operator, Pattern, Prim, Program, TypeExpr};

use crate::env::TypeEnv;

/// A variant constructor of a named enum.
#[derive(Debug, Clone, Copy)]
pub struct Variant<'p> {
    pub enum_name: &'p str,
    pub payload: &'p [TypeExpr],
}

/// Signature tables for a program plus the inference engine over them.
pub struct Typer<'p> {
    types: HashMap<&'p str, &'p TypeExpr>,
    graphs: HashMap<&'p str, &'p Graph>,
    variants: HashMap<&'p str, Variant<'p>>,
}

impl<'p> Typer<'p> {
    pub fn new(program: &'p Program) -> Self {
        let mut types = HashMap::new();
        let mut variants = HashMap::new();
        for def in program.types() {
            types.entry(def.name.as_str()).or_insert(&def.type_expr);
            if let TypeExpr::Enum(members) = &def.type_expr {
                for (name, payload) in members {
                    variants.entry(name.as_str()).or_insert(Variant {
                        enum_name: &def.name,
                        payload,
                    });
                }
            }
        }
        let mut graphs = HashMap::new();
        for graph in program.graphs() {
            graphs.entry(graph.name.as_str()).or_insert(graph);
        }
        Self {
            types,
            graphs,
            variants,
        }
    }

    pub fn graph(&self, name: &str) -> Option<&'p Graph> {
        self.graphs.get(name).copied()
    }

    pub fn variant(&self, name: &str) -> Option<Variant<'p>> {
        self.variants.get(name).copied()
    }

    pub fn type_def(&self, name: &str) -> Option<&'p TypeExpr> {
        self.types.get(name).copied()
    }

    /// Environment holding a graph's inputs.
    pub fn graph_env(&self, graph: &Graph) -> TypeEnv {
        TypeEnv::from_bindings(graph.inputs.iter().map(|(name, ty)| (name.as_str(), Some(ty))))
    }

    /// Follows aliases. Named records and enums are nominal and stay named.
    pub fn resolve(&self, ty: &TypeExpr) -> TypeExpr {
        let mut current = ty.clone();
        // Bounded so that alias cycles terminate.
        for _ in 0..=self.types.len() {
            let TypeExpr::Named(name) = &current else {
                break;
            };
            match self.types.get(name.as_str()) {
                Some(TypeExpr::Record(_) | TypeExpr::Enum(_)) | None => break,
                Some(def) => current = (*def).clone(),
            }
        }
        current
    }

    /// Fields of a record type, named or anonymous.
    pub fn record_fields(&self, ty: &TypeExpr) -> Option<Vec<(String, TypeExpr)>> {
        match self.resolve(ty) {
            TypeExpr::Record(fields) => Some(fields),
            TypeExpr::Named(name) => match self.types.get(name.as_str()) {
                Some(TypeExpr::Record(fields)) => Some(fields.clone()),
                _ => None,
            },
            _ => None,
        }
    }

    fn enum_name(&self, ty: &TypeExpr) -> Option<String> {
        match self.resolve(ty) {
            TypeExpr::Named(name) if matches!(self.types.get(name.as_str()), Some(TypeExpr::Enum(_))) => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Whether a value of type `actual` may be used where `expected` is required.
    pub fn compatible(&self, actual: &TypeExpr, expected: &TypeExpr) -> bool {
        let actual = self.resolve(actual);
        let expected = self.resolve(expected);
        match (&actual, &expected) {
            (TypeExpr::Prim(Prim::Int), TypeExpr::Prim(Prim::Float)) => true,
            (TypeExpr::Prim(a), TypeExpr::Prim(b)) => a == b,
            (TypeExpr::Named(a), TypeExpr::Named(b)) => a == b,
            (TypeExpr::List(a), TypeExpr::List(b)) | (TypeExpr::Option(a), TypeExpr::Option(b)) => {
                self.compatible(a, b)
            }
            (TypeExpr::Tuple(a), TypeExpr::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.compatible(x, y))
            }
            (TypeExpr::Record(a), TypeExpr::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((an, at), (bn, bt))| an == bn && self.compatible(at, bt))
            }
            (TypeExpr::Function(ap, ar), TypeExpr::Function(bp, br)) => {
                self.compatible(ap, bp) && self.compatible(ar, br)
            }
            (TypeExpr::Enum(a), TypeExpr::Enum(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((an, ap), (bn, bp))| {
                        an == bn
                            && ap.len() == bp.len()
                            && ap.iter().zip(bp).all(|(x, y)| self.compatible(x, y))
                    })
            }
            _ => false,
        }
    }

    /// The common type of two branches; unknown on either side defers to the other.
    fn join(&self, a: Option<TypeExpr>, b: Option<TypeExpr>) -> Option<TypeExpr> {
        match (a, b) {
            (Some(a), Some(b)) => {
                if self.compatible(&a, &b) {
                    Some(b)
                } else if self.compatible(&b, &a) {
                    Some(a)
                } else {
                    None
                }
            }
            (Some(t), None) | (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }

    /// Infer the type of `expr` without reporting anything.
    pub fn infer(&self, expr: &Expr, env: &TypeEnv) -> Option<TypeExpr> {
        Walker {
            typer: self,
            graph: "",
            sink: None,
        }
        .expr(expr, env)
    }

    /// Names bound by `pattern` when matched against a value of type `target`.
    pub fn pattern_bindings(
        &self,
        pattern: &Pattern,
        target: Option<&TypeExpr>,
    ) -> Vec<(String, Option<TypeExpr>)> {
        let mut out = Vec::new();
        self.collect_bindings(pattern, target, &mut out);
        out
    }

    fn collect_bindings(
        &self,
        pattern: &Pattern,
        target: Option<&TypeExpr>,
        out: &mut Vec<(String, Option<TypeExpr>)>,
    ) {
        match pattern {
            Pattern::Bind(name) => out.push((name.clone(), target.cloned())),
            Pattern::Constructor(name, subs) => {
                let payload = self.constructor_payload(name, subs.len(), target);
                for (i, sub) in subs.iter().enumerate() {
                    let ty = payload.as_ref().and_then(|p| p.get(i));
                    self.collect_bindings(sub, ty, out);
                }
            }
            Pattern::Wildcard | Pattern::Literal(_) => {}
        }
    }

    fn constructor_payload(
        &self,
        name: &str,
        arity: usize,
        target: Option<&TypeExpr>,
    ) -> Option<Vec<TypeExpr>> {
        if let Some(variant) = self.variant(name) {
            return Some(variant.payload.to_vec());
        }
        match (name, arity, target.map(|t| self.resolve(t))) {
            ("Some", 1, Some(TypeExpr::Option(elem))) => Some(vec![*elem]),
            _ => None,
        }
    }
}

/// Optionally reporting walk over one graph.
struct Walker<'a, 'p> {
    typer: &'a Typer<'p>,
    graph: &'a str,
    sink: Option<&'a mut Vec<String>>,
}

impl Walker<'_, '_> {
    fn report(&mut self, message: impl FnOnce() -> String) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.push(format!("Graph '{}': {}", self.graph, message()));
        }
    }

    fn expect(&mut self, actual: Option<&TypeExpr>, expected: &TypeExpr, what: impl FnOnce() -> String) {
        let Some(actual) = actual else {
            return;
        };
        if !self.typer.compatible(actual, expected) {
            self.report(|| format!("{}: expected {expected}, got {actual}", what()));
        }
    }

    fn exprs(&mut self, exprs: &[Expr], env: &TypeEnv) -> Vec<Option<TypeExpr>> {
        exprs.iter().map(|e| self.expr(e, env)).collect()
    }

    fn expr(&mut self, expr: &Expr, env: &TypeEnv) -> Option<TypeExpr> {
        match expr {
            Expr::Lit(lit) => Some(lit.type_expr()),
            Expr::Ident(name) => self.ident(name, env),
            Expr::Let { name, value, body } => {
                let value_ty = self.expr(value, env);
                self.expr(body, &env.bind(name.clone(), value_ty))
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond_ty = self.expr(cond, env);
                self.expect(cond_ty.as_ref(), &TypeExpr::BOOL, || "if condition".to_string());
                let then_ty = self.expr(then_branch, env);
                let else_ty = self.expr(else_branch, env);
                self.typer.join(then_ty, else_ty)
            }
            Expr::Match { target, arms } => {
                let target_ty = self.expr(target, env);
                let mut result = None;
                for (i, arm) in arms.iter().enumerate() {
                    self.pattern(&arm.pattern, target_ty.as_ref());
                    let arm_env = self
                        .typer
                        .pattern_bindings(&arm.pattern, target_ty.as_ref())
                        .into_iter()
                        .fold(env.clone(), |env, (name, ty)| env.bind(name, ty));
                    let arm_ty = self.expr(&arm.body, &arm_env);
                    result = if i == 0 { arm_ty } else { self.typer.join(result, arm_ty) };
                }
                result
            }
            Expr::Lambda { params, body } => {
                let inner = params
                    .iter()
                    .fold(env.clone(), |env, p| env.bind(p.name.clone(), p.ty.clone()));
                self.expr(body, &inner);
                None
            }
            Expr::Pipe { value, steps } => {
                self.expr(value, env);
                for step in steps {
                    self.pipe_step(step, env);
                }
                None
            }
            Expr::Do(items) => {
                let mut last = Some(TypeExpr::UNIT);
                for item in items {
                    last = self.expr(item, env);
                }
                last
            }
            Expr::Op { op, args } => self.op(*op, args, env),
            Expr::Call { func, args } => self.call(func, args, env),
            Expr::List(items) => {
                let tys = self.exprs(items, env);
                let elem = tys.into_iter().reduce(|a, b| self.typer.join(a, b)).flatten();
                elem.map(TypeExpr::list)
            }
            Expr::Record { type_name, fields } => self.record(type_name, fields, env),
            Expr::Get { object, field } => {
                let object_ty = self.expr(object, env)?;
                let fields = self.typer.record_fields(&object_ty)?;
                let found = lookup_field(&fields, field).cloned();
                if found.is_none() {
                    self.report(|| format!("record type {object_ty} has no field '{field}'"));
                }
                found
            }
            Expr::Set {
                object,
                field,
                value,
            } => {
                let object_ty = self.expr(object, env);
                let value_ty = self.expr(value, env);
                let fields = object_ty.as_ref().and_then(|t| self.typer.record_fields(t));
                if let (Some(object_ty), Some(fields)) = (&object_ty, fields) {
                    match lookup_field(&fields, field) {
                        Some(field_ty) => self.expect(value_ty.as_ref(), field_ty, || {
                            format!("update of field '{field}'")
                        }),
                        None => {
                            self.report(|| format!("record type {object_ty} has no field '{field}'"))
                        }
                    }
                }
                object_ty
            }
            Expr::Builtin { builtin, args } => {
                let (min, max) = builtin.arity();
                if args.len() < min || args.len() > max {
                    self.report(|| arity_message(*builtin, args.len()));
                }
                let tys = self.exprs(args, env);
                builtin_result(self.typer, *builtin, args, &tys)
            }
            Expr::Some(inner) => self.expr(inner, env).map(TypeExpr::option),
            Expr::None => None,
            Expr::Try {
                body,
                catch_var,
                handler,
            } => {
                let body_ty = self.expr(body, env);
                let handler_ty = self.expr(handler, &env.bind(catch_var.clone(), Some(TypeExpr::STRING)));
                self.typer.join(body_ty, handler_ty)
            }
            Expr::Error(message) => {
                let message_ty = self.expr(message, env);
                self.expect(message_ty.as_ref(), &TypeExpr::STRING, || "error message".to_string());
                None
            }
        }
    }

    fn ident(&mut self, name: &str, env: &TypeEnv) -> Option<TypeExpr> {
        if let Some(bound) = env.lookup(name) {
            return bound.cloned();
        }
        if let Some(graph) = self.typer.graph(name) {
            return match graph.inputs.as_slice() {
                [] => Some(TypeExpr::function(TypeExpr::UNIT, graph.output.clone())),
                [(_, param)] => Some(TypeExpr::function(param.clone(), graph.output.clone())),
                _ => None,
            };
        }
        if let Some(variant) = self.typer.variant(name) {
            if variant.payload.is_empty() {
                return Some(TypeExpr::named(variant.enum_name));
            }
        }
        self.report(|| format!("undefined variable '{name}'"));
        None
    }

    fn pattern(&mut self, pattern: &Pattern, target: Option<&TypeExpr>) {
        match pattern {
            Pattern::Literal(lit) => {
                if let Some(target) = target {
                    self.expect(Some(&lit.type_expr()), target, || format!("pattern {lit}"));
                }
            }
            Pattern::Constructor(name, subs) => {
                if let Some(variant) = self.typer.variant(name) {
                    if variant.payload.len() != subs.len() {
                        self.report(|| {
                            format!(
                                "constructor '{name}' has {} field(s), pattern has {}",
                                variant.payload.len(),
                                subs.len()
                            )
                        });
                    }
                    let target_enum = target.and_then(|t| self.typer.enum_name(t));
                    if let Some(target_enum) = target_enum.filter(|e| e != variant.enum_name) {
                        self.report(|| {
                            format!("constructor '{name}' belongs to '{}', not '{target_enum}'", variant.enum_name)
                        });
                    }
                    for (sub, ty) in subs.iter().zip(variant.payload) {
                        self.pattern(sub, Some(ty));
                    }
                } else if (name == "Some" && subs.len() == 1) || (name == "None" && subs.is_empty()) {
                    let elem = match target.map(|t| self.typer.resolve(t)) {
                        Some(TypeExpr::Option(elem)) => Some(*elem),
                        _ => None,
                    };
                    for sub in subs {
                        self.pattern(sub, elem.as_ref());
                    }
                } else {
                    self.report(|| format!("unknown constructor '{name}' in pattern"));
                }
            }
            Pattern::Wildcard | Pattern::Bind(_) => {}
        }
    }

    /// Pipe steps receive an extra argument, so only their parts are checked.
    fn pipe_step(&mut self, step: &Expr, env: &TypeEnv) {
        match step {
            Expr::Builtin { args, .. } => {
                self.exprs(args, env);
            }
            Expr::Call { func, args } => {
                if !env.contains(func)
                    && self.typer.graph(func).is_none()
                    && self.typer.variant(func).is_none()
                {
                    self.report(|| format!("call to unknown function '{func}'"));
                }
                self.exprs(args, env);
            }
            other => {
                self.expr(other, env);
            }
        }
    }

    fn op(&mut self, op: Operator, args: &[Expr], env: &TypeEnv) -> Option<TypeExpr> {
        let tys = self.exprs(args, env);
        if op.is_arithmetic() {
            let mut float = false;
            for ty in tys.iter().flatten() {
                match self.typer.resolve(ty) {
                    TypeExpr::Prim(Prim::Float) => float = true,
                    TypeExpr::Prim(Prim::Int) => {}
                    other => self.report(|| {
                        format!("arithmetic operator '{op}' requires numeric operands, got {other}")
                    }),
                }
            }
            Some(if float { TypeExpr::FLOAT } else { TypeExpr::INT })
        } else if op.is_logical() {
            for ty in tys.iter().flatten() {
                if !self.typer.compatible(ty, &TypeExpr::BOOL) {
                    self.report(|| format!("boolean operator '{op}' requires Bool, got {ty}"));
                }
            }
            Some(TypeExpr::BOOL)
        } else {
            Some(TypeExpr::BOOL)
        }
    }

    fn call(&mut self, func: &str, args: &[Expr], env: &TypeEnv) -> Option<TypeExpr> {
        let tys = self.exprs(args, env);

        if let Some(bound) = env.lookup(func) {
            return match bound.map(|t| self.typer.resolve(t)) {
                Some(TypeExpr::Function(_, ret)) => Some(*ret),
                _ => None,
            };
        }

        if let Some(graph) = self.typer.graph(func) {
            if args.len() != graph.inputs.len() {
                self.report(|| {
                    format!("graph '{func}' expects {} args, got {}", graph.inputs.len(), args.len())
                });
            }
            for (ty, (param, param_ty)) in tys.iter().zip(&graph.inputs) {
                self.expect(ty.as_ref(), param_ty, || format!("argument '{param}' of '{func}'"));
            }
            return Some(graph.output.clone());
        }

        if let Some(variant) = self.typer.variant(func) {
            if args.len() != variant.payload.len() {
                self.report(|| {
                    format!(
                        "constructor '{func}' takes {} value(s), got {}",
                        variant.payload.len(),
                        args.len()
                    )
                });
            }
            for (i, (ty, payload_ty)) in tys.iter().zip(variant.payload).enumerate() {
                self.expect(ty.as_ref(), payload_ty, || format!("field {} of '{func}'", i + 1));
            }
            return Some(TypeExpr::named(variant.enum_name));
        }

        self.report(|| format!("call to unknown function '{func}'"));
        None
    }

    fn record(&mut self, type_name: &str, fields: &[(String, Expr)], env: &TypeEnv) -> Option<TypeExpr> {
        let record_ty = TypeExpr::named(type_name);
        let declared = self.typer.record_fields(&record_ty);
        if declared.is_none() {
            self.report(|| format!("'{type_name}' is not a record type"));
        }

        let mut seen = HashSet::new();
        for (name, value) in fields {
            let value_ty = self.expr(value, env);
            if !seen.insert(name.as_str()) {
                self.report(|| format!("record '{type_name}' sets field '{name}' twice"));
            }
            let Some(declared) = declared.as_deref() else {
                continue;
            };
            match lookup_field(declared, name) {
                Some(field_ty) => {
                    self.expect(value_ty.as_ref(), field_ty, || format!("field '{name}' of '{type_name}'"))
                }
                None => self.report(|| format!("record '{type_name}' has no field '{name}'")),
            }
        }

        let declared = declared?;
        let missing: Vec<&str> = declared
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !seen.contains(name))
            .collect();
        if !missing.is_empty() {
            self.report(|| format!("record '{type_name}' is missing field(s): {}", missing.join(", ")));
        }
        Some(record_ty)
    }
}

fn lookup_field<'t>(fields: &'t [(String, TypeExpr)], name: &str) -> Option<&'t TypeExpr> {
    fields.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
}

pub(crate) fn arity_message(builtin: Builtin, got: usize) -> String {
    let (min, max) = builtin.arity();
    let expected = if min == max {
        format!("{min}")
    } else if max == usize::MAX {
        format!("at least {min}")
    } else {
        format!("{min} to {max}")
    };
    format!("builtin '{builtin}' expects {expected} argument(s), got {got}")
}

/// Result type of a builtin given its inferred argument types.
fn builtin_result(typer: &Typer<'_>, builtin: Builtin, args: &[Expr], tys: &[Option<TypeExpr>]) -> Option<TypeExpr> {
    use Builtin::*;

    // The first argument that is not syntactically a function.
    let data = || {
        args.iter()
            .zip(tys)
            .find(|(arg, _)| !arg.is_lambda())
            .and_then(|(_, ty)| ty.clone())
    };
    let nth = |i: usize| tys.get(i).cloned().flatten();
    let elem_of = |ty: Option<TypeExpr>| match ty.map(|t| typer.resolve(&t)) {
        Some(TypeExpr::List(elem)) => Some(*elem),
        _ => None,
    };

    match builtin {
        Not | IsEmpty | IsSome | Contains | HasKey | StartsWith | EndsWith | StringContains
        | Any | All => Some(TypeExpr::BOOL),
        Length | StringLength | IndexOf | ToInt => Some(TypeExpr::INT),
        ToFloat => Some(TypeExpr::FLOAT),
        Concat | Format | Substr | Join | ToString | ToLower | ToUpper | StringTrim
        | StringReplace | CharAt | IntToString | ReadLine => Some(TypeExpr::STRING),
        Split => Some(TypeExpr::list(TypeExpr::STRING)),
        Range => Some(TypeExpr::list(TypeExpr::INT)),
        Print => Some(TypeExpr::UNIT),
        Filter | SortBy | Reverse | Tail => data(),
        Take | Drop => nth(1),
        Slice => nth(0),
        Cons => nth(1),
        Append => nth(0),
        Head | First | Last => elem_of(nth(0)),
        Nth | ListGet => elem_of(nth(0)),
        Second => match nth(0).map(|t| typer.resolve(&t)) {
            Some(TypeExpr::Tuple(elems)) => elems.get(1).cloned(),
            Some(TypeExpr::List(elem)) => Some(*elem),
            _ => None,
        },
        Sum | Product => elem_of(nth(0)).or(Some(TypeExpr::INT)),
        Abs => nth(0),
        Min | Max => {
            if args.len() == 1 {
                elem_of(nth(0))
            } else {
                typer.join(nth(0), nth(1))
            }
        }
        Unwrap => match nth(0).map(|t| typer.resolve(&t)) {
            Some(TypeExpr::Option(elem)) => Some(*elem),
            other => other,
        },
        OrElse => match nth(0).map(|t| typer.resolve(&t)) {
            Some(TypeExpr::Option(elem)) => typer.join(Some(*elem), nth(1)),
            _ => nth(1),
        },
        Zip => match (elem_of(nth(0)), elem_of(nth(1))) {
            (Some(a), Some(b)) => Some(TypeExpr::list(TypeExpr::Tuple(vec![a, b]))),
            _ => None,
        },
        Enumerate => elem_of(nth(0)).map(|elem| TypeExpr::list(TypeExpr::Tuple(vec![TypeExpr::INT, elem]))),
        Tuple => tys
            .iter()
            .cloned()
            .collect::<Option<Vec<_>>>()
            .map(TypeExpr::Tuple),
        Reduce => args
            .iter()
            .zip(tys)
            .filter(|(arg, _)| !arg.is_lambda())
            .map(|(_, ty)| ty.clone())
            .find(|ty| ty.as_ref().is_some_and(|t| !matches!(typer.resolve(t), TypeExpr::List(_))))
            .flatten(),
        Map | FlatMap | MapOpt | Dict | Keys | Values | GetOr => None,
    }
}

/// Run type checking on a program. Returns the diagnostics found.
pub fn check_types(program: &Program) -> Vec<String> {
    let typer = Typer::new(program);
    let mut errors = Vec::new();

    for def in program.types() {
        for name in unknown_named(&typer, &def.type_expr) {
            errors.push(format!("Type '{}': unknown type '{name}'", def.name));
        }
    }

    for graph in program.graphs() {
        let mut unknown = Vec::new();
        for (_, ty) in &graph.inputs {
            unknown.extend(unknown_named(&typer, ty));
        }
        unknown.extend(unknown_named(&typer, &graph.output));
        for name in unknown {
            errors.push(format!("Graph '{}': unknown type '{name}'", graph.name));
        }

        let env = typer.graph_env(graph);
        let mut walker = Walker {
            typer: &typer,
            graph: &graph.name,
            sink: Some(&mut errors),
        };
        let body_ty = walker.expr(&graph.body, &env);
        let mismatch = body_ty.filter(|ty| !typer.compatible(ty, &graph.output));
        if let Some(body_ty) = mismatch {
            errors.push(format!(
                "Graph '{}': body type {body_ty} doesn't match declared output {}",
                graph.name, graph.output
            ));
        }
    }

    errors
}

fn unknown_named<'t>(typer: &Typer<'_>, ty: &'t TypeExpr) -> Vec<&'t str> {
    let mut out = Vec::new();
    collect_unknown(typer, ty, &mut out);
    out
}

fn collect_unknown<'t>(typer: &Typer<'_>, ty: &'t TypeExpr, out: &mut Vec<&'t str>) {
    match ty {
        TypeExpr::Named(name) => {
            if typer.type_def(name).is_none() {
                out.push(name);
            }
        }
        TypeExpr::List(elem) | TypeExpr::Option(elem) => collect_unknown(typer, elem, out),
        TypeExpr::Tuple(elems) => elems.iter().for_each(|e| collect_unknown(typer, e, out)),
        TypeExpr::Record(fields) => fields.iter().for_each(|(_, t)| collect_unknown(typer, t, out)),
        TypeExpr::Enum(variants) => variants
            .iter()
            .flat_map(|(_, payload)| payload)
            .for_each(|t| collect_unknown(typer, t, out)),
        TypeExpr::Function(param, ret) => {
            collect_unknown(typer, param, out);
            collect_unknown(typer, ret, out);
        }
        TypeExpr::Prim(_) => {}
    }
}
