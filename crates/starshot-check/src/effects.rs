//! Effect checking: every effect a graph's body needs must be declared.

use std::collections::{BTreeSet, HashMap};

use starshot_ir::{Effect, Expr, Program};

/// Declared effects of every graph, by name.
pub type EffectTable<'p> = HashMap<&'p str, &'p BTreeSet<Effect>>;

pub fn effect_table(program: &Program) -> EffectTable<'_> {
    let mut table = HashMap::new();
    for graph in program.graphs() {
        table.entry(graph.name.as_str()).or_insert(&graph.effects);
    }
    table
}

/// Effects `expr` needs in order to run. `pure` is never required.
pub fn required_effects(expr: &Expr, graphs: &EffectTable<'_>) -> BTreeSet<Effect> {
    let mut required = BTreeSet::new();
    collect(expr, graphs, &mut required);
    required
}

fn collect(expr: &Expr, graphs: &EffectTable<'_>, out: &mut BTreeSet<Effect>) {
    let all = |exprs: &[Expr], out: &mut BTreeSet<Effect>| {
        for e in exprs {
            collect(e, graphs, out);
        }
    };
    match expr {
        Expr::Lit(_) | Expr::Ident(_) | Expr::None => {}
        Expr::Let { value, body, .. } => {
            collect(value, graphs, out);
            collect(body, graphs, out);
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect(cond, graphs, out);
            collect(then_branch, graphs, out);
            collect(else_branch, graphs, out);
        }
        Expr::Match { target, arms } => {
            collect(target, graphs, out);
            for arm in arms {
                collect(&arm.body, graphs, out);
            }
        }
        Expr::Lambda { body, .. } => collect(body, graphs, out),
        Expr::Pipe { value, steps } => {
            collect(value, graphs, out);
            all(steps, out);
        }
        Expr::Do(items) | Expr::List(items) => all(items, out),
        Expr::Op { args, .. } => all(args, out),
        Expr::Call { func, args } => {
            if let Some(effects) = graphs.get(func.as_str()) {
                out.extend(effects.iter().copied().filter(|e| *e != Effect::Pure));
            }
            all(args, out);
        }
        Expr::Record { fields, .. } => {
            for (_, value) in fields {
                collect(value, graphs, out);
            }
        }
        Expr::Get { object, .. } => collect(object, graphs, out),
        Expr::Set { object, value, .. } => {
            collect(object, graphs, out);
            collect(value, graphs, out);
        }
        Expr::Builtin { builtin, args } => {
            out.extend(builtin.effect());
            all(args, out);
        }
        Expr::Some(inner) => collect(inner, graphs, out),
        Expr::Try { body, handler, .. } => {
            collect(body, graphs, out);
            collect(handler, graphs, out);
        }
        Expr::Error(message) => {
            out.insert(Effect::Fail);
            collect(message, graphs, out);
        }
    }
}

fn names(effects: impl IntoIterator<Item = Effect>) -> String {
    let mut names: Vec<&str> = effects.into_iter().map(Effect::name).collect();
    names.sort_unstable();
    names.join(", ")
}

/// Run effect checking on a program. Returns the diagnostics found.
pub fn check_effects(program: &Program) -> Vec<String> {
    let table = effect_table(program);
    let mut errors = Vec::new();

    for graph in program.graphs() {
        let required = required_effects(&graph.body, &table);
        if graph.is_pure() {
            if !required.is_empty() {
                errors.push(format!(
                    "Graph '{}' is declared pure but requires effects: {}",
                    graph.name,
                    names(required)
                ));
            }
            continue;
        }
        let missing: Vec<Effect> = required.difference(&graph.effects).copied().collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Graph '{}' uses effects {} not in its declaration [{}]",
                graph.name,
                names(missing),
                names(graph.effects.iter().copied())
            ));
        }
    }

    errors
}
