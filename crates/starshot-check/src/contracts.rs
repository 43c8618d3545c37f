//! Contract scoping: preconditions see the inputs, postconditions see the
//! inputs and `result`.

use std::collections::{BTreeSet, HashSet};

use starshot_ir::{Expr, Program};

/// Identifiers `expr` references that it does not bind itself.
pub fn free_vars(expr: &Expr) -> BTreeSet<&str> {
    let mut free = BTreeSet::new();
    let mut bound = Vec::new();
    collect(expr, &mut bound, &mut free);
    free
}

fn collect<'a>(expr: &'a Expr, bound: &mut Vec<&'a str>, free: &mut BTreeSet<&'a str>) {
    match expr {
        Expr::Ident(name) => {
            if !bound.contains(&name.as_str()) {
                free.insert(name);
            }
        }
        Expr::Lit(_) | Expr::None => {}
        Expr::Let { name, value, body } => {
            collect(value, bound, free);
            scoped(bound, [name.as_str()], |bound| collect(body, bound, free));
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect(cond, bound, free);
            collect(then_branch, bound, free);
            collect(else_branch, bound, free);
        }
        Expr::Match { target, arms } => {
            collect(target, bound, free);
            for arm in arms {
                scoped(bound, arm.pattern.bound_names(), |bound| {
                    collect(&arm.body, bound, free)
                });
            }
        }
        Expr::Lambda { params, body } => {
            scoped(bound, params.iter().map(|p| p.name.as_str()), |bound| {
                collect(body, bound, free)
            });
        }
        Expr::Pipe { value, steps } => {
            collect(value, bound, free);
            for step in steps {
                collect(step, bound, free);
            }
        }
        Expr::Do(items) | Expr::List(items) => {
            for item in items {
                collect(item, bound, free);
            }
        }
        Expr::Op { args, .. } | Expr::Call { args, .. } | Expr::Builtin { args, .. } => {
            for arg in args {
                collect(arg, bound, free);
            }
        }
        Expr::Record { fields, .. } => {
            for (_, value) in fields {
                collect(value, bound, free);
            }
        }
        Expr::Get { object, .. } => collect(object, bound, free),
        Expr::Set { object, value, .. } => {
            collect(object, bound, free);
            collect(value, bound, free);
        }
        Expr::Some(inner) | Expr::Error(inner) => collect(inner, bound, free),
        Expr::Try {
            body,
            catch_var,
            handler,
        } => {
            collect(body, bound, free);
            scoped(bound, [catch_var.as_str()], |bound| collect(handler, bound, free));
        }
    }
}

/// Runs `f` with `names` pushed onto the bound stack.
fn scoped<'a>(
    bound: &mut Vec<&'a str>,
    names: impl IntoIterator<Item = &'a str>,
    f: impl FnOnce(&mut Vec<&'a str>),
) {
    let depth = bound.len();
    bound.extend(names);
    f(bound);
    bound.truncate(depth);
}

/// Run contract checking on a program. Returns the diagnostics found.
pub fn check_contracts(program: &Program) -> Vec<String> {
    let mut errors = Vec::new();

    for graph in program.graphs() {
        let Some(contract) = &graph.contract else {
            continue;
        };
        let inputs: HashSet<&str> = graph.inputs.iter().map(|(name, _)| name.as_str()).collect();

        let clauses = contract
            .preconditions
            .iter()
            .enumerate()
            .map(|(i, e)| ("precondition", i, e, false))
            .chain(
                contract
                    .postconditions
                    .iter()
                    .enumerate()
                    .map(|(i, e)| ("postcondition", i, e, true)),
            );

        for (kind, i, clause, sees_result) in clauses {
            let invalid: Vec<&str> = free_vars(clause)
                .into_iter()
                .filter(|name| !inputs.contains(name) && !(sees_result && *name == "result"))
                .collect();
            if !invalid.is_empty() {
                errors.push(format!(
                    "Graph '{}' {kind} {} references undefined variables: {}",
                    graph.name,
                    i + 1,
                    invalid.join(", ")
                ));
            }
        }
    }

    errors
}
