//! Namespace checks: duplicate definitions and collisions between the
//! graph, type, variant and builtin namespaces.

use std::collections::{HashMap, HashSet};

use starshot_ir::{Builtin, Program, TypeExpr};

/// Run namespace checks on a program. Returns the diagnostics found.
pub fn check_names(program: &Program) -> Vec<String> {
    let mut errors = Vec::new();

    let mut graphs = HashSet::new();
    for graph in program.graphs() {
        if !graphs.insert(graph.name.as_str()) {
            errors.push(format!("Duplicate graph name '{}'", graph.name));
        }
        if Builtin::from_name(&graph.name).is_some() {
            errors.push(format!(
                "Graph '{}' shadows the builtin of the same name and can only be called with (call ...)",
                graph.name
            ));
        }
        let mut inputs = HashSet::new();
        for (name, ty) in &graph.inputs {
            if !inputs.insert(name.as_str()) {
                errors.push(format!("Graph '{}': duplicate input '{name}'", graph.name));
            }
            check_type_fields(&format!("Graph '{}'", graph.name), ty, &mut errors);
        }
        check_type_fields(&format!("Graph '{}'", graph.name), &graph.output, &mut errors);
    }

    let mut types = HashSet::new();
    // variant name -> owning type
    let mut variants: HashMap<&str, &str> = HashMap::new();
    for def in program.types() {
        if !types.insert(def.name.as_str()) {
            errors.push(format!("Duplicate type name '{}'", def.name));
        }
        check_type_fields(&format!("Type '{}'", def.name), &def.type_expr, &mut errors);

        if let TypeExpr::Enum(members) = &def.type_expr {
            for (variant, _) in members {
                match variants.get(variant.as_str()) {
                    Some(owner) if *owner == def.name => {}
                    Some(owner) => errors.push(format!(
                        "Variant '{variant}' is declared by both '{owner}' and '{}'",
                        def.name
                    )),
                    None => {
                        variants.insert(variant, &def.name);
                    }
                }
                if graphs.contains(variant.as_str()) {
                    errors.push(format!(
                        "Variant '{variant}' of '{}' collides with the graph of the same name",
                        def.name
                    ));
                }
            }
        }
    }

    errors
}

/// Reports duplicate record fields and enum variants anywhere inside `ty`.
fn check_type_fields(owner: &str, ty: &TypeExpr, errors: &mut Vec<String>) {
    match ty {
        TypeExpr::Record(fields) => {
            let mut seen = HashSet::new();
            for (name, field_ty) in fields {
                if !seen.insert(name.as_str()) {
                    errors.push(format!("{owner}: duplicate record field '{name}'"));
                }
                check_type_fields(owner, field_ty, errors);
            }
        }
        TypeExpr::Enum(members) => {
            let mut seen = HashSet::new();
            for (name, payload) in members {
                if !seen.insert(name.as_str()) {
                    errors.push(format!("{owner}: duplicate variant '{name}'"));
                }
                for payload_ty in payload {
                    check_type_fields(owner, payload_ty, errors);
                }
            }
        }
        TypeExpr::List(elem) | TypeExpr::Option(elem) => check_type_fields(owner, elem, errors),
        TypeExpr::Tuple(elems) => {
            for elem in elems {
                check_type_fields(owner, elem, errors);
            }
        }
        TypeExpr::Function(param, ret) => {
            check_type_fields(owner, param, errors);
            check_type_fields(owner, ret, errors);
        }
        TypeExpr::Prim(_) | TypeExpr::Named(_) => {}
    }
}
