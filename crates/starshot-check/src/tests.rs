//! Tests for starshot-check.

use starshot_ir::{Expr, Operator, TypeExpr, parse};

use crate::{TypeEnv, Typer, check_program, check_types};

fn types(src: &str) -> Vec<String> {
    check_types(&parse(src).unwrap())
}

fn graph(body: &str) -> String {
    format!(
        "(program
           (type Point (Record (x Float) (y Float)))
           (type Shape (Enum (Circle Float) (Rect Float Float) (Dot)))
           (type Score Int)
           (graph add (input (a Int) (b Int)) (output Int) (effect pure) (body (+ a b)))
           (graph test (input (n Int) (s String) (p Point) (sh Shape) (xs (List Int)) (o (Option Int)))
             (output Int) (effect pure) (body {body})))"
    )
}

fn errors_in(body: &str) -> Vec<String> {
    types(&graph(body))
}

#[test]
fn test_valid_arithmetic() {
    assert!(errors_in("(+ n 1)").is_empty());
    assert!(errors_in("(let y (+ n 1) (* y 2))").is_empty());
    assert!(errors_in("(if (> n 0) n (- 0 n))").is_empty());
}

#[test]
fn test_type_mismatch_return() {
    let errors = types(
        "(program (graph test (input (x Int)) (output String) (effect pure) (body (+ x 1))))",
    );
    assert_eq!(
        errors,
        vec!["Graph 'test': body type Int doesn't match declared output String"]
    );
}

#[test]
fn test_int_widens_to_float_only() {
    let widen = types("(program (graph f (input (x Int)) (output Float) (effect pure) (body x)))");
    assert!(widen.is_empty(), "{widen:?}");
    let narrow = types("(program (graph f (input (x Float)) (output Int) (effect pure) (body x)))");
    assert_eq!(narrow.len(), 1);
}

#[test]
fn test_undefined_variable() {
    assert_eq!(errors_in("(+ n y)"), vec!["Graph 'test': undefined variable 'y'"]);
}

#[test]
fn test_result_is_not_in_scope_of_the_body() {
    assert_eq!(errors_in("result"), vec!["Graph 'test': undefined variable 'result'"]);
}

#[test]
fn test_arithmetic_on_string() {
    let errors = errors_in("(+ s 1)");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("requires numeric operands, got String"));
}

#[test]
fn test_alias_resolves_for_arithmetic() {
    let src = "(program (type Score Int)
                 (graph f (input (a Score)) (output Score) (effect pure) (body (+ a 1))))";
    assert!(types(src).is_empty());
}

#[test]
fn test_condition_must_be_bool() {
    let errors = errors_in("(if n 1 2)");
    assert_eq!(errors, vec!["Graph 'test': if condition: expected Bool, got Int"]);
}

#[test]
fn test_logical_operands() {
    let errors = errors_in("(if (and (> n 0) s) 1 0)");
    assert_eq!(errors, vec!["Graph 'test': boolean operator 'and' requires Bool, got String"]);
}

#[test]
fn test_wrong_arg_count() {
    let errors = errors_in("(call add 1)");
    assert_eq!(errors, vec!["Graph 'test': graph 'add' expects 2 args, got 1"]);
}

#[test]
fn test_argument_types() {
    let errors = errors_in("(add s 1)");
    assert_eq!(errors, vec!["Graph 'test': argument 'a' of 'add': expected Int, got String"]);
}

#[test]
fn test_unknown_function() {
    let errors = errors_in("(frobnicate n)");
    assert_eq!(errors, vec!["Graph 'test': call to unknown function 'frobnicate'"]);
}

#[test]
fn test_local_function_calls_are_allowed() {
    assert!(errors_in("(let f (lambda (x) (* x 2)) (f n))").is_empty());
}

#[test]
fn test_record_field_access() {
    let errors = types(&graph("(to-int (get p x))"));
    assert!(errors.is_empty(), "{errors:?}");
    let errors = errors_in("(to-int (get p z))");
    assert_eq!(errors, vec!["Graph 'test': record type Point has no field 'z'"]);
}

#[test]
fn test_record_construction() {
    assert!(errors_in("(let q (record Point (x 1.0) (y 2)) 0)").is_empty());
    let errors = errors_in("(let q (record Point (x \"a\") (z 1.0)) 0)");
    assert_eq!(
        errors,
        vec![
            "Graph 'test': field 'x' of 'Point': expected Float, got String",
            "Graph 'test': record 'Point' has no field 'z'",
            "Graph 'test': record 'Point' is missing field(s): y",
        ]
    );
    assert_eq!(
        errors_in("(let q (record Nope (x 1)) 0)"),
        vec!["Graph 'test': 'Nope' is not a record type"]
    );
}

#[test]
fn test_functional_update() {
    assert!(errors_in("(to-int (get (set p x 3.0) x))").is_empty());
    assert_eq!(
        errors_in("(let q (set p w 1.0) 0)"),
        vec!["Graph 'test': record type Point has no field 'w'"]
    );
    assert_eq!(
        errors_in("(let q (set p x \"far\") 0)"),
        vec!["Graph 'test': update of field 'x': expected Float, got String"]
    );
}

#[test]
fn test_variant_constructors() {
    assert!(errors_in("(let c (Circle 1.0) 0)").is_empty());
    assert_eq!(
        errors_in("(let c (Rect 1.0) 0)"),
        vec!["Graph 'test': constructor 'Rect' takes 2 value(s), got 1"]
    );
}

#[test]
fn test_match_arms_bind_payloads() {
    let body = "(match sh ((Circle r) (to-int r)) ((Rect w h) (to-int (* w h))) ((Dot) 0))";
    assert!(errors_in(body).is_empty(), "{:?}", errors_in(body));

    let errors = errors_in("(match sh ((Circle r) (to-int (+ r \"x\"))) (_ 0))");
    assert_eq!(
        errors,
        vec!["Graph 'test': arithmetic operator '+' requires numeric operands, got String"]
    );
}

#[test]
fn test_match_pattern_problems() {
    let errors = errors_in("(match sh ((Square a) 1) ((Rect w) 2) (_ 0))");
    assert_eq!(
        errors,
        vec![
            "Graph 'test': unknown constructor 'Square' in pattern",
            "Graph 'test': constructor 'Rect' has 2 field(s), pattern has 1",
        ]
    );
}

#[test]
fn test_option_patterns() {
    assert!(errors_in("(match o ((Some v) (+ v 1)) ((None) 0))").is_empty());
}

#[test]
fn test_lambda_bodies_are_checked() {
    let errors = errors_in("(reduce (lambda (acc x) (+ acc missing)) 0 xs)");
    assert_eq!(errors, vec!["Graph 'test': undefined variable 'missing'"]);
}

#[test]
fn test_pipe_steps_are_checked_without_the_threaded_argument() {
    assert!(errors_in("(length (pipe xs (filter (lambda (x) (> x 0))) (take 2)))").is_empty());
    let errors = errors_in("(length (pipe xs (map (lambda (x) (* x k)))))");
    assert_eq!(errors, vec!["Graph 'test': undefined variable 'k'"]);
}

#[test]
fn test_builtin_arity() {
    let errors = errors_in("(head xs xs)");
    assert_eq!(errors, vec!["Graph 'test': builtin 'head' expects 1 argument(s), got 2"]);
}

#[test]
fn test_builtin_result_types() {
    assert!(errors_in("(head xs)").is_empty());
    assert!(errors_in("(length (filter (lambda (x) (> x 1)) xs))").is_empty());
    assert_eq!(
        errors_in("(head (split s \",\"))"),
        vec!["Graph 'test': body type String doesn't match declared output Int"]
    );
    assert!(errors_in("(unwrap o)").is_empty());
    assert!(errors_in("(or-else o 0)").is_empty());
}

#[test]
fn test_try_binds_message() {
    assert!(errors_in("(try (head xs) (catch e (string-length e)))").is_empty());
}

#[test]
fn test_branches_that_disagree_are_lenient() {
    assert!(errors_in("(if (> n 0) 1 (error \"neg\"))").is_empty());
    assert!(errors_in("(to-int (if (> n 0) 1 2.5))").is_empty());
}

#[test]
fn test_unknown_types_in_signatures() {
    let errors = types(
        "(program (type Pair (Tuple Int Widget))
                  (graph f (input (g Gadget)) (output (List Int)) (effect pure) (body (list))))",
    );
    assert_eq!(
        errors,
        vec!["Type 'Pair': unknown type 'Widget'", "Graph 'f': unknown type 'Gadget'"]
    );
}

#[test]
fn test_typer_infer_for_callers() {
    let program = parse(&graph("n")).unwrap();
    let typer = Typer::new(&program);
    let env = TypeEnv::new()
        .bind("i", Some(TypeExpr::INT))
        .bind("f", Some(TypeExpr::FLOAT))
        .bind("u", None);

    let div = |a: &str, b: &str| Expr::op(Operator::Div, vec![Expr::ident(a), Expr::ident(b)]);
    assert_eq!(typer.infer(&div("i", "i"), &env), Some(TypeExpr::INT));
    assert_eq!(typer.infer(&div("i", "f"), &env), Some(TypeExpr::FLOAT));
    assert_eq!(typer.infer(&Expr::ident("u"), &env), None);
    assert_eq!(typer.infer(&Expr::ident("nowhere"), &env), None);
    assert_eq!(
        typer.infer(&Expr::call("add", vec![Expr::int(1), Expr::int(2)]), &env),
        Some(TypeExpr::INT)
    );
}

#[test]
fn test_check_program_collects_every_pass() {
    let program = parse(
        "(program
           (graph f (input (n Int) (n Int)) (output Int) (effect pure)
             (contract (pre (> m 0)))
             (body (do (print n) (+ n q)))))",
    )
    .unwrap();
    let report = check_program(&program);
    assert_eq!(report.names, vec!["Graph 'f': duplicate input 'n'"]);
    assert_eq!(report.types, vec!["Graph 'f': undefined variable 'q'"]);
    assert_eq!(report.effects, vec!["Graph 'f' is declared pure but requires effects: io"]);
    assert_eq!(
        report.contracts,
        vec!["Graph 'f' precondition 1 references undefined variables: m"]
    );
    assert_eq!(report.len(), 4);
    assert!(!report.is_clean());

    let passes: Vec<&str> = report.iter().map(|(pass, _)| pass).collect();
    assert_eq!(passes, ["names", "types", "effects", "contracts"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["types"][0], "Graph 'f': undefined variable 'q'");
}

#[test]
fn test_clean_report() {
    let program = parse(
        "(program (graph factorial (input (n Int)) (output Int) (effect pure)
           (contract (pre (>= n 0)) (post (> result 0)))
           (body (if (== n 0) 1 (* n (call factorial (- n 1)))))))",
    )
    .unwrap();
    let report = check_program(&program);
    assert!(report.is_clean(), "{report:?}");
}
