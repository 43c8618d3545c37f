//! End-to-end tests: parse, compile to Lua, run on LuaJIT.

use serde_json::{Value, json};
use starshot_ir::parse;
use starshot_runtime_luajit::{ExecutionError, Runtime, execute};

// =============================================================================
// Test Helpers
// =============================================================================

fn run(src: &str, graph: &str, args: &[Value]) -> Value {
    let program = parse(src).expect("parse failed");
    execute(&program, graph, args).expect("execute failed")
}

fn run_err(src: &str, graph: &str, args: &[Value]) -> String {
    let program = parse(src).expect("parse failed");
    match execute(&program, graph, args) {
        Ok(value) => panic!("expected failure, got {value}"),
        Err(err) => err.to_string(),
    }
}

/// Runs a single graph `f` built from its parts.
fn eval(inputs: &str, output: &str, body: &str, args: &[Value]) -> Value {
    let src = format!(
        "(program (graph f (input {inputs}) (output {output}) (effect io fail) (body {body})))"
    );
    run(&src, "f", args)
}

fn assert_num(actual: Value, expected: f64) {
    let n = actual.as_f64().expect("expected number");
    assert!(
        (n - expected).abs() < 1e-10,
        "expected {}, got {}",
        expected,
        n
    );
}

const COLORS: &str = "(program
  (type Color (Enum (Red) (Green) (Blue)))
  (graph red (input) (output Color) (effect pure) (body Red))
  (graph is-red (input (c Color)) (output Bool) (effect pure)
    (body (match c ((Red) true) (_ false) ((Green) (error \"unreachable\")))))
  (graph red-is-red (input) (output Bool) (effect pure) (body (is-red Red))))";

// =============================================================================
// Reference programs
// =============================================================================

#[test]
fn test_factorial() {
    let src = "(program (graph factorial (input (n Int)) (output Int) (effect pure)
                 (body (if (== n 0) 1 (* n (call factorial (- n 1)))))))";
    assert_eq!(run(src, "factorial", &[json!(10)]), json!(3628800));
    assert_eq!(run(src, "factorial", &[json!(0)]), json!(1));
}

#[test]
fn test_pipe_filter_map() {
    let result = eval(
        "(xs (List Int))",
        "(List Int)",
        "(pipe xs (filter (lambda (x) (== (% x 2) 0))) (map (lambda (x) (* x 2))))",
        &[json!([1, 2, 3, 4, 5, 6])],
    );
    assert_eq!(result, json!([4, 8, 12]));
}

#[test]
fn test_precondition() {
    let src = "(program (graph positive (input (n Int)) (output Int) (effect pure)
                 (contract (pre (> n 0)))
                 (body n)))";
    assert_eq!(run(src, "positive", &[json!(5)]), json!(5));
    assert!(run_err(src, "positive", &[json!(-1)]).contains("precondition failed"));
}

#[test]
fn test_postcondition() {
    let src = "(program (graph dec (input (n Int)) (output Int) (effect pure)
                 (contract (post (>= result 0)))
                 (body (let result (- n 1) result))))";
    assert_eq!(run(src, "dec", &[json!(3)]), json!(2));
    assert!(run_err(src, "dec", &[json!(0)]).contains("postcondition failed"));
}

#[test]
fn test_match_on_variants() {
    assert_eq!(run(COLORS, "is-red", &[json!({"__tag": "Red"})]), json!(true));
    assert_eq!(run(COLORS, "is-red", &[json!({"__tag": "Blue"})]), json!(false));
    // The arm after the wildcard never runs.
    assert_eq!(run(COLORS, "is-red", &[json!({"__tag": "Green"})]), json!(false));
    assert_eq!(run(COLORS, "red-is-red", &[]), json!(true));
    assert_eq!(run(COLORS, "red", &[]), json!({"__tag": "Red"}));
}

#[test]
fn test_reduce_orders_agree() {
    for body in [
        "(reduce (lambda (acc x) (+ acc x)) 0 xs)",
        "(reduce xs (lambda (acc x) (+ acc x)) 0)",
        "(reduce xs 0 (lambda (acc x) (+ acc x)))",
        "(reduce (lambda (acc x) (+ acc x)) xs 0)",
        "(pipe xs (reduce (lambda (acc x) (+ acc x)) 0))",
    ] {
        let result = eval("(xs (List Int))", "Int", body, &[json!([1, 2, 3, 4, 5])]);
        assert_eq!(result, json!(15), "{body}");
    }
}

// =============================================================================
// Runtime API
// =============================================================================

#[test]
fn test_module_reuse() {
    let program = parse(COLORS).unwrap();
    let runtime = Runtime::new().unwrap();
    let module = runtime.load(&program).unwrap();
    assert_eq!(module.graphs(), ["red", "is-red", "red-is-red"]);
    assert_eq!(module.call("red-is-red", &[]).unwrap(), json!(true));
    assert_eq!(module.call("red-is-red", &[]).unwrap(), json!(true));
}

#[test]
fn test_unknown_graph() {
    let program = parse(COLORS).unwrap();
    let err = execute(&program, "nope", &[]).unwrap_err();
    assert!(matches!(err, ExecutionError::UnknownGraph(ref name) if name == "nope"));
}

#[test]
fn test_compile_errors_surface() {
    let program = parse("(program (graph f (input) (output Int) (effect pure) (body (head))))").unwrap();
    let err = execute(&program, "f", &[]).unwrap_err();
    assert!(matches!(err, ExecutionError::Compile(_)));
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn test_division() {
    assert_eq!(eval("(a Int) (b Int)", "Int", "(/ a b)", &[json!(7), json!(2)]), json!(3));
    assert_eq!(eval("(a Int) (b Int)", "Int", "(/ a b)", &[json!(-7), json!(2)]), json!(-4));
    assert_num(eval("(a Float) (b Int)", "Float", "(/ a b)", &[json!(7.0), json!(2)]), 3.5);
    assert_eq!(eval("(a Int)", "Int", "(% a 3)", &[json!(7)]), json!(1));
    assert!(
        run_err(
            "(program (graph f (input (a Int)) (output Int) (effect fail) (body (/ a 0))))",
            "f",
            &[json!(1)]
        )
        .contains("division by zero")
    );
}

#[test]
fn test_variadic_operators() {
    assert_eq!(eval("", "Int", "(+ 1 2 3 4)", &[]), json!(10));
    assert_eq!(eval("", "Int", "(- 5)", &[]), json!(-5));
    assert_eq!(eval("", "Bool", "(< 1 2 3)", &[]), json!(true));
    assert_eq!(eval("", "Bool", "(< 1 3 2)", &[]), json!(false));
    assert_eq!(eval("", "Bool", "(and true (or false true))", &[]), json!(true));
}

#[test]
fn test_structural_equality() {
    assert_eq!(eval("", "Bool", "(== (list 1 2) (list 1 2))", &[]), json!(true));
    assert_eq!(eval("", "Bool", "(!= (list 1 2) (list 2 1))", &[]), json!(true));
}

// =============================================================================
// Control flow
// =============================================================================

#[test]
fn test_do_and_let() {
    let body = "(do (let a 2) (let b (* a 3)) (+ a b))";
    assert_eq!(eval("", "Int", body, &[]), json!(8));
}

#[test]
fn test_let_shadowing() {
    let body = "(let x 1 (+ (let x 10 x) x))";
    assert_eq!(eval("", "Int", body, &[]), json!(11));
}

#[test]
fn test_match_literals_and_binds() {
    let body = "(match n (0 \"zero\") (1 \"one\") (other (int-to-string other)))";
    assert_eq!(eval("(n Int)", "String", body, &[json!(1)]), json!("one"));
    assert_eq!(eval("(n Int)", "String", body, &[json!(42)]), json!("42"));
}

#[test]
fn test_unmatched_match_raises() {
    let src = "(program (graph f (input (n Int)) (output String) (effect fail)
                 (body (match n (1 \"one\") (2 \"two\")))))";
    assert_eq!(run(src, "f", &[json!(2)]), json!("two"));
    assert!(run_err(src, "f", &[json!(3)]).contains("match: no arm matched"));
}

#[test]
fn test_match_payloads() {
    let src = "(program
      (type Shape (Enum (Circle Int) (Rect Int Int)))
      (graph area (input (s Shape)) (output Int) (effect pure)
        (body (match s ((Circle r) (* 3 r r)) ((Rect w h) (* w h)))))
      (graph square (input (n Int)) (output Int) (effect pure)
        (body (area (Rect n n)))))";
    assert_eq!(run(src, "square", &[json!(4)]), json!(16));
    assert_eq!(run(src, "area", &[json!({"__tag": "Circle", "value": 2})]), json!(12));
}

#[test]
fn test_try_catch() {
    let body = "(try (error \"boom\") (catch e (concat \"caught: \" e)))";
    assert_eq!(eval("", "String", body, &[]), json!("caught: boom"));
    let body = "(try 7 (catch e 0))";
    assert_eq!(eval("", "Int", body, &[]), json!(7));
}

#[test]
fn test_lambda_closure() {
    let body = "(let k 3 (map (lambda (x) (* x k)) xs))";
    assert_eq!(eval("(xs (List Int))", "(List Int)", body, &[json!([1, 2])]), json!([3, 6]));
}

// =============================================================================
// Records, options, dictionaries
// =============================================================================

const POINTS: &str = "(program
  (type Point (Record (x Int) (y Int)))
  (graph origin (input) (output Point) (effect pure) (body (record Point (x 0) (y 0))))
  (graph move-x (input (p Point) (dx Int)) (output Point) (effect pure)
    (body (set p x (+ (get p x) dx))))
  (graph keeps-original (input (p Point)) (output Int) (effect pure)
    (body (let q (set p x 99) (get p x)))))";

#[test]
fn test_records() {
    assert_eq!(run(POINTS, "origin", &[]), json!({"x": 0, "y": 0}));
    assert_eq!(
        run(POINTS, "move-x", &[json!({"x": 1, "y": 2}), json!(5)]),
        json!({"x": 6, "y": 2})
    );
    assert_eq!(run(POINTS, "keeps-original", &[json!({"x": 1, "y": 2})]), json!(1));
}

#[test]
fn test_options() {
    let inputs = "(o (Option Int))";
    assert_eq!(eval(inputs, "Int", "(or-else o 0)", &[json!(null)]), json!(0));
    assert_eq!(eval(inputs, "Int", "(or-else o 0)", &[json!(5)]), json!(5));
    assert_eq!(eval(inputs, "Bool", "(some? o)", &[json!(null)]), json!(false));
    assert_eq!(
        eval(inputs, "Int", "(match o ((Some v) v) ((None) -1))", &[json!(9)]),
        json!(9)
    );
    assert_eq!(
        eval(inputs, "Int", "(match o ((Some v) v) ((None) -1))", &[json!(null)]),
        json!(-1)
    );
    assert!(
        run_err(
            "(program (graph f (input (o (Option Int))) (output Int) (effect fail) (body (unwrap o))))",
            "f",
            &[json!(null)]
        )
        .contains("unwrap: value is none")
    );
}

#[test]
fn test_dicts() {
    assert_eq!(eval("", "Int", "(get-or (dict \"a\" 1) \"b\" 0)", &[]), json!(0));
    assert_eq!(eval("", "Bool", "(has-key (dict \"a\" 1) \"a\")", &[]), json!(true));
    assert_eq!(
        eval("", "(List String)", "(keys (dict \"b\" 1 \"a\" 2))", &[]),
        json!(["a", "b"])
    );
}

// =============================================================================
// Lists
// =============================================================================

#[test]
fn test_list_builtins() {
    let xs = json!([3, 1, 2]);
    let list = "(xs (List Int))";
    assert_eq!(eval(list, "Int", "(head xs)", &[xs.clone()]), json!(3));
    assert_eq!(eval(list, "Int", "(last xs)", &[xs.clone()]), json!(2));
    assert_eq!(eval(list, "(List Int)", "(tail xs)", &[xs.clone()]), json!([1, 2]));
    assert_eq!(eval(list, "(List Int)", "(reverse xs)", &[xs.clone()]), json!([2, 1, 3]));
    assert_eq!(eval(list, "(List Int)", "(sort-by (lambda (x) x) xs)", &[xs.clone()]), json!([1, 2, 3]));
    assert_eq!(eval(list, "(List Int)", "(cons 0 xs)", &[xs.clone()]), json!([0, 3, 1, 2]));
    assert_eq!(eval(list, "Int", "(sum xs)", &[xs.clone()]), json!(6));
    assert_eq!(eval(list, "Int", "(length xs)", &[xs.clone()]), json!(3));
    assert_eq!(eval(list, "Bool", "(contains xs 2)", &[xs.clone()]), json!(true));
    assert_eq!(eval(list, "Bool", "(any (lambda (x) (> x 2)) xs)", &[xs.clone()]), json!(true));
    assert_eq!(eval(list, "Bool", "(all (lambda (x) (> x 2)) xs)", &[xs.clone()]), json!(false));
    assert_eq!(eval(list, "(List Int)", "(pipe xs (take 2))", &[xs.clone()]), json!([3, 1]));
    assert_eq!(eval(list, "(List Int)", "(drop 1 xs)", &[xs]), json!([1, 2]));
}

#[test]
fn test_empty_list_stays_a_list() {
    assert_eq!(eval("", "(List Int)", "(list)", &[]), json!([]));
    assert_eq!(eval("", "Bool", "(empty? (list))", &[]), json!(true));
}

#[test]
fn test_range() {
    assert_eq!(eval("", "(List Int)", "(range 4)", &[]), json!([0, 1, 2, 3]));
    assert_eq!(eval("", "(List Int)", "(range 1 10 3)", &[]), json!([1, 4, 7]));
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_builtins() {
    assert_eq!(eval("", "String", "(format \"{} + {} = {}\" 1 2 3)", &[]), json!("1 + 2 = 3"));
    assert_eq!(eval("", "(List String)", "(split \"a,b,c\" \",\")", &[]), json!(["a", "b", "c"]));
    assert_eq!(eval("", "String", "(join \", \" (list \"a\" \"b\"))", &[]), json!("a, b"));
    assert_eq!(eval("", "String", "(to-upper \"abc\")", &[]), json!("ABC"));
    assert_eq!(eval("", "String", "(char-at \"hello\" 1)", &[]), json!("e"));
    assert_eq!(eval("", "String", "(substr \"hello\" 1 3)", &[]), json!("el"));
    assert_eq!(eval("", "Int", "(string-length \"hello\")", &[]), json!(5));
    assert_eq!(eval("", "Bool", "(string-contains \"hello\" \"ell\")", &[]), json!(true));
    assert_eq!(eval("", "String", "(string-trim \"  hi  \")", &[]), json!("hi"));
    assert_eq!(eval("", "String", "(concat \"a\" \"b\")", &[]), json!("ab"));
    assert_eq!(eval("", "String", "(to-string (list 1 2))", &[]), json!("[1, 2]"));
}

#[test]
fn test_names_that_shadow_lua_globals() {
    let src = "(program
      (graph type (input (string Int)) (output Int) (effect pure) (body (+ string 1)))
      (graph f (input) (output String) (effect pure) (body (int-to-string (type 41)))))";
    assert_eq!(run(src, "f", &[]), json!("42"));
}

#[test]
fn test_lists_are_recognized_at_runtime() {
    let list = "(xs (List Int))";
    let xs = json!([10, 20]);
    assert_eq!(eval("", "Bool", "(contains (list 10 20) 10)", &[]), json!(true));
    assert_eq!(eval(list, "Bool", "(contains xs 20)", &[xs.clone()]), json!(true));
    assert_eq!(eval(list, "Bool", "(contains xs 30)", &[xs.clone()]), json!(false));
    assert_eq!(eval("", "(List Int)", "(concat (list 1 2) (list 3))", &[]), json!([1, 2, 3]));
    assert_eq!(eval(list, "(List Int)", "(concat xs (list 3))", &[xs.clone()]), json!([10, 20, 3]));
    assert_eq!(eval(list, "String", "(to-string xs)", &[xs.clone()]), json!("[10, 20]"));
    assert_eq!(eval(list, "Bool", "(== xs (list 10 20))", &[xs]), json!(true));
}

#[test]
fn test_float_results_keep_their_type() {
    let result = eval(
        "(xs (List Float))",
        "(List Float)",
        "(map (lambda (x) (/ x 2)) xs)",
        &[json!([3.0, 5.0])],
    );
    assert_eq!(result, json!([1.5, 2.5]));
    assert_eq!(eval("", "String", "(to-string 2.0)", &[]), json!("2.0"));
    assert_eq!(eval("(x Float)", "String", "(to-string x)", &[json!(4.0)]), json!("4.0"));
    assert_eq!(eval("(x Float)", "String", "(format \"{}\" x)", &[json!(0.5)]), json!("0.5"));
    assert_eq!(eval("(n Int)", "String", "(to-string n)", &[json!(4)]), json!("4"));
}

#[test]
fn test_reduce_with_list_accumulator() {
    let xs = json!([1, 2, 3]);
    let list = "(xs (List Int))";
    assert_eq!(
        eval(list, "(List Int)", "(reduce (lambda (acc x) (append acc (* x 2))) (list 0) xs)", &[xs.clone()]),
        json!([0, 2, 4, 6])
    );
    assert_eq!(
        eval(list, "(List Int)", "(reduce xs (lambda (acc x) (cons x acc)) (list))", &[xs.clone()]),
        json!([3, 2, 1])
    );
    assert_eq!(
        eval(list, "Int", "(reduce (lambda (acc x) (+ acc x)) xs (to-int 1.0))", &[xs]),
        json!(7)
    );
}

#[test]
fn test_chained_comparisons_with_calls() {
    let src = "(program
      (graph five (input) (output Int) (effect pure) (body 5))
      (graph within (input (hi Int)) (output Bool) (effect pure) (body (< 1 (call five) hi))))";
    assert_eq!(run(src, "within", &[json!(10)]), json!(true));
    assert_eq!(run(src, "within", &[json!(3)]), json!(false));
}

#[test]
fn test_names_that_mangle_alike_stay_apart() {
    assert_eq!(eval("", "Int", "(let a-b 1 (let a_b 2 (- a-b a_b)))", &[]), json!(-1));

    let src = "(program
      (type Point (Record (x Int)))
      (graph Point (input (x Int)) (output Point) (effect pure) (body (record Point (x x))))
      (graph f (input) (output Int) (effect pure) (body (get (call Point 4) x))))";
    assert_eq!(run(src, "f", &[]), json!(4));
}

#[test]
fn test_many_definitions_load() {
    let mut src = String::from("(program\n");
    for i in 0..40 {
        src.push_str(&format!("  (type T{i} (Enum (A{i}) (B{i} Int)))\n"));
    }
    for i in 0..150 {
        let body = if i == 0 { "n".to_string() } else { format!("(+ 1 (call g{} n))", i - 1) };
        src.push_str(&format!("  (graph g{i} (input (n Int)) (output Int) (effect pure) (body {body}))\n"));
    }
    src.push(')');
    let program = parse(&src).unwrap();
    assert!(starshot_check::check_program(&program).is_clean());
    assert_eq!(run(&src, "g149", &[json!(1)]), json!(150));
}
