//! Tests for starshot-runtime-luajit.

use crate::codegen::{CompileError, Locals, compile, lua_string_literal, to_lua_name};
use starshot_ir::parse;

fn lua(src: &str) -> String {
    compile(&parse(src).unwrap()).unwrap()
}

/// The emitted source with the prelude stripped.
fn emitted(src: &str) -> String {
    let code = lua(src);
    let start = code.find("\nlocal function __errmsg").unwrap();
    let end = code[start..].find("\nend\n").unwrap() + start + 5;
    code[end..].trim_start().to_string()
}

fn graph(inputs: &str, output: &str, body: &str) -> String {
    format!("(program (graph f (input {inputs}) (output {output}) (effect pure) (body {body})))")
}

#[test]
fn test_lua_names() {
    assert_eq!(to_lua_name("factorial"), "factorial");
    assert_eq!(to_lua_name("sum-of-squares"), "sum_of_squares");
    assert_eq!(to_lua_name("empty?"), "empty_");
    assert_eq!(to_lua_name("end"), "_end");
    assert_eq!(to_lua_name("2fast"), "_2fast");
    assert_eq!(to_lua_name("__list"), "S__list");
}

#[test]
fn test_locals_keep_distinct_names_apart() {
    let mut locals = Locals::default();
    assert_eq!(locals.get("a-b"), "a_b");
    assert_eq!(locals.get("a_b"), "a_b_2");
    assert_eq!(locals.get("a-b"), "a_b");
    assert_eq!(locals.get("a_b_2"), "a_b_2_2");
}

#[test]
fn test_colliding_let_names_stay_distinct() {
    let code = emitted(&graph("", "Int", "(let a-b 1 (let a_b 2 (+ a-b a_b)))"));
    assert!(code.contains("local a_b = 1"));
    assert!(code.contains("local a_b_2 = 2"));
    assert!(code.contains("return (a_b + a_b_2)"));
}

#[test]
fn test_string_escaping() {
    assert_eq!(lua_string_literal("hello"), "\"hello\"");
    assert_eq!(lua_string_literal("line1\nline2"), "\"line1\\nline2\"");
    assert_eq!(lua_string_literal("with \"quotes\""), "\"with \\\"quotes\\\"\"");
    assert_eq!(lua_string_literal("a\\b"), "\"a\\\\b\"");
    assert_eq!(lua_string_literal("\u{1}"), "\"\\1\"");
}

#[test]
fn test_chunk_layout() {
    let code = lua(
        "(program
           (type Color (Enum (Red) (Green)))
           (graph pick (input) (output Color) (effect pure) (body Red))
           (graph is-red (input (c Color)) (output Bool) (effect pure)
             (body (match c ((Red) true) (_ false)))))",
    );
    assert!(code.starts_with("local __array_mt = __array_mt or {}"));
    assert!(code.contains("local __graphs, __types, __variants = {}, {}, {}\n"));

    let enum_def = code.find("__types[\"Color\"] = __enum(\"Color\")").unwrap();
    let variant = code.find("__variants[\"Red\"] = __variant(__types[\"Color\"], \"Red\", 0)").unwrap();
    let graph = code.find("__graphs[\"pick\"] = function()").unwrap();
    assert!(enum_def < variant && variant < graph);
    assert!(code.contains("__graphs[\"is-red\"] = function(c)"));

    assert!(code.contains("return __variants[\"Red\"]()"));
    assert!(code.ends_with("end\n\nreturn __graphs\n"));
}

#[test]
fn test_graphs_and_types_sharing_a_name_both_survive() {
    let code = emitted(
        "(program
           (type Point (Record (x Int)))
           (graph Point (input (x Int)) (output Point) (effect pure) (body (record Point (x x)))))",
    );
    assert!(code.contains("__types[\"Point\"] = __record(\"Point\")"));
    assert!(code.contains("__graphs[\"Point\"] = function(x)"));
    assert!(code.contains("return __setmt({[\"x\"] = x}, __types[\"Point\"])"));
}

#[test]
fn test_later_duplicate_definitions_are_not_emitted() {
    let code = emitted(
        "(program
           (graph f (input) (output Int) (effect pure) (body 1))
           (graph f (input) (output Int) (effect pure) (body 2)))",
    );
    assert_eq!(code.matches("__graphs[\"f\"] = function()").count(), 1);
    assert!(code.contains("return 1"));
    assert!(!code.contains("return 2"));
}

#[test]
fn test_compile_is_deterministic() {
    let src = "(program (graph f (input (xs (List Int))) (output Int) (effect pure)
                 (body (match (head xs) (0 (try (head xs) (catch e 1))) (n n)))))";
    assert_eq!(lua(src), lua(src));
}

#[test]
fn test_factorial_shape() {
    let code = emitted(
        "(program (graph factorial (input (n Int)) (output Int) (effect pure)
           (contract (pre (>= n 0)) (post (> result 0)))
           (body (if (== n 0) 1 (* n (call factorial (- n 1)))))))",
    );
    assert_eq!(
        code,
        "__graphs[\"factorial\"] = function(n)
  __assert((n >= 0), \"precondition failed\")
  local __result
  if __eq(n, 0) then
    __result = 1
  else
    __result = (n * __graphs[\"factorial\"]((n - 1)))
  end
  local result = __result
  __assert((result > 0), \"postcondition failed\")
  return result
end

return __graphs
"
    );
}

#[test]
fn test_division_follows_operand_types() {
    assert!(emitted(&graph("(a Int) (b Int)", "Int", "(/ a b)")).contains("return __idiv(a, b)"));
    assert!(emitted(&graph("(a Float) (b Int)", "Float", "(/ a b)")).contains("return (a / b)"));
    assert!(emitted(&graph("(a Int)", "Int", "(% a 3)")).contains("return __mod(a, 3)"));
}

#[test]
fn test_lambda_parameters_take_element_types() {
    let code = emitted(&graph("(xs (List Float))", "(List Float)", "(map (lambda (x) (/ x 2)) xs)"));
    assert!(code.contains("return __map(function(x) return (x / 2) end, xs)"));

    let code = emitted(&graph("(xs (List Int))", "(List Int)", "(map (lambda (x) (/ x 2)) xs)"));
    assert!(code.contains("return __map(function(x) return __idiv(x, 2) end, xs)"));

    let code = emitted(&graph(
        "(xs (List Float))",
        "Float",
        "(pipe xs (filter (lambda (x) (> x 0))) (reduce (lambda (acc x) (+ acc (/ x 2))) 0))",
    ));
    assert!(code.contains("return (acc + (x / 2))"));
}

#[test]
fn test_float_strings() {
    assert!(emitted(&graph("(x Float)", "String", "(to-string x)")).contains("return __float_str(x)"));
    assert!(emitted(&graph("(x Int)", "String", "(to-string x)")).contains("return __tostr(x)"));
    assert!(
        emitted(&graph("(x Float)", "String", "(concat \"x=\" x)"))
            .contains("return __concat(\"x=\", __float_str(x))")
    );
}

#[test]
fn test_chained_comparison_evaluates_operands_once() {
    let code = emitted(&graph("(a Int) (b Int)", "Bool", "(< a b 10)"));
    assert!(code.contains("return ((a < b) and (b < 10))"));

    let code = emitted(
        "(program
           (graph g (input) (output Int) (effect pure) (body 5))
           (graph f (input (a Int)) (output Bool) (effect pure) (body (< a (call g) 10))))",
    );
    assert!(code.contains("local __c1, __c2 = a, __graphs[\"g\"]()"));
    assert_eq!(code.matches("__graphs[\"g\"]()").count(), 1);
}

#[test]
fn test_elseif_chain() {
    let code = emitted(&graph(
        "(n Int)",
        "String",
        "(if (< n 0) \"neg\" (if (== n 0) \"zero\" \"pos\"))",
    ));
    assert!(code.contains("if (n < 0) then\n    return \"neg\"\n  elseif __eq(n, 0) then"));
    assert!(code.contains("  else\n    return \"pos\"\n  end"));
}

#[test]
fn test_let_in_expression_position_is_wrapped() {
    let code = emitted(&graph(
        "(n Int)",
        "Int",
        "(+ 1 (let y (* n 2) y))",
    ));
    assert!(code.contains("return (1 + (function() local y = (n * 2) return y end)())"));
}

#[test]
fn test_match_lowering() {
    let code = emitted(
        "(program
           (type Shape (Enum (Circle Float) (Rect Float Float)))
           (graph area (input (s Shape)) (output Float) (effect pure)
             (body (match s ((Circle r) (* r r)) ((Rect w h) (* w h))))))",
    );
    assert!(code.contains("local __m1 = s"));
    assert!(code.contains("if __is(__m1, \"Circle\") then\n    local r = __m1.value"));
    assert!(code.contains("elseif __is(__m1, \"Rect\") then\n    local w = __m1._0\n    local h = __m1._1"));
    assert!(code.contains("__raise(\"match: no arm matched\")"));
}

#[test]
fn test_catch_all_closes_match() {
    let code = emitted(&graph(
        "(o (Option Int))",
        "Int",
        "(match o ((Some v) v) (_ 0) ((None) 1))",
    ));
    assert!(code.contains("if __m1 ~= nil then\n    local v = __m1"));
    assert!(code.contains("  else\n    return 0\n  end"));
    assert!(!code.contains("return 1"));
    assert!(!code.contains("no arm matched"));
}

#[test]
fn test_try_lowering() {
    let code = emitted(
        "(program (graph f (input (xs (List Int))) (output Int) (effect fail)
           (body (try (unwrap (head xs)) (catch e (string-length e))))))",
    );
    assert!(code.contains("local __ok1, __r2 = __pcall(function() return __unwrap((xs)[1]) end)"));
    assert!(code.contains("if __ok1 then\n    return __r2\n  else\n    local e = __errmsg(__r2)\n    return #(e)\n  end"));
}

#[test]
fn test_pipe_threading() {
    let code = emitted(&graph(
        "(xs (List Int))",
        "(List Int)",
        "(pipe xs (filter (lambda (x) (> x 1))) (map (lambda (x) (* x 2))) (take 2))",
    ));
    assert!(code.contains(
        "return __take(__map(function(x) return (x * 2) end, __filter(function(x) return (x > 1) end, xs)), 2)"
    ));
}

#[test]
fn test_reduce_orderings() {
    let expect = "__reduce(function(a, b) return (a + b) end, 0, xs)";
    for body in [
        "(reduce (lambda (a b) (+ a b)) 0 xs)",
        "(reduce xs (lambda (a b) (+ a b)) 0)",
        "(reduce xs 0 (lambda (a b) (+ a b)))",
        "(pipe xs (reduce (lambda (a b) (+ a b)) 0))",
    ] {
        let code = emitted(&graph("(xs (List Int))", "Int", body));
        assert!(code.contains(expect), "{body}: {code}");
    }
}

#[test]
fn test_records_and_updates() {
    let code = emitted(
        "(program
           (type Point (Record (x Int) (y Int)))
           (graph f (input (p Point)) (output Point) (effect pure)
             (body (set (record Point (x (get p x)) (y 2)) y 3))))",
    );
    assert!(code.contains("__types[\"Point\"] = __record(\"Point\")"));
    assert!(code.contains(
        "return __set(__setmt({[\"x\"] = (p)[\"x\"], [\"y\"] = 2}, __types[\"Point\"]), \"y\", 3)"
    ));
}

#[test]
fn test_user_names_shadow_builtins() {
    let code = emitted(
        "(program
           (graph length (input (s String)) (output Int) (effect pure) (body 7))
           (graph f (input (s String)) (output Int) (effect pure) (body (call length s))))",
    );
    assert!(code.contains("return __graphs[\"length\"](s)"));
}

#[test]
fn test_builtin_arity_is_checked() {
    let err = compile(&parse(&graph("(xs (List Int))", "Int", "(head xs xs)")).unwrap()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidArgCount { builtin: "head", got: 2, .. }));
    assert_eq!(err.to_string(), "invalid argument count for head: expected 1, got 2");
}

#[test]
fn test_odd_dict_is_rejected() {
    let err = compile(&parse(&graph("", "Int", "(dict \"a\" 1 \"b\")")).unwrap()).unwrap_err();
    assert!(matches!(err, CompileError::InvalidArguments(_)));
}

#[test]
fn test_literals() {
    let code = emitted(&graph("", "(List Float)", "(list -5 2.5 -0.5 \"s\" true unit)"));
    assert!(code.contains("return __list({(-5), 2.5, (-0.5), \"s\", true, nil})"));
}
