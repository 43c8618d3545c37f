//! The surface grammar as a context-free document.
//!
//! These strings describe exactly what [`crate::parse`] accepts and are meant
//! for grammar-constrained generators; nothing in the toolchain reads them.

use std::fmt;
use std::str::FromStr;

/// Lark-flavoured EBNF.
pub const EBNF: &str = r#"?start: program

program: "(" "program" definition* ")"

definition: type_def | graph_def

type_def: "(" "type" IDENT type_expr ")"

graph_def: "(" "graph" IDENT input_decl output_decl effect_decl contract_decl? body_decl ")"

input_decl: "(" "input" param* ")"
param: "(" IDENT type_expr ")"
output_decl: "(" "output" type_expr ")"
effect_decl: "(" "effect" EFFECT+ ")"
EFFECT: "pure" | "io" | "fail"
contract_decl: "(" "contract" contract_clause* ")"
contract_clause: "(" "pre" expr ")" | "(" "post" expr ")"
body_decl: "(" "body" expr ")"

// Types
?type_expr: PRIM | IDENT | compound_type
PRIM: "Int" | "Float" | "String" | "Bool" | "Unit"
compound_type: "(" "List" type_expr ")"
             | "(" "Option" type_expr ")"
             | "(" "Tuple" type_expr type_expr+ ")"
             | "(" "Record" field_def* ")"
             | "(" "->" type_expr type_expr ")"
             | "(" "Enum" variant_def* ")"
field_def: "(" IDENT type_expr ")"
variant_def: "(" IDENT type_expr* ")"

// Expressions
?expr: literal
     | IDENT
     | "none"
     | let_expr
     | if_expr
     | match_expr
     | lambda_expr
     | pipe_expr
     | do_expr
     | op_expr
     | call_expr
     | list_expr
     | record_expr
     | get_expr
     | set_expr
     | some_expr
     | try_expr
     | error_expr
     | builtin_expr
     | implicit_call

literal: INT | FLOAT | STRING | "true" | "false" | "unit"

let_expr: "(" "let" IDENT expr expr ")"
if_expr: "(" "if" expr expr expr ")"
match_expr: "(" "match" expr match_arm+ ")"
match_arm: "(" pattern expr ")"
?pattern: "_" | literal | IDENT | "(" IDENT pattern* ")"
lambda_expr: "(" "lambda" "(" lambda_param* ")" expr ")"
lambda_param: IDENT | param
pipe_expr: "(" "pipe" expr expr+ ")"
do_expr: "(" "do" do_item+ ")"
do_item: expr | "(" "let" IDENT expr ")"
op_expr: "(" OPERATOR expr+ ")"
OPERATOR: "+" | "-" | "*" | "/" | "%" | "==" | "!=" | "<" | ">" | "<=" | ">=" | "and" | "or"
call_expr: "(" "call" IDENT expr* ")"
implicit_call: "(" IDENT expr* ")"
list_expr: "(" "list" expr* ")"
record_expr: "(" "record" IDENT field_val* ")"
field_val: "(" IDENT expr ")"
get_expr: "(" "get" expr IDENT ")"
set_expr: "(" "set" expr IDENT expr ")"
some_expr: "(" "some" expr ")" | "(" "none" ")"
try_expr: "(" "try" expr "(" "catch" IDENT expr ")" ")"
error_expr: "(" "error" expr ")"
builtin_expr: "(" BUILTIN expr* ")"
BUILTIN: "not" | "map" | "filter" | "reduce" | "head" | "tail" | "cons" | "append"
       | "nth" | "range" | "empty?" | "sort-by" | "length" | "concat" | "substr"
       | "split" | "join" | "format" | "print" | "read-line" | "some?" | "unwrap"
       | "map-opt" | "or-else" | "reverse" | "first" | "second" | "last"
       | "contains" | "abs" | "min" | "max" | "to-string" | "to-int" | "to-float"
       | "to-lower" | "to-upper" | "string-length" | "char-at"
       | "string-starts-with" | "string-ends-with" | "string-contains"
       | "string-replace" | "string-trim" | "flat-map" | "zip" | "take" | "drop"
       | "slice" | "index-of" | "sum" | "product" | "any" | "all" | "enumerate"
       | "dict" | "keys" | "values" | "has-key" | "get-or" | "int-to-string"
       | "list-get" | "tuple"

// Tokens
IDENT: /[^\s()";0-9-][^\s()";]*|-[^\s()";0-9][^\s()";]*|-/
INT: /-?[0-9]+/
FLOAT: /-?[0-9]+\.[0-9]+/
STRING: /"(\\.|[^"\\])*"/

%ignore /[ \t\r\n]+/
%ignore /;[^\n]*/
"#;

/// Plain BNF without regular expressions in productions.
pub const BNF: &str = r#"<program>         ::= '(' 'program' <definitions> ')'
<definitions>     ::= <definition> <definitions> | ''
<definition>      ::= <type_def> | <graph_def>
<type_def>        ::= '(' 'type' <ident> <type_expr> ')'
<graph_def>       ::= '(' 'graph' <ident> <input_decl> <output_decl> <effect_decl> <contract_decl> <body_decl> ')'
                    | '(' 'graph' <ident> <input_decl> <output_decl> <effect_decl> <body_decl> ')'
<input_decl>      ::= '(' 'input' <params> ')'
<params>          ::= <param> <params> | ''
<param>           ::= '(' <ident> <type_expr> ')'
<output_decl>     ::= '(' 'output' <type_expr> ')'
<effect_decl>     ::= '(' 'effect' <effects> ')'
<effects>         ::= <effect> <effects> | <effect>
<effect>          ::= 'pure' | 'io' | 'fail'
<contract_decl>   ::= '(' 'contract' <clauses> ')'
<clauses>         ::= <clause> <clauses> | ''
<clause>          ::= '(' 'pre' <expr> ')' | '(' 'post' <expr> ')'
<body_decl>       ::= '(' 'body' <expr> ')'

<type_expr>       ::= <prim_type> | <ident> | <compound_type>
<prim_type>       ::= 'Int' | 'Float' | 'String' | 'Bool' | 'Unit'
<compound_type>   ::= '(' 'List' <type_expr> ')'
                    | '(' 'Option' <type_expr> ')'
                    | '(' 'Tuple' <type_expr> <type_expr> <type_exprs> ')'
                    | '(' 'Record' <field_defs> ')'
                    | '(' '->' <type_expr> <type_expr> ')'
                    | '(' 'Enum' <variant_defs> ')'
<type_exprs>      ::= <type_expr> <type_exprs> | ''
<field_defs>      ::= <field_def> <field_defs> | ''
<field_def>       ::= '(' <ident> <type_expr> ')'
<variant_defs>    ::= <variant_def> <variant_defs> | ''
<variant_def>     ::= '(' <ident> <type_exprs> ')'

<expr>            ::= <literal> | <ident> | 'none'
                    | <let_expr> | <if_expr> | <match_expr> | <lambda_expr>
                    | <pipe_expr> | <do_expr> | <op_expr> | <call_expr>
                    | <list_expr> | <record_expr> | <get_expr> | <set_expr>
                    | <option_expr> | <try_expr> | <error_expr> | <builtin_expr>
<exprs>           ::= <expr> <exprs> | ''
<exprs1>          ::= <expr> <exprs>

<literal>         ::= <int> | <float> | <string> | 'true' | 'false' | 'unit'
<let_expr>        ::= '(' 'let' <ident> <expr> <expr> ')'
<if_expr>         ::= '(' 'if' <expr> <expr> <expr> ')'
<match_expr>      ::= '(' 'match' <expr> <match_arm> <match_arms> ')'
<match_arms>      ::= <match_arm> <match_arms> | ''
<match_arm>       ::= '(' <pattern> <expr> ')'
<pattern>         ::= '_' | <literal> | <ident> | '(' <ident> <patterns> ')'
<patterns>        ::= <pattern> <patterns> | ''
<lambda_expr>     ::= '(' 'lambda' '(' <lambda_params> ')' <expr> ')'
<lambda_params>   ::= <ident> <lambda_params> | <param> <lambda_params> | ''
<pipe_expr>       ::= '(' 'pipe' <expr> <exprs1> ')'
<do_expr>         ::= '(' 'do' <do_item> <do_items> ')'
<do_items>        ::= <do_item> <do_items> | ''
<do_item>         ::= <expr> | '(' 'let' <ident> <expr> ')'
<op_expr>         ::= '(' <operator> <exprs1> ')'
<operator>        ::= '+' | '-' | '*' | '/' | '%' | '==' | '!=' | '<' | '>' | '<=' | '>=' | 'and' | 'or'
<call_expr>       ::= '(' 'call' <ident> <exprs> ')' | '(' <ident> <exprs> ')'
<list_expr>       ::= '(' 'list' <exprs> ')'
<record_expr>     ::= '(' 'record' <ident> <field_vals> ')'
<field_vals>      ::= <field_val> <field_vals> | ''
<field_val>       ::= '(' <ident> <expr> ')'
<get_expr>        ::= '(' 'get' <expr> <ident> ')'
<set_expr>        ::= '(' 'set' <expr> <ident> <expr> ')'
<option_expr>     ::= '(' 'some' <expr> ')' | '(' 'none' ')'
<try_expr>        ::= '(' 'try' <expr> '(' 'catch' <ident> <expr> ')' ')'
<error_expr>      ::= '(' 'error' <expr> ')'
<builtin_expr>    ::= '(' <builtin> <exprs> ')'
<builtin>         ::= 'not' | 'map' | 'filter' | 'reduce' | 'head' | 'tail' | 'cons' | 'append'
                    | 'nth' | 'range' | 'empty?' | 'sort-by' | 'length' | 'concat' | 'substr'
                    | 'split' | 'join' | 'format' | 'print' | 'read-line' | 'some?' | 'unwrap'
                    | 'map-opt' | 'or-else' | 'reverse' | 'first' | 'second' | 'last'
                    | 'contains' | 'abs' | 'min' | 'max' | 'to-string' | 'to-int' | 'to-float'
                    | 'to-lower' | 'to-upper' | 'string-length' | 'char-at'
                    | 'string-starts-with' | 'string-ends-with' | 'string-contains'
                    | 'string-replace' | 'string-trim' | 'flat-map' | 'zip' | 'take' | 'drop'
                    | 'slice' | 'index-of' | 'sum' | 'product' | 'any' | 'all' | 'enumerate'
                    | 'dict' | 'keys' | 'values' | 'has-key' | 'get-or' | 'int-to-string'
                    | 'list-get' | 'tuple'

<int>             ::= '-' <digits> | <digits>
<float>           ::= <int> '.' <digits>
<digits>          ::= <digit> <digits> | <digit>
<digit>           ::= '0' | '1' | '2' | '3' | '4' | '5' | '6' | '7' | '8' | '9'
<string>          ::= '"' <string_chars> '"'
<ident>           ::= any atom that is neither an <int> nor a <float>
"#;

/// Which notation [`grammar`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrammarFormat {
    #[default]
    Ebnf,
    Bnf,
}

impl fmt::Display for GrammarFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GrammarFormat::Ebnf => "ebnf",
            GrammarFormat::Bnf => "bnf",
        })
    }
}

impl FromStr for GrammarFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ebnf" => Ok(GrammarFormat::Ebnf),
            "bnf" => Ok(GrammarFormat::Bnf),
            other => Err(format!("unknown grammar format {other:?}, expected ebnf or bnf")),
        }
    }
}

pub fn grammar(format: GrammarFormat) -> &'static str {
    match format {
        GrammarFormat::Ebnf => EBNF,
        GrammarFormat::Bnf => BNF,
    }
}
