//! S-expression IR for Starshot.
//!
//! This crate defines the surface language shared by the checkers and the
//! execution targets: tokens, the lexer, the AST and the recursive-descent
//! parser that builds it.
//!
//! # Surface syntax
//!
//! A program is a single parenthesized form holding type and graph
//! definitions:
//!
//! ```text
//! (program
//!   (type Point (Record (x Float) (y Float)))
//!   (graph norm2
//!     (input (p Point))
//!     (output Float)
//!     (effect pure)
//!     (body (+ (* (get p x) (get p x)) (* (get p y) (get p y))))))
//! ```

pub mod ast;
pub mod builtins;
pub mod grammar;
mod lexer;
mod parser;
mod render;
mod token;

pub use ast::{
    Contract, Definition, Effect, Expr, Graph, Literal, MatchArm, Operator, Param, Pattern, Prim,
    Program, TypeDef, TypeExpr,
};
pub use builtins::Builtin;
pub use lexer::{LexError, LexErrorKind, tokenize};
pub use parser::{Error, ParseError, parse};
pub use token::{Token, TokenKind};
