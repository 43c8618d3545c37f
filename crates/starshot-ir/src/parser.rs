//! Recursive-descent parser for Starshot S-expressions.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    Contract, Definition, Effect, Expr, Graph, Literal, MatchArm, Operator, Param, Pattern, Prim,
    Program, TypeDef, TypeExpr,
};
use crate::builtins::Builtin;
use crate::lexer::{LexError, tokenize};
use crate::token::{Token, TokenKind};

/// A fatal parse error, reported at the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at {line}:{col}: {message}")]
pub struct ParseError {
    pub message: String,
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

impl ParseError {
    fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: token.kind,
            text: token.text.clone(),
            line: token.line,
            col: token.col,
        }
    }
}

/// Errors surfaced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// 1-based (line, column) of the failure.
    pub fn position(&self) -> (usize, usize) {
        match self {
            Error::Lex(err) => (err.line, err.col),
            Error::Parse(err) => (err.line, err.col),
        }
    }
}

/// Parse a complete `(program ...)` source unit.
pub fn parse(src: &str) -> Result<Program, Error> {
    let tokens = tokenize(src)?;
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    debug!(
        definitions = program.definitions.len(),
        "parsed program"
    );
    Ok(program)
}

type PResult<T> = Result<T, ParseError>;

/// An element of a `do` block before body-less lets are threaded.
enum DoItem {
    Expr(Expr),
    Let(String, Expr),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        // The stream always ends in Eof, which is never consumed past.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// The token after the current one; used to look at a form's head keyword.
    fn peek_second(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn at_form(&self, keyword: &str) -> bool {
        self.at(TokenKind::LParen) && self.peek_second().is_ident(keyword)
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        let token = self.peek();
        if token.kind != kind {
            return Err(ParseError::at(
                token,
                format!("expected {kind}, got {} {:?}", token.kind, token.text),
            ));
        }
        Ok(self.advance())
    }

    fn expect_ident(&mut self) -> PResult<String> {
        Ok(self.expect(TokenKind::Ident)?.text)
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        let token = self.peek();
        if !token.is_ident(keyword) {
            return Err(ParseError::at(
                token,
                format!("expected '{keyword}', got {} {:?}", token.kind, token.text),
            ));
        }
        self.advance();
        Ok(())
    }

    fn close(&mut self) -> PResult<()> {
        self.expect(TokenKind::RParen).map(|_| ())
    }

    /// Parses items until the closing paren of the current form, consuming it.
    fn until_close<T>(&mut self, mut item: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        let mut items = Vec::new();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Eof) {
                return Err(ParseError::at(self.peek(), "unexpected end of input, expected ')'"));
            }
            items.push(item(self)?);
        }
        self.close()?;
        Ok(items)
    }

    // === Program ===

    fn parse_program(&mut self) -> PResult<Program> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("program")?;
        let definitions = self.until_close(Self::parse_definition)?;
        if !self.at(TokenKind::Eof) {
            return Err(ParseError::at(self.peek(), "unexpected tokens after program"));
        }
        Ok(Program { definitions })
    }

    fn parse_definition(&mut self) -> PResult<Definition> {
        self.expect(TokenKind::LParen)?;
        let keyword = self.peek().clone();
        if keyword.is_ident("type") {
            self.advance();
            let name = self.expect_ident()?;
            let type_expr = self.parse_type()?;
            self.close()?;
            Ok(Definition::Type(TypeDef { name, type_expr }))
        } else if keyword.is_ident("graph") {
            self.advance();
            self.parse_graph().map(Definition::Graph)
        } else {
            Err(ParseError::at(
                &keyword,
                format!("expected 'type' or 'graph', got {:?}", keyword.text),
            ))
        }
    }

    fn parse_graph(&mut self) -> PResult<Graph> {
        let name = self.expect_ident()?;

        self.expect(TokenKind::LParen)?;
        self.expect_keyword("input")?;
        let inputs = self.until_close(Self::parse_typed_param)?;

        self.expect(TokenKind::LParen)?;
        self.expect_keyword("output")?;
        let output = self.parse_type()?;
        self.close()?;

        let effects = self.parse_effects()?;

        let contract = if self.at_form("contract") {
            Some(self.parse_contract()?)
        } else {
            None
        };

        self.expect(TokenKind::LParen)?;
        self.expect_keyword("body")?;
        let body = self.parse_expr()?;
        self.close()?;
        self.close()?;

        Ok(Graph {
            name,
            inputs,
            output,
            effects,
            contract,
            body,
        })
    }

    fn parse_typed_param(&mut self) -> PResult<(String, TypeExpr)> {
        self.expect(TokenKind::LParen)?;
        let name = self.expect_ident()?;
        let ty = self.parse_type()?;
        self.close()?;
        Ok((name, ty))
    }

    fn parse_effects(&mut self) -> PResult<BTreeSet<Effect>> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("effect")?;
        let open = self.peek().clone();
        let effects = self.until_close(|p| {
            let token = p.expect(TokenKind::Ident)?;
            Effect::from_name(&token.text).ok_or_else(|| {
                ParseError::at(
                    &token,
                    format!("unknown effect {:?}, expected pure, io or fail", token.text),
                )
            })
        })?;
        if effects.is_empty() {
            return Err(ParseError::at(&open, "effect declaration must name at least one effect"));
        }
        Ok(effects.into_iter().collect())
    }

    fn parse_contract(&mut self) -> PResult<Contract> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("contract")?;
        let mut contract = Contract::default();
        self.until_close(|p| {
            p.expect(TokenKind::LParen)?;
            let kind = p.expect(TokenKind::Ident)?;
            let expr = p.parse_expr()?;
            p.close()?;
            match kind.text.as_str() {
                "pre" => contract.preconditions.push(expr),
                "post" => contract.postconditions.push(expr),
                other => {
                    return Err(ParseError::at(
                        &kind,
                        format!("expected 'pre' or 'post', got {other:?}"),
                    ));
                }
            }
            Ok(())
        })?;
        Ok(contract)
    }

    // === Types ===

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident => Ok(match Prim::from_name(&token.text) {
                Some(prim) => TypeExpr::Prim(prim),
                None => TypeExpr::Named(token.text),
            }),
            TokenKind::LParen => {
                let head = self.advance();
                match head.text.as_str() {
                    "List" if head.kind == TokenKind::Ident => {
                        let elem = self.parse_type()?;
                        self.close()?;
                        Ok(TypeExpr::list(elem))
                    }
                    "Option" if head.kind == TokenKind::Ident => {
                        let elem = self.parse_type()?;
                        self.close()?;
                        Ok(TypeExpr::option(elem))
                    }
                    "Tuple" if head.kind == TokenKind::Ident => {
                        let elems = self.until_close(Self::parse_type)?;
                        if elems.len() < 2 {
                            return Err(ParseError::at(&head, "tuple type needs at least two elements"));
                        }
                        Ok(TypeExpr::Tuple(elems))
                    }
                    "Record" if head.kind == TokenKind::Ident => {
                        let fields = self.until_close(Self::parse_typed_param)?;
                        Ok(TypeExpr::Record(fields))
                    }
                    "->" if head.kind == TokenKind::Ident => {
                        let param = self.parse_type()?;
                        let ret = self.parse_type()?;
                        self.close()?;
                        Ok(TypeExpr::function(param, ret))
                    }
                    "Enum" if head.kind == TokenKind::Ident => {
                        let variants = self.until_close(|p| {
                            p.expect(TokenKind::LParen)?;
                            let name = p.expect_ident()?;
                            let payload = p.until_close(Self::parse_type)?;
                            Ok((name, payload))
                        })?;
                        Ok(TypeExpr::Enum(variants))
                    }
                    _ => Err(ParseError::at(
                        &head,
                        format!("unknown compound type {:?}", head.text),
                    )),
                }
            }
            _ => Err(ParseError::at(
                &token,
                format!("expected type expression, got {} {:?}", token.kind, token.text),
            )),
        }
    }

    // === Expressions ===

    fn parse_expr(&mut self) -> PResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int => {
                self.advance();
                token
                    .text
                    .parse::<i64>()
                    .map(Expr::int)
                    .map_err(|_| ParseError::at(&token, "integer literal out of range"))
            }
            TokenKind::Float => {
                self.advance();
                token
                    .text
                    .parse::<f64>()
                    .map(|f| Expr::Lit(Literal::Float(f)))
                    .map_err(|_| ParseError::at(&token, "malformed float literal"))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::string(token.text))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(match token.text.as_str() {
                    "true" => Expr::bool(true),
                    "false" => Expr::bool(false),
                    "unit" => Expr::unit(),
                    "none" => Expr::None,
                    _ => Expr::Ident(token.text),
                })
            }
            TokenKind::LParen => self.parse_form(),
            TokenKind::RParen | TokenKind::Eof => Err(ParseError::at(
                &token,
                format!("expected expression, got {}", token.kind),
            )),
        }
    }

    fn parse_form(&mut self) -> PResult<Expr> {
        if self.at_form("let") {
            return match self.parse_let()? {
                DoItem::Expr(expr) => Ok(expr),
                DoItem::Let(name, _) => Err(ParseError::at(
                    &self.tokens[self.pos - 1],
                    format!("let '{name}' needs a body outside of a do block"),
                )),
            };
        }

        self.expect(TokenKind::LParen)?;
        let head = self.peek().clone();
        if head.kind != TokenKind::Ident {
            return Err(ParseError::at(
                &head,
                format!("expected identifier at head of form, got {} {:?}", head.kind, head.text),
            ));
        }
        self.advance();

        match head.text.as_str() {
            "if" => {
                let cond = self.parse_expr()?;
                let then_branch = self.parse_expr()?;
                let else_branch = self.parse_expr()?;
                self.close()?;
                Ok(Expr::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                })
            }
            "match" => {
                let target = self.parse_expr()?;
                let arms = self.until_close(|p| {
                    p.expect(TokenKind::LParen)?;
                    let pattern = p.parse_pattern()?;
                    let body = p.parse_expr()?;
                    p.close()?;
                    Ok(MatchArm { pattern, body })
                })?;
                if arms.is_empty() {
                    return Err(ParseError::at(&head, "match needs at least one arm"));
                }
                Ok(Expr::Match {
                    target: Box::new(target),
                    arms,
                })
            }
            "lambda" => {
                self.expect(TokenKind::LParen)?;
                let params = self.until_close(|p| {
                    if p.at(TokenKind::LParen) {
                        let (name, ty) = p.parse_typed_param()?;
                        Ok(Param { name, ty: Some(ty) })
                    } else {
                        Ok(Param {
                            name: p.expect_ident()?,
                            ty: None,
                        })
                    }
                })?;
                let body = self.parse_expr()?;
                self.close()?;
                Ok(Expr::Lambda {
                    params,
                    body: Box::new(body),
                })
            }
            "pipe" => {
                let value = self.parse_expr()?;
                let steps = self.until_close(Self::parse_expr)?;
                if steps.is_empty() {
                    return Err(ParseError::at(&head, "pipe needs at least one step"));
                }
                Ok(Expr::Pipe {
                    value: Box::new(value),
                    steps,
                })
            }
            "do" => {
                let items = self.until_close(|p| {
                    if p.at_form("let") {
                        p.parse_let()
                    } else {
                        p.parse_expr().map(DoItem::Expr)
                    }
                })?;
                if items.is_empty() {
                    return Err(ParseError::at(&head, "do block needs at least one expression"));
                }
                Ok(Expr::Do(thread_lets(items)))
            }
            "call" => {
                let func = self.expect_ident()?;
                let args = self.until_close(Self::parse_expr)?;
                Ok(Expr::Call { func, args })
            }
            "list" => Ok(Expr::List(self.until_close(Self::parse_expr)?)),
            "record" => {
                let type_name = self.expect_ident()?;
                let fields = self.until_close(|p| {
                    p.expect(TokenKind::LParen)?;
                    let name = p.expect_ident()?;
                    let value = p.parse_expr()?;
                    p.close()?;
                    Ok((name, value))
                })?;
                Ok(Expr::Record { type_name, fields })
            }
            "get" => {
                let object = self.parse_expr()?;
                let field = self.expect_ident()?;
                self.close()?;
                Ok(Expr::Get {
                    object: Box::new(object),
                    field,
                })
            }
            "set" => {
                let object = self.parse_expr()?;
                let field = self.expect_ident()?;
                let value = self.parse_expr()?;
                self.close()?;
                Ok(Expr::Set {
                    object: Box::new(object),
                    field,
                    value: Box::new(value),
                })
            }
            "some" => {
                let value = self.parse_expr()?;
                self.close()?;
                Ok(Expr::Some(Box::new(value)))
            }
            "none" => {
                self.close()?;
                Ok(Expr::None)
            }
            "try" => {
                let body = self.parse_expr()?;
                self.expect(TokenKind::LParen)?;
                self.expect_keyword("catch")?;
                let catch_var = self.expect_ident()?;
                let handler = self.parse_expr()?;
                self.close()?;
                self.close()?;
                Ok(Expr::Try {
                    body: Box::new(body),
                    catch_var,
                    handler: Box::new(handler),
                })
            }
            "error" => {
                let message = self.parse_expr()?;
                self.close()?;
                Ok(Expr::Error(Box::new(message)))
            }
            word => {
                if let Some(op) = Operator::from_symbol(word) {
                    let args = self.until_close(Self::parse_expr)?;
                    if args.is_empty() {
                        return Err(ParseError::at(&head, format!("operator '{word}' needs operands")));
                    }
                    Ok(Expr::Op { op, args })
                } else if let Some(builtin) = Builtin::from_name(word) {
                    let args = self.until_close(Self::parse_expr)?;
                    Ok(Expr::Builtin { builtin, args })
                } else {
                    let args = self.until_close(Self::parse_expr)?;
                    Ok(Expr::Call {
                        func: head.text,
                        args,
                    })
                }
            }
        }
    }

    /// Parses `(let name value body?)`; the body is optional here and the
    /// caller decides whether a missing body is legal.
    fn parse_let(&mut self) -> PResult<DoItem> {
        self.expect(TokenKind::LParen)?;
        self.expect_keyword("let")?;
        let name = self.expect_ident()?;
        let value = self.parse_expr()?;
        if self.at(TokenKind::RParen) {
            self.close()?;
            return Ok(DoItem::Let(name, value));
        }
        let body = self.parse_expr()?;
        self.close()?;
        Ok(DoItem::Expr(Expr::Let {
            name,
            value: Box::new(value),
            body: Box::new(body),
        }))
    }

    fn parse_pattern(&mut self) -> PResult<Pattern> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident => Ok(match token.text.as_str() {
                "_" => Pattern::Wildcard,
                "true" => Pattern::Literal(Literal::Bool(true)),
                "false" => Pattern::Literal(Literal::Bool(false)),
                "unit" => Pattern::Literal(Literal::Unit),
                _ => Pattern::Bind(token.text),
            }),
            TokenKind::Int => token
                .text
                .parse::<i64>()
                .map(|n| Pattern::Literal(Literal::Int(n)))
                .map_err(|_| ParseError::at(&token, "integer literal out of range")),
            TokenKind::Float => token
                .text
                .parse::<f64>()
                .map(|f| Pattern::Literal(Literal::Float(f)))
                .map_err(|_| ParseError::at(&token, "malformed float literal")),
            TokenKind::Str => Ok(Pattern::Literal(Literal::Str(token.text))),
            TokenKind::LParen => {
                let name = self.expect_ident()?;
                let subs = self.until_close(Self::parse_pattern)?;
                Ok(Pattern::Constructor(name, subs))
            }
            TokenKind::RParen | TokenKind::Eof => Err(ParseError::at(
                &token,
                format!("expected pattern, got {}", token.kind),
            )),
        }
    }
}

/// Gives every body-less let the rest of its `do` block as its body, so
/// later bindings stay in scope for the statements that follow them.
fn thread_lets(items: Vec<DoItem>) -> Vec<Expr> {
    let mut out = Vec::with_capacity(items.len());
    let mut items = items.into_iter();
    while let Some(item) = items.next() {
        match item {
            DoItem::Expr(expr) => out.push(expr),
            DoItem::Let(name, value) => {
                let mut rest = thread_lets(items.collect());
                let body = match rest.len() {
                    0 => Expr::unit(),
                    1 => rest.remove(0),
                    _ => Expr::Do(rest),
                };
                out.push(Expr::Let {
                    name,
                    value: Box::new(value),
                    body: Box::new(body),
                });
                break;
            }
        }
    }
    out
}
