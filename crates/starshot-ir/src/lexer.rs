//! Tokenizer for Starshot source text.

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;
use tracing::debug;

use crate::token::{Token, TokenKind};

/// What went wrong while lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnexpectedCharacter(char),
}

/// A fatal lexing error with the 1-based position it was raised at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at {line}:{col}: {}", describe(.kind))]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub col: usize,
}

fn describe(kind: &LexErrorKind) -> String {
    match kind {
        LexErrorKind::UnterminatedString => "unterminated string literal".to_string(),
        LexErrorKind::UnexpectedCharacter(c) => format!("unexpected character {c:?}"),
    }
}

/// Tokenize source text. The returned stream always ends with an `Eof` token.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(src).lex()?;
    debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

struct Lexer<'src> {
    iter: Peekable<Chars<'src>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            iter: src.chars().peekable(),
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn lex(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(&c) = self.iter.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                ';' => self.comment(),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '"' => self.string()?,
                c if is_atom_char(c) => self.atom(),
                c => {
                    return Err(LexError {
                        kind: LexErrorKind::UnexpectedCharacter(c),
                        line: self.line,
                        col: self.col,
                    });
                }
            }
        }
        let eof = Token::new(TokenKind::Eof, "", self.line, self.col);
        self.tokens.push(eof);
        Ok(self.tokens)
    }

    /// Consumes one character, keeping the line/column counters in step.
    fn advance(&mut self) -> Option<char> {
        let c = self.iter.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn comment(&mut self) {
        while let Some(&c) = self.iter.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) {
        let (line, col) = (self.line, self.col);
        if let Some(c) = self.advance() {
            self.tokens.push(Token::new(kind, c.to_string(), line, col));
        }
    }

    fn string(&mut self) -> Result<(), LexError> {
        let (line, col) = (self.line, self.col);
        let unterminated = LexError {
            kind: LexErrorKind::UnterminatedString,
            line,
            col,
        };
        // Opening quote.
        self.advance();
        let mut buf = String::new();
        loop {
            match self.advance() {
                None => return Err(unterminated),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    None => return Err(unterminated),
                    Some('n') => buf.push('\n'),
                    Some('t') => buf.push('\t'),
                    Some(other) => buf.push(other),
                },
                Some(c) => buf.push(c),
            }
        }
        self.tokens.push(Token::new(TokenKind::Str, buf, line, col));
        Ok(())
    }

    fn atom(&mut self) {
        let (line, col) = (self.line, self.col);
        let mut word = String::new();
        while let Some(&c) = self.iter.peek() {
            if !is_atom_char(c) {
                break;
            }
            word.push(c);
            self.advance();
        }
        let kind = classify(&word);
        self.tokens.push(Token::new(kind, word, line, col));
    }
}

fn is_atom_char(c: char) -> bool {
    !matches!(c, '(' | ')' | ';' | '"') && !c.is_whitespace() && !c.is_control()
}

fn classify(word: &str) -> TokenKind {
    let digits = word.strip_prefix('-').unwrap_or(word);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if all_digits(digits) {
        return TokenKind::Int;
    }
    match digits.split_once('.') {
        Some((whole, frac)) if all_digits(whole) && all_digits(frac) => TokenKind::Float,
        _ => TokenKind::Ident,
    }
}
