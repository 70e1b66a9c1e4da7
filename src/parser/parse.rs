//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, its error type and the
//! token-matching primitives the grammar in `expressions` is written with.
//!
//! # Parser Architecture
//!
//! The parser never builds a tree. It holds a [`Lexer`] whose current token
//! is the only lookahead, and every grammar rule returns the value of the
//! subexpression it consumed.
//!
//! - [`Parser::is_current`]: pure check of the current token's kind
//! - [`Parser::match_if`]: consume the current token if it has a kind
//! - [`Parser::require`]: consume the current token or fail with a syntax error
//!
//! Recursion depth is bounded by [`Parser::with_max_depth`] so deeply nested
//! input fails with [`ParseError::NestingTooDeep`] instead of exhausting the
//! stack.

use super::constants::DEFAULT_MAX_DEPTH;
use super::lexer::{LexError, Lexer, Token, TokenKind};
use super::span::Span;
use crate::storage::intern::Interner;
use std::fmt;

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// One specific kind of token.
    Token(TokenKind),
    /// Start of a primary expression: an integer literal or `(`.
    Primary,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Primary => write!(f, "integer literal or '('"),
        }
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The current token does not fit the grammar here.
    Syntax {
        expected: Expected,
        found: TokenKind,
        span: Span,
    },

    /// Right operand of `/` evaluated to zero; `span` is the operator's.
    DivisionByZero { span: Span },

    /// Result does not fit in a signed 64-bit integer.
    ArithmeticOverflow {
        operation: &'static str,
        span: Span,
    },

    /// More nested `(` or unary `-` than the configured limit.
    NestingTooDeep { limit: usize, span: Span },

    /// Source rejected before lexing.
    InputTooLarge { len: usize, limit: usize },

    /// Error raised while scanning a token.
    Lex(LexError),
}

impl ParseError {
    /// Source span the error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::DivisionByZero { span }
            | ParseError::ArithmeticOverflow { span, .. }
            | ParseError::NestingTooDeep { span, .. } => Some(*span),
            ParseError::Lex(err) => Some(err.span),
            ParseError::InputTooLarge { .. } => None,
        }
    }

    /// Message with the line and column of the error within `source`.
    pub fn describe(&self, source: &[u8]) -> String {
        match self.span() {
            Some(span) => {
                let loc = span.location(source);
                format!(
                    "Parse error at line {}, column {}: {}",
                    loc.line, loc.column, self
                )
            }
            None => format!("Parse error: {}", self),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax {
                expected, found, ..
            } => write!(f, "expected {}, found {}", expected, found),
            ParseError::DivisionByZero { .. } => write!(f, "division by zero"),
            ParseError::ArithmeticOverflow { operation, .. } => {
                write!(f, "integer overflow in {}", operation)
            }
            ParseError::NestingTooDeep { limit, .. } => {
                write!(f, "expression nested deeper than {} levels", limit)
            }
            ParseError::InputTooLarge { len, limit } => write!(
                f,
                "input of {} bytes exceeds the limit of {} bytes",
                len, limit
            ),
            ParseError::Lex(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}

/// Recursive descent parser and evaluator for integer expressions
pub struct Parser<'a, I: Interner + ?Sized> {
    pub(crate) lexer: Lexer<'a, I>,
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
}

impl<'a, I: Interner + ?Sized> Parser<'a, I> {
    /// Create a parser over `source` and prime the first token.
    pub fn new(source: &'a [u8], interner: &'a mut I) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source, interner);
        lexer.advance()?;
        Ok(Self {
            lexer,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate the whole input as one expression.
    ///
    /// Anything left after the expression is a syntax error expecting end of
    /// input.
    pub fn parse_eval(&mut self) -> Result<i64, ParseError> {
        let value = self.parse_expression()?;
        self.require(TokenKind::EndOfInput)?;
        Ok(value)
    }

    // ===== Token primitives =====

    /// The current (lookahead) token.
    pub fn token(&self) -> &Token {
        self.lexer.token()
    }

    /// Whether the current token has `kind`. No side effects.
    pub fn is_current(&self, kind: TokenKind) -> bool {
        self.token().kind() == kind
    }

    /// Consume the current token if it has `kind`.
    pub fn match_if(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.is_current(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token, which must have `kind`.
    ///
    /// Returns the span of the consumed token.
    pub fn require(&mut self, kind: TokenKind) -> Result<Span, ParseError> {
        if self.is_current(kind) {
            Ok(self.advance()?.span())
        } else {
            Err(self.unexpected(Expected::Token(kind)))
        }
    }

    /// Move to the next token, returning the one just consumed.
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        let consumed = *self.lexer.token();
        self.lexer.advance()?;
        Ok(consumed)
    }

    pub(crate) fn unexpected(&self, expected: Expected) -> ParseError {
        let token = self.token();
        ParseError::Syntax {
            expected,
            found: token.kind(),
            span: token.span(),
        }
    }

    /// Run `rule` one nesting level deeper.
    ///
    /// `span` is the token that opened the level and is reported if the
    /// limit is hit.
    pub(crate) fn nested<T>(
        &mut self,
        span: Span,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
                span,
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}
