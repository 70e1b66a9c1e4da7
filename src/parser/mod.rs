//! Expression front end
//!
//! This module turns source bytes into tokens and evaluates them:
//! - [`lexer`]: Tokenization (source bytes → one token at a time)
//! - [`parse`]: [`Parser`], token-matching primitives and [`ParseError`]
//! - `expressions`: the grammar, evaluated during descent
//! - [`span`]: byte spans and line/column conversion
//! - [`constants`]: default limits
//!
//! # Supported Language
//!
//! A single integer expression over `+`, `-`, `*`, `/`, unary `-` and
//! parentheses. Identifiers are lexed and interned but are not valid
//! operands.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with one rule per precedence level and no
//! intermediate tree. No external parser generator dependencies.

pub mod constants;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod span;

pub use lexer::{LexError, LexErrorKind, Lexer, Token, TokenKind};
pub use parse::{Expected, ParseError, Parser};
pub use span::{SourceLocation, Span};
