//! # Introduction
//!
//! ion is the front end of a small expression language. It lexes source
//! bytes one token at a time, interns identifier spellings, and evaluates
//! integer arithmetic by recursive descent without building a tree. A
//! terminal UI built with [ratatui](https://docs.rs/ratatui) steps through
//! the token stream of an input.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer (+ StringInterner) → Parser/Evaluator → i64
//!                                   ↘ Trace → TUI
//! ```
//!
//! 1. [`storage`]: [`storage::Buffer`], a growable array with doubling
//!    growth, and the [`storage::StringInterner`] built on it.
//! 2. [`parser`]: the lexer, the token-matching primitives and the
//!    expression grammar.
//! 3. [`session`]: [`session::Session`] owns the interner and limits for a
//!    series of parses; [`session::parse_eval`] is the one-shot entry point.
//! 4. [`trace`]: per-token records for diagnostics.
//! 5. [`ui`]: ratatui token stepper; not part of the stable library API.
//!
//! ## Grammar
//!
//! `+`, `-`, `*`, `/` (left-associative, usual precedence), unary `-`,
//! parentheses and unsigned decimal literals. Results are `i64`; overflow and
//! division by zero are errors.

pub mod parser;
pub mod session;
pub mod storage;
pub mod trace;
pub mod ui;

pub use parser::ParseError;
pub use session::{parse_eval, Session, SessionConfig};
