//! Lexer (tokenizer) for expression source
//!
//! Produces one [`Token`] at a time from a byte slice: the parser primes the
//! lexer with [`Lexer::advance`] and calls it again after consuming each
//! token. Identifier spellings are canonicalized through an [`Interner`], so
//! equal names carry equal [`Symbol`]s.
//!
//! Classification of the byte under the cursor, after skipping ASCII
//! whitespace:
//!
//! - digit: maximal digit run, an [`Token::Integer`]
//! - letter or `_`: maximal run of letters, digits and `_`, an [`Token::Identifier`]
//! - end of slice or NUL: [`Token::EndOfInput`]
//! - anything else: exactly one byte, a [`Token::Punct`]

use super::constants::SENTINEL;
use super::span::Span;
use crate::storage::intern::{Interner, Symbol};
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries its [`Span`] so diagnostics never need a separate
/// token→position table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    EndOfInput(Span),
    Integer(u64, Span),
    Identifier(Symbol, Span),
    Punct(u8, Span),
}

impl Token {
    /// Returns the source span this token covers.
    pub fn span(&self) -> Span {
        match self {
            Token::EndOfInput(span)
            | Token::Integer(_, span)
            | Token::Identifier(_, span)
            | Token::Punct(_, span) => *span,
        }
    }

    /// The token's kind without its payload.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::EndOfInput(_) => TokenKind::EndOfInput,
            Token::Integer(..) => TokenKind::Integer,
            Token::Identifier(..) => TokenKind::Identifier,
            Token::Punct(byte, _) => TokenKind::Punct(*byte),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Token::EndOfInput(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::EndOfInput(_) => write!(f, "end of input"),
            Token::Integer(n, _) => write!(f, "integer literal {}", n),
            Token::Identifier(symbol, _) => write!(f, "identifier {}", symbol),
            Token::Punct(byte, _) => write!(f, "{}", TokenKind::Punct(*byte)),
        }
    }
}

/// Payload-free token classification used for matching and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfInput,
    Integer,
    Identifier,
    Punct(u8),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::Integer => write!(f, "integer literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Punct(byte) => {
                if byte.is_ascii_graphic() {
                    write!(f, "'{}'", *byte as char)
                } else {
                    write!(f, "byte 0x{:02x}", byte)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Decimal literal does not fit in 64 bits.
    IntegerOverflow,
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexErrorKind::IntegerOverflow => {
                write!(f, "integer literal at {} does not fit in 64 bits", self.span)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Single-token-lookahead lexer over a byte slice.
pub struct Lexer<'a, I: Interner + ?Sized> {
    source: &'a [u8],
    interner: &'a mut I,
    position: usize,
    token: Token,
}

impl<'a, I: Interner + ?Sized> Lexer<'a, I> {
    /// Create a lexer positioned at the start of `source`.
    ///
    /// The current token is [`Token::EndOfInput`] until the first
    /// [`advance`](Self::advance).
    pub fn new(source: &'a [u8], interner: &'a mut I) -> Self {
        Self {
            source,
            interner,
            position: 0,
            token: Token::EndOfInput(Span::new(0, 0)),
        }
    }

    /// The current token.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    pub fn interner(&self) -> &I {
        &*self.interner
    }

    /// Scan one token and make it current.
    ///
    /// At end of input the position stays put, so further calls keep
    /// yielding [`Token::EndOfInput`].
    pub fn advance(&mut self) -> Result<&Token, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.peek() {
            None | Some(SENTINEL) => Token::EndOfInput(Span::new(start, start)),
            Some(b'0'..=b'9') => self.integer_literal(start)?,
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.identifier(start),
            Some(b) => {
                self.position += 1;
                Token::Punct(b, Span::new(start, self.position))
            }
        };

        self.token = token;
        Ok(&self.token)
    }

    /// Drain the remaining input into a vector ending with `EndOfInput`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = *self.advance()?;
            tokens.push(token);
            if token.is_end() {
                break;
            }
        }
        Ok(tokens)
    }

    fn integer_literal(&mut self, start: usize) -> Result<Token, LexError> {
        let mut value: u64 = 0;
        let mut overflowed = false;

        while let Some(digit @ b'0'..=b'9') = self.peek() {
            self.position += 1;
            match value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit - b'0')))
            {
                Some(next) => value = next,
                None => overflowed = true,
            }
        }

        let span = Span::new(start, self.position);
        if overflowed {
            return Err(LexError {
                kind: LexErrorKind::IntegerOverflow,
                span,
            });
        }
        Ok(Token::Integer(value, span))
    }

    fn identifier(&mut self, start: usize) -> Token {
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.position += 1;
            } else {
                break;
            }
        }

        let span = Span::new(start, self.position);
        let symbol = self.interner.intern(&self.source[span.start..span.end]);
        Token::Identifier(symbol, span)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Peek at the current byte without consuming
    fn peek(&self) -> Option<u8> {
        self.source.get(self.position).copied()
    }
}
