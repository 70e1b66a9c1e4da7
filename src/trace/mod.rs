// Token trace for diagnostics and the token stepper

use crate::parser::lexer::{Token, TokenKind};
use crate::parser::span::Span;
use crate::storage::intern::Interner;
use std::fmt;

/// One lexed token, rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub kind: TokenKind,
    pub span: Span,
    /// The literal value, identifier spelling or punctuation byte as text;
    /// empty for end of input.
    pub text: String,
}

impl TraceEntry {
    pub fn new<I: Interner + ?Sized>(token: &Token, interner: &I) -> Self {
        let text = match *token {
            Token::EndOfInput(_) => String::new(),
            Token::Integer(value, _) => value.to_string(),
            Token::Identifier(symbol, _) => interner
                .spelling(symbol)
                .unwrap_or_else(|| symbol.to_string()),
            Token::Punct(byte, _) => {
                if byte.is_ascii_graphic() {
                    (byte as char).to_string()
                } else {
                    format!("\\x{:02x}", byte)
                }
            }
        };

        TraceEntry {
            kind: token.kind(),
            span: token.span(),
            text,
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::Integer => write!(f, "integer {}", self.text),
            TokenKind::Identifier => write!(f, "identifier {}", self.text),
            TokenKind::Punct(_) => write!(f, "punct '{}'", self.text),
        }
    }
}

/// Every token of one input, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self {
        Trace {
            entries: Vec::new(),
        }
    }

    pub fn from_tokens<I: Interner + ?Sized>(tokens: &[Token], interner: &I) -> Self {
        Trace {
            entries: tokens
                .iter()
                .map(|token| TraceEntry::new(token, interner))
                .collect(),
        }
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, index: usize) -> Option<&TraceEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry whose span contains byte `offset`
    pub fn entry_at(&self, offset: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.span.contains(offset))
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
