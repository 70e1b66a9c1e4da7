//! Per-parse sessions
//!
//! A [`Session`] owns the interner and the limits that every `eval` or
//! `trace` call runs with. Nothing is global: independent sessions can run on
//! separate threads, and sessions built over a [`SharedInterner`] agree on
//! identifier identities.
//!
//! Errors fail the current call only. Identifiers interned before an error
//! stay in the table and the session remains usable.
//!
//! [`SharedInterner`]: crate::storage::intern::SharedInterner

use crate::parser::constants::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_SOURCE_LEN};
use crate::parser::lexer::{Lexer, Token};
use crate::parser::parse::{ParseError, Parser};
use crate::storage::intern::{Interner, StringInterner};
use crate::trace::{Trace, TraceEntry};

/// Limits applied to each call on a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum nesting of `(` and unary `-`
    pub max_depth: usize,
    /// Maximum source length in bytes
    pub max_source_len: usize,
}

impl SessionConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_source_len(mut self, max_source_len: usize) -> Self {
        self.max_source_len = max_source_len;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
        }
    }
}

/// Interner plus configuration for a sequence of parses
#[derive(Debug, Default)]
pub struct Session<I: Interner = StringInterner> {
    interner: I,
    config: SessionConfig,
}

impl Session<StringInterner> {
    /// Session with a private interner and default limits.
    pub fn new() -> Self {
        Self::with_interner(StringInterner::new())
    }
}

impl<I: Interner> Session<I> {
    pub fn with_interner(interner: I) -> Self {
        Session {
            interner,
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interner(&self) -> &I {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut I {
        &mut self.interner
    }

    /// Evaluate `source` as a single expression.
    pub fn eval(&mut self, source: impl AsRef<[u8]>) -> Result<i64, ParseError> {
        let source = source.as_ref();
        self.check_len(source)?;

        let mut parser =
            Parser::new(source, &mut self.interner)?.with_max_depth(self.config.max_depth);
        parser.parse_eval()
    }

    /// Lex all of `source`, ending with the end-of-input token.
    pub fn tokenize(&mut self, source: impl AsRef<[u8]>) -> Result<Vec<Token>, ParseError> {
        let source = source.as_ref();
        self.check_len(source)?;
        Ok(Lexer::new(source, &mut self.interner).tokenize()?)
    }

    /// Render every token of `source`.
    pub fn trace(&mut self, source: impl AsRef<[u8]>) -> Result<Trace, ParseError> {
        match self.trace_until_error(source) {
            (trace, None) => Ok(trace),
            (_, Some(err)) => Err(err),
        }
    }

    /// Render tokens up to the first lexer error, returning the error too.
    ///
    /// Used by the token stepper, which still shows the tokens before a bad
    /// literal.
    pub fn trace_until_error(&mut self, source: impl AsRef<[u8]>) -> (Trace, Option<ParseError>) {
        let source = source.as_ref();
        let mut trace = Trace::new();
        if let Err(err) = self.check_len(source) {
            return (trace, Some(err));
        }

        let mut lexer = Lexer::new(source, &mut self.interner);
        loop {
            let token = match lexer.advance() {
                Ok(token) => *token,
                Err(err) => return (trace, Some(err.into())),
            };
            trace.push(TraceEntry::new(&token, lexer.interner()));
            if token.is_end() {
                return (trace, None);
            }
        }
    }

    fn check_len(&self, source: &[u8]) -> Result<(), ParseError> {
        if source.len() > self.config.max_source_len {
            return Err(ParseError::InputTooLarge {
                len: source.len(),
                limit: self.config.max_source_len,
            });
        }
        Ok(())
    }
}

/// Evaluate `source` in a fresh session.
pub fn parse_eval(source: impl AsRef<[u8]>) -> Result<i64, ParseError> {
    Session::new().eval(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::LexErrorKind;
    use crate::storage::intern::SharedInterner;

    #[test]
    fn test_eval_in_session() {
        let mut session = Session::new();
        assert_eq!(session.eval("2*(3+4)*5"), Ok(70));
        assert_eq!(session.eval(b"1 + 2 * 3"), Ok(7));
    }

    #[test]
    fn test_session_survives_errors() {
        let mut session = Session::new();
        assert!(session.eval("foo + (").is_err());
        let foo = session.interner().lookup(b"foo");
        assert!(foo.is_some());

        assert_eq!(session.eval("4/2"), Ok(2));
        session.tokenize("foo").unwrap();
        assert_eq!(session.interner().lookup(b"foo"), foo);
        assert_eq!(session.interner().len(), 1);
    }

    #[test]
    fn test_input_limit() {
        let config = SessionConfig::default().with_max_source_len(4);
        let mut session = Session::new().with_config(config);
        assert_eq!(session.eval("1+22"), Ok(23));
        assert_eq!(
            session.eval("1+222"),
            Err(ParseError::InputTooLarge { len: 5, limit: 4 })
        );
    }

    #[test]
    fn test_depth_limit_from_config() {
        let config = SessionConfig::default().with_max_depth(2);
        let mut session = Session::new().with_config(config);
        assert_eq!(session.eval("((1))"), Ok(1));
        assert!(matches!(
            session.eval("(((1)))"),
            Err(ParseError::NestingTooDeep { limit: 2, .. })
        ));
    }

    #[test]
    fn test_trace_until_error_keeps_prefix() {
        let mut session = Session::new();
        let (trace, err) = session.trace_until_error("a + 99999999999999999999");
        assert_eq!(trace.len(), 2);
        match err {
            Some(ParseError::Lex(lex)) => assert_eq!(lex.kind, LexErrorKind::IntegerOverflow),
            other => panic!("expected lex error, found {:?}", other),
        }
        assert!(session.trace("a + 99999999999999999999").is_err());
    }

    #[test]
    fn test_shared_interner_across_sessions() {
        let shared = SharedInterner::new();
        let mut first = Session::with_interner(shared.clone());
        let mut second = Session::with_interner(shared.clone());

        let a = first.tokenize("alpha beta").unwrap();
        let b = second.tokenize("beta alpha").unwrap();
        assert_eq!(a[0], Token::Identifier(shared.intern(b"alpha"), a[0].span()));
        assert_eq!(a[1].kind(), b[0].kind());
        match (a[1], b[0]) {
            (Token::Identifier(x, _), Token::Identifier(y, _)) => assert_eq!(x, y),
            other => panic!("expected identifiers, found {:?}", other),
        }
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_parse_eval_one_shot() {
        assert_eq!(parse_eval("8-3-2"), Ok(3));
    }
}
