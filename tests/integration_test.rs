// Integration tests for the expression evaluator

use ion::parser::{Expected, LexErrorKind, Span, TokenKind};
use ion::storage::{SharedInterner, StringInterner};
use ion::{parse_eval, ParseError, Session, SessionConfig};
use std::thread;

#[test]
fn test_left_associative_mix() {
    assert_eq!(parse_eval("1+2-3"), Ok(0));
    assert_eq!(parse_eval("8-3-2"), Ok(3));
    assert_eq!(parse_eval("8/4/2"), Ok(1));
}

#[test]
fn test_precedence_and_parentheses() {
    assert_eq!(parse_eval("2*3+4*5"), Ok(26));
    assert_eq!(parse_eval("2*(3+4)*5"), Ok(70));
    assert_eq!(parse_eval("(1)"), Ok(1));
}

#[test]
fn test_whitespace_and_unary() {
    assert_eq!(parse_eval("1 + 2 * 3"), Ok(7));
    assert_eq!(parse_eval("--5"), Ok(5));
    assert_eq!(parse_eval("-(2+3)*2"), Ok(-10));
    assert_eq!(parse_eval(" \t\n42\n"), Ok(42));
}

#[test]
fn test_division_by_zero() {
    let err = parse_eval("4/0").unwrap_err();
    assert_eq!(err, ParseError::DivisionByZero { span: Span::new(1, 2) });

    // Divisor computed at runtime
    assert!(matches!(
        parse_eval("1 / (3 - 3)"),
        Err(ParseError::DivisionByZero { .. })
    ));
}

#[test]
fn test_missing_close_paren() {
    let err = parse_eval("(1").unwrap_err();
    match err {
        ParseError::Syntax {
            expected, found, ..
        } => {
            assert_eq!(expected, Expected::Token(TokenKind::Punct(b')')));
            assert_eq!(found, TokenKind::EndOfInput);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
    assert_eq!(
        parse_eval("(1").unwrap_err().to_string(),
        "expected ')', found end of input"
    );
}

#[test]
fn test_trailing_tokens_rejected() {
    let err = parse_eval("1 2").unwrap_err();
    assert_eq!(
        err,
        ParseError::Syntax {
            expected: Expected::Token(TokenKind::EndOfInput),
            found: TokenKind::Integer,
            span: Span::new(2, 3),
        }
    );
}

#[test]
fn test_identifier_is_not_an_operand() {
    let err = parse_eval("x + 1").unwrap_err();
    assert!(matches!(
        err,
        ParseError::Syntax {
            expected: Expected::Primary,
            found: TokenKind::Identifier,
            ..
        }
    ));
}

#[test]
fn test_literal_overflow() {
    match parse_eval("99999999999999999999") {
        Err(ParseError::Lex(e)) => {
            assert_eq!(e.kind, LexErrorKind::IntegerOverflow);
            assert_eq!(e.span, Span::new(0, 20));
        }
        other => panic!("Expected lex error, got {:?}", other),
    }
}

#[test]
fn test_arithmetic_overflow() {
    assert!(matches!(
        parse_eval("9223372036854775807 + 1"),
        Err(ParseError::ArithmeticOverflow { operation: "addition", .. })
    ));
    assert!(matches!(
        parse_eval("9223372036854775808"),
        Err(ParseError::ArithmeticOverflow { .. })
    ));
    assert_eq!(
        parse_eval("-9223372036854775807 - 1"),
        Ok(i64::MIN)
    );
}

#[test]
fn test_deep_nesting_is_an_error() {
    let depth = 10_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    match parse_eval(&source) {
        Err(ParseError::NestingTooDeep { limit, .. }) => assert_eq!(limit, 128),
        other => panic!("Expected nesting error, got {:?}", other),
    }

    let negations = "-".repeat(depth) + "1";
    assert!(matches!(
        parse_eval(&negations),
        Err(ParseError::NestingTooDeep { .. })
    ));
}

#[test]
fn test_session_limits() {
    let config = SessionConfig::default()
        .with_max_depth(2)
        .with_max_source_len(8);
    let mut session = Session::new().with_config(config);

    assert_eq!(session.eval("((1))"), Ok(1));
    assert!(matches!(
        session.eval("(((1)))"),
        Err(ParseError::NestingTooDeep { limit: 2, .. })
    ));
    assert_eq!(
        session.eval("1+1+1+1+1"),
        Err(ParseError::InputTooLarge { len: 9, limit: 8 })
    );
}

#[test]
fn test_session_keeps_identifiers_after_errors() {
    let mut session = Session::new();
    assert!(session.eval("foo + 1").is_err());
    assert!(session.eval("bar").is_err());
    assert_eq!(session.eval("1 + 1"), Ok(2));

    let interner: &StringInterner = session.interner();
    assert_eq!(interner.len(), 2);
    assert!(interner.lookup(b"foo").is_some());
    assert!(interner.lookup(b"bar").is_some());
}

#[test]
fn test_describe_reports_line_and_column() {
    let source = "1 +\n  (2 * 3";
    let err = parse_eval(source).unwrap_err();
    assert_eq!(
        err.describe(source.as_bytes()),
        "Parse error at line 2, column 9: expected ')', found end of input"
    );
}

#[test]
fn test_trace_rendering() {
    let mut session = Session::new();
    let trace = session.trace("FOO,FOO 12").unwrap();
    assert_eq!(
        trace.to_string(),
        "identifier FOO\npunct ','\nidentifier FOO\ninteger 12\nend of input\n"
    );
}

#[test]
fn test_shared_interner_across_threads() {
    let shared = SharedInterner::new();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let interner = shared.clone();
            thread::spawn(move || {
                let mut session = Session::with_interner(interner);
                session.eval("alpha").unwrap_err();
                session.eval("beta").unwrap_err();
                session.interner().lookup(b"alpha")
            })
        })
        .collect();

    let symbols: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(symbols[0].is_some());
    assert_eq!(symbols[0], symbols[1]);
    assert_eq!(shared.len(), 2);
}
