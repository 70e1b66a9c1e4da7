use ion::parser::{LexErrorKind, Lexer, Span, Token, TokenKind};
use ion::storage::{Buffer, StringInterner};

fn tokens(source: &str, interner: &mut StringInterner) -> Vec<Token> {
    Lexer::new(source.as_bytes(), interner)
        .tokenize()
        .expect("Lexing failed")
}

#[test]
fn test_repeated_identifier_shares_symbol() {
    let mut interner = StringInterner::new();
    let toks = tokens("FOO,FOO", &mut interner);

    assert_eq!(toks.len(), 4);
    let (Token::Identifier(a, _), Token::Identifier(b, _)) = (toks[0], toks[2]) else {
        panic!("Expected two identifiers, got {:?}", toks);
    };
    assert_eq!(a, b);
    assert_eq!(toks[1], Token::Punct(b',', Span::new(3, 4)));
    assert_eq!(interner.resolve_str(a), Some("FOO"));
}

#[test]
fn test_digit_run_stops_at_underscore() {
    let mut interner = StringInterner::new();
    let toks = tokens("1234_994", &mut interner);

    assert_eq!(toks[0], Token::Integer(1234, Span::new(0, 4)));
    match toks[1] {
        Token::Identifier(symbol, span) => {
            assert_eq!(span, Span::new(4, 8));
            assert_eq!(interner.resolve(symbol), Some(&b"_994"[..]));
        }
        other => panic!("Expected identifier, got {:?}", other),
    }
    assert!(toks[2].is_end());
}

#[test]
fn test_end_of_input_repeats() {
    let mut interner = StringInterner::new();
    let mut lexer = Lexer::new(b"7", &mut interner);

    assert_eq!(lexer.advance().map(|t| t.kind()), Ok(TokenKind::Integer));
    assert_eq!(lexer.advance().map(|t| t.kind()), Ok(TokenKind::EndOfInput));
    assert_eq!(lexer.advance().map(|t| t.kind()), Ok(TokenKind::EndOfInput));
    assert_eq!(lexer.position(), 1);
}

#[test]
fn test_nul_byte_ends_input() {
    let mut interner = StringInterner::new();
    let mut lexer = Lexer::new(b"1+\x002", &mut interner);
    let toks = lexer.tokenize().expect("Lexing failed");

    let kinds: Vec<_> = toks.iter().map(Token::kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Integer,
            TokenKind::Punct(b'+'),
            TokenKind::EndOfInput
        ]
    );
    assert_eq!(toks[2].span(), Span::new(2, 2));
}

#[test]
fn test_overflowing_literal_is_lex_error() {
    let mut interner = StringInterner::new();
    let mut lexer = Lexer::new(b"1 + 18446744073709551616", &mut interner);
    lexer.advance().expect("first token");
    lexer.advance().expect("second token");

    let err = lexer.advance().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::IntegerOverflow);
    assert_eq!(err.span, Span::new(4, 24));

    // u64::MAX itself still fits
    let mut lexer = Lexer::new(b"18446744073709551615", &mut interner);
    assert_eq!(
        lexer.advance().map(|t| *t),
        Ok(Token::Integer(u64::MAX, Span::new(0, 20)))
    );
}

#[test]
fn test_interner_built_on_buffer() {
    let mut interner = StringInterner::new();
    let words = ["alpha", "beta", "alpha", "gamma", "beta"];
    let symbols: Buffer<_> = words.iter().map(|w| interner.intern_str(w)).collect();

    assert_eq!(symbols.len(), 5);
    assert_eq!(symbols[0], symbols[2]);
    assert_eq!(symbols[1], symbols[4]);
    assert_ne!(symbols[0], symbols[3]);
    assert_eq!(interner.len(), 3);
}
