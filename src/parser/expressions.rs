//! Expression grammar, evaluated during descent
//!
//! ```text
//! expr           := additive
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := '-' unary | primary
//! primary        := INTEGER | '(' expr ')'
//! ```
//!
//! Binary operators are left-associative. Each rule returns the value of the
//! subexpression it consumed. Arithmetic is checked: overflow and division by
//! zero are reported with the span of the operator responsible.

use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{Expected, ParseError, Parser};
use crate::parser::span::Span;
use crate::storage::intern::Interner;

const PLUS: TokenKind = TokenKind::Punct(b'+');
const MINUS: TokenKind = TokenKind::Punct(b'-');
const STAR: TokenKind = TokenKind::Punct(b'*');
const SLASH: TokenKind = TokenKind::Punct(b'/');
const RPAREN: TokenKind = TokenKind::Punct(b')');

fn overflow(operation: &'static str, span: Span) -> ParseError {
    ParseError::ArithmeticOverflow { operation, span }
}

impl<'a, I: Interner + ?Sized> Parser<'a, I> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<i64, ParseError> {
        self.parse_additive()
    }

    /// Parse addition and subtraction
    fn parse_additive(&mut self) -> Result<i64, ParseError> {
        let mut value = self.parse_multiplicative()?;

        loop {
            let span = self.token().span();
            if self.match_if(PLUS)? {
                let rhs = self.parse_multiplicative()?;
                value = value
                    .checked_add(rhs)
                    .ok_or_else(|| overflow("addition", span))?;
            } else if self.match_if(MINUS)? {
                let rhs = self.parse_multiplicative()?;
                value = value
                    .checked_sub(rhs)
                    .ok_or_else(|| overflow("subtraction", span))?;
            } else {
                break;
            }
        }

        Ok(value)
    }

    /// Parse multiplication and division
    fn parse_multiplicative(&mut self) -> Result<i64, ParseError> {
        let mut value = self.parse_unary()?;

        loop {
            let span = self.token().span();
            if self.match_if(STAR)? {
                let rhs = self.parse_unary()?;
                value = value
                    .checked_mul(rhs)
                    .ok_or_else(|| overflow("multiplication", span))?;
            } else if self.match_if(SLASH)? {
                let rhs = self.parse_unary()?;
                if rhs == 0 {
                    return Err(ParseError::DivisionByZero { span });
                }
                // i64::MIN / -1 is the only remaining failure.
                value = value
                    .checked_div(rhs)
                    .ok_or_else(|| overflow("division", span))?;
            } else {
                break;
            }
        }

        Ok(value)
    }

    /// Parse prefix negation
    fn parse_unary(&mut self) -> Result<i64, ParseError> {
        if self.is_current(MINUS) {
            let span = self.advance()?.span();
            let operand = self.nested(span, |p| p.parse_unary())?;
            return operand
                .checked_neg()
                .ok_or_else(|| overflow("negation", span));
        }
        self.parse_primary()
    }

    /// Parse integer literal or parenthesized expression
    fn parse_primary(&mut self) -> Result<i64, ParseError> {
        let token = *self.token();
        match token {
            Token::Integer(value, span) => {
                self.advance()?;
                i64::try_from(value).map_err(|_| overflow("integer literal", span))
            }
            Token::Punct(b'(', span) => {
                self.advance()?;
                let value = self.nested(span, |p| p.parse_expression())?;
                self.require(RPAREN)?;
                Ok(value)
            }
            _ => Err(self.unexpected(Expected::Primary)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::lexer::TokenKind;
    use crate::parser::parse::{Expected, ParseError, Parser};
    use crate::parser::span::Span;
    use crate::storage::intern::StringInterner;

    fn eval(source: &str) -> Result<i64, ParseError> {
        let mut interner = StringInterner::new();
        Parser::new(source.as_bytes(), &mut interner)?.parse_eval()
    }

    #[test]
    fn test_left_associative_additive() {
        assert_eq!(eval("1+2-3"), Ok(0));
        assert_eq!(eval("8-3-2"), Ok(3));
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(eval("2*3+4*5"), Ok(26));
        assert_eq!(eval("2*(3+4)*5"), Ok(70));
        assert_eq!(eval("(1)"), Ok(1));
    }

    #[test]
    fn test_left_associative_division() {
        assert_eq!(eval("8/4/2"), Ok(1));
        assert_eq!(eval("7/2"), Ok(3));
        assert_eq!(eval("-7/2"), Ok(-3));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-5"), Ok(-5));
        assert_eq!(eval("--5"), Ok(5));
        assert_eq!(eval("-(2+3)*2"), Ok(-10));
        assert_eq!(eval("2*-3"), Ok(-6));
    }

    #[test]
    fn test_division_by_zero_points_at_operator() {
        assert_eq!(
            eval("4/0"),
            Err(ParseError::DivisionByZero {
                span: Span::new(1, 2)
            })
        );
        assert_eq!(
            eval("1 + 6 / (3 - 3)"),
            Err(ParseError::DivisionByZero {
                span: Span::new(6, 7)
            })
        );
    }

    #[test]
    fn test_missing_close_paren() {
        assert_eq!(
            eval("(1"),
            Err(ParseError::Syntax {
                expected: Expected::Token(TokenKind::Punct(b')')),
                found: TokenKind::EndOfInput,
                span: Span::new(2, 2),
            })
        );
    }

    #[test]
    fn test_identifier_is_not_a_primary() {
        assert_eq!(
            eval("1+x"),
            Err(ParseError::Syntax {
                expected: Expected::Primary,
                found: TokenKind::Identifier,
                span: Span::new(2, 3),
            })
        );
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_eq!(
            eval("1 2"),
            Err(ParseError::Syntax {
                expected: Expected::Token(TokenKind::EndOfInput),
                found: TokenKind::Integer,
                span: Span::new(2, 3),
            })
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        assert!(matches!(
            eval("9223372036854775807+1"),
            Err(ParseError::ArithmeticOverflow { operation: "addition", .. })
        ));
        assert!(matches!(
            eval("9223372036854775808"),
            Err(ParseError::ArithmeticOverflow { operation: "integer literal", .. })
        ));
        assert!(matches!(
            eval("(0-9223372036854775807-1)/-1"),
            Err(ParseError::ArithmeticOverflow { operation: "division", .. })
        ));
        assert_eq!(eval("0-9223372036854775807-1"), Ok(i64::MIN));
    }

    #[test]
    fn test_nesting_limit() {
        let mut interner = StringInterner::new();
        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let mut parser = Parser::new(ok.as_bytes(), &mut interner)
            .unwrap()
            .with_max_depth(10);
        assert_eq!(parser.parse_eval(), Ok(1));

        let deep = format!("{}1{}", "(".repeat(11), ")".repeat(11));
        let mut parser = Parser::new(deep.as_bytes(), &mut interner)
            .unwrap()
            .with_max_depth(10);
        assert_eq!(
            parser.parse_eval(),
            Err(ParseError::NestingTooDeep {
                limit: 10,
                span: Span::new(10, 11)
            })
        );
    }

    #[test]
    fn test_depth_is_restored_between_siblings() {
        let mut interner = StringInterner::new();
        let source = "(((1)))+(((2)))+-(-3)";
        let mut parser = Parser::new(source.as_bytes(), &mut interner)
            .unwrap()
            .with_max_depth(3);
        assert_eq!(parser.parse_eval(), Ok(6));
    }
}
