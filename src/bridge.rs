// SPDX-License-Identifier: Unlicense
use std::marker::PhantomData;
use std::ops::Range;

use tracing::{trace, warn};

use crate::ast::{self, FixedPointLiteral, Identifier, IntegerLiteral};
use crate::config::NumericPolicy;
use crate::error::ParseError;
use crate::lexer::{RawLexer, RawToken, TokenKind};
use crate::parser::Context;

/// What the grammar engine sees: a kind, plus the arena leaf for
/// identifiers and literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub payload: Option<ast::Id>,
}

pub trait TokenSource {
    /// `Ok(None)` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError>;

    /// Byte range of the token most recently returned.
    fn span(&self) -> Range<usize>;
}

/// Pulls raw tokens and mints a leaf node in the arena for each one that
/// carries a value.
pub struct LexicalBridge<'c, 'src, L> {
    lexer: L,
    context: &'c Context,
    policy: NumericPolicy,
    span: Range<usize>,
    marker: PhantomData<&'src str>,
}

impl<'c, 'src, L: RawLexer<'src>> LexicalBridge<'c, 'src, L> {
    pub fn new(lexer: L, context: &'c Context, policy: NumericPolicy) -> Self {
        Self {
            lexer,
            context,
            policy,
            span: 0..0,
            marker: PhantomData,
        }
    }

    fn mint(&self, raw: &RawToken<'src>) -> Result<Option<ast::Id>, ParseError> {
        let id = match raw.kind {
            TokenKind::Identifier => self
                .context
                .create(Identifier {
                    name: raw.lexeme.to_owned(),
                })
                .id(),
            TokenKind::IntVal => {
                let value = convert_integer(raw.lexeme, self.policy)
                    .ok_or_else(|| malformed(raw))?;
                self.context.create(IntegerLiteral { value }).id()
            }
            TokenKind::FixedVal => {
                let value =
                    convert_fixed(raw.lexeme, self.policy).ok_or_else(|| malformed(raw))?;
                self.context.create(FixedPointLiteral { value }).id()
            }
            _ => return Ok(None),
        };
        Ok(Some(id))
    }
}

impl<'c, 'src, L: RawLexer<'src>> TokenSource for LexicalBridge<'c, 'src, L> {
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(raw) = self.lexer.next_raw_token()? else {
            return Ok(None);
        };
        let payload = self.mint(&raw)?;
        trace!(kind = ?raw.kind, lexeme = raw.lexeme, ?payload, "token");
        self.span = raw.span;
        Ok(Some(Token {
            kind: raw.kind,
            payload,
        }))
    }

    fn span(&self) -> Range<usize> {
        self.span.clone()
    }
}

fn malformed(raw: &RawToken<'_>) -> ParseError {
    ParseError::MalformedNumber {
        offset: raw.span.start,
        lexeme: raw.lexeme.to_owned(),
    }
}

/// `None` only under [`NumericPolicy::Strict`].
pub fn convert_integer(lexeme: &str, policy: NumericPolicy) -> Option<i64> {
    match policy {
        NumericPolicy::Strict => lexeme.parse().ok(),
        NumericPolicy::Permissive => Some(lexeme.parse().unwrap_or_else(|_| {
            let value = integer_prefix(lexeme);
            warn!(lexeme, value, "numeric literal converted from its prefix");
            value
        })),
    }
}

/// `None` only under [`NumericPolicy::Strict`].
pub fn convert_fixed(lexeme: &str, policy: NumericPolicy) -> Option<f64> {
    match policy {
        NumericPolicy::Strict => lexeme.parse().ok().filter(|v: &f64| v.is_finite()),
        NumericPolicy::Permissive => Some(lexeme.parse().unwrap_or_else(|_| {
            let value = fixed_prefix(lexeme);
            warn!(lexeme, value, "numeric literal converted from its prefix");
            value
        })),
    }
}

fn integer_prefix(lexeme: &str) -> i64 {
    let text = lexeme.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

fn fixed_prefix(lexeme: &str) -> f64 {
    let text = lexeme.trim_start();
    let bytes = text.as_bytes();
    let digits = |mut at: usize| {
        while bytes.get(at).is_some_and(u8::is_ascii_digit) {
            at += 1;
        }
        at
    };

    let start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut end = digits(start);
    let mut mantissa = end - start;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        mantissa += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use anyhow::Result;

    struct ScriptedLexer {
        tokens: std::vec::IntoIter<(TokenKind, &'static str)>,
        offset: usize,
    }

    impl ScriptedLexer {
        fn new(tokens: Vec<(TokenKind, &'static str)>) -> Self {
            Self {
                tokens: tokens.into_iter(),
                offset: 0,
            }
        }
    }

    impl RawLexer<'static> for ScriptedLexer {
        fn next_raw_token(&mut self) -> Result<Option<RawToken<'static>>, ParseError> {
            Ok(self.tokens.next().map(|(kind, lexeme)| {
                let start = self.offset;
                self.offset += lexeme.len() + 1;
                RawToken {
                    kind,
                    lexeme,
                    span: start..start + lexeme.len(),
                }
            }))
        }
    }

    fn drain(bridge: &mut dyn TokenSource) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        while let Some(token) = bridge.next_token()? {
            out.push(token);
        }
        Ok(out)
    }

    #[test]
    fn bridge_should_mint_leaves_only_for_valued_kinds() -> Result<()> {
        let context = Context::default();
        let lexer = ScriptedLexer::new(vec![
            (TokenKind::Identifier, "x"),
            (TokenKind::Plus, "+"),
            (TokenKind::IntVal, "42"),
            (TokenKind::Star, "*"),
            (TokenKind::FixedVal, "1.5"),
        ]);
        let mut bridge = LexicalBridge::new(lexer, &context, NumericPolicy::Strict);
        let tokens = drain(&mut bridge)?;
        assert_eq!(bridge.span(), 9..12);
        drop(bridge);

        let payloads: Vec<_> = tokens.iter().map(|t| t.payload.is_some()).collect();
        assert_eq!(payloads, vec![true, false, true, false, true]);

        let arena = context.arena.borrow();
        assert_eq!(arena.len(), 3);
        let kinds: Vec<_> = tokens
            .iter()
            .filter_map(|t| t.payload)
            .filter_map(|id| arena.node(id))
            .map(|n| n.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Identifier(Identifier { name: "x".into() }),
                NodeKind::IntegerLiteral(IntegerLiteral { value: 42 }),
                NodeKind::FixedPointLiteral(FixedPointLiteral { value: 1.5 }),
            ]
        );
        Ok(())
    }

    #[test]
    fn bridge_should_reject_malformed_numbers_when_strict() {
        let context = Context::default();
        let lexer = ScriptedLexer::new(vec![(TokenKind::Plus, "+"), (TokenKind::IntVal, "12abc")]);
        let mut bridge = LexicalBridge::new(lexer, &context, NumericPolicy::Strict);
        let err = drain(&mut bridge).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedNumber { offset: 2, ref lexeme } if lexeme == "12abc"
        ));
    }

    #[test]
    fn bridge_should_convert_prefix_when_permissive() -> Result<()> {
        let context = Context::default();
        let lexer = ScriptedLexer::new(vec![
            (TokenKind::IntVal, "12abc"),
            (TokenKind::FixedVal, "3.5x"),
        ]);
        let mut bridge = LexicalBridge::new(lexer, &context, NumericPolicy::Permissive);
        let tokens = drain(&mut bridge)?;
        drop(bridge);

        let arena = context.arena.borrow();
        let rendered: Vec<_> = tokens
            .iter()
            .filter_map(|t| t.payload)
            .map(|id| arena.render(id))
            .collect();
        assert_eq!(rendered, vec!["12", "3.5"]);
        Ok(())
    }

    #[test]
    fn permissive_conversion_should_follow_prefix_rules() {
        let p = NumericPolicy::Permissive;
        assert_eq!(convert_integer("abc", p), Some(0));
        assert_eq!(convert_integer("-17z", p), Some(-17));
        assert_eq!(convert_integer("99999999999999999999", p), Some(i64::MAX));
        assert_eq!(convert_fixed(".", p), Some(0.0));
        assert_eq!(convert_fixed("2.5e3q", p), Some(2500.0));
        assert_eq!(convert_fixed("7e", p), Some(7.0));
    }

    #[test]
    fn strict_conversion_should_reject_overflow() {
        let s = NumericPolicy::Strict;
        assert_eq!(convert_integer("99999999999999999999", s), None);
        assert_eq!(convert_integer("42", s), Some(42));
        assert_eq!(convert_fixed("1.5", s), Some(1.5));
    }
}
