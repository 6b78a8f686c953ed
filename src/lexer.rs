// SPDX-License-Identifier: Unlicense
use std::ops::Range;

use logos::Logos;

use crate::error::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+|//[^\n]*")]
pub enum TokenKind {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+")]
    IntVal,

    #[regex(r"[0-9]+\.[0-9]+")]
    FixedVal,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Assign,
    #[token(";")]
    Semicolon,
}

/// A token straight from the lexer, before any AST node exists for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub span: Range<usize>,
}

pub trait RawLexer<'src> {
    /// `Ok(None)` once input is exhausted.
    fn next_raw_token(&mut self) -> Result<Option<RawToken<'src>>, ParseError>;
}

pub struct LogosLexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
}

impl<'src> LogosLexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
        }
    }
}

impl<'src> RawLexer<'src> for LogosLexer<'src> {
    fn next_raw_token(&mut self) -> Result<Option<RawToken<'src>>, ParseError> {
        let Some(result) = self.inner.next() else {
            return Ok(None);
        };
        let lexeme = self.inner.slice();
        let span = self.inner.span();
        match result {
            Ok(kind) => Ok(Some(RawToken { kind, lexeme, span })),
            Err(()) => Err(ParseError::LexicalAmbiguity {
                offset: span.start,
                text: lexeme.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn kinds(source: &str) -> Result<Vec<TokenKind>, ParseError> {
        let mut lexer = LogosLexer::new(source);
        let mut out = Vec::new();
        while let Some(token) = lexer.next_raw_token()? {
            out.push(token.kind);
        }
        Ok(out)
    }

    #[test]
    fn lexer_should_classify_tokens() -> Result<()> {
        use TokenKind::*;
        let got = kinds("total = 1.5 * (n - 2); // trailing comment\n")?;
        assert_eq!(
            got,
            vec![Identifier, Assign, FixedVal, Star, LParen, Identifier, Minus, IntVal, RParen, Semicolon]
        );
        Ok(())
    }

    #[test]
    fn lexer_should_keep_lexeme_and_span() -> Result<()> {
        let mut lexer = LogosLexer::new("  abc_1");
        let token = lexer.next_raw_token()?;
        assert_eq!(
            token,
            Some(RawToken {
                kind: TokenKind::Identifier,
                lexeme: "abc_1",
                span: 2..7,
            })
        );
        assert_eq!(lexer.next_raw_token()?, None);
        Ok(())
    }

    #[test]
    fn lexer_should_reject_unknown_input() {
        let err = kinds("a @ b").unwrap_err();
        assert!(matches!(
            err,
            ParseError::LexicalAmbiguity { offset: 2, ref text } if text == "@"
        ));
    }
}
