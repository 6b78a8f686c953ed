// SPDX-License-Identifier: Unlicense
use std::cell::{Cell, RefCell};
use std::ops::Range;

use crate::arena::AstArena;
use crate::ast::{self, Handle, NodeVariant};
use crate::bridge::{Token, TokenSource};
use crate::config::DEFAULT_MAX_NESTING;
use crate::error::ParseError;
use crate::lexer::TokenKind;

/// Reduction-time state of one parse: the arena nodes are created in and the
/// slot the start symbol's reduction fills.
#[derive(Debug, Default)]
pub struct Context {
    pub arena: RefCell<AstArena>,
    root: Cell<Option<ast::Id>>,
}

impl Context {
    pub fn new(arena: AstArena) -> Self {
        Self {
            arena: RefCell::new(arena),
            root: Cell::new(None),
        }
    }

    pub fn create<T: NodeVariant>(&self, value: T) -> Handle<T> {
        self.arena.borrow_mut().create(value)
    }

    pub fn set_ast_root(&self, root: ast::Id) {
        self.root.set(Some(root));
    }

    pub fn ast_root(&self) -> Option<ast::Id> {
        self.root.get()
    }
}

/// Drives token consumption and reductions for one parse. Succeeds only
/// after calling [`Context::set_ast_root`].
pub trait GrammarEngine {
    fn parse(&mut self, tokens: &mut dyn TokenSource, context: &Context) -> Result<(), ParseError>;
}

peg::parser! {
    grammar lang_grammar(context: &Context) for [Token] {
        rule plus() = quiet!{[Token { kind: TokenKind::Plus, .. }] {}} / expected!("'+'")
        rule minus() = quiet!{[Token { kind: TokenKind::Minus, .. }] {}} / expected!("'-'")
        rule star() = quiet!{[Token { kind: TokenKind::Star, .. }] {}} / expected!("'*'")
        rule slash() = quiet!{[Token { kind: TokenKind::Slash, .. }] {}} / expected!("'/'")
        rule lparen() = quiet!{[Token { kind: TokenKind::LParen, .. }] {}} / expected!("'('")
        rule rparen() = quiet!{[Token { kind: TokenKind::RParen, .. }] {}} / expected!("')'")
        rule assign() = quiet!{[Token { kind: TokenKind::Assign, .. }] {}} / expected!("'='")
        rule semicolon() = quiet!{[Token { kind: TokenKind::Semicolon, .. }] {}} / expected!("';'")

        rule ident() -> ast::Id
            = quiet!{[Token { kind: TokenKind::Identifier, payload: Some(id) }] { id }}
            / expected!("identifier")

        rule literal() -> ast::Id
            = quiet!{[Token { kind: TokenKind::IntVal | TokenKind::FixedVal, payload: Some(id) }] { id }}
            / expected!("literal")

        rule atom() -> ast::Id
            = ident()
            / literal()
            / lparen() e:expr() rparen() { context.create(ast::Paren { inner: e }).id() }

        rule expr() -> ast::Id = precedence! {
            x:(@) plus() y:@ { binary(context, ast::BiOpKind::Add, x, y) }
            x:(@) minus() y:@ { binary(context, ast::BiOpKind::Sub, x, y) }
            --
            x:(@) star() y:@ { binary(context, ast::BiOpKind::Mul, x, y) }
            x:(@) slash() y:@ { binary(context, ast::BiOpKind::Div, x, y) }
            --
            minus() x:@ {
                context.create(ast::UnaryOp { op: ast::UnOpKind::Neg, operand: x }).id()
            }
            --
            a:atom() { a }
        }

        rule statement() -> ast::Id
            = target:ident() assign() value:expr() {
                context.create(ast::Assignment { target, value }).id()
            }
            / expr()

        pub rule program() -> ast::Id
            = items:(statement() ++ semicolon()) semicolon()? ![_] {
                let root = if items.len() == 1 {
                    items[0]
                } else {
                    context.create(ast::Sequence { items }).id()
                };
                context.set_ast_root(root);
                root
            }
    }
}

fn binary(context: &Context, op: ast::BiOpKind, lhs: ast::Id, rhs: ast::Id) -> ast::Id {
    context.create(ast::BinaryOp { op, lhs, rhs }).id()
}

/// Buffers the whole token stream from the bridge, then runs the
/// generated grammar over it. The grammar recurses once per parenthesis or
/// prefix `-`, so nesting beyond `max_nesting` is refused up front.
#[derive(Debug)]
pub struct PegEngine {
    max_nesting: usize,
}

impl PegEngine {
    pub fn with_max_nesting(max_nesting: usize) -> Self {
        Self { max_nesting }
    }

    fn check_nesting(&self, tokens: &[Token], spans: &[Range<usize>]) -> Result<(), ParseError> {
        let mut opens = Vec::new();
        let mut level = 0;
        let mut run = 0;
        let mut prev: Option<TokenKind> = None;
        for (token, span) in tokens.iter().zip(spans) {
            match token.kind {
                TokenKind::Minus if !ends_operand(prev) => run += 1,
                TokenKind::LParen => {
                    opens.push(level);
                    level += run + 1;
                    run = 0;
                }
                TokenKind::RParen => {
                    level = opens.pop().unwrap_or(0);
                    run = 0;
                }
                _ => run = 0,
            }
            if level + run > self.max_nesting {
                return Err(ParseError::TooDeep {
                    offset: span.start,
                    limit: self.max_nesting,
                });
            }
            prev = Some(token.kind);
        }
        Ok(())
    }
}

impl Default for PegEngine {
    fn default() -> Self {
        Self::with_max_nesting(DEFAULT_MAX_NESTING)
    }
}

fn ends_operand(kind: Option<TokenKind>) -> bool {
    matches!(
        kind,
        Some(TokenKind::Identifier | TokenKind::IntVal | TokenKind::FixedVal | TokenKind::RParen)
    )
}

impl GrammarEngine for PegEngine {
    fn parse(&mut self, tokens: &mut dyn TokenSource, context: &Context) -> Result<(), ParseError> {
        let mut buffer = Vec::new();
        let mut spans = Vec::new();
        while let Some(token) = tokens.next_token()? {
            buffer.push(token);
            spans.push(tokens.span());
        }
        self.check_nesting(&buffer, &spans)?;
        let end = spans.last().map_or(0, |s| s.end);

        lang_grammar::program(&buffer, context).map_err(|e| ParseError::SyntaxError {
            offset: spans.get(e.location).map_or(end, |s| s.start),
            expected: e.expected.to_string(),
        })?;
        Ok(())
    }
}
