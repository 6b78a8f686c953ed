// SPDX-License-Identifier: Unlicense
use std::io::Read;
use std::path::Path;

use anyhow::Context as _;
use tracing::debug;

use crate::arena::AstArena;
use crate::ast::{self, Node};
use crate::bridge::LexicalBridge;
use crate::config::DriverOptions;
use crate::error::ParseError;
use crate::lexer::{LogosLexer, RawLexer};
use crate::parser::{Context, GrammarEngine, PegEngine};

/// `Idle` until the first parse, `Parsing` while the lexer is attached, then
/// the outcome of the latest parse until the next one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    #[default]
    Idle,
    Parsing,
    Completed,
    Failed,
}

/// Owns the arena for every parse run through it. Handles returned by
/// `build_ast*` stay valid for as long as the driver lives.
#[derive(Debug, Default)]
pub struct Driver {
    arena: AstArena,
    root: Option<ast::Id>,
    state: DriverState,
    options: DriverOptions,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DriverOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> DriverOptions {
        self.options
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Root of the latest successful parse; `None` after a failure.
    pub fn root(&self) -> Option<ast::Id> {
        self.root
    }

    pub fn root_node(&self) -> Option<&Node> {
        self.root.and_then(|id| self.arena.node(id))
    }

    pub fn arena(&self) -> &AstArena {
        &self.arena
    }

    pub fn build_ast<R: Read>(&mut self, mut input: R) -> Result<ast::Id, ParseError> {
        let mut source = String::new();
        if let Err(e) = input.read_to_string(&mut source) {
            self.root = None;
            self.state = DriverState::Failed;
            return Err(e.into());
        }
        self.build_ast_from_str(&source)
    }

    pub fn build_ast_from_str(&mut self, source: &str) -> Result<ast::Id, ParseError> {
        let mut engine = PegEngine::with_max_nesting(self.options.max_nesting);
        self.build_ast_with(LogosLexer::new(source), &mut engine)
    }

    /// Runs `engine` over `lexer` to completion. Nodes from earlier calls stay
    /// alive; only the root is reset.
    pub fn build_ast_with<'src, L, G>(
        &mut self,
        lexer: L,
        engine: &mut G,
    ) -> Result<ast::Id, ParseError>
    where
        L: RawLexer<'src>,
        G: GrammarEngine + ?Sized,
    {
        self.root = None;
        let session = Session::attach(self);
        let outcome = {
            let mut bridge = LexicalBridge::new(lexer, &session.context, session.options.numeric_policy);
            engine.parse(&mut bridge, &session.context)
        };
        session.finish(outcome)
    }
}

/// Lexer binding for one `build_ast_with` call. The arena is lent to the
/// parse context and handed back when the session drops, whichever way the
/// parse ended.
struct Session<'d> {
    driver: &'d mut Driver,
    context: Context,
    options: DriverOptions,
}

impl<'d> Session<'d> {
    fn attach(driver: &'d mut Driver) -> Self {
        let arena = std::mem::take(&mut driver.arena);
        driver.state = DriverState::Parsing;
        debug!(nodes = arena.len(), "lexer attached");
        Self {
            options: driver.options,
            context: Context::new(arena),
            driver,
        }
    }

    fn finish(self, outcome: Result<(), ParseError>) -> Result<ast::Id, ParseError> {
        let result = outcome.and_then(|()| self.context.ast_root().ok_or(ParseError::MissingRoot));
        match &result {
            Ok(root) => {
                self.driver.state = DriverState::Completed;
                self.driver.root = Some(*root);
                debug!(root = %self.context.arena.borrow().render(*root), "root recorded");
            }
            Err(e) => {
                self.driver.state = DriverState::Failed;
                debug!(error = %e, "parse failed");
            }
        }
        result
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.driver.arena = self.context.arena.take();
        if self.driver.state == DriverState::Parsing {
            self.driver.state = DriverState::Failed;
        }
        debug!(nodes = self.driver.arena.len(), state = ?self.driver.state, "lexer detached");
    }
}

pub fn read_file(source: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source.display()))
}

pub fn parse_file(source: &Path) -> anyhow::Result<(Driver, ast::Id)> {
    parse_file_with(source, DriverOptions::default())
}

pub fn parse_file_with(source: &Path, options: DriverOptions) -> anyhow::Result<(Driver, ast::Id)> {
    let src = read_file(source)?;
    let mut driver = Driver::with_options(options);
    let root = driver
        .build_ast_from_str(&src)
        .with_context(|| format!("failed to parse {}", source.display()))?;
    Ok((driver, root))
}
