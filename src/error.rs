// SPDX-License-Identifier: Unlicense
use thiserror::Error;

/// Ways a single `build_ast` call can fail. No partial tree is ever exposed
/// alongside one of these.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unrecognized input {text:?} at byte {offset}")]
    LexicalAmbiguity { offset: usize, text: String },

    #[error("syntax error at byte {offset}: expected {expected}")]
    SyntaxError { offset: usize, expected: String },

    #[error("malformed numeric literal {lexeme:?} at byte {offset}")]
    MalformedNumber { offset: usize, lexeme: String },

    #[error("nesting deeper than {limit} levels at byte {offset}")]
    TooDeep { offset: usize, limit: usize },

    #[error("grammar engine finished without recording a root")]
    MissingRoot,

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}
