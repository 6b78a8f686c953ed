// SPDX-License-Identifier: Unlicense
pub mod arena;
pub mod ast;
pub mod bridge;
pub mod config;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;

pub use driver::Driver;
pub use error::ParseError;
