//! Scanner and recursive-descent parser
//!
//! The parser works over the preprocessed buffer: [`lexer`] tokenizes the
//! whole input up front, [`parse`] owns the `Parser` cursor and diagnostics,
//! and the grammar is split by area into `types`, `declarations`,
//! `statements` and `expressions`, all as `impl Parser` blocks. Every tree
//! node in [`ast`] carries its span, origin position and the warning codes
//! suppressed at its start.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
mod types;

pub use lexer::{LexError, Lexer, Token, TokenKind};
pub use parse::{
    Diagnostic, ParseError, Parser, SuppressionEvent, DUPLICATE_MODIFIER, MISSING_SEMICOLON,
};
