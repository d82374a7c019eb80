//! Source-text front end for a C-family object-oriented language.
//!
//! The pipeline has two stages:
//!
//! 1. [`preprocessor`] — handles `#define`/`#undef`, `#if`/`#elif`/`#else`/
//!    `#endif`, `#region`, `#line`, `#pragma warning`, `#error` and
//!    `#warning`. It produces a normalized text with the same length and
//!    newline positions as the input (directive lines and skipped branches
//!    blanked), plus typed [`Section`] records covering the whole buffer.
//! 2. [`parser`] — tokenizes the normalized text and builds a fully
//!    positioned syntax tree by backtracking recursive descent. Fatal
//!    problems abort with an error value; recoverable ones (missing
//!    semicolons at line breaks, duplicate modifiers) accumulate as
//!    [`Diagnostic`]s, honoring `#pragma warning` suppression ranges.
//!
//! [`parse_source`] runs both stages end to end.

pub mod parser;
pub mod preprocessor;

use std::fmt;

use rustc_hash::FxHashSet;

pub use parser::ast;
pub use parser::{
    Diagnostic, LexError, Lexer, ParseError, Parser, SuppressionEvent, Token, TokenKind,
    DUPLICATE_MODIFIER, MISSING_SEMICOLON,
};
pub use preprocessor::sections::{suppression_events, LineTarget, Section, SectionKind};
pub use preprocessor::{preprocess, PreprocessError, PreprocessOutput};

/// Any fatal failure from the pipeline.
#[derive(Debug, Clone)]
pub enum FrontEndError {
    Preprocess(PreprocessError),
    Lex(LexError),
    Parse(ParseError),
}

impl fmt::Display for FrontEndError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontEndError::Preprocess(err) => err.fmt(f),
            FrontEndError::Lex(err) => err.fmt(f),
            FrontEndError::Parse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for FrontEndError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrontEndError::Preprocess(err) => Some(err),
            FrontEndError::Lex(err) => Some(err),
            FrontEndError::Parse(err) => Some(err),
        }
    }
}

impl From<PreprocessError> for FrontEndError {
    fn from(err: PreprocessError) -> Self {
        FrontEndError::Preprocess(err)
    }
}

impl From<LexError> for FrontEndError {
    fn from(err: LexError) -> Self {
        FrontEndError::Lex(err)
    }
}

impl From<ParseError> for FrontEndError {
    fn from(err: ParseError) -> Self {
        FrontEndError::Parse(err)
    }
}

/// Result of running the full pipeline on one source file.
#[derive(Debug)]
pub struct ParsedSource {
    /// Normalized text, section records and final symbol set.
    pub preprocessed: PreprocessOutput,
    /// The syntax tree; `None` for an empty file.
    pub unit: Option<ast::CompilationUnit>,
    /// Recoverable diagnostics, after `#pragma warning` suppression.
    pub diagnostics: Vec<Diagnostic>,
}

/// Preprocesses and parses one source file. `symbols` seeds the
/// preprocessor's symbol set.
pub fn parse_source(
    file: &str,
    source: &str,
    symbols: FxHashSet<String>,
) -> Result<ParsedSource, FrontEndError> {
    let preprocessed = preprocess(file, source, symbols)?;
    let events = suppression_events(&preprocessed.sections);
    let tokens = Lexer::new(&preprocessed.text).tokenize()?;
    let mut parser = Parser::new(file, tokens).with_suppressions(events);
    let unit = parser.parse_unit()?;
    Ok(ParsedSource {
        preprocessed,
        unit,
        diagnostics: parser.take_diagnostics(),
    })
}

/// Parses a standalone expression (no preprocessing). Returns `None` for
/// empty input.
pub fn parse_expression_text(
    file: &str,
    source: &str,
) -> Result<Option<ast::Expr>, FrontEndError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(file, tokens);
    Ok(parser.parse_standalone_expression()?)
}
