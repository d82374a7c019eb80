//! Parser core: token cursor, speculation, diagnostics
//!
//! The grammar itself is implemented as `impl Parser` blocks spread over
//! `types.rs`, `declarations.rs`, `statements.rs` and `expressions.rs`; this
//! module owns the shared machinery they build on.
//!
//! Speculation works through [`RestorePoint`]s: a saved cursor position plus
//! the length of the token-split journal. Restoring rewinds the cursor and
//! undoes any `>>`-family splits performed since the point was taken, so
//! nested generic argument lists can be speculated over safely.

use std::fmt;

use crate::parser::ast::{NodeInfo, Span};
use crate::parser::lexer::{LexError, Token, TokenKind};

/// Recoverable diagnostic code: statement not terminated by `;`.
pub const MISSING_SEMICOLON: u32 = 1001;
/// Recoverable diagnostic code: modifier written more than once.
pub const DUPLICATE_MODIFIER: u32 = 1002;

/// Every code the parser can report recoverably. A blanket
/// `#pragma warning disable` (no numbers) expands to this list.
pub(crate) const RECOVERABLE_CODES: [u32; 2] = [MISSING_SEMICOLON, DUPLICATE_MODIFIER];

/// Fatal parse failure. Produced once per parse; recoverable problems go to
/// the diagnostics sink instead.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            line: err.line,
            column: err.column,
        }
    }
}

/// Recoverable diagnostic with a numeric code.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: u32,
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// One `#pragma warning` boundary, in buffer order. Empty `codes` means all
/// recoverable codes.
#[derive(Debug, Clone)]
pub struct SuppressionEvent {
    pub offset: usize,
    pub disable: bool,
    pub codes: Vec<u32>,
}

/// Snapshot of a node's start, taken before its first token is consumed and
/// sealed into a [`NodeInfo`] once the node's last token has been consumed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeStart {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Saved cursor for speculation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RestorePoint {
    position: usize,
    splits_len: usize,
}

pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Journal of generic-close token splits: (index, token before split).
    splits: Vec<(usize, Token)>,
    pub(crate) file: String,
    diagnostics: Vec<Diagnostic>,
    suppressions: Vec<SuppressionEvent>,
}

impl Parser {
    pub fn new(file: impl Into<String>, mut tokens: Vec<Token>) -> Self {
        // The cursor relies on a trailing Eof sentinel.
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            tokens.push(Token {
                kind: TokenKind::Eof,
                start: tokens.last().map(|t| t.end).unwrap_or(0),
                end: tokens.last().map(|t| t.end).unwrap_or(0),
                line: tokens.last().map(|t| t.line).unwrap_or(1),
                column: tokens.last().map(|t| t.column).unwrap_or(1),
                newline_before: false,
                doc_comment: None,
            });
        }
        Self {
            tokens,
            position: 0,
            splits: Vec::new(),
            file: file.into(),
            diagnostics: Vec::new(),
            suppressions: Vec::new(),
        }
    }

    /// Installs the `#pragma warning` boundaries computed by the driver.
    /// Events must be in increasing offset order.
    pub fn with_suppressions(mut self, suppressions: Vec<SuppressionEvent>) -> Self {
        self.suppressions = suppressions;
        self
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // --- cursor -----------------------------------------------------------

    pub(crate) fn peek(&self) -> &Token {
        // The token vector always ends with Eof.
        self.tokens
            .get(self.position)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    pub(crate) fn peek_ahead(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().kind == *kind
    }

    /// True when the current token is the given contextual keyword (lexed as
    /// an identifier).
    pub(crate) fn check_ident(&self, name: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(word) if word == name)
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_ident(&mut self, name: &str) -> bool {
        if self.check_ident(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        ParseError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }

    pub(crate) fn expect(
        &mut self,
        kind: &TokenKind,
        context: &str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("{}, found {}", context, self.peek().kind.describe())))
        }
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("{}, found {}", context, other.describe()))),
        }
    }

    // --- speculation ------------------------------------------------------

    pub(crate) fn save(&self) -> RestorePoint {
        RestorePoint {
            position: self.position,
            splits_len: self.splits.len(),
        }
    }

    pub(crate) fn restore(&mut self, point: RestorePoint) {
        self.position = point.position;
        while self.splits.len() > point.splits_len {
            if let Some((index, original)) = self.splits.pop() {
                self.tokens[index] = original;
            }
        }
    }

    /// Consumes one `>` closing a generic argument list. A plain `>` is
    /// consumed whole; a `>>`, `>>>`, `>>=` or `>=` token is split: its first
    /// `>` is consumed and the remainder replaces it in the stream. Splits
    /// are journaled and undone by [`Parser::restore`]. Returns the end
    /// offset of the consumed `>`.
    pub(crate) fn consume_generic_close(&mut self) -> Result<usize, ParseError> {
        let token = self.peek().clone();
        let remainder = match token.kind {
            TokenKind::Gt => {
                self.advance();
                return Ok(token.end);
            }
            TokenKind::Shr => TokenKind::Gt,
            TokenKind::ShrUnsigned => TokenKind::Shr,
            TokenKind::ShrEq => TokenKind::Ge,
            TokenKind::Ge => TokenKind::Eq,
            _ => {
                return Err(self.error_here(format!(
                    "expected '>' to close type arguments, found {}",
                    token.kind.describe()
                )))
            }
        };
        let index = self.position;
        self.splits.push((index, token.clone()));
        self.tokens[index] = Token {
            kind: remainder,
            start: token.start + 1,
            end: token.end,
            line: token.line,
            column: token.column + 1,
            newline_before: false,
            doc_comment: None,
        };
        Ok(token.start + 1)
    }

    // --- node bookkeeping ---------------------------------------------------

    /// Start snapshot at the current token.
    pub(crate) fn begin_node(&self) -> NodeStart {
        let token = self.peek();
        NodeStart {
            offset: token.start,
            line: token.line,
            column: token.column,
        }
    }

    /// Start snapshot at an already-consumed token.
    pub(crate) fn begin_node_at(&self, token: &Token) -> NodeStart {
        NodeStart {
            offset: token.start,
            line: token.line,
            column: token.column,
        }
    }

    /// Seals a node whose last token has just been consumed.
    pub(crate) fn node_info(&self, start: NodeStart) -> NodeInfo {
        self.node_info_to(start, self.previous().end)
    }

    /// Seals a node ending at an explicit offset (used where a split `>` is
    /// the last character of the node).
    pub(crate) fn node_info_to(&self, start: NodeStart, end: usize) -> NodeInfo {
        NodeInfo {
            span: Span::new(start.offset, end.max(start.offset)),
            file: self.file.clone(),
            line: start.line,
            column: start.column,
            disabled_warnings: self.disabled_at(start.offset),
        }
    }

    // --- diagnostics --------------------------------------------------------

    /// Codes disabled at the given offset by the `#pragma warning` boundaries
    /// seen so far in the buffer.
    pub(crate) fn disabled_at(&self, offset: usize) -> Vec<u32> {
        let mut disabled: Vec<u32> = Vec::new();
        for event in &self.suppressions {
            if event.offset > offset {
                break;
            }
            let codes: &[u32] = if event.codes.is_empty() {
                &RECOVERABLE_CODES
            } else {
                &event.codes
            };
            if event.disable {
                for &code in codes {
                    if !disabled.contains(&code) {
                        disabled.push(code);
                    }
                }
            } else {
                disabled.retain(|code| !codes.contains(code));
            }
        }
        disabled.sort_unstable();
        disabled
    }

    /// Records a recoverable diagnostic at the given token, unless an active
    /// `#pragma warning disable` covers its code.
    pub(crate) fn report(&mut self, code: u32, message: impl Into<String>, at: &Token) {
        if self.disabled_at(at.start).contains(&code) {
            return;
        }
        self.diagnostics.push(Diagnostic {
            code,
            message: message.into(),
            offset: at.start,
            line: at.line,
            column: at.column,
        });
    }

    /// Consumes the statement-terminating `;`. A missing semicolon is
    /// recoverable only when the offending token starts a new line.
    pub(crate) fn expect_semicolon(&mut self, context: &str) -> Result<(), ParseError> {
        if self.match_kind(&TokenKind::Semicolon) {
            return Ok(());
        }
        let token = self.peek().clone();
        if token.newline_before {
            self.report(
                MISSING_SEMICOLON,
                format!("missing ';' {}", context),
                &token,
            );
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected ';' {}, found {}",
                context,
                token.kind.describe()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn parser(input: &str) -> Parser {
        let tokens = Lexer::new(input).tokenize().expect("lexing failed");
        Parser::new("test", tokens)
    }

    #[test]
    fn test_restore_rewinds_cursor() {
        let mut p = parser("a b c");
        let point = p.save();
        p.advance();
        p.advance();
        assert!(p.check_ident("c"));
        p.restore(point);
        assert!(p.check_ident("a"));
    }

    #[test]
    fn test_generic_close_splits_shr() {
        let mut p = parser("a >> b");
        p.advance(); // a
        let end = p.consume_generic_close().expect("first close");
        assert_eq!(end, 3);
        assert!(p.check(&TokenKind::Gt));
        let end = p.consume_generic_close().expect("second close");
        assert_eq!(end, 4);
        assert!(p.check_ident("b"));
    }

    #[test]
    fn test_restore_undoes_splits() {
        let mut p = parser("a >> b");
        p.advance();
        let point = p.save();
        p.consume_generic_close().expect("close");
        assert!(p.check(&TokenKind::Gt));
        p.restore(point);
        assert!(p.check(&TokenKind::Shr));
    }

    #[test]
    fn test_split_shr_eq_leaves_ge_then_eq() {
        let mut p = parser("x >>= y");
        p.advance();
        p.consume_generic_close().expect("close");
        assert!(p.check(&TokenKind::Ge));
        p.consume_generic_close().expect("close");
        assert!(p.check(&TokenKind::Eq));
    }

    #[test]
    fn test_missing_semicolon_at_end_of_input_needs_a_newline() {
        let mut p = parser("x");
        p.advance();
        assert!(p.expect_semicolon("after statement").is_err());

        let mut p = parser("x\n");
        p.advance();
        assert!(p.expect_semicolon("after statement").is_ok());
        assert_eq!(p.diagnostics()[0].code, MISSING_SEMICOLON);
    }

    #[test]
    fn test_suppression_events() {
        let p = parser("x").with_suppressions(vec![
            SuppressionEvent {
                offset: 10,
                disable: true,
                codes: vec![MISSING_SEMICOLON],
            },
            SuppressionEvent {
                offset: 50,
                disable: false,
                codes: vec![],
            },
        ]);
        assert!(p.disabled_at(5).is_empty());
        assert_eq!(p.disabled_at(20), vec![MISSING_SEMICOLON]);
        assert!(p.disabled_at(60).is_empty());
    }
}
