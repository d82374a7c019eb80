//! Type grammar
//!
//! ```text
//! type          ::= non_array_type rank_specifier*
//! non_array_type::= primitive | named_type
//! named_type    ::= segment ('.' segment)*
//! segment       ::= identifier ['<' type (',' type)* '>']
//! rank_specifier::= '[' ','* ']'
//! ```
//!
//! Closing `>`s are consumed through [`Parser::consume_generic_close`], which
//! splits `>>`-family tokens one `>` at a time so that `A<B<C>>` parses
//! without lexer help.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    pub(crate) fn primitive_kind_here(&self) -> Option<PrimitiveKind> {
        match self.peek().kind {
            TokenKind::Bool => Some(PrimitiveKind::Bool),
            TokenKind::Byte => Some(PrimitiveKind::Byte),
            TokenKind::Short => Some(PrimitiveKind::Short),
            TokenKind::Int => Some(PrimitiveKind::Int),
            TokenKind::Long => Some(PrimitiveKind::Long),
            TokenKind::Float => Some(PrimitiveKind::Float),
            TokenKind::Double => Some(PrimitiveKind::Double),
            TokenKind::Char => Some(PrimitiveKind::Char),
            TokenKind::Str => Some(PrimitiveKind::String),
            TokenKind::Object => Some(PrimitiveKind::Object),
            _ => None,
        }
    }

    /// True when the current token can begin a type.
    pub(crate) fn check_type_start(&self) -> bool {
        self.primitive_kind_here().is_some()
            || matches!(self.peek().kind, TokenKind::Ident(_))
    }

    /// Full type with array rank suffixes. `void` is not a type here; method
    /// return positions go through [`Parser::parse_return_type`].
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.begin_node();
        let mut parsed = self.parse_non_array_type()?;

        while self.check(&TokenKind::LBracket) && self.rank_specifier_ahead() {
            self.advance();
            let mut rank = 1;
            while self.match_kind(&TokenKind::Comma) {
                rank += 1;
            }
            self.expect(&TokenKind::RBracket, "expected ']' in array type")?;
            parsed = TypeRef::Array {
                element: Box::new(parsed),
                rank,
                info: self.node_info(start),
            };
        }

        Ok(parsed)
    }

    /// Return type of a method or delegate: `void` or any type.
    pub(crate) fn parse_return_type(&mut self) -> Result<TypeRef, ParseError> {
        if self.check(&TokenKind::Void) {
            let token = self.advance();
            let start = self.begin_node_at(&token);
            return Ok(TypeRef::Primitive {
                kind: PrimitiveKind::Void,
                info: self.node_info(start),
            });
        }
        self.parse_type()
    }

    /// Type without array rank suffixes. Creation expressions use this
    /// directly so that `new T[n]` keeps the `[n]` as sizes.
    pub(crate) fn parse_non_array_type(&mut self) -> Result<TypeRef, ParseError> {
        let start = self.begin_node();

        if let Some(kind) = self.primitive_kind_here() {
            self.advance();
            return Ok(TypeRef::Primitive {
                kind,
                info: self.node_info(start),
            });
        }

        let mut segments = Vec::new();
        let mut last_close;
        loop {
            let name = self.expect_identifier("expected type name")?;
            let type_args = if self.check(&TokenKind::Lt) {
                let (args, close_end) = self.parse_type_arguments()?;
                last_close = Some(close_end);
                args
            } else {
                last_close = None;
                Vec::new()
            };
            segments.push(TypeSegment { name, type_args });
            if !self.match_kind(&TokenKind::Dot) {
                break;
            }
        }

        let info = match last_close {
            Some(end) => self.node_info_to(start, end),
            None => self.node_info(start),
        };
        Ok(TypeRef::Named { segments, info })
    }

    /// Parses `<T, U, ...>` including the `<`. Returns the arguments and the
    /// end offset of the consumed closing `>` (which may be half of a split
    /// `>>`).
    pub(crate) fn parse_type_arguments(
        &mut self,
    ) -> Result<(Vec<TypeRef>, usize), ParseError> {
        self.expect(&TokenKind::Lt, "expected '<'")?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        let close_end = self.consume_generic_close()?;
        Ok((args, close_end))
    }

    /// Speculative type parse: on failure the cursor is restored and `None`
    /// is returned.
    pub(crate) fn try_parse_type(&mut self) -> Option<TypeRef> {
        if !self.check_type_start() {
            return None;
        }
        let point = self.save();
        match self.parse_type() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.restore(point);
                None
            }
        }
    }

    /// Whether the `[` at the cursor opens an array rank specifier (only
    /// commas before the `]`) rather than an element access.
    fn rank_specifier_ahead(&self) -> bool {
        let mut offset = 1;
        loop {
            match self.peek_ahead(offset).map(|t| &t.kind) {
                Some(TokenKind::Comma) => offset += 1,
                Some(TokenKind::RBracket) => return true,
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn type_of(input: &str) -> TypeRef {
        let tokens = Lexer::new(input).tokenize().expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        p.parse_type().expect("type parse failed")
    }

    #[test]
    fn test_primitive_type() {
        assert!(matches!(
            type_of("int"),
            TypeRef::Primitive {
                kind: PrimitiveKind::Int,
                ..
            }
        ));
    }

    #[test]
    fn test_qualified_generic_type() {
        let parsed = type_of("a.b.List<int>");
        let TypeRef::Named { segments, .. } = parsed else {
            panic!("expected named type");
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2].name, "List");
        assert_eq!(segments[2].type_args.len(), 1);
    }

    #[test]
    fn test_nested_generics_split_shr() {
        let parsed = type_of("Map<string, List<int>>");
        let TypeRef::Named { segments, info } = parsed else {
            panic!("expected named type");
        };
        assert_eq!(segments[0].type_args.len(), 2);
        // Span runs through the second half of the split `>>`.
        assert_eq!(info.span.end, 22);
    }

    #[test]
    fn test_array_ranks() {
        let parsed = type_of("int[,][]");
        let TypeRef::Array { element, rank, .. } = parsed else {
            panic!("expected array");
        };
        assert_eq!(rank, 1);
        let TypeRef::Array { rank, .. } = *element else {
            panic!("expected inner array");
        };
        assert_eq!(rank, 2);
    }

    #[test]
    fn test_try_parse_type_restores_on_failure() {
        let tokens = Lexer::new("List<int + 1").tokenize().expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.try_parse_type().is_none());
        assert!(p.check_ident("List"));
    }
}
