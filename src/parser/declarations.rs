//! Declaration parsing: compilation units, packages, types and members
//!
//! ```text
//! unit        ::= using_directive* declaration* EOF
//! declaration ::= annotations modifiers
//!                 (package | class | interface | enum | delegate)
//! member      ::= annotations modifiers
//!                 (nested_type | destructor | constructor
//!                  | method | property | indexer | field)
//! ```
//!
//! Member dispatch follows the shape of the head: after the return type and
//! name, `(` selects a method, `{` a property, `this[` an indexer, and
//! `=`/`,` a field. A bare `;` is auto-property shorthand when the member is
//! public or protected, otherwise a field.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{NodeStart, ParseError, Parser, DUPLICATE_MODIFIER};

impl Parser {
    /// Parses one compilation unit. Returns `None` only when the token
    /// stream is empty.
    pub fn parse_unit(&mut self) -> Result<Option<CompilationUnit>, ParseError> {
        if self.is_at_end() {
            return Ok(None);
        }
        let start = self.begin_node();

        let mut usings = Vec::new();
        while self.check(&TokenKind::Using) {
            usings.push(self.parse_using_directive()?);
        }

        let mut declarations = Vec::new();
        while !self.is_at_end() {
            declarations.push(self.parse_declaration()?);
        }

        Ok(Some(CompilationUnit {
            usings,
            declarations,
            info: self.node_info(start),
        }))
    }

    fn parse_using_directive(&mut self) -> Result<UsingDirective, ParseError> {
        let start = self.begin_node();
        self.expect(&TokenKind::Using, "expected 'using'")?;
        let path = self.parse_qualified_name()?;
        self.expect_semicolon("after using directive")?;
        Ok(UsingDirective {
            path,
            info: self.node_info(start),
        })
    }

    pub(crate) fn parse_qualified_name(&mut self) -> Result<Vec<String>, ParseError> {
        let mut path = vec![self.expect_identifier("expected name")?];
        while self.match_kind(&TokenKind::Dot) {
            path.push(self.expect_identifier("expected name after '.'")?);
        }
        Ok(path)
    }

    pub(crate) fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let start = self.begin_node();
        let doc = self.peek().doc_comment.clone();
        let annotations = self.parse_annotation_sections()?;
        let modifiers = self.parse_modifiers();
        self.parse_declaration_tail(start, doc, annotations, modifiers)
    }

    fn parse_declaration_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> Result<Declaration, ParseError> {
        match self.peek().kind {
            TokenKind::Package => {
                if !modifiers.is_empty() {
                    return Err(self.error_here("modifiers are not allowed on a package"));
                }
                self.parse_package_tail(start, doc, annotations)
            }
            TokenKind::Class => {
                self.advance();
                self.parse_class_like_tail(start, doc, annotations, modifiers, false)
            }
            TokenKind::Interface => {
                self.advance();
                self.parse_class_like_tail(start, doc, annotations, modifiers, true)
            }
            TokenKind::Enum => self.parse_enum_tail(start, doc, annotations, modifiers),
            TokenKind::Delegate => self.parse_delegate_tail(start, doc, annotations, modifiers),
            _ => Err(self.error_here(format!(
                "expected a declaration, found {}",
                self.peek().kind.describe()
            ))),
        }
    }

    fn parse_package_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
    ) -> Result<Declaration, ParseError> {
        self.advance();
        let name = self.parse_qualified_name()?;
        self.expect(&TokenKind::LBrace, "expected '{' after package name")?;
        let mut declarations = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            declarations.push(self.parse_declaration()?);
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close package")?;
        Ok(Declaration::Package {
            name,
            annotations,
            declarations,
            doc,
            info: self.node_info(start),
        })
    }

    fn parse_class_like_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
        is_interface: bool,
    ) -> Result<Declaration, ParseError> {
        let name = self.expect_identifier("expected type name")?;
        let type_params = self.parse_type_params()?;

        let mut bases = Vec::new();
        if self.match_kind(&TokenKind::Colon) {
            loop {
                bases.push(self.parse_type()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let constraints = self.parse_constraints()?;

        self.expect(&TokenKind::LBrace, "expected '{' to open type body")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            members.extend(self.parse_member(&name, is_interface)?);
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close type body")?;

        let info = self.node_info(start);
        Ok(if is_interface {
            Declaration::Interface {
                name,
                modifiers,
                annotations,
                type_params,
                bases,
                constraints,
                members,
                doc,
                info,
            }
        } else {
            Declaration::Class {
                name,
                modifiers,
                annotations,
                type_params,
                bases,
                constraints,
                members,
                doc,
                info,
            }
        })
    }

    fn parse_enum_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> Result<Declaration, ParseError> {
        self.advance();
        let name = self.expect_identifier("expected enum name")?;
        self.expect(&TokenKind::LBrace, "expected '{' to open enum body")?;

        let mut constants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let const_start = self.begin_node();
            let const_doc = self.peek().doc_comment.clone();
            let const_annotations = self.parse_annotation_sections()?;
            let const_name = self.expect_identifier("expected enum constant name")?;
            let value = if self.match_kind(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            constants.push(EnumConstant {
                name: const_name,
                annotations: const_annotations,
                value,
                doc: const_doc,
                info: self.node_info(const_start),
            });
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close enum body")?;

        Ok(Declaration::Enum {
            name,
            modifiers,
            annotations,
            constants,
            doc,
            info: self.node_info(start),
        })
    }

    fn parse_delegate_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> Result<Declaration, ParseError> {
        self.advance();
        let return_type = self.parse_return_type()?;
        let name = self.expect_identifier("expected delegate name")?;
        let type_params = self.parse_type_params()?;
        let params = self.parse_param_list(&TokenKind::LParen, &TokenKind::RParen)?;
        let constraints = self.parse_constraints()?;
        self.expect_semicolon("after delegate declaration")?;

        Ok(Declaration::Delegate {
            name,
            modifiers,
            annotations,
            return_type,
            type_params,
            params,
            constraints,
            doc,
            info: self.node_info(start),
        })
    }

    // --- shared pieces ------------------------------------------------------

    /// Zero or more `[Name(args), ...]` sections; their annotations
    /// accumulate into one list.
    pub(crate) fn parse_annotation_sections(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = Vec::new();
        while self.check(&TokenKind::LBracket) {
            self.advance();
            loop {
                let start = self.begin_node();
                let name = self.expect_identifier("expected annotation name")?;
                let mut arguments = Vec::new();
                if self.match_kind(&TokenKind::LParen) {
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.match_kind(&TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(&TokenKind::RParen, "expected ')' after annotation arguments")?;
                }
                annotations.push(Annotation {
                    name,
                    arguments,
                    info: self.node_info(start),
                });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket, "expected ']' to close annotation section")?;
        }
        Ok(annotations)
    }

    /// Modifier run. A repeated modifier is reported and dropped rather than
    /// failing the parse. `partial` is contextual: it only counts as a
    /// modifier immediately before `class`, `interface` or `enum`.
    pub(crate) fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek().kind {
                TokenKind::Public => Modifier::Public,
                TokenKind::Protected => Modifier::Protected,
                TokenKind::Private => Modifier::Private,
                TokenKind::Static => Modifier::Static,
                TokenKind::Abstract => Modifier::Abstract,
                TokenKind::Virtual => Modifier::Virtual,
                TokenKind::Override => Modifier::Override,
                TokenKind::Readonly => Modifier::Readonly,
                _ if self.check_ident("partial") && self.partial_type_follows() => {
                    Modifier::Partial
                }
                _ => return modifiers,
            };
            let token = self.advance();
            if modifiers.contains(&modifier) {
                self.report(
                    DUPLICATE_MODIFIER,
                    format!("duplicate modifier '{}'", modifier.as_str()),
                    &token,
                );
            } else {
                modifiers.push(modifier);
            }
        }
    }

    fn partial_type_follows(&self) -> bool {
        matches!(
            self.peek_ahead(1).map(|t| &t.kind),
            Some(TokenKind::Class | TokenKind::Interface | TokenKind::Enum)
        )
    }

    fn parse_type_params(&mut self) -> Result<Vec<TypeParam>, ParseError> {
        let mut type_params = Vec::new();
        if !self.check(&TokenKind::Lt) {
            return Ok(type_params);
        }
        self.advance();
        loop {
            let start = self.begin_node();
            let name = self.expect_identifier("expected type parameter name")?;
            type_params.push(TypeParam {
                name,
                info: self.node_info(start),
            });
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.consume_generic_close()?;
        Ok(type_params)
    }

    fn parse_constraints(&mut self) -> Result<Vec<Constraint>, ParseError> {
        let mut constraints = Vec::new();
        while self.check_ident("where") {
            let start = self.begin_node();
            self.advance();
            let type_param = self.expect_identifier("expected type parameter in constraint")?;
            self.expect(&TokenKind::Colon, "expected ':' in constraint clause")?;
            let mut bounds = Vec::new();
            loop {
                bounds.push(self.parse_type()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            constraints.push(Constraint {
                type_param,
                bounds,
                info: self.node_info(start),
            });
        }
        Ok(constraints)
    }

    pub(crate) fn parse_param_list(
        &mut self,
        open: &TokenKind,
        close: &TokenKind,
    ) -> Result<Vec<Param>, ParseError> {
        self.expect(open, "expected parameter list")?;
        let mut params = Vec::new();
        if !self.check(close) {
            loop {
                let start = self.begin_node();
                let param_type = self.parse_type()?;
                let name = self.expect_identifier("expected parameter name")?;
                params.push(Param {
                    name,
                    param_type: Some(param_type),
                    info: self.node_info(start),
                });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(close, "expected end of parameter list")?;
        Ok(params)
    }

    // --- members ------------------------------------------------------------

    /// Parses one member head. A field with several declarators expands into
    /// one `Member::Field` per declarator, hence the Vec.
    fn parse_member(
        &mut self,
        enclosing: &str,
        in_interface: bool,
    ) -> Result<Vec<Member>, ParseError> {
        let start = self.begin_node();
        let doc = self.peek().doc_comment.clone();
        let annotations = self.parse_annotation_sections()?;
        let modifiers = self.parse_modifiers();

        // Nested type
        if matches!(
            self.peek().kind,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::Delegate
                | TokenKind::Package
        ) {
            let decl = self.parse_declaration_tail(start, doc, annotations, modifiers)?;
            return Ok(vec![Member::Nested(decl)]);
        }

        // Destructor
        if self.check(&TokenKind::Tilde) {
            self.advance();
            let name = self.expect_identifier("expected type name after '~'")?;
            if name != enclosing {
                return Err(self.error_here(format!(
                    "destructor name '{}' does not match enclosing type '{}'",
                    name, enclosing
                )));
            }
            self.expect(&TokenKind::LParen, "expected '(' after destructor name")?;
            self.expect(&TokenKind::RParen, "expected ')' in destructor declaration")?;
            let body = self.parse_block()?;
            return Ok(vec![Member::Destructor {
                name,
                body,
                modifiers,
                annotations,
                doc,
                info: self.node_info(start),
            }]);
        }

        // Constructor: the enclosing type's name followed by a parameter
        // list, possibly with type parameters in between.
        if self.check_ident(enclosing) && self.constructor_ahead() {
            return Ok(vec![self.parse_constructor_tail(
                start,
                doc,
                annotations,
                modifiers,
            )?]);
        }

        let member_type = self.parse_return_type()?;

        // Indexer
        if self.check(&TokenKind::This) {
            self.advance();
            let parameters = self.parse_param_list(&TokenKind::LBracket, &TokenKind::RBracket)?;
            let sigil = self.parse_setter_sigil(&modifiers)?;
            let (get_accessor, set_accessor) =
                self.parse_accessor_block(sigil, in_interface, start)?;
            return Ok(vec![Member::Indexer {
                parameters,
                value_type: member_type,
                get_accessor,
                set_accessor,
                modifiers,
                annotations,
                doc,
                info: self.node_info(start),
            }]);
        }

        let name = self.expect_identifier("expected member name")?;

        // Method (with optional type parameters)
        if self.check(&TokenKind::LParen) || self.check(&TokenKind::Lt) {
            return Ok(vec![self.parse_method_tail(
                start,
                doc,
                annotations,
                modifiers,
                member_type,
                name,
                in_interface,
            )?]);
        }

        // Property: explicit accessor block or setter sigil
        if self.check(&TokenKind::LBrace) || self.sigil_here() {
            let sigil = self.parse_setter_sigil(&modifiers)?;
            let (get_accessor, set_accessor) =
                self.parse_accessor_block(sigil, in_interface, start)?;
            return Ok(vec![Member::Property {
                name,
                property_type: member_type,
                get_accessor,
                set_accessor,
                modifiers,
                annotations,
                doc,
                info: self.node_info(start),
            }]);
        }

        // Bare ';' on a public or protected member is auto-property
        // shorthand; everything else ending in ';', '=' or ',' is a field.
        if self.check(&TokenKind::Semicolon)
            && matches!(
                Accessibility::of(&modifiers),
                Accessibility::Public | Accessibility::Protected
            )
        {
            self.advance();
            let info = self.node_info(start);
            return Ok(vec![Member::Property {
                name,
                property_type: member_type,
                get_accessor: Some(self.synthesize_accessor(AccessorKind::Get, None, start)),
                set_accessor: Some(self.synthesize_accessor(AccessorKind::Set, None, start)),
                modifiers,
                annotations,
                doc,
                info,
            }]);
        }

        self.parse_field_tail(start, doc, annotations, modifiers, member_type, name)
    }

    fn constructor_ahead(&mut self) -> bool {
        match self.peek_ahead(1).map(|t| &t.kind) {
            Some(TokenKind::LParen) => true,
            Some(TokenKind::Lt) => {
                let point = self.save();
                self.advance();
                let looks_like_ctor =
                    self.parse_type_params().is_ok() && self.check(&TokenKind::LParen);
                self.restore(point);
                looks_like_ctor
            }
            _ => false,
        }
    }

    fn parse_constructor_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> Result<Member, ParseError> {
        let name = self.expect_identifier("expected constructor name")?;
        let type_params = self.parse_type_params()?;
        let params = self.parse_param_list(&TokenKind::LParen, &TokenKind::RParen)?;
        let constraints = self.parse_constraints()?;
        let body = self.parse_block()?;
        Ok(Member::Constructor {
            name,
            type_params,
            params,
            constraints,
            body,
            modifiers,
            annotations,
            doc,
            info: self.node_info(start),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_method_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
        return_type: TypeRef,
        name: String,
        in_interface: bool,
    ) -> Result<Member, ParseError> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_param_list(&TokenKind::LParen, &TokenKind::RParen)?;
        let constraints = self.parse_constraints()?;

        let mut body = None;
        let mut default_value = None;
        if in_interface {
            if self.check(&TokenKind::LBrace) {
                return Err(self.error_here("an interface method cannot have a body"));
            }
            if self.match_kind(&TokenKind::Eq) {
                default_value = Some(self.parse_expression()?);
            }
            self.expect_semicolon("after interface method declaration")?;
        } else if self.check(&TokenKind::LBrace) {
            body = Some(self.parse_block()?);
        } else {
            self.expect_semicolon("after method declaration")?;
        }

        Ok(Member::Method {
            name,
            return_type,
            type_params,
            params,
            constraints,
            body,
            default_value,
            modifiers,
            annotations,
            doc,
            info: self.node_info(start),
        })
    }

    fn parse_field_tail(
        &mut self,
        start: NodeStart,
        doc: Option<String>,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
        field_type: TypeRef,
        first_name: String,
    ) -> Result<Vec<Member>, ParseError> {
        let mut declarators = Vec::new();
        let mut name = first_name;
        loop {
            let initializer = if self.match_kind(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push((name, initializer));
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
            name = self.expect_identifier("expected field name after ','")?;
        }
        self.expect_semicolon("after field declaration")?;

        let info = self.node_info(start);
        let mut members = Vec::new();
        let mut doc = doc;
        for (name, initializer) in declarators {
            members.push(Member::Field {
                name,
                field_type: field_type.clone(),
                initializer,
                modifiers: modifiers.clone(),
                annotations: annotations.clone(),
                doc: doc.take(),
                info: info.clone(),
            });
        }
        Ok(members)
    }

    // --- accessors and sigils -------------------------------------------------

    fn sigil_here(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Caret | TokenKind::Plus)
    }

    /// Consumes a setter-visibility sigil if present: `^` requests a private
    /// setter, `+` a protected one. Legal only when the member's own
    /// accessibility is strictly less restrictive than the requested one.
    fn parse_setter_sigil(
        &mut self,
        modifiers: &[Modifier],
    ) -> Result<Option<Accessibility>, ParseError> {
        let requested = match self.peek().kind {
            TokenKind::Caret => Accessibility::Private,
            TokenKind::Plus => Accessibility::Protected,
            _ => return Ok(None),
        };
        let owner = Accessibility::of(modifiers);
        if owner >= requested {
            return Err(self.error_here(format!(
                "setter sigil requires a less restrictive member: member is {:?}, setter would be {:?}",
                owner, requested
            )));
        }
        self.advance();
        Ok(Some(requested))
    }

    fn synthesize_accessor(
        &self,
        kind: AccessorKind,
        setter_accessibility: Option<Accessibility>,
        start: NodeStart,
    ) -> Accessor {
        let mut modifiers = Vec::new();
        if kind == AccessorKind::Set {
            match setter_accessibility {
                Some(Accessibility::Private) => modifiers.push(Modifier::Private),
                Some(Accessibility::Protected) => modifiers.push(Modifier::Protected),
                _ => {}
            }
        }
        Accessor {
            kind,
            modifiers,
            annotations: Vec::new(),
            body: None,
            synthesized: true,
            info: self.node_info(start),
        }
    }

    /// Parses `{ accessor* }` or the `;` shorthand left by a sigil. Interface
    /// accessors must be `;`-bodied.
    fn parse_accessor_block(
        &mut self,
        sigil: Option<Accessibility>,
        in_interface: bool,
        member_start: NodeStart,
    ) -> Result<(Option<Accessor>, Option<Accessor>), ParseError> {
        // `^;` / `+;` shorthand synthesizes both accessors.
        if sigil.is_some() && self.check(&TokenKind::Semicolon) {
            self.advance();
            return Ok((
                Some(self.synthesize_accessor(AccessorKind::Get, None, member_start)),
                Some(self.synthesize_accessor(AccessorKind::Set, sigil, member_start)),
            ));
        }

        self.expect(&TokenKind::LBrace, "expected '{' to open accessor block")?;
        let mut get_accessor: Option<Accessor> = None;
        let mut set_accessor: Option<Accessor> = None;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let start = self.begin_node();
            let annotations = self.parse_annotation_sections()?;
            let modifiers = self.parse_modifiers();
            let kind = if self.match_ident("get") {
                AccessorKind::Get
            } else if self.match_ident("set") {
                AccessorKind::Set
            } else {
                return Err(self.error_here("expected 'get' or 'set' accessor"));
            };

            let body = if self.check(&TokenKind::LBrace) {
                if in_interface {
                    return Err(self.error_here("an interface accessor cannot have a body"));
                }
                Some(self.parse_block()?)
            } else {
                self.expect_semicolon("after accessor")?;
                None
            };

            let accessor = Accessor {
                kind,
                modifiers,
                annotations,
                body,
                synthesized: false,
                info: self.node_info(start),
            };
            let slot = match kind {
                AccessorKind::Get => &mut get_accessor,
                AccessorKind::Set => &mut set_accessor,
            };
            if slot.is_some() {
                return Err(self.error_here("duplicate accessor"));
            }
            *slot = Some(accessor);
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close accessor block")?;

        if get_accessor.is_none() && set_accessor.is_none() && sigil.is_none() {
            return Err(self.error_here("expected at least one accessor"));
        }

        // A sigil fixes the setter's visibility whether or not a setter was
        // written out.
        if let Some(requested) = sigil {
            let modifier = match requested {
                Accessibility::Private => Modifier::Private,
                Accessibility::Protected => Modifier::Protected,
                Accessibility::Public => Modifier::Public,
            };
            match &mut set_accessor {
                Some(accessor) => {
                    if !accessor.modifiers.contains(&modifier) {
                        accessor.modifiers.push(modifier);
                    }
                }
                None => {
                    set_accessor =
                        Some(self.synthesize_accessor(AccessorKind::Set, Some(requested), member_start));
                }
            }
        }

        Ok((get_accessor, set_accessor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn unit(input: &str) -> CompilationUnit {
        let tokens = Lexer::new(input).tokenize().expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        p.parse_unit().expect("parse failed").expect("empty unit")
    }

    fn first_class_members(input: &str) -> Vec<Member> {
        match unit(input).declarations.into_iter().next() {
            Some(Declaration::Class { members, .. }) => members,
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_usings_and_package() {
        let parsed = unit("using a.b;\npackage p.q { class C {} }");
        assert_eq!(parsed.usings.len(), 1);
        assert_eq!(parsed.usings[0].path, vec!["a", "b"]);
        let Declaration::Package {
            name, declarations, ..
        } = &parsed.declarations[0]
        else {
            panic!("expected package");
        };
        assert_eq!(name, &vec!["p".to_string(), "q".to_string()]);
        assert_eq!(declarations.len(), 1);
    }

    #[test]
    fn test_partial_only_counts_before_a_type_keyword() {
        let parsed = unit("public partial class C { }");
        let Declaration::Class { modifiers, .. } = &parsed.declarations[0] else {
            panic!("expected class");
        };
        assert!(modifiers.contains(&Modifier::Partial));

        let tokens = Lexer::new("partial delegate bool F();")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.parse_unit().is_err());

        let tokens = Lexer::new("partial public class C { }")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.parse_unit().is_err());
    }

    #[test]
    fn test_constructor_vs_method() {
        let members = first_class_members(
            "class C { C(int x) {} C Make() { return null; } }",
        );
        assert!(matches!(members[0], Member::Constructor { .. }));
        assert!(matches!(members[1], Member::Method { .. }));
    }

    #[test]
    fn test_auto_property_shorthand() {
        let members = first_class_members("class C { public int Size; private int count; }");
        let Member::Property {
            get_accessor,
            set_accessor,
            ..
        } = &members[0]
        else {
            panic!("expected auto-property for public member");
        };
        assert!(get_accessor.as_ref().is_some_and(|a| a.synthesized));
        assert!(set_accessor.as_ref().is_some_and(|a| a.synthesized));
        assert!(matches!(members[1], Member::Field { .. }));
    }

    #[test]
    fn test_initializer_forces_field() {
        let members = first_class_members("class C { public int size = 3; }");
        assert!(matches!(members[0], Member::Field { .. }));
    }

    #[test]
    fn test_private_setter_sigil() {
        let members = first_class_members("class C { public int Size ^; }");
        let Member::Property { set_accessor, .. } = &members[0] else {
            panic!("expected property");
        };
        let set = set_accessor.as_ref().expect("setter");
        assert!(set.synthesized);
        assert!(set.modifiers.contains(&Modifier::Private));
    }

    #[test]
    fn test_written_accessor_modifiers() {
        let members = first_class_members("class C { public int X { get; private set; } }");
        let Member::Property {
            get_accessor,
            set_accessor,
            ..
        } = &members[0]
        else {
            panic!("expected property");
        };
        assert!(get_accessor.as_ref().is_some_and(|a| !a.synthesized));
        let set = set_accessor.as_ref().expect("setter");
        assert!(!set.synthesized);
        assert!(set.modifiers.contains(&Modifier::Private));
    }

    #[test]
    fn test_empty_accessor_block_is_fatal() {
        let tokens = Lexer::new("class C { public int X { } }")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.parse_unit().is_err());
    }

    #[test]
    fn test_sigil_rejected_on_equal_accessibility() {
        let tokens = Lexer::new("class C { protected int Size +; }")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.parse_unit().is_err());
    }

    #[test]
    fn test_duplicate_modifier_is_recoverable() {
        let tokens = Lexer::new("class C { public public int X; }")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        let parsed = p.parse_unit().expect("parse failed").expect("unit");
        assert_eq!(p.diagnostics().len(), 1);
        assert_eq!(p.diagnostics()[0].code, DUPLICATE_MODIFIER);
        let Declaration::Class { members, .. } = &parsed.declarations[0] else {
            panic!("expected class");
        };
        let Member::Property { modifiers, .. } = &members[0] else {
            panic!("expected auto-property");
        };
        assert_eq!(modifiers, &vec![Modifier::Public]);
    }

    #[test]
    fn test_interface_method_default_value() {
        let parsed = unit("interface I { int Size() = 4; void Run(); }");
        let Declaration::Interface { members, .. } = &parsed.declarations[0] else {
            panic!("expected interface");
        };
        let Member::Method {
            default_value,
            body,
            ..
        } = &members[0]
        else {
            panic!("expected method");
        };
        assert!(default_value.is_some());
        assert!(body.is_none());
    }

    #[test]
    fn test_interface_method_body_is_fatal() {
        let tokens = Lexer::new("interface I { void Run() {} }")
            .tokenize()
            .expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        assert!(p.parse_unit().is_err());
    }

    #[test]
    fn test_indexer() {
        let members = first_class_members(
            "class C { public int this[int i] { get { return i; } set {} } }",
        );
        let Member::Indexer {
            parameters,
            get_accessor,
            set_accessor,
            ..
        } = &members[0]
        else {
            panic!("expected indexer");
        };
        assert_eq!(parameters.len(), 1);
        assert!(get_accessor.is_some());
        assert!(set_accessor.is_some());
    }

    #[test]
    fn test_doc_comment_attaches_to_declaration() {
        let parsed = unit("/// Greets.\n/// Loudly.\nclass C {}");
        assert_eq!(parsed.declarations[0].doc(), Some("Greets.\nLoudly."));
    }

    #[test]
    fn test_generic_class_with_constraints() {
        let parsed = unit("class Box<T, U> : Base<T> where T : Cloneable { T value; }");
        let Declaration::Class {
            type_params,
            bases,
            constraints,
            ..
        } = &parsed.declarations[0]
        else {
            panic!("expected class");
        };
        assert_eq!(type_params.len(), 2);
        assert_eq!(bases.len(), 1);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].type_param, "T");
    }

    #[test]
    fn test_field_declarator_list_expands() {
        let members = first_class_members("class C { int a, b = 2; }");
        assert_eq!(members.len(), 2);
        assert!(matches!(
            &members[1],
            Member::Field {
                name,
                initializer: Some(_),
                ..
            } if name == "b"
        ));
    }

    #[test]
    fn test_enum_constants() {
        let parsed = unit("enum Color { Red, Green = 2, Blue, }");
        let Declaration::Enum { constants, .. } = &parsed.declarations[0] else {
            panic!("expected enum");
        };
        assert_eq!(constants.len(), 3);
        assert!(constants[1].value.is_some());
    }

    #[test]
    fn test_destructor() {
        let members = first_class_members("class C { ~C() {} }");
        assert!(matches!(members[0], Member::Destructor { .. }));
    }
}
