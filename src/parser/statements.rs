//! Statement parsing
//!
//! ```text
//! statement ::= block | ';' | label | local_decl | expr_stmt
//!             | if | while | do | for | foreach | switch
//!             | try | using | synchronized
//!             | return | throw | break | continue | goto
//!             | yield_return | yield_break
//! ```
//!
//! Local declarations are disambiguated from expressions by speculation:
//! a type followed by an identifier followed by `=`, `;` or `,` commits to a
//! declaration, anything else restores and parses an expression statement.
//! Control-flow bodies take embedded statements, which exclude bare local
//! declarations and labels.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parses `{ statement* }`.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.begin_node();
        self.expect(&TokenKind::LBrace, "expected '{'")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close block")?;
        Ok(Block {
            statements,
            info: self.node_info(start),
        })
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();

        match self.peek().kind {
            TokenKind::LBrace => return Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                self.advance();
                return Ok(Stmt::Empty {
                    info: self.node_info(start),
                });
            }
            TokenKind::If => return self.parse_if_statement(),
            TokenKind::While => return self.parse_while_statement(),
            TokenKind::Do => return self.parse_do_statement(),
            TokenKind::For => return self.parse_for_statement(),
            TokenKind::Foreach => return self.parse_foreach_statement(),
            TokenKind::Switch => return self.parse_switch_statement(),
            TokenKind::Try => return self.parse_try_statement(),
            TokenKind::Using => return self.parse_using_statement(),
            TokenKind::Synchronized => return self.parse_synchronized_statement(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon("after 'return'")?;
                return Ok(Stmt::Return {
                    value,
                    info: self.node_info(start),
                });
            }
            TokenKind::Throw => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect_semicolon("after 'throw'")?;
                return Ok(Stmt::Throw {
                    value,
                    info: self.node_info(start),
                });
            }
            TokenKind::Break => {
                self.advance();
                self.expect_semicolon("after 'break'")?;
                return Ok(Stmt::Break {
                    info: self.node_info(start),
                });
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_semicolon("after 'continue'")?;
                return Ok(Stmt::Continue {
                    info: self.node_info(start),
                });
            }
            TokenKind::Goto => {
                self.advance();
                let target = if self.match_kind(&TokenKind::Case) {
                    GotoTarget::Case(self.parse_expression()?)
                } else if self.match_kind(&TokenKind::Default) {
                    GotoTarget::Default
                } else {
                    GotoTarget::Label(self.expect_identifier("expected label after 'goto'")?)
                };
                self.expect_semicolon("after 'goto'")?;
                return Ok(Stmt::Goto {
                    target,
                    info: self.node_info(start),
                });
            }
            _ => {}
        }

        // yield return / yield break (contextual keyword)
        if self.check_ident("yield") {
            match self.peek_ahead(1).map(|t| &t.kind) {
                Some(TokenKind::Return) => {
                    self.advance();
                    self.advance();
                    let value = self.parse_expression()?;
                    self.expect_semicolon("after 'yield return'")?;
                    return Ok(Stmt::YieldReturn {
                        value,
                        info: self.node_info(start),
                    });
                }
                Some(TokenKind::Break) => {
                    self.advance();
                    self.advance();
                    self.expect_semicolon("after 'yield break'")?;
                    return Ok(Stmt::YieldBreak {
                        info: self.node_info(start),
                    });
                }
                _ => {}
            }
        }

        // Label: identifier directly followed by ':'
        if matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::Colon))
        {
            let label = self.expect_identifier("expected label")?;
            self.advance(); // ':'
            let statement = Box::new(self.parse_statement()?);
            return Ok(Stmt::Labeled {
                label,
                statement,
                info: self.node_info(start),
            });
        }

        // Local declaration, by speculation
        if let Some((decl_type, declarators)) = self.try_parse_local_declaration()? {
            self.expect_semicolon("after local declaration")?;
            return Ok(Stmt::LocalDecl {
                decl_type,
                declarators,
                info: self.node_info(start),
            });
        }

        // Expression statement
        let expr = self.parse_expression()?;
        if !expression_is_statement(&expr) {
            let info = expr.info();
            return Err(ParseError {
                message: "only invocation, creation, assignment and increment expressions can be used as statements".to_string(),
                line: info.line,
                column: info.column,
            });
        }
        self.expect_semicolon("after expression statement")?;
        Ok(Stmt::Expression {
            expr,
            info: self.node_info(start),
        })
    }

    /// Control-flow body: any statement except a bare local declaration or
    /// label.
    fn parse_embedded_statement(&mut self) -> Result<Stmt, ParseError> {
        let statement = self.parse_statement()?;
        match &statement {
            Stmt::LocalDecl { info, .. } => Err(ParseError {
                message: "a declaration is not allowed as an embedded statement".to_string(),
                line: info.line,
                column: info.column,
            }),
            Stmt::Labeled { info, .. } => Err(ParseError {
                message: "a label is not allowed as an embedded statement".to_string(),
                line: info.line,
                column: info.column,
            }),
            _ => Ok(statement),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after if condition")?;
        let then_branch = Box::new(self.parse_embedded_statement()?);
        let else_branch = if self.match_kind(&TokenKind::Else) {
            Some(Box::new(self.parse_embedded_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            info: self.node_info(start),
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after while condition")?;
        let body = Box::new(self.parse_embedded_statement()?);
        Ok(Stmt::While {
            condition,
            body,
            info: self.node_info(start),
        })
    }

    fn parse_do_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        let body = Box::new(self.parse_embedded_statement()?);
        self.expect(&TokenKind::While, "expected 'while' after do body")?;
        self.expect(&TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after do-while condition")?;
        self.expect_semicolon("after do-while")?;
        Ok(Stmt::Do {
            body,
            condition,
            info: self.node_info(start),
        })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'for'")?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if let Some((decl_type, declarators)) = self.try_parse_local_declaration()? {
            Some(ForInit::Declaration {
                decl_type,
                declarators,
            })
        } else {
            Some(ForInit::Expressions(self.parse_expression_list()?))
        };
        self.expect(&TokenKind::Semicolon, "expected ';' after for initializer")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "expected ';' after for condition")?;

        let increment = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.expect(&TokenKind::RParen, "expected ')' after for clauses")?;

        let body = Box::new(self.parse_embedded_statement()?);
        Ok(Stmt::For {
            init,
            condition,
            increment,
            body,
            info: self.node_info(start),
        })
    }

    fn parse_foreach_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'foreach'")?;
        let var_type = if self.check_ident("var")
            && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::Ident(_)))
        {
            self.advance();
            None
        } else {
            Some(self.parse_type()?)
        };
        let name = self.expect_identifier("expected loop variable name")?;
        self.expect(&TokenKind::In, "expected 'in' in foreach")?;
        let iterable = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after foreach header")?;
        let body = Box::new(self.parse_embedded_statement()?);
        Ok(Stmt::Foreach {
            var_type,
            name,
            iterable,
            body,
            info: self.node_info(start),
        })
    }

    fn parse_switch_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'switch'")?;
        let scrutinee = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after switch expression")?;
        self.expect(&TokenKind::LBrace, "expected '{' before switch body")?;

        let mut sections = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let section_start = self.begin_node();
            let mut labels = Vec::new();
            loop {
                let label_start = self.begin_node();
                if self.match_kind(&TokenKind::Case) {
                    let value = self.parse_expression()?;
                    self.expect(&TokenKind::Colon, "expected ':' after case value")?;
                    labels.push(SwitchLabel::Case {
                        value,
                        info: self.node_info(label_start),
                    });
                } else if self.match_kind(&TokenKind::Default) {
                    self.expect(&TokenKind::Colon, "expected ':' after 'default'")?;
                    labels.push(SwitchLabel::Default {
                        info: self.node_info(label_start),
                    });
                } else {
                    break;
                }
            }
            if labels.is_empty() {
                return Err(self.error_here("expected 'case' or 'default' in switch body"));
            }
            let mut statements = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                statements.push(self.parse_statement()?);
            }
            sections.push(SwitchSection {
                labels,
                statements,
                info: self.node_info(section_start),
            });
        }
        self.expect(&TokenKind::RBrace, "expected '}' after switch body")?;

        Ok(Stmt::Switch {
            scrutinee,
            sections,
            info: self.node_info(start),
        })
    }

    fn parse_try_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        let body = self.parse_block()?;

        let mut catches = Vec::new();
        while self.check(&TokenKind::Catch) {
            let catch_start = self.begin_node();
            self.advance();
            let mut exception_type = None;
            let mut name = None;
            if self.match_kind(&TokenKind::LParen) {
                exception_type = Some(self.parse_type()?);
                if let TokenKind::Ident(_) = self.peek().kind {
                    name = Some(self.expect_identifier("expected exception variable")?);
                }
                self.expect(&TokenKind::RParen, "expected ')' after catch clause")?;
            }
            let catch_body = self.parse_block()?;
            catches.push(CatchClause {
                exception_type,
                name,
                body: catch_body,
                info: self.node_info(catch_start),
            });
        }

        let finally_block = if self.match_kind(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if catches.is_empty() && finally_block.is_none() {
            return Err(self.error_here("expected 'catch' or 'finally' after try block"));
        }

        Ok(Stmt::Try {
            body,
            catches,
            finally_block,
            info: self.node_info(start),
        })
    }

    fn parse_using_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'using'")?;
        let resource = if let Some((decl_type, declarators)) = self.try_parse_local_declaration()? {
            UsingResource::Declaration {
                decl_type,
                declarators,
            }
        } else {
            UsingResource::Expression(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "expected ')' after using resource")?;
        let body = Box::new(self.parse_embedded_statement()?);
        Ok(Stmt::Using {
            resource,
            body,
            info: self.node_info(start),
        })
    }

    fn parse_synchronized_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.begin_node();
        self.advance();
        self.expect(&TokenKind::LParen, "expected '(' after 'synchronized'")?;
        let monitor = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "expected ')' after monitor expression")?;
        let body = Box::new(self.parse_embedded_statement()?);
        Ok(Stmt::Synchronized {
            monitor,
            body,
            info: self.node_info(start),
        })
    }

    /// Tries a local declaration head: `var name ...`, or a type followed by
    /// an identifier followed by `=`, `;` or `,`. On no-match the cursor is
    /// untouched and `None` is returned; the terminating `;` is left for the
    /// caller.
    fn try_parse_local_declaration(
        &mut self,
    ) -> Result<Option<(Option<TypeRef>, Vec<Declarator>)>, ParseError> {
        if self.check_ident("var")
            && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::Ident(_)))
        {
            self.advance();
            let declarators = self.parse_declarators()?;
            return Ok(Some((None, declarators)));
        }

        let point = self.save();
        let Some(decl_type) = self.try_parse_type() else {
            return Ok(None);
        };
        // `)` commits too, for the resource clause of a using statement.
        let commits = matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(
                self.peek_ahead(1).map(|t| &t.kind),
                Some(
                    TokenKind::Eq
                        | TokenKind::Semicolon
                        | TokenKind::Comma
                        | TokenKind::RParen
                )
            );
        if !commits {
            self.restore(point);
            return Ok(None);
        }
        let declarators = self.parse_declarators()?;
        Ok(Some((Some(decl_type), declarators)))
    }

    fn parse_declarators(&mut self) -> Result<Vec<Declarator>, ParseError> {
        let mut declarators = Vec::new();
        loop {
            let start = self.begin_node();
            let name = self.expect_identifier("expected variable name")?;
            let initializer = if self.match_kind(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(Declarator {
                name,
                initializer,
                info: self.node_info(start),
            });
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(declarators)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut expressions = vec![self.parse_expression()?];
        while self.match_kind(&TokenKind::Comma) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }
}

/// Only these expression forms may stand alone as statements.
fn expression_is_statement(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Invocation { .. }
            | Expr::ObjectCreation { .. }
            | Expr::Assign { .. }
            | Expr::Unary {
                op: UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec,
                ..
            }
    )
}
