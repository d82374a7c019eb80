//! Expression parsing
//!
//! Precedence climbing over a static level table, loosest first:
//!
//! ```text
//! assignment  =  += -= *= /= %= &= |= ^= <<= >>=   (right associative)
//! conditional ?:
//! ??    |    &    ||    ^    &&    == !=
//! < > <= >= as instanceof    << >> >>>    + -    * / %
//! unary: - ! ~ ++ -- cast    postfix: . ?. () [] ++ --
//! ```
//!
//! Note the non-standard middle of the table: the logical operators bind
//! tighter than the bitwise ones.
//!
//! Ambiguous heads are resolved by speculation with restore points: casts vs
//! parenthesized expressions, lambda parameter lists vs parentheses, generic
//! argument lists vs comparisons (committed only when `(` follows the closing
//! `>`), and query expressions vs `from` as a plain identifier.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{NodeStart, ParseError, Parser};

/// Binary operator levels below the conditional, loosest first. Index 7 is
/// the relational level, handled specially for `as`/`instanceof`.
static BINARY_LEVELS: [&[(TokenKind, BinaryOp)]; 11] = [
    &[(TokenKind::QuestionQuestion, BinaryOp::Coalesce)],
    &[(TokenKind::Pipe, BinaryOp::BitOr)],
    &[(TokenKind::Amp, BinaryOp::BitAnd)],
    &[(TokenKind::PipePipe, BinaryOp::LogicalOr)],
    &[(TokenKind::Caret, BinaryOp::Xor)],
    &[(TokenKind::AmpAmp, BinaryOp::LogicalAnd)],
    &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::Ne, BinaryOp::Ne)],
    &[],
    &[
        (TokenKind::Shl, BinaryOp::Shl),
        (TokenKind::Shr, BinaryOp::Shr),
        (TokenKind::ShrUnsigned, BinaryOp::ShrUnsigned),
    ],
    &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
    &[
        (TokenKind::Star, BinaryOp::Mul),
        (TokenKind::Slash, BinaryOp::Div),
        (TokenKind::Percent, BinaryOp::Mod),
    ],
];

const RELATIONAL_LEVEL: usize = 7;
const LAST_LEVEL: usize = 10;

impl Parser {
    /// Parses one complete expression and requires end of input after it.
    /// Returns `None` only when the token stream is empty.
    pub fn parse_standalone_expression(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.is_at_end() {
            return Ok(None);
        }
        let expr = self.parse_expression()?;
        if !self.is_at_end() {
            return Err(self.error_here(format!(
                "expected end of input after expression, found {}",
                self.peek().kind.describe()
            )));
        }
        Ok(Some(expr))
    }

    /// Full expression: assignment level.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_conditional()?;

        let op = match self.peek().kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            TokenKind::AmpEq => AssignOp::And,
            TokenKind::PipeEq => AssignOp::Or,
            TokenKind::CaretEq => AssignOp::Xor,
            TokenKind::ShlEq => AssignOp::Shl,
            TokenKind::ShrEq => AssignOp::Shr,
            _ => {
                self.require_value(&target)?;
                return Ok(target);
            }
        };

        if !matches!(
            target,
            Expr::Name { .. } | Expr::MemberAccess { .. } | Expr::ElementAccess { .. }
        ) {
            let info = target.info();
            return Err(ParseError {
                message: "invalid assignment target".to_string(),
                line: info.line,
                column: info.column,
            });
        }

        self.advance();
        let value = self.parse_expression()?;
        let start = expr_start(&target);
        Ok(Expr::Assign {
            target: Box::new(target),
            op,
            value: Box::new(value),
            info: self.node_info(start),
        })
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let condition = self.parse_binary_level(0)?;
        if !self.check(&TokenKind::Question) {
            return Ok(condition);
        }
        self.require_value(&condition)?;
        self.advance();
        let if_true = self.parse_expression()?;
        self.expect(&TokenKind::Colon, "expected ':' in conditional expression")?;
        let if_false = self.parse_expression()?;
        let start = expr_start(&condition);
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            info: self.node_info(start),
        })
    }

    fn parse_binary_level(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == RELATIONAL_LEVEL {
            return self.parse_relational();
        }
        let mut left = self.parse_next_level(level)?;
        loop {
            let mut found = None;
            for (kind, op) in BINARY_LEVELS[level] {
                if self.check(kind) {
                    found = Some(*op);
                    break;
                }
            }
            let Some(op) = found else {
                return Ok(left);
            };
            self.require_value(&left)?;
            self.advance();
            let right = self.parse_next_level(level)?;
            self.require_value(&right)?;
            let start = expr_start(&left);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                info: self.node_info(start),
            };
        }
    }

    fn parse_next_level(&mut self, level: usize) -> Result<Expr, ParseError> {
        if level == LAST_LEVEL {
            self.parse_unary()
        } else {
            self.parse_binary_level(level + 1)
        }
    }

    /// Relational level: comparisons plus the `as` and `instanceof` type
    /// operators, whose right operand is a type, not an expression.
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_binary_level(RELATIONAL_LEVEL + 1)?;
        loop {
            let start = expr_start(&left);
            if self.match_kind(&TokenKind::As) {
                let target_type = self.parse_type()?;
                left = Expr::TypeAs {
                    expr: Box::new(left),
                    target_type,
                    info: self.node_info(start),
                };
                continue;
            }
            if self.match_kind(&TokenKind::Instanceof) {
                let target_type = self.parse_type()?;
                left = Expr::TypeCheck {
                    expr: Box::new(left),
                    target_type,
                    info: self.node_info(start),
                };
                continue;
            }
            let op = match self.peek().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.require_value(&left)?;
            self.advance();
            let right = self.parse_binary_level(RELATIONAL_LEVEL + 1)?;
            self.require_value(&right)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                info: self.node_info(start),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start = self.begin_node();
        let op = match self.peek().kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            self.require_value(&operand)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                info: self.node_info(start),
            });
        }

        if self.check(&TokenKind::LParen) {
            if let Some(cast) = self.try_parse_cast(start)? {
                return Ok(cast);
            }
        }

        self.parse_postfix()
    }

    /// Cast speculation. `(Type) operand` commits only when the token after
    /// `)` can begin a unary expression; when the type is a bare identifier
    /// (so `(a) - b` could equally be subtraction) the follow set is narrowed
    /// to tokens that cannot continue a binary expression.
    fn try_parse_cast(&mut self, start: NodeStart) -> Result<Option<Expr>, ParseError> {
        let point = self.save();
        self.advance();
        let target_type = match self.parse_type() {
            Ok(parsed) => parsed,
            Err(_) => {
                self.restore(point);
                return Ok(None);
            }
        };
        if !self.match_kind(&TokenKind::RParen) {
            self.restore(point);
            return Ok(None);
        }

        let ambiguous = matches!(
            &target_type,
            TypeRef::Named { segments, .. }
                if segments.len() == 1 && segments[0].type_args.is_empty()
        );
        let follows = match &self.peek().kind {
            TokenKind::Ident(_)
            | TokenKind::IntLit(_)
            | TokenKind::RealLit(_)
            | TokenKind::CharLit(_)
            | TokenKind::StrLit(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::Super
            | TokenKind::New
            | TokenKind::Typeof
            | TokenKind::Sizeof
            | TokenKind::Bang
            | TokenKind::Tilde => true,
            TokenKind::LParen
            | TokenKind::Minus
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => !ambiguous,
            _ => false,
        };
        if !follows {
            self.restore(point);
            return Ok(None);
        }

        let expr = self.parse_unary()?;
        self.require_value(&expr)?;
        Ok(Some(Expr::Cast {
            target_type,
            expr: Box::new(expr),
            info: self.node_info(start),
        }))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr_start(&expr);
            match self.peek().kind {
                TokenKind::Dot | TokenKind::QuestionDot => {
                    self.require_value(&expr)?;
                    let null_safe = matches!(self.peek().kind, TokenKind::QuestionDot);
                    self.advance();
                    let member = self.expect_identifier("expected member name")?;
                    let type_args = self.try_call_type_arguments();
                    expr = Expr::MemberAccess {
                        target: Box::new(expr),
                        member,
                        type_args,
                        null_safe,
                        info: self.node_info(start),
                    };
                }
                TokenKind::LParen => {
                    self.require_value(&expr)?;
                    let arguments = self.parse_argument_list()?;
                    expr = Expr::Invocation {
                        target: Box::new(expr),
                        arguments,
                        info: self.node_info(start),
                    };
                }
                TokenKind::LBracket => {
                    self.require_value(&expr)?;
                    self.advance();
                    let mut indices = vec![self.parse_expression()?];
                    while self.match_kind(&TokenKind::Comma) {
                        indices.push(self.parse_expression()?);
                    }
                    self.expect(&TokenKind::RBracket, "expected ']' after index")?;
                    expr = Expr::ElementAccess {
                        target: Box::new(expr),
                        indices,
                        info: self.node_info(start),
                    };
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    self.require_value(&expr)?;
                    let op = if matches!(self.peek().kind, TokenKind::PlusPlus) {
                        UnaryOp::PostInc
                    } else {
                        UnaryOp::PostDec
                    };
                    self.advance();
                    expr = Expr::Unary {
                        op,
                        operand: Box::new(expr),
                        info: self.node_info(start),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.begin_node();

        let literal = match &self.peek().kind {
            TokenKind::IntLit(n) => Some(LiteralValue::Int(*n)),
            TokenKind::RealLit(n) => Some(LiteralValue::Real(*n)),
            TokenKind::CharLit(c) => Some(LiteralValue::Char(*c)),
            TokenKind::StrLit(s) => Some(LiteralValue::Str(s.clone())),
            TokenKind::True => Some(LiteralValue::Bool(true)),
            TokenKind::False => Some(LiteralValue::Bool(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expr::Literal {
                value,
                info: self.node_info(start),
            });
        }

        match self.peek().kind {
            TokenKind::This => {
                self.advance();
                return Ok(Expr::This {
                    info: self.node_info(start),
                });
            }
            TokenKind::Super => {
                self.advance();
                return Ok(Expr::Super {
                    info: self.node_info(start),
                });
            }
            TokenKind::New => return self.parse_creation(start),
            TokenKind::Sizeof => {
                self.advance();
                self.expect(&TokenKind::LParen, "expected '(' after 'sizeof'")?;
                let target_type = self.parse_type()?;
                self.expect(&TokenKind::RParen, "expected ')' after sizeof type")?;
                return Ok(Expr::SizeOf {
                    target_type,
                    info: self.node_info(start),
                });
            }
            TokenKind::Typeof => {
                self.advance();
                self.expect(&TokenKind::LParen, "expected '(' after 'typeof'")?;
                let target_type = self.parse_type()?;
                self.expect(&TokenKind::RParen, "expected ')' after typeof type")?;
                return Ok(Expr::TypeOf {
                    target_type,
                    info: self.node_info(start),
                });
            }
            _ => {}
        }

        // Primitive type keyword in value position; legal only as the left
        // operand of `as`/`instanceof`, which the operator levels enforce.
        if let Some(kind) = self.primitive_kind_here() {
            self.advance();
            let info = self.node_info(start);
            return Ok(Expr::TypeExpression {
                type_ref: TypeRef::Primitive {
                    kind,
                    info: info.clone(),
                },
                info,
            });
        }

        // Query expression, falling back to `from` as an ordinary name
        if self.check_ident("from") {
            let point = self.save();
            match self.parse_query(start) {
                Ok(query) => return Ok(query),
                Err(_) => self.restore(point),
            }
        }

        // Lambdas: `x => e` or a speculated `(params) => e`
        if matches!(self.peek().kind, TokenKind::Ident(_))
            && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::FatArrow))
        {
            let name = self.expect_identifier("expected parameter name")?;
            let param_info = self.node_info(start);
            self.advance(); // =>
            let body = self.parse_lambda_body()?;
            return Ok(Expr::Lambda {
                params: vec![Param {
                    name,
                    param_type: None,
                    info: param_info,
                }],
                body,
                info: self.node_info(start),
            });
        }

        if let TokenKind::Ident(_) = self.peek().kind {
            let name = self.expect_identifier("expected name")?;
            let type_args = self.try_call_type_arguments();
            return Ok(Expr::Name {
                name,
                type_args,
                info: self.node_info(start),
            });
        }

        if self.check(&TokenKind::LParen) {
            if let Some(lambda) = self.try_parse_paren_lambda(start)? {
                return Ok(lambda);
            }
            self.advance();
            let expr = self.parse_expression()?;
            self.expect(&TokenKind::RParen, "expected ')' after expression")?;
            return Ok(Expr::Parenthesized {
                expr: Box::new(expr),
                info: self.node_info(start),
            });
        }

        Err(self.error_here(format!(
            "expected an expression, found {}",
            self.peek().kind.describe()
        )))
    }

    /// Generic arguments on a call head (`name<T>(...)` or `x.m<T>(...)`).
    /// Committed only when `(` follows the closing `>`; otherwise the `<` is
    /// left in place for the comparison operator.
    fn try_call_type_arguments(&mut self) -> Vec<TypeRef> {
        if !self.check(&TokenKind::Lt) {
            return Vec::new();
        }
        let point = self.save();
        match self.parse_type_arguments() {
            Ok((args, _)) if self.check(&TokenKind::LParen) => args,
            _ => {
                self.restore(point);
                Vec::new()
            }
        }
    }

    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen, "expected '('")?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "expected ')' after arguments")?;
        Ok(arguments)
    }

    // --- lambdas --------------------------------------------------------------

    fn try_parse_paren_lambda(&mut self, start: NodeStart) -> Result<Option<Expr>, ParseError> {
        let point = self.save();
        self.advance(); // (
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_start = self.begin_node();
                let param_point = self.save();
                let mut parsed = None;
                if self.check_type_start() {
                    if let Ok(param_type) = self.parse_type() {
                        if let TokenKind::Ident(_) = self.peek().kind {
                            let name = self.expect_identifier("expected parameter name")?;
                            parsed = Some(Param {
                                name,
                                param_type: Some(param_type),
                                info: self.node_info(param_start),
                            });
                        }
                    }
                }
                let param = match parsed {
                    Some(param) => param,
                    None => {
                        self.restore(param_point);
                        match &self.peek().kind {
                            TokenKind::Ident(_) => {
                                let name = self.expect_identifier("expected parameter name")?;
                                Param {
                                    name,
                                    param_type: None,
                                    info: self.node_info(param_start),
                                }
                            }
                            _ => {
                                self.restore(point);
                                return Ok(None);
                            }
                        }
                    }
                };
                params.push(param);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if !(self.match_kind(&TokenKind::RParen) && self.match_kind(&TokenKind::FatArrow)) {
            self.restore(point);
            return Ok(None);
        }
        let body = self.parse_lambda_body()?;
        Ok(Some(Expr::Lambda {
            params,
            body,
            info: self.node_info(start),
        }))
    }

    fn parse_lambda_body(&mut self) -> Result<LambdaBody, ParseError> {
        if self.check(&TokenKind::LBrace) {
            Ok(LambdaBody::Block(self.parse_block()?))
        } else {
            Ok(LambdaBody::Expression(Box::new(self.parse_expression()?)))
        }
    }

    // --- creation expressions ---------------------------------------------------

    fn parse_creation(&mut self, start: NodeStart) -> Result<Expr, ParseError> {
        self.advance(); // new

        // Anonymous object: new { a = 1, b }
        if self.check(&TokenKind::LBrace) {
            self.advance();
            let mut members = Vec::new();
            if !self.check(&TokenKind::RBrace) {
                loop {
                    let member_start = self.begin_node();
                    let name = if matches!(self.peek().kind, TokenKind::Ident(_))
                        && matches!(self.peek_ahead(1).map(|t| &t.kind), Some(TokenKind::Eq))
                    {
                        let name = self.expect_identifier("expected member name")?;
                        self.advance(); // =
                        Some(name)
                    } else {
                        None
                    };
                    let value = self.parse_expression()?;
                    members.push(AnonymousMember {
                        name,
                        value,
                        info: self.node_info(member_start),
                    });
                    if !self.match_kind(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RBrace, "expected '}' to close anonymous object")?;
            return Ok(Expr::AnonymousObject {
                members,
                info: self.node_info(start),
            });
        }

        // Implicitly typed array: new [] { ... }
        if self.check(&TokenKind::LBracket) {
            self.advance();
            self.expect(&TokenKind::RBracket, "expected ']' in implicitly typed array")?;
            let initializer = self.parse_initializer_elements()?;
            return Ok(Expr::ArrayCreation {
                element_type: None,
                sizes: Vec::new(),
                extra_rank: 0,
                initializer: Some(initializer),
                info: self.node_info(start),
            });
        }

        let created_type = self.parse_non_array_type()?;

        if self.check(&TokenKind::LBracket) {
            self.advance();
            let mut sizes = Vec::new();
            if !self.check(&TokenKind::RBracket) {
                loop {
                    sizes.push(self.parse_expression()?);
                    if !self.match_kind(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RBracket, "expected ']' in array creation")?;

            let mut extra_rank = 0;
            while self.check(&TokenKind::LBracket) {
                self.advance();
                while self.match_kind(&TokenKind::Comma) {}
                self.expect(&TokenKind::RBracket, "expected ']' in array rank")?;
                extra_rank += 1;
            }

            let initializer = if self.check(&TokenKind::LBrace) {
                Some(self.parse_initializer_elements()?)
            } else if sizes.is_empty() {
                return Err(
                    self.error_here("an unsized array creation requires an initializer")
                );
            } else {
                None
            };

            return Ok(Expr::ArrayCreation {
                element_type: Some(created_type),
                sizes,
                extra_rank,
                initializer,
                info: self.node_info(start),
            });
        }

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_argument_list()?
        } else if self.check(&TokenKind::LBrace) {
            Vec::new()
        } else {
            return Err(self.error_here("expected '(', '[' or '{' in creation expression"));
        };

        let initializer = if self.check(&TokenKind::LBrace) {
            Some(self.parse_initializer_elements()?)
        } else {
            None
        };

        Ok(Expr::ObjectCreation {
            created_type,
            arguments,
            initializer,
            info: self.node_info(start),
        })
    }

    /// `{ element, ... }` of an object, collection or array initializer.
    /// Nested braces become [`Expr::CollectionInitializer`] elements.
    fn parse_initializer_elements(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LBrace, "expected '{' to open initializer")?;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::LBrace) {
                let nested_start = self.begin_node();
                let nested = self.parse_initializer_elements()?;
                elements.push(Expr::CollectionInitializer {
                    elements: nested,
                    info: self.node_info(nested_start),
                });
            } else {
                elements.push(self.parse_expression()?);
            }
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "expected '}' to close initializer")?;
        Ok(elements)
    }

    // --- query expressions --------------------------------------------------------

    fn parse_query(&mut self, start: NodeStart) -> Result<Expr, ParseError> {
        let from = self.parse_from_clause()?;
        let body = self.parse_query_body()?;
        Ok(Expr::Query {
            from,
            body,
            info: self.node_info(start),
        })
    }

    fn parse_from_clause(&mut self) -> Result<FromClause, ParseError> {
        let start = self.begin_node();
        if !self.match_ident("from") {
            return Err(self.error_here("expected 'from'"));
        }
        let (var_type, name) = self.parse_range_variable()?;
        self.expect(&TokenKind::In, "expected 'in' in from clause")?;
        let source = self.parse_expression()?;
        Ok(FromClause {
            var_type,
            name,
            source: Box::new(source),
            info: self.node_info(start),
        })
    }

    /// `[Type] name` of a from or join clause. The type is speculative: it
    /// commits only when an identifier follows it.
    fn parse_range_variable(&mut self) -> Result<(Option<TypeRef>, String), ParseError> {
        let point = self.save();
        if let Some(var_type) = self.try_parse_type() {
            if let TokenKind::Ident(_) = self.peek().kind {
                let name = self.expect_identifier("expected range variable name")?;
                return Ok((Some(var_type), name));
            }
            self.restore(point);
        }
        let name = self.expect_identifier("expected range variable name")?;
        Ok((None, name))
    }

    fn parse_query_body(&mut self) -> Result<QueryBody, ParseError> {
        let mut clauses = Vec::new();
        let terminal = loop {
            if self.check_ident("from") {
                clauses.push(QueryClause::From(self.parse_from_clause()?));
            } else if self.check_ident("let") {
                let start = self.begin_node();
                self.advance();
                let name = self.expect_identifier("expected name in let clause")?;
                self.expect(&TokenKind::Eq, "expected '=' in let clause")?;
                let value = self.parse_expression()?;
                clauses.push(QueryClause::Let {
                    name,
                    value,
                    info: self.node_info(start),
                });
            } else if self.check_ident("where") {
                let start = self.begin_node();
                self.advance();
                let condition = self.parse_expression()?;
                clauses.push(QueryClause::Where {
                    condition,
                    info: self.node_info(start),
                });
            } else if self.check_ident("join") {
                let start = self.begin_node();
                self.advance();
                let (var_type, name) = self.parse_range_variable()?;
                self.expect(&TokenKind::In, "expected 'in' in join clause")?;
                let source = self.parse_expression()?;
                if !self.match_ident("on") {
                    return Err(self.error_here("expected 'on' in join clause"));
                }
                let on = self.parse_expression()?;
                if !self.match_ident("equals") {
                    return Err(self.error_here("expected 'equals' in join clause"));
                }
                let equals = self.parse_expression()?;
                let into = if self.match_ident("into") {
                    Some(self.expect_identifier("expected name after 'into'")?)
                } else {
                    None
                };
                clauses.push(QueryClause::Join {
                    var_type,
                    name,
                    source,
                    on,
                    equals,
                    into,
                    info: self.node_info(start),
                });
            } else if self.check_ident("orderby") {
                let start = self.begin_node();
                self.advance();
                let mut orderings = Vec::new();
                loop {
                    let expr = self.parse_expression()?;
                    let descending = if self.match_ident("descending") {
                        true
                    } else {
                        self.match_ident("ascending");
                        false
                    };
                    orderings.push(QueryOrdering { expr, descending });
                    if !self.match_kind(&TokenKind::Comma) {
                        break;
                    }
                }
                clauses.push(QueryClause::OrderBy {
                    orderings,
                    info: self.node_info(start),
                });
            } else if self.check_ident("select") {
                let start = self.begin_node();
                self.advance();
                let expr = self.parse_expression()?;
                break QueryTerminal::Select {
                    expr: Box::new(expr),
                    info: self.node_info(start),
                };
            } else if self.check_ident("group") {
                let start = self.begin_node();
                self.advance();
                let element = self.parse_expression()?;
                if !self.match_ident("by") {
                    return Err(self.error_here("expected 'by' in group clause"));
                }
                let key = self.parse_expression()?;
                break QueryTerminal::GroupBy {
                    element: Box::new(element),
                    key: Box::new(key),
                    info: self.node_info(start),
                };
            } else {
                return Err(self.error_here("expected a query clause"));
            }
        };

        let continuation = if self.match_ident("into") {
            let name = self.expect_identifier("expected name after 'into'")?;
            Some(QueryContinuation {
                name,
                body: Box::new(self.parse_query_body()?),
            })
        } else {
            None
        };

        Ok(QueryBody {
            clauses,
            terminal,
            continuation,
        })
    }

    // --- helpers ------------------------------------------------------------------

    fn require_value(&self, expr: &Expr) -> Result<(), ParseError> {
        if let Expr::TypeExpression { info, .. } = expr {
            Err(ParseError {
                message: "a type name is only allowed before 'as' or 'instanceof'".to_string(),
                line: info.line,
                column: info.column,
            })
        } else {
            Ok(())
        }
    }
}

fn expr_start(expr: &Expr) -> NodeStart {
    let info = expr.info();
    NodeStart {
        offset: info.span.start,
        line: info.line,
        column: info.column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;

    fn expr(input: &str) -> Expr {
        let tokens = Lexer::new(input).tokenize().expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        p.parse_standalone_expression()
            .expect("expression parse failed")
            .expect("empty input")
    }

    fn expr_err(input: &str) -> ParseError {
        let tokens = Lexer::new(input).tokenize().expect("lexing failed");
        let mut p = Parser::new("test", tokens);
        p.parse_standalone_expression()
            .expect_err("expected parse failure")
    }

    fn root_op(input: &str) -> BinaryOp {
        match expr(input) {
            Expr::Binary { op, .. } => op,
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        let parsed = expr("1 + 2 * 3");
        let Expr::Binary { op, right, .. } = parsed else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_logical_binds_tighter_than_bitwise() {
        // In this grammar && binds tighter than ^, and || tighter than &.
        assert_eq!(root_op("a && b ^ c"), BinaryOp::Xor);
        assert_eq!(root_op("a || b & c"), BinaryOp::BitAnd);
        assert_eq!(root_op("a & b | c"), BinaryOp::BitOr);
        assert_eq!(root_op("a | b ?? c"), BinaryOp::Coalesce);
    }

    #[test]
    fn test_generic_call_vs_comparison() {
        let parsed = expr("a<b>(c)");
        let Expr::Invocation { target, .. } = parsed else {
            panic!("expected invocation");
        };
        assert!(matches!(*target, Expr::Name { ref type_args, .. } if type_args.len() == 1));

        // Without the trailing '(' the same prefix is a comparison chain.
        assert_eq!(root_op("a < b > c"), BinaryOp::Gt);
    }

    #[test]
    fn test_nested_generic_type_args_in_call() {
        let parsed = expr("f<List<int>>(x)");
        let Expr::Invocation { target, .. } = parsed else {
            panic!("expected invocation");
        };
        let Expr::Name { type_args, .. } = *target else {
            panic!("expected name");
        };
        assert_eq!(type_args.len(), 1);
    }

    #[test]
    fn test_cast_vs_parenthesized() {
        assert!(matches!(expr("(int) - b"), Expr::Cast { .. }));
        assert!(matches!(
            expr("(a) - b"),
            Expr::Binary {
                op: BinaryOp::Sub,
                ..
            }
        ));
        assert!(matches!(expr("(List<int>) x"), Expr::Cast { .. }));
    }

    #[test]
    fn test_as_and_instanceof() {
        assert!(matches!(expr("x as List<int>"), Expr::TypeAs { .. }));
        let parsed = expr("x instanceof string");
        assert!(matches!(parsed, Expr::TypeCheck { .. }));
        // A primitive type keyword is legal only in front of these operators.
        assert!(matches!(expr("int as object"), Expr::TypeAs { .. }));
        assert!(expr_err("int + 1").message.contains("type name"));
    }

    #[test]
    fn test_conditional_and_coalesce() {
        let parsed = expr("a ?? b ? c : d ?? e");
        assert!(matches!(parsed, Expr::Conditional { .. }));
    }

    #[test]
    fn test_assignment_right_associative() {
        let parsed = expr("a = b = 1");
        let Expr::Assign { value, .. } = parsed else {
            panic!("expected assignment");
        };
        assert!(matches!(*value, Expr::Assign { .. }));
        assert!(expr_err("1 = 2").message.contains("assignment target"));
    }

    #[test]
    fn test_postfix_chain() {
        let parsed = expr("a.b?.c(1)[2]++");
        let Expr::Unary {
            op: UnaryOp::PostInc,
            operand,
            ..
        } = parsed
        else {
            panic!("expected post-increment");
        };
        assert!(matches!(*operand, Expr::ElementAccess { .. }));
    }

    #[test]
    fn test_lambdas() {
        assert!(matches!(expr("x => x + 1"), Expr::Lambda { .. }));
        let parsed = expr("(int a, b) => { return a; }");
        let Expr::Lambda { params, body, .. } = parsed else {
            panic!("expected lambda");
        };
        assert_eq!(params.len(), 2);
        assert!(params[0].param_type.is_some());
        assert!(params[1].param_type.is_none());
        assert!(matches!(body, LambdaBody::Block(_)));
        // Plain parentheses fall back untouched.
        assert!(matches!(expr("(a + b)"), Expr::Parenthesized { .. }));
    }

    #[test]
    fn test_creation_forms() {
        assert!(matches!(
            expr("new Map<string, int>()"),
            Expr::ObjectCreation { .. }
        ));
        let parsed = expr("new int[2, 3][]");
        let Expr::ArrayCreation {
            sizes, extra_rank, ..
        } = parsed
        else {
            panic!("expected array creation");
        };
        assert_eq!(sizes.len(), 2);
        assert_eq!(extra_rank, 1);

        let parsed = expr("new[] { 1, 2 }");
        assert!(matches!(
            parsed,
            Expr::ArrayCreation {
                element_type: None,
                ..
            }
        ));

        let parsed = expr("new Point { x = 1, y = 2 }");
        let Expr::ObjectCreation { initializer, .. } = parsed else {
            panic!("expected object creation");
        };
        assert_eq!(initializer.expect("initializer").len(), 2);

        assert!(matches!(
            expr("new { a = 1, b }"),
            Expr::AnonymousObject { .. }
        ));
    }

    #[test]
    fn test_unsized_array_requires_initializer() {
        assert!(expr_err("new int[]").message.contains("initializer"));
    }

    #[test]
    fn test_query_expression() {
        let parsed = expr(
            "from int x in xs where x > 1 orderby x descending select x",
        );
        let Expr::Query { from, body, .. } = parsed else {
            panic!("expected query");
        };
        assert!(from.var_type.is_some());
        assert_eq!(body.clauses.len(), 2);
        assert!(matches!(body.terminal, QueryTerminal::Select { .. }));
    }

    #[test]
    fn test_query_join_and_continuation() {
        let parsed = expr(
            "from x in xs join y in ys on x.k equals y.k into g \
             group x by x.k into byKey select byKey",
        );
        let Expr::Query { body, .. } = parsed else {
            panic!("expected query");
        };
        assert!(matches!(
            body.clauses[0],
            QueryClause::Join { into: Some(_), .. }
        ));
        assert!(matches!(body.terminal, QueryTerminal::GroupBy { .. }));
        let continuation = body.continuation.expect("continuation");
        assert_eq!(continuation.name, "byKey");
        assert!(matches!(
            continuation.body.terminal,
            QueryTerminal::Select { .. }
        ));
    }

    #[test]
    fn test_from_as_plain_identifier() {
        assert!(matches!(
            expr("from + 1"),
            Expr::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
        assert!(matches!(expr("from"), Expr::Name { .. }));
    }

    #[test]
    fn test_sizeof_and_typeof() {
        assert!(matches!(expr("sizeof(int)"), Expr::SizeOf { .. }));
        assert!(matches!(expr("typeof(List<int>)"), Expr::TypeOf { .. }));
    }

    #[test]
    fn test_shift_in_expression_context() {
        // `>>` stays a shift when no generic argument list is open.
        assert_eq!(root_op("a >> b"), BinaryOp::Shr);
        assert_eq!(root_op("a >>> b"), BinaryOp::ShrUnsigned);
    }
}
