//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! sequence (`,`) → assignment → conditional → `||` → `&&` → `|` → `^` →
//! `&` → equality → relational (incl. `in`, `instanceof`) → shift →
//! additive → multiplicative → `**` (right-assoc) → unary/update →
//! postfix update → call / member / `new` → primary.
//!
//! `in` is suppressed while a classic `for` head's init is being parsed
//! (the `no_in` flag), mirroring how ESTree parsers disambiguate
//! `for (x in y)` from a relational expression.

use glw_lexer::token::TokenKind;
use glw_types::ast::*;
use glw_types::{ErrorCode, Span};

use crate::parser::{Parser, MAX_EXPR_DEPTH};

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Points
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a (possibly comma-sequenced) expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.expr_depth += 1;
        if self.expr_depth > MAX_EXPR_DEPTH {
            self.error_at_current(
                ErrorCode::NESTING_TOO_DEEP,
                format!("maximum expression nesting depth is {MAX_EXPR_DEPTH}"),
            );
            self.expr_depth -= 1;
            return None;
        }
        let result = self.parse_sequence();
        self.expr_depth -= 1;
        result
    }

    fn parse_sequence(&mut self) -> Option<Expr> {
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Some(first);
        }
        let mut exprs = vec![first];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_assignment()?);
        }
        let span = exprs[0].span.merge(exprs[exprs.len() - 1].span);
        Some(Expr::new(ExprKind::Sequence(exprs), span))
    }

    /// Parse a single assignment-level expression (no comma).
    pub(crate) fn parse_assignment(&mut self) -> Option<Expr> {
        // Arrow functions need lookahead before the ordinary chain runs.
        if matches!(self.peek_kind(), TokenKind::Ident(_))
            && self.look_ahead(1) == &TokenKind::Arrow
        {
            return self.parse_arrow_single();
        }
        if self.check(&TokenKind::LParen) && self.paren_starts_arrow() {
            return self.parse_arrow_parenthesized();
        }

        let target = self.parse_conditional()?;
        let op = match self.peek_kind() {
            TokenKind::Assign => AssignOp::Assign,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            TokenKind::StarAssign => AssignOp::Mul,
            TokenKind::SlashAssign => AssignOp::Div,
            TokenKind::PercentAssign => AssignOp::Rem,
            TokenKind::PowAssign => AssignOp::Pow,
            TokenKind::ShlAssign => AssignOp::Shl,
            TokenKind::ShrAssign => AssignOp::Shr,
            TokenKind::UShrAssign => AssignOp::UShr,
            TokenKind::AmpAssign => AssignOp::BitAnd,
            TokenKind::PipeAssign => AssignOp::BitOr,
            TokenKind::CaretAssign => AssignOp::BitXor,
            _ => return Some(target),
        };
        if !matches!(target.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("invalid assignment target ({})", target.kind.syntax_name()),
            );
            return None;
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Some(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_conditional(&mut self) -> Option<Expr> {
        let cond = self.parse_logical_or()?;
        if !self.eat(&TokenKind::Question) {
            return Some(cond);
        }
        let then = self.parse_assignment()?;
        self.expect(&TokenKind::Colon, "':' in conditional expression")?;
        let other = self.parse_assignment()?;
        let span = cond.span.merge(other.span);
        Some(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                other: Box::new(other),
            },
            span,
        ))
    }

    fn parse_logical_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_logical_and()?;
        while self.eat(&TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            left = logical(left, LogicalOp::Or, right);
        }
        Some(left)
    }

    fn parse_logical_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_bit_or()?;
        while self.eat(&TokenKind::AmpAmp) {
            let right = self.parse_bit_or()?;
            left = logical(left, LogicalOp::And, right);
        }
        Some(left)
    }

    fn parse_bit_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_bit_xor()?;
        while self.eat(&TokenKind::Pipe) {
            let right = self.parse_bit_xor()?;
            left = binary(left, BinOp::BitOr, right);
        }
        Some(left)
    }

    fn parse_bit_xor(&mut self) -> Option<Expr> {
        let mut left = self.parse_bit_and()?;
        while self.eat(&TokenKind::Caret) {
            let right = self.parse_bit_and()?;
            left = binary(left, BinOp::BitXor, right);
        }
        Some(left)
    }

    fn parse_bit_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::Amp) {
            let right = self.parse_equality()?;
            left = binary(left, BinOp::BitAnd, right);
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::EqEqEq => BinOp::StrictEq,
                TokenKind::NotEqEq => BinOp::StrictNotEq,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(left, op, right);
        }
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut left = self.parse_shift()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                TokenKind::In if !self.no_in => BinOp::In,
                TokenKind::InstanceOf => BinOp::InstanceOf,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_shift()?;
            left = binary(left, op, right);
        }
    }

    fn parse_shift(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Shl => BinOp::Shl,
                TokenKind::Shr => BinOp::Shr,
                TokenKind::UShr => BinOp::UShr,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(left, op, right);
        }
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(left, op, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => return Some(left),
            };
            self.advance();
            let right = self.parse_exponent()?;
            left = binary(left, op, right);
        }
    }

    /// `**` is right-associative.
    fn parse_exponent(&mut self) -> Option<Expr> {
        let left = self.parse_unary()?;
        if self.eat(&TokenKind::StarStar) {
            let right = self.parse_exponent()?;
            return Some(binary(left, BinOp::Pow, right));
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_unary()?;
            let span = start.merge(expr.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op,
                    expr: Box::new(expr),
                },
                span,
            ));
        }
        let update = match self.peek_kind() {
            TokenKind::PlusPlus => Some(UpdateOp::Inc),
            TokenKind::MinusMinus => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let target = self.parse_unary()?;
            let span = start.merge(target.span);
            return Some(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    target: Box::new(target),
                },
                span,
            ));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_call_chain()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::PlusPlus => UpdateOp::Inc,
                TokenKind::MinusMinus => UpdateOp::Dec,
                _ => return Some(expr),
            };
            let span = expr.span.merge(self.current_span());
            self.advance();
            expr = Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    target: Box::new(expr),
                },
                span,
            );
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Call / Member / New
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_call_chain(&mut self) -> Option<Expr> {
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    expr = self.member_dot(expr)?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.member_computed(expr)?;
                }
                TokenKind::LParen => {
                    let args = self.parse_args()?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                _ => return Some(expr),
            }
        }
    }

    /// `new Callee(args?)`. The callee may be a member chain but not a call
    /// — `new a.b.C(x)` binds the argument list to the `new`.
    fn parse_new(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // new
        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    callee = self.member_dot(callee)?;
                }
                TokenKind::LBracket => {
                    self.advance();
                    callee = self.member_computed(callee)?;
                }
                _ => break,
            }
        }
        let args = if self.check(&TokenKind::LParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::New {
                callee: Box::new(callee),
                args,
            },
            span,
        ))
    }

    /// `.name` after the dot has been consumed.
    fn member_dot(&mut self, object: Expr) -> Option<Expr> {
        // Keywords may follow a dot (`Math.min`, but also `a.in` in theory);
        // only identifiers occur in practice, so require one.
        let name = self.expect_ident("property name")?;
        let span = object.span.merge(name.span);
        Some(Expr::new(
            ExprKind::Member {
                object: Box::new(object),
                property: MemberKey::Ident(name),
            },
            span,
        ))
    }

    /// `[expr]` after the bracket has been consumed.
    fn member_computed(&mut self, object: Expr) -> Option<Expr> {
        let index = self.parse_expression()?;
        self.expect(&TokenKind::RBracket, "']'")?;
        let span = object.span.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Member {
                object: Box::new(object),
                property: MemberKey::Computed(Box::new(index)),
            },
            span,
        ))
    }

    /// `( assignment, ... )`
    fn parse_args(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_assignment()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = self.current_span();
        let kind = self.peek_kind().clone();
        match kind {
            TokenKind::Number(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Number(n), span))
            }
            TokenKind::Str(s) => {
                self.advance();
                Some(Expr::new(ExprKind::Str(s), span))
            }
            TokenKind::Template(raw) => {
                self.advance();
                Some(Expr::new(ExprKind::Template(raw), span))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::Bool(false), span))
            }
            TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::Null, span))
            }
            TokenKind::This => {
                self.advance();
                Some(Expr::new(ExprKind::This, span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Some(Expr::new(ExprKind::Ident(name), span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Some(inner)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Function => {
                self.advance();
                self.parse_function_expr(span)
            }
            other => {
                let code = if other == TokenKind::Eof {
                    ErrorCode::UNEXPECTED_EOF
                } else {
                    ErrorCode::UNEXPECTED_TOKEN
                };
                self.error_at_current(code, format!("expected expression, got '{other}'"));
                None
            }
        }
    }

    fn parse_array(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // [
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.at_end() {
                self.error_at_current(ErrorCode::UNEXPECTED_EOF, "unclosed array literal");
                return None;
            }
            elements.push(self.parse_assignment()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBracket, "']'")?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Array(elements), span))
    }

    fn parse_object(&mut self) -> Option<Expr> {
        let start = self.current_span();
        self.advance(); // {
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                self.error_at_current(ErrorCode::UNEXPECTED_EOF, "unclosed object literal");
                return None;
            }
            let prop_start = self.current_span();
            let key = match self.peek_kind().clone() {
                TokenKind::Ident(name) => {
                    self.advance();
                    Ident::new(name, prop_start)
                }
                TokenKind::Str(name) => {
                    self.advance();
                    Ident::new(name, prop_start)
                }
                TokenKind::Number(n) => {
                    self.advance();
                    Ident::new(n.to_string(), prop_start)
                }
                other => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        format!("expected property key, got '{other}'"),
                    );
                    return None;
                }
            };
            let value = if self.eat(&TokenKind::Colon) {
                self.parse_assignment()?
            } else {
                // Shorthand `{ x }`.
                Expr::new(ExprKind::Ident(key.name.clone()), key.span)
            };
            let span = prop_start.merge(self.previous_span());
            properties.push(Property { key, value, span });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Object(properties), span))
    }

    /// A function expression; `function` has been consumed.
    fn parse_function_expr(&mut self, start: Span) -> Option<Expr> {
        let name = match self.peek_kind().clone() {
            TokenKind::Ident(n) => {
                let span = self.current_span();
                self.advance();
                Some(Ident::new(n, span))
            }
            _ => None,
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Function { name, params, body }, span))
    }

    // ── Arrow functions ───────────────────────────────────────────────────────

    /// Lookahead: does the parenthesized group starting here end with `=>`?
    fn paren_starts_arrow(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0usize;
        loop {
            match self.look_ahead(n) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.look_ahead(n + 1) == &TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// `x => body`
    fn parse_arrow_single(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let param = self.expect_ident("arrow parameter")?;
        self.advance(); // =>
        let body = self.parse_arrow_body()?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(
            ExprKind::Arrow {
                params: vec![param],
                body,
            },
            span,
        ))
    }

    /// `(a, b) => body`
    fn parse_arrow_parenthesized(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let params = self.parse_params()?;
        self.expect(&TokenKind::Arrow, "'=>'")?;
        let body = self.parse_arrow_body()?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::Arrow { params, body }, span))
    }

    fn parse_arrow_body(&mut self) -> Option<ArrowBody> {
        if self.check(&TokenKind::LBrace) {
            Some(ArrowBody::Block(self.parse_block()?))
        } else {
            Some(ArrowBody::Expr(Box::new(self.parse_assignment()?)))
        }
    }
}

// ── Node constructors ─────────────────────────────────────────────────────────

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

fn logical(left: Expr, op: LogicalOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}
