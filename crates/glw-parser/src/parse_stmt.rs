//! Statement parsing.

use glw_lexer::token::TokenKind;
use glw_types::ast::*;
use glw_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        match self.peek_kind() {
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Stmt::new(StmtKind::Block(block), span))
            }
            TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                let decl = self.parse_var_decl()?;
                self.eat(&TokenKind::Semi);
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Var(decl), span))
            }
            TokenKind::Function => {
                self.advance();
                let func = self.parse_function_rest()?;
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Function(func), span))
            }
            TokenKind::Return => {
                self.advance();
                // `return;`, `return}` and `return <expr>`.
                let value = if self.check(&TokenKind::Semi)
                    || self.check(&TokenKind::RBrace)
                    || self.at_end()
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.eat(&TokenKind::Semi);
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Return(value), span))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::While => {
                self.advance();
                self.expect(&TokenKind::LParen, "'(' after 'while'")?;
                let cond = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                let body = Box::new(self.parse_statement()?);
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::While { cond, body }, span))
            }
            TokenKind::Do => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect(&TokenKind::While, "'while' after do-body")?;
                self.expect(&TokenKind::LParen, "'('")?;
                let cond = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                self.eat(&TokenKind::Semi);
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::DoWhile { body, cond }, span))
            }
            TokenKind::Break => {
                self.advance();
                self.eat(&TokenKind::Semi);
                Some(Stmt::new(StmtKind::Break, start))
            }
            TokenKind::Continue => {
                self.advance();
                self.eat(&TokenKind::Semi);
                Some(Stmt::new(StmtKind::Continue, start))
            }
            TokenKind::Semi => {
                self.advance();
                Some(Stmt::new(StmtKind::Empty, start))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.eat(&TokenKind::Semi);
                let span = start.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                self.error_at_current(ErrorCode::UNEXPECTED_EOF, "unclosed block");
                return None;
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance(); // }
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// `let|const|var name (= init)? (, name (= init)?)*` — the trailing
    /// semicolon belongs to the caller.
    pub(crate) fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let start = self.current_span();
        let kind = match self.advance().kind {
            TokenKind::Let => VarKind::Let,
            TokenKind::Const => VarKind::Const,
            _ => VarKind::Var,
        };
        let mut declarators = Vec::new();
        loop {
            let decl_start = self.current_span();
            let name = self.expect_ident("variable name")?;
            let init = if self.eat(&TokenKind::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let span = decl_start.merge(self.previous_span());
            declarators.push(Declarator { name, init, span });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let span = start.merge(self.previous_span());
        Some(VarDecl {
            kind,
            declarators,
            span,
        })
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // if
        self.expect(&TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// All three `for` heads: classic, `for-in`, `for-of`.
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.advance(); // for
        self.expect(&TokenKind::LParen, "'(' after 'for'")?;

        // Empty init.
        if self.eat(&TokenKind::Semi) {
            return self.parse_for_tail(start, None);
        }

        // `in` must not be consumed as a relational operator here, or
        // `for (x in y)` would never reach the for-in arm.
        self.no_in = true;
        let init = if matches!(
            self.peek_kind(),
            TokenKind::Let | TokenKind::Const | TokenKind::Var
        ) {
            self.parse_var_decl().map(ForInit::Var)
        } else {
            self.parse_expression().map(ForInit::Expr)
        };
        self.no_in = false;
        let init = init?;

        // for-in / for-of?
        let each_kind = if self.eat(&TokenKind::In) {
            Some(ForEachKind::In)
        } else if self.check_contextual("of") {
            self.advance();
            Some(ForEachKind::Of)
        } else {
            None
        };
        if let Some(kind) = each_kind {
            let right = self.parse_expression()?;
            self.expect(&TokenKind::RParen, "')'")?;
            let body = Box::new(self.parse_statement()?);
            let span = start.merge(self.previous_span());
            return Some(Stmt::new(
                StmtKind::ForEach {
                    kind,
                    decl: Box::new(init),
                    right,
                    body,
                },
                span,
            ));
        }

        self.expect(&TokenKind::Semi, "';' after for-init")?;
        self.parse_for_tail(start, Some(Box::new(init)))
    }

    /// The `test; update) body` part of a classic `for`.
    fn parse_for_tail(
        &mut self,
        start: glw_types::Span,
        init: Option<Box<ForInit>>,
    ) -> Option<Stmt> {
        let test = if self.check(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semi, "';' after for-test")?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::For {
                init,
                test,
                update,
                body,
            },
            span,
        ))
    }
}
