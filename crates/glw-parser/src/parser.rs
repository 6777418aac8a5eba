//! Core parser infrastructure: token cursor, error reporting, top-level items.

use glw_lexer::token::{Token, TokenKind};
use glw_types::ast::*;
use glw_types::{AnalyzeError, AnalyzeErrors, ErrorCode, SourceFile, Span};

/// Maximum expression nesting depth before the parser bails out.
pub(crate) const MAX_EXPR_DEPTH: u32 = 64;

/// The routine-source parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and recovers at statement boundaries where possible.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: AnalyzeErrors,
    /// Current expression nesting depth.
    pub(crate) expr_depth: u32,
    /// Suppresses the `in` relational operator while a `for` head's init
    /// is being parsed.
    pub(crate) no_in: bool,
}

/// Result of parsing.
pub struct ParseResult {
    /// The parsed program; `None` when errors were collected.
    pub program: Option<Program>,
    pub errors: AnalyzeErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: AnalyzeErrors::empty(),
            expr_depth: 0,
            no_in: false,
        }
    }

    /// Parse a whole module.
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut items = Vec::new();

        while !self.at_end() && !self.errors.at_cap() {
            match self.parse_item() {
                Some(item) => items.push(item),
                None => self.synchronize(),
            }
        }

        let span = start.merge(self.previous_span());
        let program = if self.errors.has_errors() {
            None
        } else {
            Some(Program { items, span })
        };
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Returns the previously consumed token's span.
    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(0)
        }
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Look ahead by `n` tokens from the current position.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// Returns `true` if the current token is the contextual word `word`.
    pub(crate) fn check_contextual(&self, word: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(name) if name == word)
    }

    // ── Errors & Recovery ─────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.errors
            .push(AnalyzeError::new(self.source_file, code, message, span));
    }

    /// Expect and consume a token kind; reports an error and yields `None`
    /// otherwise, so callers can bail with `?`.
    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Option<()> {
        if self.eat(kind) {
            Some(())
        } else {
            let code = if self.at_end() {
                ErrorCode::UNEXPECTED_EOF
            } else {
                ErrorCode::UNEXPECTED_TOKEN
            };
            self.error_at_current(code, format!("expected {what}, got '{}'", self.peek_kind()));
            None
        }
    }

    /// Expect an identifier and return it.
    pub(crate) fn expect_ident(&mut self, what: &str) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.advance();
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected {what}, got '{other}'"),
                );
                None
            }
        }
    }

    /// Skip forward to a likely statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Semi) {
                return;
            }
            match self.peek_kind() {
                TokenKind::RBrace
                | TokenKind::Export
                | TokenKind::Import
                | TokenKind::Function
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::For
                | TokenKind::While => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Top-level items ───────────────────────────────────────────────────────

    fn parse_item(&mut self) -> Option<Item> {
        let start = self.current_span();
        match self.peek_kind() {
            TokenKind::Import => {
                let import = self.parse_import()?;
                let span = start.merge(self.previous_span());
                Some(Item {
                    kind: ItemKind::Import(import),
                    span,
                })
            }
            TokenKind::Export => {
                self.advance();
                match self.peek_kind() {
                    TokenKind::Function => {
                        self.advance();
                        let func = self.parse_function_rest()?;
                        let span = start.merge(self.previous_span());
                        Some(Item {
                            kind: ItemKind::ExportFunction(func),
                            span,
                        })
                    }
                    TokenKind::Let | TokenKind::Const | TokenKind::Var => {
                        let decl = self.parse_var_decl()?;
                        self.eat(&TokenKind::Semi);
                        let span = start.merge(self.previous_span());
                        Some(Item {
                            kind: ItemKind::ExportVar(decl),
                            span,
                        })
                    }
                    other => {
                        self.error_at_current(
                            ErrorCode::UNEXPECTED_TOKEN,
                            format!("expected declaration after 'export', got '{other}'"),
                        );
                        None
                    }
                }
            }
            _ => {
                let stmt = self.parse_statement()?;
                let span = stmt.span;
                Some(Item {
                    kind: ItemKind::Stmt(stmt),
                    span,
                })
            }
        }
    }

    /// Parse an import declaration. The clause between `import` and the
    /// module specifier is skipped, not modeled — the analysis never
    /// resolves imports.
    fn parse_import(&mut self) -> Option<ImportDecl> {
        let start = self.current_span();
        self.advance(); // import
        loop {
            match self.peek_kind().clone() {
                TokenKind::Str(source) => {
                    self.advance();
                    self.eat(&TokenKind::Semi);
                    let span = start.merge(self.previous_span());
                    return Some(ImportDecl { source, span });
                }
                TokenKind::Semi | TokenKind::Eof => {
                    self.error_at_current(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "import declaration without a module specifier",
                    );
                    return None;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse the rest of a function declaration, after `function`.
    pub(crate) fn parse_function_rest(&mut self) -> Option<FunctionDecl> {
        let start = self.previous_span();
        let name = self.expect_ident("function name")?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        Some(FunctionDecl {
            name,
            params,
            body,
            span,
        })
    }

    /// `( ident, ... )`
    pub(crate) fn parse_params(&mut self) -> Option<Vec<Ident>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Some(params)
    }
}
