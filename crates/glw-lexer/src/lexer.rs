//! Core routine-source lexer — converts source text to a token stream.
//!
//! Features:
//! - The full ES-subset token vocabulary the analyzer grammar needs
//! - Line and block comments stripped (JSDoc blocks included)
//! - Template literals captured raw, with `${}` nesting tracked
//! - Error recovery: collects up to 20 errors instead of stopping at the first
//!
//! `/` always lexes as an operator or comment opener: the gl-matrix style
//! sources this grammar targets contain no regular-expression literals.

use glw_types::{AnalyzeError, AnalyzeErrors, ErrorCode, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The routine-source lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`glw_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as bytes.
    source: &'src [u8],
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Collected errors.
    errors: AnalyzeErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: AnalyzeErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            errors: AnalyzeErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.at_cap() {
                break;
            }
            match self.scan() {
                Some(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                // Recoverable garbage was skipped; keep scanning.
                None => continue,
            }
        }

        // Ensure the stream always ends with Eof.
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos as u32)));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Cursor helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.errors
            .push(AnalyzeError::new(self.source_file, code, message, span));
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. Returns `None` when recoverable garbage was skipped.
    fn scan(&mut self) -> Option<Token> {
        self.skip_trivia();

        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Some(Token::new(TokenKind::Eof, Span::point(start as u32)));
        };

        match ch {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => Some(self.scan_word(start)),
            b'0'..=b'9' => Some(self.scan_number(start)),
            b'.' => {
                if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                    Some(self.scan_number(start))
                } else {
                    self.advance();
                    Some(Token::new(TokenKind::Dot, self.span_from(start)))
                }
            }
            b'"' | b'\'' => self.scan_string(start),
            b'`' => self.scan_template(start),
            _ => self.scan_operator(start),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut closed = false;
                    while let Some(c) = self.advance() {
                        if c == b'*' && self.eat(b'/') {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        self.error(
                            ErrorCode::UNTERMINATED_COMMENT,
                            "unterminated block comment",
                            self.span_from(start),
                        );
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_word(&mut self, start: usize) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
        {
            self.advance();
        }
        let word = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let kind = TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_string()));
        Token::new(kind, self.span_from(start))
    }

    fn scan_number(&mut self, start: usize) -> Token {
        // Hex form.
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x') | Some(b'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let digits = std::str::from_utf8(&self.source[digits_start..self.pos]).unwrap_or("");
            let span = self.span_from(start);
            return match u64::from_str_radix(digits, 16) {
                Ok(v) if !digits.is_empty() => Token::new(TokenKind::Number(v as f64), span),
                _ => {
                    self.error(ErrorCode::INVALID_NUMBER, "malformed hex literal", span);
                    Token::new(TokenKind::Number(0.0), span)
                }
            };
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        let span = self.span_from(start);
        match text.parse::<f64>() {
            Ok(v) => Token::new(TokenKind::Number(v), span),
            Err(_) => {
                self.error(
                    ErrorCode::INVALID_NUMBER,
                    format!("malformed number literal '{text}'"),
                    span,
                );
                Token::new(TokenKind::Number(0.0), span)
            }
        }
    }

    fn scan_string(&mut self, start: usize) -> Option<Token> {
        let quote = self.advance().unwrap_or(b'"');
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    self.error(
                        ErrorCode::UNTERMINATED_STRING,
                        "unterminated string literal",
                        self.span_from(start),
                    );
                    return None;
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Some(Token::new(TokenKind::Str(value), self.span_from(start)));
                }
                Some(b'\\') => {
                    self.advance();
                    match self.advance() {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'r') => value.push('\r'),
                        Some(b'0') => value.push('\0'),
                        Some(b'u') => value.push_str(&self.scan_unicode_escape()),
                        Some(other) => value.push(other as char),
                        None => {}
                    }
                }
                Some(other) => {
                    self.advance();
                    value.push(other as char);
                }
            }
        }
    }

    /// `\uXXXX` after the `\u` has been consumed. Malformed escapes pass
    /// through literally rather than erroring — the analyzer never
    /// interprets string contents.
    fn scan_unicode_escape(&mut self) -> String {
        let mut digits = String::new();
        for _ in 0..4 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c as char);
                    self.advance();
                }
                _ => break,
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| format!("\\u{digits}"))
    }

    fn scan_template(&mut self, start: usize) -> Option<Token> {
        self.advance(); // opening backtick
        let content_start = self.pos;
        // Depth of `${` interpolations; the closing backtick only counts at
        // depth zero.
        let mut depth: u32 = 0;
        loop {
            match self.peek() {
                None => {
                    self.error(
                        ErrorCode::UNTERMINATED_TEMPLATE,
                        "unterminated template literal",
                        self.span_from(start),
                    );
                    return None;
                }
                Some(b'`') if depth == 0 => {
                    let raw = std::str::from_utf8(&self.source[content_start..self.pos])
                        .unwrap_or("")
                        .to_string();
                    self.advance();
                    return Some(Token::new(TokenKind::Template(raw), self.span_from(start)));
                }
                Some(b'\\') => {
                    self.advance();
                    self.advance();
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    self.pos += 2;
                    depth += 1;
                }
                Some(b'{') if depth > 0 => {
                    self.advance();
                    depth += 1;
                }
                Some(b'}') if depth > 0 => {
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_operator(&mut self, start: usize) -> Option<Token> {
        let ch = self.advance()?;
        let kind = match ch {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b';' => TokenKind::Semi,
            b',' => TokenKind::Comma,
            b':' => TokenKind::Colon,
            b'?' => TokenKind::Question,
            b'~' => TokenKind::Tilde,
            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.eat(b'>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Assign
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'<') {
                    if self.eat(b'=') {
                        TokenKind::ShlAssign
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat(b'=') {
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.eat(b'>') {
                    if self.eat(b'>') {
                        if self.eat(b'=') {
                            TokenKind::UShrAssign
                        } else {
                            TokenKind::UShr
                        }
                    } else if self.eat(b'=') {
                        TokenKind::ShrAssign
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat(b'=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'*') {
                    if self.eat(b'=') {
                        TokenKind::PowAssign
                    } else {
                        TokenKind::StarStar
                    }
                } else if self.eat(b'=') {
                    TokenKind::StarAssign
                } else {
                    TokenKind::Star
                }
            }
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashAssign
                } else {
                    TokenKind::Slash
                }
            }
            b'%' => {
                if self.eat(b'=') {
                    TokenKind::PercentAssign
                } else {
                    TokenKind::Percent
                }
            }
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else if self.eat(b'=') {
                    TokenKind::AmpAssign
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else if self.eat(b'=') {
                    TokenKind::PipeAssign
                } else {
                    TokenKind::Pipe
                }
            }
            b'^' => {
                if self.eat(b'=') {
                    TokenKind::CaretAssign
                } else {
                    TokenKind::Caret
                }
            }
            other => {
                let span = self.span_from(start);
                self.error(
                    ErrorCode::STRAY_CHARACTER,
                    format!("unexpected character '{}'", other as char),
                    span,
                );
                return None;
            }
        };
        Some(Token::new(kind, self.span_from(start)))
    }
}
