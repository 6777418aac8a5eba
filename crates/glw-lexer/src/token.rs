//! Token types for the routine-source lexer.
//!
//! Defines [`TokenKind`] covering the ES-module subset the analyzer
//! understands and [`Token`], which pairs a kind with a byte [`Span`].

use glw_types::Span;
use std::fmt;

/// Reserved words recognized by the lexer.
///
/// Contextual words (`of`, `from`, `as`) are deliberately absent — they lex
/// as identifiers and the parser matches them by name where the grammar
/// calls for them.
pub const ALL_KEYWORDS: &[&str] = &[
    "export", "import", "function", "return", "new", "let", "const", "var", "if", "else", "for",
    "while", "do", "break", "continue", "true", "false", "null", "typeof", "instanceof", "in",
    "this", "void", "delete",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source byte range.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the routine-source grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// Numeric literal: `42`, `3.14`, `.5`, `1e-6`, `0xff`
    Number(f64),
    /// String literal (single- or double-quoted), escapes decoded.
    Str(String),
    /// Template literal, captured raw between the backticks. The content is
    /// never interpreted; `${}` nesting is tracked only to find the end.
    Template(String),

    // ── Identifiers & keywords ────────────────────────────────
    /// User identifier: `out`, `glMatrix`, `ARRAY_TYPE`
    Ident(String),
    Export,
    Import,
    Function,
    Return,
    New,
    Let,
    Const,
    Var,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    True,
    False,
    Null,
    Typeof,
    InstanceOf,
    In,
    This,
    Void,
    Delete,

    // ── Punctuation ───────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Colon,
    Question,
    /// `=>`
    Arrow,

    // ── Operators ─────────────────────────────────────────────
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PowAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    UShr,
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,

    /// End of input. The token stream always ends with exactly one.
    Eof,
}

impl TokenKind {
    /// Map a word to its keyword token, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "export" => Self::Export,
            "import" => Self::Import,
            "function" => Self::Function,
            "return" => Self::Return,
            "new" => Self::New,
            "let" => Self::Let,
            "const" => Self::Const,
            "var" => Self::Var,
            "if" => Self::If,
            "else" => Self::Else,
            "for" => Self::For,
            "while" => Self::While,
            "do" => Self::Do,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            "typeof" => Self::Typeof,
            "instanceof" => Self::InstanceOf,
            "in" => Self::In,
            "this" => Self::This,
            "void" => Self::Void,
            "delete" => Self::Delete,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Template(_) => write!(f, "`...`"),
            Self::Ident(name) => write!(f, "{name}"),
            Self::Export => write!(f, "export"),
            Self::Import => write!(f, "import"),
            Self::Function => write!(f, "function"),
            Self::Return => write!(f, "return"),
            Self::New => write!(f, "new"),
            Self::Let => write!(f, "let"),
            Self::Const => write!(f, "const"),
            Self::Var => write!(f, "var"),
            Self::If => write!(f, "if"),
            Self::Else => write!(f, "else"),
            Self::For => write!(f, "for"),
            Self::While => write!(f, "while"),
            Self::Do => write!(f, "do"),
            Self::Break => write!(f, "break"),
            Self::Continue => write!(f, "continue"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Null => write!(f, "null"),
            Self::Typeof => write!(f, "typeof"),
            Self::InstanceOf => write!(f, "instanceof"),
            Self::In => write!(f, "in"),
            Self::This => write!(f, "this"),
            Self::Void => write!(f, "void"),
            Self::Delete => write!(f, "delete"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Semi => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Colon => write!(f, ":"),
            Self::Question => write!(f, "?"),
            Self::Arrow => write!(f, "=>"),
            Self::Assign => write!(f, "="),
            Self::PlusAssign => write!(f, "+="),
            Self::MinusAssign => write!(f, "-="),
            Self::StarAssign => write!(f, "*="),
            Self::SlashAssign => write!(f, "/="),
            Self::PercentAssign => write!(f, "%="),
            Self::PowAssign => write!(f, "**="),
            Self::ShlAssign => write!(f, "<<="),
            Self::ShrAssign => write!(f, ">>="),
            Self::UShrAssign => write!(f, ">>>="),
            Self::AmpAssign => write!(f, "&="),
            Self::PipeAssign => write!(f, "|="),
            Self::CaretAssign => write!(f, "^="),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::EqEqEq => write!(f, "==="),
            Self::NotEqEq => write!(f, "!=="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::Shl => write!(f, "<<"),
            Self::Shr => write!(f, ">>"),
            Self::UShr => write!(f, ">>>"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::StarStar => write!(f, "**"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::PlusPlus => write!(f, "++"),
            Self::MinusMinus => write!(f, "--"),
            Self::Amp => write!(f, "&"),
            Self::AmpAmp => write!(f, "&&"),
            Self::Pipe => write!(f, "|"),
            Self::PipePipe => write!(f, "||"),
            Self::Caret => write!(f, "^"),
            Self::Tilde => write!(f, "~"),
            Self::Bang => write!(f, "!"),
            Self::Eof => write!(f, "<eof>"),
        }
    }
}
