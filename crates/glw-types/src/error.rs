use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Classification,
    Table,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNEXPECTED_EOF: Self = Self(101);
    pub const UNTERMINATED_STRING: Self = Self(102);
    pub const UNTERMINATED_COMMENT: Self = Self(103);
    pub const UNTERMINATED_TEMPLATE: Self = Self(104);
    pub const INVALID_NUMBER: Self = Self(105);
    pub const STRAY_CHARACTER: Self = Self(106);
    pub const NESTING_TOO_DEEP: Self = Self(110);

    // ── Classification errors (E200–E299) ──
    pub const MISSING_RETURN: Self = Self(200);

    // ── Table errors (E300–E399) ──
    pub const MISSING_SOURCE: Self = Self(300);
    pub const UNREADABLE_SOURCE: Self = Self(301);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Syntax,
            200..=299 => ErrorCategory::Classification,
            _ => ErrorCategory::Table,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured analysis error.
///
/// Carries everything a build log or a downstream tool needs to render the
/// problem without re-reading the source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeError {
    /// Source file name.
    pub file: String,
    /// Error code (e.g. E200).
    pub code: ErrorCode,
    /// Error severity.
    pub severity: Severity,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// 1-based line of the span start.
    pub line: u32,
    /// 1-based column of the span start.
    pub column: u32,
    /// Byte span into the source.
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
}

impl AnalyzeError {
    /// Create a new error, resolving line/column context from the file.
    pub fn new(
        source_file: &SourceFile,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        let lc = source_file.line_col(span.start);
        Self {
            file: source_file.name.clone(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            line: lc.line,
            column: lc.column,
            span,
            source_line: source_file.line_for(span).to_string(),
        }
    }

    /// Create an error with no source context (table-level failures).
    pub fn bare(file: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            line: 0,
            column: 0,
            span: Span::point(0),
            source_line: String::new(),
        }
    }
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.file, self.line, self.column, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for AnalyzeError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Classification => write!(f, "classification"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Collected analysis errors for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeErrors {
    pub errors: Vec<AnalyzeError>,
    pub total_errors: usize,
}

impl AnalyzeErrors {
    /// Create an empty collection.
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            total_errors: 0,
        }
    }

    /// Check if any error was recorded.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Returns `true` once the reporting cap is reached.
    pub fn at_cap(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push(&mut self, error: AnalyzeError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Move the first error out, if any.
    pub fn into_first(mut self) -> Option<AnalyzeError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.remove(0))
        }
    }
}

impl Default for AnalyzeErrors {
    fn default() -> Self {
        Self::empty()
    }
}
