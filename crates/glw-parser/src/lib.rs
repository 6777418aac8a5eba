//! Routine-source parser for the interface analyzer.
//!
//! Parses the ES-module subset that gl-matrix routine sources are written
//! in: imports, exported function and variable declarations, statements,
//! and full-precedence expressions. The AST lives in [`glw_types::ast`];
//! the classifier walks it to derive routine descriptors.
//!
//! Parsing never panics on malformed input. Errors are collected into
//! [`glw_types::AnalyzeErrors`] and the parser recovers at statement
//! boundaries; a program is only produced when no errors were recorded.

mod parse_expr;
mod parse_stmt;
mod parser;

pub use parser::{ParseResult, Parser};

use glw_lexer::Lexer;
use glw_types::SourceFile;

/// Lex and parse a source file in one step.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    if lexed.errors.has_errors() {
        return ParseResult {
            program: None,
            errors: lexed.errors,
        };
    }
    Parser::new(lexed.tokens, source_file).parse()
}
