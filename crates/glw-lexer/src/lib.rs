//! Routine-source lexer: converts source text to a token stream.

pub mod token;
mod lexer;

pub use lexer::{LexResult, Lexer};
pub use token::{Token, TokenKind};
