//! Shared types for the glw-matrix analysis pipeline.
//!
//! This crate defines the AST node types for the routine-source grammar,
//! byte-offset source spans, structured analyzer errors, and the interface
//! table shapes consumed by the downstream wrapper-stub generator.

mod error;
mod interface;
mod span;
pub mod ast;

pub use error::{AnalyzeError, AnalyzeErrors, ErrorCategory, ErrorCode, Severity, MAX_ERRORS};
pub use interface::{
    InterfaceTable, InterfaceTables, ModuleInterface, ReturnShape, ReviewEntry, RoutineDescriptor,
};
pub use span::{LineCol, SourceFile, Span};

/// Result type used throughout the analysis pipeline.
pub type Result<T> = std::result::Result<T, AnalyzeError>;
