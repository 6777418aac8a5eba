//! Build-time interface analyzer.
//!
//! Classifies every exported routine of a gl-matrix style source module by
//! its calling convention — scalar-like routines return the `out` reference
//! they were handed, pointer-like routines return a freshly built value —
//! and assembles the per-module interface tables the runtime bridge
//! consumes. The classification is purely syntactic: no source is ever
//! executed and imports are never resolved.

mod classify;
mod table;

pub use classify::classify;
pub use table::{build_tables, TableError};
