//! Interface table assembly.
//!
//! Reads one source file per module from a source directory, classifies
//! each, and assembles the full table, the special-interface subset, and
//! the review list. Building never writes anything; callers decide whether
//! to persist the serialized tables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glw_types::{
    AnalyzeError, ErrorCode, InterfaceTable, InterfaceTables, ModuleInterface, ReviewEntry,
    SourceFile,
};
use thiserror::Error;

use crate::classify::classify;

/// A table-builder failure.
#[derive(Debug, Error)]
pub enum TableError {
    /// A named module has no `<name>.js` in the source directory.
    #[error("missing routine source for module '{module}': {}", path.display())]
    MissingSource { module: String, path: PathBuf },
    /// The source file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Classification of one module failed.
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

impl TableError {
    /// The numeric error code of this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingSource { .. } => ErrorCode::MISSING_SOURCE,
            Self::UnreadableSource { .. } => ErrorCode::UNREADABLE_SOURCE,
            Self::Analyze(error) => error.code,
        }
    }
}

/// Build the interface tables for an ordered list of module names.
///
/// Each module is read from `<source_dir>/<name>.js`. A missing or
/// unreadable file fails the whole build; partial tables are never
/// produced. Output maps are ordered, so serializing the same sources
/// twice yields byte-identical JSON.
pub fn build_tables(source_dir: &Path, modules: &[&str]) -> Result<InterfaceTables, TableError> {
    let mut full = InterfaceTable::new();
    let mut special = InterfaceTable::new();
    let mut review = Vec::new();

    for &module in modules {
        let path = source_dir.join(format!("{module}.js"));
        if !path.is_file() {
            return Err(TableError::MissingSource {
                module: module.to_string(),
                path,
            });
        }
        let text = fs::read_to_string(&path)
            .map_err(|source| TableError::UnreadableSource { path, source })?;

        let source_file = SourceFile::new(format!("{module}.js"), text);
        let interface = classify(&source_file)?;

        for (routine, descriptor) in &interface {
            if descriptor.multi_return() {
                review.push(ReviewEntry {
                    module: module.to_string(),
                    routine: routine.clone(),
                });
            }
        }
        let subset: ModuleInterface = interface
            .iter()
            .filter(|(_, d)| d.special_interface())
            .map(|(name, d)| (name.clone(), d.clone()))
            .collect();
        if !subset.is_empty() {
            special.insert(module.to_string(), subset);
        }
        full.insert(module.to_string(), interface);
    }

    Ok(InterfaceTables {
        full,
        special,
        review,
    })
}
