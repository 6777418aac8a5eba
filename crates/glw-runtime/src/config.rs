//! Instantiation configuration.

use crate::host::{PrintCharFn, PrintIntFn, RandomFn, DEFAULT_RANDOM_SEED};

/// Configuration for one [`Loader::instantiate`](crate::Loader::instantiate)
/// call.
///
/// Resolved once at instantiation; the loader never mutates or re-reads it
/// afterwards. Every field has a documented default, so callers typically
/// write `LoadConfig { random_seed: 42, ..LoadConfig::default() }`.
pub struct LoadConfig {
    /// Pages of fresh linear memory when no shared memory is supplied.
    /// Default 1. Ignored when `shared_memory` is set.
    pub initial_memory_pages: u32,
    /// Value of the immutable `env.memoryBase` i32 global. Default 0.
    pub memory_base: u32,
    /// Value of the immutable `env.tableBase` i32 global. Default 0.
    pub table_base: u32,
    /// Externally supplied linear memory. Must originate from the loader's
    /// own store. Default: a fresh memory of `initial_memory_pages` pages.
    pub shared_memory: Option<wasmi::Memory>,
    /// Externally supplied funcref table, same store requirement.
    /// Default: a fresh empty table.
    pub shared_table: Option<wasmi::Table>,
    /// Override for the `env.randf` import. Default: a splitmix64 source
    /// seeded with `random_seed`.
    pub random: Option<RandomFn>,
    /// Override for the `env.printi` sink. Default writes the integer and a
    /// newline to stdout.
    pub print_int: Option<PrintIntFn>,
    /// Override for the `env.printch` sink. The code unit is decoded to a
    /// `char` before the sink sees it, U+FFFD when invalid. Default writes
    /// to stdout.
    pub print_char: Option<PrintCharFn>,
    /// Seed for the default random source. Default
    /// [`DEFAULT_RANDOM_SEED`](crate::DEFAULT_RANDOM_SEED).
    pub random_seed: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            initial_memory_pages: 1,
            memory_base: 0,
            table_base: 0,
            shared_memory: None,
            shared_table: None,
            random: None,
            print_int: None,
            print_char: None,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

/// What one instantiation actually resolved to, kept on the
/// [`ModuleInstance`](crate::ModuleInstance) for later bridging and
/// inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRecord {
    pub memory_base: u32,
    pub table_base: u32,
    /// Pages the fresh memory started with; the shared memory's current
    /// page count when one was supplied.
    pub initial_memory_pages: u32,
    pub shared_memory: bool,
    pub shared_table: bool,
    pub random_overridden: bool,
    pub print_int_overridden: bool,
    pub print_char_overridden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoadConfig::default();
        assert_eq!(config.initial_memory_pages, 1);
        assert_eq!(config.memory_base, 0);
        assert_eq!(config.table_base, 0);
        assert!(config.shared_memory.is_none());
        assert!(config.shared_table.is_none());
        assert!(config.random.is_none());
        assert_eq!(config.random_seed, DEFAULT_RANDOM_SEED);
    }
}
