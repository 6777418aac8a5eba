//! Runtime half of glw-matrix: loads the compiled numeric module, wires
//! the fixed `env` import vocabulary, partitions its exports into per-type
//! namespaces, and bridges the host-facing methods.
//!
//! The flow mirrors the build-time tables: the module exports flat
//! `<type>_<method>` functions; [`partition`] splits them per type,
//! [`TypeNamespace::validate`] checks the required method table, and
//! [`bridge`] derives the namespace the host actually uses — `str`,
//! `view`, and boolean equality on top of the raw callables.
//!
//! Everything is synchronous: wasmi validates and links inline and no
//! caller code runs concurrently with instantiation.

mod bridge;
mod config;
mod error;
mod host;
mod linker;
mod loader;
mod memory;
mod view;

pub use bridge::{bridge, BridgedMethod, Operand, TypeShape, MAT4, VEC3, VEC4};
pub use config::{ImportRecord, LoadConfig};
pub use error::{Result, RuntimeError};
pub use host::{HostState, PrintCharFn, PrintIntFn, RandomFn, DEFAULT_RANDOM_SEED};
pub use linker::{partition, partition_names, MethodBinding, TypeNamespace};
pub use loader::{Loader, ModuleInstance};
pub use memory::MemoryRegion;
pub use view::AddressView;
