use thiserror::Error;

/// A runtime pipeline failure.
///
/// Nothing here is retried; every error propagates to the immediate caller.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The wasm engine could not compile the canonical empty module.
    #[error("wasm engine unavailable: {0}")]
    EnvironmentUnsupported(String),
    /// Validation, compilation, or linking of the payload failed.
    #[error("module instantiation failed: {0}")]
    Instantiation(String),
    /// The module called `_abort`.
    #[error("module aborted with code {0}")]
    AbortSignal(i32),
    /// The module called `_exit` with a non-zero code.
    #[error("module exited abnormally with code {0}")]
    AbnormalExit(i32),
    /// A type namespace lacks a method its shape requires.
    #[error("type '{type_name}' is missing required method '{method}'")]
    MissingMethod { type_name: String, method: String },
    /// An export was looked up that the module does not provide.
    #[error("missing export '{0}'")]
    MissingExport(String),
    /// An element address is not aligned for its element width.
    #[error("misaligned element address {address:#x}")]
    Misaligned { address: u32 },
    /// A read or write reaches past the end of linear memory.
    #[error("address range {address:#x}..+{len} is out of bounds")]
    OutOfBounds { address: u32, len: u32 },
    /// The memory region grew since this view was created.
    #[error("stale view: created at generation {created}, memory is at {current}")]
    StaleView { created: u64, current: u64 },
    /// A wasm call trapped for a reason other than `_abort`/`_exit`.
    #[error("wasm call failed: {0}")]
    Call(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
