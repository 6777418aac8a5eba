//! Facade over the runtime pipeline.
//!
//! [`initialize`] takes the compiled numeric module and yields a [`Bridge`]
//! with the three type namespaces ready to use: engine probe, validation,
//! instantiation, export partitioning, required-method validation, and
//! bridging happen in one pass. There is no partial success — any failure
//! along the way yields an error and no namespaces at all.
//!
//! ```no_run
//! # fn main() -> glw_matrix::Result<()> {
//! # let binary: &[u8] = &[];
//! let mut bridge = glw_matrix::initialize(binary)?;
//! let rendered = bridge.vec3().to_display_string(bridge.loader().store(), 0)?;
//! # Ok(())
//! # }
//! ```

pub use glw_runtime::{
    AddressView, ImportRecord, LoadConfig, Loader, MemoryRegion, MethodBinding, ModuleInstance,
    Operand, Result, RuntimeError, TypeNamespace, TypeShape, MAT4, VEC3, VEC4,
};

use glw_runtime::bridge as bridge_namespace;

/// The loaded module plus its three bridged namespaces.
///
/// Owns the loader, and through it the wasmi store every method call and
/// memory access goes through.
pub struct Bridge {
    loader: Loader,
    instance: ModuleInstance,
    vec3: TypeNamespace,
    vec4: TypeNamespace,
    mat4: TypeNamespace,
}

impl Bridge {
    pub fn vec3(&self) -> &TypeNamespace {
        &self.vec3
    }

    pub fn vec4(&self) -> &TypeNamespace {
        &self.vec4
    }

    pub fn mat4(&self) -> &TypeNamespace {
        &self.mat4
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut Loader {
        &mut self.loader
    }

    pub fn instance(&self) -> &ModuleInstance {
        &self.instance
    }

    /// The module's memory region, for direct checked reads and writes.
    pub fn region(&self) -> &MemoryRegion {
        self.instance.region()
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("vec3", &self.vec3)
            .field("vec4", &self.vec4)
            .field("mat4", &self.mat4)
            .finish_non_exhaustive()
    }
}

/// Load `binary` with the default [`LoadConfig`].
pub fn initialize(binary: &[u8]) -> Result<Bridge> {
    initialize_with(binary, LoadConfig::default())
}

/// Load `binary` with an explicit configuration.
pub fn initialize_with(binary: &[u8], config: LoadConfig) -> Result<Bridge> {
    let mut loader = Loader::new()?;
    let instance = loader.instantiate(binary, config)?;

    let vec3 = bridge_type(&loader, &instance, VEC3)?;
    let vec4 = bridge_type(&loader, &instance, VEC4)?;
    let mat4 = bridge_type(&loader, &instance, MAT4)?;

    Ok(Bridge {
        loader,
        instance,
        vec3,
        vec4,
        mat4,
    })
}

fn bridge_type(
    loader: &Loader,
    instance: &ModuleInstance,
    shape: TypeShape,
) -> Result<TypeNamespace> {
    let namespace = instance.namespace(loader.store(), &shape)?;
    Ok(bridge_namespace(&namespace, instance.region(), shape))
}
