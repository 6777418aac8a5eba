//! Wasm module loading and import wiring.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use wasmi::core::ValType;
use wasmi::{
    Caller, Engine, Global, Linker, Memory, MemoryType, Module, Mutability, Store, Table,
    TableType, Val,
};

use crate::bridge::TypeShape;
use crate::config::{ImportRecord, LoadConfig};
use crate::error::{Result, RuntimeError};
use crate::host::{Fault, HostState};
use crate::linker::{partition, TypeNamespace};
use crate::memory::MemoryRegion;

/// The canonical empty module, used to probe the engine.
const EMPTY_MODULE: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

const WASM_PAGE_SIZE: u32 = 65_536;

/// Owns the engine and the store; instantiates payload modules against the
/// fixed `env` import vocabulary.
pub struct Loader {
    engine: Engine,
    store: Store<HostState>,
}

impl Loader {
    /// Construct the engine and probe it with the canonical empty module.
    ///
    /// A probe failure surfaces as [`RuntimeError::EnvironmentUnsupported`]
    /// before any payload work happens.
    pub fn new() -> Result<Self> {
        let engine = Engine::default();
        Module::new(&engine, &EMPTY_MODULE[..])
            .map_err(|e| RuntimeError::EnvironmentUnsupported(e.to_string()))?;
        let store = Store::new(&engine, HostState::default());
        Ok(Self { engine, store })
    }

    pub fn store(&self) -> &Store<HostState> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<HostState> {
        &mut self.store
    }

    /// Validate, link, and instantiate a payload module.
    ///
    /// The binary is validated with `wasmparser` first; validation and
    /// wasmi link/start failures both surface as
    /// [`RuntimeError::Instantiation`] carrying the underlying message.
    pub fn instantiate(&mut self, binary: &[u8], config: LoadConfig) -> Result<ModuleInstance> {
        wasmparser::validate(binary).map_err(instantiation_error)?;
        let module = Module::new(&self.engine, binary).map_err(instantiation_error)?;

        let LoadConfig {
            initial_memory_pages,
            memory_base,
            table_base,
            shared_memory,
            shared_table,
            random,
            print_int,
            print_char,
            random_seed,
        } = config;

        let record = ImportRecord {
            memory_base,
            table_base,
            initial_memory_pages,
            shared_memory: shared_memory.is_some(),
            shared_table: shared_table.is_some(),
            random_overridden: random.is_some(),
            print_int_overridden: print_int.is_some(),
            print_char_overridden: print_char.is_some(),
        };

        let generation = Arc::new(AtomicU64::new(0));
        self.store
            .data_mut()
            .configure(random_seed, random, print_int, print_char, generation.clone());

        let memory = match shared_memory {
            Some(memory) => memory,
            None => {
                let ty = MemoryType::new(initial_memory_pages, None)
                    .map_err(instantiation_error)?;
                Memory::new(&mut self.store, ty).map_err(instantiation_error)?
            }
        };
        let table = match shared_table {
            Some(table) => table,
            None => Table::new(
                &mut self.store,
                TableType::new(ValType::FuncRef, 0, None),
                Val::FuncRef(wasmi::FuncRef::null()),
            )
            .map_err(instantiation_error)?,
        };
        let memory_base_global = Global::new(
            &mut self.store,
            Val::I32(memory_base as i32),
            Mutability::Const,
        );
        let table_base_global = Global::new(
            &mut self.store,
            Val::I32(table_base as i32),
            Mutability::Const,
        );

        let mut linker = Linker::<HostState>::new(&self.engine);
        linker
            .define("env", "memory", memory)
            .and_then(|l| l.define("env", "table", table))
            .and_then(|l| l.define("env", "memoryBase", memory_base_global))
            .and_then(|l| l.define("env", "tableBase", table_base_global))
            .map_err(instantiation_error)?;

        linker
            .func_wrap("env", "randf", |mut caller: Caller<'_, HostState>| -> f64 {
                caller.data_mut().next_random()
            })
            .and_then(|l| {
                l.func_wrap("env", "printi", |mut caller: Caller<'_, HostState>, value: i32| {
                    caller.data_mut().print_int(value);
                })
            })
            .and_then(|l| {
                l.func_wrap("env", "printch", |mut caller: Caller<'_, HostState>, code: i32| {
                    let c = char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER);
                    caller.data_mut().print_char(c);
                })
            })
            .and_then(|l| {
                l.func_wrap(
                    "env",
                    "_abort",
                    |mut caller: Caller<'_, HostState>, code: i32| -> std::result::Result<(), wasmi::Error> {
                        caller.data_mut().record_fault(Fault::Abort(code));
                        Err(wasmi::Error::new(format!("abort({code})")))
                    },
                )
            })
            .and_then(|l| {
                l.func_wrap(
                    "env",
                    "_exit",
                    |mut caller: Caller<'_, HostState>, code: i32| -> std::result::Result<(), wasmi::Error> {
                        // A zero exit is a silent no-op.
                        if code == 0 {
                            return Ok(());
                        }
                        caller.data_mut().record_fault(Fault::Exit(code));
                        Err(wasmi::Error::new(format!("exit({code})")))
                    },
                )
            })
            .and_then(|l| {
                l.func_wrap("env", "_grow", |caller: Caller<'_, HostState>| {
                    caller.data().bump_generation();
                })
            })
            .map_err(instantiation_error)?;

        let instance = linker
            .instantiate(&mut self.store, &module)
            .map_err(instantiation_error)?
            .start(&mut self.store)
            .map_err(instantiation_error)?;

        let record = ImportRecord {
            initial_memory_pages: memory.data(&self.store).len() as u32 / WASM_PAGE_SIZE,
            ..record
        };

        Ok(ModuleInstance {
            instance,
            region: MemoryRegion::new(memory, generation),
            record,
        })
    }
}

fn instantiation_error(error: impl std::fmt::Display) -> RuntimeError {
    RuntimeError::Instantiation(error.to_string())
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}

/// A loaded payload module: the wasmi instance, its memory region, and the
/// record of what the instantiation resolved to.
#[derive(Debug)]
pub struct ModuleInstance {
    instance: wasmi::Instance,
    region: MemoryRegion,
    record: ImportRecord,
}

impl ModuleInstance {
    pub fn instance(&self) -> &wasmi::Instance {
        &self.instance
    }

    pub fn region(&self) -> &MemoryRegion {
        &self.region
    }

    pub fn record(&self) -> &ImportRecord {
        &self.record
    }

    /// Partition this instance's function exports for one type prefix and
    /// validate the result against the shape's required method table.
    pub fn namespace(
        &self,
        store: &Store<HostState>,
        shape: &TypeShape,
    ) -> Result<TypeNamespace> {
        let namespace = partition(&self.instance, store, shape.name);
        namespace.validate(shape)?;
        Ok(namespace)
    }
}
