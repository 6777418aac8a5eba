//! Integration tests for the runtime pipeline, driven by a hand-assembled
//! wasm fixture that mimics the compiled numeric module's layout: flat
//! `<type>_<method>` exports over an imported `env` memory.

use std::sync::{Arc, Mutex};

use glw_runtime::{
    bridge, LoadConfig, Loader, Operand, RuntimeError, MAT4, VEC3, VEC4,
};
use wasm_encoder::{
    CodeSection, EntityType, ExportKind, ExportSection, Function, FunctionSection, GlobalType,
    ImportSection, Instruction, MemArg, MemoryType, Module, RefType, TableType, TypeSection,
    ValType,
};

// Type indices in the fixture module.
const TY_VOID_F64: u32 = 0;
const TY_I32_VOID: u32 = 1;
const TY_VOID_VOID: u32 = 2;
const TY_I32X3_I32: u32 = 3;
const TY_I32X2_I32: u32 = 4;
const TY_VOID_I32: u32 = 5;

// Imported function indices.
const IMP_RANDF: u32 = 0;
const IMP_PRINTI: u32 = 1;
const IMP_PRINTCH: u32 = 2;
const IMP_ABORT: u32 = 3;
const IMP_EXIT: u32 = 4;
const IMP_GROW: u32 = 5;
const IMPORT_COUNT: u32 = 6;

fn memarg(offset: u64) -> MemArg {
    MemArg {
        offset,
        align: 2,
        memory_index: 0,
    }
}

/// `<type>_add(out, a, b) -> out`, unrolled over `n` f32 elements.
fn add_body(n: u64) -> Function {
    let mut f = Function::new([]);
    for i in 0..n {
        f.instruction(&Instruction::LocalGet(0))
            .instruction(&Instruction::LocalGet(1))
            .instruction(&Instruction::F32Load(memarg(i * 4)))
            .instruction(&Instruction::LocalGet(2))
            .instruction(&Instruction::F32Load(memarg(i * 4)))
            .instruction(&Instruction::F32Add)
            .instruction(&Instruction::F32Store(memarg(i * 4)));
    }
    f.instruction(&Instruction::LocalGet(0))
        .instruction(&Instruction::End);
    f
}

/// `<type>_exactEquals(a, b) -> i32`, an and-chain of per-element f32.eq.
fn eq_body(n: u64) -> Function {
    let mut f = Function::new([]);
    f.instruction(&Instruction::LocalGet(0))
        .instruction(&Instruction::F32Load(memarg(0)))
        .instruction(&Instruction::LocalGet(1))
        .instruction(&Instruction::F32Load(memarg(0)))
        .instruction(&Instruction::F32Eq);
    for i in 1..n {
        f.instruction(&Instruction::LocalGet(0))
            .instruction(&Instruction::F32Load(memarg(i * 4)))
            .instruction(&Instruction::LocalGet(1))
            .instruction(&Instruction::F32Load(memarg(i * 4)))
            .instruction(&Instruction::F32Eq)
            .instruction(&Instruction::I32And);
    }
    f.instruction(&Instruction::End);
    f
}

/// `(code) -> ()` forwarding to an imported sink.
fn forward_i32_body(import: u32) -> Function {
    let mut f = Function::new([]);
    f.instruction(&Instruction::LocalGet(0))
        .instruction(&Instruction::Call(import))
        .instruction(&Instruction::End);
    f
}

/// Assemble the full fixture module.
fn fixture_module() -> Vec<u8> {
    build_module(true)
}

/// A defective variant whose vec3 namespace lacks `equals`.
fn incomplete_module() -> Vec<u8> {
    build_module(false)
}

fn build_module(with_vec3_equals: bool) -> Vec<u8> {
    let mut types = TypeSection::new();
    types.ty().function(vec![], vec![ValType::F64]);
    types.ty().function(vec![ValType::I32], vec![]);
    types.ty().function(vec![], vec![]);
    types.ty().function(
        vec![ValType::I32, ValType::I32, ValType::I32],
        vec![ValType::I32],
    );
    types
        .ty()
        .function(vec![ValType::I32, ValType::I32], vec![ValType::I32]);
    types.ty().function(vec![], vec![ValType::I32]);

    let mut imports = ImportSection::new();
    imports.import(
        "env",
        "memory",
        EntityType::Memory(MemoryType {
            minimum: 1,
            maximum: None,
            memory64: false,
            shared: false,
            page_size_log2: None,
        }),
    );
    imports.import(
        "env",
        "table",
        EntityType::Table(TableType {
            element_type: RefType::FUNCREF,
            minimum: 0,
            maximum: None,
            table64: false,
            shared: false,
        }),
    );
    imports.import(
        "env",
        "memoryBase",
        EntityType::Global(GlobalType {
            val_type: ValType::I32,
            mutable: false,
            shared: false,
        }),
    );
    imports.import(
        "env",
        "tableBase",
        EntityType::Global(GlobalType {
            val_type: ValType::I32,
            mutable: false,
            shared: false,
        }),
    );
    imports.import("env", "randf", EntityType::Function(TY_VOID_F64));
    imports.import("env", "printi", EntityType::Function(TY_I32_VOID));
    imports.import("env", "printch", EntityType::Function(TY_I32_VOID));
    imports.import("env", "_abort", EntityType::Function(TY_I32_VOID));
    imports.import("env", "_exit", EntityType::Function(TY_I32_VOID));
    imports.import("env", "_grow", EntityType::Function(TY_VOID_VOID));

    // (name, type index, body)
    let mut defs: Vec<(&str, u32, Function)> = vec![
        ("vec3_add", TY_I32X3_I32, add_body(3)),
        ("vec3_exactEquals", TY_I32X2_I32, eq_body(3)),
    ];
    if with_vec3_equals {
        defs.push(("vec3_equals", TY_I32X2_I32, eq_body(3)));
    }
    defs.extend([
        ("vec4_add", TY_I32X3_I32, add_body(4)),
        ("vec4_exactEquals", TY_I32X2_I32, eq_body(4)),
        ("vec4_equals", TY_I32X2_I32, eq_body(4)),
        ("mat4_add", TY_I32X3_I32, add_body(16)),
        ("mat4_exactEquals", TY_I32X2_I32, eq_body(16)),
        ("mat4_equals", TY_I32X2_I32, eq_body(16)),
        ("vec3_abort", TY_I32_VOID, forward_i32_body(IMP_ABORT)),
        ("vec3_exit", TY_I32_VOID, forward_i32_body(IMP_EXIT)),
        ("debug_printi", TY_I32_VOID, forward_i32_body(IMP_PRINTI)),
        ("debug_printch", TY_I32_VOID, forward_i32_body(IMP_PRINTCH)),
    ]);

    // debug_grow(): grow memory by one page, then notify the host.
    let mut grow = Function::new([]);
    grow.instruction(&Instruction::I32Const(1))
        .instruction(&Instruction::MemoryGrow(0))
        .instruction(&Instruction::Drop)
        .instruction(&Instruction::Call(IMP_GROW))
        .instruction(&Instruction::End);
    defs.push(("debug_grow", TY_VOID_VOID, grow));

    // debug_rand(): forward the imported random source.
    let mut rand = Function::new([]);
    rand.instruction(&Instruction::Call(IMP_RANDF))
        .instruction(&Instruction::End);
    defs.push(("debug_rand", TY_VOID_F64, rand));

    // debug_membase(): read the imported memoryBase global.
    let mut membase = Function::new([]);
    membase
        .instruction(&Instruction::GlobalGet(0))
        .instruction(&Instruction::End);
    defs.push(("debug_membase", TY_VOID_I32, membase));

    let mut functions = FunctionSection::new();
    let mut exports = ExportSection::new();
    let mut code = CodeSection::new();
    for (i, (name, ty, body)) in defs.iter().enumerate() {
        functions.function(*ty);
        exports.export(name, ExportKind::Func, IMPORT_COUNT + i as u32);
        code.function(body);
    }

    let mut module = Module::new();
    module
        .section(&types)
        .section(&imports)
        .section(&functions)
        .section(&exports)
        .section(&code);
    module.finish()
}

/// Loader + instance + the three bridged namespaces.
struct Fixture {
    loader: Loader,
    vec3: glw_runtime::TypeNamespace,
    vec4: glw_runtime::TypeNamespace,
    mat4: glw_runtime::TypeNamespace,
    instance: glw_runtime::ModuleInstance,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(LoadConfig::default())
    }

    fn with_config(config: LoadConfig) -> Self {
        let mut loader = Loader::new().expect("engine probe");
        let instance = loader
            .instantiate(&fixture_module(), config)
            .expect("instantiate fixture");
        let [vec3, vec4, mat4] = [VEC3, VEC4, MAT4].map(|shape| {
            let ns = instance
                .namespace(loader.store(), &shape)
                .expect("partition and validate");
            bridge(&ns, instance.region(), shape)
        });
        Self {
            loader,
            vec3,
            vec4,
            mat4,
            instance,
        }
    }

    /// Write consecutive f32s starting at `address`.
    fn write(&mut self, address: u32, values: &[f32]) {
        let region = self.instance.region().clone();
        for (i, v) in values.iter().enumerate() {
            region
                .write_f32(self.loader.store_mut(), address + i as u32 * 4, *v)
                .expect("write fixture value");
        }
    }

    fn call_add(&mut self, ns: &glw_runtime::TypeNamespace, out: u32, a: u32, b: u32) -> u32 {
        let func = ns.raw("add").expect("add export");
        let typed = func
            .typed::<(i32, i32, i32), i32>(self.loader.store())
            .expect("add signature");
        typed
            .call(self.loader.store_mut(), (out as i32, a as i32, b as i32))
            .expect("add call") as u32
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[test]
fn engine_probe_succeeds() {
    Loader::new().expect("probe should pass");
}

#[test]
fn garbage_binary_is_an_instantiation_error() {
    let mut loader = Loader::new().unwrap();
    let err = loader
        .instantiate(b"not wasm at all", LoadConfig::default())
        .expect_err("should fail");
    assert!(matches!(err, RuntimeError::Instantiation(_)), "{err:?}");
}

#[test]
fn missing_import_is_an_instantiation_error() {
    // A module importing a name outside the fixed vocabulary.
    let mut types = TypeSection::new();
    types.ty().function(vec![], vec![]);
    let mut imports = ImportSection::new();
    imports.import("env", "no_such_import", EntityType::Function(0));
    let mut module = Module::new();
    module.section(&types).section(&imports);

    let mut loader = Loader::new().unwrap();
    let err = loader
        .instantiate(&module.finish(), LoadConfig::default())
        .expect_err("should fail");
    assert!(matches!(err, RuntimeError::Instantiation(_)), "{err:?}");
}

#[test]
fn import_record_reflects_config() {
    let mut loader = Loader::new().unwrap();
    let instance = loader
        .instantiate(
            &fixture_module(),
            LoadConfig {
                memory_base: 1024,
                table_base: 8,
                ..LoadConfig::default()
            },
        )
        .unwrap();
    let record = instance.record();
    assert_eq!(record.memory_base, 1024);
    assert_eq!(record.table_base, 8);
    assert_eq!(record.initial_memory_pages, 1);
    assert!(!record.shared_memory);
    assert!(!record.random_overridden);
}

#[test]
fn memory_base_global_visible_to_module() {
    let mut loader = Loader::new().unwrap();
    let instance = loader
        .instantiate(
            &fixture_module(),
            LoadConfig {
                memory_base: 4096,
                ..LoadConfig::default()
            },
        )
        .unwrap();
    let membase = instance
        .instance()
        .get_typed_func::<(), i32>(loader.store(), "debug_membase")
        .expect("debug_membase export");
    assert_eq!(membase.call(loader.store_mut(), ()).unwrap(), 4096);
}

// ── Namespaces & bridged methods ──────────────────────────────────────────────

#[test]
fn missing_required_method_fails_validation() {
    let mut loader = Loader::new().unwrap();
    let instance = loader
        .instantiate(&incomplete_module(), LoadConfig::default())
        .unwrap();
    let err = instance
        .namespace(loader.store(), &VEC3)
        .expect_err("vec3_equals is absent");
    match err {
        RuntimeError::MissingMethod { type_name, method } => {
            assert_eq!(type_name, "vec3");
            assert_eq!(method, "equals");
        }
        other => panic!("expected MissingMethod, got {other:?}"),
    }
    // The other namespaces are unaffected.
    instance
        .namespace(loader.store(), &VEC4)
        .expect("vec4 still validates");
}

#[test]
fn add_writes_through_shared_memory() {
    let mut fx = Fixture::new();
    fx.write(0, &[1.0, 2.0, 3.0]);
    fx.write(16, &[10.0, 20.0, 30.0]);
    let vec3 = fx.vec3.clone();
    let out = fx.call_add(&vec3, 32, 0, 16);
    assert_eq!(out, 32);
    let values = fx
        .instance
        .region()
        .read_f32_slice(fx.loader.store(), 32, 3)
        .unwrap();
    assert_eq!(values, [11.0, 22.0, 33.0]);
}

#[test]
fn str_renders_prefixed_tuple() {
    let mut fx = Fixture::new();
    fx.write(0, &[1.0, 2.5, -3.0]);
    let rendered = fx.vec3.to_display_string(fx.loader.store(), 0).unwrap();
    assert_eq!(rendered, "vec3(1, 2.5, -3)");
}

#[test]
fn view_round_trips_with_str() {
    let mut fx = Fixture::new();
    let values = [4.0_f32, 5.0, 6.0, 7.0];
    fx.write(64, &values);
    let view = fx.vec4.view(fx.loader.store(), 64).unwrap();
    assert_eq!(view.len(), 4);
    assert_eq!(view.to_vec(fx.loader.store()).unwrap(), values);

    let rendered = fx.vec4.to_display_string(fx.loader.store(), 64).unwrap();
    assert_eq!(rendered, "vec4(4, 5, 6, 7)");
}

#[test]
fn mat4_views_are_tagged_vec_views_are_not() {
    let fx = Fixture::new();
    let m = fx.mat4.view(fx.loader.store(), 128).unwrap();
    assert_eq!(m.tag(), Some(128));
    let v = fx.vec3.view(fx.loader.store(), 128).unwrap();
    assert_eq!(v.tag(), None);
}

#[test]
fn exact_equals_on_addresses_and_views() {
    let mut fx = Fixture::new();
    fx.write(0, &[1.0, 2.0, 3.0]);
    fx.write(16, &[1.0, 2.0, 3.0]);
    fx.write(32, &[1.0, 2.0, 4.0]);

    let vec3 = fx.vec3.clone();
    assert!(vec3
        .exact_equals(fx.loader.store_mut(), Operand::Address(0), Operand::Address(16))
        .unwrap());
    assert!(!vec3
        .exact_equals(fx.loader.store_mut(), Operand::Address(0), Operand::Address(32))
        .unwrap());

    let a = vec3.view(fx.loader.store(), 0).unwrap();
    let b = vec3.view(fx.loader.store(), 16).unwrap();
    assert!(vec3
        .exact_equals(fx.loader.store_mut(), Operand::View(&a), Operand::View(&b))
        .unwrap());
}

#[test]
fn equals_differs_in_any_element() {
    let mut fx = Fixture::new();
    // mat4: 16 elements at 0 and 64; then differ only in the last one.
    let first = [0.5_f32; 16];
    let mut second = [0.5_f32; 16];
    fx.write(0, &first);
    fx.write(64, &second);
    let mat4 = fx.mat4.clone();
    assert!(mat4
        .equals(fx.loader.store_mut(), Operand::Address(0), Operand::Address(64))
        .unwrap());

    second[15] = 0.75;
    fx.write(64, &second);
    assert!(!mat4
        .equals(fx.loader.store_mut(), Operand::Address(0), Operand::Address(64))
        .unwrap());
}

#[test]
fn view_out_of_bounds_rejected() {
    let fx = Fixture::new();
    let len = fx.instance.region().data_len(fx.loader.store());
    let err = fx
        .vec3
        .view(fx.loader.store(), len - 8)
        .expect_err("12 bytes do not fit");
    assert!(matches!(err, RuntimeError::OutOfBounds { .. }), "{err:?}");
}

#[test]
fn oversized_slice_read_is_out_of_bounds() {
    let fx = Fixture::new();
    // count * 4 exceeds u32; must be a typed error, not an overflow.
    let err = fx
        .instance
        .region()
        .read_f32_slice(fx.loader.store(), 8, u32::MAX)
        .expect_err("count cannot fit the address space");
    assert!(matches!(err, RuntimeError::OutOfBounds { .. }), "{err:?}");
}

#[test]
fn view_index_far_out_of_range_is_out_of_bounds() {
    let fx = Fixture::new();
    let view = fx.vec3.view(fx.loader.store(), 0).unwrap();
    let err = view
        .get(fx.loader.store(), u32::MAX)
        .expect_err("index far past the element count");
    assert!(matches!(err, RuntimeError::OutOfBounds { .. }), "{err:?}");
}

#[test]
fn misaligned_address_rejected() {
    let fx = Fixture::new();
    let err = fx
        .instance
        .region()
        .read_f32(fx.loader.store(), 2)
        .expect_err("2 is not 4-aligned");
    assert!(matches!(err, RuntimeError::Misaligned { address: 2 }), "{err:?}");
}

// ── Growth / staleness ────────────────────────────────────────────────────────

#[test]
fn grow_invalidates_outstanding_views() {
    let mut fx = Fixture::new();
    fx.write(0, &[9.0, 8.0, 7.0]);
    let view = fx.vec3.view(fx.loader.store(), 0).unwrap();
    assert_eq!(view.get(fx.loader.store(), 0).unwrap(), 9.0);

    let grow = fx
        .instance
        .instance()
        .get_typed_func::<(), ()>(fx.loader.store(), "debug_grow")
        .unwrap();
    grow.call(fx.loader.store_mut(), ()).unwrap();

    let err = view.get(fx.loader.store(), 0).expect_err("view is stale");
    match err {
        RuntimeError::StaleView { created, current } => {
            assert_eq!(created, 0);
            assert_eq!(current, 1);
        }
        other => panic!("expected StaleView, got {other:?}"),
    }

    // A fresh view works and sees the same bytes.
    let fresh = fx.vec3.view(fx.loader.store(), 0).unwrap();
    assert_eq!(fresh.get(fx.loader.store(), 0).unwrap(), 9.0);
}

// ── Import behavior ───────────────────────────────────────────────────────────

#[test]
fn abort_surfaces_code() {
    let mut fx = Fixture::new();
    let vec3 = fx.vec3.clone();
    let err = vec3
        .invoke(
            fx.loader.store_mut(),
            "abort",
            &[wasmi::Val::I32(7)],
            &mut [],
        )
        .expect_err("abort always traps");
    assert!(matches!(err, RuntimeError::AbortSignal(7)), "{err:?}");
}

#[test]
fn exit_zero_is_a_no_op() {
    let mut fx = Fixture::new();
    let vec3 = fx.vec3.clone();
    vec3.invoke(
        fx.loader.store_mut(),
        "exit",
        &[wasmi::Val::I32(0)],
        &mut [],
    )
    .expect("exit(0) must not trap");
}

#[test]
fn nonzero_exit_surfaces_code() {
    let mut fx = Fixture::new();
    let vec3 = fx.vec3.clone();
    let err = vec3
        .invoke(
            fx.loader.store_mut(),
            "exit",
            &[wasmi::Val::I32(3)],
            &mut [],
        )
        .expect_err("exit(3) traps");
    assert!(matches!(err, RuntimeError::AbnormalExit(3)), "{err:?}");
}

#[test]
fn randf_is_deterministic_for_a_fixed_seed() {
    let sample = |seed: u64| -> Vec<f64> {
        let mut loader = Loader::new().unwrap();
        let instance = loader
            .instantiate(
                &fixture_module(),
                LoadConfig {
                    random_seed: seed,
                    ..LoadConfig::default()
                },
            )
            .unwrap();
        let rand = instance
            .instance()
            .get_typed_func::<(), f64>(loader.store(), "debug_rand")
            .unwrap();
        (0..8).map(|_| rand.call(loader.store_mut(), ()).unwrap()).collect()
    };

    assert_eq!(sample(42), sample(42));
    assert_ne!(sample(42), sample(43));
    for v in sample(42) {
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn random_override_takes_precedence() {
    let mut loader = Loader::new().unwrap();
    let instance = loader
        .instantiate(
            &fixture_module(),
            LoadConfig {
                random: Some(Box::new(|| 0.125)),
                ..LoadConfig::default()
            },
        )
        .unwrap();
    assert!(instance.record().random_overridden);
    let rand = instance
        .instance()
        .get_typed_func::<(), f64>(loader.store(), "debug_rand")
        .unwrap();
    assert_eq!(rand.call(loader.store_mut(), ()).unwrap(), 0.125);
    assert_eq!(rand.call(loader.store_mut(), ()).unwrap(), 0.125);
}

#[test]
fn print_sinks_capture_output() {
    let ints: Arc<Mutex<Vec<i32>>> = Arc::default();
    let chars: Arc<Mutex<String>> = Arc::default();
    let ints_sink = Arc::clone(&ints);
    let chars_sink = Arc::clone(&chars);

    let mut loader = Loader::new().unwrap();
    let instance = loader
        .instantiate(
            &fixture_module(),
            LoadConfig {
                print_int: Some(Box::new(move |v| ints_sink.lock().unwrap().push(v))),
                print_char: Some(Box::new(move |c| chars_sink.lock().unwrap().push(c))),
                ..LoadConfig::default()
            },
        )
        .unwrap();

    let printi = instance
        .instance()
        .get_typed_func::<i32, ()>(loader.store(), "debug_printi")
        .unwrap();
    printi.call(loader.store_mut(), -5).unwrap();
    printi.call(loader.store_mut(), 12).unwrap();

    let printch = instance
        .instance()
        .get_typed_func::<i32, ()>(loader.store(), "debug_printch")
        .unwrap();
    printch.call(loader.store_mut(), 'o' as i32).unwrap();
    printch.call(loader.store_mut(), 'k' as i32).unwrap();
    // An invalid code unit decodes to U+FFFD, never traps.
    printch.call(loader.store_mut(), -1).unwrap();

    assert_eq!(*ints.lock().unwrap(), [-5, 12]);
    assert_eq!(*chars.lock().unwrap(), "ok\u{fffd}");
}

// ── Partitioning over real exports ────────────────────────────────────────────

#[test]
fn partition_over_instance_exports() {
    let fx = Fixture::new();
    let ns = glw_runtime::partition(fx.instance.instance(), fx.loader.store(), "vec4");
    let names: Vec<_> = ns.names().collect();
    assert_eq!(names, ["add", "equals", "exactEquals"]);
    assert!(!ns.contains("view"), "unbridged namespace has no view");
}

#[test]
fn bridged_namespace_gains_str_and_view() {
    let fx = Fixture::new();
    let names: Vec<_> = fx.vec3.names().collect();
    assert!(names.contains(&"str"));
    assert!(names.contains(&"view"));
    assert!(names.contains(&"add"));
    assert_eq!(fx.vec3.shape().map(|s| s.element_count), Some(3));
}
