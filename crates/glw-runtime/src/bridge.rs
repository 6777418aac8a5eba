//! Host-side decoration of a partitioned namespace.
//!
//! Raw wasm routines traffic in byte addresses and i32 truth values. The
//! bridge layers the host conveniences over one [`TypeNamespace`]:
//! rendering a value at an address as text, taking a typed
//! [`AddressView`], and boolean-returning equality. Everything else stays
//! a raw pass-through callable.

use std::fmt::Write as _;

use wasmi::AsContext;

use crate::error::{Result, RuntimeError};
use crate::host::{Fault, HostState};
use crate::linker::{MethodBinding, TypeNamespace};
use crate::memory::MemoryRegion;
use crate::view::AddressView;

/// The static description of one vector/matrix type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeShape {
    /// Export prefix and display name.
    pub name: &'static str,
    /// f32 elements per value.
    pub element_count: u32,
    /// Whether views carry their originating address as an identity tag.
    pub tag_views: bool,
    /// Methods the compiled module must export for this type.
    pub required: &'static [&'static str],
}

const REQUIRED_METHODS: &[&str] = &["add", "equals", "exactEquals"];

/// 3-component vector.
pub const VEC3: TypeShape = TypeShape {
    name: "vec3",
    element_count: 3,
    tag_views: false,
    required: REQUIRED_METHODS,
};

/// 4-component vector.
pub const VEC4: TypeShape = TypeShape {
    name: "vec4",
    element_count: 4,
    tag_views: false,
    required: REQUIRED_METHODS,
};

/// 4x4 matrix. Views are tagged: matrix operands are always resolved by
/// the address the view was taken at.
pub const MAT4: TypeShape = TypeShape {
    name: "mat4",
    element_count: 16,
    tag_views: true,
    required: REQUIRED_METHODS,
};

/// A host-side wrapper installed by [`bridge`].
#[derive(Debug, Clone)]
pub enum BridgedMethod {
    /// Renders the value at an address as `name(v0, v1, …)`.
    Str,
    /// Takes an [`AddressView`] of the type's element count.
    View,
    /// Delegates to the wrapped routine and coerces its i32 to `bool`.
    ExactEquals(wasmi::Func),
    /// Same wrapper; the tolerance semantics live in the routine itself.
    Equals(wasmi::Func),
}

impl BridgedMethod {
    pub(crate) fn raw(&self) -> Option<wasmi::Func> {
        match self {
            Self::ExactEquals(func) | Self::Equals(func) => Some(*func),
            Self::Str | Self::View => None,
        }
    }
}

/// An equality operand: a bare byte address or an existing view.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Address(u32),
    View(&'a AddressView),
}

impl Operand<'_> {
    /// The byte address handed to the wasm routine. A tagged view resolves
    /// to its identity tag, an untagged one to its address.
    pub fn resolve(&self) -> u32 {
        match self {
            Self::Address(address) => *address,
            Self::View(view) => view.operand_address(),
        }
    }
}

/// Derive the bridged namespace for one type.
///
/// Pure decoration: the input namespace is not modified. `str` and `view`
/// are inserted as host constructs; `exactEquals` and `equals` wrap the
/// raw routines the namespace already carries; every other method passes
/// through untouched.
pub fn bridge(
    namespace: &TypeNamespace,
    region: &MemoryRegion,
    shape: TypeShape,
) -> TypeNamespace {
    let mut methods = namespace.methods().clone();
    for (name, binding) in methods.iter_mut() {
        if let MethodBinding::Raw(func) = binding {
            match name.as_str() {
                "exactEquals" => *binding = MethodBinding::Bridged(BridgedMethod::ExactEquals(*func)),
                "equals" => *binding = MethodBinding::Bridged(BridgedMethod::Equals(*func)),
                _ => {}
            }
        }
    }
    methods.insert("str".to_string(), MethodBinding::Bridged(BridgedMethod::Str));
    methods.insert("view".to_string(), MethodBinding::Bridged(BridgedMethod::View));

    TypeNamespace::bridged(namespace.type_name(), methods, region.clone(), shape)
}

impl TypeNamespace {
    /// The shape this namespace was bridged with, if it was.
    pub fn shape(&self) -> Option<TypeShape> {
        self.bridge_parts().map(|(_, shape)| shape)
    }

    fn bridged_context(&self) -> Result<(&MemoryRegion, TypeShape)> {
        self.bridge_parts().ok_or_else(|| {
            RuntimeError::MissingExport(format!("{}: namespace is not bridged", self.type_name()))
        })
    }

    /// Render the value at `address` as `name(v0, v1, …)`. Pure read.
    pub fn to_display_string(&self, ctx: &impl AsContext, address: u32) -> Result<String> {
        let (region, shape) = self.bridged_context()?;
        let values = region.read_f32_slice(ctx, address, shape.element_count)?;
        let mut out = String::from(shape.name);
        out.push('(');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{value}");
        }
        out.push(')');
        Ok(out)
    }

    /// Take a typed view of the value at `address`.
    pub fn view(&self, ctx: &impl AsContext, address: u32) -> Result<AddressView> {
        let (region, shape) = self.bridged_context()?;
        let byte_len = shape.element_count * 4;
        if address.checked_add(byte_len).map_or(true, |end| end > region.data_len(ctx)) {
            return Err(RuntimeError::OutOfBounds {
                address,
                len: byte_len,
            });
        }
        let tag = shape.tag_views.then_some(address);
        AddressView::new(region.clone(), address, shape.element_count, tag)
    }

    /// Bit-exact equality of the two operands' values.
    pub fn exact_equals(
        &self,
        store: &mut wasmi::Store<HostState>,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<bool> {
        self.call_equality(store, "exactEquals", a, b)
    }

    /// Tolerant equality; the tolerance lives in the wasm routine.
    pub fn equals(
        &self,
        store: &mut wasmi::Store<HostState>,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<bool> {
        self.call_equality(store, "equals", a, b)
    }

    fn call_equality(
        &self,
        store: &mut wasmi::Store<HostState>,
        method: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<bool> {
        let func = self.raw(method)?;
        let typed = func
            .typed::<(i32, i32), i32>(&mut *store)
            .map_err(|e| RuntimeError::Call(e.to_string()))?;
        let result = typed
            .call(&mut *store, (a.resolve() as i32, b.resolve() as i32))
            .map_err(|trap| map_trap(store.data_mut(), trap))?;
        Ok(result != 0)
    }

    /// Invoke a raw method with untyped values, surfacing `_abort`/`_exit`
    /// as their own errors.
    pub fn invoke(
        &self,
        store: &mut wasmi::Store<HostState>,
        method: &str,
        args: &[wasmi::Val],
        results: &mut [wasmi::Val],
    ) -> Result<()> {
        let func = self.raw(method)?;
        func.call(&mut *store, args, results)
            .map_err(|trap| map_trap(store.data_mut(), trap))
    }
}

/// Map a wasmi trap to the fault the host recorded, if any.
pub(crate) fn map_trap(state: &mut HostState, trap: wasmi::Error) -> RuntimeError {
    match state.take_fault() {
        Some(Fault::Abort(code)) => RuntimeError::AbortSignal(code),
        Some(Fault::Exit(code)) => RuntimeError::AbnormalExit(code),
        None => RuntimeError::Call(trap.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_constants() {
        assert_eq!(VEC3.element_count, 3);
        assert_eq!(VEC4.element_count, 4);
        assert_eq!(MAT4.element_count, 16);
        assert!(MAT4.tag_views);
        assert!(!VEC3.tag_views);
        for shape in [VEC3, VEC4, MAT4] {
            assert!(shape.required.contains(&"equals"));
            assert!(shape.required.contains(&"exactEquals"));
        }
    }

    #[test]
    fn test_operand_resolution() {
        assert_eq!(Operand::Address(12).resolve(), 12);
    }
}
