//! Export partitioning into per-type namespaces.
//!
//! The compiled module exports one flat list of functions named
//! `<type>_<method>` (`vec3_add`, `mat4_str`, …). Partitioning keeps the
//! entries of one type prefix and rekeys them by the stripped method name.

use std::collections::BTreeMap;

use wasmi::AsContext;

use crate::bridge::{BridgedMethod, TypeShape};
use crate::error::{Result, RuntimeError};
use crate::memory::MemoryRegion;

/// One callable entry of a [`TypeNamespace`].
#[derive(Debug, Clone)]
pub enum MethodBinding {
    /// A wasm export, invoked directly.
    Raw(wasmi::Func),
    /// A host-side wrapper installed by the bridge overlay.
    Bridged(BridgedMethod),
}

/// The methods of one vector/matrix type, keyed by method name.
///
/// Produced by [`partition`]; immutable. The bridge overlay does not patch
/// a namespace in place, it derives a new one.
#[derive(Debug, Clone)]
pub struct TypeNamespace {
    type_name: String,
    methods: BTreeMap<String, MethodBinding>,
    /// Region and shape, present once the bridge overlay derived this
    /// namespace.
    bridge: Option<(MemoryRegion, TypeShape)>,
}

impl TypeNamespace {
    pub(crate) fn from_methods(
        type_name: impl Into<String>,
        methods: BTreeMap<String, MethodBinding>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            methods,
            bridge: None,
        }
    }

    pub(crate) fn bridged(
        type_name: impl Into<String>,
        methods: BTreeMap<String, MethodBinding>,
        region: MemoryRegion,
        shape: TypeShape,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            methods,
            bridge: Some((region, shape)),
        }
    }

    pub(crate) fn bridge_parts(&self) -> Option<(&MemoryRegion, TypeShape)> {
        self.bridge.as_ref().map(|(region, shape)| (region, *shape))
    }

    /// Check this namespace against the method table its shape declares.
    ///
    /// Fails with [`RuntimeError::MissingMethod`] on the first absent
    /// method; extra exported methods pass through untouched.
    pub fn validate(&self, shape: &TypeShape) -> Result<()> {
        for &method in shape.required {
            if !self.methods.contains_key(method) {
                return Err(RuntimeError::MissingMethod {
                    type_name: self.type_name.clone(),
                    method: method.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The type prefix this namespace was partitioned for.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Method names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    pub fn get(&self, method: &str) -> Option<&MethodBinding> {
        self.methods.get(method)
    }

    pub(crate) fn methods(&self) -> &BTreeMap<String, MethodBinding> {
        &self.methods
    }

    /// The underlying wasm callable of a method, for raw invocation.
    /// Bridged equality wrappers still expose the routine they delegate to.
    pub fn raw(&self, method: &str) -> Result<wasmi::Func> {
        match self.methods.get(method) {
            Some(MethodBinding::Raw(func)) => Ok(*func),
            Some(MethodBinding::Bridged(bridged)) => bridged
                .raw()
                .ok_or_else(|| RuntimeError::MissingExport(self.qualified(method))),
            None => Err(RuntimeError::MissingExport(self.qualified(method))),
        }
    }

    fn qualified(&self, method: &str) -> String {
        format!("{}_{}", self.type_name, method)
    }
}

/// Keep the `<type_name>_*` entries of `names` and rekey them by the
/// stripped method name.
///
/// Pure; last write wins when two entries collapse to the same key (the
/// export layout comes from a trusted build step, so collisions are
/// tolerated rather than rejected).
pub fn partition_names<'a, I>(names: I, type_name: &str) -> BTreeMap<String, &'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = format!("{type_name}_");
    let mut methods = BTreeMap::new();
    for name in names {
        if let Some(method) = name.strip_prefix(&prefix) {
            if !method.is_empty() {
                methods.insert(method.to_string(), name);
            }
        }
    }
    methods
}

/// Partition the instance's function exports for one type prefix.
///
/// Deterministic given the same export set; non-function exports are
/// ignored.
pub fn partition(
    instance: &wasmi::Instance,
    ctx: &impl AsContext,
    type_name: &str,
) -> TypeNamespace {
    let funcs: BTreeMap<String, wasmi::Func> = instance
        .exports(ctx)
        .filter_map(|export| {
            let name = export.name().to_string();
            export.into_func().map(|func| (name, func))
        })
        .collect();

    let methods = partition_names(funcs.keys().map(String::as_str), type_name)
        .into_iter()
        .map(|(method, full_name)| (method, MethodBinding::Raw(funcs[full_name])))
        .collect();

    TypeNamespace::from_methods(type_name, methods)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_keeps_only_prefix() {
        let names = ["vec3_add", "vec3_len", "mat4_str", "vec4_add"];
        let methods = partition_names(names, "vec3");
        let keys: Vec<_> = methods.keys().map(String::as_str).collect();
        assert_eq!(keys, ["add", "len"]);
    }

    #[test]
    fn test_partition_is_exact_prefix_match() {
        let names = ["vec3_add", "vec34_add", "vec3x_add", "vec3_"];
        let methods = partition_names(names, "vec3");
        let keys: Vec<_> = methods.keys().map(String::as_str).collect();
        // `vec3_` strips to an empty method name and is dropped.
        assert_eq!(keys, ["add"]);
    }

    #[test]
    fn test_method_name_may_contain_underscores() {
        let methods = partition_names(["mat4_from_rotation"], "mat4");
        assert_eq!(methods["from_rotation"], "mat4_from_rotation");
    }

    #[test]
    fn test_partition_is_deterministic() {
        let a = partition_names(["vec3_b", "vec3_a", "vec3_c"], "vec3");
        let b = partition_names(["vec3_c", "vec3_a", "vec3_b"], "vec3");
        assert_eq!(a, b);
    }
}
