use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The classified return shape of an exported routine.
///
/// Serializes to the string the downstream codegen contract expects:
/// `"out"` for a scalar-like bare-reference return, otherwise the
/// ESTree-style node-type name of the returned expression
/// (`"NewExpression"`, `"BinaryExpression"`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReturnShape {
    /// Scalar-like: the routine returns a bare local/parameter reference.
    Out,
    /// Pointer-like: any other expression shape, tagged with its kind.
    Pointer(String),
}

impl ReturnShape {
    /// Returns `true` for the scalar-like shape.
    pub fn is_out(&self) -> bool {
        matches!(self, Self::Out)
    }
}

impl From<String> for ReturnShape {
    fn from(s: String) -> Self {
        if s == "out" {
            Self::Out
        } else {
            Self::Pointer(s)
        }
    }
}

impl From<ReturnShape> for String {
    fn from(shape: ReturnShape) -> Self {
        match shape {
            ReturnShape::Out => "out".to_string(),
            ReturnShape::Pointer(kind) => kind,
        }
    }
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "out"),
            Self::Pointer(kind) => write!(f, "{kind}"),
        }
    }
}

/// The classified calling convention of one exported routine.
///
/// `special_interface` is a pure function of the other fields and is
/// computed in [`RoutineDescriptor::new`] only; the fields are private so
/// no code path can set it independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineDescriptor {
    id: String,
    returns: ReturnShape,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    allocation: Option<u32>,
    special_interface: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    multi_return: bool,
}

impl RoutineDescriptor {
    /// Create a descriptor, deriving `special_interface`.
    pub fn new(id: impl Into<String>, returns: ReturnShape, allocation: Option<u32>) -> Self {
        let special_interface = !returns.is_out() || allocation.is_some();
        Self {
            id: id.into(),
            returns,
            allocation,
            special_interface,
            multi_return: false,
        }
    }

    /// Mark the routine as having more than one return statement, which
    /// flags it for manual review downstream.
    pub fn flag_multi_return(mut self) -> Self {
        self.multi_return = true;
        self
    }

    /// Routine name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Classified return shape.
    pub fn returns(&self) -> &ReturnShape {
        &self.returns
    }

    /// Literal length of the fixed-size output buffer, if one is allocated.
    pub fn allocation(&self) -> Option<u32> {
        self.allocation
    }

    /// Whether the routine needs a custom host-side wrapper.
    pub fn special_interface(&self) -> bool {
        self.special_interface
    }

    /// Whether the routine had multiple return statements.
    pub fn multi_return(&self) -> bool {
        self.multi_return
    }
}

/// All descriptors of one routine-source module, keyed by routine name.
pub type ModuleInterface = BTreeMap<String, RoutineDescriptor>;

/// Module name → routine name → descriptor. `BTreeMap` keeps serialization
/// byte-identical across runs.
pub type InterfaceTable = BTreeMap<String, ModuleInterface>;

/// A routine flagged for manual review by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub module: String,
    pub routine: String,
}

/// The two interface views produced by one table-builder run, plus the
/// review list for routines the classifier could not decide unambiguously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceTables {
    /// Every exported routine.
    pub full: InterfaceTable,
    /// Only the routines that need a custom wrapper.
    pub special: InterfaceTable,
    /// Multi-return routines, in module order.
    pub review: Vec<ReviewEntry>,
}

impl InterfaceTables {
    /// Serialize to the stable JSON contract.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_return_no_allocation_is_passthrough() {
        let d = RoutineDescriptor::new("add", ReturnShape::Out, None);
        assert!(!d.special_interface());
    }

    #[test]
    fn test_pointer_return_needs_wrapper() {
        let d = RoutineDescriptor::new(
            "create",
            ReturnShape::Pointer("NewExpression".into()),
            None,
        );
        assert!(d.special_interface());
    }

    #[test]
    fn test_allocation_forces_wrapper_regardless_of_return() {
        let d = RoutineDescriptor::new("add", ReturnShape::Out, Some(2));
        assert!(d.special_interface());
        assert_eq!(d.allocation(), Some(2));
    }

    #[test]
    fn test_json_shape() {
        let d = RoutineDescriptor::new("len", ReturnShape::Pointer("BinaryExpression".into()), None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"id\":\"len\""));
        assert!(json.contains("\"returns\":\"BinaryExpression\""));
        assert!(json.contains("\"specialInterface\":true"));
        assert!(!json.contains("allocation"), "absent allocation must be omitted");
        assert!(!json.contains("multiReturn"), "unflagged review bit must be omitted");
    }

    #[test]
    fn test_json_round_trip() {
        let d = RoutineDescriptor::new("add", ReturnShape::Out, Some(3)).flag_multi_return();
        let json = serde_json::to_string(&d).unwrap();
        let back: RoutineDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_return_shape_string_mapping() {
        assert_eq!(String::from(ReturnShape::Out), "out");
        assert_eq!(
            ReturnShape::from("ArrayExpression".to_string()),
            ReturnShape::Pointer("ArrayExpression".into())
        );
        assert_eq!(ReturnShape::from("out".to_string()), ReturnShape::Out);
    }
}
