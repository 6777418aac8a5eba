//! Integration tests for the routine classifier.

use glw_analyzer::classify;
use glw_types::{ErrorCode, ModuleInterface, ReturnShape, SourceFile};

fn classify_str(source: &str) -> ModuleInterface {
    let sf = SourceFile::new("test.js", source);
    classify(&sf).expect("classification should succeed")
}

const ADD: &str = r"
export function add(out, a, b) {
  out[0] = a[0] + b[0];
  out[1] = a[1] + b[1];
  out[2] = a[2] + b[2];
  return out;
}
";

const CREATE: &str = r"
export function create() {
  let out = new glMatrix.ARRAY_TYPE(3);
  if (glMatrix.ARRAY_TYPE != Float32Array) {
    out[0] = 0;
    out[1] = 0;
    out[2] = 0;
  }
  return out;
}
";

const LENGTH: &str = r"
export function length(a) {
  let x = a[0], y = a[1], z = a[2];
  return Math.hypot(x, y, z);
}
";

#[test]
fn out_returning_routine_is_scalar_like() {
    let interface = classify_str(ADD);
    let add = &interface["add"];
    assert_eq!(*add.returns(), ReturnShape::Out);
    assert_eq!(add.allocation(), None);
    assert!(!add.special_interface());
}

#[test]
fn allocation_forces_special_interface() {
    let interface = classify_str(CREATE);
    let create = &interface["create"];
    // Returns a bare identifier, but the identifier is a fresh buffer.
    assert_eq!(*create.returns(), ReturnShape::Out);
    assert_eq!(create.allocation(), Some(3));
    assert!(create.special_interface());
}

#[test]
fn call_return_tagged_by_shape() {
    let interface = classify_str(LENGTH);
    let length = &interface["length"];
    assert_eq!(
        *length.returns(),
        ReturnShape::Pointer("CallExpression".into())
    );
    assert!(length.special_interface());
}

#[test]
fn binary_return_tagged_by_shape() {
    let interface = classify_str(
        "export function squaredLength(a) { return a[0] * a[0] + a[1] * a[1]; }",
    );
    assert_eq!(
        *interface["squaredLength"].returns(),
        ReturnShape::Pointer("BinaryExpression".into())
    );
}

#[test]
fn direct_new_return_records_allocation() {
    let interface = classify_str(
        "export function fromValues(x, y, z) { return new glMatrix.ARRAY_TYPE(3); }",
    );
    let desc = &interface["fromValues"];
    assert_eq!(
        *desc.returns(),
        ReturnShape::Pointer("NewExpression".into())
    );
    assert_eq!(desc.allocation(), Some(3));
}

#[test]
fn first_allocation_wins() {
    let interface = classify_str(
        r"
export function clone(a) {
  let out = new glMatrix.ARRAY_TYPE(4);
  let scratch = new glMatrix.ARRAY_TYPE(16);
  return out;
}
",
    );
    assert_eq!(interface["clone"].allocation(), Some(4));
}

#[test]
fn non_literal_allocation_ignored() {
    let interface = classify_str(
        "export function alloc(n) { let out = new glMatrix.ARRAY_TYPE(n); return out; }",
    );
    assert_eq!(interface["alloc"].allocation(), None);
}

#[test]
fn computed_array_type_access_ignored() {
    let interface = classify_str(
        "export function alloc() { let out = new glMatrix['ARRAY_TYPE'](3); return out; }",
    );
    assert_eq!(interface["alloc"].allocation(), None);
}

#[test]
fn multi_return_classified_by_first_and_flagged() {
    let interface = classify_str(
        r"
export function normalize(out, a) {
  let len = a[0] * a[0];
  if (len > 0) {
    return out;
  }
  return scale(out, a, 0);
}
",
    );
    let desc = &interface["normalize"];
    assert_eq!(*desc.returns(), ReturnShape::Out);
    assert!(desc.multi_return());
}

#[test]
fn single_return_not_flagged() {
    let interface = classify_str(ADD);
    assert!(!interface["add"].multi_return());
}

#[test]
fn nested_function_returns_not_attributed() {
    let interface = classify_str(
        r"
export function forEach(a, fn) {
  function step(i) { return i + 1; }
  let i = 0;
  while (i < a.length) { i = step(i); }
  return a;
}
",
    );
    let desc = &interface["forEach"];
    // Only the outer `return a` counts.
    assert_eq!(*desc.returns(), ReturnShape::Out);
    assert!(!desc.multi_return());
}

#[test]
fn missing_return_is_an_error() {
    let sf = SourceFile::new(
        "test.js",
        "export function set(out, x) { out[0] = x; }",
    );
    let err = classify(&sf).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::MISSING_RETURN);
    assert!(err.message.contains("set"));
}

#[test]
fn bare_return_does_not_count_as_value() {
    let sf = SourceFile::new("test.js", "export function noop() { return; }");
    let err = classify(&sf).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::MISSING_RETURN);
}

#[test]
fn syntax_error_fails_classification() {
    let sf = SourceFile::new("test.js", "export function broken( { return out; }");
    let err = classify(&sf).expect_err("should fail");
    assert_eq!(err.code.category(), glw_types::ErrorCategory::Syntax);
}

#[test]
fn exported_aliases_produce_no_descriptor() {
    let interface = classify_str(
        r"
export function subtract(out, a, b) { return out; }
export const sub = subtract;
",
    );
    assert_eq!(interface.len(), 1);
    assert!(interface.contains_key("subtract"));
}

#[test]
fn non_exported_functions_ignored() {
    let interface = classify_str(
        r"
function helper(a) { return a * 2; }
export function double(out, a) { out[0] = helper(a[0]); return out; }
",
    );
    assert_eq!(interface.len(), 1);
    assert!(interface.contains_key("double"));
}
