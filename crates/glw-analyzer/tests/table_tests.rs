//! Integration tests for the interface table builder.

use std::fs;
use std::path::PathBuf;

use glw_analyzer::{build_tables, TableError};
use glw_types::{ErrorCode, ReturnShape};

/// Write a fixture source tree under the cargo test tempdir.
fn fixture_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    fs::create_dir_all(&dir).expect("create fixture dir");
    for (file, text) in files {
        fs::write(dir.join(file), text).expect("write fixture");
    }
    dir
}

const VEC3: &str = r"
export function create() {
  let out = new glMatrix.ARRAY_TYPE(3);
  return out;
}
export function add(out, a, b) {
  out[0] = a[0] + b[0];
  return out;
}
export function length(a) {
  return Math.hypot(a[0], a[1], a[2]);
}
";

const MAT4: &str = r"
export function identity(out) {
  out[0] = 1;
  return out;
}
export function determinant(a) {
  return a[0] * a[5] - a[1] * a[4];
}
";

#[test]
fn full_and_special_views() {
    let dir = fixture_dir("full_and_special", &[("vec3.js", VEC3), ("mat4.js", MAT4)]);
    let tables = build_tables(&dir, &["vec3", "mat4"]).expect("build should succeed");

    assert_eq!(tables.full.len(), 2);
    assert_eq!(tables.full["vec3"].len(), 3);
    assert_eq!(tables.full["mat4"].len(), 2);

    // `special` keeps only the wrapper-needing routines.
    let special_vec3 = &tables.special["vec3"];
    assert_eq!(special_vec3.len(), 2);
    assert!(special_vec3.contains_key("create"));
    assert!(special_vec3.contains_key("length"));
    assert!(!special_vec3.contains_key("add"));

    assert_eq!(
        *tables.full["vec3"]["length"].returns(),
        ReturnShape::Pointer("CallExpression".into())
    );
    assert!(tables.review.is_empty());
}

#[test]
fn missing_module_fails_fast() {
    let dir = fixture_dir("missing_module", &[("vec3.js", VEC3)]);
    let err = build_tables(&dir, &["vec3", "vec4"]).expect_err("should fail");
    match &err {
        TableError::MissingSource { module, .. } => assert_eq!(module, "vec4"),
        other => panic!("expected MissingSource, got {other:?}"),
    }
    assert_eq!(err.code(), ErrorCode::MISSING_SOURCE);
}

#[test]
fn classification_error_carries_through() {
    let dir = fixture_dir(
        "classification_error",
        &[("vec3.js", "export function set(out) { out[0] = 1; }")],
    );
    let err = build_tables(&dir, &["vec3"]).expect_err("should fail");
    assert_eq!(err.code(), ErrorCode::MISSING_RETURN);
}

#[test]
fn review_list_collects_multi_return_routines() {
    let dir = fixture_dir(
        "review_list",
        &[(
            "vec3.js",
            r"
export function normalize(out, a) {
  if (a[0] > 0) { return out; }
  return out;
}
",
        )],
    );
    let tables = build_tables(&dir, &["vec3"]).expect("build should succeed");
    assert_eq!(tables.review.len(), 1);
    assert_eq!(tables.review[0].module, "vec3");
    assert_eq!(tables.review[0].routine, "normalize");
}

#[test]
fn serialization_is_idempotent() {
    let dir = fixture_dir("idempotent", &[("vec3.js", VEC3), ("mat4.js", MAT4)]);
    let first = build_tables(&dir, &["vec3", "mat4"]).unwrap();
    let second = build_tables(&dir, &["vec3", "mat4"]).unwrap();
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn json_shape_matches_contract() {
    let dir = fixture_dir("json_shape", &[("vec3.js", VEC3)]);
    let tables = build_tables(&dir, &["vec3"]).unwrap();
    let json: serde_json::Value = serde_json::from_str(&tables.to_json().unwrap()).unwrap();

    let create = &json["full"]["vec3"]["create"];
    assert_eq!(create["id"], "create");
    assert_eq!(create["returns"], "out");
    assert_eq!(create["allocation"], 3);
    assert_eq!(create["specialInterface"], true);

    let add = &json["full"]["vec3"]["add"];
    assert_eq!(add["specialInterface"], false);
    assert!(add.get("allocation").is_none());
    assert!(add.get("multiReturn").is_none());
}
