//! Shared fixtures for ga4gh-core integration tests

#![allow(dead_code)]

use ga4gh_core::{Result, SchemaRegistry, load_schema_classes};
use std::io::Write;
use std::path::PathBuf;

/// Path of the trimmed VRS schema shipped with the tests
pub fn vrs_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/vrs.json")
}

/// Registry compiled from the VRS fixture
pub fn vrs_registry() -> SchemaRegistry {
    load_schema_classes(vrs_schema_path()).expect("VRS fixture schema compiles")
}

/// Write `content` to a temporary `.json` file and compile it
pub fn compile_temp_schema(content: &str) -> Result<SchemaRegistry> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(content.as_bytes())?;
    load_schema_classes(file.path())
}
