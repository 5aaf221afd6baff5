//! Integration tests for the processor module
//!
//! Runs the complete pipeline against the Hidex export fixtures in
//! `tests/data/hidex_tdcr`.

pub mod error_handling;

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Folder holding the two-cycle Lu-177 fixture exports
pub fn fixture_folder() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("hidex_tdcr")
}

/// Copy the fixture exports into a fresh temporary folder
pub fn copy_fixtures(temp_dir: &TempDir) -> PathBuf {
    let input = temp_dir.path().join("input");
    fs::create_dir_all(&input).unwrap();
    for entry in fs::read_dir(fixture_folder()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, input.join(path.file_name().unwrap())).unwrap();
    }
    input
}
