//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use delimit::sniff::Encoding;
use delimit::table::{SavePolicy, TableStore};

/// Write `content` as a UTF-8 file under `dir` and return its path
pub fn fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// Write `content` under `dir` in the given encoding (BOM included)
pub fn encoded_fixture(
    dir: &tempfile::TempDir,
    name: &str,
    content: &str,
    encoding: Encoding,
) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, encoding.encode(content)).expect("write fixture");
    path
}

/// Open a fixture with the deferred save policy
pub fn open_deferred(dir: &tempfile::TempDir, name: &str, content: &str) -> TableStore {
    let path = fixture(dir, name, content);
    TableStore::open(&path, SavePolicy::OnDemand).expect("open fixture")
}

/// Collect one column of the store's table, in row order
pub fn table_column(store: &TableStore, col: usize) -> Vec<String> {
    store
        .table()
        .rows()
        .map(|(_, row)| row[col].clone())
        .collect()
}

pub fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
