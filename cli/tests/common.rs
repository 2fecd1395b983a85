//! # distzip CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: a command builder for
//! the compiled `distzip` binary, a build output fixture and a ZIP reader.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// # Get distzip Command (`distzip_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `distzip` binary, with
/// `DISTZIP_CONFIG` cleared so the caller's environment cannot leak in.
///
/// ## Panics
/// Panics if the `distzip` binary cannot be found via `Command::cargo_bin`.
pub fn distzip_cmd() -> Command {
    let mut cmd = Command::cargo_bin("distzip").expect("Failed to find distzip binary for testing");
    cmd.env_remove("DISTZIP_CONFIG");
    cmd
}

/// Writes the standard two-file build into `<root>/dist` and returns its path.
pub fn sample_build(root: &Path) -> std::path::PathBuf {
    let dist = root.join("dist");
    fs::create_dir_all(dist.join("subdir")).expect("create build dir");
    fs::write(dist.join("a.js"), "const abc = 'xyz';").expect("write a.js");
    fs::write(dist.join("subdir/b.jpg"), [0xff, 0xd8, 0xff, 0xe0]).expect("write b.jpg");
    dist
}

/// Reads every entry of the ZIP archive at `path`.
pub fn zip_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("valid zip archive");
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("read entry");
        let mut content = Vec::new();
        entry.read_to_end(&mut content).expect("read entry content");
        entries.insert(entry.name().to_string(), content);
    }
    entries
}
