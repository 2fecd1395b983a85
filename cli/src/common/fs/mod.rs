//! # distzip Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! Groups the filesystem helpers: `io` for reading and writing files with
//! contextual errors, and `paths` for lexical path arithmetic used when naming
//! archives and archive entries.
//!

/// Contains basic file I/O operations (e.g., `ensure_dir_exists`, `write_bytes_to_file`).
pub mod io;
/// Contains lexical path helpers (e.g., `resolve`, `join_slash`).
pub mod paths;
