//! # distzip Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Thin, context-adding wrappers around `std::fs` used where distzip touches the
//! disk: reading `distzip.toml`, and writing an emitted archive into a build output
//! directory.
//!
//! - **`ensure_dir_exists`**: Creates a directory (and parents) if missing; errors if the
//!   path exists but is not a directory.
//! - **`read_file_to_string`**: `fs::read_to_string` with the failing path in the error.
//! - **`write_bytes_to_file`**: Ensures the parent directory exists, then writes (or
//!   overwrites) the file with the given bytes.
//!
use crate::core::error::{DistzipError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, this function creates the directory, including any
/// necessary parent directories (similar to `mkdir -p`).
///
/// # Errors
///
/// Returns an `Err` if:
/// - The path exists but is not a directory.
/// - Creating the directory fails (e.g., due to permissions).
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(DistzipError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
///
/// # Errors
///
/// Returns an `Err` if the file cannot be found, opened, or read, with context
/// indicating which file failed.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes bytes to a file, creating parent directories and overwriting any
/// existing file.
///
/// # Errors
///
/// Returns an `Err` if:
/// - The parent directory cannot be created.
/// - Writing to the file fails (e.g., permissions, I/O error).
pub fn write_bytes_to_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    info!("Wrote {} bytes to file: {:?}", content.len(), path);
    Ok(())
}
