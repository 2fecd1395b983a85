//! # Archive Output Path (`packer::output_path`)
//!
//! File: cli/src/packer/output_path.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Works out where the archive is written, given the build's default output
//! directory and the `path`, `filename` and `extension` options.
//!
//! ## Resolution
//!
//! 1. The output directory is `path`, or the build's output directory when unset.
//!    A relative `path` is taken relative to the build's output directory.
//! 2. The file name is `filename`, or the last component of the output directory.
//! 3. One trailing `.zip` is stripped from the file name and `.<extension>`
//!    (default `zip`) is appended.
//! 4. Build output directory, output directory and file name are combined; the
//!    rightmost absolute one wins.
//! 5. The result is also expressed relative to the build's output directory, which
//!    is the key the archive is registered under (it may start with `..`).
//!
//! ```text
//! output = /out/dist
//!   (defaults)                         -> /out/dist/dist.zip      "dist.zip"
//!   path = "zip"                       -> /out/dist/zip/zip.zip   "zip/zip.zip"
//!   path = "../zip"                    -> /out/zip/zip.zip        "../zip/zip.zip"
//!   filename = "out", extension = "tar"-> /out/dist/out.tar       "out.tar"
//! ```
//!
use super::PackOptions;
use crate::common::fs::paths;
use crate::core::error::{DistzipError, Result};
use std::path::{Path, PathBuf};

/// Extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "zip";

/// File stem used when the output directory has no last component (e.g. `/`).
const FALLBACK_STEM: &str = "archive";

/// Where the archive goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDestination {
    /// Absolute, normalized path of the archive file.
    pub absolute: PathBuf,
    /// `absolute` relative to the build's output directory, `/`-separated.
    pub relative: String,
}

/// Resolves the archive destination for a build whose output root is
/// `default_output`.
///
/// # Errors
///
/// Returns an `Err` if `default_output` is relative and the working directory
/// cannot be read, or if no relative path exists between the output root and the
/// destination (different Windows drives).
pub fn resolve_archive_path(default_output: &Path, options: &PackOptions) -> Result<ArchiveDestination> {
    let base = paths::resolve(&[default_output])?;
    let output_path = options.path.as_deref().unwrap_or(default_output);
    let output_dir = paths::resolve(&[base.as_path(), output_path])?;

    let filename = match &options.filename {
        Some(filename) => filename.clone(),
        None => output_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_STEM.to_string()),
    };
    let file_name = archive_file_name(&filename, options.extension.as_deref());

    let absolute = paths::resolve(&[output_dir.as_path(), Path::new(&file_name)])?;
    let relative = pathdiff::diff_paths(&absolute, &base)
        .map(|relative| paths::to_slash(&relative))
        .ok_or_else(|| {
            DistzipError::Config(format!(
                "archive destination {} cannot be expressed relative to {}",
                absolute.display(),
                base.display()
            ))
        })?;

    Ok(ArchiveDestination { absolute, relative })
}

/// Replaces a trailing `.zip` on `filename` with `.<extension>`.
///
/// A leading dot on `extension` is ignored and an empty extension appends nothing.
pub fn archive_file_name(filename: &str, extension: Option<&str>) -> String {
    let stem = match filename.strip_suffix(".zip") {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => filename,
    };
    let extension = extension
        .unwrap_or(DEFAULT_EXTENSION)
        .trim_start_matches('.');
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}
