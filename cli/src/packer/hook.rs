//! # Build Lifecycle Hook (`packer::hook`)
//!
//! File: cli/src/packer/hook.rs
//! Author: Christi Mahu
//!
//! Connects the packer to a `BuildHost`. The hook runs once per build, after the
//! build's final artifacts are known: it archives the selected outputs and
//! registers the archive with the host under a path relative to the output root.
//!
//! Child builds are skipped. When the host has no configured output root, the
//! `dist` directory under the current working directory is used.
//!
use super::Packer;
use crate::core::error::Result;
use crate::host::{BuildHost, Source};
use anyhow::Context;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output root used when the build does not declare one.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

impl Packer {
    /// Archives the host's outputs and emits the archive back into the host.
    ///
    /// Returns the registration path of the emitted archive, or `None` when the
    /// build is a child build and nothing was done.
    ///
    /// # Errors
    ///
    /// Any failure while reading content, writing the archive or registering it
    /// fails the hook; nothing is emitted in that case.
    pub async fn process_assets<H: BuildHost + ?Sized>(&self, host: &mut H) -> Result<Option<String>> {
        if host.is_child() {
            debug!("Skipping child build");
            return Ok(None);
        }

        let default_output = default_output_path(host.output_path())?;
        let archive = self.assemble(host.assets(), &default_output).await?;
        info!(
            "Emitting archive '{}' with {} entries ({} bytes)",
            archive.path,
            archive.entries,
            archive.bytes.len()
        );
        host.emit_asset(&archive.path, Source::Raw(archive.bytes))?;
        Ok(Some(archive.path))
    }
}

/// Absolute output root for a build: the declared one (anchored at the working
/// directory when relative) or `<cwd>/dist`.
pub fn default_output_path(declared: Option<&Path>) -> Result<PathBuf> {
    match declared {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        declared => {
            let cwd = env::current_dir().context("Failed to get current directory")?;
            Ok(cwd.join(declared.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))))
        }
    }
}
