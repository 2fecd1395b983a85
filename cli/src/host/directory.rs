//! # Directory Build Host (`host::directory`)
//!
//! File: cli/src/host/directory.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Treats an existing build output directory as a finished build. Every regular
//! file below the directory becomes an artifact keyed by its `/`-separated path
//! relative to the directory; content is read lazily from disk.
//!
//! Emitted artifacts are written to disk relative to the directory (keys starting
//! with `..` land outside it) and overwrite whatever file was there, so packing
//! the same directory twice replaces the previous archive.
//!
use super::{Assets, BuildHost, Source};
use crate::common::fs::{io, paths};
use crate::core::error::{DistzipError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A build whose outputs are the files of one directory.
#[derive(Debug, Clone)]
pub struct DirectoryBuild {
    root: PathBuf,
    assets: Assets,
}

impl DirectoryBuild {
    /// Walks `root` and records every file below it.
    ///
    /// # Errors
    ///
    /// Returns `DistzipError::FileSystem` if `root` is not a directory, or an error
    /// if the working directory is needed to anchor a relative `root` and cannot be
    /// read. Unreadable entries inside the tree are skipped with a warning.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!(DistzipError::FileSystem(format!(
                "Build output directory not found: {}",
                root.display()
            )));
        }
        let root = paths::resolve(&[root])?;
        info!("Scanning build outputs in {}", root.display());

        let mut assets = Assets::new();
        for entry_result in WalkDir::new(&root).follow_links(true) {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    warn!(
                        "Failed to access entry during walk in '{}': {}",
                        root.display(),
                        e
                    );
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = match entry.path().strip_prefix(&root) {
                Ok(p) => paths::to_slash(p),
                Err(_) => {
                    warn!(
                        "Could not determine relative path for '{}' based on '{}'",
                        entry.path().display(),
                        root.display()
                    );
                    continue;
                }
            };
            debug!("Found build output: {}", relative);
            assets.insert(relative, Source::File(entry.into_path()));
        }

        Ok(Self { root, assets })
    }

    /// The absolute directory this build was scanned from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BuildHost for DirectoryBuild {
    fn output_path(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn assets(&self) -> &Assets {
        &self.assets
    }

    fn emit_asset(&mut self, path: &str, source: Source) -> Result<()> {
        let target = paths::resolve(&[self.root.as_path(), Path::new(path)])?;
        io::write_bytes_to_file(&target, &source.bytes()?)?;
        self.assets.insert(path.to_string(), Source::File(target));
        Ok(())
    }
}
