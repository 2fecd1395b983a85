//! # In-Memory Build Host (`host::memory`)
//!
//! File: cli/src/host/memory.rs
//! Author: Christi Mahu
//!
//! A `BuildHost` backed by a plain artifact map. Build tools embedding distzip
//! hand their finished outputs over in one of these and read the emitted archive
//! back out of `assets()` afterwards.
//!
use super::{Assets, BuildHost, Source};
use crate::core::error::{DistzipError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An in-memory build: an output root plus its artifacts.
#[derive(Debug, Default, Clone)]
pub struct MemoryBuild {
    output_path: Option<PathBuf>,
    assets: Assets,
    child: bool,
}

impl MemoryBuild {
    /// Creates an empty build whose output root is `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: Some(output_path.into()),
            ..Default::default()
        }
    }

    /// Creates an empty build with no configured output root.
    pub fn without_output_path() -> Self {
        Self::default()
    }

    /// Marks this build as a nested child build.
    pub fn child(mut self) -> Self {
        self.child = true;
        self
    }

    /// Adds an artifact, replacing any previous content under the same path.
    pub fn with_asset(mut self, path: impl Into<String>, source: impl Into<Source>) -> Self {
        self.assets.insert(path.into(), source.into());
        self
    }

    /// Looks up an artifact by path.
    pub fn asset(&self, path: &str) -> Option<&Source> {
        self.assets.get(path)
    }
}

impl BuildHost for MemoryBuild {
    fn is_child(&self) -> bool {
        self.child
    }

    fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    fn assets(&self) -> &Assets {
        &self.assets
    }

    fn emit_asset(&mut self, path: &str, source: Source) -> Result<()> {
        match self.assets.get(path) {
            Some(existing) if *existing != source => {
                anyhow::bail!(DistzipError::AssetConflict {
                    path: path.to_string()
                });
            }
            Some(_) => debug!("Asset '{}' re-emitted with identical content", path),
            None => debug!("Emitting asset '{}'", path),
        }
        self.assets.insert(path.to_string(), source);
        Ok(())
    }
}
