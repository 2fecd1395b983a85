//! # distzip Build Host Interface (`host`)
//!
//! File: cli/src/host/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The packer never discovers build outputs by itself. A *build host* hands it a
//! snapshot of the finished artifacts (path → content), tells it where the build's
//! output root is, and accepts the finished archive back as one more artifact.
//! This module defines that contract and ships two hosts:
//!
//! - **`memory`**: `MemoryBuild`, an in-memory artifact map for embedding distzip
//!   into another build tool (and for tests).
//! - **`directory`**: `DirectoryBuild`, which treats an existing output directory
//!   on disk as the finished build and writes the archive next to it.
//!
//! Artifact keys are relative, forward-slash separated and unique within a build.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub mod directory;
pub mod memory;

pub use directory::DirectoryBuild;
pub use memory::MemoryBuild;

/// The artifact mapping of one build: relative path → content.
pub type Assets = BTreeMap<String, Source>;

/// Content of a single build artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Raw bytes, stored as-is. Emitted archives are always registered this way.
    Raw(Vec<u8>),
    /// Text output; archived as its UTF-8 bytes.
    Text(String),
    /// A file on disk, read only when the artifact is actually selected.
    File(PathBuf),
}

impl Source {
    /// Returns the artifact's bytes, reading them from disk for `Source::File`.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Source::Raw(bytes) => Ok(Cow::Borrowed(bytes)),
            Source::Text(text) => Ok(Cow::Borrowed(text.as_bytes())),
            Source::File(path) => fs::read(path)
                .map(Cow::Owned)
                .with_context(|| format!("Failed to read build output {}", path.display())),
        }
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Raw(bytes)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

/// # Build Host (`BuildHost`)
///
/// The integration surface between the packer's lifecycle hook and whatever build
/// system produced the artifacts.
pub trait BuildHost {
    /// Nested (child) builds fold their outputs into the parent build, so the hook
    /// skips them.
    fn is_child(&self) -> bool {
        false
    }

    /// The build's configured output root, if it has one.
    fn output_path(&self) -> Option<&Path>;

    /// The final artifact mapping for this build.
    fn assets(&self) -> &Assets;

    /// Registers one more artifact under `path` (relative to the output root).
    fn emit_asset(&mut self, path: &str, source: Source) -> Result<()>;
}
