//! # distzip Packer (`packer`)
//!
//! File: cli/src/packer/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The packer collects finished build outputs into a single archive and hands the
//! archive back to the build as one more output. It decides:
//!
//! - which artifacts are archived (`matcher`),
//! - the path each one gets inside the archive (`entry`),
//! - the metadata every entry carries (`FileOptions`),
//! - where the archive itself is written (`output_path`).
//!
//! ## Architecture
//!
//! - `PackOptions`: Immutable configuration, validated once by `Packer::new`.
//! - `Packer::plan`: Selection plus entry transform, without touching content.
//! - `Packer::assemble`: Streams the planned entries into an `ArchiveWriter`, drains the
//!   writer's output and resolves the destination.
//! - `Packer::process_assets` (`hook`): The build lifecycle hook that runs `assemble`
//!   against a `BuildHost` and registers the result.
//!
//! ## Examples
//!
//! ```rust,ignore
//! let packer = Packer::new(PackOptions {
//!     path_prefix: Some("release".to_string()),
//!     exclude: Some(Rule::pattern(r"\.map$")?),
//!     ..Default::default()
//! })?;
//!
//! let mut build = MemoryBuild::new("/work/dist")
//!     .with_asset("main.js", "console.log(1)")
//!     .with_asset("main.js.map", "{}");
//! let emitted = packer.process_assets(&mut build).await?; // Some("dist.zip")
//! ```
//!
use crate::common::archive::{self, ArchiveFormat, ArchiveWriter, FileOptions, ZipOptions};
use crate::core::error::{DistzipError, Result};
use crate::host::{Assets, Source};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

pub mod entry;
pub mod hook;
pub mod matcher;
pub mod output_path;

pub use entry::{PathMapper, RewriteRule};
pub use matcher::Rule;
pub use output_path::ArchiveDestination;

/// # Pack Options (`PackOptions`)
///
/// Everything that shapes one archive. All fields are optional; see each field for
/// its default.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Directory for the archive, relative to the build's output directory or
    /// absolute. Defaults to the build's output directory.
    pub path: Option<PathBuf>,
    /// Archive file name, with or without `.zip`. Defaults to the last component of
    /// the output directory.
    pub filename: Option<String>,
    /// Archive extension. Defaults to `zip`.
    pub extension: Option<String>,
    /// Relative directory every entry is placed under. Must not be absolute.
    pub path_prefix: Option<String>,
    /// Rewrites in-archive paths after the prefix has been applied.
    pub path_mapper: Option<PathMapper>,
    /// Artifacts to archive. Defaults to all.
    pub include: Option<Rule>,
    /// Artifacts to leave out; wins over `include`.
    pub exclude: Option<Rule>,
    /// Metadata applied to every entry.
    pub file_options: FileOptions,
    /// Archive-level options.
    pub zip_options: ZipOptions,
    /// Container format. Defaults to ZIP.
    pub format: ArchiveFormat,
}

/// One artifact selected for the archive.
#[derive(Debug, Clone)]
pub struct PlannedEntry<'a> {
    pub source_path: &'a str,
    pub archive_path: String,
    pub source: &'a Source,
}

/// A finished archive, ready to be registered with the build.
#[derive(Debug, Clone)]
pub struct ArchiveAsset {
    /// Registration key, relative to the build's output directory.
    pub path: String,
    /// Absolute destination of the archive.
    pub absolute_path: PathBuf,
    pub bytes: Vec<u8>,
    /// Number of entries written.
    pub entries: usize,
}

/// Builds archives from build outputs according to a fixed `PackOptions`.
#[derive(Debug, Clone)]
pub struct Packer {
    options: PackOptions,
}

impl Packer {
    /// Validates `options` and creates a packer.
    ///
    /// # Errors
    ///
    /// Returns `DistzipError::AbsolutePathPrefix` if `path_prefix` is absolute.
    pub fn new(options: PackOptions) -> Result<Self> {
        if let Some(prefix) = &options.path_prefix {
            if is_absolute_prefix(prefix) {
                anyhow::bail!(DistzipError::AbsolutePathPrefix {
                    prefix: prefix.clone()
                });
            }
        }
        debug!("Packer created with options: {:?}", options);
        Ok(Self { options })
    }

    /// Selects artifacts and computes their in-archive paths, in the order the
    /// asset map iterates.
    pub fn plan<'a>(&self, assets: &'a Assets) -> Vec<PlannedEntry<'a>> {
        assets
            .iter()
            .filter_map(|(source_path, source)| {
                if !matcher::matches(
                    source_path,
                    self.options.include.as_ref(),
                    self.options.exclude.as_ref(),
                ) {
                    trace!("Skipping '{}': not selected", source_path);
                    return None;
                }
                let archive_path = entry::map_entry(source_path, &self.options);
                trace!("Selected '{}' as '{}'", source_path, archive_path);
                Some(PlannedEntry {
                    source_path: source_path.as_str(),
                    archive_path,
                    source,
                })
            })
            .collect()
    }

    /// Resolves where the archive for a build rooted at `default_output` goes.
    pub fn destination(&self, default_output: &Path) -> Result<ArchiveDestination> {
        output_path::resolve_archive_path(default_output, &self.options)
    }

    /// Assembles the archive with the writer for the configured format.
    pub async fn assemble(&self, assets: &Assets, default_output: &Path) -> Result<ArchiveAsset> {
        let writer = archive::writer_for(self.options.format, &self.options.zip_options);
        self.assemble_with(writer, assets, default_output).await
    }

    /// Assembles the archive with a caller-supplied writer.
    ///
    /// # Errors
    ///
    /// Content that cannot be read and any writer failure are returned as-is; no
    /// partial archive is produced.
    pub async fn assemble_with(
        &self,
        mut writer: Box<dyn ArchiveWriter>,
        assets: &Assets,
        default_output: &Path,
    ) -> Result<ArchiveAsset> {
        let planned = self.plan(assets);
        info!(
            "Archiving {} of {} build outputs",
            planned.len(),
            assets.len()
        );

        for entry in &planned {
            let content = entry.source.bytes()?;
            writer.add_buffer(&content, &entry.archive_path, &self.options.file_options)?;
        }

        let bytes = writer.end(&self.options.zip_options).collect().await?;
        let destination = self.destination(default_output)?;
        debug!(
            "Assembled {} bytes for '{}' ({})",
            bytes.len(),
            destination.relative,
            destination.absolute.display()
        );

        Ok(ArchiveAsset {
            path: destination.relative,
            absolute_path: destination.absolute,
            bytes,
            entries: planned.len(),
        })
    }
}

/// A prefix counts as absolute if it is absolute on this platform or starts with a
/// separator, so `/abs` is rejected on Windows too.
fn is_absolute_prefix(prefix: &str) -> bool {
    prefix.starts_with('/') || prefix.starts_with('\\') || Path::new(prefix).is_absolute()
}
