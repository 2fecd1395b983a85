//! # distzip Archive Writers (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module holds the archive-writer collaborators the packer streams entries
//! into. A writer is driven through a staged protocol:
//!
//! 1. `add_buffer` once per selected entry (content, in-archive path, entry options),
//! 2. `end` once with the archive-level options,
//! 3. the returned `ArchiveStream` is drained chunk by chunk until it ends or
//!    yields an error.
//!
//! ## Architecture
//!
//! - **`ArchiveWriter`**: The trait every writer implements.
//! - **`ArchiveStream`**: The output side. Finalization runs on tokio's blocking pool and
//!   the finished bytes are sent back in fixed-size chunks over a bounded channel.
//! - **`zip_writer`**: `ZipArchiveWriter`, the default format, built on the `zip` crate.
//! - **`tar_writer`**: `TarGzArchiveWriter`, gzipped tarballs via `tar` and `flate2`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut writer = archive::writer_for(ArchiveFormat::Zip, &ZipOptions::default());
//! writer.add_buffer(b"console.log(1)", "release/main.js", &FileOptions::default())?;
//! let bytes = writer.end(&ZipOptions::default()).collect().await?;
//! ```
//!
use crate::core::error::{DistzipError, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub mod tar_writer;
pub mod zip_writer;

pub use tar_writer::TarGzArchiveWriter;
pub use zip_writer::ZipArchiveWriter;

/// Size of each chunk an `ArchiveStream` yields.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered in the channel before the producer waits for the consumer.
const STREAM_DEPTH: usize = 16;

/// Per-entry metadata template, applied to every entry of one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Modification time recorded for each entry. Writers fall back to their own
    /// default when unset.
    pub mtime: Option<DateTime<Utc>>,
    /// Unix mode bits. ZIP entries keep only the permission bits (`0o777`);
    /// `.tar.gz` entries keep `0o7777`. File type bits are ignored.
    pub mode: Option<u32>,
    /// Whether entries are compressed. Defaults to `true`.
    pub compress: Option<bool>,
    /// Write ZIP64 extended information for every entry regardless of size.
    pub force_zip64: bool,
}

impl FileOptions {
    pub fn compress(&self) -> bool {
        self.compress.unwrap_or(true)
    }
}

/// Archive-level options applied when a writer is created and finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZipOptions {
    /// Write ZIP64 records for every entry and the ZIP64 end of central directory.
    pub force_zip64: bool,
    /// Archive comment (ZIP only).
    pub comment: Option<String>,
}

/// Container format of the emitted archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveFormat {
    #[default]
    Zip,
    TarGz,
}

/// # Archive Writer (`ArchiveWriter`)
///
/// Accumulates entries and turns them into a finished archive.
pub trait ArchiveWriter: Send {
    /// Adds one entry. Errors are the underlying library's, unchanged.
    fn add_buffer(&mut self, content: &[u8], archive_path: &str, options: &FileOptions)
        -> Result<()>;

    /// Finalizes the archive and returns its byte stream. Must be called from
    /// within a tokio runtime.
    fn end(self: Box<Self>, options: &ZipOptions) -> ArchiveStream;
}

/// Creates a fresh writer for `format`.
///
/// `options.force_zip64` has to be known before the first entry is written, so it
/// is applied here rather than in `end`.
pub fn writer_for(format: ArchiveFormat, options: &ZipOptions) -> Box<dyn ArchiveWriter> {
    match format {
        ArchiveFormat::Zip => Box::new(ZipArchiveWriter::new(options.force_zip64)),
        ArchiveFormat::TarGz => Box::new(TarGzArchiveWriter::new()),
    }
}

/// # Archive Output Stream (`ArchiveStream`)
///
/// The finished archive as an ordered sequence of byte chunks, terminated either
/// by the end of the stream or by a single error item.
pub struct ArchiveStream {
    receiver: mpsc::Receiver<Result<Vec<u8>>>,
    task: JoinHandle<bool>,
}

impl ArchiveStream {
    /// Runs `finish` on the blocking pool and streams its output.
    pub fn spawn<F>(finish: F) -> Self
    where
        F: FnOnce() -> Result<Vec<u8>> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(STREAM_DEPTH);
        let task = tokio::task::spawn_blocking(move || match finish() {
            Ok(bytes) => {
                for chunk in bytes.chunks(CHUNK_SIZE) {
                    if sender.blocking_send(Ok(chunk.to_vec())).is_err() {
                        debug!("Archive stream consumer went away before the end");
                        return false;
                    }
                }
                true
            }
            Err(e) => {
                let _ = sender.blocking_send(Err(e));
                false
            }
        });
        Self { receiver, task }
    }

    /// Waits for the next chunk. `None` marks the end of the stream.
    pub async fn next_chunk(&mut self) -> Option<Result<Vec<u8>>> {
        self.receiver.recv().await
    }

    /// Drains the stream into a single buffer.
    ///
    /// # Errors
    ///
    /// Returns the writer's error unchanged if it emitted one, or
    /// `DistzipError::StreamClosed` if the producer stopped without finishing.
    pub async fn collect(mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            buffer.extend_from_slice(&chunk?);
        }
        match self.task.await {
            Ok(true) => Ok(buffer),
            _ => Err(DistzipError::StreamClosed.into()),
        }
    }
}
