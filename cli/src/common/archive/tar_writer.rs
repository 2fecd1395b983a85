//! # distzip TAR Archive Writer (`common::archive::tar_writer`)
//!
//! File: cli/src/common/archive/tar_writer.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module provides `TarGzArchiveWriter`, which builds gzipped tarballs
//! (`.tar.gz`) in memory from in-memory entries.
//!
//! ## Architecture
//!
//! The writer leverages the `tar` crate for the archive structure and the `flate2`
//! crate for Gzip compression:
//!
//! - Each entry becomes a regular-file GNU header with the entry's size, mode and
//!   modification time, followed by its content.
//! - The entire archive is compressed as one Gzip stream, so the per-entry
//!   `compress` flag has no effect here.
//! - ZIP-only options (`force_zip64`, `comment`) are ignored.
//!
use super::{ArchiveStream, ArchiveWriter, FileOptions, ZipOptions};
use crate::core::error::Result;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::trace;

/// Mode used for entries when no `mode` is configured.
const DEFAULT_MODE: u32 = 0o644;

/// In-memory `.tar.gz` writer.
pub struct TarGzArchiveWriter {
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
}

impl TarGzArchiveWriter {
    pub fn new() -> Self {
        // Wrap the byte vector with a Gzip encoder using default compression level.
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        Self {
            builder: tar::Builder::new(encoder),
        }
    }
}

impl Default for TarGzArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter for TarGzArchiveWriter {
    fn add_buffer(
        &mut self,
        content: &[u8],
        archive_path: &str,
        options: &FileOptions,
    ) -> Result<()> {
        let mtime = options.mtime.unwrap_or_else(Utc::now).timestamp().max(0) as u64;

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(options.mode.unwrap_or(DEFAULT_MODE) & 0o7777);
        header.set_mtime(mtime);

        trace!("tar: adding '{}' ({} bytes)", archive_path, content.len());
        // `append_data` writes the path into the header and fills in the checksum.
        self.builder.append_data(&mut header, archive_path, content)?;
        Ok(())
    }

    fn end(self: Box<Self>, _options: &ZipOptions) -> ArchiveStream {
        let builder = self.builder;
        ArchiveStream::spawn(move || {
            // Finalize the TAR structure (closing records), then the Gzip stream.
            let encoder = builder.into_inner()?;
            Ok(encoder.finish()?)
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::collections::HashMap;
    use std::io::Read;
    use tar::Archive;

    #[tokio::test]
    async fn test_tar_gz_round_trip() -> Result<()> {
        let options = FileOptions {
            mtime: Some(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()),
            mode: Some(0o100664),
            ..Default::default()
        };
        let mut writer: Box<dyn ArchiveWriter> = Box::new(TarGzArchiveWriter::new());
        writer.add_buffer(b"hello", "release/file1.txt", &options)?;
        writer.add_buffer(b"world", "release/subdir/file2.txt", &options)?;
        let tar_data = writer.end(&ZipOptions::default()).collect().await?;
        assert!(!tar_data.is_empty());

        let mut tar_archive = Archive::new(GzDecoder::new(tar_data.as_slice()));
        let mut found = HashMap::new();
        for entry_result in tar_archive.entries()? {
            let mut entry = entry_result?;
            let path = entry.path()?.to_string_lossy().replace('\\', "/");
            assert_eq!(entry.header().mode()?, 0o664);
            assert_eq!(entry.header().mtime()?, 1_451_606_400);
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            found.insert(path, content);
        }
        assert_eq!(found.get("release/file1.txt").map(String::as_str), Some("hello"));
        assert_eq!(
            found.get("release/subdir/file2.txt").map(String::as_str),
            Some("world")
        );
        Ok(())
    }
}
