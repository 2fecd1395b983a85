//! # distzip ZIP Writer (`common::archive::zip_writer`)
//!
//! File: cli/src/common/archive/zip_writer.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `ZipArchiveWriter` builds a ZIP archive in memory with the `zip` crate. Entry
//! options map onto the crate's `SimpleFileOptions`:
//!
//! | `FileOptions`  | ZIP entry                                       |
//! |----------------|-------------------------------------------------|
//! | `mtime`        | last-modified DOS timestamp (1980–2107)         |
//! | `mode`         | unix permission bits in the external attributes |
//! | `compress`     | `Deflated` when true (default), `Stored` when false |
//! | `force_zip64`  | ZIP64 extra field on the entry                  |
//!
//! Entries of 4 GiB or more always get the ZIP64 extra field. `ZipOptions::force_zip64`
//! additionally writes the ZIP64 end-of-central-directory record and locator, even
//! for an empty archive.
//!
//! Only the permission bits (`0o777`) of `mode` are stored; setuid, setgid and
//! sticky bits are dropped by the `zip` crate.
//!
use super::{ArchiveStream, ArchiveWriter, FileOptions, ZipOptions};
use crate::core::error::{DistzipError, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::io::{Cursor, Write};
use tracing::trace;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// In-memory ZIP archive writer.
pub struct ZipArchiveWriter {
    inner: ZipWriter<Cursor<Vec<u8>>>,
    force_zip64: bool,
}

impl ZipArchiveWriter {
    /// Creates an empty archive. With `force_zip64`, every entry carries ZIP64
    /// records.
    pub fn new(force_zip64: bool) -> Self {
        Self {
            inner: ZipWriter::new(Cursor::new(Vec::new())),
            force_zip64,
        }
    }

    fn entry_options(&self, options: &FileOptions, content_len: u64) -> Result<SimpleFileOptions> {
        let method = if options.compress() {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let mut entry = SimpleFileOptions::default()
            .compression_method(method)
            .large_file(options.force_zip64 || self.force_zip64 || needs_zip64(content_len));
        if let Some(mode) = options.mode {
            entry = entry.unix_permissions(mode);
        }
        if let Some(mtime) = options.mtime {
            entry = entry.last_modified_time(zip_timestamp(&mtime)?);
        }
        Ok(entry)
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_buffer(
        &mut self,
        content: &[u8],
        archive_path: &str,
        options: &FileOptions,
    ) -> Result<()> {
        let entry = self.entry_options(options, content.len() as u64)?;
        trace!("zip: adding '{}' ({} bytes)", archive_path, content.len());
        self.inner.start_file(archive_path, entry)?;
        self.inner.write_all(content)?;
        Ok(())
    }

    fn end(self: Box<Self>, options: &ZipOptions) -> ArchiveStream {
        let ZipArchiveWriter { mut inner, .. } = *self;
        let comment = options.comment.clone();
        let force_zip64 = options.force_zip64;
        ArchiveStream::spawn(move || {
            if let Some(comment) = comment {
                inner.set_comment(comment);
            }
            if force_zip64 {
                // An empty ZIP64 comment makes the writer emit the ZIP64 end records.
                inner.set_zip64_comment(Some(""));
            }
            let cursor = inner.finish()?;
            Ok(cursor.into_inner())
        })
    }
}

/// Whether an entry of `len` bytes overflows the 32-bit ZIP size fields.
fn needs_zip64(len: u64) -> bool {
    len >= u64::from(u32::MAX)
}

/// Converts a UTC timestamp into a ZIP (MS-DOS) timestamp.
///
/// # Errors
///
/// Returns `DistzipError::Config` for times outside 1980-01-01 ..= 2107-12-31.
pub fn zip_timestamp(mtime: &DateTime<Utc>) -> Result<zip::DateTime> {
    let out_of_range = || {
        DistzipError::Config(format!(
            "modification time {} cannot be stored in a ZIP archive (1980-2107 only)",
            mtime.to_rfc3339()
        ))
    };
    let year = u16::try_from(mtime.year()).map_err(|_| out_of_range())?;
    zip::DateTime::from_date_and_time(
        year,
        mtime.month() as u8,
        mtime.day() as u8,
        mtime.hour() as u8,
        mtime.minute() as u8,
        mtime.second() as u8,
    )
    .map_err(|_| out_of_range().into())
}
