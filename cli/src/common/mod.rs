//! # distzip Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared utilities used by the packer, the build hosts and the CLI:
//!
//! - **`archive`**: The archive-writer collaborators (`ArchiveWriter`, ZIP and `.tar.gz`
//!   implementations) and the chunked output stream they produce.
//! - **`fs`**: Filesystem I/O with contextual errors, plus lexical path helpers.
//!

/// Archive writers and their output stream.
pub mod archive;
/// Filesystem operations and path arithmetic.
pub mod fs;
