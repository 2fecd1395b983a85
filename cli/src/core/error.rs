//! # distzip Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout distzip. It follows a
//! two-layer approach:
//! - `DistzipError`: A custom error enum using `thiserror` for the failures the
//!   crate itself detects (bad configuration, asset conflicts, a closed archive stream).
//! - `Result<T>`: A type alias for `anyhow::Result<T>` so collaborator errors
//!   (zip and tar writers, filesystem) can be propagated with `?`.
//!
//! Archive writer errors are never wrapped or given extra context: a failed
//! build reports the writer's own message.
//!
//! ## Examples
//!
//! ```rust,ignore
//! // Reject an absolute prefix before any build work happens.
//! if Path::new(prefix).is_absolute() {
//!     anyhow::bail!(DistzipError::AbsolutePathPrefix { prefix: prefix.to_string() });
//! }
//!
//! // Pattern matching on error types
//! match packer.process_assets(&mut host).await {
//!     Err(e) if e.downcast_ref::<DistzipError>().map_or(false, |de| matches!(de, DistzipError::AssetConflict { .. })) => {
//!         println!("Archive already emitted with different content");
//!     }
//!     other => other?,
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for distzip.
#[derive(Error, Debug)]
pub enum DistzipError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("`path_prefix` must be a relative path, got '{prefix}'")]
    AbsolutePathPrefix { prefix: String },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Conflict: multiple assets emit different content to '{path}'")]
    AssetConflict { path: String },

    #[error("Archive output stream closed before the archive was complete")]
    StreamClosed,
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
