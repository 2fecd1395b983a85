//! # distzip
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! distzip packs the finished outputs of a build into a single archive (ZIP by
//! default) and registers that archive back into the build as one more output.
//!
//! ## Architecture
//!
//! - **`packer`**: Selection, in-archive path mapping, destination resolution and
//!   the build lifecycle hook (`Packer::process_assets`).
//! - **`host`**: The `BuildHost` contract plus in-memory and on-disk builds.
//! - **`common`**: Archive writers and filesystem helpers.
//! - **`core`**: Error types and the `distzip.toml` configuration layer.
//!
//! The `distzip` binary (`main.rs`) drives all of this against a build output
//! directory.
//!

pub mod common;
pub mod core;
pub mod host;
pub mod packer;
