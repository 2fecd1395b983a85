//! # distzip Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by the packer and the CLI:
//! - `config`: Loading `distzip.toml`, merging CLI overrides, validating, and
//!   converting the result into `PackOptions`.
//! - `error`: The `DistzipError` enum and the crate-wide `Result` alias.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use distzip::core::config; // For loading configuration
//! use distzip::core::error::{DistzipError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
