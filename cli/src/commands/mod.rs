//! # distzip Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the commands of the distzip CLI. Each command defines its
//! own Clap arguments structure and an async handler called from `main.rs`.
//!
//! ## Commands
//!
//! - `pack`: Archive a build output directory.
//!

/// Archives a build output directory (`distzip pack`).
pub mod pack;
