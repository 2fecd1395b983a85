//! # Entry Transform (`packer::entry`)
//!
//! File: cli/src/packer/entry.rs
//! Author: Christi Mahu
//!
//! Maps an artifact path to its path inside the archive: the configured prefix
//! is joined on first, then the path mapper (if any) rewrites the prefixed path.
//! The mapper therefore never sees an unprefixed path.
//!
use super::PackOptions;
use crate::common::fs::paths;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// A pure function from in-archive path to in-archive path.
#[derive(Clone)]
pub struct PathMapper(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl PathMapper {
    pub fn new<F>(mapper: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(mapper))
    }

    /// Builds a mapper that applies each rewrite in order, replacing every match.
    pub fn from_rewrites(rewrites: Vec<RewriteRule>) -> Self {
        Self::new(move |path| {
            rewrites.iter().fold(path.to_string(), |current, rule| {
                rule.pattern
                    .replace_all(&current, rule.replacement.as_str())
                    .into_owned()
            })
        })
    }

    pub fn map(&self, path: &str) -> String {
        (self.0)(path)
    }
}

impl fmt::Debug for PathMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathMapper(..)")
    }
}

/// One regex substitution; `replacement` may reference groups as `$1` or `${name}`.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub pattern: Regex,
    pub replacement: String,
}

/// Computes the in-archive path for `original_path`.
pub fn map_entry(original_path: &str, options: &PackOptions) -> String {
    let with_prefix = paths::join_slash(&[
        options.path_prefix.as_deref().unwrap_or(""),
        original_path,
    ]);
    match &options.path_mapper {
        Some(mapper) => mapper.map(&with_prefix),
        None => with_prefix,
    }
}
