//! # Artifact Matcher (`packer::matcher`)
//!
//! File: cli/src/packer/matcher.rs
//! Author: Christi Mahu
//!
//! Decides whether an artifact path goes into the archive. Rules form a small
//! closed set:
//!
//! - `Literal`: the path equals the string exactly.
//! - `Prefix`: the path starts with the string (e.g. `"subdir/"` selects a directory).
//! - `Pattern`: an unanchored regular expression finds a match anywhere in the path.
//! - `AnyOf`: any of the nested rules matches. An empty list matches nothing.
//!
//! `exclude` always beats `include`, and with neither given every path is selected.
//!
use crate::core::error::{DistzipError, Result};
use regex::Regex;

/// A rule selecting artifact paths.
#[derive(Debug, Clone)]
pub enum Rule {
    Literal(String),
    Prefix(String),
    Pattern(Regex),
    AnyOf(Vec<Rule>),
}

impl Rule {
    /// Compiles `pattern` into a `Rule::Pattern`.
    ///
    /// # Errors
    ///
    /// Returns `DistzipError::InvalidPattern` if the expression does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern).map(Rule::Pattern).map_err(|source| {
            DistzipError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
            .into()
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        match self {
            Rule::Literal(literal) => path == literal,
            Rule::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Rule::Pattern(regex) => regex.is_match(path),
            Rule::AnyOf(rules) => rules.iter().any(|rule| rule.is_match(path)),
        }
    }
}

impl From<&str> for Rule {
    fn from(literal: &str) -> Self {
        Rule::Literal(literal.to_string())
    }
}

impl From<Vec<Rule>> for Rule {
    fn from(rules: Vec<Rule>) -> Self {
        Rule::AnyOf(rules)
    }
}

/// Returns whether `path` is selected by the `include`/`exclude` pair.
pub fn matches(path: &str, include: Option<&Rule>, exclude: Option<&Rule>) -> bool {
    if exclude.is_some_and(|rule| rule.is_match(path)) {
        return false;
    }
    include.map_or(true, |rule| rule.is_match(path))
}
