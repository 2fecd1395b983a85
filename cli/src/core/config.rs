//! # distzip Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module loads, merges and validates the configuration of the `distzip` CLI and
//! turns it into the `PackOptions` the packer works with.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags (`ConfigOverrides`)
//! 2. `distzip.toml` given with `--config`, or found in the current directory or
//!    its ancestors (the search stops at the first directory containing `.git`)
//! 3. Default values defined in the code
//!
//! After merging, `~` in `path` is expanded and the result is validated
//! (`validate_config`) before any build output is touched.
//!
//! ## Examples
//!
//! ```toml
//! path = "../release"
//! filename = "app"
//! path_prefix = "release"
//! include = ["main.js", { regex = "\\.jpe?g$" }, { prefix = "static/" }]
//! exclude = "chunk.js"
//!
//! [[rewrite]]
//! pattern = "^(.*)\\.jpeg$"
//! replacement = "$1.jpg"
//!
//! [file_options]
//! mtime = "2016-01-01T00:00:00Z"
//! mode = 0o100664
//!
//! [zip_options]
//! comment = "release build"
//! ```
//!
use crate::common::archive::zip_writer::zip_timestamp;
use crate::common::archive::{ArchiveFormat, FileOptions, ZipOptions};
use crate::common::fs::io;
use crate::core::error::{DistzipError, Result};
use crate::packer::{PackOptions, PathMapper, RewriteRule, Rule};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the project configuration file.
pub const CONFIG_FILENAME: &str = "distzip.toml";

/// Largest accepted `mode`: permission bits plus the file type bits.
pub const MAX_MODE: u32 = 0o177777;

/// Represents the configuration file structure.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Output directory for the archive (can use ~). Will be expanded.
    pub path: Option<String>,
    pub filename: Option<String>,
    pub extension: Option<String>,
    pub path_prefix: Option<String>,
    pub format: Option<ArchiveFormat>,
    pub include: Option<OneOrMany<RuleConfig>>,
    pub exclude: Option<OneOrMany<RuleConfig>>,
    /// Ordered rewrites forming the path mapper.
    #[serde(default, rename = "rewrite")]
    pub rewrites: Vec<RewriteConfig>,
    #[serde(default)]
    pub file_options: FileOptionsConfig,
    #[serde(default)]
    pub zip_options: ZipOptionsConfig,
}

/// A single selection rule as written in TOML.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged, deny_unknown_fields)]
pub enum RuleConfig {
    /// `"a.js"`: exact path.
    Literal(String),
    /// `{ regex = "\\.js$" }`
    Regex { regex: String },
    /// `{ prefix = "static/" }`
    Prefix { prefix: String },
}

/// Either one value or a list of them.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// One `[[rewrite]]` table.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    pub pattern: String,
    pub replacement: String,
}

/// The `[file_options]` table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileOptionsConfig {
    /// RFC 3339 timestamp.
    pub mtime: Option<String>,
    pub mode: Option<u32>,
    pub compress: Option<bool>,
    pub force_zip64: Option<bool>,
}

/// The `[zip_options]` table.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ZipOptionsConfig {
    pub force_zip64: Option<bool>,
    pub comment: Option<String>,
}

/// Values given on the command line. Set fields replace the file's values; a
/// non-empty rule list replaces the file's rules of the same kind.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub path: Option<String>,
    pub filename: Option<String>,
    pub extension: Option<String>,
    pub path_prefix: Option<String>,
    pub format: Option<ArchiveFormat>,
    pub include: Vec<RuleConfig>,
    pub exclude: Vec<RuleConfig>,
    pub mtime: Option<String>,
    pub mode: Option<u32>,
    /// Store entries without compression.
    pub store: bool,
    /// Force ZIP64 for the archive and every entry.
    pub zip64: bool,
    pub comment: Option<String>,
}

/// Loads the configuration file: `explicit` if given, otherwise the nearest
/// `distzip.toml`. With no file found, the defaults are returned.
pub fn load_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            find_project_config_path(&current_dir)
        }
    };
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(&path)
        }
        None => {
            debug!(
                "No configuration file ({}) found in current directory or ancestors.",
                CONFIG_FILENAME
            );
            Ok(FileConfig::default())
        }
    }
}

/// Merges, expands and validates everything, producing the packer's options.
pub fn resolve_pack_options(file: FileConfig, overrides: ConfigOverrides) -> Result<PackOptions> {
    let mut merged = merge_config(file, overrides);
    expand_config_paths(&mut merged);
    validate_config(&merged).context("Configuration validation failed")?;
    debug!("Final configuration: {:?}", merged);
    merged.into_pack_options()
}

/// Searches `start` and its ancestors for `distzip.toml`, stopping at a directory
/// that contains `.git`.
pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<FileConfig> {
    let content = io::read_file_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Applies command-line overrides on top of the file configuration.
pub fn merge_config(file: FileConfig, cli: ConfigOverrides) -> FileConfig {
    fn rules(cli: Vec<RuleConfig>, file: Option<OneOrMany<RuleConfig>>) -> Option<OneOrMany<RuleConfig>> {
        if cli.is_empty() {
            file
        } else {
            Some(OneOrMany::Many(cli))
        }
    }

    FileConfig {
        path: cli.path.or(file.path),
        filename: cli.filename.or(file.filename),
        extension: cli.extension.or(file.extension),
        path_prefix: cli.path_prefix.or(file.path_prefix),
        format: cli.format.or(file.format),
        include: rules(cli.include, file.include),
        exclude: rules(cli.exclude, file.exclude),
        rewrites: file.rewrites,
        file_options: FileOptionsConfig {
            mtime: cli.mtime.or(file.file_options.mtime),
            mode: cli.mode.or(file.file_options.mode),
            compress: if cli.store {
                Some(false)
            } else {
                file.file_options.compress
            },
            force_zip64: if cli.zip64 {
                Some(true)
            } else {
                file.file_options.force_zip64
            },
        },
        zip_options: ZipOptionsConfig {
            force_zip64: if cli.zip64 {
                Some(true)
            } else {
                file.zip_options.force_zip64
            },
            comment: cli.comment.or(file.zip_options.comment),
        },
    }
}

fn expand_config_paths(config: &mut FileConfig) {
    if let Some(path) = &mut config.path {
        *path = shellexpand::tilde(path).into_owned();
        debug!("Expanded output path: {}", path);
    }
}

/// Checks the merged configuration before any work is done.
///
/// # Errors
///
/// Returns `DistzipError::Config` for an out-of-range `mode` or an unusable `mtime`,
/// and `DistzipError::InvalidPattern` for a regex that does not compile.
pub fn validate_config(config: &FileConfig) -> Result<()> {
    info!("Validating final configuration...");
    if let Some(mode) = config.file_options.mode {
        if mode > MAX_MODE {
            return Err(anyhow!(DistzipError::Config(format!(
                "mode {:#o} is out of range (maximum {:#o})",
                mode, MAX_MODE
            ))));
        }
    }
    if let Some(mtime) = &config.file_options.mtime {
        zip_timestamp(&parse_mtime(mtime)?)?;
    }
    for rule in rule_configs(&config.include).chain(rule_configs(&config.exclude)) {
        rule.to_rule()?;
    }
    for rewrite in &config.rewrites {
        rewrite.to_rule()?;
    }
    info!("Configuration validation successful.");
    Ok(())
}

fn rule_configs(rules: &Option<OneOrMany<RuleConfig>>) -> impl Iterator<Item = &RuleConfig> {
    let slice: &[RuleConfig] = match rules {
        None => &[],
        Some(OneOrMany::One(rule)) => std::slice::from_ref(rule),
        Some(OneOrMany::Many(rules)) => rules,
    };
    slice.iter()
}

fn parse_mtime(mtime: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(mtime)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| {
            anyhow!(DistzipError::Config(format!(
                "mtime '{}' is not an RFC 3339 timestamp: {}",
                mtime, e
            )))
        })
}

impl RuleConfig {
    pub fn to_rule(&self) -> Result<Rule> {
        match self {
            RuleConfig::Literal(literal) => Ok(Rule::Literal(literal.clone())),
            RuleConfig::Regex { regex } => Rule::pattern(regex),
            RuleConfig::Prefix { prefix } => Ok(Rule::Prefix(prefix.clone())),
        }
    }
}

impl RewriteConfig {
    pub fn to_rule(&self) -> Result<RewriteRule> {
        let pattern = Regex::new(&self.pattern).map_err(|source| DistzipError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })?;
        Ok(RewriteRule {
            pattern,
            replacement: self.replacement.clone(),
        })
    }
}

impl OneOrMany<RuleConfig> {
    /// A single rule stays a single rule; a list becomes `Rule::AnyOf`.
    pub fn to_rule(&self) -> Result<Rule> {
        match self {
            OneOrMany::One(rule) => rule.to_rule(),
            OneOrMany::Many(rules) => Ok(Rule::AnyOf(
                rules.iter().map(RuleConfig::to_rule).collect::<Result<_>>()?,
            )),
        }
    }
}

impl FileConfig {
    /// Converts a validated configuration into `PackOptions`.
    pub fn into_pack_options(self) -> Result<PackOptions> {
        let path_mapper = if self.rewrites.is_empty() {
            None
        } else {
            let rewrites = self
                .rewrites
                .iter()
                .map(RewriteConfig::to_rule)
                .collect::<Result<Vec<_>>>()?;
            Some(PathMapper::from_rewrites(rewrites))
        };
        let mtime = self.file_options.mtime.as_deref().map(parse_mtime).transpose()?;

        Ok(PackOptions {
            path: self.path.map(PathBuf::from),
            filename: self.filename,
            extension: self.extension,
            path_prefix: self.path_prefix,
            path_mapper,
            include: self.include.as_ref().map(OneOrMany::to_rule).transpose()?,
            exclude: self.exclude.as_ref().map(OneOrMany::to_rule).transpose()?,
            file_options: FileOptions {
                mtime,
                mode: self.file_options.mode,
                compress: self.file_options.compress,
                force_zip64: self.file_options.force_zip64.unwrap_or(false),
            },
            zip_options: ZipOptions {
                force_zip64: self.zip_options.force_zip64.unwrap_or(false),
                comment: self.zip_options.comment,
            },
            format: self.format.unwrap_or_default(),
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const FULL_TOML: &str = r#"
        path = "../release"
        filename = "app"
        extension = "zip"
        path_prefix = "release"
        format = "tar-gz"
        include = ["main.js", { regex = "\\.jpe?g$" }, { prefix = "static/" }]
        exclude = "chunk.js"

        [[rewrite]]
        pattern = "^(.*)\\.jpeg$"
        replacement = "$1.jpg"

        [file_options]
        mtime = "2016-01-01T00:00:00Z"
        mode = 0o100664
        compress = false
        force_zip64 = true

        [zip_options]
        force_zip64 = true
        comment = "release build"
    "#;

    #[test]
    fn test_deserialize_full_toml() {
        let config: FileConfig = toml::from_str(FULL_TOML).expect("Failed to parse TOML");

        assert_eq!(config.path.as_deref(), Some("../release"));
        assert_eq!(config.format, Some(ArchiveFormat::TarGz));
        assert_eq!(
            config.include,
            Some(OneOrMany::Many(vec![
                RuleConfig::Literal("main.js".to_string()),
                RuleConfig::Regex {
                    regex: r"\.jpe?g$".to_string()
                },
                RuleConfig::Prefix {
                    prefix: "static/".to_string()
                },
            ]))
        );
        assert_eq!(
            config.exclude,
            Some(OneOrMany::One(RuleConfig::Literal("chunk.js".to_string())))
        );
        assert_eq!(config.rewrites.len(), 1);
        assert_eq!(config.file_options.mode, Some(0o100664));
        assert_eq!(config.zip_options.comment.as_deref(), Some("release build"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(toml::from_str::<FileConfig>("pathprefix = \"x\"").is_err());
        assert!(toml::from_str::<FileConfig>("[file_options]\nmodee = 1").is_err());
    }

    #[test]
    fn test_into_pack_options() -> Result<()> {
        let config: FileConfig = toml::from_str(FULL_TOML)?;
        let options = config.into_pack_options()?;

        assert_eq!(options.path, Some(PathBuf::from("../release")));
        assert_eq!(options.path_prefix.as_deref(), Some("release"));
        assert_eq!(options.format, ArchiveFormat::TarGz);
        assert_eq!(options.file_options.mode, Some(0o100664));
        assert_eq!(options.file_options.compress, Some(false));
        assert!(options.file_options.force_zip64);
        assert!(options.zip_options.force_zip64);
        assert_eq!(
            options.file_options.mtime.map(|t| t.timestamp()),
            Some(1_451_606_400)
        );

        let include = options.include.expect("include rule");
        assert!(include.is_match("main.js"));
        assert!(include.is_match("img/photo.jpeg"));
        assert!(include.is_match("static/app.css"));
        assert!(!include.is_match("chunk.js"));
        assert!(options.exclude.expect("exclude rule").is_match("chunk.js"));

        let mapper = options.path_mapper.expect("path mapper");
        assert_eq!(mapper.map("release/a.jpeg"), "release/a.jpg");
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file_values() -> Result<()> {
        let file: FileConfig = toml::from_str(FULL_TOML)?;
        let merged = merge_config(
            file,
            ConfigOverrides {
                filename: Some("cli".to_string()),
                exclude: vec![RuleConfig::Regex {
                    regex: r"\.map$".to_string(),
                }],
                store: false,
                comment: Some("from cli".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(merged.filename.as_deref(), Some("cli"));
        assert_eq!(merged.path_prefix.as_deref(), Some("release"));
        assert_eq!(
            merged.exclude,
            Some(OneOrMany::Many(vec![RuleConfig::Regex {
                regex: r"\.map$".to_string()
            }]))
        );
        // Rules not given on the command line keep the file's values.
        assert!(matches!(merged.include, Some(OneOrMany::Many(ref rules)) if rules.len() == 3));
        assert_eq!(merged.file_options.compress, Some(false));
        assert_eq!(merged.zip_options.comment.as_deref(), Some("from cli"));
        Ok(())
    }

    #[test]
    fn test_store_and_zip64_flags() {
        let merged = merge_config(
            FileConfig::default(),
            ConfigOverrides {
                store: true,
                zip64: true,
                ..Default::default()
            },
        );
        assert_eq!(merged.file_options.compress, Some(false));
        assert_eq!(merged.file_options.force_zip64, Some(true));
        assert_eq!(merged.zip_options.force_zip64, Some(true));
    }

    #[test]
    fn test_validate_mode_range() {
        let mut config = FileConfig::default();
        config.file_options.mode = Some(0o177777);
        assert!(validate_config(&config).is_ok());
        config.file_options.mode = Some(0o200000);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_validate_mtime() {
        let mut config = FileConfig::default();
        config.file_options.mtime = Some("yesterday".to_string());
        assert!(validate_config(&config).is_err());
        config.file_options.mtime = Some("1970-01-01T00:00:00Z".to_string());
        assert!(validate_config(&config).unwrap_err().to_string().contains("1980-2107"));
        config.file_options.mtime = Some("2016-01-01T00:00:00+02:00".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_patterns() {
        let config = FileConfig {
            exclude: Some(OneOrMany::One(RuleConfig::Regex {
                regex: "([".to_string(),
            })),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DistzipError>(),
            Some(DistzipError::InvalidPattern { .. })
        ));

        let config = FileConfig {
            rewrites: vec![RewriteConfig {
                pattern: "(".to_string(),
                replacement: String::new(),
            }],
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_path_tilde_expansion() -> Result<()> {
        let options = resolve_pack_options(
            FileConfig::default(),
            ConfigOverrides {
                path: Some("~/releases".to_string()),
                ..Default::default()
            },
        )?;
        let expected = shellexpand::tilde("~/releases").into_owned();
        assert_eq!(options.path, Some(PathBuf::from(expected)));
        Ok(())
    }

    #[test]
    fn test_find_project_config_walks_up_and_stops_at_git() -> Result<()> {
        let temp_dir = tempdir()?;
        let repo = temp_dir.path().join("repo");
        let nested = repo.join("web/app");
        fs::create_dir_all(&nested)?;
        fs::create_dir_all(repo.join(".git"))?;

        // Above the repository root: not found.
        fs::write(temp_dir.path().join(CONFIG_FILENAME), "")?;
        assert_eq!(find_project_config_path(&nested), None);

        fs::write(repo.join("web").join(CONFIG_FILENAME), "filename = \"web\"")?;
        assert_eq!(
            find_project_config_path(&nested),
            Some(repo.join("web").join(CONFIG_FILENAME))
        );
        Ok(())
    }

    #[test]
    fn test_load_explicit_config() -> Result<()> {
        let temp_dir = tempdir()?;
        let file = temp_dir.path().join("custom.toml");
        fs::write(&file, "filename = \"custom\"\nexclude = { prefix = \"maps/\" }")?;

        let config = load_config(Some(&file))?;
        assert_eq!(config.filename.as_deref(), Some("custom"));
        assert_eq!(
            config.exclude,
            Some(OneOrMany::One(RuleConfig::Prefix {
                prefix: "maps/".to_string()
            }))
        );

        assert!(load_config(Some(&temp_dir.path().join("missing.toml"))).is_err());
        Ok(())
    }
}
