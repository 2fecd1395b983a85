//! # distzip Pack Command
//!
//! File: cli/src/commands/pack.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `distzip pack <OUTPUT_DIR>` treats an existing build output directory as a
//! finished build, archives its files and writes the archive to disk.
//!
//! Pack flow:
//! 1. Load `distzip.toml` (explicit `--config` or discovered) and merge the flags over it
//! 2. Validate the result and build `PackOptions`
//! 3. Scan `OUTPUT_DIR` into a `DirectoryBuild`
//! 4. Exclude the destination archive itself, so a re-run does not pack the previous archive
//! 5. Print the plan (`--dry-run`) or run the lifecycle hook and report the result
//!
//! ## Examples
//!
//! ```bash
//! distzip pack ./dist
//! distzip pack ./dist --path ../release --filename app --prefix app-1.0
//! distzip pack ./dist --exclude-regex '\.map$' --mtime 2016-01-01T00:00:00Z --mode 644
//! distzip pack ./dist --format tar-gz --extension tar.gz
//! ```
//!
use clap::Parser;
use distzip::common::archive::ArchiveFormat;
use distzip::core::config::{self, ConfigOverrides, RuleConfig};
use distzip::core::error::Result;
use distzip::host::{BuildHost, DirectoryBuild};
use distzip::packer::{PackOptions, Packer, Rule};
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments for `distzip pack`.
#[derive(Parser, Debug)]
pub struct PackArgs {
    /// Build output directory to archive.
    pub output_dir: PathBuf,

    /// Directory for the archive, relative to OUTPUT_DIR or absolute.
    #[arg(long)]
    pub path: Option<String>,
    /// Archive file name (a trailing `.zip` is replaced by the extension).
    #[arg(long)]
    pub filename: Option<String>,
    /// Archive file extension [default: zip].
    #[arg(long)]
    pub extension: Option<String>,
    /// Relative directory to place every entry under.
    #[arg(long = "prefix")]
    pub path_prefix: Option<String>,

    /// Include only this exact path (repeatable).
    #[arg(long)]
    pub include: Vec<String>,
    /// Include paths matching this regex (repeatable).
    #[arg(long)]
    pub include_regex: Vec<String>,
    /// Include paths starting with this string (repeatable).
    #[arg(long)]
    pub include_prefix: Vec<String>,
    /// Exclude this exact path (repeatable).
    #[arg(long)]
    pub exclude: Vec<String>,
    /// Exclude paths matching this regex (repeatable).
    #[arg(long)]
    pub exclude_regex: Vec<String>,
    /// Exclude paths starting with this string (repeatable).
    #[arg(long)]
    pub exclude_prefix: Vec<String>,

    /// Archive format.
    #[arg(long, value_enum)]
    pub format: Option<ArchiveFormat>,
    /// Modification time for every entry (RFC 3339).
    #[arg(long)]
    pub mtime: Option<String>,
    /// Unix mode for every entry, in octal (e.g. 644 or 0o100644).
    #[arg(long, value_parser = parse_octal_mode)]
    pub mode: Option<u32>,
    /// Store entries without compression.
    #[arg(long)]
    pub store: bool,
    /// Force ZIP64 records.
    #[arg(long)]
    pub zip64: bool,
    /// Archive comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Print the destination and the planned entries without writing anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Configuration file to use instead of the discovered `distzip.toml`.
    #[arg(long, env = "DISTZIP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl PackArgs {
    fn overrides(&self) -> ConfigOverrides {
        fn rules(literals: &[String], regexes: &[String], prefixes: &[String]) -> Vec<RuleConfig> {
            literals
                .iter()
                .map(|literal| RuleConfig::Literal(literal.clone()))
                .chain(regexes.iter().map(|regex| RuleConfig::Regex {
                    regex: regex.clone(),
                }))
                .chain(prefixes.iter().map(|prefix| RuleConfig::Prefix {
                    prefix: prefix.clone(),
                }))
                .collect()
        }

        ConfigOverrides {
            path: self.path.clone(),
            filename: self.filename.clone(),
            extension: self.extension.clone(),
            path_prefix: self.path_prefix.clone(),
            format: self.format,
            include: rules(&self.include, &self.include_regex, &self.include_prefix),
            exclude: rules(&self.exclude, &self.exclude_regex, &self.exclude_prefix),
            mtime: self.mtime.clone(),
            mode: self.mode,
            store: self.store,
            zip64: self.zip64,
            comment: self.comment.clone(),
        }
    }
}

/// Parses an octal mode, with or without a `0o` prefix.
fn parse_octal_mode(value: &str) -> std::result::Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u32::from_str_radix(digits, 8).map_err(|e| format!("'{}' is not an octal mode: {}", value, e))
}

/// # Handle Pack Command (`handle_pack`)
///
/// Archives `args.output_dir` according to the merged configuration.
///
/// ## Returns
///
/// * `Result<()>`: `Err` for invalid configuration, an unreadable output directory,
///   or any failure while writing the archive.
pub async fn handle_pack(args: PackArgs) -> Result<()> {
    info!("Handling pack command with args: {:?}", args);

    let file_config = config::load_config(args.config.as_deref())?;
    let mut options = config::resolve_pack_options(file_config, args.overrides())?;
    let mut build = DirectoryBuild::scan(&args.output_dir)?;

    let destination = Packer::new(options.clone())?.destination(build.root())?;
    exclude_destination(&mut options, &destination.relative);
    let packer = Packer::new(options)?;

    let plan = packer.plan(build.assets());
    if args.dry_run {
        println!("Archive: {}", destination.absolute.display());
        for entry in &plan {
            println!("  {} -> {}", entry.source_path, entry.archive_path);
        }
        println!("{} entries (dry run, nothing written)", plan.len());
        return Ok(());
    }
    let entries = plan.len();

    if let Some(emitted) = packer.process_assets(&mut build).await? {
        debug!("Archive registered as '{}'", emitted);
    }
    println!(
        "Created {} ({} entries)",
        destination.absolute.display(),
        entries
    );
    Ok(())
}

/// Adds the archive's own key to the exclude rules.
fn exclude_destination(options: &mut PackOptions, relative: &str) {
    let own = Rule::Literal(relative.to_string());
    options.exclude = Some(match options.exclude.take() {
        None => own,
        Some(Rule::AnyOf(mut rules)) if !rules.is_empty() => {
            rules.push(own);
            Rule::AnyOf(rules)
        }
        Some(Rule::AnyOf(_)) => own,
        Some(rule) => Rule::AnyOf(vec![rule, own]),
    });
}
