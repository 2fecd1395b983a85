//! # distzip Lexical Path Helpers
//!
//! File: cli/src/common/fs/paths.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Purely lexical path arithmetic. Nothing here touches the filesystem (apart from
//! reading the process working directory to anchor a relative path), so results do
//! not depend on which files exist and symlinks are not followed.
//!
//! - **`normalize`**: Removes `.` components and folds `..` into the preceding component.
//! - **`resolve`**: Combines segments left to right; an absolute segment discards everything
//!   before it, and a result that is still relative is anchored at the working directory.
//! - **`to_slash`**: Renders a relative path with `/` separators (artifact keys).
//! - **`join_slash`**: Joins `/`-separated archive paths and normalizes the result.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::env;
use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `path`.
///
/// `..` directly under the root is dropped (there is nothing above `/`), while
/// leading `..` components of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves a sequence of path segments into one absolute, normalized path.
///
/// Empty segments are skipped. The rightmost absolute segment wins; relative
/// segments are joined onto whatever precedes them.
///
/// # Errors
///
/// Returns an `Err` only when every segment is relative and the current working
/// directory cannot be determined.
pub fn resolve<P: AsRef<Path>>(segments: &[P]) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.as_os_str().is_empty() {
            continue;
        }
        // `PathBuf::push` replaces the buffer when `segment` is absolute.
        resolved.push(segment);
    }
    if !resolved.is_absolute() {
        resolved = env::current_dir()
            .context("Failed to get current working directory")?
            .join(resolved);
    }
    Ok(normalize(&resolved))
}

/// Renders `path` with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            Component::CurDir => None,
            Component::RootDir | Component::Prefix(_) => Some(String::new()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins `/`-separated path fragments and normalizes the result.
///
/// Empty and `.` segments vanish, `..` removes the preceding segment when there
/// is one. Joining nothing but empty fragments yields `"."`.
pub fn join_slash(parts: &[&str]) -> String {
    let absolute = parts
        .iter()
        .find(|part| !part.is_empty())
        .is_some_and(|part| part.starts_with('/'));

    let mut segments: Vec<&str> = Vec::new();
    for segment in parts.iter().flat_map(|part| part.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/out/dist/./zip")), PathBuf::from("/out/dist/zip"));
        assert_eq!(normalize(Path::new("/out/bin/../zip")), PathBuf::from("/out/zip"));
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_rightmost_absolute_wins() -> Result<()> {
        assert_eq!(
            resolve(&["/out/dist", "zip", "zip.zip"])?,
            PathBuf::from("/out/dist/zip/zip.zip")
        );
        assert_eq!(
            resolve(&["/out/dist", "/elsewhere", "a.zip"])?,
            PathBuf::from("/elsewhere/a.zip")
        );
        assert_eq!(
            resolve(&["/out/dist", "zip", "/tmp/final.zip"])?,
            PathBuf::from("/tmp/final.zip")
        );
        assert_eq!(resolve(&["/out/dist", "", "a.zip"])?, PathBuf::from("/out/dist/a.zip"));
        Ok(())
    }

    #[test]
    fn test_resolve_relative_is_anchored_at_cwd() -> Result<()> {
        let resolved = resolve(&["dist", "a.zip"])?;
        assert!(resolved.is_absolute());
        assert_eq!(resolved, normalize(&env::current_dir()?.join("dist/a.zip")));
        Ok(())
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("zip").join("zip.zip").as_path()), "zip/zip.zip");
        assert_eq!(to_slash(Path::new("..").join("zip").as_path()), "../zip");
    }

    #[test]
    fn test_join_slash() {
        assert_eq!(join_slash(&["", "a.js"]), "a.js");
        assert_eq!(join_slash(&["release", "subdir/b.jpg"]), "release/subdir/b.jpg");
        assert_eq!(join_slash(&["./release/", "a.js"]), "release/a.js");
        assert_eq!(join_slash(&["release", "../a.js"]), "a.js");
        assert_eq!(join_slash(&["", "../a.js"]), "../a.js");
        assert_eq!(join_slash(&["", ""]), ".");
    }
}
