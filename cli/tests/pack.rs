//! # distzip Pack Command Integration Tests
//!
//! File: cli/tests/pack.rs
//! Author: Christi Mahu
//!
//! Runs `distzip pack` against temporary build directories and reads the written
//! archives back.
//!

mod common;
use common::{distzip_cmd, sample_build, zip_entries};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_pack_defaults() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .assert()
        .success()
        .stdout(predicate::str::contains("dist.zip"))
        .stdout(predicate::str::contains("2 entries"));

    let entries = zip_entries(&dist.join("dist.zip"));
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["a.js", "subdir/b.jpg"]);
    assert_eq!(entries["a.js"], b"const abc = 'xyz';");
    assert_eq!(entries["subdir/b.jpg"], [0xff, 0xd8, 0xff, 0xe0]);
}

#[test]
fn test_pack_rerun_does_not_nest_previous_archive() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    for _ in 0..2 {
        distzip_cmd()
            .current_dir(temp_dir.path())
            .arg("pack")
            .arg(&dist)
            .assert()
            .success();
    }
    let entries = zip_entries(&dist.join("dist.zip"));
    assert_eq!(entries.len(), 2);
    assert!(!entries.contains_key("dist.zip"));
}

#[test]
fn test_pack_prefix_exclude_and_location() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--path", "../release", "--filename", "app.zip"])
        .args(["--prefix", "release", "--exclude-regex", r"\.jpg$"])
        .assert()
        .success();

    let entries = zip_entries(&temp_dir.path().join("release/app.zip"));
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["release/a.js"]);
}

#[test]
fn test_pack_custom_extension() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--filename", "out", "--extension", "tar"])
        .assert()
        .success();

    assert!(dist.join("out.tar").is_file());
    assert_eq!(zip_entries(&dist.join("out.tar")).len(), 2);
}

#[test]
fn test_pack_absolute_prefix_fails() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--prefix", "/abs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a relative path"));
    assert!(!dist.join("dist.zip").exists());
}

#[test]
fn test_pack_invalid_regex_fails() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--include-regex", "(["])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_pack_missing_directory_fails() {
    let temp_dir = tempdir().unwrap();
    distzip_cmd()
        .current_dir(temp_dir.path())
        .args(["pack", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_pack_dry_run_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--prefix", "pkg", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a.js -> pkg/a.js"))
        .stdout(predicate::str::contains("subdir/b.jpg -> pkg/subdir/b.jpg"));
    assert!(!dist.join("dist.zip").exists());
}

#[test]
fn test_pack_reads_discovered_config() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());
    fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
    fs::write(
        temp_dir.path().join("distzip.toml"),
        r#"
            filename = "configured"
            path_prefix = "cfg"
            include = { regex = "\\.js$" }

            [file_options]
            mtime = "2016-01-01T00:00:00Z"
            mode = 0o100664
        "#,
    )
    .unwrap();

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .assert()
        .success();

    let archive_path = dist.join("configured.zip");
    assert_eq!(
        zip_entries(&archive_path).keys().collect::<Vec<_>>(),
        vec!["cfg/a.js"]
    );

    let mut archive = zip::ZipArchive::new(fs::File::open(&archive_path).unwrap()).unwrap();
    let entry = archive.by_name("cfg/a.js").unwrap();
    assert_eq!(entry.unix_mode().map(|mode| mode & 0o777), Some(0o664));
    let modified = entry.last_modified().unwrap();
    assert_eq!((modified.year(), modified.month(), modified.day()), (2016, 1, 1));
}

#[test]
fn test_pack_explicit_config_and_cli_override() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());
    let config = temp_dir.path().join("release.toml");
    fs::write(&config, "filename = \"from-file\"\nexclude = \"a.js\"\n").unwrap();

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .arg("--config")
        .arg(&config)
        .args(["--filename", "from-cli"])
        .assert()
        .success();

    assert!(!dist.join("from-file.zip").exists());
    let entries = zip_entries(&dist.join("from-cli.zip"));
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["subdir/b.jpg"]);
}

#[test]
fn test_pack_rejects_unknown_config_keys() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());
    fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
    fs::write(temp_dir.path().join("distzip.toml"), "pathPrefix = \"x\"\n").unwrap();

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .assert()
        .failure()
        .stderr(predicate::str::contains("distzip.toml"));
}

#[test]
fn test_pack_tar_gz() {
    let temp_dir = tempdir().unwrap();
    let dist = sample_build(temp_dir.path());

    distzip_cmd()
        .current_dir(temp_dir.path())
        .arg("pack")
        .arg(&dist)
        .args(["--format", "tar-gz", "--extension", "tar.gz"])
        .assert()
        .success();

    let file = fs::File::open(dist.join("dist.tar.gz")).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let mut names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.js", "subdir/b.jpg"]);
}
