//! The `photostamp` binary: arguments, output naming and exit codes.

use super::test_harness::*;
use image::ImageFormat;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

fn photostamp(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_photostamp"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run photostamp")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn test_single_mode_writes_prefixed_file_beside_input() {
    if load_font().is_none() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.jpg");
    write_image(&input, 320, 240, ImageFormat::Jpeg, REFERENCE_MTIME);

    let output = photostamp(&[OsStr::new("--utc"), input.as_os_str()]);

    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    let expected = dir.path().join("timestamped_photo.jpg");
    assert!(expected.is_file());
    assert!(stdout_of(&output).contains(&format!("Modified time: {}", REFERENCE_TEXT)));
}

#[test]
fn test_utc_flag_overrides_config_timezone() {
    if load_font().is_none() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("photostamp.yaml");
    std::fs::write(&config, "timestamp:\n  timezone: local\n  format: \"%H:%M\"\n").unwrap();
    let input = dir.path().join("photo.png");
    let out = dir.path().join("out.jpg");
    write_image(&input, 120, 90, ImageFormat::Png, REFERENCE_MTIME);

    let output = photostamp(&[
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--utc"),
        input.as_os_str(),
        out.as_os_str(),
    ]);

    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    assert!(out.is_file());
    assert!(stdout_of(&output).contains("Modified time: 14:30"));
}

#[test]
fn test_batch_without_output_dir_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = photostamp(&[OsStr::new("--batch"), dir.path().as_os_str()]);

    assert_eq!(output.status.code(), Some(2), "{:?}", output);
    assert_eq!(file_count(dir.path()), 0);
}

#[test]
fn test_missing_arguments_is_usage_error() {
    let output = photostamp(&[]);
    assert_eq!(output.status.code(), Some(2), "{:?}", output);
}

#[test]
fn test_missing_config_file_is_runtime_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photo.jpg");
    let config = dir.path().join("missing.yaml");

    let output = photostamp(&[OsStr::new("--config"), config.as_os_str(), input.as_os_str()]);

    assert_eq!(output.status.code(), Some(1), "{:?}", output);
}

#[test]
fn test_single_mode_corrupt_input_exits_one() {
    if load_font().is_none() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.jpg");
    std::fs::write(&input, b"garbage").unwrap();

    let output = photostamp(&[input.as_os_str()]);

    assert_eq!(output.status.code(), Some(1), "{:?}", output);
    assert!(!dir.path().join("timestamped_broken.jpg").exists());
}

#[test]
fn test_batch_with_corrupt_file_exits_one_and_keeps_going() {
    if load_font().is_none() {
        return;
    }
    let input = tempfile::tempdir().unwrap();
    let out_root = tempfile::tempdir().unwrap();
    let out = out_root.path().join("stamped");
    write_image(&input.path().join("a.jpg"), 80, 60, ImageFormat::Jpeg, REFERENCE_MTIME);
    write_image(&input.path().join("b.png"), 80, 60, ImageFormat::Png, REFERENCE_MTIME);
    std::fs::write(input.path().join("c.jpg"), b"garbage").unwrap();

    let output = photostamp(&[OsStr::new("--batch"), input.path().as_os_str(), out.as_os_str()]);

    assert_eq!(output.status.code(), Some(1), "{:?}", output);
    assert!(out.join("a.jpg").is_file());
    assert!(out.join("b.png").is_file());
    assert!(!out.join("c.jpg").exists());
    assert!(stdout_of(&output).contains("3 found, 2 processed, 1 failed, 0 skipped"));
}

#[test]
fn test_fail_fast_overrides_config_and_leaves_rest_unwritten() {
    if load_font().is_none() {
        return;
    }
    let input = tempfile::tempdir().unwrap();
    let out_root = tempfile::tempdir().unwrap();
    let out = out_root.path().join("stamped");
    let config = out_root.path().join("photostamp.yaml");
    std::fs::write(&config, "batch:\n  on_error: continue\n").unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        std::fs::write(input.path().join(name), b"garbage").unwrap();
    }

    let output = photostamp(&[
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--fail-fast"),
        OsStr::new("--batch"),
        input.path().as_os_str(),
        out.as_os_str(),
    ]);

    assert_eq!(output.status.code(), Some(1), "{:?}", output);
    assert_eq!(file_count(&out), 0);
    assert!(stdout_of(&output).contains("3 found, 0 processed, 1 failed, 2 skipped"));
}

#[test]
fn test_batch_success_exits_zero() {
    if load_font().is_none() {
        return;
    }
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_image(&input.path().join("a.jpg"), 80, 60, ImageFormat::Jpeg, REFERENCE_MTIME);
    std::fs::write(input.path().join("notes.txt"), "skip me").unwrap();

    let output = photostamp(&[OsStr::new("--batch"), input.path().as_os_str(), out.path().as_os_str()]);

    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    assert_eq!(file_count(out.path()), 1);
}
