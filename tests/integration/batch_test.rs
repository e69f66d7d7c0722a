//! Directory batch runs.

use super::test_harness::*;
use image::{GenericImageView, ImageFormat};
use photostamp::batch::{BatchDriver, FileStatus};
use photostamp::config::{ErrorPolicy, ExtensionPolicy};
use photostamp::stamp::OutputFormat;
use photostamp::StampError;
use std::path::Path;

fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_batch_processes_only_images() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_image(&input.path().join("a.jpg"), 160, 120, ImageFormat::Jpeg, REFERENCE_MTIME);
    write_image(&input.path().join("c.PNG"), 90, 60, ImageFormat::Png, REFERENCE_MTIME);
    std::fs::write(input.path().join("b.txt"), "notes").unwrap();
    std::fs::write(input.path().join("d.gif"), "GIF89a").unwrap();

    let report = BatchDriver::new(stamper)
        .unwrap()
        .process(input.path(), output.path())
        .await
        .unwrap();

    assert_eq!(report.found, 2);
    assert_eq!(report.processed(), 2);
    assert_eq!(report.failed(), 0);
    assert!(report.is_success());
    assert_eq!(sorted_names(output.path()), vec!["a.jpg", "c.PNG"]);

    // Names are kept but the content is always JPEG
    let data = std::fs::read(output.path().join("c.PNG")).unwrap();
    assert_eq!(&data[..3], &[0xFF, 0xD8, 0xFF]);
    assert_eq!(image::load_from_memory(&data).unwrap().dimensions(), (90, 60));

    for result in &report.results {
        match &result.status {
            FileStatus::Stamped(outcome) => assert_eq!(outcome.timestamp, REFERENCE_TEXT),
            FileStatus::Failed(e) => panic!("{} failed: {}", result.file_name, e),
        }
    }
}

#[tokio::test]
async fn test_batch_creates_output_directory_tree() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("deep/nested/out");
    write_image(&input.path().join("a.jpeg"), 64, 48, ImageFormat::Jpeg, REFERENCE_MTIME);

    let report = BatchDriver::new(stamper)
        .unwrap()
        .process(input.path(), &output)
        .await
        .unwrap();

    assert_eq!(report.processed(), 1);
    assert!(output.join("a.jpeg").is_file());
}

#[tokio::test]
async fn test_batch_continues_past_corrupt_file() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_image(&input.path().join("good1.jpg"), 80, 60, ImageFormat::Jpeg, REFERENCE_MTIME);
    write_image(&input.path().join("good2.png"), 80, 60, ImageFormat::Png, REFERENCE_MTIME);
    std::fs::write(input.path().join("broken.jpg"), b"garbage").unwrap();

    let driver = BatchDriver::new(stamper).unwrap();
    assert_eq!(driver.policy(), ErrorPolicy::Continue);
    let report = driver.process(input.path(), output.path()).await.unwrap();

    assert_eq!(report.found, 3);
    assert_eq!(report.processed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 0);
    assert!(!report.aborted);
    assert!(!report.is_success());

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0.file_name, "broken.jpg");
    assert!(matches!(failures[0].1, StampError::Decode { .. }));

    assert_eq!(sorted_names(output.path()), vec!["good1.jpg", "good2.png"]);
}

#[tokio::test]
async fn test_batch_abort_stops_at_first_failure() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    std::fs::write(input.path().join("a.jpg"), b"garbage").unwrap();
    std::fs::write(input.path().join("b.jpg"), b"garbage").unwrap();
    std::fs::write(input.path().join("c.jpg"), b"garbage").unwrap();

    let report = BatchDriver::new(stamper)
        .unwrap()
        .with_policy(ErrorPolicy::Abort)
        .process(input.path(), output.path())
        .await
        .unwrap();

    assert!(report.aborted);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 2);
    assert!(sorted_names(output.path()).is_empty());
}

#[tokio::test]
async fn test_batch_match_format_renames_extension() {
    let mut config = utc_config();
    config.batch.output_extension = ExtensionPolicy::MatchFormat;
    config.output.format = OutputFormat::Png;
    let Some(stamper) = stamper(config) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_image(&input.path().join("shot.jpg"), 64, 48, ImageFormat::Jpeg, REFERENCE_MTIME);

    let report = BatchDriver::new(stamper)
        .unwrap()
        .process(input.path(), output.path())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(sorted_names(output.path()), vec!["shot.png"]);
    let data = std::fs::read(output.path().join("shot.png")).unwrap();
    assert_eq!(&data[..4], &[0x89, b'P', b'N', b'G']);
}

#[tokio::test]
async fn test_batch_empty_directory() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    let report = BatchDriver::new(stamper)
        .unwrap()
        .process(input.path(), output.path())
        .await
        .unwrap();

    assert_eq!(report.found, 0);
    assert!(report.results.is_empty());
    assert!(report.is_success());
}

#[tokio::test]
async fn test_batch_missing_input_directory_is_error() {
    let Some(stamper) = stamper(utc_config()) else {
        return;
    };
    let root = tempfile::tempdir().unwrap();

    let err = BatchDriver::new(stamper)
        .unwrap()
        .process(&root.path().join("missing"), &root.path().join("out"))
        .await
        .unwrap_err();

    assert!(matches!(err, StampError::Io { .. }), "{:?}", err);
}
