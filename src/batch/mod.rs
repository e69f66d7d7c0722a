//! Batch driver.
//!
//! Applies the [`Stamper`] to every image file in a directory, in the
//! directory's native listing order, writing results under the same file
//! names into an output directory.
//!
//! A single file's failure is recorded in the [`BatchReport`] and, under the
//! default [`ErrorPolicy::Continue`], does not stop the remaining files.

use crate::config::{ErrorPolicy, ExtensionPolicy};
use crate::error::StampError;
use crate::stamp::{OutputFormat, StampOutcome, Stamper};
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Case-insensitive filename extension matcher.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    pattern: Regex,
}

impl ExtensionFilter {
    pub fn new(extensions: &[String]) -> Result<Self, StampError> {
        if extensions.is_empty() {
            return Err(StampError::Config(
                "at least one image extension is required".to_string(),
            ));
        }

        let alternatives: Vec<String> = extensions.iter().map(|e| regex::escape(e)).collect();
        let pattern = Regex::new(&format!(r"(?i)\.({})$", alternatives.join("|")))
            .map_err(|e| StampError::Config(format!("invalid extension list: {}", e)))?;

        Ok(Self { pattern })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern.is_match(file_name)
    }
}

/// Outcome for a single file of a batch.
#[derive(Debug)]
pub enum FileStatus {
    Stamped(StampOutcome),
    Failed(StampError),
}

#[derive(Debug)]
pub struct FileResult {
    pub file_name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub status: FileStatus,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FileStatus::Stamped(_))
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of matching image files found
    pub found: usize,
    /// One entry per attempted file, in processing order
    pub results: Vec<FileResult>,
    /// True when [`ErrorPolicy::Abort`] stopped the run early
    pub aborted: bool,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.processed()
    }

    /// Files never attempted because the run aborted.
    pub fn skipped(&self) -> usize {
        self.found - self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&FileResult, &StampError)> + '_ {
        self.results.iter().filter_map(|r| match &r.status {
            FileStatus::Failed(e) => Some((r, e)),
            FileStatus::Stamped(_) => None,
        })
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && self.failed() == 0
    }
}

/// List regular files in `dir` whose names pass `filter`, in listing order.
pub async fn list_image_files(
    dir: &Path,
    filter: &ExtensionFilter,
) -> Result<Vec<OsString>, StampError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StampError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StampError::io(dir, e))?
    {
        let name = entry.file_name();
        if !filter.matches(&name.to_string_lossy()) {
            continue;
        }

        // Follows symlinks so linked images are included
        match tokio::fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => files.push(name),
            Ok(_) => {
                tracing::debug!(entry = %entry.path().display(), "Skipping non-file entry");
            }
            Err(e) => {
                tracing::warn!(entry = %entry.path().display(), error = %e, "Skipping unreadable entry");
            }
        }
    }

    Ok(files)
}

/// Output path for one batch file.
pub fn batch_output_path(
    output_dir: &Path,
    file_name: &OsString,
    policy: ExtensionPolicy,
    format: OutputFormat,
) -> PathBuf {
    let path = output_dir.join(file_name);
    match policy {
        ExtensionPolicy::Preserve => path,
        ExtensionPolicy::MatchFormat => path.with_extension(format.extension()),
    }
}

/// Runs the stamper over whole directories.
#[derive(Debug, Clone)]
pub struct BatchDriver {
    stamper: Stamper,
    filter: ExtensionFilter,
    policy: ErrorPolicy,
}

impl BatchDriver {
    pub fn new(stamper: Stamper) -> Result<Self, StampError> {
        let filter = ExtensionFilter::new(&stamper.config().batch.extensions)?;
        let policy = stamper.config().batch.on_error;
        Ok(Self {
            stamper,
            filter,
            policy,
        })
    }

    /// Override the configured error policy.
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Stamp every matching file of `input_dir` into `output_dir`.
    ///
    /// `output_dir` and any missing ancestors are created first. Failing to
    /// create it or to list `input_dir` is returned as an error; per-file
    /// failures are reported in the [`BatchReport`].
    pub async fn process(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchReport, StampError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| StampError::io(output_dir, e))?;

        let files = list_image_files(input_dir, &self.filter).await?;
        tracing::info!(
            input_dir = %input_dir.display(),
            count = files.len(),
            "Found image files to process"
        );

        let output_config = &self.stamper.config().output;
        let extension_policy = self.stamper.config().batch.output_extension;

        let mut report = BatchReport {
            found: files.len(),
            ..BatchReport::default()
        };

        for file_name in &files {
            let input = input_dir.join(file_name);
            let output =
                batch_output_path(output_dir, file_name, extension_policy, output_config.format);
            let display_name = file_name.to_string_lossy().into_owned();

            tracing::info!(file = %display_name, "Processing");

            let status = match self.stamper.stamp(&input, &output).await {
                Ok(outcome) => FileStatus::Stamped(outcome),
                Err(e) => {
                    tracing::error!(
                        file = %display_name,
                        kind = e.kind(),
                        error = %e,
                        "Failed to stamp image"
                    );
                    FileStatus::Failed(e)
                }
            };

            let failed = !matches!(status, FileStatus::Stamped(_));
            report.results.push(FileResult {
                file_name: display_name,
                input,
                output,
                status,
            });

            if failed && self.policy == ErrorPolicy::Abort {
                report.aborted = true;
                tracing::warn!(
                    remaining = report.skipped(),
                    "Aborting batch after failure"
                );
                break;
            }
        }

        tracing::info!(
            found = report.found,
            processed = report.processed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Batch processing complete"
        );

        Ok(report)
    }
}
