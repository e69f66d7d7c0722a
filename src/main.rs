use anyhow::Context;
use clap::Parser;
use photostamp::batch::{BatchDriver, FileStatus};
use photostamp::config::{ErrorPolicy, StampConfig, TimestampZone};
use photostamp::logging::{init_subscriber, LogFormat};
use photostamp::stamp::{default_output_path, Stamper};
use photostamp::StampError;
use std::path::PathBuf;
use std::process::ExitCode;

/// Photostamp - stamp an image's modification time onto the image
#[derive(Parser, Debug)]
#[command(name = "photostamp")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:\n  photostamp photo.jpg photo_with_time.jpg\n  photostamp --batch ./photos ./photos_with_timestamps")]
struct Args {
    /// Process every image in INPUT (a directory) into OUTPUT (a directory)
    #[arg(long)]
    batch: bool,

    /// Input image, or input directory with --batch
    input: PathBuf,

    /// Output image (default: timestamped_<name> beside the input), or
    /// output directory with --batch
    output: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop a batch at the first failing image
    #[arg(long)]
    fail_fast: bool,

    /// Render timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_subscriber(args.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<StampError>() {
                Some(StampError::Usage(_)) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
    }
}

fn load_config(args: &Args) -> anyhow::Result<StampConfig> {
    let mut config = match &args.config {
        Some(path) => StampConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => StampConfig::default(),
    };

    if args.utc {
        config.timestamp.timezone = TimestampZone::Utc;
    }
    if args.fail_fast {
        config.batch.on_error = ErrorPolicy::Abort;
    }

    Ok(config)
}

/// Returns `Ok(false)` when the run completed but some image failed.
async fn run(args: Args) -> anyhow::Result<bool> {
    let config = load_config(&args)?;

    if args.batch {
        let Some(output_dir) = args.output.as_deref() else {
            return Err(StampError::Usage(
                "batch mode requires input and output directories".to_string(),
            )
            .into());
        };

        let stamper = Stamper::new(config)?;
        let driver = BatchDriver::new(stamper)?;
        let report = driver.process(&args.input, output_dir).await?;

        for result in &report.results {
            if let FileStatus::Failed(e) = &result.status {
                eprintln!("Failed: {}: {}", result.file_name, e);
            }
        }
        println!(
            "Batch processing complete: {} found, {} processed, {} failed, {} skipped",
            report.found,
            report.processed(),
            report.failed(),
            report.skipped()
        );

        return Ok(report.is_success());
    }

    let stamper = Stamper::new(config)?;
    let output = match args.output {
        Some(path) => path,
        None => {
            let output_config = &stamper.config().output;
            default_output_path(&args.input, output_config.location, &output_config.prefix)?
        }
    };

    let outcome = stamper.stamp(&args.input, &output).await?;
    println!("Added timestamp to image: {}", outcome.output.display());
    println!("Modified time: {}", outcome.timestamp);

    Ok(true)
}
