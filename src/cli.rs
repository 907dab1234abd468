//! Command-line interface implementation

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::batch::{BatchError, BatchJob, BatchOptions};
use crate::config::{load_config, merge_cli_overrides, CliOverrides, ProgressFormat, SuperxbrConfig};
use crate::progress::{ConsoleProgress, JsonProgress, ProgressEvent, ProgressReporter};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Super-xBR 2x upscaler - upscale an image, a directory of images or a glob pattern
#[derive(Debug, Parser)]
#[command(name = "superxbr")]
#[command(about = "Super-xBR 2x upscaler - upscale an image, a directory of images or a glob pattern")]
#[command(version)]
pub struct Cli {
    /// Input image file, directory or glob pattern (quote patterns)
    pub input: PathBuf,

    /// Directory the upscaled images are written to
    pub output_dir: PathBuf,

    /// Path to a superxbr.toml (default: discovered from the working directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of images upscaled concurrently
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Run every pass on the calling thread
    #[arg(long)]
    pub sequential: bool,

    /// Leave images whose output already exists untouched
    #[arg(long)]
    pub skip_existing: bool,

    /// Stop starting new images after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Emit progress as JSON lines on stderr
    #[arg(long)]
    pub json: bool,

    /// Report every image as it starts
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Overrides for the loaded configuration. Flags that are not set leave
    /// the configured value alone.
    pub fn overrides(&self) -> CliOverrides {
        let flag = |set: bool| if set { Some(true) } else { None };
        CliOverrides {
            jobs: self.jobs.map(|j| j as usize),
            sequential: flag(self.sequential),
            skip_existing: flag(self.skip_existing),
            fail_fast: flag(self.fail_fast),
            json: flag(self.json),
            verbose: flag(self.verbose),
            no_color: flag(self.no_color),
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    run_with(Cli::parse())
}

/// Run with already parsed arguments
pub fn run_with(cli: Cli) -> ExitCode {
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    if let Err(e) = merge_cli_overrides(&mut config, &cli.overrides()) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let reporter = create_reporter(&config);
    let options = BatchOptions {
        upscale: config.upscale.options(),
        jobs: config.batch.jobs,
        skip_existing: config.batch.skip_existing,
        fail_fast: config.batch.fail_fast,
    };

    let extensions = &config.batch.extensions;
    let job = match BatchJob::discover(&cli.input, extensions, &cli.output_dir, options) {
        Ok(job) => job,
        Err(e) => {
            reporter.report(ProgressEvent::Error { image: None, message: e.to_string() });
            return ExitCode::from(exit_code_for(&e));
        }
    };

    if job.inputs().is_empty() {
        reporter.report(ProgressEvent::Warning {
            image: None,
            message: format!("No images found in {}", cli.input.display()),
        });
    }

    match job.run(reporter.as_ref()) {
        Ok(result) if result.is_success() => ExitCode::from(EXIT_SUCCESS),
        Ok(_) => ExitCode::from(EXIT_ERROR),
        Err(e) => {
            reporter.report(ProgressEvent::Error { image: None, message: e.to_string() });
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Build the progress reporter selected by the configuration.
fn create_reporter(config: &SuperxbrConfig) -> Box<dyn ProgressReporter> {
    match config.progress.format {
        ProgressFormat::Json => Box::new(JsonProgress::new()),
        ProgressFormat::Console => {
            let colors = config.progress.color && atty::is(atty::Stream::Stderr);
            Box::new(
                ConsoleProgress::new().with_colors(colors).with_verbose(config.progress.verbose),
            )
        }
    }
}

fn exit_code_for(error: &BatchError) -> u8 {
    match error {
        BatchError::Discovery(_) => EXIT_INVALID_ARGS,
        _ => EXIT_ERROR,
    }
}
