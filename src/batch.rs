//! Batch upscaling of image files.
//!
//! A [`BatchJob`] upscales a list of images into an output directory,
//! reporting each image through a [`ProgressReporter`]. With more than one
//! job the images are spread over a dedicated rayon pool; results always
//! come back in input order.
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use superxbr::batch::{BatchJob, BatchOptions};
//! use superxbr::progress::ConsoleProgress;
//!
//! let inputs = vec![PathBuf::from("tiles/grass.png")];
//! let job = BatchJob::new(inputs, Path::new("big"), BatchOptions::default());
//! let result = job.run(&ConsoleProgress::new())?;
//! println!("{} upscaled", result.succeeded());
//! # Ok::<(), superxbr::batch::BatchError>(())
//! ```

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::discovery::{self, DiscoveryError};
use crate::progress::{ImageStatus, ProgressEvent, ProgressReporter, ProgressTracker};
use crate::xbr::{UpscaleOptions, Upscaler};

/// Error that aborts a whole batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// Input discovery failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// Output directory could not be created
    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    /// Worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Options for a [`BatchJob`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Options passed to every upscale
    pub upscale: UpscaleOptions,
    /// Images processed concurrently
    pub jobs: usize,
    /// Skip images whose output file already exists
    pub skip_existing: bool,
    /// Stop starting new images after the first failure
    pub fail_fast: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { upscale: UpscaleOptions::default(), jobs: 1, skip_existing: false, fail_fast: false }
    }
}

/// Outcome of one image in a batch.
#[derive(Debug, Clone)]
pub struct ImageResult {
    /// Input file
    pub input: PathBuf,
    /// Output file (written only on success)
    pub output: PathBuf,
    /// Outcome
    pub status: ImageStatus,
    /// Time spent on this image
    pub duration: Duration,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Per-image results in input order
    pub images: Vec<ImageResult>,
    /// Wall-clock duration of the batch
    pub total_duration: Duration,
}

impl BatchResult {
    /// Number of upscaled images.
    pub fn succeeded(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Success))
    }

    /// Number of skipped images.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, ImageStatus::Skipped))
    }

    /// Number of failed images.
    pub fn failed(&self) -> usize {
        self.count(ImageStatus::is_failure)
    }

    /// True if no image failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&ImageStatus) -> bool) -> usize {
        self.images.iter().filter(|r| pred(&r.status)).count()
    }
}

/// A set of images to upscale into one output directory.
#[derive(Debug, Clone)]
pub struct BatchJob {
    inputs: Vec<PathBuf>,
    out_dir: PathBuf,
    options: BatchOptions,
    warnings: Vec<String>,
}

impl BatchJob {
    /// Create a job for explicit input files.
    pub fn new(inputs: Vec<PathBuf>, out_dir: &Path, options: BatchOptions) -> Self {
        Self { inputs, out_dir: out_dir.to_path_buf(), options, warnings: Vec::new() }
    }

    /// Create a job from a file, directory or glob pattern.
    pub fn discover(
        input: &Path,
        extensions: &[String],
        out_dir: &Path,
        options: BatchOptions,
    ) -> Result<Self, BatchError> {
        let found = discovery::collect_inputs(input, extensions)?;
        Ok(Self { warnings: found.warnings, ..Self::new(found.files, out_dir, options) })
    }

    /// Input files of this job.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Problems hit while discovering the inputs, reported when the batch runs.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Output directory of this job.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run the batch.
    ///
    /// Per-image failures are recorded in the result; only problems that
    /// prevent the batch from running at all are returned as errors.
    ///
    /// Inputs that map to the same output file are written one after the
    /// other in input order, so the last of them wins.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<BatchResult, BatchError> {
        let mut tracker = ProgressTracker::new();
        tracker.start();

        std::fs::create_dir_all(&self.out_dir)?;
        reporter.report(ProgressEvent::BatchStarted { total_images: self.inputs.len() });

        for message in &self.warnings {
            reporter.report(ProgressEvent::Warning { image: None, message: message.clone() });
        }

        let shared = self.shared_outputs();
        for (output, count) in &shared {
            reporter.report(ProgressEvent::Warning {
                image: None,
                message: format!(
                    "{} inputs write to {}, the last one in input order wins",
                    count,
                    output.display()
                ),
            });
        }

        let upscaler = Upscaler::with_options(self.options.upscale);
        let failed = AtomicBool::new(false);
        let process = |input: &PathBuf| self.process(input, &upscaler, &failed, reporter);

        let images: Vec<ImageResult> = if self.options.jobs <= 1 || self.inputs.len() <= 1 {
            self.inputs.iter().map(process).collect()
        } else {
            let is_shared =
                |input: &PathBuf| shared.contains_key(&codec::output_path(input, &self.out_dir));
            let pool = rayon::ThreadPoolBuilder::new().num_threads(self.options.jobs).build()?;
            let mut slots: Vec<Option<ImageResult>> = pool.install(|| {
                self.inputs
                    .par_iter()
                    .map(|input| if is_shared(input) { None } else { Some(process(input)) })
                    .collect()
            });
            for (slot, input) in slots.iter_mut().zip(&self.inputs) {
                if slot.is_none() {
                    *slot = Some(process(input));
                }
            }
            slots.into_iter().flatten().collect()
        };

        for image in &images {
            tracker.image_completed(&image.status);
        }
        reporter.report(tracker.batch_completed_event());
        Ok(BatchResult { images, total_duration: tracker.elapsed() })
    }

    /// Output files written by more than one input, with the input count.
    fn shared_outputs(&self) -> BTreeMap<PathBuf, usize> {
        let mut counts: BTreeMap<PathBuf, usize> = BTreeMap::new();
        for input in &self.inputs {
            *counts.entry(codec::output_path(input, &self.out_dir)).or_default() += 1;
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    fn process(
        &self,
        input: &Path,
        upscaler: &Upscaler,
        failed: &AtomicBool,
        reporter: &dyn ProgressReporter,
    ) -> ImageResult {
        let start = Instant::now();
        let output = codec::output_path(input, &self.out_dir);
        let name = input.display().to_string();

        let status = if self.options.fail_fast && failed.load(Ordering::SeqCst) {
            ImageStatus::Skipped
        } else if self.options.skip_existing && output.exists() {
            ImageStatus::Skipped
        } else {
            reporter.report(ProgressEvent::ImageStarted { image: name.clone() });
            match upscale_file(input, &output, upscaler) {
                Ok(()) => ImageStatus::Success,
                Err(e) => {
                    failed.store(true, Ordering::SeqCst);
                    ImageStatus::Failed(e.to_string())
                }
            }
        };

        let duration = start.elapsed();
        reporter.report(ProgressEvent::ImageCompleted {
            image: name,
            status: status.clone(),
            duration_ms: duration.as_millis() as u64,
        });

        ImageResult { input: input.to_path_buf(), output, status, duration }
    }
}

/// Load, upscale and save a single image.
pub fn upscale_file(input: &Path, output: &Path, upscaler: &Upscaler) -> Result<(), CodecError> {
    let src = codec::load_image(input)?;
    let out = upscaler.upscale(&src)?;
    codec::save_image(&out, output)
}
