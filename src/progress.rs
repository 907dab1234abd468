//! Batch progress reporting.
//!
//! Provides a progress reporting system for batch upscales. Supports
//! console output (with colors) and line-delimited JSON.
//!
//! # Example
//!
//! ```
//! use superxbr::progress::{ConsoleProgress, ImageStatus, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::BatchStarted { total_images: 2 });
//! reporter.report(ProgressEvent::ImageStarted { image: "tiles/grass.png".to_string() });
//! reporter.report(ProgressEvent::ImageCompleted {
//!     image: "tiles/grass.png".to_string(),
//!     status: ImageStatus::Success,
//!     duration_ms: 12,
//! });
//! ```

use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Outcome of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Upscaled and saved
    Success,
    /// Not processed (output exists, or the batch stopped early)
    Skipped,
    /// Upscale failed
    Failed(String),
}

impl ImageStatus {
    /// Whether this status is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, ImageStatus::Failed(_))
    }
}

impl std::fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageStatus::Success => write!(f, "success"),
            ImageStatus::Skipped => write!(f, "skipped"),
            ImageStatus::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Events that can be reported during a batch.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Batch started
    BatchStarted {
        /// Number of images to process
        total_images: usize,
    },
    /// An image started processing
    ImageStarted {
        /// Input path as displayed to the user
        image: String,
    },
    /// An image finished
    ImageCompleted {
        /// Input path as displayed to the user
        image: String,
        /// Outcome
        status: ImageStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// Batch finished
    BatchCompleted {
        /// Whether no image failed
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
        /// Number of upscaled images
        succeeded: usize,
        /// Number of skipped images
        skipped: usize,
        /// Number of failed images
        failed: usize,
    },
    /// A warning was generated
    Warning {
        /// Image that generated the warning (if applicable)
        image: Option<String>,
        /// Warning message
        message: String,
    },
    /// An error occurred
    Error {
        /// Image that generated the error (if applicable)
        image: Option<String>,
        /// Error message
        message: String,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    verbose: bool,
    current: AtomicUsize,
    started: AtomicUsize,
    total: AtomicUsize,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("current", &self.current)
            .field("started", &self.started)
            .field("total", &self.total)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a console reporter on stderr. Colors are on when stderr is a
    /// terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            current: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            verbose: false,
            current: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn bold(&self, text: &str) -> String {
        self.color(text, "\x1b[1m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { total_images } => {
                self.total.store(total_images, Ordering::SeqCst);
                self.current.store(0, Ordering::SeqCst);
                self.started.store(0, Ordering::SeqCst);
                if total_images > 0 {
                    self.writeln(&format!(
                        "{} Upscaling {} image{}...",
                        self.cyan("[xbr]"),
                        total_images,
                        if total_images == 1 { "" } else { "s" }
                    ));
                }
            }
            ProgressEvent::ImageStarted { image } => {
                if self.verbose {
                    let started = self.started.fetch_add(1, Ordering::SeqCst) + 1;
                    let total = self.total.load(Ordering::SeqCst);
                    self.writeln(&format!(
                        "{} [{}/{}] Upscaling {}...",
                        self.cyan("[xbr]"),
                        started,
                        total,
                        image
                    ));
                }
            }
            ProgressEvent::ImageCompleted { image, status, duration_ms } => {
                let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
                let total = self.total.load(Ordering::SeqCst);

                let status_str = match &status {
                    ImageStatus::Success => self.green("ok"),
                    ImageStatus::Skipped => self.yellow("skipped"),
                    ImageStatus::Failed(_) => self.red("FAILED"),
                };

                self.writeln(&format!(
                    "{} [{}/{}] {} {} ({})",
                    self.cyan("[xbr]"),
                    current,
                    total,
                    status_str,
                    image,
                    format_duration(duration_ms)
                ));

                if let ImageStatus::Failed(err) = status {
                    self.writeln(&format!("        {}", self.red(&err)));
                }
            }
            ProgressEvent::BatchCompleted { success, duration_ms, succeeded, skipped, failed } => {
                let duration_str = format_duration(duration_ms);

                if success {
                    self.writeln(&format!(
                        "\n{} {} {} upscaled, {} skipped in {}",
                        self.green("[done]"),
                        self.bold(&succeeded.to_string()),
                        if succeeded == 1 { "image" } else { "images" },
                        skipped,
                        duration_str
                    ));
                } else {
                    self.writeln(&format!(
                        "\n{} Batch failed: {} succeeded, {} skipped, {} {} in {}",
                        self.red("[error]"),
                        succeeded,
                        skipped,
                        failed,
                        if failed == 1 { "failure" } else { "failures" },
                        duration_str
                    ));
                }
            }
            ProgressEvent::Warning { image, message } => {
                let prefix = image.map(|id| format!("{}: ", id)).unwrap_or_default();
                self.writeln(&format!("{} {}{}", self.yellow("[warn]"), prefix, message));
            }
            ProgressEvent::Error { image, message } => {
                let prefix = image.map(|id| format!("{}: ", id)).unwrap_or_default();
                self.writeln(&format!("{} {}{}", self.red("[error]"), prefix, message));
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// One JSON line per event.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    BatchStarted {
        total_images: usize,
    },
    ImageStarted {
        image: &'a str,
    },
    ImageCompleted {
        image: &'a str,
        status: &'static str,
        duration_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a str>,
    },
    BatchCompleted {
        success: bool,
        duration_ms: u64,
        succeeded: usize,
        skipped: usize,
        failed: usize,
    },
    Warning {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<&'a str>,
    },
    Error {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<&'a str>,
    },
}

impl<'a> From<&'a ProgressEvent> for JsonEvent<'a> {
    fn from(event: &'a ProgressEvent) -> Self {
        match event {
            ProgressEvent::BatchStarted { total_images } => {
                JsonEvent::BatchStarted { total_images: *total_images }
            }
            ProgressEvent::ImageStarted { image } => JsonEvent::ImageStarted { image },
            ProgressEvent::ImageCompleted { image, status, duration_ms } => {
                let (status, error) = match status {
                    ImageStatus::Success => ("success", None),
                    ImageStatus::Skipped => ("skipped", None),
                    ImageStatus::Failed(e) => ("failed", Some(e.as_str())),
                };
                JsonEvent::ImageCompleted { image, status, duration_ms: *duration_ms, error }
            }
            ProgressEvent::BatchCompleted { success, duration_ms, succeeded, skipped, failed } => {
                JsonEvent::BatchCompleted {
                    success: *success,
                    duration_ms: *duration_ms,
                    succeeded: *succeeded,
                    skipped: *skipped,
                    failed: *failed,
                }
            }
            ProgressEvent::Warning { image, message } => {
                JsonEvent::Warning { message, image: image.as_deref() }
            }
            ProgressEvent::Error { image, message } => {
                JsonEvent::Error { message, image: image.as_deref() }
            }
        }
    }
}

/// JSON progress reporter for machine-readable output.
pub struct JsonProgress {
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stderr.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stderr())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let json = match serde_json::to_string(&JsonEvent::from(&event)) {
            Ok(json) => json,
            Err(_) => return,
        };
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", json);
        }
    }
}

/// Aggregates per-image outcomes into the batch completion event.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    start_time: Option<Instant>,
    succeeded: usize,
    skipped: usize,
    failed: usize,
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a batch.
    pub fn start(&mut self) {
        *self = Self { start_time: Some(Instant::now()), ..Self::default() };
    }

    /// Record a finished image.
    pub fn image_completed(&mut self, status: &ImageStatus) {
        match status {
            ImageStatus::Success => self.succeeded += 1,
            ImageStatus::Skipped => self.skipped += 1,
            ImageStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Elapsed time since the batch started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Generate a BatchCompleted event from current state.
    pub fn batch_completed_event(&self) -> ProgressEvent {
        ProgressEvent::BatchCompleted {
            success: self.failed == 0,
            duration_ms: self.elapsed().as_millis() as u64,
            succeeded: self.succeeded,
            skipped: self.skipped,
            failed: self.failed,
        }
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
