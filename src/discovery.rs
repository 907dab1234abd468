//! Input image discovery.
//!
//! Resolves the command-line input argument to a list of image files. The
//! argument may name a single file, a directory (its images, non-recursive)
//! or a glob pattern.

use glob::glob;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions picked up from directories and glob patterns by default.
pub const DEFAULT_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "bmp", "tga", "tif", "tiff", "webp", "gif", "ppm", "pnm", "qoi"];

/// Error during input discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Path is neither a file, a directory nor a pattern that matched
    #[error("Invalid path or directory: {}", .0.display())]
    NotFound(PathBuf),
    /// Invalid glob pattern
    #[error("Invalid glob pattern '{0}': {1}")]
    InvalidPattern(String, glob::PatternError),
    /// IO error during directory enumeration
    #[error("IO error during discovery: {0}")]
    Io(#[from] std::io::Error),
}

/// Images found for an input argument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    /// Matching image files
    pub files: Vec<PathBuf>,
    /// Entries that matched but could not be read
    pub warnings: Vec<String>,
}

impl Discovered {
    fn from_files(files: Vec<PathBuf>) -> Self {
        Self { files, warnings: Vec::new() }
    }
}

/// Collect the images named by `input`.
///
/// - A file is returned as-is, whatever its extension.
/// - A directory yields its regular files with a matching extension.
/// - A string containing `*`, `?` or `[` is expanded as a glob pattern.
///
/// Results from directories and patterns are sorted. Unreadable pattern
/// matches are skipped and listed in [`Discovered::warnings`].
pub fn collect_inputs(input: &Path, extensions: &[String]) -> Result<Discovered, DiscoveryError> {
    if input.is_file() {
        return Ok(Discovered::from_files(vec![input.to_path_buf()]));
    }
    if input.is_dir() {
        return discover_dir(input, extensions).map(Discovered::from_files);
    }

    let pattern = input.to_string_lossy();
    if is_glob_pattern(&pattern) {
        return discover_glob(&pattern, extensions);
    }

    Err(DiscoveryError::NotFound(input.to_path_buf()))
}

/// List images directly inside `dir`.
pub fn discover_dir(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Expand a glob pattern to matching images.
pub fn discover_glob(pattern: &str, extensions: &[String]) -> Result<Discovered, DiscoveryError> {
    let paths =
        glob(pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.to_string(), e))?;

    let found = filter_entries(paths, extensions);
    if found.files.is_empty() {
        return Err(DiscoveryError::NotFound(PathBuf::from(pattern)));
    }
    Ok(found)
}

/// Keep readable image entries, turning unreadable ones into warnings.
fn filter_entries<E: Display>(
    entries: impl IntoIterator<Item = Result<PathBuf, E>>,
    extensions: &[String],
) -> Discovered {
    let mut found = Discovered::default();
    for entry in entries {
        match entry {
            Ok(path) => {
                if path.is_file() && has_extension(&path, extensions) {
                    found.files.push(path);
                }
            }
            Err(e) => found.warnings.push(format!("Skipping unreadable path: {}", e)),
        }
    }
    found.files.sort();
    found
}

/// Case-insensitive extension check.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// [`DEFAULT_EXTENSIONS`] as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}
