//! Error types for the upscaling core

use thiserror::Error;

/// Broad classification of an [`UpscaleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a buffer the algorithm cannot process
    InvalidInput,
    /// The output buffer could not be allocated
    ResourceExhausted,
}

/// Error returned by the upscaling core.
///
/// The pipeline is all-or-nothing: when an error is returned no partial
/// output buffer exists.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum UpscaleError {
    /// Width or height is zero
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },
    /// Fewer than three channels, so luma cannot be derived
    #[error("at least 3 channels are required, got {channels}")]
    TooFewChannels { channels: usize },
    /// Sample count doesn't match width * height * channels
    #[error("buffer size mismatch: expected {expected} samples, got {got}")]
    SizeMismatch { expected: usize, got: usize },
    /// A floating-point sample is not an integer in [0, 255]
    #[error("sample {index} has value {value}, expected an integer in [0, 255]")]
    SampleOutOfRange { index: usize, value: f64 },
    /// Output allocation failed or its size overflows
    #[error("cannot allocate output buffer of {width}x{height}x{channels}")]
    ResourceExhausted { width: usize, height: usize, channels: usize },
}

impl UpscaleError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpscaleError::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            _ => ErrorKind::InvalidInput,
        }
    }
}
