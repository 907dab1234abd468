//! superxbr - Super-xBR edge-directed 2x image upscaling
//!
//! This library provides functionality to:
//! - Upscale in-memory pixel buffers with the Super-xBR algorithm
//! - Decode and encode images to and from those buffers
//! - Upscale whole directories of images with progress reporting

pub mod batch;
pub mod buffer;
pub mod cli;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod progress;
pub mod xbr;

pub use buffer::PixelBuffer;
pub use error::{ErrorKind, UpscaleError};
pub use xbr::{super_xbr, UpscaleOptions, Upscaler};

/// Upscale raw interleaved 8-bit samples.
///
/// Validates the layout, then runs the full pipeline with default options.
///
/// # Example
///
/// ```
/// let out = superxbr::upscale_raw(1, 1, 3, &[10, 20, 30]).unwrap();
/// assert_eq!(out.dimensions(), (2, 2));
///
/// let err = superxbr::upscale_raw(0, 1, 3, &[]).unwrap_err();
/// assert_eq!(err.kind(), superxbr::ErrorKind::InvalidInput);
/// ```
pub fn upscale_raw(
    width: usize,
    height: usize,
    channels: usize,
    data: &[u8],
) -> Result<PixelBuffer, UpscaleError> {
    let src = PixelBuffer::new(width, height, channels, data.to_vec())?;
    super_xbr(&src)
}
