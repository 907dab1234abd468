//! Super-xBR 2x upscaling.
//!
//! Super-xBR estimates, for every output sample, which of the two diagonals
//! better explains the surrounding luma, blends four samples along that
//! diagonal, and clamps the blend into the local min/max so edges don't ring.
//!
//! # Module Structure
//!
//! - [`edge`] - Luma windows, weight vectors and the diagonal edge metric
//! - [`patch`] - Sample windows and the anti-ringed patch generator
//! - [`passes`] - The three sweeps over the output buffer
//!
//! # Example
//!
//! ```
//! use superxbr::{PixelBuffer, Upscaler};
//!
//! let src = PixelBuffer::filled(2, 2, &[10, 20, 30]).unwrap();
//! let out = Upscaler::new().upscale(&src).unwrap();
//!
//! assert_eq!(out.dimensions(), (4, 4));
//! assert!(out.as_raw().chunks(3).all(|px| px == [10, 20, 30]));
//! ```

pub mod edge;
pub mod passes;
pub mod patch;

pub use edge::{diagonal_edge, LumaWindow, Orientation, WeightVector};
pub use patch::{generate_patch, interpolate, SampleWindow};

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::UpscaleError;

/// Linear scale produced by one upscale.
pub const SCALE_FACTOR: usize = 2;

/// First edge-strength tuning constant.
pub const WGT1: f64 = 0.129633;
/// Second edge-strength tuning constant.
pub const WGT2: f64 = 0.175068;

/// Outer blend coefficient.
pub const W1: f64 = -WGT1;
/// Inner blend coefficient.
pub const W2: f64 = WGT1 + 0.5;
/// Outer coefficient of the second edge strength. Not used by the blend.
pub const W3: f64 = -WGT2;
/// Inner coefficient of the second edge strength. Not used by the blend.
pub const W4: f64 = WGT2 + 0.5;

/// Options for an [`Upscaler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpscaleOptions {
    /// Run the corner pass on the rayon pool. The other passes are always
    /// sequential. Output is identical either way.
    #[serde(default)]
    pub parallel: bool,
}

/// Doubles the width and height of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Upscaler {
    options: UpscaleOptions,
}

impl Upscaler {
    /// Create an upscaler with default (sequential) options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an upscaler from explicit options.
    pub fn with_options(options: UpscaleOptions) -> Self {
        Self { options }
    }

    /// Enable or disable the parallel corner pass.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    /// Current options.
    pub fn options(&self) -> &UpscaleOptions {
        &self.options
    }

    /// Upscale `src` to `2 * width` x `2 * height`.
    ///
    /// # Errors
    ///
    /// Returns [`UpscaleError::ResourceExhausted`] if the output buffer
    /// cannot be allocated.
    pub fn upscale(&self, src: &PixelBuffer) -> Result<PixelBuffer, UpscaleError> {
        let (out_width, out_height) = output_dimensions(src.width(), src.height(), src.channels())?;
        let mut out = PixelBuffer::allocate(out_width, out_height, src.channels())?;
        passes::corner_pass(src, &mut out, self.options.parallel);
        passes::diamond_pass(&mut out);
        passes::refine_pass(&mut out);
        Ok(out)
    }
}

/// Doubled dimensions of a `width` x `height` source.
///
/// An overflowing side is reported saturated, so the error always names the
/// output size like [`PixelBuffer::allocate`] does.
fn output_dimensions(
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(usize, usize), UpscaleError> {
    match (width.checked_mul(SCALE_FACTOR), height.checked_mul(SCALE_FACTOR)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(UpscaleError::ResourceExhausted {
            width: width.saturating_mul(SCALE_FACTOR),
            height: height.saturating_mul(SCALE_FACTOR),
            channels,
        }),
    }
}

/// Upscale `src` with default options.
pub fn super_xbr(src: &PixelBuffer) -> Result<PixelBuffer, UpscaleError> {
    Upscaler::new().upscale(src)
}
