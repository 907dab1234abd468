//! Dense interleaved pixel buffers
//!
//! [`PixelBuffer`] is the only data type that crosses the boundary of the
//! upscaling core: row-major, origin top-left, `channels` interleaved 8-bit
//! samples per pixel.

use crate::error::UpscaleError;

/// Minimum channel count: luma needs R, G and B.
pub const MIN_CHANNELS: usize = 3;

/// A dense row-major image with interleaved 8-bit channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput`-kind error if a dimension is zero, if there
    /// are fewer than three channels, or if `data.len()` isn't
    /// `width * height * channels`.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, UpscaleError> {
        let expected = validate_layout(width, height, channels)?;
        if data.len() != expected {
            return Err(UpscaleError::SizeMismatch { expected, got: data.len() });
        }
        Ok(Self { width, height, channels, data })
    }

    /// Build a buffer from floating-point samples.
    ///
    /// Every sample must be an integral value in `[0, 255]`.
    pub fn from_f64(
        width: usize,
        height: usize,
        channels: usize,
        samples: &[f64],
    ) -> Result<Self, UpscaleError> {
        let expected = validate_layout(width, height, channels)?;
        if samples.len() != expected {
            return Err(UpscaleError::SizeMismatch { expected, got: samples.len() });
        }

        let mut data = Vec::with_capacity(expected);
        for (index, &value) in samples.iter().enumerate() {
            if !(0.0..=255.0).contains(&value) || value.fract() != 0.0 {
                return Err(UpscaleError::SampleOutOfRange { index, value });
            }
            data.push(value as u8);
        }
        Ok(Self { width, height, channels, data })
    }

    /// Build a buffer where every pixel is `pixel`.
    pub fn filled(width: usize, height: usize, pixel: &[u8]) -> Result<Self, UpscaleError> {
        let expected = validate_layout(width, height, pixel.len())?;
        let data = pixel.iter().copied().cycle().take(expected).collect();
        Ok(Self { width, height, channels: pixel.len(), data })
    }

    /// Allocate a zeroed buffer, reporting allocation failure instead of aborting.
    pub(crate) fn allocate(
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<Self, UpscaleError> {
        let exhausted = || UpscaleError::ResourceExhausted { width, height, channels };
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(exhausted)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| exhausted())?;
        data.resize(len, 0);
        Ok(Self { width, height, channels, data })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Interleaved samples, row-major.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its samples.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels]
    }

    /// Overwrite the pixel at column `x`, row `y`.
    pub fn put_pixel(&mut self, x: usize, y: usize, pixel: &[u8]) {
        let start = self.offset(x, y);
        self.data[start..start + self.channels].copy_from_slice(pixel);
    }

    /// Pixel at a signed coordinate, clamped to the nearest edge.
    pub(crate) fn pixel_clamped(&self, row: isize, col: isize) -> &[u8] {
        let y = row.clamp(0, self.height as isize - 1) as usize;
        let x = col.clamp(0, self.width as isize - 1) as usize;
        self.pixel(x, y)
    }

    /// Samples per row.
    pub(crate) fn row_stride(&self) -> usize {
        self.width * self.channels
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn offset(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        (y * self.width + x) * self.channels
    }
}

/// Check dimensions and return the expected sample count.
fn validate_layout(width: usize, height: usize, channels: usize) -> Result<usize, UpscaleError> {
    if width == 0 || height == 0 {
        return Err(UpscaleError::EmptyImage { width, height });
    }
    if channels < MIN_CHANNELS {
        return Err(UpscaleError::TooFewChannels { channels });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(UpscaleError::ResourceExhausted { width, height, channels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_valid() {
        let buf = PixelBuffer::new(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.pixel(1, 0), &[4, 5, 6]);
    }

    #[test]
    fn test_new_zero_dimension() {
        let err = PixelBuffer::new(0, 4, 3, vec![]).unwrap_err();
        assert_eq!(err, UpscaleError::EmptyImage { width: 0, height: 4 });
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = PixelBuffer::new(4, 0, 3, vec![]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_new_too_few_channels() {
        let err = PixelBuffer::new(1, 1, 2, vec![0, 0]).unwrap_err();
        assert_eq!(err, UpscaleError::TooFewChannels { channels: 2 });
    }

    #[test]
    fn test_new_size_mismatch() {
        let err = PixelBuffer::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert_eq!(err, UpscaleError::SizeMismatch { expected: 12, got: 11 });
    }

    #[test]
    fn test_from_f64_accepts_integral_values() {
        let buf = PixelBuffer::from_f64(1, 1, 4, &[0.0, 128.0, 255.0, 7.0]).unwrap();
        assert_eq!(buf.as_raw(), &[0, 128, 255, 7]);
    }

    #[test]
    fn test_from_f64_rejects_fractional_and_out_of_range() {
        let err = PixelBuffer::from_f64(1, 1, 3, &[0.0, 1.5, 2.0]).unwrap_err();
        assert_eq!(err, UpscaleError::SampleOutOfRange { index: 1, value: 1.5 });

        let err = PixelBuffer::from_f64(1, 1, 3, &[0.0, 1.0, 256.0]).unwrap_err();
        assert!(matches!(err, UpscaleError::SampleOutOfRange { index: 2, .. }));

        let err = PixelBuffer::from_f64(1, 1, 3, &[-1.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, UpscaleError::SampleOutOfRange { index: 0, .. }));

        let err = PixelBuffer::from_f64(1, 1, 3, &[f64::NAN, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, UpscaleError::SampleOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_filled() {
        let buf = PixelBuffer::filled(3, 2, &[10, 20, 30]).unwrap();
        assert_eq!(buf.as_raw().len(), 18);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buf.pixel(x, y), &[10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_allocate_overflow_is_resource_exhausted() {
        let err = PixelBuffer::allocate(usize::MAX, 2, 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }

    #[test]
    fn test_pixel_clamped() {
        let mut buf = PixelBuffer::filled(2, 2, &[0, 0, 0]).unwrap();
        buf.put_pixel(0, 0, &[255, 0, 0]);
        buf.put_pixel(1, 1, &[0, 0, 255]);

        assert_eq!(buf.pixel_clamped(-3, -1), &[255, 0, 0]);
        assert_eq!(buf.pixel_clamped(0, 0), &[255, 0, 0]);
        assert_eq!(buf.pixel_clamped(5, 9), &[0, 0, 255]);
        assert_eq!(buf.pixel_clamped(1, -4), &[0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_pixel_out_of_bounds_panics() {
        let buf = PixelBuffer::filled(2, 2, &[0, 0, 0]).unwrap();
        buf.pixel(2, 0);
    }
}
