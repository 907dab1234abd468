//! Image decoding, encoding and output path generation

use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::error::UpscaleError;

/// Error type for image file operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Decoded pixels rejected by the upscaler
    #[error("Invalid pixel data: {0}")]
    Upscale(#[from] UpscaleError),
    /// Buffer can't be written as an 8-bit RGB or RGBA image
    #[error("Cannot encode {channels}-channel image, expected 3 or 4 channels")]
    UnsupportedLayout { channels: usize },
    /// Dimensions beyond what image files can describe
    #[error("Cannot encode {width}x{height} image, dimensions exceed {}", u32::MAX)]
    TooLarge { width: usize, height: usize },
}

/// Decode an image file into a [`PixelBuffer`].
///
/// Images with an alpha channel become 4-channel RGBA, everything else
/// 3-channel RGB. Grayscale and high bit-depth images are converted to
/// 8-bit color first.
pub fn load_image(path: &Path) -> Result<PixelBuffer, CodecError> {
    let image = image::open(path)?;
    Ok(from_dynamic(image)?)
}

/// Convert a decoded image into a [`PixelBuffer`].
pub fn from_dynamic(image: DynamicImage) -> Result<PixelBuffer, UpscaleError> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if image.color().has_alpha() {
        PixelBuffer::new(width, height, 4, image.into_rgba8().into_raw())
    } else {
        PixelBuffer::new(width, height, 3, image.into_rgb8().into_raw())
    }
}

/// Convert a [`PixelBuffer`] into an encodable image.
pub fn to_dynamic(buffer: &PixelBuffer) -> Result<DynamicImage, CodecError> {
    let (width, height) = encodable_dimensions(buffer.width(), buffer.height())?;
    let raw = buffer.as_raw().to_vec();
    let layout = || CodecError::UnsupportedLayout { channels: buffer.channels() };

    match buffer.channels() {
        3 => ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, raw)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(layout),
        4 => ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, raw)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(layout),
        _ => Err(layout()),
    }
}

/// Dimensions as stored in image headers.
fn encodable_dimensions(width: usize, height: usize) -> Result<(u32, u32), CodecError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(CodecError::TooLarge { width, height }),
    }
}

/// Save a [`PixelBuffer`] to `path`, format chosen by extension.
///
/// Missing parent directories are created.
pub fn save_image(buffer: &PixelBuffer, path: &Path) -> Result<(), CodecError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let image = to_dynamic(buffer)?;
    // JPEG and friends have no alpha channel
    let image = match image {
        DynamicImage::ImageRgba8(_) if !supports_alpha(path) => {
            DynamicImage::ImageRgb8(image.into_rgb8())
        }
        other => other,
    };
    image.save(path)?;
    Ok(())
}

fn supports_alpha(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());
    !matches!(ext.as_deref(), Some("jpg") | Some("jpeg") | Some("bmp") | Some("ppm") | Some("pnm"))
}

/// Output path for an input image: `out_dir/<input file name>`.
///
/// | Input | Output dir | Output |
/// |-------|------------|--------|
/// | `sprites/hero.png` | `big` | `big/hero.png` |
/// | `hero.png` | `big/` | `big/hero.png` |
/// | `sprites/` (no file name) | `big` | `big/output.png` |
pub fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.join("output.png"),
    }
}
