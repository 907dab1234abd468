//! The three sweeps that fill a 2x output buffer.
//!
//! 1. [`corner_pass`] copies each source pixel into three cells of its 2x2
//!    block and interpolates the fourth (bottom-right) from the source.
//! 2. [`diamond_pass`] re-interpolates the top-right and bottom-left cells of
//!    every block from a 45° rotated window over the pass-1 output.
//! 3. [`refine_pass`] walks the whole output backwards and re-interpolates
//!    every cell in place.

use rayon::prelude::*;

use super::edge::WeightVector;
use super::patch::{generate_patch, SampleWindow};
use crate::buffer::PixelBuffer;

/// Per-worker scratch space so no window is shared between threads.
pub(crate) struct Scratch {
    window: SampleWindow,
    blend: Vec<f64>,
    pixel: Vec<u8>,
}

impl Scratch {
    pub(crate) fn new(channels: usize) -> Self {
        Self {
            window: SampleWindow::new(channels),
            blend: vec![0.0; channels],
            pixel: vec![0; channels],
        }
    }

    /// Run the patch generator on the current window, result in `self.pixel`.
    fn patch(&mut self, wp: &WeightVector) {
        generate_patch(self.window.luma(), wp, &self.window, &mut self.blend, &mut self.pixel);
    }
}

/// Pass 1: fill every 2x2 output block from the source image.
///
/// Each block depends only on `src`, so with `parallel` set the output is
/// split into row pairs and filled on the rayon pool. Both paths produce the
/// same bytes.
pub fn corner_pass(src: &PixelBuffer, out: &mut PixelBuffer, parallel: bool) {
    let channels = src.channels();
    let block_rows = 2;

    let stride = out.row_stride() * block_rows;

    if parallel {
        out.raw_mut().par_chunks_mut(stride).enumerate().for_each_init(
            || Scratch::new(channels),
            |scratch, (cy, rows)| fill_block_row(src, cy, rows, scratch),
        );
    } else {
        let mut scratch = Scratch::new(channels);
        for (cy, rows) in out.raw_mut().chunks_mut(stride).enumerate() {
            fill_block_row(src, cy, rows, &mut scratch);
        }
    }
}

/// Fill the two output rows that belong to source row `cy`.
fn fill_block_row(src: &PixelBuffer, cy: usize, rows: &mut [u8], scratch: &mut Scratch) {
    let channels = src.channels();
    let stride = src.width() * 2 * channels;
    let (top, bottom) = rows.split_at_mut(stride);

    for cx in 0..src.width() {
        for sx in -1isize..=2 {
            for sy in -1isize..=2 {
                let sample = src.pixel_clamped(cy as isize + sy, cx as isize + sx);
                scratch.window.set((sx + 1) as usize, (sy + 1) as usize, sample);
            }
        }

        let center = src.pixel(cx, cy);
        let left = 2 * cx * channels;
        let right = left + channels;
        top[left..right].copy_from_slice(center);
        top[right..right + channels].copy_from_slice(center);
        bottom[left..right].copy_from_slice(center);

        scratch.patch(&WeightVector::CORNER);
        bottom[right..right + channels].copy_from_slice(&scratch.pixel);
    }
}

/// Pass 2: interpolate the off-diagonal cells of every block.
///
/// Runs in ascending raster order. Away from the borders the rotated window
/// only touches cells written by pass 1, but edge clamping can fold it onto
/// cells this pass already rewrote, so the order is kept.
pub fn diamond_pass(out: &mut PixelBuffer) {
    let mut scratch = Scratch::new(out.channels());
    let (width, height) = out.dimensions();

    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(2) {
            gather_diamond(out, &mut scratch, y as isize, x as isize);
            scratch.patch(&WeightVector::DIAMOND);
            out.put_pixel(x + 1, y, &scratch.pixel);

            gather_diamond(out, &mut scratch, y as isize + 1, x as isize - 1);
            scratch.patch(&WeightVector::DIAMOND);
            out.put_pixel(x, y + 1, &scratch.pixel);
        }
    }
}

/// Sample a diamond (45° rotated square) whose cell `[sx][sy]` sits at
/// row `sx - sy + row`, column `sx + sy + col`.
fn gather_diamond(buf: &PixelBuffer, scratch: &mut Scratch, row: isize, col: isize) {
    for sx in -1isize..=2 {
        for sy in -1isize..=2 {
            let sample = buf.pixel_clamped(sx - sy + row, sx + sy + col);
            scratch.window.set((sx + 1) as usize, (sy + 1) as usize, sample);
        }
    }
}

/// Pass 3: re-interpolate every cell from its up-left biased neighbourhood.
///
/// Coordinates are visited from the last row to the first and, within a row,
/// from the last column to the first. Cells already rewritten by this pass
/// feed the windows of cells visited later, so the visiting order determines
/// the output and must not change.
pub fn refine_pass(out: &mut PixelBuffer) {
    let mut scratch = Scratch::new(out.channels());
    let (width, height) = out.dimensions();

    for y in (0..height).rev() {
        for x in (0..width).rev() {
            for sx in -2isize..=1 {
                for sy in -2isize..=1 {
                    let sample = out.pixel_clamped(y as isize + sy, x as isize + sx);
                    scratch.window.set((sx + 2) as usize, (sy + 2) as usize, sample);
                }
            }
            scratch.patch(&WeightVector::CORNER);
            out.put_pixel(x, y, &scratch.pixel);
        }
    }
}
