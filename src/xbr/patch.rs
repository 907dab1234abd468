//! Patch generation: orientation-aware blend plus anti-ringing.

use super::edge::{diagonal_edge, luma, LumaWindow, Orientation, WeightVector};
use super::{W1, W2};

/// 4x4 neighbourhood of color samples with any channel count.
///
/// Cells are indexed `[i][j]` where `i` follows the horizontal sampling
/// offset and `j` the vertical one. The edge metric and the blend are both
/// invariant under transposition, so the choice only has to be consistent
/// between a window and its [`LumaWindow`].
#[derive(Debug, Clone)]
pub struct SampleWindow {
    channels: usize,
    samples: Vec<f64>,
    luma: LumaWindow,
}

impl SampleWindow {
    /// Create an empty window for `channels`-channel samples.
    pub fn new(channels: usize) -> Self {
        Self { channels, samples: vec![0.0; 16 * channels], luma: LumaWindow::default() }
    }

    /// Channel count of the samples.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Store `pixel` at cell `[i][j]` and record its luma.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, pixel: &[u8]) {
        let start = (i * 4 + j) * self.channels;
        for (dst, &src) in self.samples[start..start + self.channels].iter_mut().zip(pixel) {
            *dst = src as f64;
        }
        self.luma.0[i][j] = luma(pixel);
    }

    /// Samples of cell `[i][j]`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> &[f64] {
        let start = (i * 4 + j) * self.channels;
        &self.samples[start..start + self.channels]
    }

    /// Luma of every cell, in the same layout.
    pub fn luma(&self) -> &LumaWindow {
        &self.luma
    }

    /// `(min, max)` of channel `c` over all 16 cells.
    pub fn channel_range(&self, c: usize) -> (f64, f64) {
        self.samples.iter().skip(c).step_by(self.channels).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        )
    }
}

/// Interpolate one sample without rounding.
///
/// Writes the blended value of each channel into `out`, already clamped into
/// the channel's range over `window`. Returns the orientation that was used.
pub fn interpolate(
    luma: &LumaWindow,
    wp: &WeightVector,
    window: &SampleWindow,
    out: &mut [f64],
) -> Orientation {
    let orientation = Orientation::from_edge(diagonal_edge(luma, wp));
    let ((a, b), (c, d)) = match orientation {
        Orientation::AntiDiagonal => (((0, 3), (3, 0)), ((1, 2), (2, 1))),
        Orientation::MainDiagonal => (((0, 0), (3, 3)), ((1, 1), (2, 2))),
    };

    let (outer_a, outer_b) = (window.get(a.0, a.1), window.get(b.0, b.1));
    let (inner_a, inner_b) = (window.get(c.0, c.1), window.get(d.0, d.1));

    for (ch, value) in out.iter_mut().enumerate().take(window.channels()) {
        let patch = W1 * (outer_a[ch] + outer_b[ch]) + W2 * (inner_a[ch] + inner_b[ch]);
        let (low, high) = window.channel_range(ch);
        *value = patch.clamp(low, high);
    }
    orientation
}

/// Generate one output pixel from a window.
///
/// The anti-ringed blend is rounded up and clamped into `[0, 255]`.
pub fn generate_patch(
    luma: &LumaWindow,
    wp: &WeightVector,
    window: &SampleWindow,
    scratch: &mut [f64],
    out: &mut [u8],
) {
    interpolate(luma, wp, window, scratch);
    for (dst, &value) in out.iter_mut().zip(scratch.iter()) {
        *dst = value.ceil().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_from_fn(channels: usize, f: impl Fn(usize, usize) -> Vec<u8>) -> SampleWindow {
        let mut window = SampleWindow::new(channels);
        for i in 0..4 {
            for j in 0..4 {
                window.set(i, j, &f(i, j));
            }
        }
        window
    }

    fn patch_of(window: &SampleWindow, wp: &WeightVector) -> Vec<u8> {
        let mut scratch = vec![0.0; window.channels()];
        let mut out = vec![0u8; window.channels()];
        generate_patch(window.luma(), wp, window, &mut scratch, &mut out);
        out
    }

    /// Small deterministic generator for window contents.
    struct Lcg(u64);

    impl Lcg {
        fn next_u8(&mut self) -> u8 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 56) as u8
        }
    }

    #[test]
    fn test_window_set_get_and_luma() {
        let mut window = SampleWindow::new(4);
        window.set(2, 1, &[10, 20, 30, 40]);
        assert_eq!(window.get(2, 1), &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(window.get(1, 2), &[0.0, 0.0, 0.0, 0.0]);
        assert!((window.luma().0[2][1] - luma(&[10, 20, 30])).abs() < 1e-12);
    }

    #[test]
    fn test_channel_range() {
        let window = window_from_fn(3, |i, j| vec![(i * 4 + j) as u8, 7, 255 - i as u8]);
        assert_eq!(window.channel_range(0), (0.0, 15.0));
        assert_eq!(window.channel_range(1), (7.0, 7.0));
        assert_eq!(window.channel_range(2), (252.0, 255.0));
    }

    #[test]
    fn test_uniform_window_is_fixpoint() {
        let window = window_from_fn(3, |_, _| vec![10, 20, 30]);
        assert_eq!(patch_of(&window, &WeightVector::CORNER), vec![10, 20, 30]);
        assert_eq!(patch_of(&window, &WeightVector::DIAMOND), vec![10, 20, 30]);
    }

    #[test]
    fn test_main_diagonal_band_selects_main_corners() {
        let window = window_from_fn(3, |i, j| if i == j { vec![200; 3] } else { vec![0; 3] });
        let mut scratch = [0.0; 3];
        let orientation =
            interpolate(window.luma(), &WeightVector::CORNER, &window, &mut scratch);
        assert_eq!(orientation, Orientation::MainDiagonal);
        // Anti-diagonal corners are all black, so picking them would give 0
        assert_eq!(patch_of(&window, &WeightVector::CORNER), vec![200, 200, 200]);
    }

    #[test]
    fn test_anti_diagonal_band_selects_anti_corners() {
        let window =
            window_from_fn(3, |i, j| if i + j == 3 { vec![200; 3] } else { vec![0; 3] });
        let mut scratch = [0.0; 3];
        let orientation =
            interpolate(window.luma(), &WeightVector::CORNER, &window, &mut scratch);
        assert_eq!(orientation, Orientation::AntiDiagonal);
        assert_eq!(patch_of(&window, &WeightVector::CORNER), vec![200, 200, 200]);
    }

    #[test]
    fn test_overshoot_is_clamped_to_window_range() {
        // Bright corners pull the blend below the darkest sample
        let window = window_from_fn(3, |i, j| {
            let corner = (i == 0 || i == 3) && (j == 0 || j == 3);
            if corner {
                vec![255; 3]
            } else {
                vec![100; 3]
            }
        });
        let mut scratch = [0.0; 3];
        interpolate(window.luma(), &WeightVector::CORNER, &window, &mut scratch);
        // Unclamped: W1 * 510 + W2 * 200 < 100
        assert!(W1 * 510.0 + W2 * 200.0 < 100.0);
        assert_eq!(scratch, [100.0; 3]);
    }

    #[test]
    fn test_interpolated_values_stay_in_window_range() {
        let mut rng = Lcg(0x5eed);
        for _ in 0..500 {
            let mut window = SampleWindow::new(4);
            for i in 0..4 {
                for j in 0..4 {
                    let px = [rng.next_u8(), rng.next_u8(), rng.next_u8(), rng.next_u8()];
                    window.set(i, j, &px);
                }
            }
            for wp in [WeightVector::CORNER, WeightVector::DIAMOND] {
                let mut scratch = [0.0; 4];
                interpolate(window.luma(), &wp, &window, &mut scratch);
                for (c, &v) in scratch.iter().enumerate() {
                    let (lo, hi) = window.channel_range(c);
                    assert!(v >= lo && v <= hi, "channel {c}: {v} outside [{lo}, {hi}]");
                }
            }
        }
    }

    #[test]
    fn test_rounding_goes_up() {
        // Horizontal gradient: the blend lands between integers
        let window = window_from_fn(3, |i, _| vec![(i * 10) as u8; 3]);
        let mut scratch = [0.0; 3];
        interpolate(window.luma(), &WeightVector::CORNER, &window, &mut scratch);
        let out = patch_of(&window, &WeightVector::CORNER);
        for c in 0..3 {
            assert_eq!(out[c] as f64, scratch[c].ceil());
        }
    }
}
