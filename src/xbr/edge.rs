//! Diagonal edge detection on 4x4 luma windows.

use serde::{Deserialize, Serialize};

/// Rec. 709 luma weights applied to the first three channels.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Luma of one pixel. Channels past the third are ignored.
#[inline]
pub fn luma(pixel: &[u8]) -> f64 {
    LUMA_WEIGHTS[0] * pixel[0] as f64
        + LUMA_WEIGHTS[1] * pixel[1] as f64
        + LUMA_WEIGHTS[2] * pixel[2] as f64
}

/// 4x4 grid of luma values, indexed `[i][j]` the same way as the
/// [`SampleWindow`](super::SampleWindow) it was derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LumaWindow(pub [[f64; 4]; 4]);

/// Six coefficients weighting the gradient terms of [`diagonal_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector(pub [f64; 6]);

impl WeightVector {
    /// Weights used for the corner fill and the refinement pass.
    pub const CORNER: WeightVector = WeightVector([2.0, 1.0, -1.0, 4.0, -1.0, 1.0]);
    /// Weights used for the diamond fill; only the nearest-neighbour term counts.
    pub const DIAMOND: WeightVector = WeightVector([2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

/// Which diagonal the interpolation follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// `[0][3]` to `[3][0]`
    AntiDiagonal,
    /// `[0][0]` to `[3][3]`
    MainDiagonal,
}

impl Orientation {
    /// Map an edge value to an orientation. Ties go to the anti-diagonal.
    pub fn from_edge(edge: f64) -> Self {
        if edge <= 0.0 {
            Orientation::AntiDiagonal
        } else {
            Orientation::MainDiagonal
        }
    }
}

#[inline]
fn df(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Signed diagonal edge strength of a luma window.
///
/// `dw1` sums luma differences running across the anti-diagonal, `dw2`
/// the ones running across the main diagonal. A positive result means the
/// anti-diagonal is crossed by stronger gradients, so structure runs along
/// the main diagonal.
pub fn diagonal_edge(mat: &LumaWindow, wp: &WeightVector) -> f64 {
    let m = &mat.0;
    let wp = &wp.0;

    let dw1 = wp[0]
        * (df(m[0][2], m[1][1])
            + df(m[1][1], m[2][0])
            + df(m[1][3], m[2][2])
            + df(m[2][2], m[3][1]))
        + wp[1] * (df(m[0][3], m[1][2]) + df(m[2][1], m[3][0]))
        + wp[2] * (df(m[0][3], m[2][1]) + df(m[1][2], m[3][0]))
        + wp[3] * df(m[1][2], m[2][1])
        + wp[4] * (df(m[0][2], m[2][0]) + df(m[1][3], m[3][1]))
        + wp[5] * (df(m[0][1], m[1][0]) + df(m[2][3], m[3][2]));

    let dw2 = wp[0]
        * (df(m[0][1], m[1][2])
            + df(m[1][2], m[2][3])
            + df(m[1][0], m[2][1])
            + df(m[2][1], m[3][2]))
        + wp[1] * (df(m[0][0], m[1][1]) + df(m[2][2], m[3][3]))
        + wp[2] * (df(m[0][0], m[2][2]) + df(m[1][1], m[3][3]))
        + wp[3] * df(m[1][1], m[2][2])
        + wp[4] * (df(m[1][0], m[3][2]) + df(m[0][1], m[2][3]))
        + wp[5] * (df(m[0][2], m[1][3]) + df(m[2][0], m[3][1]));

    dw1 - dw2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(main: bool, value: f64) -> LumaWindow {
        let mut m = [[0.0; 4]; 4];
        for i in 0..4 {
            if main {
                m[i][i] = value;
            } else {
                m[i][3 - i] = value;
            }
        }
        LumaWindow(m)
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(&[0, 0, 0]), 0.0);
        assert!((luma(&[255, 255, 255]) - 255.0).abs() < 1e-9);
        assert!((luma(&[100, 0, 0, 255]) - 21.26).abs() < 1e-9);
        assert!((luma(&[0, 100, 0]) - 71.52).abs() < 1e-9);
    }

    #[test]
    fn test_flat_window_has_zero_edge() {
        let flat = LumaWindow([[42.0; 4]; 4]);
        assert_eq!(diagonal_edge(&flat, &WeightVector::CORNER), 0.0);
        assert_eq!(diagonal_edge(&flat, &WeightVector::DIAMOND), 0.0);
        assert_eq!(Orientation::from_edge(0.0), Orientation::AntiDiagonal);
    }

    #[test]
    fn test_main_diagonal_band() {
        let edge = diagonal_edge(&band(true, 200.0), &WeightVector::CORNER);
        // Only the four wp0 terms of dw1 cross the band
        assert_eq!(edge, 1600.0);
        assert_eq!(Orientation::from_edge(edge), Orientation::MainDiagonal);
    }

    #[test]
    fn test_anti_diagonal_band() {
        let edge = diagonal_edge(&band(false, 200.0), &WeightVector::CORNER);
        assert!(edge < 0.0);
        assert_eq!(Orientation::from_edge(edge), Orientation::AntiDiagonal);
    }

    #[test]
    fn test_diamond_weights_use_first_term_only() {
        let mut m = band(true, 200.0).0;
        // Perturb cells that only appear in wp1..wp5 terms
        m[0][0] = 50.0;
        m[3][3] = 90.0;
        let edge = diagonal_edge(&LumaWindow(m), &WeightVector::DIAMOND);
        assert_eq!(edge, 2.0 * 800.0);
    }

    #[test]
    fn test_transpose_symmetry() {
        let mut m = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                m[i][j] = ((i * 7 + j * 13) % 11) as f64 * 17.0;
            }
        }
        let mut t = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                t[i][j] = m[j][i];
            }
        }
        let wp = WeightVector::CORNER;
        assert_eq!(diagonal_edge(&LumaWindow(m), &wp), diagonal_edge(&LumaWindow(t), &wp));
    }
}
