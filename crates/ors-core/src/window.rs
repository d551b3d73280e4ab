//! Window extraction and height differences.
use crate::OrsError;

/// A height sample the driver can window.
pub trait HeightSample: Copy + Default + Send + Sync {
    /// `v - center`, clamped at zero.
    fn height_diff(v: Self, center: Self) -> Self;

    fn to_f64(self) -> f64;

    /// The window as 8-bit levels, when the sample type is already 8-bit.
    fn as_levels(window: &[Self]) -> Option<&[u8]>;
}

impl HeightSample for u8 {
    #[inline]
    fn height_diff(v: u8, center: u8) -> u8 {
        v.saturating_sub(center)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn as_levels(window: &[u8]) -> Option<&[u8]> {
        Some(window)
    }
}

impl HeightSample for f64 {
    /// NaN samples stay NaN.
    #[inline]
    fn height_diff(v: f64, center: f64) -> f64 {
        let d = v - center;
        if d < 0.0 {
            0.0
        } else {
            d
        }
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn as_levels(_window: &[f64]) -> Option<&[u8]> {
        None
    }
}

/// Scratch buffer holding one window of height differences.
///
/// One buffer is reused for every pixel handled by a worker.
#[derive(Clone, Debug)]
pub struct HeightDiffWindow<T> {
    side: usize,
    data: Vec<T>,
}

impl<T: HeightSample> HeightDiffWindow<T> {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            data: vec![T::default(); side * side],
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copies `img[y..y+side, x..x+side]` from a row-major image of width `w`.
    #[inline]
    pub fn load(&mut self, img: &[T], w: usize, x: usize, y: usize) {
        let side = self.side;
        for (r, dst) in self.data.chunks_exact_mut(side).enumerate() {
            let start = (y + r) * w + x;
            dst.copy_from_slice(&img[start..start + side]);
        }
    }

    /// Subtracts the center value and clamps negatives to zero.
    #[inline]
    pub fn subtract_center(&mut self) {
        let hs = self.side / 2;
        let c = self.data[hs * self.side + hs];
        for v in self.data.iter_mut() {
            *v = T::height_diff(*v, c);
        }
    }
}

/// Rounds samples that are already scaled to `0..=255` into 8-bit levels.
///
/// Non-finite samples or samples that round outside `0..=255` are reported
/// with their index.
pub fn quantize_u8(values: &[f64]) -> Result<Vec<u8>, OrsError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let r = value.round();
            if r.is_finite() && (0.0..=255.0).contains(&r) {
                Ok(r as u8)
            } else {
                Err(OrsError::QuantizationRange { index, value })
            }
        })
        .collect()
}

/// Negated height map, so that ORS measures depressions instead of bumps.
pub fn invert_f64(values: &[f64]) -> Vec<f64> {
    values.iter().map(|&v| -v).collect()
}

/// 8-bit counterpart of [`invert_f64`]: `255 - v`.
pub fn invert_u8(values: &[u8]) -> Vec<u8> {
    values.iter().map(|&v| 255 - v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_copies_the_window() {
        // 5x4 image, value = 10*y + x
        let img: Vec<u8> = (0..4)
            .flat_map(|y| (0..5).map(move |x| (10 * y + x) as u8))
            .collect();
        let mut win = HeightDiffWindow::<u8>::new(3);
        win.load(&img, 5, 2, 1);
        assert_eq!(win.as_slice(), &[12, 13, 14, 22, 23, 24, 32, 33, 34]);
    }

    #[test]
    fn u8_height_diff_clamps_at_zero() {
        let mut win = HeightDiffWindow::<u8>::new(3);
        win.as_mut_slice()
            .copy_from_slice(&[0, 50, 100, 49, 50, 51, 255, 10, 50]);
        win.subtract_center();
        assert_eq!(win.as_slice(), &[0, 0, 50, 0, 0, 1, 205, 0, 0]);
    }

    #[test]
    fn f64_height_diff_clamps_and_keeps_nan() {
        let mut win = HeightDiffWindow::<f64>::new(3);
        win.as_mut_slice()
            .copy_from_slice(&[0.1, 0.5, 0.9, f64::NAN, 0.5, 0.25, 0.75, 0.5, 0.5]);
        win.subtract_center();
        let d = win.as_slice();
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 0.0);
        assert!((d[2] - 0.4).abs() < 1e-12);
        assert!(d[3].is_nan());
        assert_eq!(d[4], 0.0);
        assert_eq!(d[5], 0.0);
        assert_eq!(d[6], 0.25);
    }

    #[test]
    fn quantize_rounds_and_reports_out_of_range() {
        assert_eq!(
            quantize_u8(&[0.0, 0.4, 127.5, 254.6, 255.0]).unwrap(),
            vec![0, 0, 128, 255, 255]
        );
        assert_eq!(
            quantize_u8(&[1.0, 256.0]),
            Err(OrsError::QuantizationRange {
                index: 1,
                value: 256.0
            })
        );
        assert!(matches!(
            quantize_u8(&[-3.0]),
            Err(OrsError::QuantizationRange { index: 0, .. })
        ));
        assert!(quantize_u8(&[f64::NAN]).is_err());
    }

    #[test]
    fn invert_flips_heights() {
        assert_eq!(invert_u8(&[0, 10, 255]), vec![255, 245, 0]);
        assert_eq!(invert_f64(&[0.25, -1.0]), vec![-0.25, 1.0]);
    }
}
