//! Precomputed integrand values for every 8-bit height difference.
//!
//! With heights quantized to 8 bits there are only 256 possible height
//! differences, so `integrand(k / dist)` can be tabulated for every level `k`
//! and every window position once per run. Each window then only needs a
//! gather: cell `k` of the window reads the table layer selected by its own
//! height difference.
use crate::distance::DistanceField;
use crate::integrand::integrand;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of 8-bit height levels.
pub const LEVELS: usize = 256;

/// Table of shape `[LEVELS][h][w]` stored plane-major in one flat buffer.
#[derive(Clone, Debug)]
pub struct Catalogue {
    w: usize,
    h: usize,
    table: Vec<f64>,
}

impl Catalogue {
    /// Tabulates `integrand(k / dist)` for `k = 0..256` at every cell of
    /// `dist`.
    ///
    /// Zero distances (the window center) give NaN entries; they are kept
    /// as they are and dropped later by the NaN-skipping sum.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(dist), fields(w = dist.width(), h = dist.height()))
    )]
    pub fn build(dist: &DistanceField) -> Self {
        let d = dist.as_slice();
        let plane = d.len();
        let mut table = Vec::with_capacity(LEVELS * plane);
        for k in 0..LEVELS {
            let level = k as f64;
            table.extend(d.iter().map(|&dd| integrand(level / dd)));
        }
        Self {
            w: dist.width(),
            h: dist.height(),
            table,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// Cells per level.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    /// Entry for height difference `level` at column `x`, row `y`.
    pub fn at(&self, level: u8, x: usize, y: usize) -> f64 {
        self.table[level as usize * self.plane_len() + y * self.w + x]
    }

    /// One full layer of the table.
    #[inline]
    pub fn level(&self, level: u8) -> &[f64] {
        let n = self.plane_len();
        let start = level as usize * n;
        &self.table[start..start + n]
    }

    /// Per-cell gather: `out[k] = self[window[k]][k]`.
    ///
    /// The lookup is a take on linear indices `window[k] * plane_len + k`
    /// over the flat table. `u8` keeps every index inside the table.
    ///
    /// # Panics
    /// If `window` or `out` is not exactly one plane long.
    #[inline]
    pub fn gather(&self, window: &[u8], out: &mut [f64]) {
        let n = self.plane_len();
        assert_eq!(window.len(), n, "window does not match catalogue plane");
        assert_eq!(out.len(), n, "output does not match catalogue plane");
        for (k, (o, &lvl)) in out.iter_mut().zip(window).enumerate() {
            *o = self.table[lvl as usize * n + k];
        }
    }

    /// Same as [`Catalogue::gather`] but allocates the result.
    pub fn gather_vec(&self, window: &[u8]) -> Vec<f64> {
        let mut out = vec![0.0; self.plane_len()];
        self.gather(window, &mut out);
        out
    }
}
