//! Euclidean distance field used to turn height differences into slopes.
use crate::WindowGeometry;

/// Distances from every cell of a `w × h` grid to one reference cell,
/// row-major.
#[derive(Clone, Debug)]
pub struct DistanceField {
    w: usize,
    h: usize,
    data: Vec<f64>,
}

impl DistanceField {
    /// Distances to the reference cell `(i, j)` (column, row) over a grid of
    /// `max_x × max_y` cells.
    pub fn new(i: usize, j: usize, max_x: usize, max_y: usize) -> Self {
        let mut data = Vec::with_capacity(max_x * max_y);
        for r in 0..max_y {
            let dy = r as f64 - j as f64;
            for c in 0..max_x {
                let dx = c as f64 - i as f64;
                data.push((dx * dx + dy * dy).sqrt());
            }
        }
        Self {
            w: max_x,
            h: max_y,
            data,
        }
    }

    /// Square field of side `2h+1` with the zero cell in the middle.
    pub fn centered(geom: WindowGeometry) -> Self {
        let hs = geom.half_size as usize;
        let side = geom.side();
        Self::new(hs, hs, side, side)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    /// Distance at column `x`, row `y`.
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
