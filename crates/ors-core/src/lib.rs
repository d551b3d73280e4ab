//! Core primitives for computing dense ORS (roughness/shading) maps.
//!
//! # Overview
//!
//! For every interior pixel of a grayscale height map, ORS looks at a square
//! window of side `2h+1`, converts the non-negative height differences to the
//! window center into slopes, evaluates a fixed nonlinear integrand per slope
//! and sums the square roots of the results, skipping NaNs.
//!
//! The crate is split into a few small building blocks:
//!
//! - [`distance`] – Euclidean distance field from the window center.
//! - [`integrand`] – the scalar integrand evaluated per slope.
//! - [`catalogue`] – a `[256][side][side]` table of integrand values for
//!   every 8‑bit height difference, plus the per-cell gather used to read it.
//! - [`window`] – window extraction and height differences.
//! - [`response`] – the dense driver producing an [`OrsMap`].
//!
//! # Features
//!
//! - `rayon` *(default)* – parallelizes the dense response over output rows.
//!   This does not change numerical results; the parallel map is
//!   bit-identical to the sequential one.
//! - `tracing` – adds `tracing` spans to the public entry points.
//!
//! The catalogue path only accepts 8‑bit heights (`u8`), which is what keeps
//! the lookup in range. Float height maps go through the direct path, or are
//! quantized first with [`window::quantize_u8`].

pub mod catalogue;
pub mod distance;
pub mod error;
pub mod integrand;
pub mod response;
pub mod window;

pub use crate::catalogue::Catalogue;
pub use crate::distance::DistanceField;
pub use crate::error::OrsError;
pub use crate::response::OrsKernel;

/// Window geometry: a square of side `2 * half_size + 1` centered on a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    pub half_size: u32,
}

impl WindowGeometry {
    #[inline]
    pub fn new(half_size: u32) -> Self {
        Self { half_size }
    }

    /// Window side length in pixels.
    #[inline]
    pub fn side(&self) -> usize {
        2 * self.half_size as usize + 1
    }

    /// Number of cells in the window.
    #[inline]
    pub fn cells(&self) -> usize {
        self.side() * self.side()
    }

    /// Flat index of the window center.
    #[inline]
    pub fn center_index(&self) -> usize {
        let h = self.half_size as usize;
        h * self.side() + h
    }

    /// Output dimensions for an image of `w × h`, or a geometry error when the
    /// image does not fit a single full window.
    pub fn output_dims(&self, w: usize, h: usize) -> Result<(usize, usize), OrsError> {
        let hs = self.half_size as usize;
        if hs == 0 || w <= 2 * hs || h <= 2 * hs {
            return Err(OrsError::Geometry {
                w,
                h,
                half_size: self.half_size,
            });
        }
        Ok((w - 2 * hs, h - 2 * hs))
    }
}

/// How the integrand is obtained for each window cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegrandMode {
    /// Look values up in a precomputed [`Catalogue`] (8‑bit heights only).
    #[default]
    Catalogue,
    /// Evaluate the integrand for every cell of every window.
    Direct,
}

/// Tunable parameters for the ORS response.
#[derive(Clone, Debug)]
pub struct OrsParams {
    /// Window half-width. Pick it larger than the largest feature of interest.
    pub half_size: u32,
    /// Catalogue lookup or direct evaluation.
    pub mode: IntegrandMode,
}

impl Default for OrsParams {
    fn default() -> Self {
        Self {
            half_size: 30,
            mode: IntegrandMode::Catalogue,
        }
    }
}

impl OrsParams {
    pub fn with_half_size(mut self, half_size: u32) -> Self {
        self.half_size = half_size;
        self
    }

    pub fn with_mode(mut self, mode: IntegrandMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry::new(self.half_size)
    }
}

/// Dense ORS map in row-major layout.
///
/// The map is smaller than the source image: `half_size` pixels are lost on
/// every border, so `w = img_w - 2 * half_size` and likewise for `h`.
#[derive(Clone, Debug)]
pub struct OrsMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f64>,
}

impl OrsMap {
    #[inline]
    /// ORS value at an integer coordinate of the map.
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.w + x]
    }
}
