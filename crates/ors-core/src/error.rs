use thiserror::Error;

/// Errors that abort a whole ORS pass.
///
/// NaN/Inf values produced inside a window (zero distance at the center,
/// negative integrands under the square root) are not errors; they are
/// skipped by the per-pixel reduction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrsError {
    #[error("image {w}x{h} is too small for half_size {half_size} (need both sides > 2*half_size, half_size >= 1)")]
    Geometry { w: usize, h: usize, half_size: u32 },

    #[error("image buffer holds {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("value {value} at index {index} does not map to an 8-bit level")]
    QuantizationRange { index: usize, value: f64 },
}
