//! Ergonomic wrappers over `ors-core` that accept `image::GrayImage` inputs.
//!
//! - [`image`] – ORS maps straight from `image::GrayImage`.
//! - [`app`] – config loading, image I/O and result dumps shared by the
//!   examples and tools.

pub mod app;
pub mod image;

pub use ors_core::*;

pub use crate::image::{ors_response_image, ors_response_image_unit, unit_intensities};
