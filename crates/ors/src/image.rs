//! `image::GrayImage` helpers for the ORS response.
//!
//! Color inputs should be converted with `DynamicImage::to_luma8` first; the
//! core only ever sees one channel.

use image::GrayImage;
use ors_core::response::{ors_response_f64, ors_response_u8};
use ors_core::{OrsError, OrsMap, OrsParams};

/// Dense ORS map of a `GrayImage`, heights in 8-bit levels (`0..=255`).
///
/// Honors `params.mode`, so this is the path that can use the catalogue.
#[inline]
pub fn ors_response_image(img: &GrayImage, params: &OrsParams) -> Result<OrsMap, OrsError> {
    ors_response_u8(
        img.as_raw(),
        img.width() as usize,
        img.height() as usize,
        params,
    )
}

/// Dense ORS map of a `GrayImage` with heights normalized to `[0, 1]`.
///
/// Normalized heights are not 8-bit levels, so this always evaluates the
/// integrand directly.
pub fn ors_response_image_unit(img: &GrayImage, params: &OrsParams) -> Result<OrsMap, OrsError> {
    let heights = unit_intensities(img);
    ors_response_f64(
        &heights,
        img.width() as usize,
        img.height() as usize,
        params,
    )
}

/// Pixel intensities scaled to `[0, 1]`, row-major.
pub fn unit_intensities(img: &GrayImage) -> Vec<f64> {
    img.as_raw().iter().map(|&v| v as f64 / 255.0).collect()
}
