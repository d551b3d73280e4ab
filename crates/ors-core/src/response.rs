//! Dense ORS response over all interior pixels.
use crate::catalogue::Catalogue;
use crate::distance::DistanceField;
use crate::integrand::integrand;
use crate::window::{HeightDiffWindow, HeightSample};
use crate::{IntegrandMode, OrsError, OrsMap, OrsParams, WindowGeometry};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Read-only state shared by every pixel of a pass: the distance field and,
/// in catalogue mode, the integrand table built from it.
///
/// Build it once and reuse it across images with the same parameters.
#[derive(Clone, Debug)]
pub struct OrsKernel {
    geom: WindowGeometry,
    dist: DistanceField,
    catalogue: Option<Catalogue>,
}

impl OrsKernel {
    pub fn new(params: &OrsParams) -> Self {
        let geom = params.geometry();
        let dist = DistanceField::centered(geom);
        let catalogue = match params.mode {
            IntegrandMode::Catalogue => Some(Catalogue::build(&dist)),
            IntegrandMode::Direct => None,
        };
        Self {
            geom,
            dist,
            catalogue,
        }
    }

    #[inline]
    pub fn geometry(&self) -> WindowGeometry {
        self.geom
    }

    #[inline]
    pub fn distance(&self) -> &DistanceField {
        &self.dist
    }

    #[inline]
    pub fn catalogue(&self) -> Option<&Catalogue> {
        self.catalogue.as_ref()
    }

    #[inline]
    pub fn mode(&self) -> IntegrandMode {
        if self.catalogue.is_some() {
            IntegrandMode::Catalogue
        } else {
            IntegrandMode::Direct
        }
    }
}

/// Compute the dense ORS map for an 8-bit height map.
///
/// Uses the catalogue or direct path according to `params.mode`, and
/// parallelizes over output rows when built with the `rayon` feature.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(half_size = params.half_size, mode = ?params.mode))
)]
pub fn ors_response_u8(
    img: &[u8],
    w: usize,
    h: usize,
    params: &OrsParams,
) -> Result<OrsMap, OrsError> {
    params.geometry().output_dims(w, h)?;
    let kernel = OrsKernel::new(params);
    ors_response_u8_with(img, w, h, &kernel)
}

/// Same as [`ors_response_u8`] with a prebuilt kernel.
pub fn ors_response_u8_with(
    img: &[u8],
    w: usize,
    h: usize,
    kernel: &OrsKernel,
) -> Result<OrsMap, OrsError> {
    #[cfg(feature = "rayon")]
    {
        return compute_response_parallel(img, w, h, kernel);
    }
    #[cfg(not(feature = "rayon"))]
    {
        compute_response_sequential(img, w, h, kernel)
    }
}

/// Always single-threaded, useful as the reference for the parallel path.
pub fn ors_response_u8_sequential(
    img: &[u8],
    w: usize,
    h: usize,
    params: &OrsParams,
) -> Result<OrsMap, OrsError> {
    params.geometry().output_dims(w, h)?;
    let kernel = OrsKernel::new(params);
    compute_response_sequential(img, w, h, &kernel)
}

/// Compute the dense ORS map for a float height map, e.g. intensities in
/// `[0, 1]`.
///
/// Float heights always use the direct path; quantize them with
/// [`crate::window::quantize_u8`] to go through the catalogue.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(half_size = params.half_size))
)]
pub fn ors_response_f64(
    img: &[f64],
    w: usize,
    h: usize,
    params: &OrsParams,
) -> Result<OrsMap, OrsError> {
    params.geometry().output_dims(w, h)?;
    let kernel = OrsKernel::new(&params.clone().with_mode(IntegrandMode::Direct));
    ors_response_f64_with(img, w, h, &kernel)
}

/// Same as [`ors_response_f64`] with a prebuilt kernel. A catalogue held by
/// the kernel is not used for float input.
pub fn ors_response_f64_with(
    img: &[f64],
    w: usize,
    h: usize,
    kernel: &OrsKernel,
) -> Result<OrsMap, OrsError> {
    #[cfg(feature = "rayon")]
    {
        return compute_response_parallel(img, w, h, kernel);
    }
    #[cfg(not(feature = "rayon"))]
    {
        compute_response_sequential(img, w, h, kernel)
    }
}

/// Per-worker scratch: the height-difference window and its integrand values.
struct Scratch<T> {
    window: HeightDiffWindow<T>,
    values: Vec<f64>,
}

impl<T: HeightSample> Scratch<T> {
    fn new(geom: WindowGeometry) -> Self {
        Self {
            window: HeightDiffWindow::new(geom.side()),
            values: vec![0.0; geom.cells()],
        }
    }
}

fn check_input<T>(img: &[T], w: usize, h: usize, kernel: &OrsKernel) -> Result<OrsMap, OrsError> {
    if img.len() != w * h {
        return Err(OrsError::BufferSize {
            expected: w * h,
            actual: img.len(),
        });
    }
    let (out_w, out_h) = kernel.geom.output_dims(w, h)?;
    Ok(OrsMap {
        w: out_w,
        h: out_h,
        data: vec![0.0; out_w * out_h],
    })
}

fn compute_response_sequential<T: HeightSample>(
    img: &[T],
    w: usize,
    h: usize,
    kernel: &OrsKernel,
) -> Result<OrsMap, OrsError> {
    let mut map = check_input(img, w, h, kernel)?;
    let mut scratch = Scratch::new(kernel.geom);

    for (y, row) in map.data.chunks_exact_mut(map.w).enumerate() {
        compute_row(img, w, y, kernel, &mut scratch, row);
    }

    Ok(map)
}

#[cfg(feature = "rayon")]
fn compute_response_parallel<T: HeightSample>(
    img: &[T],
    w: usize,
    h: usize,
    kernel: &OrsKernel,
) -> Result<OrsMap, OrsError> {
    let mut map = check_input(img, w, h, kernel)?;
    let geom = kernel.geom;

    // Rows are disjoint output slices; every worker keeps its own scratch.
    map.data.par_chunks_mut(map.w).enumerate().for_each_init(
        || Scratch::new(geom),
        |scratch, (y, row)| compute_row(img, w, y, kernel, scratch, row),
    );

    Ok(map)
}

fn compute_row<T: HeightSample>(
    img: &[T],
    w: usize,
    y: usize,
    kernel: &OrsKernel,
    scratch: &mut Scratch<T>,
    row: &mut [f64],
) {
    for (x, out) in row.iter_mut().enumerate() {
        scratch.window.load(img, w, x, y);
        scratch.window.subtract_center();
        local_integrand(kernel, scratch);
        *out = sqrt_nansum(&scratch.values);
    }
}

#[inline]
fn local_integrand<T: HeightSample>(kernel: &OrsKernel, scratch: &mut Scratch<T>) {
    let diffs = scratch.window.as_slice();
    if let (Some(cat), Some(levels)) = (kernel.catalogue.as_ref(), T::as_levels(diffs)) {
        cat.gather(levels, &mut scratch.values);
        return;
    }
    // center cell: 0 / 0 = NaN
    for ((v, &d), &dist) in scratch
        .values
        .iter_mut()
        .zip(diffs)
        .zip(kernel.dist.as_slice())
    {
        *v = integrand(d.to_f64() / dist);
    }
}

/// Sum of `sqrt(v)` over all values whose root is finite. Negative integrands
/// and the NaN center are skipped; an empty sum is 0.
#[inline]
fn sqrt_nansum(values: &[f64]) -> f64 {
    values
        .iter()
        .map(|v| v.sqrt())
        .filter(|v| v.is_finite())
        .sum()
}
