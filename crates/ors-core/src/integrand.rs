//! The integrand summed over each window.
//!
//! The slope is rewritten step by step and every step reads the value the
//! previous one produced:
//!
//! ```text
//! x = 2s
//! x = x * atan(x)
//! x = x - ln(x^2 + 1)
//! x = x - atan(x)^2
//! f = (4/pi)^3 * x
//! ```
//!
//! This is not the closed form `2s·atan(s) - ln(s²+1) - atan²(s)`; the
//! compounded sequence is kept so that maps stay comparable with existing
//! ORS results.

/// Scale applied to every integrand value, `(4/π)³`.
pub const PREFACTOR: f64 = {
    let a = 4.0 / core::f64::consts::PI;
    a * a * a
};

/// Integrand for a single slope. NaN in, NaN out.
#[inline]
pub fn integrand(slope: f64) -> f64 {
    let mut x = slope * 2.0;
    x *= x.atan();
    x -= (x * x + 1.0).ln();
    let a = x.atan();
    x -= a * a;
    PREFACTOR * x
}

/// Applies [`integrand`] to every element of `values`.
pub fn integrand_in_place(values: &mut [f64]) {
    for v in values.iter_mut() {
        *v = integrand(*v);
    }
}
