//! Root isolation by bisection
use crate::point::{Field, SampledPoint};
use nalgebra::SVector;

/// Values at or above this magnitude are never accepted as zeros
const HUGE: f64 = 1e200;

/// Finds a point between `p1` and `p2` where the field is (nearly) zero
///
/// Returns the point and a flag indicating whether it's a genuine zero.  The
/// flag is `false` when the search converged onto a discontinuity instead of
/// a crossing, e.g. the pole at `x = 0` of `f(x, y) = 1 / (x * y) - 1`.
///
/// The search bisects the segment until it is smaller than `tol` on every
/// axis, then linearly interpolates between the two remaining endpoints.  If
/// `tol` is finer than `f64` can resolve, the search stops once no midpoint
/// can be formed and returns the endpoint nearer to zero.
///
/// Signs are tested with `value > 0`, so zero is grouped with the negative
/// values; a midpoint that is exactly zero ends the search early.
///
/// The result is the same (bit for bit) if `p1` and `p2` are swapped.
///
/// # Preconditions
/// `p1` and `p2` must have finite values on opposite sides of zero (with zero
/// counting as negative), and `tol` must be positive on every axis.  This is
/// not checked.
pub fn isolate_root<const D: usize, F: Field<D> + ?Sized>(
    p1: SampledPoint<D>,
    p2: SampledPoint<D>,
    field: &F,
    tol: &SVector<f64, D>,
) -> (SampledPoint<D>, bool) {
    let (mut lo, mut hi) = (p1, p2);
    while !(hi.pos - lo.pos).abs().iter().zip(tol.iter()).all(|(d, t)| d < t) {
        let mid = SampledPoint::midpoint(&lo, &hi, field);
        if mid.value == 0.0 {
            return (mid, true);
        } else if mid.pos == lo.pos || mid.pos == hi.pos {
            // No floats left between the endpoints
            let pt = nearer_zero(lo, hi);
            return (pt, pt.value.abs() < HUGE);
        } else if mid.is_positive() == lo.is_positive() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let pt = SampledPoint::interpolate_zero(&lo, &hi, field);
    let is_zero = pt.value == 0.0
        || (pt.value.abs() < HUGE
            && sign(pt.value - lo.value) == sign(hi.value - pt.value));
    (pt, is_zero)
}

/// Picks whichever point has the smaller magnitude (ties go to the negative
/// side)
fn nearer_zero<const D: usize>(
    a: SampledPoint<D>,
    b: SampledPoint<D>,
) -> SampledPoint<D> {
    let (x, y) = (a.value.abs(), b.value.abs());
    if x < y || (x == y && !a.is_positive()) {
        a
    } else {
        b
    }
}

/// Returns -1, 0, or 1, matching the sign of a finite value
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
