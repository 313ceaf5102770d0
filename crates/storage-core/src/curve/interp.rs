//! One-dimensional piecewise-linear interpolation over a monotone axis.
use crate::error::{Error, Result};

/// Interpolate `ys` at `x` over the non-decreasing abscissa `xs`.
///
/// A value that hits a node returns that node's ordinate unchanged; with
/// repeated abscissae the first matching node wins. Values outside
/// `[xs[0], xs[last]]` are an error, never clamped.
pub(crate) fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> Result<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let (Some(&min), Some(&max)) = (xs.first(), xs.last()) else {
        return Err(Error::Extrapolation { value: x, min: f64::NAN, max: f64::NAN });
    };
    if !(x >= min && x <= max) {
        return Err(Error::Extrapolation { value: x, min, max });
    }

    // First node with xs[i] >= x; exists because x <= max.
    let hi = xs.partition_point(|&v| v < x);
    if xs[hi] == x {
        return Ok(ys[hi]);
    }
    // x > min here, so hi >= 1 and xs[hi - 1] < x < xs[hi].
    let lo = hi - 1;
    let (x0, x1) = (xs[lo], xs[hi]);
    let (y0, y1) = (ys[lo], ys[hi]);
    Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}
