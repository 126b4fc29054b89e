//! Least-squares fitting of B-spline control points to sample points.

use log::debug;
use nalgebra::DMatrix;
use pcurve_core::{CurveError, Result, Tolerance};
use pcurve_math::{DVec3, Point3};

use super::knot::{basis_functions, find_span, KnotVector};

/// Assemble the `samples x n` basis matrix for `knots`.
///
/// Row `i` samples the normalized parameter `i / (samples - 1)`, mapped onto
/// the knot domain, and holds the `degree + 1` non-vanishing basis values
/// in the columns of the active knot span. Requires `samples >= 2`.
pub fn basis_matrix(knots: &KnotVector, samples: usize) -> DMatrix<f64> {
    let degree = knots.degree();
    let n = knots.control_point_count();
    let (start, end) = knots.domain();

    let mut matrix = DMatrix::zeros(samples, n);
    for row in 0..samples {
        let t = start + (end - start) * row as f64 / (samples - 1) as f64;
        let span = find_span(degree, knots.as_slice(), n - 1, t);
        let values = basis_functions(degree, knots.as_slice(), span, t);
        for (j, value) in values.into_iter().enumerate() {
            matrix[(row, span - degree + j)] = value;
        }
    }

    matrix
}

/// Solve for the control points that best reproduce `samples` on `knots`.
///
/// The system is solved through an SVD. Singular values that are negligible
/// relative to the largest one (per `tolerance.is_negligible`) count as
/// rank loss; if the rank is below the control-point count the fit is
/// rejected instead of returning arbitrary control points.
pub fn fit_control_points(
    samples: &[Point3],
    knots: &KnotVector,
    tolerance: Tolerance,
) -> Result<Vec<Point3>> {
    let m = samples.len();
    let n = knots.control_point_count();

    if m < 2 {
        return Err(CurveError::InvalidOperation(format!(
            "least-squares fit needs at least 2 samples, got {}",
            m
        )));
    }
    if n < knots.degree() + 1 {
        return Err(CurveError::Geometry(format!(
            "degree {} fit needs at least {} control points, got {}",
            knots.degree(),
            knots.degree() + 1,
            n
        )));
    }

    let a = basis_matrix(knots, m);
    let b = DMatrix::from_fn(m, 3, |i, j| samples[i][j]);

    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.max();
    let rank = svd
        .singular_values
        .iter()
        .filter(|&&s| !tolerance.is_negligible(s, sigma_max))
        .count();

    debug!(
        "least-squares fit: {} samples, {} control points, rank {}",
        m, n, rank
    );

    if rank < n {
        return Err(CurveError::FitNotWellDetermined { rank, required: n });
    }

    let x = svd
        .solve(&b, tolerance.linear * sigma_max)
        .map_err(|e| CurveError::InvalidOperation(e.to_string()))?;

    Ok((0..n)
        .map(|i| DVec3::new(x[(i, 0)], x[(i, 1)], x[(i, 2)]))
        .collect())
}
