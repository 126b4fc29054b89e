//! Quadratic B-spline curve.

use log::{debug, warn};
use pcurve_core::traits::Validate;
use pcurve_core::{CurveError, Result, Tolerance};
use pcurve_math::Point3;
use serde::{Deserialize, Serialize};

use super::{CurveDomain, Evaluation, ParametricCurve};
use crate::nurbs::{basis_derivative, fit_control_points, KnotVector};

/// An open quadratic B-spline on a clamped uniform knot vector.
///
/// The curve interpolates its first and last control points at the ends of
/// its domain. Only the control points are serialized; the knot vector is
/// rebuilt by [`BSplineCurve::new`] on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "BSplineCurveParts", try_from = "BSplineCurveParts")]
pub struct BSplineCurve {
    control_points: Vec<Point3>,
    knots: KnotVector,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BSplineCurveParts {
    control_points: Vec<Point3>,
}

impl From<BSplineCurve> for BSplineCurveParts {
    fn from(curve: BSplineCurve) -> Self {
        Self {
            control_points: curve.control_points,
        }
    }
}

impl TryFrom<BSplineCurveParts> for BSplineCurve {
    type Error = CurveError;

    fn try_from(parts: BSplineCurveParts) -> Result<Self> {
        Self::new(parts.control_points)
    }
}

impl BSplineCurve {
    pub const DEGREE: usize = 2;

    /// Build a B-spline directly from its control points.
    pub fn new(control_points: Vec<Point3>) -> Result<Self> {
        check_control_point_count(control_points.len())?;
        let knots = KnotVector::clamped_uniform(control_points.len(), Self::DEGREE);
        debug!(
            "B-spline: {} control points, {} knots",
            control_points.len(),
            knots.len()
        );
        Ok(Self {
            control_points,
            knots,
        })
    }

    /// Fit `n` control points to `samples` by least squares.
    ///
    /// Samples are assigned uniformly spaced parameters across the domain.
    pub fn fit(samples: &[Point3], n: usize) -> Result<Self> {
        Self::fit_with_tolerance(samples, n, Tolerance::default())
    }

    /// Like [`BSplineCurve::fit`], with an explicit rank tolerance.
    pub fn fit_with_tolerance(samples: &[Point3], n: usize, tolerance: Tolerance) -> Result<Self> {
        check_control_point_count(n)?;
        let knots = KnotVector::clamped_uniform(n, Self::DEGREE);
        let control_points = fit_control_points(samples, &knots, tolerance)?;
        debug!(
            "B-spline fitted to {} samples with {} control points",
            samples.len(),
            n
        );
        Ok(Self {
            control_points,
            knots,
        })
    }

    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }
}

fn check_control_point_count(n: usize) -> Result<()> {
    if n < BSplineCurve::DEGREE + 1 {
        return Err(CurveError::Geometry(format!(
            "quadratic B-spline needs at least {} control points, got {}",
            BSplineCurve::DEGREE + 1,
            n
        )));
    }
    Ok(())
}

impl ParametricCurve for BSplineCurve {
    fn evaluate(&self, t: f64, d: usize) -> Evaluation {
        let domain = self.domain();
        let t = if domain.contains(t) {
            t
        } else {
            warn!(
                "B-spline evaluated at {} outside [{}, {}], clamping",
                t, domain.start, domain.end
            );
            domain.clamp(t)
        };

        let knots = self.knots.as_slice();
        let mut eval = Evaluation::zeroed(d);
        // Derivatives above the degree vanish and stay zero
        for order in 0..=d.min(Self::DEGREE) {
            eval[order] = self
                .control_points
                .iter()
                .enumerate()
                .map(|(i, &cp)| basis_derivative(knots, i, Self::DEGREE, t, order) * cp)
                .sum();
        }
        eval
    }

    fn domain(&self) -> CurveDomain {
        let (start, end) = self.knots.domain();
        CurveDomain::open(start, end)
    }
}

impl Validate for BSplineCurve {
    fn validate(&self) -> Result<()> {
        self.knots.validate()?;
        if self.knots.control_point_count() != self.control_points.len() {
            return Err(CurveError::Tolerance(format!(
                "{} knots do not match {} control points",
                self.knots.len(),
                self.control_points.len()
            )));
        }
        Ok(())
    }
}
