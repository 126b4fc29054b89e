//! Curve contract and implementations.

mod bspline;
mod subdivision;
mod torus_knot;

use std::ops::{Index, IndexMut};

use pcurve_math::{DVec3, Point3, Vector3};
use serde::{Deserialize, Serialize};

pub use bspline::BSplineCurve;
pub use subdivision::{lane_riesenfeld, SubdivisionCurve};
pub use torus_knot::TorusKnot;

/// Trait for parametric curves in 3D space.
///
/// This is the only surface a sampling or display layer needs; it never
/// depends on the concrete curve types.
pub trait ParametricCurve: Send + Sync {
    /// Evaluate position and the first `d` derivatives at parameter `t`.
    ///
    /// The result always holds `d + 1` vectors. Orders a curve does not
    /// define are left as zero vectors.
    fn evaluate(&self, t: f64, d: usize) -> Evaluation;

    /// Return the parameter domain and whether the curve is closed.
    fn domain(&self) -> CurveDomain;

    /// Whether the curve is closed (start == end).
    fn is_closed(&self) -> bool {
        self.domain().closed
    }

    /// Evaluate the curve position at parameter `t`.
    fn point_at(&self, t: f64) -> Point3 {
        self.evaluate(t, 0).position()
    }

    /// Evaluate the first derivative at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3 {
        self.evaluate(t, 1)[1]
    }
}

/// Parameter bounds of a curve plus its closed flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveDomain {
    pub start: f64,
    pub end: f64,
    pub closed: bool,
}

impl CurveDomain {
    pub fn open(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            closed: false,
        }
    }

    pub fn closed(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            closed: true,
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Clamp `t` into `[start, end]`.
    pub fn clamp(&self, t: f64) -> f64 {
        t.max(self.start).min(self.end)
    }

    /// Wrap `t` periodically into `[start, end)` for closed curves.
    ///
    /// Open or zero-length domains return `t` unchanged.
    pub fn wrap(&self, t: f64) -> f64 {
        let span = self.span();
        if !self.closed || span <= 0.0 {
            return t;
        }
        self.start + (t - self.start).rem_euclid(span)
    }

    /// Map `fraction` in `[0, 1]` linearly onto the domain.
    pub fn parameter_at(&self, fraction: f64) -> f64 {
        self.start + self.span() * fraction
    }
}

/// Position and derivatives of a curve at one parameter value.
///
/// Index 0 is the position, index `k` the k-th derivative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    derivatives: Vec<Vector3>,
}

impl Evaluation {
    /// An evaluation of order `d` with every slot set to zero.
    pub fn zeroed(d: usize) -> Self {
        Self {
            derivatives: vec![DVec3::ZERO; d + 1],
        }
    }

    pub fn position(&self) -> Point3 {
        self.derivatives[0]
    }

    /// The k-th derivative, or `None` if it was not requested.
    pub fn derivative(&self, k: usize) -> Option<Vector3> {
        self.derivatives.get(k).copied()
    }

    /// Highest derivative order held.
    pub fn order(&self) -> usize {
        self.derivatives.len() - 1
    }

    pub fn as_slice(&self) -> &[Vector3] {
        &self.derivatives
    }
}

impl Index<usize> for Evaluation {
    type Output = Vector3;

    fn index(&self, k: usize) -> &Vector3 {
        &self.derivatives[k]
    }
}

impl IndexMut<usize> for Evaluation {
    fn index_mut(&mut self, k: usize) -> &mut Vector3 {
        &mut self.derivatives[k]
    }
}
