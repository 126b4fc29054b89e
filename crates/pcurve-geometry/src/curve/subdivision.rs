//! Closed Lane–Riesenfeld subdivision curve.

use log::debug;
use pcurve_core::traits::Validate;
use pcurve_core::{CurveError, Result};
use pcurve_math::Point3;
use serde::{Deserialize, Serialize};

use super::{CurveDomain, Evaluation, ParametricCurve};

/// A closed curve obtained by refining a control polygon.
///
/// The refined point set is computed once in the constructor and never
/// changes afterwards. Evaluation interpolates linearly between refined
/// points over the domain `[0, 1]`.
///
/// Only the control polygon and degree are serialized; deserializing goes
/// through [`SubdivisionCurve::new`] and recomputes the refined points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SubdivisionCurveParts", try_from = "SubdivisionCurveParts")]
pub struct SubdivisionCurve {
    control_polygon: Vec<Point3>,
    degree: usize,
    points: Vec<Point3>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubdivisionCurveParts {
    control_polygon: Vec<Point3>,
    degree: usize,
}

impl From<SubdivisionCurve> for SubdivisionCurveParts {
    fn from(curve: SubdivisionCurve) -> Self {
        Self {
            control_polygon: curve.control_polygon,
            degree: curve.degree,
        }
    }
}

impl TryFrom<SubdivisionCurveParts> for SubdivisionCurve {
    type Error = CurveError;

    fn try_from(parts: SubdivisionCurveParts) -> Result<Self> {
        Self::new(parts.control_polygon, parts.degree)
    }
}

/// Upper bound on the refined point count.
pub const MAX_REFINED_POINTS: usize = 1 << 22;

/// Number of refined points for `n` control points and `degree` rounds,
/// or `None` if it would exceed [`MAX_REFINED_POINTS`].
fn refined_len(n: usize, degree: usize) -> Option<usize> {
    if degree >= usize::BITS as usize {
        return None;
    }
    n.checked_mul(1 << degree)
        .filter(|&len| len <= MAX_REFINED_POINTS)
}

impl SubdivisionCurve {
    /// Refine the closed `control_polygon` with `degree` Lane–Riesenfeld rounds.
    pub fn new(control_polygon: Vec<Point3>, degree: usize) -> Result<Self> {
        if control_polygon.is_empty() {
            return Err(CurveError::Geometry(
                "subdivision curve needs a non-empty control polygon".into(),
            ));
        }
        if degree == 0 {
            return Err(CurveError::InvalidOperation(
                "subdivision degree must be at least 1".into(),
            ));
        }
        if refined_len(control_polygon.len(), degree).is_none() {
            return Err(CurveError::Geometry(format!(
                "degree {} refinement of {} points exceeds {} points",
                degree,
                control_polygon.len(),
                MAX_REFINED_POINTS
            )));
        }

        let points = lane_riesenfeld(&control_polygon, degree);
        debug!(
            "subdivision curve: {} control points, degree {}, {} refined points",
            control_polygon.len(),
            degree,
            points.len()
        );

        Ok(Self {
            control_polygon,
            degree,
            points,
        })
    }

    pub fn control_polygon(&self) -> &[Point3] {
        &self.control_polygon
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The refined point sequence; its last point equals its first.
    pub fn subdivided_points(&self) -> &[Point3] {
        &self.points
    }
}

/// Refine a closed polygon with `degree` rounds of Lane–Riesenfeld subdivision.
///
/// Each round doubles the polygon by inserting edge midpoints (the closing
/// edge wraps to the first point) and then applies `degree - 1` passes that
/// average every point with its predecessor. The last point of the result is
/// overwritten with the first so the sequence closes exactly.
pub fn lane_riesenfeld(points: &[Point3], degree: usize) -> Vec<Point3> {
    let mut current = points.to_vec();

    for _ in 0..degree {
        let n = current.len();
        let mut refined = Vec::with_capacity(2 * n);
        for (i, &p) in current.iter().enumerate() {
            let next = current[(i + 1) % n];
            refined.push(p);
            refined.push((p + next) * 0.5);
        }

        for _ in 1..degree {
            refined = average_with_predecessor(&refined);
        }

        current = refined;
    }

    if current.len() > 1 {
        let first = current[0];
        if let Some(last) = current.last_mut() {
            *last = first;
        }
    }

    current
}

fn average_with_predecessor(points: &[Point3]) -> Vec<Point3> {
    let n = points.len();
    (0..n)
        .map(|i| (points[i] + points[(i + n - 1) % n]) * 0.5)
        .collect()
}

impl ParametricCurve for SubdivisionCurve {
    /// Slot 1 holds a central difference of the neighbouring refined points,
    /// in index units; slots above 1 are zero.
    fn evaluate(&self, t: f64, d: usize) -> Evaluation {
        let t = self.domain().wrap(t);
        let count = self.points.len();
        let scaled = t * (count - 1) as f64;
        let floor = scaled.floor();
        let index = (floor as i64).rem_euclid(count as i64) as usize;
        let alpha = scaled - floor;

        let next = (index + 1) % count;
        let mut eval = Evaluation::zeroed(d);
        eval[0] = self.points[index] * (1.0 - alpha) + self.points[next] * alpha;

        if d > 0 {
            let prev = (index + count - 1) % count;
            eval[1] = (self.points[next] - self.points[prev]) * 0.5;
        }

        eval
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::closed(0.0, 1.0)
    }
}

impl Validate for SubdivisionCurve {
    fn validate(&self) -> Result<()> {
        let expected = refined_len(self.control_polygon.len(), self.degree).ok_or_else(|| {
            CurveError::Tolerance(format!("degree {} is out of range", self.degree))
        })?;
        if self.points.len() != expected {
            return Err(CurveError::Tolerance(format!(
                "expected {} refined points, found {}",
                expected,
                self.points.len()
            )));
        }
        if self.points.len() > 1 && self.points.first() != self.points.last() {
            return Err(CurveError::Tolerance(
                "refined point set is not closed".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcurve_math::{dvec3, DVec3};

    fn square() -> Vec<Point3> {
        vec![
            dvec3(-1.0, -1.0, 0.0),
            dvec3(1.0, -1.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(-1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_round_inserts_midpoints() {
        let points = lane_riesenfeld(&square(), 1);
        let expected = vec![
            dvec3(-1.0, -1.0, 0.0),
            dvec3(0.0, -1.0, 0.0),
            dvec3(1.0, -1.0, 0.0),
            dvec3(1.0, 0.0, 0.0),
            dvec3(1.0, 1.0, 0.0),
            dvec3(0.0, 1.0, 0.0),
            dvec3(-1.0, 1.0, 0.0),
            // closing midpoint replaced by the first point
            dvec3(-1.0, -1.0, 0.0),
        ];
        assert_eq!(points, expected);
    }

    #[test]
    fn test_second_degree_averages() {
        let points = lane_riesenfeld(&square(), 2);
        assert_eq!(points.len(), 16);
        assert!((points[0] - dvec3(-1.0, -0.25, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_closure_for_every_degree() {
        for degree in 1..=6 {
            let curve = SubdivisionCurve::new(square(), degree).unwrap();
            let points = curve.subdivided_points();
            assert_eq!(points.len(), 4 << degree);
            assert_eq!(points.first(), points.last(), "degree {}", degree);
            curve.validate().unwrap();
        }
    }

    #[test]
    fn test_square_endpoints_match() {
        let curve = SubdivisionCurve::new(square(), 2).unwrap();
        assert_eq!(curve.point_at(0.0), curve.point_at(1.0));
        assert!(curve.is_closed());
        assert_eq!(curve.domain(), CurveDomain::closed(0.0, 1.0));
    }

    #[test]
    fn test_evaluate_interpolates_linearly() {
        let curve = SubdivisionCurve::new(square(), 1).unwrap();
        // 8 points, so the first segment spans t in [0, 1/7]
        let p = curve.point_at(0.5 / 7.0);
        assert!((p - dvec3(-0.5, -1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_evaluate_central_difference() {
        let curve = SubdivisionCurve::new(square(), 1).unwrap();
        let eval = curve.evaluate(0.0, 2);
        assert!((eval[1] - dvec3(0.5, 0.0, 0.0)).length() < 1e-12);
        assert_eq!(eval[2], DVec3::ZERO);
    }

    #[test]
    fn test_evaluate_wraps_parameter() {
        let curve = SubdivisionCurve::new(square(), 3).unwrap();
        for &t in &[0.1, 0.45, 0.8] {
            let p = curve.point_at(t);
            assert!((curve.point_at(t - 1.0) - p).length() < 1e-12);
            assert!((curve.point_at(t + 2.0) - p).length() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_oversized_refinement() {
        assert!(matches!(
            SubdivisionCurve::new(square(), 40),
            Err(CurveError::Geometry(_))
        ));
        assert!(matches!(
            SubdivisionCurve::new(square(), 200),
            Err(CurveError::Geometry(_))
        ));
        assert!(SubdivisionCurve::new(square(), 10).is_ok());
    }

    #[test]
    fn test_refined_len_limits() {
        assert_eq!(refined_len(4, 3), Some(32));
        assert_eq!(refined_len(4, 20), Some(MAX_REFINED_POINTS));
        assert_eq!(refined_len(4, 21), None);
        assert_eq!(refined_len(1, 64), None);
    }

    #[test]
    fn test_serde_round_trip_recomputes_points() {
        let curve = SubdivisionCurve::new(square(), 3).unwrap();
        let json = serde_json::to_string(&curve).unwrap();
        assert!(!json.contains("points\""));
        let restored: SubdivisionCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.subdivided_points(), curve.subdivided_points());
        restored.validate().unwrap();
    }

    #[test]
    fn test_deserialize_rejects_invalid_input() {
        let with_points = r#"{"control_polygon":[[0,0,0]],"degree":1,"points":[]}"#;
        assert!(serde_json::from_str::<SubdivisionCurve>(with_points).is_err());

        let empty = r#"{"control_polygon":[],"degree":2}"#;
        assert!(serde_json::from_str::<SubdivisionCurve>(empty).is_err());

        let zero_degree = r#"{"control_polygon":[[0,0,0],[1,0,0]],"degree":0}"#;
        assert!(serde_json::from_str::<SubdivisionCurve>(zero_degree).is_err());
    }

    #[test]
    fn test_single_point_polygon() {
        let curve = SubdivisionCurve::new(vec![DVec3::ONE], 3).unwrap();
        assert!(curve.subdivided_points().iter().all(|&p| p == DVec3::ONE));
        assert_eq!(curve.point_at(0.3), DVec3::ONE);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(matches!(
            SubdivisionCurve::new(Vec::new(), 2),
            Err(CurveError::Geometry(_))
        ));
        assert!(matches!(
            SubdivisionCurve::new(square(), 0),
            Err(CurveError::InvalidOperation(_))
        ));
    }
}
