//! Torus knot curve.

use std::f64::consts::PI;

use pcurve_math::DVec3;
use serde::{Deserialize, Serialize};

use super::{CurveDomain, Evaluation, ParametricCurve};

/// A (p, q) torus knot with unit tube radius.
///
/// ```text
/// x = (R + cos(q t)) cos(p t)
/// y = (R + cos(q t)) sin(p t)
/// z = sin(q t)
/// ```
///
/// Position, velocity, and acceleration are exact; higher derivative slots
/// are left as zero vectors. The domain is `[0, 2*PI*q]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TorusKnot {
    pub major_radius: f64,
    pub p: u32,
    pub q: u32,
}

impl TorusKnot {
    pub fn new(major_radius: f64, p: u32, q: u32) -> Self {
        Self { major_radius, p, q }
    }
}

impl Default for TorusKnot {
    /// The (2, 3) trefoil on a torus of major radius 2, over `[0, 6*PI]`.
    fn default() -> Self {
        Self::new(2.0, 2, 3)
    }
}

impl ParametricCurve for TorusKnot {
    fn evaluate(&self, t: f64, d: usize) -> Evaluation {
        let t = self.domain().wrap(t);
        let r = self.major_radius;
        let p = self.p as f64;
        let q = self.q as f64;

        let (sin_p, cos_p) = (p * t).sin_cos();
        let (sin_q, cos_q) = (q * t).sin_cos();

        // Envelope e = R + cos(qt) scales the carrier (cos(pt), sin(pt))
        let envelope = r + cos_q;
        let d_envelope = -q * sin_q;
        let dd_envelope = -q * q * cos_q;

        let mut eval = Evaluation::zeroed(d);
        eval[0] = DVec3::new(envelope * cos_p, envelope * sin_p, sin_q);

        if d > 0 {
            eval[1] = DVec3::new(
                -p * envelope * sin_p + d_envelope * cos_p,
                p * envelope * cos_p + d_envelope * sin_p,
                q * cos_q,
            );
        }

        if d > 1 {
            // (e c)'' = e'' c + 2 e' c' + e c''
            let xpp = dd_envelope * cos_p - 2.0 * p * d_envelope * sin_p - p * p * envelope * cos_p;
            let ypp = dd_envelope * sin_p + 2.0 * p * d_envelope * cos_p - p * p * envelope * sin_p;
            eval[2] = DVec3::new(xpp, ypp, -q * q * sin_q);
        }

        eval
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::closed(0.0, 2.0 * PI * self.q as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_domain() {
        let knot = TorusKnot::default();
        let domain = knot.domain();
        assert_eq!(domain.start, 0.0);
        assert_abs_diff_eq!(domain.end, 6.0 * PI, epsilon = 1e-12);
        assert!(knot.is_closed());
    }

    #[test]
    fn test_start_position() {
        // t = 0: (R + 1, 0, 0)
        let p = TorusKnot::default().point_at(0.0);
        assert_abs_diff_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_periodic_over_domain() {
        let knot = TorusKnot::default();
        let end = knot.domain().end;
        let a = knot.point_at(0.0);
        let b = knot.point_at(end);
        assert!((a - b).length() < 1e-9);
    }

    #[test]
    fn test_wraps_parameter_outside_domain() {
        let knot = TorusKnot::default();
        let span = knot.domain().span();
        for &t in &[0.3, 4.0, 15.2] {
            let expected = knot.evaluate(t, 2);
            for shifted in [t - span, t + 2.0 * span] {
                let eval = knot.evaluate(shifted, 2);
                for k in 0..=2 {
                    assert!((eval[k] - expected[k]).length() < 1e-9, "t={} k={}", shifted, k);
                }
            }
        }
    }

    #[test]
    fn test_lies_on_torus() {
        let knot = TorusKnot::default();
        for i in 0..50 {
            let t = i as f64 * 0.37;
            let p = knot.point_at(t);
            let ring = (p.x * p.x + p.y * p.y).sqrt() - 2.0;
            assert_abs_diff_eq!(ring * ring + p.z * p.z, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_velocity_matches_finite_difference() {
        let knot = TorusKnot::default();
        let h = 1e-4;
        for &t in &[0.0, 0.7, 2.3, 5.1, 11.0, 17.5] {
            let fd = (knot.point_at(t + h) - knot.point_at(t - h)) / (2.0 * h);
            let v = knot.evaluate(t, 1)[1];
            assert!((v - fd).length() < 1e-3, "t={}: {:?} vs {:?}", t, v, fd);
        }
    }

    #[test]
    fn test_acceleration_matches_finite_difference() {
        let knot = TorusKnot::new(3.0, 3, 5);
        let h = 1e-4;
        for &t in &[0.2, 1.9, 4.4] {
            let fd = (knot.tangent_at(t + h) - knot.tangent_at(t - h)) / (2.0 * h);
            let a = knot.evaluate(t, 2)[2];
            assert!((a - fd).length() < 1e-3, "t={}: {:?} vs {:?}", t, a, fd);
        }
    }

    #[test]
    fn test_evaluation_order() {
        let knot = TorusKnot::default();
        assert_eq!(knot.evaluate(1.0, 0).order(), 0);
        let eval = knot.evaluate(1.0, 3);
        assert_eq!(eval.order(), 3);
        assert_eq!(eval[3], DVec3::ZERO);
    }
}
