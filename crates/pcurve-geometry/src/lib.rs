//! Parametric curve evaluation: quadratic B-splines, closed subdivision
//! curves, and analytic torus knots.

pub mod curve;
pub mod nurbs;
pub mod tessellate;

pub use curve::{
    BSplineCurve, CurveDomain, Evaluation, ParametricCurve, SubdivisionCurve, TorusKnot,
};
pub use nurbs::KnotVector;
