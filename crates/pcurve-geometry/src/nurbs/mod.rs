//! B-spline core algorithms: knot vectors, basis functions, and least-squares fitting.

pub mod fit;
pub mod knot;

pub use fit::{basis_matrix, fit_control_points};
pub use knot::{basis, basis_derivative, basis_functions, find_span, KnotVector};
