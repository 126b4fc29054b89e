//! Tessellation utilities for converting curves to discrete representations.

use log::trace;
use pcurve_core::traits::BoundingBox;
use pcurve_core::{CurveError, Result};
use pcurve_math::{Aabb3, Point3};
use rayon::prelude::*;

use crate::curve::{Evaluation, ParametricCurve};

/// Curve evaluations at uniformly spaced parameters.
#[derive(Debug, Clone)]
pub struct Tessellation {
    pub parameters: Vec<f64>,
    pub samples: Vec<Evaluation>,
}

impl Tessellation {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample positions in parameter order.
    pub fn points(&self) -> Vec<Point3> {
        self.samples.iter().map(Evaluation::position).collect()
    }

    /// Bounding box of the sampled positions.
    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.points())
    }
}

impl BoundingBox for Tessellation {
    type Point = Point3;

    fn bounding_box(&self) -> Option<(Point3, Point3)> {
        self.bounds().map(|aabb| (aabb.min, aabb.max))
    }
}

/// Evaluate `curve` at `count` parameters spread uniformly over its domain.
///
/// Both domain ends are included, so a closed curve yields a polyline whose
/// last point repeats its first. Each sample holds `d` derivatives.
///
/// # Arguments
/// * `curve` - The curve to sample
/// * `count` - Number of samples, at least 2
/// * `d` - Derivative order to evaluate at each sample
pub fn sample_uniform(curve: &dyn ParametricCurve, count: usize, d: usize) -> Result<Tessellation> {
    if count < 2 {
        return Err(CurveError::InvalidOperation(format!(
            "uniform sampling needs at least 2 samples, got {}",
            count
        )));
    }

    let domain = curve.domain();
    let last = (count - 1) as f64;
    let parameters: Vec<f64> = (0..count)
        .map(|i| domain.parameter_at(i as f64 / last))
        .collect();

    trace!(
        "sampling {} parameters over [{}, {}]",
        count,
        domain.start,
        domain.end
    );

    let samples = parameters
        .par_iter()
        .map(|&t| curve.evaluate(t, d))
        .collect();

    Ok(Tessellation {
        parameters,
        samples,
    })
}

/// Convert a curve to a polyline using adaptive subdivision.
///
/// The algorithm recursively subdivides segments where the midpoint deviation
/// from the chord exceeds the given `tolerance`.
///
/// # Arguments
/// * `curve` - The curve to tessellate
/// * `tolerance` - Maximum allowed deviation from the true curve
pub fn curve_to_polyline(curve: &dyn ParametricCurve, tolerance: f64) -> Vec<Point3> {
    let domain = curve.domain();
    let mut points = vec![curve.point_at(domain.start)];

    // A closed curve's chord from start to end is degenerate, so split first
    let pieces = if domain.closed { 4 } else { 1 };
    for k in 0..pieces {
        let t0 = domain.parameter_at(k as f64 / pieces as f64);
        let t1 = domain.parameter_at((k + 1) as f64 / pieces as f64);
        subdivide_curve(curve, t0, t1, tolerance, &mut points, 0);
    }

    trace!("adaptive polyline: {} points", points.len());
    points
}

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

fn subdivide_curve(
    curve: &dyn ParametricCurve,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<Point3>,
    depth: u32,
) {
    if depth >= MAX_DEPTH {
        points.push(curve.point_at(t1));
        return;
    }

    let t_mid = (t0 + t1) * 0.5;
    let p0 = curve.point_at(t0);
    let p1 = curve.point_at(t1);
    let p_mid = curve.point_at(t_mid);

    let chord_mid = (p0 + p1) * 0.5;
    let deviation = (p_mid - chord_mid).length();

    if deviation > tolerance {
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1);
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1);
    } else {
        points.push(p1);
    }
}
