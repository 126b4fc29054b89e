//! Knot vectors and B-spline basis functions.

use std::ops::Index;

use pcurve_core::traits::Validate;
use pcurve_core::{CurveError, Result};

/// A non-decreasing knot sequence of length `n + degree + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVector {
    degree: usize,
    knots: Vec<f64>,
}

impl KnotVector {
    /// Build a clamped uniform knot vector for `n` control points.
    ///
    /// The first and last `degree + 1` knots are repeated so the curve
    /// interpolates its end control points; the interior knots are the
    /// consecutive integers `1, 2, ...`. Callers must supply
    /// `n >= degree + 1`, otherwise the vector is degenerate.
    pub fn clamped_uniform(n: usize, degree: usize) -> Self {
        let m = n + degree + 1;
        let max_value = (m as i64 - 2 * (degree as i64 + 1) + 1) as f64;

        let mut knots = vec![0.0; m];
        for (i, knot) in knots
            .iter_mut()
            .enumerate()
            .take(m.saturating_sub(degree + 1))
            .skip(degree + 1)
        {
            *knot = (i - degree) as f64;
        }
        for knot in knots.iter_mut().skip(m - (degree + 1)) {
            *knot = max_value;
        }

        Self { degree, knots }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.knots
    }

    pub fn first(&self) -> Option<f64> {
        self.knots.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.knots.last().copied()
    }

    /// Number of control points this knot vector supports.
    pub fn control_point_count(&self) -> usize {
        self.knots.len().saturating_sub(self.degree + 1)
    }

    /// Valid parameter range, excluding the repeated boundary knots.
    pub fn domain(&self) -> (f64, f64) {
        let p = self.degree;
        (self.knots[p], self.knots[self.knots.len() - p - 1])
    }
}

impl Index<usize> for KnotVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.knots[i]
    }
}

impl Validate for KnotVector {
    fn validate(&self) -> Result<()> {
        let order = self.degree + 1;
        if self.knots.len() < 2 * order {
            return Err(CurveError::Tolerance(format!(
                "knot vector of degree {} needs at least {} knots, got {}",
                self.degree,
                2 * order,
                self.knots.len()
            )));
        }
        if let Some(i) = self.knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(CurveError::Tolerance(format!(
                "knot vector decreases at index {}: {} > {}",
                i + 1,
                self.knots[i],
                self.knots[i + 1]
            )));
        }
        let head = &self.knots[..order];
        let tail = &self.knots[self.knots.len() - order..];
        if head.iter().any(|&k| Some(k) != self.first())
            || tail.iter().any(|&k| Some(k) != self.last())
        {
            return Err(CurveError::Tolerance(
                "knot vector is not clamped at both ends".into(),
            ));
        }
        Ok(())
    }
}

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`; parameters at
/// or past `knots[n + 1]` map to the last span `n` (the last control-point index).
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    // Binary search
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns a vector of `degree + 1` basis function values N_{span-degree,degree}(t)
/// through N_{span,degree}(t).
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Evaluate a single basis function N_{i,degree}(t) by the Cox–de Boor recursion.
///
/// Terms whose denominator is exactly zero (repeated knots) contribute
/// nothing. At the final knot value the last non-empty span is treated as
/// closed on the right, so a clamped curve is defined at its end point.
pub fn basis(knots: &[f64], i: usize, degree: usize, t: f64) -> f64 {
    if degree == 0 {
        let in_span = knots[i] <= t && t < knots[i + 1];
        let at_end = t == knots[knots.len() - 1] && last_nonempty_span(knots) == Some(i);
        return if in_span || at_end { 1.0 } else { 0.0 };
    }

    let denom1 = knots[i + degree] - knots[i];
    let term1 = if denom1 != 0.0 {
        (t - knots[i]) / denom1 * basis(knots, i, degree - 1, t)
    } else {
        0.0
    };

    let denom2 = knots[i + degree + 1] - knots[i + 1];
    let term2 = if denom2 != 0.0 {
        (knots[i + degree + 1] - t) / denom2 * basis(knots, i + 1, degree - 1, t)
    } else {
        0.0
    };

    term1 + term2
}

/// Evaluate the `order`-th derivative of N_{i,degree}(t).
///
/// Uses the derivative recursion
/// `N' = p * (N_{i,p-1} / (u_{i+p} - u_i) - N_{i+1,p-1} / (u_{i+p+1} - u_{i+1}))`
/// with the same zero-denominator guard as [`basis`]. Derivatives above
/// `degree` are identically zero.
pub fn basis_derivative(knots: &[f64], i: usize, degree: usize, t: f64, order: usize) -> f64 {
    if order == 0 {
        return basis(knots, i, degree, t);
    }
    if degree == 0 {
        return 0.0;
    }

    let denom1 = knots[i + degree] - knots[i];
    let term1 = if denom1 != 0.0 {
        basis_derivative(knots, i, degree - 1, t, order - 1) / denom1
    } else {
        0.0
    };

    let denom2 = knots[i + degree + 1] - knots[i + 1];
    let term2 = if denom2 != 0.0 {
        basis_derivative(knots, i + 1, degree - 1, t, order - 1) / denom2
    } else {
        0.0
    };

    degree as f64 * (term1 - term2)
}

fn last_nonempty_span(knots: &[f64]) -> Option<usize> {
    knots.windows(2).rposition(|w| w[0] < w[1])
}
