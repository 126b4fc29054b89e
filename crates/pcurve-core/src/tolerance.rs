/// Tolerance for least-squares fitting.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Relative cutoff below which a singular value counts as rank loss
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;

    pub fn new(linear: f64) -> Self {
        Self { linear }
    }

    pub fn default_precision() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
        }
    }

    pub fn loose() -> Self {
        Self { linear: 1e-4 }
    }

    pub fn tight() -> Self {
        Self { linear: 1e-10 }
    }

    /// Check if `value` is negligible relative to `scale`.
    ///
    /// Used as the singular-value cutoff when deciding the numerical rank
    /// of a least-squares system.
    pub fn is_negligible(self, value: f64, scale: f64) -> bool {
        value.abs() <= self.linear * scale.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_ordering() {
        assert!(Tolerance::tight().linear < Tolerance::default().linear);
        assert!(Tolerance::default().linear < Tolerance::loose().linear);
    }

    #[test]
    fn test_is_negligible_is_relative() {
        let tol = Tolerance::new(1e-6);
        assert!(tol.is_negligible(1e-3, 1e4));
        assert!(!tol.is_negligible(1e-3, 1.0));
        assert!(tol.is_negligible(0.0, 0.0));
    }
}
