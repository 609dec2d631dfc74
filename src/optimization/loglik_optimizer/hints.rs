//! Uncertainty hints (`dpos`) attached to an initial parameter guess.
//!
//! A hint is a rough per-parameter width. It is only ever used to scale
//! initial dispersion (sampler walkers, Nelder–Mead simplex), so it does not
//! need to be accurate. An entry counts as "no guess" when it is `None`,
//! non-positive, or non-finite.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::types::Theta,
};

/// Per-parameter uncertainty guesses, one slot per entry of `θ`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UncertaintyHints(Vec<Option<f64>>);

impl UncertaintyHints {
    pub fn new(hints: Vec<Option<f64>>) -> Self {
        Self(hints)
    }

    /// Build hints from plain values; non-positive values become "no guess".
    pub fn from_values(values: &[f64]) -> Self {
        Self(values.iter().map(|&v| Some(v)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Usable hint for parameter `index`, if any.
    ///
    /// Returns `None` for out-of-range indices, missing entries, and entries
    /// that are non-positive or non-finite.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0
            .get(index)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && *v > 0.0)
    }

    /// Fail fast when the hints do not have one entry per parameter.
    pub fn check_dim(&self, dim: usize) -> OptResult<()> {
        if self.0.len() != dim {
            return Err(OptError::HintsLengthMismatch { expected: dim, found: self.0.len() });
        }
        Ok(())
    }

    /// Per-parameter widths: `scale · hint` where a hint is usable,
    /// `fallback` everywhere else.
    pub fn widths(&self, dim: usize, scale: f64, fallback: f64) -> Theta {
        Theta::from_shape_fn(dim, |i| self.get(i).map_or(fallback, |d| d * scale))
    }
}

/// Widths for an optional set of hints; absent hints fall back everywhere.
pub fn widths_or_default(
    hints: Option<&UncertaintyHints>, dim: usize, scale: f64, fallback: f64,
) -> Theta {
    match hints {
        Some(h) => h.widths(dim, scale, fallback),
        None => Theta::from_elem(dim, fallback),
    }
}

/// Validate an optional set of hints against the parameter dimension.
pub fn check_hints(hints: Option<&UncertaintyHints>, dim: usize) -> OptResult<()> {
    match hints {
        Some(h) => h.check_dim(dim),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Non-positive, non-finite and missing entries must all read as
    // "no guess".
    //
    // Given
    // -----
    // - Hints `[Some(0.5), None, Some(0.0), Some(-1.0), Some(NaN)]`.
    //
    // Expect
    // ------
    // - Only index 0 yields a usable hint.
    fn get_filters_sentinel_entries() {
        // Arrange
        let hints =
            UncertaintyHints::new(vec![Some(0.5), None, Some(0.0), Some(-1.0), Some(f64::NAN)]);

        // Act
        let usable: Vec<Option<f64>> = (0..5).map(|i| hints.get(i)).collect();

        // Assert
        assert_eq!(usable, vec![Some(0.5), None, None, None, None]);
    }

    #[test]
    // Purpose
    // -------
    // Verify the width rule used to seed the sampler: `0.1 · hint` where a
    // hint exists, `0.01` otherwise.
    //
    // Given
    // -----
    // - Hints `[2.0, -1.0]`, scale 0.1, fallback 0.01.
    //
    // Expect
    // ------
    // - Widths `[0.2, 0.01]`.
    fn widths_apply_scale_and_fallback() {
        // Arrange
        let hints = UncertaintyHints::from_values(&[2.0, -1.0]);

        // Act
        let widths = hints.widths(2, 0.1, 0.01);

        // Assert
        assert!((widths[0] - 0.2).abs() < 1e-15);
        assert_eq!(widths[1], 0.01);
        assert_eq!(widths_or_default(None, 2, 0.1, 0.01), array![0.01, 0.01]);
    }

    #[test]
    // Purpose
    // -------
    // A dimension mismatch must fail fast instead of being padded.
    //
    // Given
    // -----
    // - Two hints checked against three parameters.
    //
    // Expect
    // ------
    // - `HintsLengthMismatch { expected: 3, found: 2 }`.
    fn check_dim_rejects_mismatch() {
        // Arrange
        let hints = UncertaintyHints::from_values(&[1.0, 1.0]);

        // Act
        let err = check_hints(Some(&hints), 3).unwrap_err();

        // Assert
        assert_eq!(err, OptError::HintsLengthMismatch { expected: 3, found: 2 });
    }
}
