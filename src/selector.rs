//! # GeneSelector
//!
//! The `GeneSelector` answers "pick one weighted gene position" queries. It is
//! built from the engine's per-position weight vector, precomputes a
//! cumulative-sum array once in O(n), and serves each draw in O(log n) via
//! binary search.
//!
//! The selector is fitness-agnostic: it samples *gene positions*, not
//! individuals. It is handed to the variation operators so that crossover cut
//! points and mutation targets are biased toward the positions the adaptive
//! tuning controller currently considers important.
//!
//! ## Example
//!
//! ```rust
//! use genepool::rng::RandomNumberGenerator;
//! use genepool::selector::GeneSelector;
//!
//! let selector = GeneSelector::new(&[1.0, 2.0, 3.0]).unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let index = selector.pick_index(&mut rng);
//! assert!(index < 3);
//! ```

use crate::error::{GeneticError, Result};
use crate::rng::RandomNumberGenerator;

/// Samples gene positions with probability proportional to their weight.
#[derive(Debug, Clone)]
pub struct GeneSelector {
    /// `cumulative[i]` is the sum of the weights of positions `0..=i`.
    cumulative: Vec<f64>,
    total: f64,
}

impl GeneSelector {
    /// Builds a selector from a vector of relative weights.
    ///
    /// The weights do not need to sum to 1; they are consumed as relative
    /// values. Construction rejects empty vectors and non-finite or
    /// non-positive weights, which is what guarantees that `pick_index` can
    /// always bracket a draw.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::Configuration` for an empty vector and
    /// `GeneticError::InvalidNumericValue` for a weight that is not a finite
    /// positive number.
    pub fn new(weights: &[f64]) -> Result<Self> {
        if weights.is_empty() {
            return Err(GeneticError::Configuration(
                "Gene weight vector cannot be empty".to_string(),
            ));
        }

        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0.0;
        for (position, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(GeneticError::InvalidNumericValue(format!(
                    "Gene weight at position {} must be a finite positive number, got {}",
                    position, weight
                )));
            }
            total += weight;
            cumulative.push(total);
        }

        Ok(Self { cumulative, total })
    }

    /// Returns the number of gene positions this selector was built over.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// Always `false`: construction rejects empty weight vectors.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Draws one gene position, with probability proportional to its weight.
    ///
    /// Runs in O(log n). A draw that cannot be bracketed would mean the
    /// cumulative array is inconsistent, which construction rules out; that
    /// case is a programming-invariant violation and panics.
    pub fn pick_index(&self, rng: &mut RandomNumberGenerator) -> usize {
        let draw = rng.uniform() * self.total;

        let mut start = 0usize;
        let mut end = self.cumulative.len() - 1;
        while start <= end {
            let mid = (start + end) / 2;
            // The lower boundary has no predecessor to bracket against.
            if mid == 0 {
                return 0;
            }
            if draw < self.cumulative[mid] && draw >= self.cumulative[mid - 1] {
                return mid;
            }
            if self.cumulative[mid] < draw {
                start = mid + 1;
            } else {
                end = mid - 1;
            }
        }

        unreachable!("cumulative weight array failed to bracket draw {draw}")
    }
}
