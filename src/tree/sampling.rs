//! Attribute preprocessing applied before each split attempt.
//!
//! Random forests evaluate only a random subset of the candidate attributes
//! at every node. The generator is passed in by the caller so that a seeded
//! run always draws the same subsets.

use crate::core::types::AttributeIndex;
use rand::rngs::StdRng;
use rand::seq::index;
use std::fmt::Debug;

/// Reduces the candidate attributes of a node.
///
/// Implementations must keep at least one attribute of a non-empty input.
pub trait AttributePreprocessing: Send + Sync + Debug {
    fn preprocess(&self, attributes: &[AttributeIndex], rng: &mut StdRng) -> Vec<AttributeIndex>;
}

/// Keeps `max(1, round(ratio · n))` attributes drawn without replacement,
/// returned in ascending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomAttributeSubset {
    ratio: f64,
}

impl RandomAttributeSubset {
    pub fn new(ratio: f64) -> Self {
        RandomAttributeSubset {
            ratio: ratio.clamp(0.0, 1.0),
        }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Number of attributes kept out of `n`.
    pub fn subset_size(&self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.ratio * n as f64).round() as usize).clamp(1, n)
    }
}

impl AttributePreprocessing for RandomAttributeSubset {
    fn preprocess(&self, attributes: &[AttributeIndex], rng: &mut StdRng) -> Vec<AttributeIndex> {
        let size = self.subset_size(attributes.len());
        let mut positions = index::sample(rng, attributes.len(), size).into_vec();
        positions.sort_unstable();
        positions.into_iter().map(|p| attributes[p]).collect()
    }
}
