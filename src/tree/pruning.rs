//! Post-pruning of finished trees.
//!
//! The pessimistic pruner walks the tree bottom-up and replaces an internal
//! node whose children are all leaves by a single leaf when the upper
//! confidence bound of its error rate is not worse than that of its children.

use crate::core::constants::{PRUNE_PREFERENCE, ZERO_ERROR_RATE};
use crate::core::types::LabelKind;
use crate::core::utils::normal_inverse;
use crate::tree::node::Leaf;
use crate::tree::tree::Tree;
use std::fmt::Debug;

/// Simplifies a finished tree in place.
pub trait Pruner: Send + Sync + Debug {
    /// Returns the number of internal nodes collapsed into leaves.
    fn prune(&self, tree: &mut Tree) -> usize;
}

/// Pessimistic error pruning for classification trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PessimisticPruner {
    confidence: f64,
    z: f64,
}

impl PessimisticPruner {
    /// Creates a pruner for a confidence level in `(0, 0.5]`.
    pub fn new(confidence: f64) -> Self {
        PessimisticPruner {
            confidence,
            z: normal_inverse(1.0 - confidence),
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Upper confidence bound of an error rate observed on `total` rows.
    ///
    /// Uses `1 - CF^(1/n)` when no error was observed, a linear fallback when
    /// the continuity-corrected error count reaches the sample size, and the
    /// continuity-corrected normal approximation otherwise.
    pub fn pessimistic_error(&self, error_rate: f64, total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        let errors = error_rate * total;
        if error_rate < ZERO_ERROR_RATE {
            return error_rate + (1.0 - self.confidence.powf(1.0 / total));
        }
        if errors + 0.5 >= total {
            return error_rate + 0.67 * (1.0 - error_rate);
        }

        let z = self.z;
        let f = (errors + 0.5) / total;
        let numerator = f + z * z / (2.0 * total)
            + z * (f / total - f * f / total + z * z / (4.0 * total * total)).sqrt();
        numerator / (1.0 + z * z / total)
    }

    /// Pessimistic error rate of a leaf.
    pub fn leaf_error(&self, leaf: &Leaf) -> f64 {
        let total = leaf.num_rows();
        if total == 0 {
            return 0.0;
        }
        self.pessimistic_error(leaf.errors() as f64 / total as f64, total as f64)
    }

    /// Children's pessimistic error rates weighted by their share of rows.
    pub fn children_error(&self, children: &[&Leaf]) -> f64 {
        let total: usize = children.iter().map(|leaf| leaf.num_rows()).sum();
        if total == 0 {
            return 0.0;
        }
        children
            .iter()
            .map(|leaf| leaf.num_rows() as f64 / total as f64 * self.leaf_error(leaf))
            .sum()
    }
}

/// Leaf predicting the majority over the union of the children's counts.
fn merge_leaves(children: &[&Leaf]) -> Option<Leaf> {
    let mut merged: Vec<usize> = Vec::new();
    for leaf in children {
        let counts = leaf.class_counts()?;
        if merged.len() < counts.len() {
            merged.resize(counts.len(), 0);
        }
        for (sum, count) in merged.iter_mut().zip(counts) {
            *sum += count;
        }
    }
    Some(Leaf::from_class_counts(merged))
}

impl Pruner for PessimisticPruner {
    fn prune(&self, tree: &mut Tree) -> usize {
        if tree.label_kind() != LabelKind::Nominal {
            log::warn!("Pessimistic pruning only applies to nominal labels, skipping it");
            return 0;
        }

        let mut collapsed = 0;
        // Children always have larger indices, so reverse order is post-order.
        for index in (0..tree.num_nodes()).rev() {
            let nodes = tree.nodes();
            let node = &nodes[index];
            if node.is_leaf() {
                continue;
            }
            let children: Option<Vec<&Leaf>> = node
                .edges()
                .iter()
                .map(|edge| nodes[edge.child].leaf())
                .collect();
            let children = match children {
                Some(children) => children,
                None => continue,
            };
            let merged = match merge_leaves(&children) {
                Some(merged) => merged,
                None => continue,
            };

            let first_class = children.first().and_then(|leaf| leaf.class());
            let same_class = children.iter().all(|leaf| leaf.class() == first_class);
            let collapse = same_class || {
                let own = self.leaf_error(&merged);
                own - PRUNE_PREFERENCE <= self.children_error(&children)
            };

            if collapse {
                log::debug!(
                    "Pruning node {} ({} rows, {} children)",
                    index,
                    node.num_rows(),
                    children.len()
                );
                tree.nodes_mut()[index].collapse(merged);
                collapsed += 1;
            }
        }

        if collapsed > 0 {
            tree.compact();
        }
        collapsed
    }
}
