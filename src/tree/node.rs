//! Tree node types.
//!
//! A node is either a leaf carrying a prediction and its statistics, or an
//! internal node carrying the winning split score and an ordered list of
//! `(condition, child)` edges. Children are referenced by arena index.

use crate::core::types::{AttributeIndex, NodeIndex};
use crate::dataset::Attribute;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Test attached to an edge of an internal node.
///
/// Attribute indices refer to the columns of the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitCondition {
    /// Nominal value equals a category, or is missing when `category` is `None`.
    NominalEquals {
        attribute: AttributeIndex,
        category: Option<usize>,
    },
    /// Numeric value is present and `<= threshold`.
    LessOrEqual {
        attribute: AttributeIndex,
        threshold: f64,
    },
    /// Numeric value is present and `> threshold`.
    Greater {
        attribute: AttributeIndex,
        threshold: f64,
    },
    /// Numeric value is missing.
    IsMissing { attribute: AttributeIndex },
}

impl SplitCondition {
    /// Source attribute tested by this condition.
    pub fn attribute(&self) -> AttributeIndex {
        match *self {
            SplitCondition::NominalEquals { attribute, .. }
            | SplitCondition::LessOrEqual { attribute, .. }
            | SplitCondition::Greater { attribute, .. }
            | SplitCondition::IsMissing { attribute } => attribute,
        }
    }

    /// Tests a raw attribute value (`NaN` = missing).
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            SplitCondition::NominalEquals {
                category: Some(category),
                ..
            } => !value.is_nan() && value as usize == category,
            SplitCondition::NominalEquals { category: None, .. } => value.is_nan(),
            SplitCondition::LessOrEqual { threshold, .. } => !value.is_nan() && value <= threshold,
            SplitCondition::Greater { threshold, .. } => !value.is_nan() && value > threshold,
            SplitCondition::IsMissing { .. } => value.is_nan(),
        }
    }

    /// Relation and value, e.g. `"<= 3.5"` or `"= sunny"`.
    ///
    /// Edges of a node are ordered by this key.
    pub fn canonical_key(&self, attribute: &Attribute) -> String {
        match *self {
            SplitCondition::NominalEquals {
                category: Some(category),
                ..
            } => match attribute.category_name(category) {
                Some(name) => format!("= {}", name),
                None => format!("= #{}", category),
            },
            SplitCondition::NominalEquals { category: None, .. } => "= ?".to_string(),
            SplitCondition::LessOrEqual { threshold, .. } => format!("<= {}", threshold),
            SplitCondition::Greater { threshold, .. } => format!("> {}", threshold),
            SplitCondition::IsMissing { .. } => "is missing".to_string(),
        }
    }
}

/// Predicted label of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    /// Class index of a nominal label
    Class(usize),
    /// Value of a numeric label
    Value(f64),
}

/// Statistics recorded at a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafStatistics {
    /// Number of rows per class
    ClassCounts(Vec<usize>),
    /// Number of rows (numeric labels)
    Count(usize),
}

/// Terminal node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub prediction: Prediction,
    pub statistics: LeafStatistics,
}

impl Leaf {
    /// Number of rows that reached the leaf.
    pub fn num_rows(&self) -> usize {
        match &self.statistics {
            LeafStatistics::ClassCounts(counts) => counts.iter().sum(),
            LeafStatistics::Count(count) => *count,
        }
    }

    /// Per-class row counts, `None` for numeric labels.
    pub fn class_counts(&self) -> Option<&[usize]> {
        match &self.statistics {
            LeafStatistics::ClassCounts(counts) => Some(counts),
            LeafStatistics::Count(_) => None,
        }
    }

    /// Predicted class index, `None` for numeric labels.
    pub fn class(&self) -> Option<usize> {
        match self.prediction {
            Prediction::Class(class) => Some(class),
            Prediction::Value(_) => None,
        }
    }

    /// Rows not belonging to the predicted class.
    pub fn errors(&self) -> usize {
        match (&self.statistics, self.prediction) {
            (LeafStatistics::ClassCounts(counts), Prediction::Class(class)) => {
                counts.iter().sum::<usize>() - counts.get(class).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Classification leaf predicting the majority of `counts`.
    ///
    /// Ties go to the lower class index.
    pub fn from_class_counts(counts: Vec<usize>) -> Self {
        let mut best = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = class;
            }
        }
        Leaf {
            prediction: Prediction::Class(best),
            statistics: LeafStatistics::ClassCounts(counts),
        }
    }
}

/// Outgoing edge of an internal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub condition: SplitCondition,
    pub child: NodeIndex,
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf(Leaf),
    Split {
        /// Source attribute split upon
        attribute: AttributeIndex,
        /// Benefit score of the winning split
        score: f64,
        edges: Vec<Edge>,
    },
}

/// A node of the tree arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    depth: usize,
    num_rows: usize,
    kind: NodeKind,
}

impl TreeNode {
    /// Creates a leaf node.
    pub fn new_leaf(depth: usize, leaf: Leaf) -> Self {
        TreeNode {
            depth,
            num_rows: leaf.num_rows(),
            kind: NodeKind::Leaf(leaf),
        }
    }

    /// Creates an internal node. Edges must already be in canonical order.
    pub fn new_split(
        depth: usize,
        num_rows: usize,
        attribute: AttributeIndex,
        score: f64,
        edges: Vec<Edge>,
    ) -> Self {
        TreeNode {
            depth,
            num_rows,
            kind: NodeKind::Split {
                attribute,
                score,
                edges,
            },
        }
    }

    /// Depth of the node (the root has depth 1).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of training rows that reached the node.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Leaf payload, `None` for internal nodes.
    pub fn leaf(&self) -> Option<&Leaf> {
        match &self.kind {
            NodeKind::Leaf(leaf) => Some(leaf),
            NodeKind::Split { .. } => None,
        }
    }

    /// Outgoing edges, empty for leaves.
    pub fn edges(&self) -> &[Edge] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Split { edges, .. } => edges,
        }
    }

    /// Winning split score, `None` for leaves.
    pub fn score(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Split { score, .. } => Some(score),
        }
    }

    /// Source attribute split upon, `None` for leaves.
    pub fn split_attribute(&self) -> Option<AttributeIndex> {
        match self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Split { attribute, .. } => Some(attribute),
        }
    }

    /// Replaces the node by a leaf, detaching its children.
    pub(crate) fn collapse(&mut self, leaf: Leaf) {
        self.kind = NodeKind::Leaf(leaf);
    }

    pub(crate) fn remap_children(&mut self, map: impl Fn(NodeIndex) -> NodeIndex) {
        if let NodeKind::Split { edges, .. } = &mut self.kind {
            for edge in edges.iter_mut() {
                edge.child = map(edge.child);
            }
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Class(class) => write!(f, "class {}", class),
            Prediction::Value(value) => write!(f, "{:.4}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_matching() {
        let le = SplitCondition::LessOrEqual {
            attribute: 0,
            threshold: 3.5,
        };
        let gt = SplitCondition::Greater {
            attribute: 0,
            threshold: 3.5,
        };
        let missing = SplitCondition::IsMissing { attribute: 0 };

        assert!(le.matches(3.5));
        assert!(!le.matches(f64::NAN));
        assert!(gt.matches(4.0));
        assert!(!gt.matches(3.5));
        assert!(missing.matches(f64::NAN));
        assert!(!missing.matches(1.0));

        let eq = SplitCondition::NominalEquals {
            attribute: 2,
            category: Some(1),
        };
        assert!(eq.matches(1.0));
        assert!(!eq.matches(0.0));
        assert!(!eq.matches(f64::NAN));
        assert_eq!(eq.attribute(), 2);
    }

    #[test]
    fn test_canonical_keys_order_numeric_edges() {
        let attribute = Attribute::numeric("x");
        let mut keys = vec![
            SplitCondition::IsMissing { attribute: 0 }.canonical_key(&attribute),
            SplitCondition::Greater {
                attribute: 0,
                threshold: 2.0,
            }
            .canonical_key(&attribute),
            SplitCondition::LessOrEqual {
                attribute: 0,
                threshold: 2.0,
            }
            .canonical_key(&attribute),
        ];
        keys.sort();
        assert_eq!(keys, vec!["<= 2", "> 2", "is missing"]);
    }

    #[test]
    fn test_nominal_key_uses_category_name() {
        let attribute = Attribute::nominal("outlook", ["sunny", "rain"]);
        let condition = SplitCondition::NominalEquals {
            attribute: 0,
            category: Some(1),
        };
        assert_eq!(condition.canonical_key(&attribute), "= rain");
    }

    #[test]
    fn test_majority_leaf_prefers_lower_class() {
        let leaf = Leaf::from_class_counts(vec![2, 3, 3]);
        assert_eq!(leaf.prediction, Prediction::Class(1));
        assert_eq!(leaf.num_rows(), 8);
        assert_eq!(leaf.errors(), 5);
    }

    #[test]
    fn test_collapse_turns_split_into_leaf() {
        let mut node = TreeNode::new_split(
            1,
            4,
            0,
            0.5,
            vec![Edge {
                condition: SplitCondition::IsMissing { attribute: 0 },
                child: 1,
            }],
        );
        assert!(!node.is_leaf());
        assert_eq!(node.edges().len(), 1);

        node.collapse(Leaf::from_class_counts(vec![4, 0]));
        assert!(node.is_leaf());
        assert!(node.edges().is_empty());
        assert_eq!(node.num_rows(), 4);
    }
}
