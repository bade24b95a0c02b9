//! Decision tree induction.
//!
//! This module holds the tree structure, per-node selections, split scoring
//! and search, the induction driver with its schedulers, and post-pruning.

pub mod criterion;
pub mod leaf;
pub mod learner;
pub mod node;
pub mod pruning;
pub mod sampling;
pub mod selection;
pub mod split;
pub mod termination;
pub mod tree;

pub use criterion::{create_criterion, Criterion, WeightDistribution};
pub use leaf::{leaf_writer_for, ClassificationLeafWriter, LeafWriter, RegressionLeafWriter};
pub use learner::{ConcurrentScheduler, NodeScheduler, SequentialScheduler, TreeLearner};
pub use node::{Edge, Leaf, LeafStatistics, NodeKind, Prediction, SplitCondition, TreeNode};
pub use pruning::{PessimisticPruner, Pruner};
pub use sampling::{AttributePreprocessing, RandomAttributeSubset};
pub use selection::{remove_attribute, ChildSelection, Selection, SelectionManager};
pub use split::{Benefit, BenefitCalculator, SplitFinder};
pub use termination::{default_terminations, Termination};
pub use tree::Tree;
