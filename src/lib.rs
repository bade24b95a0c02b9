//! # column-tree
//!
//! Decision-tree induction over a column-oriented snapshot of tabular data.
//!
//! ## Features
//!
//! - **Column-major training table**: the row dataset is converted once into
//!   byte-coded nominal columns and `f64` numeric columns, built in parallel
//!   chunks for large inputs.
//! - **Pre-sorted selections**: every node keeps its rows sorted per numeric
//!   attribute, so threshold search is a single incremental scan.
//! - **Pluggable criteria**: information gain, gain ratio, Gini index,
//!   accuracy and chi-square for classification, least squares for
//!   regression.
//! - **Two schedulers**: a depth-first sequential builder and a concurrent
//!   builder that evaluates attributes in parallel on large nodes and grows
//!   small subtrees as independent tasks. Both produce identical trees.
//! - **Pruning**: minimal size and gain pre-pruning, pessimistic
//!   post-pruning.
//!
//! ## Quick Start
//!
//! ```rust
//! use column_tree::{Attribute, ConcurrencyContext, ConfigBuilder, DatasetBuilder, TreeLearner};
//!
//! # fn main() -> column_tree::Result<()> {
//! let dataset = DatasetBuilder::new()
//!     .attribute(Attribute::nominal("outlook", ["sunny", "rain"]))
//!     .attribute(Attribute::numeric("humidity"))
//!     .label(Attribute::nominal("play", ["yes", "no"]))
//!     .row(&[0.0, 85.0], 1.0)
//!     .row(&[0.0, 90.0], 1.0)
//!     .row(&[1.0, 70.0], 0.0)
//!     .row(&[1.0, 65.0], 0.0)
//!     .build()?;
//!
//! let config = ConfigBuilder::new()
//!     .minimal_size_for_split(2)
//!     .minimal_leaf_size(1)
//!     .build()?;
//! let ctx = ConcurrencyContext::new(config.num_threads)?;
//!
//! let tree = TreeLearner::new(config)?.learn(&dataset, &ctx)?;
//! println!("{}", tree);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error type, constants, index types, concurrency context
//! - [`config`]: serde-backed training configuration
//! - [`dataset`]: row datasets and the column table
//! - [`tree`]: selections, split search, induction, pruning and the tree

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

pub mod config;
pub mod core;
pub mod dataset;
pub mod tree;

pub use crate::config::{
    ConfigBuilder, CriterionType, SchedulingStrategy, SplitSearchType, TreeConfig,
};
pub use crate::core::{
    error::{Result, TreeError},
    types::*,
    utils::{CancellationToken, ConcurrencyContext},
};
pub use crate::dataset::{Attribute, AttributeKind, ColumnTable, DatasetBuilder, RowDataset};
pub use crate::tree::{
    Leaf, LeafStatistics, PessimisticPruner, Prediction, Pruner, SplitCondition, Tree,
    TreeLearner, TreeNode,
};

pub use crate::core::constants::COLUMN_TREE_VERSION as VERSION;

/// Initialize logging through `env_logger`.
///
/// Honors `RUST_LOG` and defaults to `info`. Safe to call more than once.
pub fn init_logging() {
    crate::core::initialize_logging()
}
