//! System constants and configuration defaults for column-tree.
//!
//! The scheduling thresholds below decide when work is worth spreading over
//! the thread pool. They are tuned values, not tunable parameters.

/// Crate version.
pub const COLUMN_TREE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Column table construction runs chunked in parallel once
/// `rows * attributes` exceeds this many cells.
pub const PARALLEL_TABLE_CELL_THRESHOLD: usize = 3_000_000;

/// Rows processed between two cancellation checks during table construction.
pub const CANCELLATION_CHECK_INTERVAL: usize = 1000;

/// Root selection sorts attributes in parallel only above this row count.
pub const PARALLEL_SORT_ROW_THRESHOLD: usize = 10_000;

/// Root selection sorts attributes in parallel only with at least this many
/// numeric attributes.
pub const PARALLEL_SORT_MIN_ATTRIBUTES: usize = 2;

/// Nodes with fewer selected rows are handed to node-level parallelism.
pub const NODE_PARALLEL_ROW_THRESHOLD: usize = 5000;

/// Nodes with fewer candidate attributes are handed to node-level parallelism.
pub const NODE_PARALLEL_MIN_ATTRIBUTES: usize = 2;

/// Nominal attributes with more distinct categories are dropped from the
/// column table (categories must fit a byte next to the missing sentinel).
pub const MAX_NOMINAL_CATEGORIES: usize = 127;

/// Bias towards collapsing a subtree on near ties during pessimistic pruning.
pub const PRUNE_PREFERENCE: f64 = 0.001;

/// Absolute tolerance for numeric equality checks.
pub const EQUALITY_EPSILON: f64 = 1e-10;

/// Error rates below this count as zero in the pessimistic estimate.
pub const ZERO_ERROR_RATE: f64 = 1e-6;

/// Default maximal tree depth (root has depth 1).
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Default minimal gain a split must reach when pre-pruning.
pub const DEFAULT_MINIMAL_GAIN: f64 = 0.01;

/// Default minimal number of rows in each child.
pub const DEFAULT_MINIMAL_LEAF_SIZE: usize = 2;

/// Default minimal number of rows a node needs before a split is attempted.
pub const DEFAULT_MINIMAL_SIZE_FOR_SPLIT: usize = 4;

/// Default number of alternatives tried after the best candidate.
pub const DEFAULT_PREPRUNING_ALTERNATIVES: usize = 3;

/// Default confidence level for pessimistic pruning.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Default number of threads. 0 means all available cores.
pub const DEFAULT_NUM_THREADS: usize = 0;

/// Default random seed.
pub const DEFAULT_RANDOM_SEED: u64 = 1992;
