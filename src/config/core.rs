//! Core configuration structures for tree induction.
//!
//! This module provides the main configuration structure and a builder for
//! setting up the criterion, pre- and post-pruning, split search, scheduling
//! and reproducibility options of a tree learner.

use crate::core::constants::*;
use crate::core::error::{Result, TreeError};
use crate::core::types::LabelKind;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Scoring function used to rank candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionType {
    /// Entropy reduction
    InformationGain,
    /// Entropy reduction normalized by the split information
    GainRatio,
    /// Gini impurity reduction
    GiniIndex,
    /// Weighted accuracy of the majority class per partition
    Accuracy,
    /// Chi-square statistic of the partition/class contingency table
    ChiSquare,
    /// Reduction of the weighted squared error (numeric labels)
    LeastSquares,
}

impl CriterionType {
    /// Returns true if the criterion can score splits for this label kind.
    pub fn supports(&self, label: LabelKind) -> bool {
        match self {
            CriterionType::LeastSquares => label == LabelKind::Numeric,
            _ => label == LabelKind::Nominal,
        }
    }
}

impl Default for CriterionType {
    fn default() -> Self {
        CriterionType::GainRatio
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionType::InformationGain => write!(f, "information_gain"),
            CriterionType::GainRatio => write!(f, "gain_ratio"),
            CriterionType::GiniIndex => write!(f, "gini_index"),
            CriterionType::Accuracy => write!(f, "accuracy"),
            CriterionType::ChiSquare => write!(f, "chi_square"),
            CriterionType::LeastSquares => write!(f, "least_squares"),
        }
    }
}

/// Threshold search policy for numeric attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSearchType {
    /// Evaluate every candidate threshold and keep the best
    Exhaustive,
    /// Draw one threshold uniformly between the minimum and maximum value
    Randomized,
}

impl Default for SplitSearchType {
    fn default() -> Self {
        SplitSearchType::Exhaustive
    }
}

/// Order and parallelism in which pending nodes are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingStrategy {
    /// Depth-first on the calling thread
    Sequential,
    /// Attribute-parallel on large nodes, node-parallel on small ones
    Concurrent,
}

impl Default for SchedulingStrategy {
    fn default() -> Self {
        SchedulingStrategy::Concurrent
    }
}

impl fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingStrategy::Sequential => write!(f, "sequential"),
            SchedulingStrategy::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Main configuration structure for tree induction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Scoring function for candidate splits
    pub criterion: CriterionType,
    /// Maximal depth (root has depth 1, 0 for unlimited)
    pub max_depth: usize,

    // Pre-pruning
    /// Whether pre-pruning checks are applied
    pub apply_prepruning: bool,
    /// Minimal score a split needs when pre-pruning
    pub minimal_gain: f64,
    /// Minimal number of rows in every non-empty child
    pub minimal_leaf_size: usize,
    /// Minimal number of rows a node needs to be split
    pub minimal_size_for_split: usize,
    /// Number of alternatives tried after the best candidate
    pub prepruning_alternatives: usize,

    // Post-pruning
    /// Whether the finished tree is pruned
    pub apply_pruning: bool,
    /// Confidence level of the pessimistic error estimate
    pub confidence: f64,

    // Search and scheduling
    /// Threshold search policy for numeric attributes
    pub split_search: SplitSearchType,
    /// Node scheduling strategy
    pub strategy: SchedulingStrategy,
    /// Number of threads (0 = all available cores)
    pub num_threads: usize,
    /// Whether the column table may be filled in parallel
    pub parallel_table_build: bool,

    // Randomization
    /// Fraction of candidate attributes kept per node (None keeps all)
    pub attribute_subset_ratio: Option<f64>,
    /// Random seed for reproducible results
    pub random_seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            criterion: CriterionType::GainRatio,
            max_depth: DEFAULT_MAX_DEPTH,

            apply_prepruning: true,
            minimal_gain: DEFAULT_MINIMAL_GAIN,
            minimal_leaf_size: DEFAULT_MINIMAL_LEAF_SIZE,
            minimal_size_for_split: DEFAULT_MINIMAL_SIZE_FOR_SPLIT,
            prepruning_alternatives: DEFAULT_PREPRUNING_ALTERNATIVES,

            apply_pruning: true,
            confidence: DEFAULT_CONFIDENCE,

            split_search: SplitSearchType::Exhaustive,
            strategy: SchedulingStrategy::Concurrent,
            num_threads: DEFAULT_NUM_THREADS,
            parallel_table_build: true,

            attribute_subset_ratio: None,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl TreeConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any step of induction consumes random numbers.
    pub fn is_randomized(&self) -> bool {
        self.split_search == SplitSearchType::Randomized || self.attribute_subset_ratio.is_some()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.apply_pruning && (self.confidence <= 0.0 || self.confidence > 0.5) {
            return Err(TreeError::invalid_parameter(
                "confidence",
                self.confidence.to_string(),
                "must be in range (0.0, 0.5]",
            ));
        }

        if self.minimal_gain.is_nan() || self.minimal_gain < 0.0 {
            return Err(TreeError::invalid_parameter(
                "minimal_gain",
                self.minimal_gain.to_string(),
                "must be non-negative",
            ));
        }

        if self.minimal_leaf_size < 1 {
            return Err(TreeError::invalid_parameter(
                "minimal_leaf_size",
                self.minimal_leaf_size.to_string(),
                "must be at least 1",
            ));
        }

        if self.minimal_size_for_split < 1 {
            return Err(TreeError::invalid_parameter(
                "minimal_size_for_split",
                self.minimal_size_for_split.to_string(),
                "must be at least 1",
            ));
        }

        if let Some(ratio) = self.attribute_subset_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                return Err(TreeError::invalid_parameter(
                    "attribute_subset_ratio",
                    ratio.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
        }

        if self.num_threads > num_cpus::get() * 2 {
            log::warn!(
                "num_threads ({}) is much larger than available cores ({})",
                self.num_threads,
                num_cpus::get()
            );
        }

        Ok(())
    }

    /// Checks that the configured criterion can score this label kind.
    pub fn validate_for_label(&self, label: LabelKind) -> Result<()> {
        crate::ensure!(
            self.criterion.supports(label),
            crate::config_error!(
                "criterion {} cannot be used with a {} label",
                self.criterion,
                label
            )
        );
        Ok(())
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: TreeConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(TreeError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| TreeError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(TreeError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for [`TreeConfig`] that collects validation problems and reports
/// them together from [`ConfigBuilder::build`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: TreeConfig,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: TreeConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the split criterion
    pub fn criterion(mut self, criterion: CriterionType) -> Self {
        self.config.criterion = criterion;
        self
    }

    /// Set the maximal depth (0 for unlimited)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Enable or disable pre-pruning
    pub fn apply_prepruning(mut self, enabled: bool) -> Self {
        self.config.apply_prepruning = enabled;
        self
    }

    /// Set the minimal gain required when pre-pruning
    pub fn minimal_gain(mut self, gain: f64) -> Self {
        if gain.is_nan() || gain < 0.0 {
            self.validation_errors
                .push("minimal_gain must be non-negative".to_string());
        }
        self.config.minimal_gain = gain;
        self
    }

    /// Set the minimal number of rows per child
    pub fn minimal_leaf_size(mut self, size: usize) -> Self {
        if size < 1 {
            self.validation_errors
                .push("minimal_leaf_size must be at least 1".to_string());
        }
        self.config.minimal_leaf_size = size;
        self
    }

    /// Set the minimal number of rows needed to split a node
    pub fn minimal_size_for_split(mut self, size: usize) -> Self {
        if size < 1 {
            self.validation_errors
                .push("minimal_size_for_split must be at least 1".to_string());
        }
        self.config.minimal_size_for_split = size;
        self
    }

    /// Set the number of alternatives tried after the best candidate
    pub fn prepruning_alternatives(mut self, alternatives: usize) -> Self {
        self.config.prepruning_alternatives = alternatives;
        self
    }

    /// Enable or disable pessimistic pruning
    pub fn apply_pruning(mut self, enabled: bool) -> Self {
        self.config.apply_pruning = enabled;
        self
    }

    /// Set the pruning confidence level
    pub fn confidence(mut self, confidence: f64) -> Self {
        if confidence <= 0.0 || confidence > 0.5 {
            self.validation_errors
                .push("confidence must be in range (0.0, 0.5]".to_string());
        }
        self.config.confidence = confidence;
        self
    }

    /// Set the numeric threshold search policy
    pub fn split_search(mut self, search: SplitSearchType) -> Self {
        self.config.split_search = search;
        self
    }

    /// Set the node scheduling strategy
    pub fn strategy(mut self, strategy: SchedulingStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the number of threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Allow or forbid parallel column table construction
    pub fn parallel_table_build(mut self, enabled: bool) -> Self {
        self.config.parallel_table_build = enabled;
        self
    }

    /// Keep only a random fraction of candidate attributes per node
    pub fn attribute_subset_ratio(mut self, ratio: f64) -> Self {
        if !(ratio > 0.0 && ratio <= 1.0) {
            self.validation_errors
                .push("attribute_subset_ratio must be in range (0.0, 1.0]".to_string());
        }
        self.config.attribute_subset_ratio = Some(ratio);
        self
    }

    /// Set the random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Build the configuration, reporting every collected problem.
    pub fn build(self) -> Result<TreeConfig> {
        if !self.validation_errors.is_empty() {
            return Err(TreeError::config(self.validation_errors.join("; ")));
        }
        self.config.validate()?;
        Ok(self.config)
    }
}
