//! Configuration management for column-tree.

pub mod core;

pub use self::core::{ConfigBuilder, CriterionType, SchedulingStrategy, SplitSearchType, TreeConfig};
