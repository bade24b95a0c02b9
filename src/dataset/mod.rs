//! Dataset module for column-tree.
//!
//! Training data enters as a row-oriented [`RowDataset`] and is converted
//! once into a column-oriented [`ColumnTable`] that the tree builder reads.

pub mod column_table;
pub mod dataset;

pub use column_table::ColumnTable;
pub use dataset::{Attribute, AttributeKind, DatasetBuilder, RowDataset};
