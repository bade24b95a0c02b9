//! Core data types for column-tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row position inside the column table.
pub type RowIndex = usize;

/// Attribute position inside the column table.
///
/// Nominal attributes occupy `[0, K)`, numeric attributes `[K, K + P)`.
pub type AttributeIndex = usize;

/// Node identifier inside a tree arena.
pub type NodeIndex = usize;

/// Kind of the label column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    /// Class labels, stored as category indices
    Nominal,
    /// Continuous target values
    Numeric,
}

impl fmt::Display for LabelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelKind::Nominal => write!(f, "nominal"),
            LabelKind::Numeric => write!(f, "numeric"),
        }
    }
}
