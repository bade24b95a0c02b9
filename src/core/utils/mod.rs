//! Utility modules for column-tree.

pub mod common;
pub mod threading;

pub use common::{is_equal, normal_inverse};
pub use threading::{CancellationToken, ConcurrencyContext};
