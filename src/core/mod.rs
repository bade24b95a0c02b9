//! Core infrastructure module for column-tree.
//!
//! This module provides the foundational pieces shared by the dataset and
//! tree modules:
//!
//! - [`types`]: index aliases and the label kind
//! - [`constants`]: scheduling thresholds and configuration defaults
//! - [`error`]: error type and result alias
//! - [`utils`]: the concurrency context and numeric helpers

pub mod constants;
pub mod error;
pub mod types;
pub mod utils;

pub use constants::*;
pub use error::{Result, TreeError};
pub use types::*;
pub use utils::{CancellationToken, ConcurrencyContext};

/// Initialize the logging subsystem.
///
/// Defaults to the `info` level when `RUST_LOG` is not set. Calling this more
/// than once, or after another logger was installed, is harmless.
pub fn initialize_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}
