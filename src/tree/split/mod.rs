//! Split search module.
//!
//! [`SplitFinder`] finds the best split of one attribute; [`BenefitCalculator`]
//! runs it over the candidate attributes of a node, sequentially or striped
//! across workers, and ranks the resulting [`Benefit`]s.

pub mod benefit;
pub mod finder;

pub use benefit::{sort_benefits, Benefit, BenefitCalculator};
pub use finder::SplitFinder;
