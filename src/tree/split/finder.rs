//! Best split search for a single attribute.
//!
//! Nominal attributes are scored directly over all their categories. Numeric
//! attributes are scanned along their sort order: a candidate threshold is
//! the midpoint of two consecutive distinct values, and it is only scored if
//! the label changed somewhere since the previously scored candidate.

use crate::config::SplitSearchType;
use crate::core::types::{AttributeIndex, LabelKind, RowIndex};
use crate::core::utils::is_equal;
use crate::dataset::ColumnTable;
use crate::tree::criterion::Criterion;
use crate::tree::selection::Selection;
use crate::tree::split::benefit::Benefit;
use rand::rngs::StdRng;
use rand::Rng;

/// Finds the best split of one attribute under a criterion.
#[derive(Debug, Clone, Copy)]
pub struct SplitFinder<'a> {
    table: &'a ColumnTable,
    criterion: &'a dyn Criterion,
    search: SplitSearchType,
}

impl<'a> SplitFinder<'a> {
    pub fn new(table: &'a ColumnTable, criterion: &'a dyn Criterion, search: SplitSearchType) -> Self {
        SplitFinder {
            table,
            criterion,
            search,
        }
    }

    /// Returns true if numeric thresholds are drawn at random.
    pub fn is_randomized(&self) -> bool {
        self.search == SplitSearchType::Randomized
    }

    /// Best split of `attribute` under the configured search policy.
    ///
    /// Returns `None` when a numeric attribute offers no threshold (all
    /// values equal or missing).
    pub fn find(
        &self,
        selection: &Selection,
        attribute: AttributeIndex,
        rng: &mut StdRng,
    ) -> Option<Benefit> {
        match self.search {
            SplitSearchType::Randomized if !self.table.is_nominal(attribute) => {
                self.find_random(selection, attribute, rng)
            }
            _ => self.find_exhaustive(selection, attribute),
        }
    }

    /// Best split of `attribute` over every candidate threshold.
    pub fn find_exhaustive(
        &self,
        selection: &Selection,
        attribute: AttributeIndex,
    ) -> Option<Benefit> {
        if self.table.is_nominal(attribute) {
            let score = self
                .criterion
                .nominal_benefit(self.table, selection.rows(), attribute);
            return Some(Benefit::new(attribute, score, None));
        }

        let order = selection.sorted_by(self.table, attribute);
        let values = self.table.numeric_values(attribute);
        let present = order.iter().take_while(|&&row| !values[row].is_nan()).count();
        if present < 2 {
            return None;
        }

        let mut distribution = self
            .criterion
            .supports_incremental()
            .then(|| self.criterion.start(self.table, order, attribute));
        let mut best: Option<(f64, f64)> = None;
        let mut label_changed = false;

        for window in order[..present].windows(2) {
            let (row, next) = (window[0], window[1]);
            if let Some(distribution) = distribution.as_mut() {
                self.criterion.update(self.table, row, distribution);
            }
            if !self.same_label(row, next) {
                label_changed = true;
            }

            let (value, next_value) = (values[row], values[next]);
            if is_equal(value, next_value) || !label_changed {
                continue;
            }
            label_changed = false;

            let threshold = midpoint(value, next_value);
            let score = match distribution.as_ref() {
                Some(distribution) => self.criterion.incremental_benefit(distribution),
                None => self
                    .criterion
                    .numerical_benefit(self.table, order, attribute, threshold),
            };
            if score.is_nan() {
                continue;
            }
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, threshold));
            }
        }

        best.map(|(score, threshold)| Benefit::new(attribute, score, Some(threshold)))
    }

    /// Scores one threshold drawn uniformly between the smallest and the
    /// largest present value.
    pub fn find_random(
        &self,
        selection: &Selection,
        attribute: AttributeIndex,
        rng: &mut StdRng,
    ) -> Option<Benefit> {
        let order = selection.sorted_by(self.table, attribute);
        let values = self.table.numeric_values(attribute);
        let present = order.iter().take_while(|&&row| !values[row].is_nan()).count();
        if present == 0 {
            return None;
        }

        let (min, max) = (values[order[0]], values[order[present - 1]]);
        if is_equal(min, max) {
            return None;
        }
        let threshold = min + rng.gen::<f64>() * (max - min);
        let score = self
            .criterion
            .numerical_benefit(self.table, order, attribute, threshold);
        Some(Benefit::new(attribute, score, Some(threshold)))
    }

    fn same_label(&self, a: RowIndex, b: RowIndex) -> bool {
        match self.table.label_kind() {
            LabelKind::Nominal => self.table.class(a) == self.table.class(b),
            LabelKind::Numeric => is_equal(self.table.label_value(a), self.table.label_value(b)),
        }
    }
}

/// Threshold between two distinct present values `low < high`.
///
/// Rounding must never place the threshold on `high`, otherwise both sides
/// of the candidate end up in the `<=` child.
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low + (high - low) / 2.0;
    if mid >= high {
        low
    } else {
        mid
    }
}
