//! Split scoring criteria.
//!
//! A criterion scores a partition of the selected rows. Every partition is a
//! vector of label statistics: the weight per class for nominal labels, or
//! the moments `[w, w·y, w·y²]` for numeric labels. Rows with a missing
//! attribute value always form a partition of their own.
//!
//! Concrete criteria only implement [`Criterion::partition_benefit`]; the
//! nominal, threshold and incremental entry points are derived from it.
//! Criteria must be pure functions of their inputs so that attribute-parallel
//! evaluation stays deterministic.

pub mod classification;
pub mod regression;

pub use classification::{Accuracy, ChiSquare, GainRatio, GiniIndex, InformationGain};
pub use regression::LeastSquares;

use crate::config::CriterionType;
use crate::core::types::{AttributeIndex, LabelKind, RowIndex};
use crate::dataset::ColumnTable;
use std::fmt::Debug;

/// Running label statistics of a binary numeric split plus missing rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightDistribution {
    pub left: Vec<f64>,
    pub right: Vec<f64>,
    pub missing: Vec<f64>,
}

impl WeightDistribution {
    /// Empty distribution sized for the table's label.
    pub fn new(table: &ColumnTable) -> Self {
        let width = statistics_width(table);
        WeightDistribution {
            left: vec![0.0; width],
            right: vec![0.0; width],
            missing: vec![0.0; width],
        }
    }

    /// Moves one row from the right to the left partition.
    pub fn move_left(&mut self, table: &ColumnTable, row: RowIndex) {
        accumulate(&mut self.left, table, row, 1.0);
        accumulate(&mut self.right, table, row, -1.0);
    }

    /// The three partitions in left, right, missing order.
    pub fn partitions(&self) -> [&[f64]; 3] {
        [&self.left, &self.right, &self.missing]
    }
}

/// Length of a label statistics vector.
pub fn statistics_width(table: &ColumnTable) -> usize {
    match table.label_kind() {
        LabelKind::Nominal => table.num_classes(),
        LabelKind::Numeric => 3,
    }
}

/// Adds `sign` times the weighted label statistics of `row` to `target`.
pub fn accumulate(target: &mut [f64], table: &ColumnTable, row: RowIndex, sign: f64) {
    let weight = sign * table.weight(row);
    match table.label_kind() {
        LabelKind::Nominal => target[table.class(row)] += weight,
        LabelKind::Numeric => {
            let y = table.label_value(row);
            target[0] += weight;
            target[1] += weight * y;
            target[2] += weight * y * y;
        }
    }
}

/// Scoring function for candidate splits.
pub trait Criterion: Send + Sync + Debug {
    /// Criterion name for logging.
    fn name(&self) -> &'static str;

    /// Scores a partition given as label statistics per part. Empty parts
    /// contribute nothing.
    fn partition_benefit(&self, parts: &[&[f64]]) -> f64;

    /// Scores splitting `rows` by every category of a nominal attribute.
    fn nominal_benefit(
        &self,
        table: &ColumnTable,
        rows: &[RowIndex],
        attribute: AttributeIndex,
    ) -> f64 {
        let width = statistics_width(table);
        let codes = table.nominal_values(attribute);
        let mut parts = vec![vec![0.0; width]; table.num_categories(attribute) + 1];
        for &row in rows {
            accumulate(&mut parts[usize::from(codes[row])], table, row, 1.0);
        }
        let parts: Vec<&[f64]> = parts.iter().map(Vec::as_slice).collect();
        self.partition_benefit(&parts)
    }

    /// Scores splitting `rows` at a threshold of a numeric attribute.
    fn numerical_benefit(
        &self,
        table: &ColumnTable,
        rows: &[RowIndex],
        attribute: AttributeIndex,
        threshold: f64,
    ) -> f64 {
        let values = table.numeric_values(attribute);
        let mut distribution = WeightDistribution::new(table);
        for &row in rows {
            let value = values[row];
            let part = if value.is_nan() {
                &mut distribution.missing
            } else if value <= threshold {
                &mut distribution.left
            } else {
                &mut distribution.right
            };
            accumulate(part, table, row, 1.0);
        }
        self.partition_benefit(&distribution.partitions())
    }

    /// Whether threshold search may use [`Criterion::start`] and
    /// [`Criterion::update`] instead of rescoring every candidate.
    fn supports_incremental(&self) -> bool {
        true
    }

    /// Distribution with every present value on the right and missing values
    /// in their own partition.
    fn start(
        &self,
        table: &ColumnTable,
        rows: &[RowIndex],
        attribute: AttributeIndex,
    ) -> WeightDistribution {
        let values = table.numeric_values(attribute);
        let mut distribution = WeightDistribution::new(table);
        for &row in rows {
            if values[row].is_nan() {
                accumulate(&mut distribution.missing, table, row, 1.0);
            } else {
                accumulate(&mut distribution.right, table, row, 1.0);
            }
        }
        distribution
    }

    /// Moves `row` to the left side of the threshold.
    fn update(&self, table: &ColumnTable, row: RowIndex, distribution: &mut WeightDistribution) {
        distribution.move_left(table, row);
    }

    fn incremental_benefit(&self, distribution: &WeightDistribution) -> f64 {
        self.partition_benefit(&distribution.partitions())
    }
}

/// Creates the criterion selected by the configuration.
pub fn create_criterion(criterion: CriterionType) -> Box<dyn Criterion> {
    match criterion {
        CriterionType::InformationGain => Box::new(InformationGain),
        CriterionType::GainRatio => Box::new(GainRatio),
        CriterionType::GiniIndex => Box::new(GiniIndex),
        CriterionType::Accuracy => Box::new(Accuracy),
        CriterionType::ChiSquare => Box::new(ChiSquare),
        CriterionType::LeastSquares => Box::new(LeastSquares),
    }
}

/// Sum of weights in a classification part.
pub(crate) fn part_weight(part: &[f64]) -> f64 {
    part.iter().sum()
}

/// Element-wise sum of all parts.
pub(crate) fn total_of(parts: &[&[f64]]) -> Vec<f64> {
    let width = parts.first().map_or(0, |part| part.len());
    let mut total = vec![0.0; width];
    for part in parts {
        for (sum, value) in total.iter_mut().zip(part.iter()) {
            *sum += value;
        }
    }
    total
}
