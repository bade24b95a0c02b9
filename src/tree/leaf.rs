//! Leaf statistics writers.

use crate::core::types::{LabelKind, RowIndex};
use crate::dataset::ColumnTable;
use crate::tree::node::{Leaf, LeafStatistics, Prediction};
use std::fmt::Debug;

/// Finalizes a terminal node from the rows that reached it.
pub trait LeafWriter: Send + Sync + Debug {
    fn write_leaf(&self, table: &ColumnTable, rows: &[RowIndex]) -> Leaf;
}

/// Predicts the class with the largest total weight and records row counts
/// per class. Ties go to the lower class index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationLeafWriter;

impl LeafWriter for ClassificationLeafWriter {
    fn write_leaf(&self, table: &ColumnTable, rows: &[RowIndex]) -> Leaf {
        let num_classes = table.num_classes();
        let mut counts = vec![0usize; num_classes];
        let mut weights = vec![0.0; num_classes];
        for &row in rows {
            let class = table.class(row);
            counts[class] += 1;
            weights[class] += table.weight(row);
        }

        let mut best = 0;
        for class in 1..num_classes {
            if weights[class] > weights[best] {
                best = class;
            }
        }
        Leaf {
            prediction: Prediction::Class(best),
            statistics: LeafStatistics::ClassCounts(counts),
        }
    }
}

/// Predicts the weighted mean label and records the row count.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionLeafWriter;

impl LeafWriter for RegressionLeafWriter {
    fn write_leaf(&self, table: &ColumnTable, rows: &[RowIndex]) -> Leaf {
        let (weight, sum) = rows.iter().fold((0.0, 0.0), |(w, s), &row| {
            let weight = table.weight(row);
            (w + weight, s + weight * table.label_value(row))
        });
        let mean = if weight > 0.0 { sum / weight } else { 0.0 };
        Leaf {
            prediction: Prediction::Value(mean),
            statistics: LeafStatistics::Count(rows.len()),
        }
    }
}

/// Leaf writer matching the label kind.
pub fn leaf_writer_for(kind: LabelKind) -> Box<dyn LeafWriter> {
    match kind {
        LabelKind::Nominal => Box::new(ClassificationLeafWriter),
        LabelKind::Numeric => Box::new(RegressionLeafWriter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::ConcurrencyContext;
    use crate::dataset::{Attribute, DatasetBuilder};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_weighted_majority_and_counts() {
        let dataset = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .label(Attribute::nominal("class", ["a", "b", "c"]))
            .row(&[1.0], 0.0)
            .row(&[2.0], 0.0)
            .weighted_row(&[3.0], 1.0, 5.0)
            .build()
            .unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&dataset, &ctx, false).unwrap();

        let leaf = ClassificationLeafWriter.write_leaf(&table, &[0, 1, 2]);
        assert_eq!(leaf.prediction, Prediction::Class(1));
        assert_eq!(leaf.class_counts(), Some(&[2, 1, 0][..]));

        let tie = ClassificationLeafWriter.write_leaf(&table, &[]);
        assert_eq!(tie.prediction, Prediction::Class(0));
        assert_eq!(tie.num_rows(), 0);
    }

    #[test]
    fn test_regression_mean() {
        let dataset = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .label(Attribute::numeric("y"))
            .row(&[1.0], 1.0)
            .weighted_row(&[2.0], 4.0, 3.0)
            .build()
            .unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&dataset, &ctx, false).unwrap();

        let leaf = leaf_writer_for(LabelKind::Numeric).write_leaf(&table, &[0, 1]);
        match leaf.prediction {
            Prediction::Value(mean) => assert_abs_diff_eq!(mean, 13.0 / 4.0, epsilon = 1e-12),
            Prediction::Class(_) => panic!("expected a numeric prediction"),
        }
        assert_eq!(leaf.num_rows(), 2);
    }
}
