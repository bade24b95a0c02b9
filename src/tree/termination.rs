//! Termination predicates evaluated before a node is split.

use crate::config::TreeConfig;
use crate::core::types::{AttributeIndex, LabelKind};
use crate::core::utils::is_equal;
use crate::dataset::ColumnTable;
use crate::tree::selection::Selection;
use std::fmt::Debug;

/// A predicate that turns a pending node into a leaf.
pub trait Termination: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn should_stop(
        &self,
        table: &ColumnTable,
        selection: &Selection,
        attributes: &[AttributeIndex],
        depth: usize,
    ) -> bool;
}

/// Stops on a node without rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySelection;

impl Termination for EmptySelection {
    fn name(&self) -> &'static str {
        "empty_selection"
    }

    fn should_stop(&self, _: &ColumnTable, selection: &Selection, _: &[AttributeIndex], _: usize) -> bool {
        selection.is_empty()
    }
}

/// Stops when every row carries the same label.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLabel;

impl Termination for SingleLabel {
    fn name(&self) -> &'static str {
        "single_label"
    }

    fn should_stop(&self, table: &ColumnTable, selection: &Selection, _: &[AttributeIndex], _: usize) -> bool {
        let rows = selection.rows();
        let first = match rows.first() {
            Some(&row) => row,
            None => return true,
        };
        match table.label_kind() {
            LabelKind::Nominal => {
                let class = table.class(first);
                rows.iter().all(|&row| table.class(row) == class)
            }
            LabelKind::Numeric => {
                let value = table.label_value(first);
                rows.iter().all(|&row| is_equal(table.label_value(row), value))
            }
        }
    }
}

/// Stops when no candidate attribute is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAttributeLeft;

impl Termination for NoAttributeLeft {
    fn name(&self) -> &'static str {
        "no_attribute_left"
    }

    fn should_stop(&self, _: &ColumnTable, _: &Selection, attributes: &[AttributeIndex], _: usize) -> bool {
        attributes.is_empty()
    }
}

/// Stops at nodes of depth `max_depth` or deeper. The root has depth 1 and
/// `0` disables the limit.
#[derive(Debug, Clone, Copy)]
pub struct MaxDepth {
    pub max_depth: usize,
}

impl Termination for MaxDepth {
    fn name(&self) -> &'static str {
        "max_depth"
    }

    fn should_stop(&self, _: &ColumnTable, _: &Selection, _: &[AttributeIndex], depth: usize) -> bool {
        self.max_depth > 0 && depth >= self.max_depth
    }
}

/// The predicates applied by every learner.
pub fn default_terminations(config: &TreeConfig) -> Vec<Box<dyn Termination>> {
    vec![
        Box::new(EmptySelection),
        Box::new(SingleLabel),
        Box::new(NoAttributeLeft),
        Box::new(MaxDepth {
            max_depth: config.max_depth,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::ConcurrencyContext;
    use crate::dataset::{Attribute, DatasetBuilder};
    use crate::tree::selection::SelectionManager;

    fn setup(labels: &[f64]) -> (ColumnTable, Selection) {
        let mut builder = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .label(Attribute::nominal("class", ["a", "b"]));
        for (i, &label) in labels.iter().enumerate() {
            builder = builder.row(&[i as f64], label);
        }
        let ctx = ConcurrencyContext::sequential().unwrap();
        let table = ColumnTable::build(&builder.build().unwrap(), &ctx, false).unwrap();
        let selection = SelectionManager::new(&table).start_selection(&ctx).unwrap();
        (table, selection)
    }

    #[test]
    fn test_single_label() {
        let (table, selection) = setup(&[1.0, 1.0, 1.0]);
        assert!(SingleLabel.should_stop(&table, &selection, &[0], 1));

        let (table, selection) = setup(&[1.0, 0.0, 1.0]);
        assert!(!SingleLabel.should_stop(&table, &selection, &[0], 1));
    }

    #[test]
    fn test_max_depth() {
        let (table, selection) = setup(&[1.0, 0.0]);
        let limit = MaxDepth { max_depth: 2 };
        assert!(!limit.should_stop(&table, &selection, &[0], 1));
        assert!(limit.should_stop(&table, &selection, &[0], 2));

        let unlimited = MaxDepth { max_depth: 0 };
        assert!(!unlimited.should_stop(&table, &selection, &[0], 100));
    }

    #[test]
    fn test_empty_selection_and_attributes() {
        let (table, selection) = setup(&[]);
        assert!(EmptySelection.should_stop(&table, &selection, &[0], 1));

        let (table, selection) = setup(&[0.0, 1.0]);
        assert!(NoAttributeLeft.should_stop(&table, &selection, &[], 1));
        assert!(!NoAttributeLeft.should_stop(&table, &selection, &[0], 1));
    }

    #[test]
    fn test_default_terminations_order() {
        let names: Vec<_> = default_terminations(&TreeConfig::default())
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(
            names,
            vec!["empty_selection", "single_label", "no_attribute_left", "max_depth"]
        );
    }
}
