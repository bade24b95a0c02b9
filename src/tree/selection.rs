//! Per-node row selections.
//!
//! A [`Selection`] holds the rows of one tree node once per numeric
//! attribute, each copy sorted ascending by that attribute with missing
//! values last. Without numeric attributes it holds a single unsorted copy.
//! Splitting a selection partitions every copy with a single pass, so the
//! children keep their sort orders and no re-sorting is ever needed below the
//! root.

use crate::core::constants::{PARALLEL_SORT_MIN_ATTRIBUTES, PARALLEL_SORT_ROW_THRESHOLD};
use crate::core::error::Result;
use crate::core::types::{AttributeIndex, RowIndex};
use crate::core::utils::ConcurrencyContext;
use crate::dataset::ColumnTable;
use crate::tree::node::SplitCondition;
use std::cmp::Ordering;

/// Rows of one tree node, in one order per numeric attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    orders: Vec<Vec<RowIndex>>,
}

impl Selection {
    /// Rows of the selection, in the order of the first numeric attribute.
    pub fn rows(&self) -> &[RowIndex] {
        &self.orders[0]
    }

    pub fn len(&self) -> usize {
        self.orders[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders[0].is_empty()
    }

    /// Rows sorted by a numeric attribute, missing values last.
    pub fn sorted_by(&self, table: &ColumnTable, attribute: AttributeIndex) -> &[RowIndex] {
        &self.orders[table.numeric_position(attribute)]
    }
}

/// One child of a split together with the edge condition leading to it.
#[derive(Debug, Clone)]
pub struct ChildSelection {
    pub condition: SplitCondition,
    pub selection: Selection,
}

/// Creates and partitions selections over a column table.
#[derive(Debug, Clone, Copy)]
pub struct SelectionManager<'a> {
    table: &'a ColumnTable,
}

impl<'a> SelectionManager<'a> {
    pub fn new(table: &'a ColumnTable) -> Self {
        SelectionManager { table }
    }

    /// Selection of all rows, sorted once per numeric attribute.
    ///
    /// Sorting runs one task per numeric attribute on large tables.
    pub fn start_selection(&self, ctx: &ConcurrencyContext) -> Result<Selection> {
        let table = self.table;
        let num_rows = table.num_rows();
        let num_numeric = table.num_numeric();

        if num_numeric == 0 {
            return Ok(Selection {
                orders: vec![(0..num_rows).collect()],
            });
        }

        let sort_attribute = |position: usize| -> Vec<RowIndex> {
            let values = table.numeric_values(table.num_nominal() + position);
            let mut rows: Vec<RowIndex> = (0..num_rows).collect();
            rows.sort_by(|&a, &b| compare_missing_last(values[a], values[b]));
            rows
        };

        let orders = if num_rows > PARALLEL_SORT_ROW_THRESHOLD
            && num_numeric >= PARALLEL_SORT_MIN_ATTRIBUTES
            && ctx.parallelism() > 1
        {
            log::debug!(
                "Sorting {} numeric attributes over {} rows in parallel",
                num_numeric,
                num_rows
            );
            let sort_attribute = &sort_attribute;
            let tasks: Vec<_> = (0..num_numeric)
                .map(|position| move || Ok(sort_attribute(position)))
                .collect();
            ctx.run(tasks)?
        } else {
            (0..num_numeric).map(sort_attribute).collect()
        };

        Ok(Selection { orders })
    }

    /// Partitions a selection on an attribute.
    ///
    /// Nominal attributes yield one child per observed category followed by a
    /// child for missing values; numeric attributes yield `<= threshold`,
    /// `> threshold` and missing, in that order. Empty children are dropped,
    /// so the missing child only exists when some row has a missing value.
    /// A numeric split without a threshold yields no children.
    pub fn split(
        &self,
        selection: &Selection,
        attribute: AttributeIndex,
        threshold: Option<f64>,
    ) -> Vec<ChildSelection> {
        let table = self.table;
        let source = table.source_index(attribute);

        if table.is_nominal(attribute) {
            let codes = table.nominal_values(attribute);
            let missing = table.missing_code(attribute);
            let groups = self.partition(selection, usize::from(missing) + 1, |row| {
                usize::from(codes[row])
            });
            return groups
                .into_iter()
                .enumerate()
                .filter(|(_, orders)| !orders[0].is_empty())
                .map(|(code, orders)| ChildSelection {
                    condition: SplitCondition::NominalEquals {
                        attribute: source,
                        category: (code < usize::from(missing)).then_some(code),
                    },
                    selection: Selection { orders },
                })
                .collect();
        }

        let threshold = match threshold {
            Some(threshold) => threshold,
            None => return Vec::new(),
        };
        let values = table.numeric_values(attribute);
        let groups = self.partition(selection, 3, |row| {
            let value = values[row];
            if value.is_nan() {
                2
            } else if value <= threshold {
                0
            } else {
                1
            }
        });

        groups
            .into_iter()
            .enumerate()
            .filter(|(_, orders)| !orders[0].is_empty())
            .map(|(group, orders)| {
                let condition = match group {
                    0 => SplitCondition::LessOrEqual {
                        attribute: source,
                        threshold,
                    },
                    1 => SplitCondition::Greater {
                        attribute: source,
                        threshold,
                    },
                    _ => SplitCondition::IsMissing { attribute: source },
                };
                ChildSelection {
                    condition,
                    selection: Selection { orders },
                }
            })
            .collect()
    }

    /// Distributes every order of `selection` into `num_groups` groups,
    /// keeping relative order.
    fn partition<G>(
        &self,
        selection: &Selection,
        num_groups: usize,
        group_of: G,
    ) -> Vec<Vec<Vec<RowIndex>>>
    where
        G: Fn(RowIndex) -> usize,
    {
        let num_orders = selection.orders.len();
        let mut groups = vec![vec![Vec::new(); num_orders]; num_groups];
        for (k, order) in selection.orders.iter().enumerate() {
            for &row in order {
                groups[group_of(row)][k].push(row);
            }
        }
        groups
    }
}

/// Removes an attribute from a candidate list.
///
/// Used after a nominal split: the attribute cannot be split upon again below
/// that node.
pub fn remove_attribute(
    attributes: &[AttributeIndex],
    attribute: AttributeIndex,
) -> Vec<AttributeIndex> {
    attributes
        .iter()
        .copied()
        .filter(|&a| a != attribute)
        .collect()
}

fn compare_missing_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}
