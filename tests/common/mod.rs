//! Common test utilities for column-tree integration tests.

#![allow(dead_code)]

use column_tree::*;
use rand::prelude::*;

/// Context with the given number of threads.
pub fn context(threads: usize) -> ConcurrencyContext {
    ConcurrencyContext::new(threads).expect("thread pool")
}

/// Six rows, one nominal attribute whose value decides the label.
pub fn separable_nominal() -> RowDataset {
    let mut builder = DatasetBuilder::new()
        .attribute(Attribute::nominal("group", ["A", "B"]))
        .label(Attribute::nominal("answer", ["yes", "no"]));
    for (group, answer) in [
        ("A", "yes"),
        ("B", "no"),
        ("A", "yes"),
        ("B", "no"),
        ("A", "yes"),
        ("B", "no"),
    ] {
        builder = builder.named_row(&[group], answer).expect("known categories");
    }
    builder.build().expect("valid dataset")
}

/// Mixed classification data: two numeric attributes, one nominal attribute
/// and a noisy label derived from them. About 2% of the values are missing.
pub fn create_classification_dataset(num_rows: usize, seed: u64) -> RowDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = DatasetBuilder::new()
        .attribute(Attribute::nominal("color", ["red", "green", "blue"]))
        .attribute(Attribute::numeric("x"))
        .attribute(Attribute::numeric("y"))
        .label(Attribute::nominal("class", ["low", "mid", "high"]));

    for _ in 0..num_rows {
        let color = rng.gen_range(0..3) as f64;
        // Coarse grid so that ties between values occur.
        let x = (rng.gen_range(-5.0..5.0_f64) * 4.0).round() / 4.0;
        let y = rng.gen_range(0.0..10.0_f64);

        let score = x + 0.5 * y + if color == 2.0 { 2.0 } else { 0.0 };
        let mut class = if score < 1.0 {
            0.0
        } else if score < 5.0 {
            1.0
        } else {
            2.0
        };
        if rng.gen_bool(0.05) {
            class = rng.gen_range(0..3) as f64;
        }

        let mut values = [color, x, y];
        for value in values.iter_mut() {
            if rng.gen_bool(0.02) {
                *value = f64::NAN;
            }
        }
        builder = builder.row(&values, class);
    }
    builder.build().expect("valid dataset")
}

/// Regression data with a step function of one numeric attribute.
pub fn create_regression_dataset(num_rows: usize, seed: u64) -> RowDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = DatasetBuilder::new()
        .attribute(Attribute::numeric("x"))
        .attribute(Attribute::nominal("flag", ["off", "on"]))
        .label(Attribute::numeric("target"));

    for _ in 0..num_rows {
        let x = rng.gen_range(0.0..10.0_f64);
        let flag = rng.gen_range(0..2) as f64;
        let target = if x < 5.0 { 1.0 } else { 10.0 } + flag + rng.gen_range(-0.1..0.1);
        builder = builder.row(&[x, flag], target);
    }
    builder.build().expect("valid dataset")
}

/// Number of rows of `dataset` routed to each node of `tree`.
pub fn routed_counts(tree: &Tree, dataset: &RowDataset) -> Vec<usize> {
    let mut counts = vec![0; tree.num_nodes()];
    for row in 0..dataset.num_rows() {
        counts[tree.route(dataset.row(row))] += 1;
    }
    counts
}
