//! Sequential and concurrent scheduling must grow identical trees.

mod common;

use column_tree::*;
use common::*;
use proptest::prelude::*;

fn learn(dataset: &RowDataset, strategy: SchedulingStrategy, threads: usize) -> Tree {
    let config = ConfigBuilder::new()
        .strategy(strategy)
        .num_threads(threads)
        .build()
        .unwrap();
    TreeLearner::new(config)
        .unwrap()
        .learn(dataset, &context(threads))
        .unwrap()
}

#[test]
fn test_large_dataset_same_tree() {
    // Large enough for the concurrent scheduler to evaluate attributes in
    // parallel near the root before handing subtrees to tasks.
    let dataset = create_classification_dataset(12_000, 42);

    let sequential = learn(&dataset, SchedulingStrategy::Sequential, 1);
    let concurrent = learn(&dataset, SchedulingStrategy::Concurrent, 4);

    assert!(sequential.num_nodes() > 3);
    assert_eq!(sequential, concurrent);
}

#[test]
fn test_thread_count_does_not_matter() {
    let dataset = create_classification_dataset(6_000, 99);

    let two = learn(&dataset, SchedulingStrategy::Concurrent, 2);
    let four = learn(&dataset, SchedulingStrategy::Concurrent, 4);
    assert_eq!(two, four);
}

#[test]
fn test_seeded_random_runs_repeat() {
    let dataset = create_classification_dataset(800, 21);
    let config = ConfigBuilder::new()
        .split_search(SplitSearchType::Randomized)
        .attribute_subset_ratio(0.7)
        .random_seed(5)
        .build()
        .unwrap();
    let learner = TreeLearner::new(config).unwrap();

    let first = learner.learn(&dataset, &context(2)).unwrap();
    let second = learner.learn(&dataset, &context(2)).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_strategies_agree(rows in 20usize..300, seed in any::<u64>()) {
        let dataset = create_classification_dataset(rows, seed);

        let sequential = learn(&dataset, SchedulingStrategy::Sequential, 1);
        let concurrent = learn(&dataset, SchedulingStrategy::Concurrent, 3);
        prop_assert_eq!(sequential, concurrent);
    }
}

fn cancelled_run(num_rows: usize) -> TreeError {
    let dataset = create_classification_dataset(num_rows, 8);
    let ctx = context(4);
    let table = ColumnTable::build(&dataset, &ctx, true).unwrap();
    let config = ConfigBuilder::new()
        .strategy(SchedulingStrategy::Concurrent)
        .build()
        .unwrap();
    let learner = TreeLearner::new(config).unwrap();

    ctx.cancellation_token().cancel();
    learner.learn_from_table(&table, &ctx).unwrap_err()
}

#[test]
fn test_cancelled_concurrent_run_on_large_root() {
    // The root is processed with attribute-parallel evaluation.
    assert!(matches!(cancelled_run(12_000), TreeError::Cancelled));
}

#[test]
fn test_cancelled_concurrent_subtree_tasks() {
    // The root is small enough to be grown as a subtree task.
    assert!(matches!(cancelled_run(300), TreeError::Cancelled));
}
