//! Post-pruning behaviour on learned trees.

mod common;

use column_tree::*;
use common::*;

fn learn_unpruned(dataset: &RowDataset) -> Tree {
    let config = ConfigBuilder::new()
        .apply_pruning(false)
        .minimal_size_for_split(2)
        .minimal_leaf_size(1)
        .minimal_gain(0.0)
        .build()
        .unwrap();
    TreeLearner::new(config)
        .unwrap()
        .learn(dataset, &context(1))
        .unwrap()
}

#[test]
fn test_pruning_never_grows_tree() {
    for seed in [1, 2, 3] {
        let dataset = create_classification_dataset(500, seed);
        let mut tree = learn_unpruned(&dataset);
        let before = tree.num_nodes();

        let collapsed = PessimisticPruner::new(0.25).prune(&mut tree);

        assert!(tree.num_nodes() <= before);
        if collapsed == 0 {
            assert_eq!(tree.num_nodes(), before);
        } else {
            assert!(tree.num_nodes() < before);
        }
        tree.validate().unwrap();
    }
}

#[test]
fn test_pruning_keeps_row_counts() {
    let dataset = create_classification_dataset(400, 17);
    let mut tree = learn_unpruned(&dataset);
    PessimisticPruner::new(0.25).prune(&mut tree);

    let total: usize = tree.leaves().map(|leaf| leaf.num_rows()).sum();
    assert_eq!(total, dataset.num_rows());
    assert_eq!(tree.root().num_rows(), dataset.num_rows());

    let routed = routed_counts(&tree, &dataset);
    for (index, node) in tree.nodes().iter().enumerate() {
        if let Some(leaf) = node.leaf() {
            assert_eq!(leaf.num_rows(), routed[index]);
        }
    }
}

#[test]
fn test_surviving_leaf_parents_beat_collapse() {
    let dataset = create_classification_dataset(500, 23);
    let mut tree = learn_unpruned(&dataset);
    let pruner = PessimisticPruner::new(0.25);
    pruner.prune(&mut tree);

    // Every remaining split whose children are all leaves must have lost the
    // collapse comparison.
    for node in tree.nodes() {
        let children: Option<Vec<&Leaf>> = node
            .edges()
            .iter()
            .map(|edge| tree.node(edge.child).and_then(|child| child.leaf()))
            .collect();
        let children = match children {
            Some(children) if !children.is_empty() => children,
            _ => continue,
        };

        let mut merged = vec![0; tree.label_attribute().num_categories()];
        for leaf in &children {
            for (sum, count) in merged.iter_mut().zip(leaf.class_counts().unwrap()) {
                *sum += count;
            }
        }
        let own = pruner.leaf_error(&Leaf::from_class_counts(merged));
        assert!(own - 0.001 > pruner.children_error(&children));

        let first = children[0].class();
        assert!(children.iter().any(|leaf| leaf.class() != first));
    }
}

#[test]
fn test_regression_trees_are_not_pruned() {
    let dataset = create_regression_dataset(200, 3);
    let config = ConfigBuilder::new()
        .criterion(CriterionType::LeastSquares)
        .apply_pruning(false)
        .build()
        .unwrap();
    let mut tree = TreeLearner::new(config)
        .unwrap()
        .learn(&dataset, &context(1))
        .unwrap();
    let before = tree.clone();

    assert_eq!(PessimisticPruner::new(0.25).prune(&mut tree), 0);
    assert_eq!(tree, before);
}

#[test]
fn test_pruning_option_leaves_regression_tree_unchanged() {
    let dataset = create_regression_dataset(200, 9);
    let learn = |apply_pruning: bool| {
        let config = ConfigBuilder::new()
            .criterion(CriterionType::LeastSquares)
            .apply_pruning(apply_pruning)
            .build()
            .unwrap();
        TreeLearner::new(config)
            .unwrap()
            .learn(&dataset, &context(1))
            .unwrap()
    };

    assert_eq!(learn(true), learn(false));
}
