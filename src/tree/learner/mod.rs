//! Tree induction.
//!
//! [`TreeLearner`] turns a dataset into a [`Tree`]: it builds the column
//! table, creates the root selection, lets a [`NodeScheduler`] drive
//! [`NodeBuilder`] over all nodes and finally prunes the result.

pub mod builder;
pub mod parallel;
pub mod serial;

pub use builder::{NodeAction, NodeArena, NodeBuilder, PendingNode};
pub use parallel::ConcurrentScheduler;
pub use serial::SequentialScheduler;

use crate::config::{SchedulingStrategy, TreeConfig};
use crate::core::error::Result;
use crate::core::utils::ConcurrencyContext;
use crate::dataset::{ColumnTable, RowDataset};
use crate::tree::criterion::create_criterion;
use crate::tree::leaf::leaf_writer_for;
use crate::tree::node::TreeNode;
use crate::tree::pruning::{PessimisticPruner, Pruner};
use crate::tree::sampling::{AttributePreprocessing, RandomAttributeSubset};
use crate::tree::selection::SelectionManager;
use crate::tree::termination::default_terminations;
use crate::tree::tree::Tree;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Order in which pending nodes are processed.
pub trait NodeScheduler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Grows the tree below `root`. Node 0 of the returned arena is the root.
    fn build(
        &self,
        builder: &NodeBuilder<'_>,
        root: PendingNode,
        ctx: &ConcurrencyContext,
        rng: &mut StdRng,
    ) -> Result<Vec<TreeNode>>;
}

/// Learns single decision trees.
#[derive(Debug, Clone)]
pub struct TreeLearner {
    config: TreeConfig,
}

impl TreeLearner {
    /// Creates a learner after validating the configuration.
    pub fn new(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(TreeLearner { config })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Builds the column table of `dataset` and learns a tree from it.
    pub fn learn(&self, dataset: &RowDataset, ctx: &ConcurrencyContext) -> Result<Tree> {
        self.config.validate_for_label(dataset.label_kind())?;
        let table = ColumnTable::build(dataset, ctx, self.config.parallel_table_build)?;
        self.learn_from_table(&table, ctx)
    }

    /// Learns a tree from an existing column table.
    ///
    /// The table is only read, so ensembles can share one table across many
    /// trees.
    pub fn learn_from_table(&self, table: &ColumnTable, ctx: &ConcurrencyContext) -> Result<Tree> {
        let config = &self.config;
        config.validate_for_label(table.label_kind())?;
        let start = Instant::now();

        let criterion = create_criterion(config.criterion);
        let leaf_writer = leaf_writer_for(table.label_kind());
        let terminations = default_terminations(config);
        let subset = config.attribute_subset_ratio.map(RandomAttributeSubset::new);
        let preprocessing = subset.as_ref().map(|s| s as &dyn AttributePreprocessing);
        let builder = NodeBuilder::new(
            table,
            config,
            criterion.as_ref(),
            leaf_writer.as_ref(),
            &terminations,
            preprocessing,
        );

        let scheduler = self.scheduler(ctx);
        log::info!(
            "Learning tree on {} rows and {} attributes with {} and the {} scheduler",
            table.num_rows(),
            table.num_attributes(),
            criterion.name(),
            scheduler.name()
        );

        let root = PendingNode {
            depth: 1,
            selection: SelectionManager::new(table).start_selection(ctx)?,
            attributes: table.attribute_indices(),
        };
        let mut rng = StdRng::seed_from_u64(config.random_seed);
        let nodes = scheduler.build(&builder, root, ctx, &mut rng)?;
        let mut tree = Tree::from_arena(
            nodes,
            table.source_attributes().to_vec(),
            table.label_attribute().clone(),
        )?;

        if config.apply_pruning {
            let before = tree.num_nodes();
            let collapsed = PessimisticPruner::new(config.confidence).prune(&mut tree);
            log::debug!(
                "Pruning collapsed {} nodes ({} -> {} nodes)",
                collapsed,
                before,
                tree.num_nodes()
            );
        }

        log::info!(
            "Learned tree with {} nodes, {} leaves and depth {} in {:.2?}",
            tree.num_nodes(),
            tree.num_leaves(),
            tree.depth(),
            start.elapsed()
        );
        Ok(tree)
    }

    /// Scheduler for this run. Runs that draw random numbers and
    /// single-threaded contexts always use the sequential scheduler.
    fn scheduler(&self, ctx: &ConcurrencyContext) -> Box<dyn NodeScheduler> {
        match self.config.strategy {
            SchedulingStrategy::Concurrent
                if !self.config.is_randomized() && ctx.parallelism() > 1 =>
            {
                Box::new(ConcurrentScheduler::new(self.config.random_seed))
            }
            SchedulingStrategy::Concurrent => {
                log::debug!("Falling back to sequential scheduling");
                Box::new(SequentialScheduler)
            }
            SchedulingStrategy::Sequential => Box::new(SequentialScheduler),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBuilder, CriterionType, SplitSearchType};
    use crate::core::error::TreeError;
    use crate::dataset::{Attribute, DatasetBuilder};

    fn weather() -> RowDataset {
        let rows = [
            (["sunny", "hot"], "no"),
            (["sunny", "mild"], "no"),
            (["overcast", "hot"], "yes"),
            (["rain", "mild"], "yes"),
            (["rain", "cool"], "yes"),
            (["overcast", "cool"], "yes"),
            (["sunny", "cool"], "no"),
            (["rain", "mild"], "yes"),
        ];
        let mut builder = DatasetBuilder::new()
            .attribute(Attribute::nominal("outlook", ["sunny", "overcast", "rain"]))
            .attribute(Attribute::nominal("temperature", ["hot", "mild", "cool"]))
            .label(Attribute::nominal("play", ["yes", "no"]));
        for (values, label) in rows {
            builder = builder.named_row(&values, label).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_learns_outlook_split() {
        let config = ConfigBuilder::new()
            .minimal_size_for_split(2)
            .minimal_leaf_size(1)
            .build()
            .unwrap();
        let learner = TreeLearner::new(config).unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();

        let tree = learner.learn(&weather(), &ctx).unwrap();
        assert_eq!(tree.root().split_attribute(), Some(0));
        assert!(tree.leaves().all(|leaf| leaf.errors() == 0));
    }

    #[test]
    fn test_regression_criterion_rejected_for_classes() {
        let config = ConfigBuilder::new()
            .criterion(CriterionType::LeastSquares)
            .build()
            .unwrap();
        let learner = TreeLearner::new(config).unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();

        let err = learner.learn(&weather(), &ctx).unwrap_err();
        assert!(matches!(err, TreeError::Config { .. }));
    }

    #[test]
    fn test_cancelled_run() {
        let learner = TreeLearner::new(TreeConfig::default()).unwrap();
        let ctx = ConcurrencyContext::sequential().unwrap();
        ctx.cancellation_token().cancel();

        let err = learner.learn(&weather(), &ctx).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_randomized_runs_are_sequential() {
        let config = ConfigBuilder::new().attribute_subset_ratio(0.5).build().unwrap();
        let learner = TreeLearner::new(config).unwrap();
        let ctx = ConcurrencyContext::new(2).unwrap();

        assert_eq!(learner.scheduler(&ctx).name(), "sequential");
    }

    #[test]
    fn test_random_split_search_is_sequential() {
        let config = ConfigBuilder::new()
            .split_search(SplitSearchType::Randomized)
            .build()
            .unwrap();
        let learner = TreeLearner::new(config).unwrap();
        let ctx = ConcurrencyContext::new(2).unwrap();

        assert_eq!(learner.scheduler(&ctx).name(), "sequential");

        let exhaustive = TreeLearner::new(TreeConfig::default()).unwrap();
        assert_eq!(exhaustive.scheduler(&ctx).name(), "concurrent");
    }
}
