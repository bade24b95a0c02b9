//! Concurrent scheduling.
//!
//! Phase 1 walks the tree breadth-first and splits large nodes with
//! attribute-parallel benefit evaluation. Nodes that are too small for that
//! to pay off are set aside. Phase 2 grows every set-aside node as an
//! independent task running the sequential scheduler, and grafts the
//! resulting subtrees into the arena.

use crate::core::constants::{NODE_PARALLEL_MIN_ATTRIBUTES, NODE_PARALLEL_ROW_THRESHOLD};
use crate::core::error::Result;
use crate::core::types::NodeIndex;
use crate::core::utils::ConcurrencyContext;
use crate::tree::learner::builder::{NodeAction, NodeArena, NodeBuilder, PendingNode};
use crate::tree::learner::serial::build_subtree;
use crate::tree::learner::NodeScheduler;
use crate::tree::node::TreeNode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Two-phase scheduler mixing attribute-level and node-level parallelism.
///
/// Must only be used for runs that draw no random numbers: subtree tasks get
/// a fresh generator seeded with `seed`.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentScheduler {
    seed: u64,
}

impl ConcurrentScheduler {
    pub fn new(seed: u64) -> Self {
        ConcurrentScheduler { seed }
    }

    fn is_small(node: &PendingNode) -> bool {
        node.attributes.len() < NODE_PARALLEL_MIN_ATTRIBUTES
            || node.selection.len() < NODE_PARALLEL_ROW_THRESHOLD
    }
}

impl NodeScheduler for ConcurrentScheduler {
    fn name(&self) -> &'static str {
        "concurrent"
    }

    fn build(
        &self,
        builder: &NodeBuilder<'_>,
        root: PendingNode,
        ctx: &ConcurrencyContext,
        rng: &mut StdRng,
    ) -> Result<Vec<TreeNode>> {
        let mut arena = NodeArena::new();
        let root_index = arena.reserve();
        let mut queue = VecDeque::from([(root_index, root)]);
        let mut small_nodes: Vec<(NodeIndex, PendingNode)> = Vec::new();

        while let Some((index, node)) = queue.pop_front() {
            if Self::is_small(&node) {
                small_nodes.push((index, node));
                continue;
            }
            ctx.check_cancelled()?;

            match builder.process_node(&node, true, ctx, rng)? {
                NodeAction::Leaf(leaf) => arena.set(index, TreeNode::new_leaf(node.depth, leaf)),
                NodeAction::Split {
                    benefit,
                    children,
                    attributes,
                } => {
                    let pending = arena.set_split(
                        index,
                        &node,
                        benefit,
                        children,
                        attributes,
                        builder.table(),
                    );
                    queue.extend(pending);
                }
            }
        }

        log::debug!(
            "Concurrent phase 1 reserved {} nodes, {} subtrees left for tasks",
            arena.len(),
            small_nodes.len()
        );

        let seed = self.seed;
        let tasks: Vec<_> = small_nodes
            .into_iter()
            .map(|(index, node)| {
                move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    build_subtree(builder, node, ctx, &mut rng).map(|subtree| (index, subtree))
                }
            })
            .collect();

        for (index, subtree) in ctx.run(tasks)? {
            arena.graft(index, subtree);
        }

        arena.into_nodes()
    }
}
