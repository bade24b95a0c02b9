//! Sequential scheduling: depth-first over an explicit stack.

use crate::core::error::Result;
use crate::core::utils::ConcurrencyContext;
use crate::tree::learner::builder::{NodeAction, NodeArena, NodeBuilder, PendingNode};
use crate::tree::learner::NodeScheduler;
use crate::tree::node::TreeNode;
use rand::rngs::StdRng;

/// Builds the whole tree on the calling thread.
///
/// Pending nodes are kept on a LIFO stack, so the tree is grown depth-first
/// without recursion. Benefits are always evaluated sequentially.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialScheduler;

impl NodeScheduler for SequentialScheduler {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn build(
        &self,
        builder: &NodeBuilder<'_>,
        root: PendingNode,
        ctx: &ConcurrencyContext,
        rng: &mut StdRng,
    ) -> Result<Vec<TreeNode>> {
        build_subtree(builder, root, ctx, rng)
    }
}

/// Grows the subtree below `root` depth-first. Node 0 of the result is the
/// subtree root.
pub(crate) fn build_subtree(
    builder: &NodeBuilder<'_>,
    root: PendingNode,
    ctx: &ConcurrencyContext,
    rng: &mut StdRng,
) -> Result<Vec<TreeNode>> {
    let mut arena = NodeArena::new();
    let root_index = arena.reserve();
    let mut stack = vec![(root_index, root)];

    while let Some((index, node)) = stack.pop() {
        ctx.check_cancelled()?;

        match builder.process_node(&node, false, ctx, rng)? {
            NodeAction::Leaf(leaf) => arena.set(index, TreeNode::new_leaf(node.depth, leaf)),
            NodeAction::Split {
                benefit,
                children,
                attributes,
            } => {
                let pending =
                    arena.set_split(index, &node, benefit, children, attributes, builder.table());
                stack.extend(pending.into_iter().rev());
            }
        }
    }

    arena.into_nodes()
}
