//! Per-node induction step and the node arena used by the schedulers.
//!
//! [`NodeBuilder::process_node`] decides what happens to one pending node
//! without knowing in which order nodes are visited: it either finalizes a
//! leaf or returns the children of the accepted split. Schedulers own the
//! traversal and record results in a [`NodeArena`].

use crate::config::TreeConfig;
use crate::core::error::{Result, TreeError};
use crate::core::types::{AttributeIndex, NodeIndex};
use crate::core::utils::ConcurrencyContext;
use crate::dataset::ColumnTable;
use crate::tree::criterion::Criterion;
use crate::tree::leaf::LeafWriter;
use crate::tree::node::{Edge, Leaf, TreeNode};
use crate::tree::sampling::AttributePreprocessing;
use crate::tree::selection::{remove_attribute, ChildSelection, Selection, SelectionManager};
use crate::tree::split::{Benefit, BenefitCalculator, SplitFinder};
use crate::tree::termination::Termination;
use rand::rngs::StdRng;

/// A node waiting to be processed.
#[derive(Debug, Clone)]
pub struct PendingNode {
    /// Depth of the node (the root has depth 1)
    pub depth: usize,
    pub selection: Selection,
    /// Attributes that may still be split upon
    pub attributes: Vec<AttributeIndex>,
}

/// Outcome of processing a pending node.
#[derive(Debug)]
pub enum NodeAction {
    Leaf(Leaf),
    Split {
        benefit: Benefit,
        /// Non-empty children, in edge order
        children: Vec<ChildSelection>,
        /// Candidate attributes of every child
        attributes: Vec<AttributeIndex>,
    },
}

/// Decides the fate of single nodes.
#[derive(Debug)]
pub struct NodeBuilder<'a> {
    table: &'a ColumnTable,
    config: &'a TreeConfig,
    criterion: &'a dyn Criterion,
    leaf_writer: &'a dyn LeafWriter,
    terminations: &'a [Box<dyn Termination>],
    preprocessing: Option<&'a dyn AttributePreprocessing>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(
        table: &'a ColumnTable,
        config: &'a TreeConfig,
        criterion: &'a dyn Criterion,
        leaf_writer: &'a dyn LeafWriter,
        terminations: &'a [Box<dyn Termination>],
        preprocessing: Option<&'a dyn AttributePreprocessing>,
    ) -> Self {
        NodeBuilder {
            table,
            config,
            criterion,
            leaf_writer,
            terminations,
            preprocessing,
        }
    }

    pub fn table(&self) -> &'a ColumnTable {
        self.table
    }

    /// Processes one node.
    ///
    /// Stop predicates are checked first: the minimal size for a split when
    /// pre-pruning, then every termination predicate. Otherwise benefits are
    /// ranked and the best candidate plus up to `prepruning_alternatives`
    /// others are tried in order; the first accepted split wins. A node
    /// whose candidates are all rejected becomes a leaf over its own rows.
    pub fn process_node(
        &self,
        node: &PendingNode,
        parallel: bool,
        ctx: &ConcurrencyContext,
        rng: &mut StdRng,
    ) -> Result<NodeAction> {
        if self.should_stop(node) {
            return Ok(self.leaf(node));
        }

        let candidates = match self.preprocessing {
            Some(preprocessing) if !node.attributes.is_empty() => {
                preprocessing.preprocess(&node.attributes, rng)
            }
            _ => node.attributes.clone(),
        };

        let finder = SplitFinder::new(self.table, self.criterion, self.config.split_search);
        let benefits =
            BenefitCalculator::new(finder).evaluate(&node.selection, &candidates, ctx, parallel, rng)?;

        let selections = SelectionManager::new(self.table);
        let tries = 1 + self.config.prepruning_alternatives;
        for benefit in benefits.iter().take(tries) {
            if !self.is_acceptable(benefit.score) {
                continue;
            }

            let mut children = selections.split(&node.selection, benefit.attribute, benefit.threshold);
            if children.len() < 2 {
                continue;
            }
            if self.config.apply_prepruning
                && children
                    .iter()
                    .any(|child| child.selection.len() < self.config.minimal_leaf_size)
            {
                continue;
            }

            let attribute = self.table.attribute(benefit.attribute);
            children.sort_by_cached_key(|child| child.condition.canonical_key(attribute));
            let attributes = if self.table.is_nominal(benefit.attribute) {
                remove_attribute(&node.attributes, benefit.attribute)
            } else {
                node.attributes.clone()
            };
            return Ok(NodeAction::Split {
                benefit: *benefit,
                children,
                attributes,
            });
        }

        Ok(self.leaf(node))
    }

    fn should_stop(&self, node: &PendingNode) -> bool {
        if self.config.apply_prepruning && node.selection.len() < self.config.minimal_size_for_split {
            return true;
        }
        self.terminations.iter().any(|termination| {
            termination.should_stop(self.table, &node.selection, &node.attributes, node.depth)
        })
    }

    fn is_acceptable(&self, score: f64) -> bool {
        if self.config.apply_prepruning {
            score > 0.0 && score >= self.config.minimal_gain
        } else {
            score.is_finite() && score > 0.0
        }
    }

    fn leaf(&self, node: &PendingNode) -> NodeAction {
        NodeAction::Leaf(self.leaf_writer.write_leaf(self.table, node.selection.rows()))
    }
}

/// Node storage filled while a tree is being built.
///
/// Slots are reserved when a node is scheduled and filled once it has been
/// processed.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<TreeNode>>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reserved slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn reserve(&mut self) -> NodeIndex {
        self.slots.push(None);
        self.slots.len() - 1
    }

    pub fn set(&mut self, index: NodeIndex, node: TreeNode) {
        self.slots[index] = Some(node);
    }

    /// Records a split node and reserves one slot per child.
    ///
    /// Returns the reserved child indices paired with the children's pending
    /// state, in edge order.
    pub fn set_split(
        &mut self,
        index: NodeIndex,
        node: &PendingNode,
        benefit: Benefit,
        children: Vec<ChildSelection>,
        attributes: Vec<AttributeIndex>,
        table: &ColumnTable,
    ) -> Vec<(NodeIndex, PendingNode)> {
        let mut edges = Vec::with_capacity(children.len());
        let mut pending = Vec::with_capacity(children.len());
        for child in children {
            let child_index = self.reserve();
            edges.push(Edge {
                condition: child.condition,
                child: child_index,
            });
            pending.push((
                child_index,
                PendingNode {
                    depth: node.depth + 1,
                    selection: child.selection,
                    attributes: attributes.clone(),
                },
            ));
        }
        self.set(
            index,
            TreeNode::new_split(
                node.depth,
                node.selection.len(),
                table.source_index(benefit.attribute),
                benefit.score,
                edges,
            ),
        );
        pending
    }

    /// Places a separately built subtree at `index`.
    ///
    /// The subtree root (its node 0) fills `index`; its other nodes are
    /// appended and their child references shifted accordingly.
    pub fn graft(&mut self, index: NodeIndex, subtree: Vec<TreeNode>) {
        let base = self.slots.len();
        let map = |child: NodeIndex| {
            if child == 0 {
                index
            } else {
                base + child - 1
            }
        };
        for (position, mut node) in subtree.into_iter().enumerate() {
            node.remap_children(map);
            if position == 0 {
                self.slots[index] = Some(node);
            } else {
                self.slots.push(Some(node));
            }
        }
    }

    /// Returns all nodes, failing if a reserved slot was never filled.
    pub fn into_nodes(self) -> Result<Vec<TreeNode>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| TreeError::internal(format!("tree node {} was never built", index)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::dataset::{Attribute, DatasetBuilder};
    use crate::tree::criterion::InformationGain;
    use crate::tree::leaf::ClassificationLeafWriter;
    use crate::tree::termination::default_terminations;
    use rand::SeedableRng;

    fn table(values: &[f64], labels: &[f64]) -> ColumnTable {
        let mut builder = DatasetBuilder::new()
            .attribute(Attribute::numeric("x"))
            .label(Attribute::nominal("class", ["a", "b"]));
        for (&value, &label) in values.iter().zip(labels) {
            builder = builder.row(&[value], label);
        }
        let ctx = ConcurrencyContext::sequential().unwrap();
        ColumnTable::build(&builder.build().unwrap(), &ctx, false).unwrap()
    }

    fn process(table: &ColumnTable, config: &TreeConfig) -> NodeAction {
        let ctx = ConcurrencyContext::sequential().unwrap();
        let terminations = default_terminations(config);
        let builder = NodeBuilder::new(
            table,
            config,
            &InformationGain,
            &ClassificationLeafWriter,
            &terminations,
            None,
        );
        let root = PendingNode {
            depth: 1,
            selection: SelectionManager::new(table).start_selection(&ctx).unwrap(),
            attributes: table.attribute_indices(),
        };
        builder
            .process_node(&root, false, &ctx, &mut StdRng::seed_from_u64(0))
            .unwrap()
    }

    #[test]
    fn test_split_below_minimal_leaf_size_is_rejected() {
        // The only threshold (1.5) separates one row from three.
        let table = table(&[1.0, 2.0, 2.0, 2.0], &[0.0, 1.0, 1.0, 1.0]);
        let config = ConfigBuilder::new()
            .minimal_leaf_size(3)
            .minimal_size_for_split(4)
            .minimal_gain(0.0)
            .build()
            .unwrap();

        match process(&table, &config) {
            NodeAction::Leaf(leaf) => assert_eq!(leaf.class_counts(), Some(&[1, 3][..])),
            NodeAction::Split { .. } => panic!("split with a child of one row was accepted"),
        }
    }

    #[test]
    fn test_split_accepted_without_prepruning() {
        let table = table(&[1.0, 2.0, 2.0, 2.0], &[0.0, 1.0, 1.0, 1.0]);
        let config = ConfigBuilder::new()
            .apply_prepruning(false)
            .minimal_leaf_size(3)
            .build()
            .unwrap();

        match process(&table, &config) {
            NodeAction::Split {
                benefit, children, ..
            } => {
                assert_eq!(benefit.threshold, Some(1.5));
                assert_eq!(children.len(), 2);
                assert_eq!(children[0].selection.len(), 1);
            }
            NodeAction::Leaf(_) => panic!("expected a split"),
        }
    }

    #[test]
    fn test_small_node_stops_when_prepruning() {
        let table = table(&[1.0, 2.0, 3.0], &[0.0, 1.0, 1.0]);
        let config = ConfigBuilder::new().minimal_size_for_split(4).build().unwrap();

        assert!(matches!(process(&table, &config), NodeAction::Leaf(_)));
    }

    #[test]
    fn test_arena_graft_shifts_children() {
        let mut arena = NodeArena::new();
        let root = arena.reserve();
        let slot = arena.reserve();
        arena.set(root, TreeNode::new_leaf(1, Leaf::from_class_counts(vec![1, 0])));

        let subtree = vec![
            TreeNode::new_split(
                2,
                2,
                0,
                0.5,
                vec![
                    Edge {
                        condition: crate::tree::node::SplitCondition::LessOrEqual {
                            attribute: 0,
                            threshold: 1.0,
                        },
                        child: 1,
                    },
                    Edge {
                        condition: crate::tree::node::SplitCondition::Greater {
                            attribute: 0,
                            threshold: 1.0,
                        },
                        child: 2,
                    },
                ],
            ),
            TreeNode::new_leaf(3, Leaf::from_class_counts(vec![1, 0])),
            TreeNode::new_leaf(3, Leaf::from_class_counts(vec![0, 1])),
        ];
        arena.graft(slot, subtree);

        let nodes = arena.into_nodes().unwrap();
        assert_eq!(nodes.len(), 4);
        let children: Vec<_> = nodes[slot].edges().iter().map(|e| e.child).collect();
        assert_eq!(children, vec![2, 3]);
    }

    #[test]
    fn test_unfilled_slot_is_an_error() {
        let mut arena = NodeArena::new();
        arena.reserve();
        assert!(matches!(arena.into_nodes(), Err(TreeError::Internal { .. })));
    }
}
