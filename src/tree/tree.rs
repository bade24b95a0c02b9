//! Decision tree produced by induction.
//!
//! Nodes live in a contiguous arena in canonical pre-order: the root is at
//! index 0 and every child has a larger index than its parent. Two trees with
//! the same structure therefore have identical arenas, whichever scheduling
//! strategy built them.

use crate::core::error::{Result, TreeError};
use crate::core::types::{LabelKind, NodeIndex};
use crate::dataset::Attribute;
use crate::tree::node::{Leaf, LeafStatistics, NodeKind, Prediction, TreeNode};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision tree over the attributes of a source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Node arena (index 0 is always the root)
    nodes: Vec<TreeNode>,
    /// Attributes of the source dataset, indexed by split conditions
    attributes: Vec<Attribute>,
    /// Label metadata
    label: Attribute,
}

impl Tree {
    /// Assembles a tree from an arena whose root is at index 0.
    ///
    /// Unreachable nodes are dropped and the remaining ones renumbered in
    /// pre-order.
    pub(crate) fn from_arena(
        nodes: Vec<TreeNode>,
        attributes: Vec<Attribute>,
        label: Attribute,
    ) -> Result<Self> {
        crate::ensure!(
            !nodes.is_empty(),
            TreeError::tree_construction("tree has no nodes")
        );
        let mut tree = Tree {
            nodes,
            attributes,
            label,
        };
        tree.compact();
        tree.validate()?;
        Ok(tree)
    }

    /// Returns the number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Returns the largest node depth (1 for a single leaf).
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Leaves in pre-order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> + '_ {
        self.nodes.iter().filter_map(TreeNode::leaf)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn label_attribute(&self) -> &Attribute {
        &self.label
    }

    pub fn label_kind(&self) -> LabelKind {
        if self.label.is_nominal() {
            LabelKind::Nominal
        } else {
            LabelKind::Numeric
        }
    }

    /// Follows edge conditions from the root for one row of source values.
    ///
    /// Returns the index of the leaf reached, or of the internal node where
    /// no edge condition matched the row.
    pub fn route(&self, row: ArrayView1<'_, f64>) -> NodeIndex {
        let mut index = 0;
        loop {
            let next = self.nodes[index]
                .edges()
                .iter()
                .find(|edge| edge.condition.matches(row[edge.condition.attribute()]));
            match next {
                Some(edge) => index = edge.child,
                None => return index,
            }
        }
    }

    /// Sums split scores per source attribute.
    pub fn attribute_importance(&self) -> Vec<f64> {
        let mut importance = vec![0.0; self.attributes.len()];
        for node in &self.nodes {
            if let NodeKind::Split {
                attribute, score, ..
            } = node.kind()
            {
                if let Some(slot) = importance.get_mut(*attribute) {
                    *slot += score;
                }
            }
        }
        importance
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    /// Drops unreachable nodes and renumbers the rest in pre-order, visiting
    /// children in edge order.
    pub(crate) fn compact(&mut self) {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.nodes[index].edges().iter().rev().map(|edge| edge.child));
        }

        let mut new_index = vec![usize::MAX; self.nodes.len()];
        for (position, &old) in order.iter().enumerate() {
            new_index[old] = position;
        }

        let mut old_nodes: Vec<Option<TreeNode>> = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(Some)
            .collect();
        self.nodes = order
            .iter()
            .filter_map(|&old| old_nodes[old].take())
            .map(|mut node| {
                node.remap_children(|child| new_index[child]);
                node
            })
            .collect();
    }

    /// Checks the structural invariants of the arena.
    pub fn validate(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            match node.kind() {
                NodeKind::Leaf(leaf) => {
                    if leaf.num_rows() != node.num_rows() {
                        return Err(TreeError::tree_construction(format!(
                            "leaf {} records {} rows but its statistics sum to {}",
                            index,
                            node.num_rows(),
                            leaf.num_rows()
                        )));
                    }
                }
                NodeKind::Split { edges, .. } => {
                    if edges.is_empty() {
                        return Err(TreeError::tree_construction(format!(
                            "internal node {} has no children",
                            index
                        )));
                    }
                    let mut routed = 0;
                    for edge in edges {
                        let child = self.nodes.get(edge.child).ok_or_else(|| {
                            TreeError::tree_construction(format!(
                                "node {} references missing child {}",
                                index, edge.child
                            ))
                        })?;
                        if edge.child <= index || child.depth() != node.depth() + 1 {
                            return Err(TreeError::tree_construction(format!(
                                "child {} of node {} is out of order",
                                edge.child, index
                            )));
                        }
                        routed += child.num_rows();
                    }
                    if routed != node.num_rows() {
                        return Err(TreeError::tree_construction(format!(
                            "node {} has {} rows but its children hold {}",
                            index,
                            node.num_rows(),
                            routed
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns a textual drawing of the tree.
    pub fn to_string_representation(&self) -> String {
        let mut result = String::new();
        self.write_subtree(0, "", &mut result);
        result
    }

    fn write_subtree(&self, index: NodeIndex, prefix: &str, result: &mut String) {
        let node = &self.nodes[index];
        let edges = node.edges();
        for (position, edge) in edges.iter().enumerate() {
            let is_last = position + 1 == edges.len();
            let branch = if is_last { "└── " } else { "├── " };
            let name = self
                .attributes
                .get(edge.condition.attribute())
                .map(|attribute| attribute.name.as_str())
                .unwrap_or("?");
            let key = self
                .attributes
                .get(edge.condition.attribute())
                .map(|attribute| edge.condition.canonical_key(attribute))
                .unwrap_or_default();

            let child = &self.nodes[edge.child];
            match child.leaf() {
                Some(leaf) => result.push_str(&format!(
                    "{}{}{} {}: {}\n",
                    prefix,
                    branch,
                    name,
                    key,
                    self.describe_leaf(leaf)
                )),
                None => {
                    result.push_str(&format!("{}{}{} {}\n", prefix, branch, name, key));
                    let child_prefix =
                        format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                    self.write_subtree(edge.child, &child_prefix, result);
                }
            }
        }
        if let Some(leaf) = node.leaf() {
            if index == 0 {
                result.push_str(&format!("{}\n", self.describe_leaf(leaf)));
            }
        }
    }

    fn describe_leaf(&self, leaf: &Leaf) -> String {
        match (&leaf.prediction, &leaf.statistics) {
            (Prediction::Class(class), LeafStatistics::ClassCounts(counts)) => {
                let class_name = |c: usize| {
                    self.label
                        .category_name(c)
                        .map(str::to_string)
                        .unwrap_or_else(|| c.to_string())
                };
                let counts = counts
                    .iter()
                    .enumerate()
                    .map(|(c, count)| format!("{}={}", class_name(c), count))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{} {{{}}}", class_name(*class), counts)
            }
            (prediction, statistics) => {
                let count = match statistics {
                    LeafStatistics::ClassCounts(counts) => counts.iter().sum(),
                    LeafStatistics::Count(count) => *count,
                };
                format!("{} ({} rows)", prediction, count)
            }
        }
    }

    /// Converts the tree to a JSON representation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Creates a tree from a JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Tree = serde_json::from_str(json)?;
        tree.validate()?;
        Ok(tree)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_representation())
    }
}
