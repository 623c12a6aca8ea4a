//! Decision-tree representation.
//!
//! Trees are stored as an arena of [`TreeNode`]s with the root at index 0.
//! They can also be built from the flat parallel-array layout exported by
//! common ML libraries, see [`FlatTree`].

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Index of a node in a [`DecisionTree`].
pub type NodeId = usize;

/// A single node of a binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node testing one binary feature.
    ///
    /// `feature == None` marks an undefined split: both children are
    /// reachable without constraining any feature.
    Split {
        /// Index into the feature-name list.
        #[serde(default)]
        feature: Option<usize>,
        /// Child taken when the feature is 0.
        left: NodeId,
        /// Child taken when the feature is 1.
        right: NodeId,
    },
    /// Terminal node with per-class sample counts.
    Leaf {
        /// Weighted sample count for each class.
        class_counts: Vec<f64>,
    },
}

impl TreeNode {
    /// Check if this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

/// Flat parallel-array tree layout.
///
/// Node `i` is a leaf when both `children_left[i]` and `children_right[i]`
/// are `-1`. A negative `feature[i]` on an internal node means the split is
/// undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatTree {
    /// Feature index per node.
    pub feature: Vec<i64>,
    /// Left child per node, `-1` for none.
    pub children_left: Vec<i64>,
    /// Right child per node, `-1` for none.
    pub children_right: Vec<i64>,
    /// Class counts per node.
    pub value: Vec<Vec<f64>>,
}

/// A binary decision tree over boolean features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Create a tree from its nodes. The root is node 0.
    ///
    /// Structure is not checked here; [`crate::extract`] reports malformed
    /// trees as [`SynthError::InvalidTree`].
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Build a tree from the flat parallel-array layout.
    pub fn from_flat(flat: &FlatTree) -> SynthResult<Self> {
        let n = flat.feature.len();
        if flat.children_left.len() != n
            || flat.children_right.len() != n
            || flat.value.len() != n
        {
            return Err(SynthError::InvalidTree(format!(
                "flat arrays disagree in length: feature={}, children_left={}, children_right={}, value={}",
                n,
                flat.children_left.len(),
                flat.children_right.len(),
                flat.value.len()
            )));
        }

        let child = |node: usize, raw: i64| -> SynthResult<NodeId> {
            usize::try_from(raw).map_err(|_| {
                SynthError::InvalidTree(format!("node {node} has invalid child index {raw}"))
            })
        };

        let nodes = (0..n)
            .map(|i| {
                let (left, right) = (flat.children_left[i], flat.children_right[i]);
                match (left, right) {
                    (-1, -1) => Ok(TreeNode::Leaf {
                        class_counts: flat.value[i].clone(),
                    }),
                    (-1, _) | (_, -1) => Err(SynthError::InvalidTree(format!(
                        "node {i} has exactly one child"
                    ))),
                    _ => Ok(TreeNode::Split {
                        feature: usize::try_from(flat.feature[i]).ok(),
                        left: child(i, left)?,
                        right: child(i, right)?,
                    }),
                }
            })
            .collect::<SynthResult<Vec<_>>>()?;

        Ok(Self { nodes })
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        0
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Majority class of a leaf; ties resolve to the lowest class index.
    pub fn majority_class(&self, id: NodeId) -> SynthResult<usize> {
        match self.nodes.get(id) {
            Some(TreeNode::Leaf { class_counts }) => majority(id, class_counts),
            Some(TreeNode::Split { .. }) => Err(SynthError::InvalidTree(format!(
                "node {id} is not a leaf"
            ))),
            None => Err(SynthError::InvalidTree(format!("node {id} does not exist"))),
        }
    }

    /// Leaves reachable under a partial feature assignment.
    ///
    /// `lookup` returns the bit assigned to a feature index, or `None` when
    /// the feature is unconstrained. Undefined splits and unconstrained
    /// features fork into both children.
    pub fn leaves_for(&self, lookup: impl Fn(usize) -> Option<bool>) -> SynthResult<Vec<NodeId>> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        let mut steps = 0usize;

        while let Some(id) = stack.pop() {
            steps += 1;
            if steps > self.nodes.len() {
                return Err(SynthError::InvalidTree("tree contains a cycle".into()));
            }
            match self.nodes.get(id) {
                Some(TreeNode::Leaf { .. }) => leaves.push(id),
                Some(TreeNode::Split {
                    feature,
                    left,
                    right,
                }) => match feature.and_then(&lookup) {
                    Some(false) => stack.push(*left),
                    Some(true) => stack.push(*right),
                    None => {
                        stack.push(*right);
                        stack.push(*left);
                    }
                },
                None => {
                    return Err(SynthError::InvalidTree(format!(
                        "child index {id} out of range"
                    )));
                }
            }
        }

        Ok(leaves)
    }
}

pub(crate) fn majority(id: NodeId, counts: &[f64]) -> SynthResult<usize> {
    if counts.is_empty() {
        return Err(SynthError::InvalidTree(format!(
            "leaf {id} has no class counts"
        )));
    }
    if counts.iter().any(|c| c.is_nan()) {
        return Err(SynthError::InvalidTree(format!(
            "leaf {id} has NaN class counts"
        )));
    }

    let mut best = 0;
    for (i, &c) in counts.iter().enumerate().skip(1) {
        if c > counts[best] {
            best = i;
        }
    }
    Ok(best)
}
