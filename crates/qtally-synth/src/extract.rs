//! Decision tree to DNF extraction.
//!
//! Every root-to-leaf path ending in a leaf whose majority class is the
//! positive class becomes one [`ConditionSet`]; the returned set is the DNF
//! of the tree's positive region.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SynthError, SynthResult};
use crate::tree::{DecisionTree, NodeId, TreeNode, majority};

/// A single literal: `feature == value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathCondition {
    /// Feature name.
    pub feature: String,
    /// Required bit value.
    pub value: bool,
}

impl PathCondition {
    /// Create a new condition.
    pub fn new(feature: impl Into<String>, value: bool) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }
}

impl fmt::Display for PathCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.feature, u8::from(self.value))
    }
}

/// One DNF term: a sorted, deduplicated conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<PathCondition>);

impl ConditionSet {
    /// Create a condition set, sorting and collapsing duplicates.
    pub fn new(conditions: impl IntoIterator<Item = PathCondition>) -> Self {
        let mut conditions: Vec<_> = conditions.into_iter().collect();
        conditions.sort();
        conditions.dedup();
        Self(conditions)
    }

    /// Conditions in sorted order.
    pub fn conditions(&self) -> &[PathCondition] {
        &self.0
    }

    /// Iterate over the conditions.
    pub fn iter(&self) -> std::slice::Iter<'_, PathCondition> {
        self.0.iter()
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the term has no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required value of a feature, if constrained.
    ///
    /// When a feature appears with both values the first (`false`) wins;
    /// such terms are contradictory and never satisfied.
    pub fn value_of(&self, feature: &str) -> Option<bool> {
        self.0.iter().find(|c| c.feature == feature).map(|c| c.value)
    }

    /// Check if some feature is required to be both 0 and 1.
    pub fn is_contradictory(&self) -> bool {
        self.0
            .windows(2)
            .any(|w| w[0].feature == w[1].feature && w[0].value != w[1].value)
    }
}

impl<'a> IntoIterator for &'a ConditionSet {
    type Item = &'a PathCondition;
    type IntoIter = std::slice::Iter<'a, PathCondition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "}}")
    }
}

/// Extract the positive-class DNF terms of a decision tree.
///
/// `feature_names[i]` names the feature tested by splits with index `i`.
pub fn extract<S: AsRef<str>>(
    tree: &DecisionTree,
    feature_names: &[S],
    positive_class_index: usize,
) -> SynthResult<BTreeSet<ConditionSet>> {
    if tree.is_empty() {
        return Err(SynthError::InvalidTree("tree has no nodes".into()));
    }

    let mut visited = vec![false; tree.len()];
    let mut terms = BTreeSet::new();
    let mut leaves = 0usize;
    let mut stack: Vec<(NodeId, Vec<PathCondition>)> = vec![(tree.root(), Vec::new())];

    while let Some((id, path)) = stack.pop() {
        let node = tree.node(id).ok_or_else(|| {
            SynthError::InvalidTree(format!("child index {id} out of range"))
        })?;
        if std::mem::replace(&mut visited[id], true) {
            return Err(SynthError::InvalidTree(format!(
                "node {id} is reachable more than once"
            )));
        }

        match node {
            TreeNode::Split {
                feature: None,
                left,
                right,
            } => {
                stack.push((*right, path.clone()));
                stack.push((*left, path));
            }
            TreeNode::Split {
                feature: Some(f),
                left,
                right,
            } => {
                let name = feature_names.get(*f).ok_or_else(|| {
                    SynthError::InvalidTree(format!(
                        "node {id} splits on feature {f} but only {} names were given",
                        feature_names.len()
                    ))
                })?;
                let name = name.as_ref();

                let mut right_path = path.clone();
                right_path.push(PathCondition::new(name, true));
                let mut left_path = path;
                left_path.push(PathCondition::new(name, false));

                stack.push((*right, right_path));
                stack.push((*left, left_path));
            }
            TreeNode::Leaf { class_counts } => {
                leaves += 1;
                if majority(id, class_counts)? == positive_class_index {
                    terms.insert(ConditionSet::new(path));
                }
            }
        }
    }

    debug!(
        nodes = tree.len(),
        leaves,
        terms = terms.len(),
        positive_class_index,
        "extracted condition sets"
    );

    Ok(terms)
}
