//! ID3 tree builder
//!
//! Grows a tree by recursively partitioning an example table on the
//! attribute with the highest information gain. Two configurations share
//! the same gain evaluator:
//!
//! - **Multi-way** (classic ID3): one branch per legal value of the chosen
//!   attribute, empty branches and exhausted tied nodes labelled from the
//!   nearest informative ancestor.
//! - **Binary, depth-bounded**: one branch per value observed in the current
//!   subset (two for binary attributes), majority-labelled leaves once the
//!   depth limit is reached or no split has positive gain.
//!
//! Split selection is deterministic: highest gain wins, equal gains go to the
//! lexicographically smallest attribute name.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

use crate::attribute::{Attribute, AttributeCatalog};
use crate::entropy::{self, ENTROPY_EPSILON};
use crate::errors::{Id3Error, Result};
use crate::example::ExampleTable;
use crate::tree::{ancestor_chain, NodeId, Tree, TreeNode};

/// Branching strategy of the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitMode {
    /// One child per legal value, grown until pure or out of attributes
    #[default]
    MultiWay,
    /// One child per observed value, at most `max_depth` split levels
    Binary {
        #[serde(default)]
        max_depth: Option<usize>,
    },
}

/// What to do when no ancestor of a tied node has a dominant class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Raise [`Id3Error::Construction`]
    #[default]
    Fail,
    /// Label the leaf with the lexicographically smallest classifier value
    SmallestLabel,
}

/// Tree builder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub mode: SplitMode,
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

impl BuildConfig {
    pub fn multi_way() -> Self {
        Self::default()
    }

    /// Binary mode limited to `max_depth` split levels, `None` for unbounded
    pub fn binary(max_depth: Option<usize>) -> Self {
        Self {
            mode: SplitMode::Binary { max_depth },
            ..Self::default()
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Split candidate with gain and name tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate<'a> {
    attribute: &'a Attribute,
    gain: f64,
}

impl SplitCandidate<'_> {
    /// `Greater` when `self` should be preferred over `other`
    fn rank(&self, other: &Self) -> Ordering {
        if (self.gain - other.gain).abs() < ENTROPY_EPSILON {
            other.attribute.name().cmp(self.attribute.name())
        } else if self.gain > other.gain {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

/// Pick the highest-gain attribute, smallest name on ties
fn select_split<'a>(
    table: &ExampleTable,
    classifier: &Attribute,
    candidates: &'a AttributeCatalog,
) -> Option<SplitCandidate<'a>> {
    let mut best: Option<SplitCandidate<'a>> = None;

    for attribute in candidates {
        let candidate = SplitCandidate {
            attribute,
            gain: entropy::gain(table, classifier, attribute),
        };
        trace!(attribute = attribute.name(), gain = candidate.gain, "candidate split");

        best = match best {
            Some(current) if candidate.rank(&current) != Ordering::Greater => Some(current),
            _ => Some(candidate),
        };
    }

    best
}

/// Builds [`Tree`]s from example tables
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: BuildConfig,
}

impl TreeBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Induce a tree predicting `classifier` from `table`
    ///
    /// `candidates` are the attributes the tree may branch on. The classifier
    /// is dropped from them if present.
    pub fn build(
        &self,
        table: &ExampleTable,
        classifier: &Attribute,
        candidates: &AttributeCatalog,
    ) -> Result<Tree> {
        if table.is_empty() {
            return Err(Id3Error::EmptyTable(
                "cannot build a tree without training examples".to_string(),
            ));
        }

        let mut candidates = candidates.clone();
        if candidates.remove(classifier.name()).is_some() {
            debug!(
                classifier = classifier.name(),
                "classifier removed from candidate attributes"
            );
        }

        let mut induction = Induction {
            classifier,
            fallback: self.config.fallback,
            nodes: Vec::new(),
        };

        match self.config.mode {
            SplitMode::MultiWay => {
                induction.grow_multi_way(table.clone(), None, &candidates)?;
            }
            SplitMode::Binary { max_depth } => {
                let limit = depth_limit(max_depth, candidates.len());
                induction.grow_binary(table.clone(), None, &candidates, 1, limit)?;
            }
        }

        let tree = Tree::new(induction.nodes, classifier.clone(), candidates);
        debug!(
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            "tree built"
        );
        Ok(tree)
    }
}

/// Internal level limit for the binary mode, root counting as level 1
///
/// The limit never exceeds one more than the number of attributes available
/// to split on.
fn depth_limit(max_depth: Option<usize>, attribute_count: usize) -> Option<usize> {
    let limit = max_depth? + 1;
    let ceiling = attribute_count + 1;
    if limit > ceiling {
        warn!(
            requested = limit - 1,
            available = attribute_count,
            "max depth exceeds the number of attributes, clamping"
        );
        return Some(ceiling);
    }
    Some(limit)
}

/// State of one tree construction
struct Induction<'a> {
    classifier: &'a Attribute,
    fallback: FallbackPolicy,
    nodes: Vec<TreeNode>,
}

impl Induction<'_> {
    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn grow_multi_way(
        &mut self,
        table: ExampleTable,
        parent: Option<NodeId>,
        candidates: &AttributeCatalog,
    ) -> Result<NodeId> {
        let entropy = table.entropy(self.classifier);

        // Reserve the node; its label or split attribute is settled below.
        let id = self.push(TreeNode::leaf(
            entropy.dominant.clone().unwrap_or_default(),
            table.clone(),
            parent,
        ));

        if entropy.is_pure() {
            return Ok(id);
        }

        if candidates.is_empty() {
            if entropy::has_tied_majority(&table, self.classifier) {
                let label = self.like_parent_like_child(id)?;
                self.nodes[id.index()].split_attribute = Attribute::terminal(label);
            }
            return Ok(id);
        }

        let Some(best) = select_split(&table, self.classifier, candidates) else {
            return Ok(id);
        };
        let winner = best.attribute.clone();
        debug!(attribute = winner.name(), gain = best.gain, examples = table.len(), "split");

        self.nodes[id.index()].split_attribute = winner.clone();
        let remaining = candidates.without(&winner);

        let mut children = Vec::with_capacity(winner.values().len());
        for value in winner.sorted_values() {
            let subset = table.filter(&winner, value);
            let child = if subset.is_empty() {
                let label = self.like_parent_like_child(id)?;
                self.push(TreeNode::leaf(label, subset, Some(id)))
            } else {
                self.grow_multi_way(subset, Some(id), &remaining)?
            };
            children.push((value.to_string(), child));
        }

        self.nodes[id.index()].children = children;
        Ok(id)
    }

    fn grow_binary(
        &mut self,
        table: ExampleTable,
        parent: Option<NodeId>,
        candidates: &AttributeCatalog,
        level: usize,
        limit: Option<usize>,
    ) -> Result<NodeId> {
        let label = entropy::majority_label(&table, self.classifier).ok_or_else(|| {
            Id3Error::Construction("binary split produced an empty branch".to_string())
        })?;
        let id = self.push(TreeNode::leaf(label, table.clone(), parent));

        if limit.is_some_and(|limit| level >= limit) || candidates.is_empty() {
            return Ok(id);
        }

        let best = match select_split(&table, self.classifier, candidates) {
            Some(best) if best.gain > ENTROPY_EPSILON => best,
            _ => return Ok(id),
        };
        let winner = best.attribute.clone();
        debug!(
            attribute = winner.name(),
            gain = best.gain,
            level,
            examples = table.len(),
            "binary split"
        );

        self.nodes[id.index()].split_attribute = winner.clone();
        let remaining = candidates.without(&winner);

        let branches = table.observed_values(&winner);
        let mut children = Vec::with_capacity(branches.len());
        for value in branches {
            let subset = table.filter(&winner, &value);
            let child = self.grow_binary(subset, Some(id), &remaining, level + 1, limit)?;
            children.push((value, child));
        }

        self.nodes[id.index()].children = children;
        Ok(id)
    }

    /// Label for a node that cannot decide from its own examples
    ///
    /// Walks from `from` towards the root and takes the dominant class of the
    /// first node whose entropy is not exactly one bit.
    fn like_parent_like_child(&self, from: NodeId) -> Result<String> {
        for node in ancestor_chain(&self.nodes, from) {
            let entropy = node.examples.entropy(self.classifier);
            if !entropy.is_even_split() {
                if let Some(dominant) = entropy.dominant {
                    return Ok(dominant);
                }
            }
        }

        match self.fallback {
            FallbackPolicy::Fail => Err(Id3Error::Construction(format!(
                "no ancestor of node {} has a dominant {} value",
                from.index(),
                self.classifier.name()
            ))),
            FallbackPolicy::SmallestLabel => {
                let label = self
                    .classifier
                    .sorted_values()
                    .first()
                    .map(|value| value.to_string())
                    .unwrap_or_default();
                warn!(
                    node = from.index(),
                    label = label.as_str(),
                    "no informative ancestor, using smallest classifier value"
                );
                Ok(label)
            }
        }
    }
}
