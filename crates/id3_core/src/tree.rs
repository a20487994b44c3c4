//! Induced decision tree structure
//!
//! Nodes live in a single arena owned by [`Tree`] (node 0 is the root) and
//! refer to one another by [`NodeId`]. Parent links are plain indices used
//! only to look up ancestors; children are owned through the arena.

use std::fmt;

use crate::attribute::{Attribute, AttributeCatalog};
use crate::example::ExampleTable;

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One point in the induced tree
///
/// A leaf's split attribute is a terminal marker named after the predicted
/// class. Children are kept sorted by branch value.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub(crate) split_attribute: Attribute,
    pub(crate) examples: ExampleTable,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<(String, NodeId)>,
}

impl TreeNode {
    pub fn leaf(label: impl Into<String>, examples: ExampleTable, parent: Option<NodeId>) -> Self {
        Self {
            split_attribute: Attribute::terminal(label),
            examples,
            parent,
            children: Vec::new(),
        }
    }

    /// Branching attribute, or the terminal marker for a leaf
    pub fn split_attribute(&self) -> &Attribute {
        &self.split_attribute
    }

    /// Training examples that reached this node
    pub fn examples(&self) -> &ExampleTable {
        &self.examples
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// `(branch value, child)` pairs in sorted branch order
    pub fn children(&self) -> &[(String, NodeId)] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.split_attribute.is_terminal()
    }

    /// Predicted class if this node is a leaf
    pub fn label(&self) -> Option<&str> {
        self.is_leaf().then(|| self.split_attribute.name())
    }

    /// Child reached by `value`, if that branch exists
    pub fn child(&self, value: &str) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(branch, _)| branch == value)
            .map(|(_, id)| *id)
    }
}

/// `from` followed by each of its ancestors, following parent links in `nodes`
///
/// Also walks the partial arena of a tree still being built.
pub(crate) fn ancestor_chain(nodes: &[TreeNode], from: NodeId) -> impl Iterator<Item = &TreeNode> {
    std::iter::successors(nodes.get(from.index()), move |node| {
        node.parent.and_then(|parent| nodes.get(parent.index()))
    })
}

/// A built tree plus the classifier and catalog it was trained with
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    classifier: Attribute,
    catalog: AttributeCatalog,
}

impl Tree {
    pub(crate) fn new(nodes: Vec<TreeNode>, classifier: Attribute, catalog: AttributeCatalog) -> Self {
        Self {
            nodes,
            classifier,
            catalog,
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[NodeId::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn classifier(&self) -> &Attribute {
        &self.classifier
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.depth_from(NodeId::ROOT)
    }

    fn depth_from(&self, id: NodeId) -> usize {
        self.nodes[id.index()]
            .children
            .iter()
            .map(|(_, child)| 1 + self.depth_from(*child))
            .max()
            .unwrap_or(0)
    }

    /// `id` followed by each of its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> {
        ancestor_chain(&self.nodes, id)
    }

    /// Validate arena structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }
        if self.root().parent.is_some() {
            return Err("Root node has a parent".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if !node.children.is_empty() {
                    return Err(format!("Leaf node {i} has children"));
                }
                continue;
            }
            if node.children.is_empty() {
                return Err(format!("Internal node {i} has no children"));
            }
            for window in node.children.windows(2) {
                if window[0].0 >= window[1].0 {
                    return Err(format!("Node {i} children are not sorted by branch value"));
                }
            }
            for (value, child) in &node.children {
                match self.node(*child) {
                    Some(c) if c.parent == Some(NodeId(i)) => {}
                    Some(_) => {
                        return Err(format!("Child {} of node {i} has wrong parent", child.0))
                    }
                    None => {
                        return Err(format!("Node {i} branch {value} points outside the tree"))
                    }
                }
            }
        }

        Ok(())
    }

    /// Pre-order text rendering, one line per node
    ///
    /// The root line holds class counts over the classifier's sorted legal
    /// values. Each child line is indented by depth and reads
    /// `attribute = value: [counts]`, with ` -> label` appended for leaves.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let root = self.root();
        out.push_str(&self.counts(&root.examples));
        if let Some(label) = root.label() {
            out.push_str(&format!(" -> {label}"));
        }
        out.push('\n');
        self.dump_children(NodeId::ROOT, 1, &mut out);
        out
    }

    fn dump_children(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = &self.nodes[id.index()];
        for (value, child_id) in &node.children {
            let child = &self.nodes[child_id.index()];
            out.push_str(&"| ".repeat(depth));
            out.push_str(&format!(
                "{} = {}: {}",
                node.split_attribute.name(),
                value,
                self.counts(&child.examples)
            ));
            if let Some(label) = child.label() {
                out.push_str(&format!(" -> {label}"));
            }
            out.push('\n');
            self.dump_children(*child_id, depth + 1, out);
        }
    }

    fn counts(&self, examples: &ExampleTable) -> String {
        let counts: Vec<String> = self
            .classifier
            .sorted_values()
            .into_iter()
            .map(|value| {
                let count = examples
                    .iter()
                    .filter(|example| example.value(&self.classifier) == Some(value))
                    .count();
                format!("{count} {value}")
            })
            .collect();
        format!("[{}]", counts.join(" / "))
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
