//! ID3 Decision Tree Engine
//!
//! Induces classification trees from categorical examples using entropy and
//! information gain, classifies new examples with them, and scores the
//! procedure with k-fold cross-validation.
//!
//! Modules:
//! - `attribute`: Categorical attributes, the catalog and the leaf marker
//! - `example`: Validated examples and example tables
//! - `entropy`: Entropy, remainder and information gain
//! - `builder`: Multi-way and depth-bounded binary tree induction
//! - `tree`: Arena-backed tree structure and pre-order dump
//! - `classify`: Tree traversal with explicit unknown-branch policy
//! - `cross_validation`: Round-robin k-fold evaluation
//! - `errors`: Error types

pub mod attribute;
pub mod builder;
pub mod classify;
pub mod cross_validation;
pub mod entropy;
pub mod errors;
pub mod example;
pub mod tree;

pub use attribute::{Attribute, AttributeCatalog, TERMINAL_MARKER};
pub use builder::{BuildConfig, FallbackPolicy, SplitMode, TreeBuilder};
pub use classify::{UnknownPolicy, UNKNOWN_LABEL};
pub use cross_validation::{
    k_fold, CrossValidationConfig, CrossValidationReport, CrossValidator, FoldResult,
};
pub use entropy::{entropy, gain, remainder, Entropy};
pub use errors::{Id3Error, Result};
pub use example::{Example, ExampleTable};
pub use tree::{NodeId, Tree, TreeNode};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a tree with the default multi-way configuration
pub fn build_tree(
    table: &ExampleTable,
    classifier: &Attribute,
    candidates: &AttributeCatalog,
) -> Result<Tree> {
    TreeBuilder::default().build(table, classifier, candidates)
}
