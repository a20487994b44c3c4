//! Tree traversal for prediction

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Id3Error, Result};
use crate::example::{Example, ExampleTable};
use crate::tree::Tree;

/// Label returned for unmatched branches by [`UnknownPolicy::default_label`]
pub const UNKNOWN_LABEL: &str = "unknown";

/// How to treat an example whose value has no branch at some node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// Propagate [`Id3Error::UnknownPath`]
    Fail,
    /// Return the given sentinel label
    Label(String),
}

impl UnknownPolicy {
    /// Sentinel policy returning [`UNKNOWN_LABEL`]
    pub fn default_label() -> Self {
        Self::Label(UNKNOWN_LABEL.to_string())
    }
}

impl Tree {
    /// Predict the class of `example`
    ///
    /// Fails with [`Id3Error::UnknownPath`] when the example carries a value
    /// that has no branch at some node on its path.
    pub fn classify(&self, example: &Example) -> Result<String> {
        let mut node = self.root();

        loop {
            if let Some(label) = node.label() {
                return Ok(label.to_string());
            }

            let attribute = &node.split_attribute;
            let value = example.value(attribute).ok_or_else(|| {
                Id3Error::Schema(format!("example has no value for {}", attribute.name()))
            })?;

            let child = node.child(value).ok_or_else(|| Id3Error::UnknownPath {
                attribute: attribute.name().to_string(),
                value: value.to_string(),
            })?;

            node = self.node(child).ok_or_else(|| {
                Id3Error::Construction(format!("dangling child {} in tree", child.index()))
            })?;
        }
    }

    /// Predict with an explicit policy for unmatched branches
    pub fn classify_with(&self, example: &Example, policy: &UnknownPolicy) -> Result<String> {
        match (self.classify(example), policy) {
            (Err(Id3Error::UnknownPath { attribute, value }), UnknownPolicy::Label(label)) => {
                debug!(
                    attribute = attribute.as_str(),
                    value = value.as_str(),
                    label = label.as_str(),
                    "no branch, using sentinel"
                );
                Ok(label.clone())
            }
            (result, _) => result,
        }
    }

    /// Predictions for every example of `table`, in order
    pub fn predict(&self, table: &ExampleTable, policy: &UnknownPolicy) -> Result<Vec<String>> {
        table
            .iter()
            .map(|example| self.classify_with(example, policy))
            .collect()
    }

    /// Number of examples whose prediction equals their classifier value
    pub fn count_correct(&self, table: &ExampleTable, policy: &UnknownPolicy) -> Result<usize> {
        let mut correct = 0;
        for example in table.iter() {
            let predicted = self.classify_with(example, policy)?;
            if example.value(self.classifier()) == Some(predicted.as_str()) {
                correct += 1;
            }
        }
        Ok(correct)
    }
}
