//! Error types for the ID3 engine

use thiserror::Error;

/// Errors that can occur while building or applying a decision tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Id3Error {
    /// An example does not match its attribute catalog
    #[error("Schema error: {0}")]
    Schema(String),

    /// The tree could not be induced from the given table
    #[error("Construction error: {0}")]
    Construction(String),

    /// Classification reached a branch node with no child for the example's value
    #[error("No branch for {attribute} = {value}")]
    UnknownPath { attribute: String, value: String },

    /// An operation that needs examples was given an empty table
    #[error("Example table is empty: {0}")]
    EmptyTable(String),

    /// Attribute name is not present in the catalog
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

/// Result type for ID3 engine operations
pub type Result<T> = std::result::Result<T, Id3Error>;
