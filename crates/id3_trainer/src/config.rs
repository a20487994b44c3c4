//! Trainer configuration file
//!
//! ```toml
//! unknown_label = "unknown"
//!
//! [tree]
//! fallback = "smallest_label"
//! mode = { kind = "binary", max_depth = 3 }
//!
//! [cross_validation]
//! folds = 10
//! parallel = true
//! ```

use id3_core::{BuildConfig, CrossValidationConfig, SplitMode, UnknownPolicy, UNKNOWN_LABEL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::errors::TrainerError;

/// Settings shared by every trainer command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Tree builder settings
    pub tree: BuildConfig,
    /// k-fold settings
    pub cross_validation: FoldSettings,
    /// Label predicted for unmatched branches
    pub unknown_label: Option<String>,
    /// Fail on unmatched branches instead of predicting `unknown_label`
    pub strict: bool,
}

/// k-fold settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldSettings {
    pub folds: usize,
    pub parallel: bool,
}

impl Default for FoldSettings {
    fn default() -> Self {
        Self {
            folds: CrossValidationConfig::default().folds,
            parallel: false,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tree: BuildConfig::default(),
            cross_validation: FoldSettings::default(),
            unknown_label: Some(UNKNOWN_LABEL.to_string()),
            strict: false,
        }
    }
}

impl TrainerConfig {
    /// Read a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|err| TrainerError::io(path, err))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, TrainerError> {
        toml::from_str(content)
            .map_err(|err| TrainerError::Config(format!("failed to parse config: {err}")))
    }

    /// Configuration file if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, TrainerError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn unknown_policy(&self) -> UnknownPolicy {
        match (&self.unknown_label, self.strict) {
            (Some(label), false) => UnknownPolicy::Label(label.clone()),
            _ => UnknownPolicy::Fail,
        }
    }

    pub fn cross_validation_config(&self) -> CrossValidationConfig {
        CrossValidationConfig {
            folds: self.cross_validation.folds,
            parallel: self.cross_validation.parallel,
            build: self.tree,
            unknown: self.unknown_policy(),
        }
    }

    /// Switch to binary mode with a command-line depth
    pub fn set_max_depth(&mut self, depth: i64) {
        self.tree.mode = SplitMode::Binary {
            max_depth: max_depth_from_flag(depth),
        };
    }
}

/// Command-line depth convention: non-positive means unbounded
pub fn max_depth_from_flag(depth: i64) -> Option<usize> {
    usize::try_from(depth).ok().filter(|&d| d > 0)
}
