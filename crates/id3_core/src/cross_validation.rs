//! k-fold cross-validation
//!
//! Examples are dealt round-robin into k buckets (example j goes to bucket
//! j mod k), so the partition is fully determined by table order and k.
//! Each fold trains on the other buckets concatenated in bucket order and
//! scores the held-out bucket. Folds share no mutable state and may run on
//! the rayon pool; results are collected in fold order either way.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::attribute::{Attribute, AttributeCatalog};
use crate::builder::{BuildConfig, TreeBuilder};
use crate::classify::UnknownPolicy;
use crate::errors::{Id3Error, Result};
use crate::example::ExampleTable;

/// Smallest usable number of folds
pub const MIN_FOLDS: usize = 2;

/// Cross-validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossValidationConfig {
    pub folds: usize,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default = "UnknownPolicy::default_label")]
    pub unknown: UnknownPolicy,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            parallel: false,
            build: BuildConfig::default(),
            unknown: UnknownPolicy::default_label(),
        }
    }
}

/// Outcome of one held-out fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Per-fold results and their mean accuracy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationReport {
    pub folds: Vec<FoldResult>,
    pub mean_accuracy: f64,
}

/// Deal `table` round-robin into `k` buckets, preserving relative order
pub fn partition(table: &ExampleTable, k: usize) -> Vec<ExampleTable> {
    let mut buckets = vec![ExampleTable::new(); k.max(1)];
    let count = buckets.len();
    for (j, example) in table.iter().enumerate() {
        buckets[j % count].push(example.clone());
    }
    buckets
}

/// Clamp a requested fold count to something usable for `examples` rows
pub fn effective_folds(requested: usize, examples: usize) -> usize {
    let mut folds = requested;
    if folds < MIN_FOLDS {
        warn!(requested, "k-fold needs at least {MIN_FOLDS} partitions, using {MIN_FOLDS}");
        folds = MIN_FOLDS;
    }
    if folds > examples {
        warn!(
            requested = folds,
            examples, "more folds than examples, using one fold per example"
        );
        folds = examples;
    }
    folds
}

/// Runs k-fold cross-validation of the tree builder
#[derive(Debug, Clone, Default)]
pub struct CrossValidator {
    config: CrossValidationConfig,
}

impl CrossValidator {
    pub fn new(config: CrossValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CrossValidationConfig {
        &self.config
    }

    pub fn run(
        &self,
        table: &ExampleTable,
        classifier: &Attribute,
        candidates: &AttributeCatalog,
    ) -> Result<CrossValidationReport> {
        if table.len() < MIN_FOLDS {
            return Err(Id3Error::EmptyTable(format!(
                "k-fold needs at least {MIN_FOLDS} examples, got {}",
                table.len()
            )));
        }

        let k = effective_folds(self.config.folds, table.len());
        let buckets = partition(table, k);
        let builder = TreeBuilder::new(self.config.build);

        let evaluate = |fold: usize| -> Result<FoldResult> {
            let mut training = ExampleTable::new();
            for (i, bucket) in buckets.iter().enumerate() {
                if i != fold {
                    training.extend_from(bucket);
                }
            }
            let held_out = &buckets[fold];

            let tree = builder.build(&training, classifier, candidates)?;
            let correct = tree.count_correct(held_out, &self.config.unknown)?;
            let accuracy = correct as f64 / held_out.len() as f64;

            info!(
                fold = fold + 1,
                of = k,
                train = training.len(),
                test = held_out.len(),
                correct,
                accuracy,
                "fold evaluated"
            );

            Ok(FoldResult {
                fold,
                train_size: training.len(),
                test_size: held_out.len(),
                correct,
                accuracy,
            })
        };

        let folds: Vec<FoldResult> = if self.config.parallel {
            (0..k).into_par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            (0..k).map(evaluate).collect::<Result<_>>()?
        };

        let mean_accuracy = folds.iter().map(|f| f.accuracy).sum::<f64>() / folds.len() as f64;
        Ok(CrossValidationReport {
            folds,
            mean_accuracy,
        })
    }
}

/// Mean held-out accuracy of `k`-fold cross-validation with default settings
pub fn k_fold(
    table: &ExampleTable,
    classifier: &Attribute,
    candidates: &AttributeCatalog,
    k: usize,
) -> Result<f64> {
    let validator = CrossValidator::new(CrossValidationConfig {
        folds: k,
        ..CrossValidationConfig::default()
    });
    Ok(validator.run(table, classifier, candidates)?.mean_accuracy)
}
