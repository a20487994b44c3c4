//! ID3 Trainer - file-driven training and evaluation of ID3 decision trees
//!
//! Loads categorical example files, builds trees with `id3-core`, and
//! writes predictions, error metrics and cross-validation summaries.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod report;

use id3_core::{
    Attribute, AttributeCatalog, CrossValidationReport, CrossValidator, ExampleTable, Tree,
    TreeBuilder,
};
use std::path::Path;
use tracing::info;

pub use config::{max_depth_from_flag, FoldSettings, TrainerConfig};
pub use dataset::{infer_catalog, load_attributes, load_examples, CsvFile};
pub use errors::TrainerError;
pub use report::{
    accuracy_line, cross_validation_summary, error_rate, write_predictions, write_report,
    InspectionReport, MetricsReport,
};

/// Catalog and examples loaded from a schema file and a data file
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub catalog: AttributeCatalog,
    pub table: ExampleTable,
}

impl LoadedData {
    pub fn load(schema: &Path, data: &Path) -> Result<Self, TrainerError> {
        let catalog = load_attributes(schema)?;
        let table = load_examples(data, &catalog)?;
        info!(
            "Loaded {} examples over {} attributes",
            table.len(),
            catalog.len()
        );
        Ok(Self { catalog, table })
    }

    /// The named attribute, or the last declared one
    pub fn classifier(&self, name: Option<&str>) -> Result<&Attribute, TrainerError> {
        resolve_classifier(&self.catalog, name)
    }
}

/// Look up the classifier attribute, defaulting to the final column
pub fn resolve_classifier<'a>(
    catalog: &'a AttributeCatalog,
    name: Option<&str>,
) -> Result<&'a Attribute, TrainerError> {
    match name {
        Some(name) => Ok(catalog.require(name)?),
        None => catalog
            .iter()
            .last()
            .ok_or_else(|| TrainerError::Config("catalog has no attributes".to_string())),
    }
}

/// Train a tree from a schema file and a data file
pub fn train_from_files(
    schema: &Path,
    data: &Path,
    classifier: Option<&str>,
    config: &TrainerConfig,
) -> Result<Tree, TrainerError> {
    let loaded = LoadedData::load(schema, data)?;
    let classifier = loaded.classifier(classifier)?;
    Ok(TreeBuilder::new(config.tree).build(&loaded.table, classifier, &loaded.catalog)?)
}

/// Cross-validate the configured builder on a schema file and a data file
pub fn cross_validate_files(
    schema: &Path,
    data: &Path,
    classifier: Option<&str>,
    config: &TrainerConfig,
) -> Result<CrossValidationReport, TrainerError> {
    let loaded = LoadedData::load(schema, data)?;
    let classifier = loaded.classifier(classifier)?;
    let validator = CrossValidator::new(config.cross_validation_config());
    Ok(validator.run(&loaded.table, classifier, &loaded.catalog)?)
}

/// Tree fitted on a headered training file and its predictions
#[derive(Debug, Clone)]
pub struct PredictionRun {
    pub tree: Tree,
    pub train_predictions: Vec<String>,
    pub test_predictions: Vec<String>,
    pub metrics: MetricsReport,
}

/// Fit on `train`, predict both files, and measure the error rates
///
/// Both files are headered CSVs with the same columns, the final one being
/// the classifier. The catalog covers the values of both files, so a test
/// value the training rows never showed reaches the tree and is handled by
/// the configured unknown-branch policy.
pub fn predict_from_csv(
    train: &Path,
    test: &Path,
    config: &TrainerConfig,
) -> Result<PredictionRun, TrainerError> {
    let train_csv = CsvFile::from_csv(train)?;
    let test_csv = CsvFile::from_csv(test)?;

    let catalog = infer_catalog(&[&train_csv, &test_csv])?;
    let train_table = train_csv.to_table(&catalog)?;
    let test_table = test_csv.to_table(&catalog)?;
    let classifier = catalog.require(train_csv.classifier_name())?;
    info!(
        "Training on {} examples, testing on {}",
        train_table.len(),
        test_table.len()
    );

    let tree = TreeBuilder::new(config.tree).build(&train_table, classifier, &catalog)?;
    let policy = config.unknown_policy();
    let train_predictions = tree.predict(&train_table, &policy)?;
    let test_predictions = tree.predict(&test_table, &policy)?;

    let metrics = MetricsReport {
        train_error: error_rate(&train_predictions, &train_table, classifier),
        test_error: error_rate(&test_predictions, &test_table, classifier),
    };

    Ok(PredictionRun {
        tree,
        train_predictions,
        test_predictions,
        metrics,
    })
}

/// Entropy and baseline error of the final column of a headered CSV
pub fn inspect_csv(path: &Path) -> Result<InspectionReport, TrainerError> {
    let csv = CsvFile::from_csv(path)?;
    let catalog = infer_catalog(&[&csv])?;
    let table = csv.to_table(&catalog)?;
    let classifier = catalog.require(csv.classifier_name())?;
    Ok(InspectionReport::new(&table, classifier))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
