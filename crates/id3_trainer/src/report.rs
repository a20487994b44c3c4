//! Evaluation reports and prediction writers

use id3_core::{Attribute, CrossValidationReport, ExampleTable};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::errors::TrainerError;

/// Fraction of `predictions` that differ from the classifier column of `table`
pub fn error_rate(predictions: &[String], table: &ExampleTable, classifier: &Attribute) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let wrong = predictions
        .iter()
        .zip(table.iter())
        .filter(|(predicted, example)| example.value(classifier) != Some(predicted.as_str()))
        .count();
    wrong as f64 / table.len() as f64
}

/// Train and test error of one fitted tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsReport {
    pub train_error: f64,
    pub test_error: f64,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error(train): {}", self.train_error)?;
        writeln!(f, "error(test): {}", self.test_error)
    }
}

/// Label entropy and majority-vote baseline error of a table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InspectionReport {
    pub entropy: f64,
    pub error: f64,
}

impl InspectionReport {
    pub fn new(table: &ExampleTable, classifier: &Attribute) -> Self {
        let entropy = table.entropy(classifier).value;
        let majority = table
            .value_counts(classifier)
            .into_iter()
            .map(|(_, count)| count)
            .max()
            .unwrap_or(0);
        let error = if table.is_empty() {
            0.0
        } else {
            1.0 - majority as f64 / table.len() as f64
        };
        Self { entropy, error }
    }
}

impl fmt::Display for InspectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "entropy: {}", self.entropy)?;
        writeln!(f, "error: {}", self.error)
    }
}

/// Held-out accuracy summary line
pub fn accuracy_line(correct: usize, total: usize) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        100.0 * correct as f64 / total as f64
    };
    format!("{correct} of {total} ({percent:.2}%) of testing examples correctly identified")
}

/// Human-readable k-fold summary, one line per fold plus the mean
pub fn cross_validation_summary(report: &CrossValidationReport) -> String {
    let mut out = String::new();
    for fold in &report.folds {
        out.push_str(&format!(
            "fold {}: {} of {} correct ({:.2}%)\n",
            fold.fold + 1,
            fold.correct,
            fold.test_size,
            100.0 * fold.accuracy
        ));
    }
    out.push_str(&format!(
        "mean accuracy over {} folds: {:.2}%\n",
        report.folds.len(),
        100.0 * report.mean_accuracy
    ));
    out
}

/// Write one predicted label per line, in table order
pub fn write_predictions(path: &Path, predictions: &[String]) -> Result<(), TrainerError> {
    let file = std::fs::File::create(path).map_err(|err| TrainerError::io(path, err))?;
    let mut writer = std::io::BufWriter::new(file);
    for label in predictions {
        writeln!(writer, "{label}").map_err(|err| TrainerError::io(path, err))?;
    }
    writer.flush().map_err(|err| TrainerError::io(path, err))
}

/// Write any displayable report to `path`
pub fn write_report(path: &Path, report: &impl fmt::Display) -> Result<(), TrainerError> {
    std::fs::write(path, report.to_string()).map_err(|err| TrainerError::io(path, err))
}
