//! Entropy and information gain over example tables
//!
//! Pure functions; every quantity is in bits. The tree builder and the
//! depth-bounded binary mode both select splits through [`gain`].

use crate::attribute::Attribute;
use crate::example::ExampleTable;

/// Tolerance used when comparing an entropy against an exact value
pub const ENTROPY_EPSILON: f64 = 1e-12;

/// Shannon entropy of a table together with its most frequent class
#[derive(Debug, Clone, PartialEq)]
pub struct Entropy {
    /// Impurity in bits, 0 for a pure or empty table
    pub value: f64,
    /// Most frequent classifier value, first legal value wins ties
    pub dominant: Option<String>,
}

impl Entropy {
    pub fn is_pure(&self) -> bool {
        self.value.abs() < ENTROPY_EPSILON
    }

    /// Exactly one bit: an even split between two classes
    pub fn is_even_split(&self) -> bool {
        (self.value - 1.0).abs() < ENTROPY_EPSILON
    }
}

/// Entropy of `table` with respect to the classifier attribute
pub fn entropy(table: &ExampleTable, classifier: &Attribute) -> Entropy {
    if table.is_empty() {
        return Entropy {
            value: 0.0,
            dominant: None,
        };
    }

    let population = table.len() as f64;
    let mut h = 0.0;
    let mut dominant: Option<(String, usize)> = None;

    for (value, count) in table.value_counts(classifier) {
        if count == 0 {
            continue;
        }
        let p = count as f64 / population;
        h -= p * p.log2();

        let replace = dominant.as_ref().map_or(true, |(_, best)| count > *best);
        if replace {
            dominant = Some((value, count));
        }
    }

    Entropy {
        value: h,
        dominant: dominant.map(|(value, _)| value),
    }
}

/// Example-weighted entropy of the partition of `table` by `split`
pub fn remainder(table: &ExampleTable, classifier: &Attribute, split: &Attribute) -> f64 {
    if table.is_empty() {
        return 0.0;
    }

    let population = table.len() as f64;
    split
        .values()
        .iter()
        .map(|value| table.filter(split, value))
        .filter(|subset| !subset.is_empty())
        .map(|subset| (subset.len() as f64 / population) * entropy(&subset, classifier).value)
        .sum()
}

/// Information gain of splitting `table` on `split`
pub fn gain(table: &ExampleTable, classifier: &Attribute, split: &Attribute) -> f64 {
    entropy(table, classifier).value - remainder(table, classifier, split)
}

/// True when two or more classes share the highest count
pub fn has_tied_majority(table: &ExampleTable, classifier: &Attribute) -> bool {
    let counts = table.value_counts(classifier);
    let best = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
    best > 0 && counts.iter().filter(|(_, count)| *count == best).count() > 1
}

/// Majority class among the observed labels, scanned in sorted order
///
/// A class replaces the running choice when its count is at least the
/// running maximum, so the lexicographically last of the tied classes wins.
/// This is the leaf rule of the depth-bounded binary mode.
pub fn majority_label(table: &ExampleTable, classifier: &Attribute) -> Option<String> {
    let mut counts: Vec<(String, usize)> = table
        .value_counts(classifier)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    counts.sort_by(|a, b| a.0.cmp(&b.0));

    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, max)| count >= *max) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
