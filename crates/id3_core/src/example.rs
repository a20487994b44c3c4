//! Examples and example tables
//!
//! Examples are validated against their catalog once and are immutable
//! afterwards. Tables hold them behind `Arc`, so the sub-tables the tree
//! builder carves out share example data instead of copying it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::attribute::{Attribute, AttributeCatalog};
use crate::entropy::{self, Entropy};
use crate::errors::{Id3Error, Result};

/// A total mapping from attribute name to one legal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    values: BTreeMap<String, String>,
}

impl Example {
    /// Pair `values` positionally with the catalog's attributes
    ///
    /// Fails with [`Id3Error::Schema`] when the value count differs from the
    /// catalog size or a value falls outside its attribute's domain.
    pub fn new<I, V>(values: I, catalog: &AttributeCatalog) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != catalog.len() {
            return Err(Id3Error::Schema(format!(
                "incorrect number of attributes (saw {}, expected {})",
                values.len(),
                catalog.len()
            )));
        }

        let mut mapping = BTreeMap::new();
        for (attribute, value) in catalog.iter().zip(values) {
            if !attribute.contains(&value) {
                return Err(Id3Error::Schema(format!(
                    "value {value} not in known values {:?} for attribute {}",
                    attribute.values(),
                    attribute.name()
                )));
            }
            mapping.insert(attribute.name().to_string(), value);
        }

        Ok(Self { values: mapping })
    }

    pub fn value(&self, attribute: &Attribute) -> Option<&str> {
        self.value_of(attribute.name())
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Ordered sequence of examples drawn from one catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleTable {
    examples: Vec<Arc<Example>>,
}

impl ExampleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_examples(examples: impl IntoIterator<Item = Example>) -> Self {
        Self {
            examples: examples.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn push(&mut self, example: Example) {
        self.examples.push(Arc::new(example));
    }

    /// Append every example of `other`, preserving order
    pub fn extend_from(&mut self, other: &ExampleTable) {
        self.examples.extend(other.examples.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Example> {
        self.examples.get(index).map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter().map(Arc::as_ref)
    }

    /// Sub-table of the examples whose `attribute` equals `value`
    pub fn filter(&self, attribute: &Attribute, value: &str) -> ExampleTable {
        let examples = self
            .examples
            .iter()
            .filter(|example| example.value(attribute) == Some(value))
            .cloned()
            .collect();
        Self { examples }
    }

    /// Distinct values of `attribute` present in this table, sorted
    pub fn observed_values(&self, attribute: &Attribute) -> Vec<String> {
        let observed: BTreeSet<&str> = self
            .iter()
            .filter_map(|example| example.value(attribute))
            .collect();
        observed.into_iter().map(str::to_string).collect()
    }

    /// Count of each legal value of `attribute`, in declaration order
    pub fn value_counts(&self, attribute: &Attribute) -> Vec<(String, usize)> {
        attribute
            .values()
            .iter()
            .map(|value| {
                let count = self
                    .iter()
                    .filter(|example| example.value(attribute) == Some(value.as_str()))
                    .count();
                (value.clone(), count)
            })
            .collect()
    }

    pub fn entropy(&self, classifier: &Attribute) -> Entropy {
        entropy::entropy(self, classifier)
    }

    pub fn remainder(&self, classifier: &Attribute, split: &Attribute) -> f64 {
        entropy::remainder(self, classifier, split)
    }

    pub fn gain(&self, classifier: &Attribute, split: &Attribute) -> f64 {
        entropy::gain(self, classifier, split)
    }
}

impl FromIterator<Example> for ExampleTable {
    fn from_iter<T: IntoIterator<Item = Example>>(iter: T) -> Self {
        Self::from_examples(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AttributeCatalog {
        AttributeCatalog::from_attributes([
            Attribute::new("Weather", ["sun", "rain"]).unwrap(),
            Attribute::new("Play", ["yes", "no"]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_example_validation() {
        let catalog = catalog();
        let example = Example::new(["sun", "yes"], &catalog).unwrap();
        assert_eq!(example.value_of("Weather"), Some("sun"));
        assert_eq!(example.value(catalog.require("Play").unwrap()), Some("yes"));

        assert!(matches!(
            Example::new(["sun"], &catalog),
            Err(Id3Error::Schema(_))
        ));
        assert!(matches!(
            Example::new(["snow", "yes"], &catalog),
            Err(Id3Error::Schema(_))
        ));
    }

    #[test]
    fn test_filter_and_counts() {
        let catalog = catalog();
        let table: ExampleTable = [["sun", "yes"], ["rain", "no"], ["sun", "no"]]
            .into_iter()
            .map(|row| Example::new(row, &catalog).unwrap())
            .collect();
        let weather = catalog.require("Weather").unwrap();
        let play = catalog.require("Play").unwrap();

        let sunny = table.filter(weather, "sun");
        assert_eq!(sunny.len(), 2);
        assert_eq!(sunny.get(1).unwrap().value(play), Some("no"));

        assert_eq!(
            table.value_counts(play),
            vec![("yes".to_string(), 1), ("no".to_string(), 2)]
        );
        assert_eq!(table.observed_values(weather), vec!["rain", "sun"]);
        assert!(table.filter(weather, "fog").is_empty());
    }

    #[test]
    fn test_extend_preserves_order() {
        let catalog = catalog();
        let mut first = ExampleTable::from_examples([Example::new(["sun", "yes"], &catalog).unwrap()]);
        let second = ExampleTable::from_examples([Example::new(["rain", "no"], &catalog).unwrap()]);
        first.extend_from(&second);

        assert_eq!(first.len(), 2);
        assert_eq!(first.get(1).unwrap().value_of("Weather"), Some("rain"));
    }
}
