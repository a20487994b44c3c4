//! Categorical attributes and the catalog that indexes them
//!
//! An [`Attribute`] is a named feature with a fixed, finite domain. Leaves of
//! an induced tree reuse the same type: a leaf's split attribute is named after
//! the predicted class and carries the single value [`TERMINAL_MARKER`].

use std::collections::HashMap;

use crate::errors::{Id3Error, Result};

/// Sole legal value of an attribute that marks a leaf
pub const TERMINAL_MARKER: &str = "end";

/// A named categorical feature with an ordered set of legal values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    values: Vec<String>,
}

impl Attribute {
    /// Create an attribute, rejecting empty or duplicated domains
    ///
    /// The single-value domain `{"end"}` is reserved for leaf markers.
    pub fn new<N, I, V>(name: N, values: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        if name.is_empty() {
            return Err(Id3Error::Schema("attribute name is empty".to_string()));
        }
        if values.is_empty() {
            return Err(Id3Error::Schema(format!(
                "attribute {name} has no legal values"
            )));
        }
        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                return Err(Id3Error::Schema(format!(
                    "attribute {name} lists value {value} more than once"
                )));
            }
        }

        if values.len() == 1 && values[0] == TERMINAL_MARKER {
            return Err(Id3Error::Schema(format!(
                "attribute {name} uses the reserved leaf domain {{{TERMINAL_MARKER}}}"
            )));
        }

        Ok(Self { name, values })
    }

    /// Leaf marker predicting `label`
    pub fn terminal(label: impl Into<String>) -> Self {
        Self {
            name: label.into(),
            values: vec![TERMINAL_MARKER.to_string()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legal values in declaration order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Legal values in lexicographic order
    pub fn sorted_values(&self) -> Vec<&str> {
        let mut sorted: Vec<&str> = self.values.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        sorted
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// True when this attribute is a leaf marker rather than a branching attribute
    pub fn is_terminal(&self) -> bool {
        self.values.len() == 1 && self.values[0] == TERMINAL_MARKER
    }
}

/// Attributes unique by name, in insertion order, with a name index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeCatalog {
    attributes: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl AttributeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, failing on duplicate names
    pub fn from_attributes(attributes: impl IntoIterator<Item = Attribute>) -> Result<Self> {
        let mut catalog = Self::new();
        for attribute in attributes {
            catalog.push(attribute)?;
        }
        Ok(catalog)
    }

    pub fn push(&mut self, attribute: Attribute) -> Result<()> {
        if self.index.contains_key(attribute.name()) {
            return Err(Id3Error::Schema(format!(
                "duplicate attribute name {}",
                attribute.name()
            )));
        }
        self.index
            .insert(attribute.name().to_string(), self.attributes.len());
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Resolve a name once at the boundary; core APIs take `&Attribute`
    pub fn require(&self, name: &str) -> Result<&Attribute> {
        self.get(name)
            .ok_or_else(|| Id3Error::UnknownAttribute(name.to_string()))
    }

    /// Position of `name` in insertion order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove an attribute by name, keeping the remaining order
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        let position = self.index.remove(name)?;
        let removed = self.attributes.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Copy of this catalog without `attribute`
    pub fn without(&self, attribute: &Attribute) -> Self {
        let mut reduced = self.clone();
        reduced.remove(attribute.name());
        reduced
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(Attribute::name)
    }
}

impl<'a> IntoIterator for &'a AttributeCatalog {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather() -> Attribute {
        Attribute::new("Weather", ["sun", "rain"]).unwrap()
    }

    #[test]
    fn test_attribute_rejects_bad_domains() {
        assert!(Attribute::new("A", Vec::<String>::new()).is_err());
        assert!(Attribute::new("A", ["x", "x"]).is_err());
        assert!(Attribute::new("", ["x"]).is_err());
    }

    #[test]
    fn test_attribute_rejects_leaf_marker_domain() {
        let err = Attribute::new("Aux", [TERMINAL_MARKER]).unwrap_err();
        assert!(matches!(err, Id3Error::Schema(_)));

        // The marker is an ordinary value inside a wider domain
        let wider = Attribute::new("Aux", [TERMINAL_MARKER, "start"]).unwrap();
        assert!(!wider.is_terminal());
    }

    #[test]
    fn test_sorted_values() {
        assert_eq!(weather().sorted_values(), vec!["rain", "sun"]);
        assert_eq!(weather().values(), &["sun".to_string(), "rain".to_string()]);
    }

    #[test]
    fn test_terminal_marker() {
        let leaf = Attribute::terminal("yes");
        assert!(leaf.is_terminal());
        assert_eq!(leaf.name(), "yes");
        assert!(!weather().is_terminal());
    }

    #[test]
    fn test_catalog_lookup_and_removal() {
        let humid = Attribute::new("Humid", ["y", "n"]).unwrap();
        let play = Attribute::new("Play", ["yes", "no"]).unwrap();
        let mut catalog =
            AttributeCatalog::from_attributes([weather(), humid.clone(), play]).unwrap();

        assert_eq!(catalog.position("Play"), Some(2));
        assert_eq!(catalog.require("Humid").unwrap(), &humid);
        assert!(matches!(
            catalog.require("Wind"),
            Err(Id3Error::UnknownAttribute(_))
        ));

        let removed = catalog.remove("Weather").unwrap();
        assert_eq!(removed.name(), "Weather");
        assert_eq!(catalog.position("Humid"), Some(0));
        assert_eq!(catalog.position("Play"), Some(1));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Humid", "Play"]);

        let reduced = catalog.without(&humid);
        assert_eq!(reduced.len(), 1);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let result = AttributeCatalog::from_attributes([weather(), weather()]);
        assert!(matches!(result, Err(Id3Error::Schema(_))));
    }
}
