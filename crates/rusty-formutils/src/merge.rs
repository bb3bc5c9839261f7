// File: src/merge.rs
// Purpose: Builds the field-to-message map from conversion and rule failures

use crate::catalog::Catalogs;
use crate::decode::ConversionFailure;
use crate::validate::RuleFailure;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Decode key to human-readable message, one entry per invalid field.
///
/// Serializes as a plain JSON object. An empty map means the submission is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvalidFields(BTreeMap<String, String>);

impl InvalidFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field failed
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keep the first message recorded for `key`; later ones are dropped
    pub fn insert_first(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| message.into());
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl IntoIterator for InvalidFields {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a InvalidFields {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InvalidFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, message) in iter {
            fields.insert_first(key, message);
        }
        fields
    }
}

/// Combine both failure lists into one map.
///
/// A conversion message always wins over rule messages for the same key.
/// Among several rule failures on one field, the first one reported wins.
pub fn merge(
    catalogs: &Catalogs,
    conversions: &[ConversionFailure],
    rules: &[RuleFailure],
) -> InvalidFields {
    let mut fields = InvalidFields::new();

    for failure in conversions {
        fields.insert_first(failure.key.clone(), catalogs.conversion_message(failure));
    }
    for failure in rules {
        fields.insert_first(failure.field.clone(), catalogs.rule_message(failure));
    }

    fields
}
