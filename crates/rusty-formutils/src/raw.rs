// File: src/raw.rs
// Purpose: Raw multi-valued form data parsed from urlencoded bodies and query strings

use crate::error::TransportError;
use anyhow::anyhow;
use std::collections::HashMap;

/// Ordered mapping from form key to every value submitted for it.
///
/// Keys keep the order of their first appearance; values keep submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `application/x-www-form-urlencoded` data (a body or a query string).
    ///
    /// `+` decodes to a space. A `%` not followed by two hex digits, or bytes
    /// that do not decode to UTF-8, make the whole input malformed.
    pub fn from_urlencoded(input: &[u8]) -> Result<Self, TransportError> {
        let mut form = Self::new();
        form.extend_urlencoded(input)?;
        Ok(form)
    }

    /// Append the pairs of another urlencoded input
    pub fn extend_urlencoded(&mut self, input: &[u8]) -> Result<(), TransportError> {
        let input = std::str::from_utf8(input).map_err(TransportError::new)?;

        for pair in input.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key)?;
            if key.is_empty() {
                continue;
            }
            let value = decode_component(value)?;
            self.append(key, value);
        }

        Ok(())
    }

    /// Add one value for `key`
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1.push(value.into()),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value.into()]));
            }
        }
    }

    /// All values for `key`
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_slice())
    }

    /// Last value for `key`
    pub fn get_last(&self, key: &str) -> Option<&str> {
        self.get(key)?.last().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (key, value) in iter {
            form.append(key, value);
        }
        form
    }
}

fn decode_component(component: &str) -> Result<String, TransportError> {
    let bytes = component.as_bytes();
    for (position, _) in component.match_indices('%') {
        let escape = bytes.get(position + 1..position + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(TransportError::new(anyhow!(
                "invalid percent-escape in `{component}`"
            )));
        }
    }

    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(TransportError::new)
}
