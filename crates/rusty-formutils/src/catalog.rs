// File: src/catalog.rs
// Purpose: Message catalogs for conversion failures (by type) and rule failures (by tag)

use crate::decode::ConversionFailure;
use crate::validate::RuleFailure;
use crate::value::Arity;
use std::collections::HashMap;

/// Placeholder replaced by the rule parameter in rule templates
pub const PARAM_PLACEHOLDER: &str = "{param}";

/// printf-style placeholder, substituted like `{param}`
pub const PRINTF_PLACEHOLDER: &str = "%s";

/// Message used when no type template applies
pub const GENERIC_INVALID: &str = "invalid";

/// Singular and plural message templates. An empty template means "no message".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Templates {
    pub singular: String,
    pub plural: String,
}

impl Templates {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// Template for `arity`, `None` if it is empty
    pub fn select(&self, arity: Arity) -> Option<&str> {
        let template = match arity {
            Arity::Single => &self.singular,
            Arity::Collection => &self.plural,
        };
        (!template.is_empty()).then_some(template.as_str())
    }
}

/// Lookup table from a name (type name or rule tag) to its templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    entries: HashMap<String, Templates>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(
        mut self,
        name: impl Into<String>,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        self.insert(name, Templates::new(singular, plural));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, templates: Templates) {
        self.entries.insert(name.into(), templates);
    }

    pub fn get(&self, name: &str) -> Option<&Templates> {
        self.entries.get(name)
    }

    /// Template for `name` at `arity`, `None` when absent or empty
    pub fn template(&self, name: &str, arity: Arity) -> Option<&str> {
        self.get(name)?.select(arity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type catalog used when none is configured
    pub fn default_types() -> Self {
        const NUMBER: (&str, &str) = ("must be a number", "must be list of numbers");
        const NUMERIC_TYPES: [&str; 12] = [
            "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "f32", "f64",
        ];

        let catalog = NUMERIC_TYPES
            .iter()
            .fold(Self::new(), |catalog, name| catalog.with(*name, NUMBER.0, NUMBER.1));

        catalog
            .with("bool", "must be boolean", "must be list of booleans")
            .with("datetime", "must be a UTC date", "must be list of UTC dates")
            .with("date", "must be a date", "must be list of dates")
    }

    /// Rule catalog used when none is configured
    pub fn default_rules() -> Self {
        Self::new()
            .with(
                "email",
                "must be a valid email address",
                "must be group of valid email addresses",
            )
            .with(
                "min",
                "must be min {param} chars length",
                "items must be min {param} chars length",
            )
            .with(
                "max",
                "must be max {param} chars length",
                "items must be max {param} chars length",
            )
            .with(
                "len",
                "must be {param} chars length",
                "items must be {param} chars length",
            )
            .with("url", "must be a valid URL", "must be list of valid URLs")
            .with(
                "oneof",
                "must be one of: {param}",
                "items must be one of: {param}",
            )
            .with("min_items", "", "must have at least {param} items")
            .with("max_items", "", "must have at most {param} items")
    }
}

impl Extend<(String, Templates)> for MessageCatalog {
    fn extend<I: IntoIterator<Item = (String, Templates)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// The two catalogs consulted while building the invalid-field map.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogs {
    types: MessageCatalog,
    rules: MessageCatalog,
}

impl Catalogs {
    pub fn new(types: MessageCatalog, rules: MessageCatalog) -> Self {
        Self { types, rules }
    }

    pub fn types(&self) -> &MessageCatalog {
        &self.types
    }

    pub fn rules(&self) -> &MessageCatalog {
        &self.rules
    }

    /// Message for a value that failed to convert
    pub fn conversion_message(&self, failure: &ConversionFailure) -> String {
        self.types
            .template(failure.type_name, failure.arity)
            .unwrap_or(GENERIC_INVALID)
            .to_string()
    }

    /// Message for a failed validation rule
    pub fn rule_message(&self, failure: &RuleFailure) -> String {
        match (self.rules.template(&failure.tag, failure.arity), &failure.param) {
            (Some(template), Some(param)) => template
                .replace(PARAM_PLACEHOLDER, param)
                .replace(PRINTF_PLACEHOLDER, param),
            (Some(template), None) => template.to_string(),
            (None, Some(param)) => format!("{}: {}", failure.tag, param),
            (None, None) => failure.tag.clone(),
        }
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self::new(MessageCatalog::default_types(), MessageCatalog::default_rules())
    }
}
