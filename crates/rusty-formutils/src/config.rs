// File: src/config.rs
// Purpose: Configuration parsing from formutils.toml

use crate::catalog::{Catalogs, MessageCatalog, Templates};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Form pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Largest request body the axum bridge will buffer (default: 10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Start from empty catalogs instead of the bundled messages
    #[serde(default)]
    pub replace_default_messages: bool,

    /// Conversion messages by type name, e.g. `i32 = ["must be a number", "must be list of numbers"]`
    #[serde(default)]
    pub type_messages: BTreeMap<String, [String; 2]>,

    /// Rule messages by tag, e.g. `min = ["must be min {param} chars length", ""]`
    #[serde(default)]
    pub rule_messages: BTreeMap<String, [String; 2]>,
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            replace_default_messages: false,
            type_messages: BTreeMap::new(),
            rule_messages: BTreeMap::new(),
        }
    }
}

impl FormConfig {
    /// Load configuration from formutils.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./formutils.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("formutils.toml")
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: FormConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Build the message catalogs this configuration describes.
    ///
    /// Configured entries override bundled ones with the same name.
    pub fn catalogs(&self) -> Catalogs {
        let (mut types, mut rules) = if self.replace_default_messages {
            (MessageCatalog::new(), MessageCatalog::new())
        } else {
            (MessageCatalog::default_types(), MessageCatalog::default_rules())
        };

        types.extend(to_templates(&self.type_messages));
        rules.extend(to_templates(&self.rule_messages));

        Catalogs::new(types, rules)
    }
}

fn to_templates(
    messages: &BTreeMap<String, [String; 2]>,
) -> impl Iterator<Item = (String, Templates)> + '_ {
    messages.iter().map(|(name, [singular, plural])| {
        (name.clone(), Templates::new(singular.clone(), plural.clone()))
    })
}
