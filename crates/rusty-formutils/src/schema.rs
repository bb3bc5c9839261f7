// File: src/schema.rs
// Purpose: Field metadata resolver - decode keys and parsed rule lists per record type

use crate::error::MetadataError;
use crate::value::Arity;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Unparsed per-field metadata, as written on the record type.
///
/// `#[derive(Form)]` emits one of these per field; manual `Form`
/// implementations build them with [`RawField::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField {
    /// Rust field name
    pub name: &'static str,
    /// Form key the field is decoded from
    pub key: &'static str,
    /// Comma-separated rule list, e.g. `"min=3,required"`
    pub rules: &'static str,
    /// Element type name, the type-catalog key
    pub type_name: &'static str,
    pub arity: Arity,
}

impl RawField {
    pub const fn new(
        name: &'static str,
        key: &'static str,
        rules: &'static str,
        type_name: &'static str,
        arity: Arity,
    ) -> Self {
        Self {
            name,
            key,
            rules,
            type_name,
            arity,
        }
    }
}

/// A parsed validation rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    // Presence
    Required,
    OmitEmpty,

    // Format
    Email,
    Url,
    Alpha,
    AlphaNum,
    Numeric,

    // Bounds (character count for text, value for numbers)
    Min(f64),
    Max(f64),
    Len(f64),
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),

    // Equality
    Eq(String),
    Ne(String),

    // String matching
    OneOf(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),

    // Collections
    MinItems(usize),
    MaxItems(usize),

    /// Any tag without a built-in meaning; resolved by the validator
    Custom,
}

/// One entry of a field's rule list
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    pub tag: String,
    pub param: Option<String>,
    pub rule: Rule,
}

impl RuleSpec {
    /// Parse a single `tag` or `tag=param` entry for `field`
    fn parse(field: &str, entry: &str) -> Result<Self, MetadataError> {
        let (tag, param) = match entry.split_once('=') {
            Some((tag, param)) => (tag.trim(), Some(param.trim())),
            None => (entry.trim(), None),
        };

        if tag.is_empty() || param.is_some_and(str::is_empty) {
            return Err(MetadataError::MalformedRule {
                field: field.to_string(),
                rules: entry.to_string(),
            });
        }

        let missing = || MetadataError::MissingParam {
            field: field.to_string(),
            tag: tag.to_string(),
        };
        let invalid = |param: &str| MetadataError::InvalidParam {
            field: field.to_string(),
            tag: tag.to_string(),
            param: param.to_string(),
        };
        let number = || -> Result<f64, MetadataError> {
            let param = param.ok_or_else(missing)?;
            param
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| invalid(param))
        };
        let count = || -> Result<usize, MetadataError> {
            let param = param.ok_or_else(missing)?;
            param.parse::<usize>().map_err(|_| invalid(param))
        };
        let text = || -> Result<String, MetadataError> {
            param.map(str::to_string).ok_or_else(missing)
        };

        let rule = match tag {
            "required" => Rule::Required,
            "omitempty" => Rule::OmitEmpty,
            "email" => Rule::Email,
            "url" => Rule::Url,
            "alpha" => Rule::Alpha,
            "alphanum" => Rule::AlphaNum,
            "numeric" => Rule::Numeric,
            "min" => Rule::Min(number()?),
            "max" => Rule::Max(number()?),
            "len" => Rule::Len(number()?),
            "gt" => Rule::Gt(number()?),
            "gte" => Rule::Gte(number()?),
            "lt" => Rule::Lt(number()?),
            "lte" => Rule::Lte(number()?),
            "eq" => Rule::Eq(text()?),
            "ne" => Rule::Ne(text()?),
            "oneof" => Rule::OneOf(text()?),
            "contains" => Rule::Contains(text()?),
            "startswith" => Rule::StartsWith(text()?),
            "endswith" => Rule::EndsWith(text()?),
            "min_items" => Rule::MinItems(count()?),
            "max_items" => Rule::MaxItems(count()?),
            _ => Rule::Custom,
        };

        let is_flag = matches!(
            rule,
            Rule::Required
                | Rule::OmitEmpty
                | Rule::Email
                | Rule::Url
                | Rule::Alpha
                | Rule::AlphaNum
                | Rule::Numeric
        );
        if is_flag && param.is_some() {
            return Err(MetadataError::UnexpectedParam {
                field: field.to_string(),
                tag: tag.to_string(),
            });
        }

        Ok(Self {
            tag: tag.to_string(),
            param: param.map(str::to_string),
            rule,
        })
    }
}

/// Resolved metadata for one record field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub key: &'static str,
    pub type_name: &'static str,
    pub arity: Arity,
    /// Rules in declaration order
    pub rules: Vec<RuleSpec>,
}

/// Resolved metadata for a record type, built once and cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    by_key: HashMap<&'static str, usize>,
}

impl Schema {
    /// Parse raw field metadata into descriptors.
    ///
    /// Fails on empty or duplicate decode keys and on malformed rule lists.
    pub fn resolve(raw_fields: &[RawField]) -> Result<Self, MetadataError> {
        let mut fields = Vec::with_capacity(raw_fields.len());
        let mut by_key = HashMap::with_capacity(raw_fields.len());

        for (index, raw) in raw_fields.iter().enumerate() {
            if raw.key.trim().is_empty() {
                return Err(MetadataError::EmptyKey {
                    field: raw.name.to_string(),
                });
            }

            if by_key.insert(raw.key, index).is_some() {
                return Err(MetadataError::DuplicateKey {
                    key: raw.key.to_string(),
                });
            }

            let rules = if raw.rules.trim().is_empty() {
                Vec::new()
            } else {
                raw.rules
                    .split(',')
                    .map(|entry| RuleSpec::parse(raw.name, entry))
                    .collect::<Result<Vec<_>, _>>()?
            };

            fields.push(FieldDescriptor {
                name: raw.name,
                key: raw.key,
                type_name: raw.type_name,
                arity: raw.arity,
                rules,
            });
        }

        Ok(Self { fields, by_key })
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field index bound to a form key
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Tags without a built-in meaning, with the field they appear on
    pub fn custom_rules(&self) -> impl Iterator<Item = (&FieldDescriptor, &RuleSpec)> {
        self.fields.iter().flat_map(|field| {
            field
                .rules
                .iter()
                .filter(|spec| spec.rule == Rule::Custom)
                .map(move |spec| (field, spec))
        })
    }
}

/// Per-type cache slot for a resolved [`Schema`].
///
/// Each `Form` implementation owns one `static` cell; the schema (or the
/// metadata error) is computed on first use and never changes afterwards.
#[derive(Debug)]
pub struct SchemaCell(OnceCell<Result<Schema, MetadataError>>);

impl SchemaCell {
    pub const fn new() -> Self {
        Self(OnceCell::new())
    }

    pub fn get_or_resolve(&self, raw_fields: &[RawField]) -> Result<&Schema, MetadataError> {
        self.0
            .get_or_init(|| Schema::resolve(raw_fields))
            .as_ref()
            .map_err(Clone::clone)
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn field(name: &'static str, rules: &'static str) -> RawField {
        RawField::new(name, name, rules, "String", Arity::Single)
    }

    #[test]
    fn test_resolve_parses_rules_in_order() {
        let schema = Schema::resolve(&[field("password", "min=3, required")]).unwrap();
        let rules = &schema.fields()[0].rules;

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].tag, "min");
        assert_eq!(rules[0].param.as_deref(), Some("3"));
        assert_eq!(rules[0].rule, Rule::Min(3.0));
        assert_eq!(rules[1].tag, "required");
        assert_eq!(rules[1].param, None);
    }

    #[test]
    fn test_unannotated_field_has_no_rules() {
        let schema = Schema::resolve(&[field("name", "")]).unwrap();
        assert!(schema.fields()[0].rules.is_empty());
        assert_eq!(schema.index_of("name"), Some(0));
        assert_eq!(schema.index_of("unknown"), None);
    }

    #[test]
    fn test_unknown_tag_is_custom() {
        let schema = Schema::resolve(&[field("code", "even,iso=4217")]).unwrap();
        let custom: Vec<_> = schema.custom_rules().map(|(_, spec)| spec.tag.as_str()).collect();
        assert_eq!(custom, vec!["even", "iso"]);
    }

    #[rstest]
    #[case("email,,required")]
    #[case("=3")]
    #[case("min=")]
    fn test_malformed_rule_lists(#[case] rules: &'static str) {
        let err = Schema::resolve(&[field("f", rules)]).unwrap_err();
        assert!(matches!(err, MetadataError::MalformedRule { .. }), "{err}");
    }

    #[rstest]
    #[case("min", MetadataError::MissingParam { field: "f".into(), tag: "min".into() })]
    #[case("min=abc", MetadataError::InvalidParam { field: "f".into(), tag: "min".into(), param: "abc".into() })]
    #[case("max_items=-1", MetadataError::InvalidParam { field: "f".into(), tag: "max_items".into(), param: "-1".into() })]
    #[case("oneof", MetadataError::MissingParam { field: "f".into(), tag: "oneof".into() })]
    #[case("email=yes", MetadataError::UnexpectedParam { field: "f".into(), tag: "email".into() })]
    fn test_parameter_checks(#[case] rules: &'static str, #[case] expected: MetadataError) {
        assert_eq!(Schema::resolve(&[field("f", rules)]), Err(expected));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let fields = [
            RawField::new("a", "email", "", "String", Arity::Single),
            RawField::new("b", "email", "", "String", Arity::Single),
        ];
        assert_eq!(
            Schema::resolve(&fields),
            Err(MetadataError::DuplicateKey {
                key: "email".to_string()
            })
        );
    }

    #[test]
    fn test_empty_key_rejected() {
        let fields = [RawField::new("a", " ", "", "String", Arity::Single)];
        assert!(matches!(
            Schema::resolve(&fields),
            Err(MetadataError::EmptyKey { .. })
        ));
    }

    #[test]
    fn test_schema_cell_resolves_once() {
        static CELL: SchemaCell = SchemaCell::new();
        let fields = [field("name", "required")];

        let first = CELL.get_or_resolve(&fields).unwrap() as *const Schema;
        // A different field list is ignored once the cell is filled
        let second = CELL.get_or_resolve(&[]).unwrap() as *const Schema;
        assert_eq!(first, second);
    }
}
