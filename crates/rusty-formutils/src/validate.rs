// File: src/validate.rs
// Purpose: Rule validator - evaluates each field's declared rules against the decoded record

use crate::error::EngineError;
use crate::form::Form;
use crate::schema::{Rule, RuleSpec, Schema};
use crate::value::{Arity, FieldValue};
use anyhow::{anyhow, bail, Context};
use rusty_formutils_validation as predicates;
use rusty_formutils_validation::Bound;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A field whose value broke one of its rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    /// Decode key of the field
    pub field: String,
    /// Rule tag, e.g. `"min"`
    pub tag: String,
    /// Rule parameter, e.g. `"3"`
    pub param: Option<String>,
    /// Shape of the value that was checked
    pub arity: Arity,
}

/// Checks a decoded record against its declared rules.
pub trait Validate: Send + Sync {
    /// Whether this validator knows the rule `tag`
    fn supports(&self, tag: &str) -> bool;

    fn validate<T: Form>(
        &self,
        schema: &Schema,
        record: &T,
    ) -> Result<(), EngineError<RuleFailure>>;
}

/// A user-supplied rule: value and parameter in, pass/fail out.
///
/// Returning `Err` aborts validation of the whole record.
pub type CustomRule =
    Arc<dyn Fn(&FieldValue<'_>, Option<&str>) -> anyhow::Result<bool> + Send + Sync>;

/// The default validator.
///
/// Rules run in declaration order and every failing rule is reported.
/// A zero value is settled by whichever of `required` and `omitempty` is
/// declared first: `required` reports only itself, `omitempty` skips every
/// rule. An absent optional value is only checked by `required`.
#[derive(Clone, Default)]
pub struct RuleValidator {
    custom: HashMap<String, CustomRule>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a rule for `tag`
    pub fn with_rule<F>(mut self, tag: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&FieldValue<'_>, Option<&str>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.custom.insert(tag.into(), Arc::new(rule));
        self
    }

    fn check(&self, spec: &RuleSpec, value: &FieldValue<'_>) -> anyhow::Result<bool> {
        match (&spec.rule, value) {
            (Rule::Required, value) => Ok(!value.is_zero()),
            (Rule::OmitEmpty, _) => Ok(true),
            (_, FieldValue::Absent) => Ok(true),
            (Rule::Custom, value) => {
                let rule = self
                    .custom
                    .get(&spec.tag)
                    .ok_or_else(|| anyhow!("no rule registered for tag `{}`", spec.tag))?;
                rule(value, spec.param.as_deref())
            }
            (Rule::MinItems(min), FieldValue::List(items)) => {
                Ok(predicates::count_within(items.len(), Some(*min), None))
            }
            (Rule::MaxItems(max), FieldValue::List(items)) => {
                Ok(predicates::count_within(items.len(), None, Some(*max)))
            }
            (Rule::MinItems(_) | Rule::MaxItems(_), value) => {
                bail!("rule `{}` applies to lists, not to a {} value", spec.tag, value.kind())
            }
            (rule, FieldValue::List(items)) => {
                for item in items {
                    if !check_item(rule, &spec.tag, item)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (rule, value) => check_item(rule, &spec.tag, value),
        }
    }
}

impl fmt::Debug for RuleValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("RuleValidator")
            .field("custom", &tags)
            .finish()
    }
}

impl Validate for RuleValidator {
    fn supports(&self, tag: &str) -> bool {
        self.custom.contains_key(tag)
    }

    fn validate<T: Form>(
        &self,
        schema: &Schema,
        record: &T,
    ) -> Result<(), EngineError<RuleFailure>> {
        let mut failures = Vec::new();

        for (index, field) in schema.fields().iter().enumerate() {
            if field.rules.is_empty() {
                continue;
            }

            let value = record.field_value(index).ok_or_else(|| {
                EngineError::opaque(anyhow!(
                    "record has no value for field `{}` at index {index}",
                    field.name
                ))
            })?;

            let failure = |spec: &RuleSpec| RuleFailure {
                field: field.key.to_string(),
                tag: spec.tag.clone(),
                param: spec.param.clone(),
                arity: value.arity(),
            };

            // A zero value is decided by the first presence rule alone
            if value.is_zero() {
                let presence = field
                    .rules
                    .iter()
                    .find(|spec| matches!(spec.rule, Rule::Required | Rule::OmitEmpty));
                match presence {
                    Some(spec) if spec.rule == Rule::Required => {
                        failures.push(failure(spec));
                        continue;
                    }
                    Some(_) => continue,
                    None => {}
                }
            }

            for spec in &field.rules {
                if spec.rule == Rule::OmitEmpty {
                    continue;
                }

                let passed = self
                    .check(spec, &value)
                    .with_context(|| format!("checking rule `{}` on field `{}`", spec.tag, field.name))
                    .map_err(EngineError::Opaque)?;

                if !passed {
                    failures.push(failure(spec));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Structured(failures))
        }
    }
}

/// Evaluate a built-in rule against one text or numeric value
fn check_item(rule: &Rule, tag: &str, value: &FieldValue<'_>) -> anyhow::Result<bool> {
    if let FieldValue::Text(text) = value {
        return check_text(rule, tag, text);
    }

    let Some(number) = value.as_number() else {
        bail!("rule `{tag}` cannot check a {} value", value.kind());
    };

    let passed = match rule {
        Rule::Min(limit) => Bound::AtLeast.holds(number, *limit),
        Rule::Max(limit) => Bound::AtMost.holds(number, *limit),
        Rule::Len(limit) => Bound::Exactly.holds(number, *limit),
        Rule::Gt(limit) => Bound::Above.holds(number, *limit),
        Rule::Gte(limit) => Bound::AtLeast.holds(number, *limit),
        Rule::Lt(limit) => Bound::Below.holds(number, *limit),
        Rule::Lte(limit) => Bound::AtMost.holds(number, *limit),
        Rule::Eq(param) => Bound::Exactly.holds(number, parse_number(tag, param)?),
        Rule::Ne(param) => !Bound::Exactly.holds(number, parse_number(tag, param)?),
        Rule::OneOf(choices) => {
            let mut matched = false;
            for choice in choices.split_whitespace() {
                matched |= Bound::Exactly.holds(number, parse_number(tag, choice)?);
            }
            matched
        }
        _ => bail!("rule `{tag}` cannot check a {} value", value.kind()),
    };

    Ok(passed)
}

fn check_text(rule: &Rule, tag: &str, text: &str) -> anyhow::Result<bool> {
    let length = predicates::char_count(text) as f64;

    let passed = match rule {
        Rule::Email => predicates::is_valid_email(text),
        Rule::Url => predicates::is_valid_url(text),
        Rule::Alpha => predicates::is_alpha(text),
        Rule::AlphaNum => predicates::is_alphanumeric(text),
        Rule::Numeric => predicates::is_numeric(text),
        Rule::Min(limit) => Bound::AtLeast.holds(length, *limit),
        Rule::Max(limit) => Bound::AtMost.holds(length, *limit),
        Rule::Len(limit) => Bound::Exactly.holds(length, *limit),
        Rule::Gt(limit) => Bound::Above.holds(length, *limit),
        Rule::Gte(limit) => Bound::AtLeast.holds(length, *limit),
        Rule::Lt(limit) => Bound::Below.holds(length, *limit),
        Rule::Lte(limit) => Bound::AtMost.holds(length, *limit),
        Rule::Eq(expected) => text == expected,
        Rule::Ne(expected) => text != expected,
        Rule::OneOf(choices) => predicates::is_one_of(text, choices),
        Rule::Contains(needle) => predicates::contains(text, needle),
        Rule::StartsWith(prefix) => predicates::starts_with(text, prefix),
        Rule::EndsWith(suffix) => predicates::ends_with(text, suffix),
        _ => bail!("rule `{tag}` cannot check a text value"),
    };

    Ok(passed)
}

fn parse_number(tag: &str, param: &str) -> anyhow::Result<f64> {
    param
        .parse::<f64>()
        .with_context(|| format!("rule `{tag}` compares numbers but `{param}` is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::DecodeFault;
    use crate::schema::{RawField, SchemaCell};
    use crate::value::FormValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// A one-field record whose rules and value are set per test
    struct SingleField<V: FormValue> {
        value: V,
        rules: &'static str,
    }

    impl<V: FormValue> SingleField<V> {
        fn run(&self, validator: &RuleValidator) -> Result<(), EngineError<RuleFailure>> {
            let fields = [RawField::new("subject", "subject", self.rules, V::TYPE_NAME, V::ARITY)];
            let schema = Schema::resolve(&fields).unwrap();
            validator.validate(&schema, self)
        }

        fn failed_tags(&self) -> Vec<String> {
            match self.run(&RuleValidator::new()) {
                Ok(()) => Vec::new(),
                Err(EngineError::Structured(failures)) => {
                    failures.into_iter().map(|failure| failure.tag).collect()
                }
                Err(EngineError::Opaque(err)) => panic!("unexpected engine error: {err:#}"),
            }
        }
    }

    impl<V: FormValue> Form for SingleField<V> {
        fn fields() -> &'static [RawField] {
            &[]
        }

        fn schema_cell() -> &'static SchemaCell {
            static CELL: SchemaCell = SchemaCell::new();
            &CELL
        }

        fn decode_field(&mut self, index: usize, _values: &[String]) -> Result<(), DecodeFault> {
            Err(DecodeFault::UnknownField(index))
        }

        fn field_value(&self, index: usize) -> Option<FieldValue<'_>> {
            (index == 0).then(|| self.value.inspect())
        }
    }

    fn single_field<V: FormValue>(value: V, rules: &'static str) -> SingleField<V> {
        SingleField { value, rules }
    }

    #[test]
    fn test_reports_every_failing_rule_in_order() {
        let failures = single_field("x".to_string(), "email,min=3,required").failed_tags();
        assert_eq!(failures, vec!["email", "min"]);
    }

    #[rstest]
    #[case("email,required")]
    #[case("min=3,required")]
    #[case("required,min=3,email")]
    fn test_zero_value_only_reports_required(#[case] rules: &'static str) {
        assert_eq!(single_field(String::new(), rules).failed_tags(), vec!["required"]);
        assert_eq!(single_field(0u32, "gte=18,required").failed_tags(), vec!["required"]);
    }

    #[test]
    fn test_first_presence_rule_decides_zero_value() {
        assert!(single_field(String::new(), "omitempty,required,email").failed_tags().is_empty());
        assert_eq!(
            single_field(String::new(), "required,omitempty,email").failed_tags(),
            vec!["required"]
        );
        // Without a presence rule every rule still runs
        assert_eq!(single_field(String::new(), "email").failed_tags(), vec!["email"]);
    }

    #[test]
    fn test_failure_carries_key_param_and_arity() {
        let outcome = single_field(vec!["ab".to_string()], "min=3").run(&RuleValidator::new());
        let Err(EngineError::Structured(failures)) = outcome else {
            panic!("expected a rule failure");
        };
        assert_eq!(
            failures,
            vec![RuleFailure {
                field: "subject".to_string(),
                tag: "min".to_string(),
                param: Some("3".to_string()),
                arity: Arity::Collection,
            }]
        );
    }

    #[rstest]
    #[case("ab", "min=3", false)]
    #[case("abc", "min=3", true)]
    #[case("héllo", "max=5", true)]
    #[case("abcd", "len=4", true)]
    #[case("user@example.com", "email", true)]
    #[case("not-an-email", "email", false)]
    #[case("https://example.com", "url", true)]
    #[case("abc1", "alpha", false)]
    #[case("abc1", "alphanum", true)]
    #[case("123", "numeric", true)]
    #[case("red", "oneof=red green blue", true)]
    #[case("pink", "oneof=red green blue", false)]
    #[case("secret", "eq=secret", true)]
    #[case("secret", "ne=secret", false)]
    #[case("hello world", "contains=lo w", true)]
    #[case("hello", "startswith=he", true)]
    #[case("hello", "endswith=he", false)]
    fn test_text_rules(#[case] value: &str, #[case] rules: &'static str, #[case] passes: bool) {
        let failures = single_field(value.to_string(), rules).failed_tags();
        assert_eq!(failures.is_empty(), passes, "{value:?} against {rules}");
    }

    #[rstest]
    #[case(17, "min=18", false)]
    #[case(18, "gte=18", true)]
    #[case(18, "gt=18", false)]
    #[case(120, "lte=120", true)]
    #[case(121, "max=120", false)]
    #[case(5, "eq=5", true)]
    #[case(5, "ne=5", false)]
    #[case(2, "oneof=1 2 3", true)]
    fn test_numeric_rules(#[case] value: i32, #[case] rules: &'static str, #[case] passes: bool) {
        let failures = single_field(value, rules).failed_tags();
        assert_eq!(failures.is_empty(), passes, "{value} against {rules}");
    }

    #[test]
    fn test_omitempty_skips_zero_values() {
        assert!(single_field(String::new(), "omitempty,email,min=5").failed_tags().is_empty());
        assert_eq!(
            single_field("x".to_string(), "omitempty,email").failed_tags(),
            vec!["email"]
        );
    }

    #[test]
    fn test_absent_value_only_checks_required() {
        assert!(single_field(None::<String>, "email,min=3").failed_tags().is_empty());
        assert_eq!(
            single_field(None::<String>, "required,email").failed_tags(),
            vec!["required"]
        );
        assert!(single_field(Some(7u8), "required,max=9").failed_tags().is_empty());
    }

    #[test]
    fn test_list_rules() {
        let tags = vec!["rust".to_string(), "go".to_string()];
        assert_eq!(single_field(tags.clone(), "min=3").failed_tags(), vec!["min"]);
        assert!(single_field(tags.clone(), "min_items=2,max_items=2").failed_tags().is_empty());
        assert_eq!(single_field(tags, "max_items=1").failed_tags(), vec!["max_items"]);
        assert_eq!(single_field(Vec::<String>::new(), "required").failed_tags(), vec!["required"]);
    }

    #[test]
    fn test_custom_rule() {
        let validator = RuleValidator::new().with_rule("even", |value, _| {
            Ok(value.as_number().is_some_and(|n| n % 2.0 == 0.0))
        });

        assert!(validator.supports("even"));
        assert!(!validator.supports("odd"));
        assert!(single_field(4u32, "even").run(&validator).is_ok());
        assert!(matches!(
            single_field(3u32, "even").run(&validator),
            Err(EngineError::Structured(_))
        ));
    }

    #[rstest]
    #[case::unregistered_tag(single_field(1u32, "even").run(&RuleValidator::new()))]
    #[case::items_rule_on_scalar(single_field("x".to_string(), "min_items=1").run(&RuleValidator::new()))]
    #[case::format_rule_on_number(single_field(1u32, "email").run(&RuleValidator::new()))]
    #[case::bound_on_boolean(single_field(true, "min=1").run(&RuleValidator::new()))]
    #[case::non_numeric_eq(single_field(1i64, "eq=one").run(&RuleValidator::new()))]
    fn test_engine_errors_are_opaque(#[case] outcome: Result<(), EngineError<RuleFailure>>) {
        assert!(matches!(outcome, Err(EngineError::Opaque(_))));
    }

    #[test]
    fn test_custom_rule_error_is_opaque() {
        let validator =
            RuleValidator::new().with_rule("remote", |_, _| Err(anyhow!("lookup service down")));
        let outcome = single_field("x".to_string(), "remote").run(&validator);

        let Err(EngineError::Opaque(err)) = outcome else {
            panic!("expected an opaque engine error");
        };
        assert!(format!("{err:#}").contains("lookup service down"));
    }
}
