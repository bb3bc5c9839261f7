// File: src/value.rs
// Purpose: Field value types - conversion from raw strings and inspection for rules

use chrono::{DateTime, NaiveDate, Utc};

/// Whether a value (or a raw key) is a single item or a list of items.
///
/// Selects between the singular and plural message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Single,
    Collection,
}

impl Arity {
    pub fn is_collection(self) -> bool {
        matches!(self, Arity::Collection)
    }
}

/// A borrowed view of a record field, as seen by the rule validator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// A value rules cannot look into (dates, custom types); only its zero-ness is known
    Opaque { zero: bool },
    /// `None` in an `Option` field
    Absent,
    List(Vec<FieldValue<'a>>),
}

impl<'a> FieldValue<'a> {
    /// Zero value in the sense of "nothing was submitted"
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Int(n) => *n == 0,
            FieldValue::Uint(n) => *n == 0,
            FieldValue::Float(n) => *n == 0.0,
            FieldValue::Bool(b) => !b,
            FieldValue::Opaque { zero } => *zero,
            FieldValue::Absent => true,
            FieldValue::List(items) => items.is_empty(),
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            FieldValue::List(_) => Arity::Collection,
            _ => Arity::Single,
        }
    }

    /// Numeric view used by bound rules
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(n) => Some(*n as f64),
            FieldValue::Uint(n) => Some(*n as f64),
            FieldValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Short description used in engine error messages
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Int(_) | FieldValue::Uint(_) | FieldValue::Float(_) => "number",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Opaque { .. } => "opaque",
            FieldValue::Absent => "absent",
            FieldValue::List(_) => "list",
        }
    }
}

/// A single form value type: one raw string converts into one `Self`.
///
/// Implement this for your own types to use them (and `Option`/`Vec` of them)
/// as record fields.
pub trait FormScalar: Sized {
    /// Type-catalog key for conversion failures (`"i32"`, `"bool"`, ...)
    const TYPE_NAME: &'static str;

    /// Parse one non-empty raw value. `None` means a conversion failure.
    fn parse_form(raw: &str) -> Option<Self>;

    fn inspect(&self) -> FieldValue<'_>;
}

/// Outcome of converting a key's raw values into a field type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionMismatch;

/// Any type a record field may have.
///
/// Implemented for every [`FormScalar`], for `Option<T>` and for `Vec<T>`.
pub trait FormValue: Sized {
    /// Element type name, the key into the type catalog
    const TYPE_NAME: &'static str;

    const ARITY: Arity;

    /// Convert all raw values supplied for the field's key.
    ///
    /// `Ok(None)` leaves the field untouched (nothing usable was submitted).
    fn decode(values: &[String]) -> Result<Option<Self>, ConversionMismatch>;

    fn inspect(&self) -> FieldValue<'_>;
}

impl<T: FormScalar> FormValue for T {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const ARITY: Arity = Arity::Single;

    fn decode(values: &[String]) -> Result<Option<Self>, ConversionMismatch> {
        // Last value wins; an empty value leaves the field at its zero value
        match values.last() {
            Some(raw) if !raw.is_empty() => T::parse_form(raw).map(Some).ok_or(ConversionMismatch),
            _ => Ok(None),
        }
    }

    fn inspect(&self) -> FieldValue<'_> {
        FormScalar::inspect(self)
    }
}

impl<T: FormScalar> FormValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const ARITY: Arity = Arity::Single;

    fn decode(values: &[String]) -> Result<Option<Self>, ConversionMismatch> {
        <T as FormValue>::decode(values).map(|value| value.map(Some))
    }

    fn inspect(&self) -> FieldValue<'_> {
        match self {
            Some(value) => FormScalar::inspect(value),
            None => FieldValue::Absent,
        }
    }
}

impl<T: FormScalar> FormValue for Vec<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;
    const ARITY: Arity = Arity::Collection;

    fn decode(values: &[String]) -> Result<Option<Self>, ConversionMismatch> {
        let items = values
            .iter()
            .filter(|raw| !raw.is_empty())
            .map(|raw| T::parse_form(raw).ok_or(ConversionMismatch))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(items))
    }

    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(FormScalar::inspect).collect())
    }
}

impl FormScalar for String {
    const TYPE_NAME: &'static str = "String";

    fn parse_form(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl FormScalar for bool {
    const TYPE_NAME: &'static str = "bool";

    fn parse_form(raw: &str) -> Option<Self> {
        // Checkbox "on" plus the usual spellings
        match raw {
            "on" | "1" | "t" | "T" | "true" | "True" | "TRUE" => Some(true),
            "0" | "f" | "F" | "false" | "False" | "FALSE" => Some(false),
            _ => None,
        }
    }

    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

macro_rules! impl_form_scalar {
    ($variant:ident as $wide:ty: $($ty:ty),+) => {
        $(
            impl FormScalar for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn parse_form(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }

                fn inspect(&self) -> FieldValue<'_> {
                    FieldValue::$variant(*self as $wide)
                }
            }
        )+
    };
}

impl_form_scalar!(Int as i64: i8, i16, i32, i64, isize);
impl_form_scalar!(Uint as u64: u8, u16, u32, u64, usize);
impl_form_scalar!(Float as f64: f32, f64);

impl FormScalar for DateTime<Utc> {
    const TYPE_NAME: &'static str = "datetime";

    fn parse_form(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc))
    }

    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Opaque {
            zero: *self == DateTime::<Utc>::default(),
        }
    }
}

impl FormScalar for NaiveDate {
    const TYPE_NAME: &'static str = "date";

    fn parse_form(raw: &str) -> Option<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    fn inspect(&self) -> FieldValue<'_> {
        FieldValue::Opaque {
            zero: *self == NaiveDate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_scalar_takes_last_value() {
        let decoded = <i32 as FormValue>::decode(&raw(&["1", "2", "3"]));
        assert_eq!(decoded, Ok(Some(3)));
    }

    #[test]
    fn test_scalar_empty_value_is_skipped() {
        assert_eq!(<i32 as FormValue>::decode(&raw(&[""])), Ok(None));
        assert_eq!(<i32 as FormValue>::decode(&[]), Ok(None));
    }

    #[test]
    fn test_scalar_mismatch() {
        assert_eq!(
            <u8 as FormValue>::decode(&raw(&["300"])),
            Err(ConversionMismatch)
        );
        assert_eq!(
            <f64 as FormValue>::decode(&raw(&["abc"])),
            Err(ConversionMismatch)
        );
    }

    #[test]
    fn test_bool_spellings() {
        for spelling in ["on", "1", "t", "true", "TRUE"] {
            assert_eq!(bool::parse_form(spelling), Some(true), "{spelling}");
        }
        for spelling in ["0", "f", "false", "False"] {
            assert_eq!(bool::parse_form(spelling), Some(false), "{spelling}");
        }
        assert_eq!(bool::parse_form("yes"), None);
    }

    #[test]
    fn test_vec_decodes_every_item() {
        let decoded = <Vec<i64> as FormValue>::decode(&raw(&["1", "", "3"]));
        assert_eq!(decoded, Ok(Some(vec![1, 3])));

        let failed = <Vec<i64> as FormValue>::decode(&raw(&["1", "x"]));
        assert_eq!(failed, Err(ConversionMismatch));
    }

    #[test]
    fn test_option_wraps_inner_value() {
        assert_eq!(
            <Option<u32> as FormValue>::decode(&raw(&["7"])),
            Ok(Some(Some(7)))
        );
        assert_eq!(<Option<u32> as FormValue>::decode(&raw(&[""])), Ok(None));
        assert_eq!(FormValue::inspect(&None::<u32>), FieldValue::Absent);
    }

    #[test]
    fn test_type_names_and_arity() {
        assert_eq!(<i32 as FormValue>::TYPE_NAME, "i32");
        assert_eq!(<Vec<f32> as FormValue>::TYPE_NAME, "f32");
        assert_eq!(<Vec<f32> as FormValue>::ARITY, Arity::Collection);
        assert_eq!(<Option<bool> as FormValue>::ARITY, Arity::Single);
        assert_eq!(<DateTime<Utc> as FormValue>::TYPE_NAME, "datetime");
    }

    #[test]
    fn test_datetime_requires_rfc3339() {
        assert!(DateTime::<Utc>::parse_form("2024-03-01T10:00:00Z").is_some());
        assert!(DateTime::<Utc>::parse_form("2024-03-01T10:00:00+02:00").is_some());
        assert!(DateTime::<Utc>::parse_form("yesterday").is_none());
        assert!(NaiveDate::parse_form("2024-03-01").is_some());
        assert!(NaiveDate::parse_form("01/03/2024").is_none());
    }

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::Text("").is_zero());
        assert!(!FieldValue::Text("a").is_zero());
        assert!(FieldValue::Int(0).is_zero());
        assert!(FieldValue::Bool(false).is_zero());
        assert!(FieldValue::List(vec![]).is_zero());
        assert!(FieldValue::Absent.is_zero());
        assert!(!FieldValue::Opaque { zero: false }.is_zero());
    }
}
