// File: src/form.rs
// Purpose: The record trait implemented by #[derive(Form)]

use crate::error::MetadataError;
use crate::schema::{RawField, Schema, SchemaCell};
use crate::value::FieldValue;

/// Why a single field could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFault {
    /// The raw value does not convert to the field's type
    Mismatch,
    /// The record does not own a field at this index
    UnknownField(usize),
}

/// A target record: a struct whose fields are filled from form data and
/// checked against declarative rules.
///
/// Normally derived:
///
/// ```ignore
/// use rusty_formutils::Form;
///
/// #[derive(Debug, Default, Form)]
/// struct CreateUserForm {
///     name: String,
///
///     #[form(key = "email", validate = "email,required")]
///     email: String,
///
///     #[form(validate = "min=3,required")]
///     password: String,
/// }
/// ```
///
/// Field indices used by [`decode_field`](Form::decode_field) and
/// [`field_value`](Form::field_value) are positions in [`fields`](Form::fields).
pub trait Form {
    /// Unparsed metadata for every decoded field, in declaration order
    fn fields() -> &'static [RawField]
    where
        Self: Sized;

    /// The per-type cache slot for the resolved schema
    fn schema_cell() -> &'static SchemaCell
    where
        Self: Sized;

    /// Resolved metadata, parsed on first use and cached for the process lifetime
    fn schema() -> Result<&'static Schema, MetadataError>
    where
        Self: Sized,
    {
        Self::schema_cell().get_or_resolve(Self::fields())
    }

    /// Convert `values` into the field at `index`.
    ///
    /// On failure the field keeps its current value.
    fn decode_field(&mut self, index: usize, values: &[String]) -> Result<(), DecodeFault>;

    /// Current value of the field at `index`, `None` if there is no such field
    fn field_value(&self, index: usize) -> Option<FieldValue<'_>>;
}
