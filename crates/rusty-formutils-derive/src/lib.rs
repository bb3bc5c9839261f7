// rusty-formutils Procedural Macros

use proc_macro::TokenStream;

use syn::{parse_macro_input, DeriveInput};

mod form;

/// Derive macro for form records
///
/// Generates a `rusty_formutils::Form` implementation: the per-field decode
/// key, rule list, type name and arity, plus index-based decoding and value
/// inspection used by the decoder and the rule validator.
///
/// # Example
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
///
///     #[form(skip)]
///     created_by: Option<u64>,
/// }
/// ```
///
/// # Field Attributes
///
/// - `#[form(key = "...")]` - Form key to decode from (default: the field name)
/// - `#[form(validate = "...")]` - Comma-separated rules, e.g. `"min=3,required"`
/// - `#[form(skip)]` - Neither decoded nor validated
///
/// Every other field type must implement `rusty_formutils::FormValue`
/// (`String`, numbers, `bool`, chrono dates, and `Option`/`Vec` of those).
#[proc_macro_derive(Form, attributes(form))]
pub fn derive_form(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    form::impl_form(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
