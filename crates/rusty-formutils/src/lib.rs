//! # rusty-formutils
//!
//! Decode a form submission into a typed record, check it against declarative
//! rules, and report every problem as one `field -> message` map.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rusty_formutils::{Form, FormParser, RawForm};
//!
//! #[derive(Debug, Default, Form)]
//! struct CreateUserForm {
//!     name: String,
//!
//!     #[form(validate = "email,required")]
//!     email: String,
//!
//!     #[form(validate = "min=3,required")]
//!     password: String,
//! }
//!
//! let parser = FormParser::default();
//! parser.register::<CreateUserForm>()?;
//!
//! let raw = RawForm::from_urlencoded(b"email=not-an-email&password=ab")?;
//! let mut form = CreateUserForm::default();
//! let invalid = parser.parse(&raw, &mut form)?;
//! // {"email": "must be a valid email address", "password": "must be min 3 chars length"}
//! ```
//!
//! ## Pipeline
//!
//! 1. **Decode** (`SchemaDecoder`) fills the record; values that do not
//!    convert are reported per key with the field's type name.
//! 2. **Validate** (`RuleValidator`) runs each field's rules in order.
//! 3. **Merge** turns both failure lists into messages through the type and
//!    rule catalogs. A conversion message always wins for its field.
//!
//! ## Axum
//!
//! - `parse_and_respond` returns the response to bail out with (400 JSON or 500)
//! - `ValidForm<T>` does the same as an extractor
//!
//! ## Architecture
//!
//! - **`rusty-formutils-derive`** - `#[derive(Form)]`
//! - **`rusty-formutils-validation`** - rule predicates (no_std compatible)

#![doc(html_root_url = "https://docs.rs/rusty-formutils/0.1.0")]

pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod extract;
pub mod form;
pub mod merge;
pub mod parser;
pub mod raw;
pub mod response;
pub mod schema;
pub mod validate;
pub mod value;

// Derive macro (macro namespace, lives next to the `Form` trait)
pub use rusty_formutils_derive::Form;

pub use catalog::{Catalogs, MessageCatalog, Templates};
pub use config::FormConfig;
pub use decode::{ConversionFailure, Decode, SchemaDecoder};
pub use error::{EngineError, EngineFailure, FormError, MetadataError, TransportError};
pub use extract::{FormRejection, FormState, ValidForm};
pub use form::{DecodeFault, Form};
pub use merge::{merge, InvalidFields};
pub use parser::FormParser;
pub use raw::RawForm;
pub use response::{parse_and_respond, parse_request, read_form, InvalidFieldsResponse};
pub use schema::{FieldDescriptor, RawField, Rule, RuleSpec, Schema, SchemaCell};
pub use validate::{CustomRule, RuleFailure, RuleValidator, Validate};
pub use value::{Arity, ConversionMismatch, FieldValue, FormScalar, FormValue};

/// Predicates behind the built-in rules, for use in custom rules
pub use rusty_formutils_validation as predicates;
