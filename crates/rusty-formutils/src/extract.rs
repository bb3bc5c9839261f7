// File: src/extract.rs
// Purpose: ValidForm<T> extractor - a handler argument that is already decoded and validated

use crate::decode::Decode;
use crate::error::FormError;
use crate::form::Form;
use crate::merge::InvalidFields;
use crate::parser::FormParser;
use crate::response::{parse_request, InvalidFieldsResponse};
use crate::validate::Validate;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

// ════════════════════════════════════════════════════════════
// 1. The Extractor Struct
// ════════════════════════════════════════════════════════════

/// A record decoded from the request and free of invalid fields.
///
/// The parser is taken from application state through [`FormState`], so any
/// decoder and validator pair works.
/// Invalid submissions are rejected with the 400 invalid-data payload,
/// pipeline failures with an empty 500.
#[derive(Debug, Clone, Default)]
pub struct ValidForm<T>(pub T);

impl<T> ValidForm<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidForm<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for ValidForm<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

// ════════════════════════════════════════════════════════════
// 2. Parser Lookup
// ════════════════════════════════════════════════════════════

/// Application state that can hand out the form parser.
///
/// Implemented for `FormParser` and `Arc<FormParser>` with any decoder and
/// validator; implement it on your own state struct to share the parser.
pub trait FormState: Send + Sync {
    type Decoder: Decode;
    type Validator: Validate;

    fn form_parser(&self) -> &FormParser<Self::Decoder, Self::Validator>;
}

impl<D: Decode, V: Validate> FormState for FormParser<D, V> {
    type Decoder = D;
    type Validator = V;

    fn form_parser(&self) -> &FormParser<D, V> {
        self
    }
}

impl<D: Decode, V: Validate> FormState for Arc<FormParser<D, V>> {
    type Decoder = D;
    type Validator = V;

    fn form_parser(&self) -> &FormParser<D, V> {
        self
    }
}

// ════════════════════════════════════════════════════════════
// 3. Rejection
// ════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum FormRejection {
    /// At least one field failed conversion or a rule
    Invalid(InvalidFields),
    /// The pipeline itself failed
    Failed(FormError),
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        match self {
            FormRejection::Invalid(fields) => InvalidFieldsResponse::new(fields).into_response(),
            FormRejection::Failed(err) => err.into_response(),
        }
    }
}

// ════════════════════════════════════════════════════════════
// 4. Extraction
// ════════════════════════════════════════════════════════════

#[async_trait]
impl<S, T> FromRequest<S> for ValidForm<T>
where
    S: FormState,
    T: Form + Default + Send,
{
    type Rejection = FormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut record = T::default();

        let fields = parse_request(state.form_parser(), req, &mut record)
            .await
            .map_err(FormRejection::Failed)?;

        if fields.is_valid() {
            Ok(ValidForm(record))
        } else {
            Err(FormRejection::Invalid(fields))
        }
    }
}
