// File: src/response.rs
// Purpose: Axum bridge - read a request into RawForm and turn pipeline outcomes into responses

use crate::decode::Decode;
use crate::error::{FormError, TransportError};
use crate::form::Form;
use crate::merge::InvalidFields;
use crate::parser::FormParser;
use crate::raw::RawForm;
use crate::validate::Validate;
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Top-level message of every invalid-data response
pub const INVALID_DATA_MESSAGE: &str = "Invalid Data";

const URLENCODED: &str = "application/x-www-form-urlencoded";

// ════════════════════════════════════════════════════════════
// 1. Invalid-field payload (400)
// ════════════════════════════════════════════════════════════

/// `400 Bad Request` with `{"message": "Invalid Data", "fields": {...}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFieldsResponse {
    fields: InvalidFields,
}

impl InvalidFieldsResponse {
    pub fn new(fields: InvalidFields) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &InvalidFields {
        &self.fields
    }
}

#[derive(Serialize)]
struct InvalidFieldsBody {
    message: &'static str,
    fields: InvalidFields,
}

impl IntoResponse for InvalidFieldsResponse {
    fn into_response(self) -> Response {
        let body = Json(InvalidFieldsBody {
            message: INVALID_DATA_MESSAGE,
            fields: self.fields,
        });

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

// ════════════════════════════════════════════════════════════
// 2. Fatal errors (500, no body)
// ════════════════════════════════════════════════════════════

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        error!("Form processing failed: {}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

// ════════════════════════════════════════════════════════════
// 3. Request reading
// ════════════════════════════════════════════════════════════

/// Collect the form data of a request.
///
/// Body pairs come first (only for `application/x-www-form-urlencoded`
/// requests, buffered up to `limit` bytes), then query-string pairs.
pub async fn read_form(request: Request, limit: usize) -> Result<RawForm, TransportError> {
    let (parts, body) = request.into_parts();
    let mut raw = RawForm::new();

    if is_urlencoded(&parts.headers) {
        let bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(TransportError::new)?;
        raw.extend_urlencoded(&bytes)?;
    }

    if let Some(query) = parts.uri.query() {
        raw.extend_urlencoded(query.as_bytes())?;
    }

    Ok(raw)
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(URLENCODED))
}

// ════════════════════════════════════════════════════════════
// 4. Pipeline entry points
// ════════════════════════════════════════════════════════════

/// Read `request` and run the pipeline on it
pub async fn parse_request<T, D, V>(
    parser: &FormParser<D, V>,
    request: Request,
    record: &mut T,
) -> Result<InvalidFields, FormError>
where
    T: Form,
    D: Decode,
    V: Validate,
{
    let raw = read_form(request, parser.max_body_bytes()).await?;
    parser.parse(&raw, record)
}

/// Run the pipeline and build the response a handler should return early with.
///
/// `None` means the record is filled and valid. `Some` is either the 400
/// invalid-data payload or an empty 500.
pub async fn parse_and_respond<T, D, V>(
    parser: &FormParser<D, V>,
    request: Request,
    record: &mut T,
) -> Option<Response>
where
    T: Form,
    D: Decode,
    V: Validate,
{
    match parse_request(parser, request, record).await {
        Ok(fields) if fields.is_valid() => None,
        Ok(fields) => Some(InvalidFieldsResponse::new(fields).into_response()),
        Err(err) => Some(err.into_response()),
    }
}
