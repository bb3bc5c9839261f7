// File: src/error.rs
// Purpose: Fatal error kinds of the form pipeline

use thiserror::Error;

/// Malformed annotations on a record type.
///
/// This is a programming error in the record definition, not a per-request
/// condition. `FormParser::register` surfaces it at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("field `{field}` has an empty decode key")]
    EmptyKey { field: String },

    #[error("decode key `{key}` is used by more than one field")]
    DuplicateKey { key: String },

    #[error("field `{field}` has a malformed rule list `{rules}`")]
    MalformedRule { field: String, rules: String },

    #[error("rule `{tag}` on field `{field}` requires a parameter")]
    MissingParam { field: String, tag: String },

    #[error("rule `{tag}` on field `{field}` has an invalid parameter `{param}`")]
    InvalidParam {
        field: String,
        tag: String,
        param: String,
    },

    #[error("rule `{tag}` on field `{field}` does not take a parameter")]
    UnexpectedParam { field: String, tag: String },

    #[error("rule `{tag}` on field `{field}` is not known to the validator")]
    UnknownRule { field: String, tag: String },
}

/// The request body could not be read or is not valid form data.
#[derive(Debug, Error)]
#[error("unreadable form data: {cause:#}")]
pub struct TransportError {
    cause: anyhow::Error,
}

impl TransportError {
    pub fn new(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

/// The validation engine failed with something other than rule failures.
#[derive(Debug, Error)]
#[error("validation engine failure: {cause:#}")]
pub struct EngineFailure {
    cause: anyhow::Error,
}

impl EngineFailure {
    pub fn new(cause: impl Into<anyhow::Error>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

/// Everything that stops `FormParser::parse` from producing an invalid-field map.
///
/// Field-level conversion and rule failures are never reported here; they
/// end up as messages in [`InvalidFields`](crate::InvalidFields).
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    ValidationEngine(#[from] EngineFailure),
}

/// Outcome shape of the decode and validate collaborators.
///
/// `Structured` carries the expected per-field failures; `Opaque` is any
/// other failure, which the pipeline treats as fatal.
#[derive(Debug)]
pub enum EngineError<F> {
    Structured(Vec<F>),
    Opaque(anyhow::Error),
}

impl<F> EngineError<F> {
    pub fn opaque(cause: impl Into<anyhow::Error>) -> Self {
        EngineError::Opaque(cause.into())
    }
}
