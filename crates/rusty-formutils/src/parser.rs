// File: src/parser.rs
// Purpose: FormParser - runs decode, validate and merge for one submission

use crate::catalog::Catalogs;
use crate::config::FormConfig;
use crate::decode::{Decode, SchemaDecoder};
use crate::error::{EngineError, EngineFailure, FormError, MetadataError, TransportError};
use crate::form::Form;
use crate::merge::{merge, InvalidFields};
use crate::raw::RawForm;
use crate::validate::{RuleValidator, Validate};
use tracing::{debug, warn};

/// The form pipeline.
///
/// Owns the message catalogs and both engines. Immutable once built, so one
/// instance can serve every request (share it behind an `Arc`).
#[derive(Debug, Clone)]
pub struct FormParser<D = SchemaDecoder, V = RuleValidator> {
    catalogs: Catalogs,
    decoder: D,
    validator: V,
    max_body_bytes: usize,
}

impl FormParser {
    /// A parser with the bundled catalogs and the default engines
    pub fn new(catalogs: Catalogs) -> Self {
        Self {
            catalogs,
            decoder: SchemaDecoder::new(),
            validator: RuleValidator::new(),
            max_body_bytes: FormConfig::default().max_body_bytes,
        }
    }

    pub fn from_config(config: &FormConfig) -> Self {
        Self::new(config.catalogs()).with_max_body_bytes(config.max_body_bytes)
    }
}

impl Default for FormParser {
    fn default() -> Self {
        Self::new(Catalogs::default())
    }
}

impl<D: Decode, V: Validate> FormParser<D, V> {
    /// Swap the validator, e.g. for a `RuleValidator` with custom rules
    pub fn with_validator<W: Validate>(self, validator: W) -> FormParser<D, W> {
        FormParser {
            catalogs: self.catalogs,
            decoder: self.decoder,
            validator,
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn with_decoder<E: Decode>(self, decoder: E) -> FormParser<E, V> {
        FormParser {
            catalogs: self.catalogs,
            decoder,
            validator: self.validator,
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Resolve `T`'s metadata and check every rule tag is known.
    ///
    /// Call at startup so malformed annotations fail fast instead of on the
    /// first request.
    pub fn register<T: Form>(&self) -> Result<(), MetadataError> {
        let result = self.check_rules::<T>();
        if let Err(err) = &result {
            warn!("Form {} failed registration: {}", std::any::type_name::<T>(), err);
        }
        result
    }

    fn check_rules<T: Form>(&self) -> Result<(), MetadataError> {
        let schema = T::schema()?;
        for (field, spec) in schema.custom_rules() {
            if !self.validator.supports(&spec.tag) {
                return Err(MetadataError::UnknownRule {
                    field: field.name.to_string(),
                    tag: spec.tag.clone(),
                });
            }
        }
        Ok(())
    }

    /// Decode `raw` into `record`, validate it and build the invalid-field map.
    ///
    /// Returns an empty map for a valid submission. Per-field problems are
    /// never errors; `Err` means the pipeline itself could not run.
    pub fn parse<T: Form>(&self, raw: &RawForm, record: &mut T) -> Result<InvalidFields, FormError> {
        let schema = T::schema()?;

        let conversions = match self.decoder.decode(schema, raw, record) {
            Ok(()) => Vec::new(),
            Err(EngineError::Structured(failures)) => failures,
            Err(EngineError::Opaque(cause)) => return Err(TransportError::new(cause).into()),
        };

        let rules = match self.validator.validate(schema, record) {
            Ok(()) => Vec::new(),
            Err(EngineError::Structured(failures)) => failures,
            Err(EngineError::Opaque(cause)) => return Err(EngineFailure::new(cause).into()),
        };

        let fields = merge(&self.catalogs, &conversions, &rules);
        debug!(
            "Parsed {} with {} conversion and {} rule failures ({} invalid fields)",
            std::any::type_name::<T>(),
            conversions.len(),
            rules.len(),
            fields.len()
        );

        Ok(fields)
    }
}
