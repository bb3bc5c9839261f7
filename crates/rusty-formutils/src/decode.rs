// File: src/decode.rs
// Purpose: Decoder - fills a record's fields from raw form data

use crate::error::EngineError;
use crate::form::{DecodeFault, Form};
use crate::raw::RawForm;
use crate::schema::Schema;
use crate::value::Arity;
use anyhow::anyhow;
use tracing::trace;

/// A raw value that could not be converted into its field's type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    /// The offending form key
    pub key: String,
    /// Declared element type name of the target field
    pub type_name: &'static str,
    /// Whether the key carried one value or several
    pub arity: Arity,
}

/// Fills a record from raw form data.
///
/// Conversion failures come back as `EngineError::Structured`; anything else
/// the decoder cannot cope with is `EngineError::Opaque`.
pub trait Decode: Send + Sync {
    fn decode<T: Form>(
        &self,
        schema: &Schema,
        raw: &RawForm,
        record: &mut T,
    ) -> Result<(), EngineError<ConversionFailure>>;
}

/// The default decoder, driven by the record's resolved schema.
///
/// - keys with no matching field are ignored
/// - a failing key leaves its field untouched and decoding continues
/// - one failure per key, no matter how many values it carried
/// - a failure is plural when the key carried more than one value, whatever
///   the field's declared shape
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaDecoder;

impl SchemaDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decode for SchemaDecoder {
    fn decode<T: Form>(
        &self,
        schema: &Schema,
        raw: &RawForm,
        record: &mut T,
    ) -> Result<(), EngineError<ConversionFailure>> {
        let mut failures = Vec::new();

        for (key, values) in raw.iter() {
            let Some(index) = schema.index_of(key) else {
                trace!("Ignoring unknown form key `{}`", key);
                continue;
            };
            let Some(field) = schema.field(index) else {
                return Err(EngineError::opaque(anyhow!(
                    "schema has no field at index {index} for key `{key}`"
                )));
            };

            match record.decode_field(index, values) {
                Ok(()) => {}
                Err(DecodeFault::Mismatch) => failures.push(ConversionFailure {
                    key: key.to_string(),
                    type_name: field.type_name,
                    arity: if values.len() > 1 {
                        Arity::Collection
                    } else {
                        Arity::Single
                    },
                }),
                Err(DecodeFault::UnknownField(index)) => {
                    return Err(EngineError::opaque(anyhow!(
                        "record has no field at index {index} (key `{key}`)"
                    )));
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
