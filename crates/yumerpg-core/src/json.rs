//! JSON text codec, the format saves are written in.

use crate::context::SerializeContext;
use crate::data::DataValue;
use crate::document::{self, DocumentError};
use crate::element::ElementArray;
use crate::object::RpgObject;
use crate::options::DecodeOptions;

pub fn parse(text: &str) -> Result<DataValue, DocumentError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_elements(text: &str) -> Result<ElementArray, DocumentError> {
    document::decode_elements(&parse(text)?)
}

pub fn decode_objects(codec: SerializeContext<'_>, text: &str) -> Result<Box<dyn RpgObject>, DocumentError> {
    document::decode_objects(codec, &parse(text)?)
}

pub fn decode_objects_with(
    codec: SerializeContext<'_>,
    text: &str,
    options: &DecodeOptions,
) -> Result<Box<dyn RpgObject>, DocumentError> {
    document::decode_objects_with(codec, &parse(text)?, options)
}

/// Compact JSON, one line.
pub fn encode_objects(codec: SerializeContext<'_>, object: &dyn RpgObject) -> Result<String, DocumentError> {
    let value = document::encode_objects(codec, object)?;
    Ok(serde_json::to_string(&value)?)
}

pub fn encode_objects_pretty(
    codec: SerializeContext<'_>,
    object: &dyn RpgObject,
) -> Result<String, DocumentError> {
    let value = document::encode_objects(codec, object)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
