//! Text formats a document may be authored in.
//!
//! Every format is parsed straight into [`DataValue`] and then framed by
//! [`document`](crate::document), so declarations behave the same whichever
//! format they were written in.

use crate::data::DataValue;
use crate::document::DocumentError;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Ron,
    Toml,
}

impl Format {
    pub fn from_extension(extension: &str) -> Result<Format, DocumentError> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "ron" => Ok(Format::Ron),
            "toml" => Ok(Format::Toml),
            _ => Err(DocumentError::UnsupportedFormat(extension.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Format, DocumentError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| DocumentError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(extension)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "json",
            Format::Ron => "ron",
            Format::Toml => "toml",
        })
    }
}

/// Parse a whole document. A TOML document is always a table.
pub fn parse_document(text: &str, format: Format) -> Result<DataValue, DocumentError> {
    Ok(match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Ron => ron::from_str(text)?,
        Format::Toml => toml::from_str(text)?,
    })
}

/// Parse a document holding a list of entries. TOML has no top-level arrays,
/// so there the list is read from the table key `toml_key`; the other formats
/// are returned as parsed.
pub fn parse_list(text: &str, format: Format, toml_key: &str) -> Result<DataValue, DocumentError> {
    let document = parse_document(text, format)?;
    if format != Format::Toml {
        return Ok(document);
    }
    match document.as_tree().and_then(|table| table.get(toml_key)) {
        Some(list @ DataValue::Array(_)) => Ok(list.clone()),
        Some(other) => Err(DocumentError::Malformed(format!(
            "'{toml_key}' must be an array, found {}",
            other.kind()
        ))),
        None => Err(DocumentError::Malformed(format!(
            "TOML document has no '{toml_key}' array"
        ))),
    }
}
