//! Decode options, deserializable from any of the supported document formats.

use serde::{Deserialize, Serialize};

/// What to do when one entry of a top-level instance array fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Fail the whole document with the first error.
    #[default]
    Abort,
    /// Drop failing entries and keep the rest, logging each one.
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub on_error: BatchPolicy,
}

impl DecodeOptions {
    pub fn skip_failures() -> Self {
        Self {
            on_error: BatchPolicy::Skip,
        }
    }
}
