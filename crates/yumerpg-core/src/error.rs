//! Errors raised while building objects from Elements or writing them back.

use crate::data::DataError;
use crate::id::{Id, NameError};

/// Errors from construction and deconstruction. None of these are retried;
/// a failing object fails as a unit.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ObjectError {
    /// A referenced Element id is not registered.
    #[error("unknown element {0}")]
    UnknownElement(Id),

    /// An Element names a Constructor that was never registered.
    #[error("element {element} references unknown constructor {constructor}")]
    UnknownConstructor { element: Id, constructor: Id },

    /// A required field is absent from both instance and default data.
    #[error("element {element} is missing required field '{key}'")]
    MissingField { element: Id, key: String },

    /// A field is present with the wrong kind of value.
    #[error(transparent)]
    Data(#[from] DataError),

    /// A Constructor was handed an object of a different concrete type.
    #[error("element {element} produced an object that is not a {expected}")]
    UnexpectedObject { element: Id, expected: &'static str },

    /// A value in reference position is not an id, name, inline object or array.
    #[error("invalid object reference: {0}")]
    InvalidReference(String),

    /// A Constructor rejected otherwise well-formed data.
    #[error("element {element} has invalid '{key}': {reason}")]
    InvalidData {
        element: Id,
        key: String,
        reason: String,
    },

    /// Resolution re-entered a frame that is already on the current path.
    #[error("cyclic reference through elements {}", format_path(.path))]
    CyclicReference { path: Vec<Id> },

    #[error(transparent)]
    Name(#[from] NameError),
}

fn format_path(path: &[Id]) -> String {
    path.iter()
        .map(Id::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
