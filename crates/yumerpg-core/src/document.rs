//! Document framing: declaration and instance documents as [`DataValue`]s.
//!
//! Both kinds of document are either a single object or an array of objects.
//!
//! - A declaration entry is `{id | name, constructor, data?}` and becomes an
//!   [`Element`]. Exactly one of `id` and `name` is given; a name is hashed.
//! - An instance entry is `{element | elementId, data?}` and is constructed
//!   into an object. An array document yields an [`ObjectArray`] in document
//!   order.
//!
//! The text formats live in [`json`](crate::json) and [`format`](crate::format);
//! this module never sees text.

use crate::context::{DATA_KEY, ELEMENT_KEY, LEGACY_ELEMENT_KEY, SerializeContext};
use crate::data::{DataTree, DataValue};
use crate::element::{Element, ElementArray, parse_id};
use crate::error::ObjectError;
use crate::id::{Id, NameError};
use crate::object::{ObjectArray, RpgObject};
use crate::options::{BatchPolicy, DecodeOptions};
use tracing::{debug, warn};

pub const ID_KEY: &str = "id";
pub const NAME_KEY: &str = "name";
pub const CONSTRUCTOR_KEY: &str = "constructor";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    Object(#[from] ObjectError),

    /// An entry of an array document failed.
    #[error("entry {index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: Box<DocumentError>,
    },
}

impl DocumentError {
    /// The innermost error, past any [`Entry`](DocumentError::Entry) wrapping.
    pub fn root(&self) -> &DocumentError {
        match self {
            DocumentError::Entry { source, .. } => source.root(),
            other => other,
        }
    }
}

fn malformed(message: impl Into<String>) -> DocumentError {
    DocumentError::Malformed(message.into())
}

fn in_entry(index: usize) -> impl FnOnce(DocumentError) -> DocumentError {
    move |err| DocumentError::Entry {
        index,
        source: Box::new(err),
    }
}

fn entry_tree(value: &DataValue) -> Result<&DataTree, DocumentError> {
    value
        .as_tree()
        .ok_or_else(|| malformed(format!("expected an object, found {}", value.kind())))
}

/// Non-null field lookup.
fn field<'a>(tree: &'a DataTree, key: &str) -> Option<&'a DataValue> {
    tree.get(key).filter(|v| !v.is_null())
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Decode one declaration entry.
pub fn decode_element(entry: &DataTree) -> Result<Element, DocumentError> {
    let id = match (field(entry, ID_KEY), field(entry, NAME_KEY)) {
        (Some(DataValue::Long(id)), None) => Id(*id),
        (Some(other), None) => {
            return Err(malformed(format!(
                "'{ID_KEY}' must be an integer, found {}",
                other.kind()
            )));
        }
        (None, Some(DataValue::String(name))) => Id::from_name(name)?,
        (None, Some(other)) => {
            return Err(malformed(format!(
                "'{NAME_KEY}' must be a string, found {}",
                other.kind()
            )));
        }
        _ => {
            return Err(malformed(format!(
                "declaration needs exactly one of '{ID_KEY}' or '{NAME_KEY}'"
            )));
        }
    };

    let constructor = field(entry, CONSTRUCTOR_KEY)
        .ok_or_else(|| malformed(format!("element {id} has no '{CONSTRUCTOR_KEY}'")))?;
    let constructor_id = parse_id(constructor)?.ok_or_else(|| {
        malformed(format!(
            "element {id}: '{CONSTRUCTOR_KEY}' must be an id or a name, found {}",
            constructor.kind()
        ))
    })?;

    let data = match field(entry, DATA_KEY) {
        None => DataTree::new(),
        Some(DataValue::Tree(tree)) => tree.clone(),
        Some(other) => {
            return Err(malformed(format!(
                "element {id}: '{DATA_KEY}' must be an object, found {}",
                other.kind()
            )));
        }
    };

    Ok(Element::new(id, constructor_id, data))
}

/// Decode a declaration document into its Elements, in document order.
pub fn decode_elements(document: &DataValue) -> Result<ElementArray, DocumentError> {
    let elements: ElementArray = match document {
        DataValue::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, value)| {
                entry_tree(value)
                    .and_then(decode_element)
                    .map_err(in_entry(index))
            })
            .collect::<Result<_, _>>()?,
        DataValue::Tree(entry) => vec![decode_element(entry)?].into(),
        other => {
            return Err(malformed(format!(
                "declaration document must be an object or an array, found {}",
                other.kind()
            )));
        }
    };
    debug!(count = elements.len(), "decoded element declarations");
    Ok(elements)
}

/// Write an Element back as a declaration entry, always by id.
pub fn encode_element(element: &Element) -> DataValue {
    let mut entry = DataTree::new();
    entry.insert(ID_KEY, element.id.0);
    entry.insert(CONSTRUCTOR_KEY, element.constructor_id.0);
    entry.insert(DATA_KEY, element.data.clone());
    DataValue::Tree(entry)
}

pub fn encode_elements(elements: &ElementArray) -> DataValue {
    DataValue::Array(elements.iter().map(encode_element).collect())
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// The framing of one instance entry: which Element to build and the data
/// laid over its defaults.
#[derive(Debug, Clone, Copy)]
struct InstanceFrame<'d> {
    element: Id,
    data: Option<&'d DataTree>,
}

fn frame_instance(entry: &DataTree) -> Result<InstanceFrame<'_>, DocumentError> {
    let element = field(entry, ELEMENT_KEY)
        .or_else(|| field(entry, LEGACY_ELEMENT_KEY))
        .ok_or_else(|| malformed(format!("instance has no '{ELEMENT_KEY}' field")))?;
    let element = parse_id(element)?.ok_or_else(|| {
        malformed(format!(
            "'{ELEMENT_KEY}' must be an id or a name, found {}",
            element.kind()
        ))
    })?;
    let data = match field(entry, DATA_KEY) {
        None => None,
        Some(DataValue::Tree(tree)) => Some(tree),
        Some(other) => {
            return Err(malformed(format!(
                "instance '{DATA_KEY}' must be an object, found {}",
                other.kind()
            )));
        }
    };
    Ok(InstanceFrame { element, data })
}

/// Construct the object described by one instance entry.
pub fn decode_instance(
    codec: SerializeContext<'_>,
    entry: &DataTree,
) -> Result<Box<dyn RpgObject>, DocumentError> {
    let frame = frame_instance(entry)?;
    Ok(codec.construct(frame.element, frame.data)?)
}

fn build_framed(
    codec: SerializeContext<'_>,
    index: usize,
    frame: InstanceFrame<'_>,
) -> Result<Box<dyn RpgObject>, DocumentError> {
    codec
        .construct(frame.element, frame.data)
        .map_err(|err| in_entry(index)(err.into()))
}

/// Decode an instance document with default options.
pub fn decode_objects(
    codec: SerializeContext<'_>,
    document: &DataValue,
) -> Result<Box<dyn RpgObject>, DocumentError> {
    decode_objects_with(codec, document, &DecodeOptions::default())
}

/// Decode an instance document. A single-object document yields that object;
/// an array document yields an [`ObjectArray`].
pub fn decode_objects_with(
    codec: SerializeContext<'_>,
    document: &DataValue,
    options: &DecodeOptions,
) -> Result<Box<dyn RpgObject>, DocumentError> {
    let entries = match document {
        DataValue::Tree(entry) => return decode_instance(codec, entry),
        DataValue::Array(entries) => entries,
        other => {
            return Err(malformed(format!(
                "instance document must be an object or an array, found {}",
                other.kind()
            )));
        }
    };

    // Every entry is framed before the first one is constructed.
    let mut frames = Vec::with_capacity(entries.len());
    for (index, value) in entries.iter().enumerate() {
        match entry_tree(value).and_then(frame_instance) {
            Ok(frame) => frames.push((index, frame)),
            Err(err) => {
                let err = in_entry(index)(err);
                match options.on_error {
                    BatchPolicy::Abort => return Err(err),
                    BatchPolicy::Skip => warn!(error = %err, "skipping malformed instance entry"),
                }
            }
        }
    }

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        frames
            .par_iter()
            .map(|&(index, frame)| build_framed(codec, index, frame))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results = frames
        .iter()
        .map(|&(index, frame)| build_framed(codec, index, frame));

    let array = collect_entries(results, options.on_error)?;
    debug!(count = array.len(), total = entries.len(), "decoded instance document");
    Ok(Box::new(array))
}

fn collect_entries(
    results: impl IntoIterator<Item = Result<Box<dyn RpgObject>, DocumentError>>,
    policy: BatchPolicy,
) -> Result<ObjectArray, DocumentError> {
    let mut array = ObjectArray::new();
    for result in results {
        match result {
            Ok(object) => array.push(object),
            Err(err) => match policy {
                BatchPolicy::Abort => return Err(err),
                BatchPolicy::Skip => warn!(error = %err, "skipping instance that failed to decode"),
            },
        }
    }
    Ok(array)
}

/// Write an object (or an array of objects) as an instance document.
pub fn encode_objects(
    codec: SerializeContext<'_>,
    object: &dyn RpgObject,
) -> Result<DataValue, DocumentError> {
    Ok(codec.deconstruct(object)?)
}

// ===========================================================================
// Tests
// ===========================================================================
