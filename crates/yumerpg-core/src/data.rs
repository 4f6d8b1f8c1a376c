//! Protocol-agnostic data access.
//!
//! Every wire format decodes into [`DataValue`] / [`DataTree`]. Constructors
//! never see the wire format; they read through the [`DataHolder`] trait,
//! which can be layered over a fallback holder with [`Layered`]. The
//! construction context uses this to overlay instance-save data on top of an
//! Element's default data, key by key, without copying either side.

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::hash::{BuildHasherDefault, DefaultHasher};
use std::fmt;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A decoded value. `Null` is treated as absent by every getter.
///
/// Serializes untagged, so any self-describing serde format maps onto it
/// directly: integers become `Long`, other numbers `Double`, maps `Tree`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    String(String),
    Array(Vec<DataValue>),
    Tree(DataTree),
}

/// The kind of a [`DataValue`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Long,
    Double,
    String,
    Array,
    Tree,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Tree => "object",
        };
        f.write_str(name)
    }
}

impl DataValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            DataValue::Null => ValueKind::Null,
            DataValue::Bool(_) => ValueKind::Bool,
            DataValue::Long(_) => ValueKind::Long,
            DataValue::Double(_) => ValueKind::Double,
            DataValue::String(_) => ValueKind::String,
            DataValue::Array(_) => ValueKind::Array,
            DataValue::Tree(_) => ValueKind::Tree,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// True for booleans, numbers and strings.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            DataValue::Bool(_) | DataValue::Long(_) | DataValue::Double(_) | DataValue::String(_)
        )
    }

    pub fn as_tree(&self) -> Option<&DataTree> {
        match self {
            DataValue::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Long(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Long(i64::from(value))
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Double(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<DataTree> for DataValue {
    fn from(value: DataTree) -> Self {
        DataValue::Tree(value)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(value: Vec<DataValue>) -> Self {
        DataValue::Array(value)
    }
}

// ---------------------------------------------------------------------------
// DataTree
// ---------------------------------------------------------------------------

type Entries = IndexMap<String, DataValue, BuildHasherDefault<DefaultHasher>>;

/// A string-keyed map of values. Keys iterate in insertion order, which for
/// decoded data is document order. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTree(Entries);

/// A tree with no entries; used where an Element or instance declares no data.
pub static EMPTY_TREE: DataTree = DataTree::new();

impl DataTree {
    pub const fn new() -> Self {
        Self(IndexMap::with_hasher(BuildHasherDefault::new()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DataValue>) -> Option<DataValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<DataValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<DataValue>> FromIterator<(K, V)> for DataTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for DataTree {
    type Item = (String, DataValue);
    type IntoIter = indexmap::map::IntoIter<String, DataValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("field '{key}' should be {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

fn mismatch(key: &str, expected: ValueKind, found: &DataValue) -> DataError {
    DataError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

// ---------------------------------------------------------------------------
// DataHolder
// ---------------------------------------------------------------------------

/// Read-only keyed access to data, independent of the wire format.
///
/// Implementors only provide [`value`](DataHolder::value) and
/// [`entries`](DataHolder::entries); the typed getters are derived from them.
/// Typed getters return `Ok(None)` for absent or null keys and
/// [`DataError::TypeMismatch`] when a value exists with the wrong kind.
pub trait DataHolder {
    /// The raw value at `key`, if any.
    fn value(&self, key: &str) -> Option<&DataValue>;

    /// All visible entries. Null values are skipped.
    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DataValue)> + '_>;

    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some_and(|v| !v.is_null())
    }

    fn long(&self, key: &str) -> Result<Option<i64>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::Long(v)) => Ok(Some(*v)),
            Some(other) => Err(mismatch(key, ValueKind::Long, other)),
        }
    }

    /// Longs widen to doubles.
    fn double(&self, key: &str) -> Result<Option<f64>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::Double(v)) => Ok(Some(*v)),
            Some(DataValue::Long(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(mismatch(key, ValueKind::Double, other)),
        }
    }

    fn string(&self, key: &str) -> Result<Option<&str>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::String(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(mismatch(key, ValueKind::String, other)),
        }
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => Err(mismatch(key, ValueKind::Bool, other)),
        }
    }

    /// A nested tree. The tree comes whole from one layer; sub trees are not
    /// merged across a fallback chain.
    fn sub_data(&self, key: &str) -> Result<Option<&DataTree>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::Tree(v)) => Ok(Some(v)),
            Some(other) => Err(mismatch(key, ValueKind::Tree, other)),
        }
    }

    fn sub_array(&self, key: &str) -> Result<Option<&[DataValue]>, DataError> {
        match self.value(key) {
            None | Some(DataValue::Null) => Ok(None),
            Some(DataValue::Array(v)) => Ok(Some(v.as_slice())),
            Some(other) => Err(mismatch(key, ValueKind::Array, other)),
        }
    }

    /// Layer `self` over `fallback`.
    fn with_fallback<'a>(&'a self, fallback: &'a dyn DataHolder) -> Layered<'a>
    where
        Self: Sized,
    {
        Layered::new(self, fallback)
    }
}

impl DataHolder for DataTree {
    fn value(&self, key: &str) -> Option<&DataValue> {
        self.get(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DataValue)> + '_> {
        Box::new(self.iter().filter(|(_, v)| !v.is_null()))
    }
}

// ---------------------------------------------------------------------------
// Layered
// ---------------------------------------------------------------------------

/// A primary holder backed by a fallback. Lookups try the primary first; a
/// null in the primary does not shadow the fallback.
#[derive(Clone, Copy)]
pub struct Layered<'a> {
    primary: &'a dyn DataHolder,
    fallback: &'a dyn DataHolder,
}

impl<'a> Layered<'a> {
    pub fn new(primary: &'a dyn DataHolder, fallback: &'a dyn DataHolder) -> Self {
        Self { primary, fallback }
    }

    /// [`DataHolder::value`], borrowing from the layers rather than the view.
    pub fn get(&self, key: &str) -> Option<&'a DataValue> {
        self.primary
            .value(key)
            .filter(|v| !v.is_null())
            .or_else(|| self.fallback.value(key))
    }
}

impl DataHolder for Layered<'_> {
    fn value(&self, key: &str) -> Option<&DataValue> {
        self.get(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DataValue)> + '_> {
        let primary = self.primary;
        Box::new(
            self.primary.entries().chain(
                self.fallback
                    .entries()
                    .filter(move |(key, _)| !primary.contains(key)),
            ),
        )
    }
}

impl fmt::Debug for Layered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
