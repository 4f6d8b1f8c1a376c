//! Elements: immutable templates that objects are built from.
//!
//! Elements are decoded from declaration documents and registered once, before
//! any object is constructed. After the load pass the registry is only read,
//! so it can be shared freely between threads.

use crate::data::{DataHolder, DataTree, DataValue};
use crate::error::ObjectError;
use crate::id::{Id, NameError};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A declared template: default data plus the Constructor that builds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Id,
    pub constructor_id: Id,
    pub data: DataTree,
}

impl Element {
    pub fn new(id: Id, constructor_id: Id, data: DataTree) -> Self {
        Self {
            id,
            constructor_id,
            data,
        }
    }

    /// Declare an Element by name; its id is the name hash.
    pub fn named(name: &str, constructor_id: Id, data: DataTree) -> Result<Self, NameError> {
        Ok(Self::new(Id::from_name(name)?, constructor_id, data))
    }
}

impl DataHolder for Element {
    fn value(&self, key: &str) -> Option<&DataValue> {
        self.data.value(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DataValue)> + '_> {
        self.data.entries()
    }
}

/// Sibling Elements declared together in one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementArray(Vec<Element>);

impl ElementArray {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, element: Element) {
        self.0.push(element);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.0.iter()
    }
}

impl From<Vec<Element>> for ElementArray {
    fn from(elements: Vec<Element>) -> Self {
        Self(elements)
    }
}

impl FromIterator<Element> for ElementArray {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ElementArray {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Elements by id. Registration is the only mutation.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: HashMap<Id, Element>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an Element. A later registration under the same id replaces
    /// the earlier one, which is returned.
    pub fn register(&mut self, element: Element) -> Option<Element> {
        let id = element.id;
        let previous = self.elements.insert(id, element);
        if previous.is_some() {
            warn!(element = %id, "element re-registered, previous declaration replaced");
        } else {
            debug!(element = %id, "element registered");
        }
        previous
    }

    pub fn register_all(&mut self, elements: impl IntoIterator<Item = Element>) {
        for element in elements {
            self.register(element);
        }
    }

    pub fn get(&self, id: Id) -> Result<&Element, ObjectError> {
        self.elements.get(&id).ok_or(ObjectError::UnknownElement(id))
    }

    pub fn get_or_none(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.elements.keys().copied()
    }
}

// ---------------------------------------------------------------------------
// Id references
// ---------------------------------------------------------------------------

/// Read an Element or Constructor id from a value written as a number or a
/// name. A string holding a decimal integer is read as that literal id.
/// Returns `Ok(None)` for any other kind of value.
pub fn parse_id(value: &DataValue) -> Result<Option<Id>, NameError> {
    match value {
        DataValue::Long(id) => Ok(Some(Id(*id))),
        DataValue::String(text) => match text.parse::<i64>() {
            Ok(id) => Ok(Some(Id(id))),
            Err(_) => Id::from_name(text).map(Some),
        },
        _ => Ok(None),
    }
}
