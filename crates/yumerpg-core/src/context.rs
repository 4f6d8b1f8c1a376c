//! Construction and deconstruction of object graphs.
//!
//! [`SerializeContext`] pairs the two registries and is the entry point for
//! both directions:
//!
//! - **construct**: Element id + optional instance data → object. Scalars are
//!   read through a [`Layered`] view (instance over Element defaults). Object
//!   references are resolved recursively: a number is an Element id, a string
//!   is an Element name, an inline `{element, data}` tree carries its own
//!   override data, and an array of any of these becomes an [`ObjectArray`].
//!   A reference value is always taken whole from one layer.
//! - **deconstruct**: object → `{element, data}` tree, with `data` written by
//!   the Element's Constructor through a [`DataBuilder`]. Nested objects are
//!   wrapped the same way; arrays become arrays.
//!
//! Both walks are pure over shared registries. Each resolution step pushes a
//! frame of (Element id, override data identity); meeting the same frame again
//! on the current path means the declarations loop, and construction fails
//! with [`ObjectError::CyclicReference`] instead of recursing forever.

use crate::constructor::{Constructor, ConstructorRegistry};
use crate::data::{DataHolder, DataTree, DataValue, EMPTY_TREE, Layered};
use crate::element::{Element, ElementArray, ElementRegistry, parse_id};
use crate::error::ObjectError;
use crate::id::Id;
use crate::object::{ObjectArray, RpgObject};
use std::ptr;
use tracing::trace;

/// Field naming the Element of an instance or inline reference.
pub const ELEMENT_KEY: &str = "element";
/// Older spelling of [`ELEMENT_KEY`], still accepted when reading.
pub const LEGACY_ELEMENT_KEY: &str = "elementId";
/// Field holding the instance data of an instance or inline reference.
pub const DATA_KEY: &str = "data";

// ---------------------------------------------------------------------------
// SerializeContext
// ---------------------------------------------------------------------------

/// Read-only view of both registries, passed by value into every walk.
#[derive(Debug, Clone, Copy)]
pub struct SerializeContext<'a> {
    elements: &'a ElementRegistry,
    constructors: &'a ConstructorRegistry,
}

impl<'a> SerializeContext<'a> {
    pub fn new(elements: &'a ElementRegistry, constructors: &'a ConstructorRegistry) -> Self {
        Self {
            elements,
            constructors,
        }
    }

    pub fn elements(&self) -> &'a ElementRegistry {
        self.elements
    }

    pub fn constructors(&self) -> &'a ConstructorRegistry {
        self.constructors
    }

    pub fn element(&self, id: Id) -> Result<&'a Element, ObjectError> {
        self.elements.get(id)
    }

    pub fn constructor_for(&self, element: &Element) -> Result<&'a dyn Constructor, ObjectError> {
        self.constructors.get(element.constructor_id, element.id)
    }

    /// Build an object of `element_id`, with `data` overlaying the Element's
    /// defaults.
    pub fn construct(
        &self,
        element_id: Id,
        data: Option<&DataTree>,
    ) -> Result<Box<dyn RpgObject>, ObjectError> {
        construct_in(*self, element_id, data, Vec::new())
    }

    /// Build every Element of a declaration group from its defaults alone.
    pub fn construct_all(&self, elements: &ElementArray) -> Result<ObjectArray, ObjectError> {
        elements
            .iter()
            .map(|element| self.construct(element.id, None))
            .collect()
    }

    /// Write an object back as data: arrays become arrays, everything else
    /// becomes `{element, data}`.
    pub fn deconstruct(&self, object: &dyn RpgObject) -> Result<DataValue, ObjectError> {
        if let Some(array) = object.as_array() {
            return array
                .iter()
                .map(|item| self.deconstruct(item))
                .collect::<Result<Vec<_>, _>>()
                .map(DataValue::Array);
        }

        let data = self.deconstruct_data(object)?;
        let mut wrapped = DataTree::new();
        wrapped.insert(ELEMENT_KEY, object.element_id().0);
        wrapped.insert(DATA_KEY, data);
        Ok(DataValue::Tree(wrapped))
    }

    /// Only the `data` part of [`deconstruct`](Self::deconstruct) for a
    /// single, non-array object.
    pub fn deconstruct_data(&self, object: &dyn RpgObject) -> Result<DataTree, ObjectError> {
        let element = self.element(object.element_id())?;
        let constructor = self.constructor_for(element)?;
        trace!(element = %element.id, constructor = constructor.name(), "deconstructing");

        let mut ctx = DeconstructContext {
            object,
            data: DataBuilder::new(*self),
        };
        constructor.deconstruct(&mut ctx)?;
        Ok(ctx.data.finish())
    }

    /// Deconstruct and construct again; the result matches `object` on every
    /// durable field.
    pub fn reconstruct(&self, object: &dyn RpgObject) -> Result<Box<dyn RpgObject>, ObjectError> {
        if let Some(array) = object.as_array() {
            let items = array
                .iter()
                .map(|item| self.reconstruct(item))
                .collect::<Result<ObjectArray, _>>()?;
            return Ok(Box::new(items));
        }
        let data = self.deconstruct_data(object)?;
        self.construct(object.element_id(), Some(&data))
    }
}

/// One step of a resolution path.
#[derive(Debug, Clone, Copy)]
struct Frame<'c> {
    element: Id,
    data: Option<&'c DataTree>,
}

impl Frame<'_> {
    fn same_as(&self, other: &Frame<'_>) -> bool {
        self.element == other.element
            && match (self.data, other.data) {
                (None, None) => true,
                (Some(a), Some(b)) => ptr::eq(a, b),
                _ => false,
            }
    }
}

fn construct_in<'c>(
    codec: SerializeContext<'c>,
    element_id: Id,
    data: Option<&'c DataTree>,
    mut path: Vec<Frame<'c>>,
) -> Result<Box<dyn RpgObject>, ObjectError> {
    let frame = Frame {
        element: element_id,
        data,
    };
    if path.iter().any(|f| f.same_as(&frame)) {
        let mut ids: Vec<Id> = path.iter().map(|f| f.element).collect();
        ids.push(element_id);
        return Err(ObjectError::CyclicReference { path: ids });
    }

    let element = codec.element(element_id)?;
    let constructor = codec.constructor_for(element)?;
    trace!(
        element = %element_id,
        constructor = constructor.name(),
        depth = path.len(),
        "constructing"
    );

    path.push(frame);
    let ctx = ConstructContext {
        codec,
        element,
        view: Layered::new(data.unwrap_or(&EMPTY_TREE), &element.data),
        data,
        path,
    };
    constructor.construct(&ctx)
}

/// Read the Element id out of an inline `{element, data}` reference.
fn inline_element_id(inline: &DataTree) -> Result<Id, ObjectError> {
    let value = inline
        .get(ELEMENT_KEY)
        .filter(|v| !v.is_null())
        .or_else(|| inline.get(LEGACY_ELEMENT_KEY))
        .filter(|v| !v.is_null())
        .ok_or_else(|| {
            ObjectError::InvalidReference(format!("inline reference has no '{ELEMENT_KEY}' field"))
        })?;
    parse_id(value)?.ok_or_else(|| {
        ObjectError::InvalidReference(format!(
            "'{ELEMENT_KEY}' must be an id or a name, found {}",
            value.kind()
        ))
    })
}

/// Read the optional `data` tree of an inline reference.
fn inline_data(inline: &DataTree) -> Result<Option<&DataTree>, ObjectError> {
    match inline.get(DATA_KEY) {
        None | Some(DataValue::Null) => Ok(None),
        Some(DataValue::Tree(tree)) => Ok(Some(tree)),
        Some(other) => Err(ObjectError::InvalidReference(format!(
            "'{DATA_KEY}' must be an object, found {}",
            other.kind()
        ))),
    }
}

// ---------------------------------------------------------------------------
// ConstructContext
// ---------------------------------------------------------------------------

/// What a Constructor sees while building one object: the current Element,
/// its instance data layered over its defaults, and the means to resolve
/// nested references.
#[derive(Debug)]
pub struct ConstructContext<'c> {
    codec: SerializeContext<'c>,
    element: &'c Element,
    view: Layered<'c>,
    data: Option<&'c DataTree>,
    path: Vec<Frame<'c>>,
}

impl<'c> ConstructContext<'c> {
    pub fn element_id(&self) -> Id {
        self.element.id
    }

    pub fn element(&self) -> &'c Element {
        self.element
    }

    /// The instance data overriding the Element defaults, if any.
    pub fn instance_data(&self) -> Option<&'c DataTree> {
        self.data
    }

    pub fn codec(&self) -> SerializeContext<'c> {
        self.codec
    }

    /// Number of enclosing objects under construction.
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    fn raw(&self, key: &str) -> Option<&'c DataValue> {
        self.view.get(key).filter(|v| !v.is_null())
    }

    fn missing(&self, key: &str) -> ObjectError {
        ObjectError::MissingField {
            element: self.element.id,
            key: key.to_string(),
        }
    }

    pub fn require_long(&self, key: &str) -> Result<i64, ObjectError> {
        self.long(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn require_double(&self, key: &str) -> Result<f64, ObjectError> {
        self.double(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn require_string(&self, key: &str) -> Result<&str, ObjectError> {
        self.string(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, ObjectError> {
        self.boolean(key)?.ok_or_else(|| self.missing(key))
    }

    /// Resolve the object reference at `key`, if there is one.
    pub fn object(&self, key: &str) -> Result<Option<Box<dyn RpgObject>>, ObjectError> {
        self.raw(key).map(|value| self.resolve(value)).transpose()
    }

    pub fn require_object(&self, key: &str) -> Result<Box<dyn RpgObject>, ObjectError> {
        self.object(key)?.ok_or_else(|| self.missing(key))
    }

    /// Resolve `key` as a list: an array yields its items, a single reference
    /// yields one item, an absent key yields nothing.
    pub fn objects(&self, key: &str) -> Result<Vec<Box<dyn RpgObject>>, ObjectError> {
        match self.raw(key) {
            None => Ok(Vec::new()),
            Some(DataValue::Array(items)) => items.iter().map(|item| self.resolve(item)).collect(),
            Some(value) => Ok(vec![self.resolve(value)?]),
        }
    }

    /// Resolve a value in reference position.
    pub fn resolve(&self, value: &'c DataValue) -> Result<Box<dyn RpgObject>, ObjectError> {
        match value {
            DataValue::Array(items) => {
                let array = items
                    .iter()
                    .map(|item| self.resolve(item))
                    .collect::<Result<ObjectArray, _>>()?;
                Ok(Box::new(array))
            }
            DataValue::Tree(inline) => {
                let id = inline_element_id(inline)?;
                self.build(id, inline_data(inline)?)
            }
            other => match parse_id(other)? {
                Some(id) => self.build(id, None),
                None => Err(ObjectError::InvalidReference(format!(
                    "expected an element id, name, object or array, found {}",
                    other.kind()
                ))),
            },
        }
    }

    fn build(&self, id: Id, data: Option<&'c DataTree>) -> Result<Box<dyn RpgObject>, ObjectError> {
        construct_in(self.codec, id, data, self.path.clone())
    }
}

impl DataHolder for ConstructContext<'_> {
    fn value(&self, key: &str) -> Option<&DataValue> {
        self.view.get(key)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&str, &DataValue)> + '_> {
        self.view.entries()
    }
}

// ---------------------------------------------------------------------------
// Deconstruction
// ---------------------------------------------------------------------------

/// What a Constructor sees while writing one object back.
pub struct DeconstructContext<'a> {
    object: &'a dyn RpgObject,
    data: DataBuilder<'a>,
}

impl<'a> DeconstructContext<'a> {
    pub fn object(&self) -> &'a dyn RpgObject {
        self.object
    }

    pub fn element_id(&self) -> Id {
        self.object.element_id()
    }

    /// The object as the concrete type the Constructor builds.
    pub fn object_as<T: RpgObject>(&self) -> Result<&'a T, ObjectError> {
        let object: &'a dyn RpgObject = self.object;
        object
            .downcast_ref::<T>()
            .ok_or(ObjectError::UnexpectedObject {
                element: object.element_id(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Where the object's durable fields are written.
    pub fn data(&mut self) -> &mut DataBuilder<'a> {
        &mut self.data
    }
}

/// Accumulates key/value pairs, deconstructing nested objects as it goes.
#[derive(Debug)]
pub struct DataBuilder<'a> {
    codec: SerializeContext<'a>,
    tree: DataTree,
}

impl<'a> DataBuilder<'a> {
    pub fn new(codec: SerializeContext<'a>) -> Self {
        Self {
            codec,
            tree: DataTree::new(),
        }
    }

    pub fn put_long(&mut self, key: &str, value: i64) -> &mut Self {
        self.put_value(key, value)
    }

    pub fn put_double(&mut self, key: &str, value: f64) -> &mut Self {
        self.put_value(key, value)
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.put_value(key, value.into())
    }

    pub fn put_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.put_value(key, value)
    }

    pub fn put_tree(&mut self, key: &str, value: DataTree) -> &mut Self {
        self.put_value(key, value)
    }

    pub fn put_value(&mut self, key: &str, value: impl Into<DataValue>) -> &mut Self {
        self.tree.insert(key, value);
        self
    }

    /// Write a nested object as `{element, data}`, or an array of those.
    pub fn put_object(&mut self, key: &str, object: &dyn RpgObject) -> Result<&mut Self, ObjectError> {
        let value = self.codec.deconstruct(object)?;
        Ok(self.put_value(key, value))
    }

    /// Write a list of objects as an array.
    pub fn put_objects<'o>(
        &mut self,
        key: &str,
        objects: impl IntoIterator<Item = &'o dyn RpgObject>,
    ) -> Result<&mut Self, ObjectError> {
        let items = objects
            .into_iter()
            .map(|object| self.codec.deconstruct(object))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.put_value(key, items))
    }

    pub fn finish(self) -> DataTree {
        self.tree
    }
}

// ===========================================================================
// Tests
// ===========================================================================
