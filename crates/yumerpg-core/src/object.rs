//! Live objects built from Elements.
//!
//! The set of object kinds is open: every Constructor brings its own concrete
//! type. They all implement [`RpgObject`], and callers recover the concrete
//! type with a checked downcast through [`as_any`](RpgObject::as_any). The one
//! kind the core itself knows about is [`ObjectArray`], exposed through the
//! [`as_array`](RpgObject::as_array) capability query.

use crate::id::Id;
use std::any::Any;
use std::fmt;

/// An instantiated, possibly mutable game object.
pub trait RpgObject: Any + fmt::Debug + Send + Sync {
    /// The Element this object was built from, or [`Id::UNKNOWN`].
    fn element_id(&self) -> Id;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn as_array(&self) -> Option<&ObjectArray> {
        None
    }

    fn as_array_mut(&mut self) -> Option<&mut ObjectArray> {
        None
    }

    /// Structural equality against another object of any kind. Objects that
    /// don't override this compare unequal to everything.
    fn dyn_eq(&self, other: &dyn RpgObject) -> bool {
        let _ = other;
        false
    }
}

impl dyn RpgObject {
    pub fn downcast_ref<T: RpgObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: RpgObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: RpgObject>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl PartialEq for dyn RpgObject {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

/// [`RpgObject::dyn_eq`] for types with a `PartialEq` impl.
pub fn eq_by_downcast<T: RpgObject + PartialEq>(this: &T, other: &dyn RpgObject) -> bool {
    other.as_any().downcast_ref::<T>().is_some_and(|o| o == this)
}

// ---------------------------------------------------------------------------
// ObjectArray
// ---------------------------------------------------------------------------

/// An ordered, heterogeneous sequence of objects.
#[derive(Default)]
pub struct ObjectArray {
    items: Vec<Box<dyn RpgObject>>,
}

impl ObjectArray {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_vec(items: Vec<Box<dyn RpgObject>>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, object: Box<dyn RpgObject>) {
        self.items.push(object);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn RpgObject> {
        self.items.get(index).map(|o| o.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn RpgObject + 'static)> {
        self.items.get_mut(index).map(|o| o.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn RpgObject> {
        self.items.iter().map(|o| o.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn RpgObject>> {
        self.items.iter_mut()
    }

    /// Items of concrete type `T`, in order, skipping the rest.
    pub fn iter_of<T: RpgObject>(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|o| o.as_any().downcast_ref::<T>())
    }

    pub fn iter_of_mut<T: RpgObject>(&mut self) -> impl Iterator<Item = &mut T> {
        self.items
            .iter_mut()
            .filter_map(|o| o.as_any_mut().downcast_mut::<T>())
    }

    pub fn into_vec(self) -> Vec<Box<dyn RpgObject>> {
        self.items
    }
}

impl RpgObject for ObjectArray {
    fn element_id(&self) -> Id {
        Id::UNKNOWN
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_array(&self) -> Option<&ObjectArray> {
        Some(self)
    }

    fn as_array_mut(&mut self) -> Option<&mut ObjectArray> {
        Some(self)
    }

    fn dyn_eq(&self, other: &dyn RpgObject) -> bool {
        other.as_array().is_some_and(|o| o == self)
    }
}

impl PartialEq for ObjectArray {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.dyn_eq(b.as_ref()))
    }
}

impl fmt::Debug for ObjectArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl fmt::Display for ObjectArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{item:?}")?;
        }
        f.write_str("]")
    }
}

impl From<Vec<Box<dyn RpgObject>>> for ObjectArray {
    fn from(items: Vec<Box<dyn RpgObject>>) -> Self {
        Self::from_vec(items)
    }
}

impl FromIterator<Box<dyn RpgObject>> for ObjectArray {
    fn from_iter<I: IntoIterator<Item = Box<dyn RpgObject>>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl IntoIterator for ObjectArray {
    type Item = Box<dyn RpgObject>;
    type IntoIter = std::vec::IntoIter<Box<dyn RpgObject>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
