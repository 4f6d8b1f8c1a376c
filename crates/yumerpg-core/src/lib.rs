//! Yumerpg Core -- declarative object construction and serialization for RPG
//! runtimes.
//!
//! Designers declare reusable templates ("Elements") in data files. The
//! runtime builds live, mutable objects from them, overlaying per-save data on
//! the template defaults, and writes objects back so that reloading
//! reproduces the same state.
//!
//! # Pipeline
//!
//! 1. **Declare** -- Decode declaration documents into [`element::Element`]s
//!    and register them in an [`element::ElementRegistry`].
//! 2. **Register** -- Register the [`constructor::Constructor`]s that know how
//!    to build each kind of object.
//! 3. **Construct** -- Decode an instance document through a
//!    [`context::SerializeContext`]; object references are resolved
//!    recursively against the registries.
//! 4. **Deconstruct** -- Write objects back as `{element, data}` trees.
//!
//! ```rust,ignore
//! let mut elements = ElementRegistry::new();
//! elements.register_all(json::decode_elements(declarations)?);
//! let mut constructors = ConstructorRegistry::new();
//! constructors.register(MyConstructor)?;
//!
//! let codec = SerializeContext::new(&elements, &constructors);
//! let save = json::decode_objects(codec, save_text)?;
//! let text = json::encode_objects(codec, save.as_ref())?;
//! ```
//!
//! # Key Types
//!
//! - [`id::Id`] -- 64-bit identifier; names hash to ids with a fixed,
//!   save-compatible algorithm.
//! - [`data::DataHolder`] -- Typed read access to decoded data, layerable over
//!   a fallback with [`data::Layered`].
//! - [`object::RpgObject`] -- A constructed object, downcast to its concrete
//!   type; [`object::ObjectArray`] holds ordered lists of them.
//! - [`context::ConstructContext`] / [`context::DeconstructContext`] -- What a
//!   Constructor sees in each direction.

pub mod constructor;
pub mod context;
pub mod data;
pub mod document;
pub mod element;
pub mod error;
pub mod format;
pub mod id;
pub mod json;
pub mod object;
pub mod options;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
