//! Builtin Constructors for Yumerpg.
//!
//! Ready-made object kinds most RPGs need, built on `yumerpg-core`:
//!
//! - [`property::PropertyComponent`] -- a typed scalar (level, title).
//! - [`range::RangePropertyComponent`] -- a clamped, ordered value (HP, MP, rank).
//! - [`effect::PropertyChangeComponent`] -- a scripted change to a property,
//!   declared once and never saved.
//! - [`model::RpgModel`] -- descriptive `meta` plus a list of abilities, with
//!   lookups by ability type and property name.
//!
//! Register them all with [`register_builtins`]; declarations then refer to
//! the Constructors by name (`"constructor": "RangePropertyComponent"`).

pub mod effect;
pub mod model;
pub mod property;
pub mod range;

use tracing::debug;
use yumerpg_core::constructor::ConstructorRegistry;
use yumerpg_core::id::NameError;

/// Register every builtin Constructor under its name hash.
pub fn register_builtins(constructors: &mut ConstructorRegistry) -> Result<(), NameError> {
    constructors.register(property::PropertyComponentConstructor)?;
    constructors.register(range::RangePropertyComponentConstructor)?;
    constructors.register(effect::PropertyChangeComponentConstructor)?;
    constructors.register(model::RpgModelConstructor)?;
    debug!(total = constructors.len(), "builtin constructors registered");
    Ok(())
}
