//! Constructors: the factories that turn Element data into objects and
//! objects back into data.
//!
//! A Constructor is stateless and may serve many Elements; what differs
//! between those Elements is their default data. Constructors are looked up by
//! [`Id`], normally the hash of [`Constructor::name`].

use crate::context::{ConstructContext, DeconstructContext};
use crate::error::ObjectError;
use crate::id::{Id, NameError};
use crate::object::RpgObject;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Builds objects for one or more Elements and writes them back.
pub trait Constructor: Send + Sync {
    /// The registration name, hashed into the default [`id`](Constructor::id).
    fn name(&self) -> &str;

    /// Override to pin a literal id instead of the name hash.
    fn id(&self) -> Result<Id, NameError> {
        Id::from_name(self.name())
    }

    /// Build an object from the layered instance/default data in `ctx`.
    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError>;

    /// Write the durable state of `ctx.object()`. The default writes nothing,
    /// which is right for objects whose fields all come from the Element.
    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let _ = ctx;
        Ok(())
    }
}

/// Constructors by id.
#[derive(Default)]
pub struct ConstructorRegistry {
    constructors: HashMap<Id, Box<dyn Constructor>>,
}

impl ConstructorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Constructor under its id. A later registration under the
    /// same id replaces the earlier one.
    pub fn register(&mut self, constructor: impl Constructor + 'static) -> Result<Id, NameError> {
        self.register_boxed(Box::new(constructor))
    }

    pub fn register_boxed(&mut self, constructor: Box<dyn Constructor>) -> Result<Id, NameError> {
        let id = constructor.id()?;
        let name = constructor.name().to_string();
        if self.constructors.insert(id, constructor).is_some() {
            warn!(constructor = %id, %name, "constructor re-registered, previous one replaced");
        } else {
            debug!(constructor = %id, %name, "constructor registered");
        }
        Ok(id)
    }

    /// Look up a Constructor. `element` is the Element that asked for it and
    /// only feeds the error.
    pub fn get(&self, id: Id, element: Id) -> Result<&dyn Constructor, ObjectError> {
        self.constructors
            .get(&id)
            .map(|c| c.as_ref())
            .ok_or(ObjectError::UnknownConstructor {
                element,
                constructor: id,
            })
    }

    pub fn get_or_none(&self, id: Id) -> Option<&dyn Constructor> {
        self.constructors.get(&id).map(|c| c.as_ref())
    }

    pub fn contains(&self, id: Id) -> bool {
        self.constructors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for ConstructorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.constructors.iter().map(|(id, c)| (id, c.name())))
            .finish()
    }
}
