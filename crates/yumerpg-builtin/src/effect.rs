//! Property change effects, e.g. a potion that restores HP.
//!
//! The effect names the property it changes and carries a script expression
//! computing the new value. Both come from the declaration and never change,
//! so nothing is saved.

use std::any::Any;
use yumerpg_core::constructor::Constructor;
use yumerpg_core::context::ConstructContext;
use yumerpg_core::error::ObjectError;
use yumerpg_core::id::Id;
use yumerpg_core::object::{RpgObject, eq_by_downcast};

const CHANGED_PROPERTY: &str = "changedProperty";
const SCRIPT: &str = "script";

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChangeComponent {
    pub element_id: Id,
    pub changed_property: String,
    /// Evaluated by the embedding game's script engine.
    pub script: String,
}

impl PropertyChangeComponent {
    /// Key identifying this effect among a model's components.
    pub fn identify(&self) -> String {
        format!("PropertyChange-{}", self.changed_property)
    }
}

impl RpgObject for PropertyChangeComponent {
    fn element_id(&self) -> Id {
        self.element_id
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn dyn_eq(&self, other: &dyn RpgObject) -> bool {
        eq_by_downcast(self, other)
    }
}

pub struct PropertyChangeComponentConstructor;

impl Constructor for PropertyChangeComponentConstructor {
    fn name(&self) -> &str {
        "PropertyChangeComponent"
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        Ok(Box::new(PropertyChangeComponent {
            element_id: ctx.element_id(),
            changed_property: ctx.require_string(CHANGED_PROPERTY)?.to_string(),
            script: ctx.require_string(SCRIPT)?.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::registries_for;
    use yumerpg_core::context::SerializeContext;
    use yumerpg_core::data::DataTree;
    use yumerpg_core::element::Element;
    use yumerpg_core::test_utils::tree;

    fn potion() -> Element {
        Element::new(
            Id(30),
            PropertyChangeComponentConstructor.id().unwrap(),
            tree(&[
                ("changedProperty", "hp".into()),
                ("script", "target.hp + 50".into()),
            ]),
        )
    }

    #[test]
    fn builds_from_declaration() {
        let (elements, constructors) = registries_for(vec![potion()]);
        let codec = SerializeContext::new(&elements, &constructors);
        let object = codec.construct(Id(30), None).unwrap();
        let effect = object.downcast_ref::<PropertyChangeComponent>().unwrap();
        assert_eq!(effect.changed_property, "hp");
        assert_eq!(effect.identify(), "PropertyChange-hp");
    }

    #[test]
    fn nothing_is_saved_and_defaults_restore_it() {
        let (elements, constructors) = registries_for(vec![potion()]);
        let codec = SerializeContext::new(&elements, &constructors);
        let object = codec.construct(Id(30), None).unwrap();
        let data = codec.deconstruct_data(object.as_ref()).unwrap();
        assert_eq!(data, DataTree::new());
        let rebuilt = codec.reconstruct(object.as_ref()).unwrap();
        assert!(rebuilt.dyn_eq(object.as_ref()));
    }

    #[test]
    fn script_is_required() {
        let element = Element::new(
            Id(30),
            PropertyChangeComponentConstructor.id().unwrap(),
            tree(&[("changedProperty", "hp".into())]),
        );
        let (elements, constructors) = registries_for(vec![element]);
        let codec = SerializeContext::new(&elements, &constructors);
        let err = codec.construct(Id(30), None).err().unwrap();
        assert!(matches!(err, ObjectError::MissingField { ref key, .. } if key == "script"));
    }
}
