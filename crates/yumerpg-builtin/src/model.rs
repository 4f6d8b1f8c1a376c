//! Game models: characters, items, map tiles.
//!
//! A model carries `meta` (scalar descriptive data such as a display name)
//! and a list of `abilities`, the components that give it behaviour and
//! mutable state. Mutable per-character values belong in property
//! abilities, not in `meta`.

use crate::property::{PropertyComponent, PropertyValue};
use crate::range::RangePropertyComponent;
use std::any::Any;
use yumerpg_core::constructor::Constructor;
use yumerpg_core::context::{ConstructContext, DeconstructContext};
use yumerpg_core::data::{DataHolder, DataTree, DataValue};
use yumerpg_core::error::ObjectError;
use yumerpg_core::id::Id;
use yumerpg_core::object::{ObjectArray, RpgObject, eq_by_downcast};

const META: &str = "meta";
const ABILITIES: &str = "abilities";

#[derive(Debug, PartialEq)]
pub struct RpgModel {
    pub element_id: Id,
    pub meta: DataTree,
    pub abilities: ObjectArray,
}

impl RpgModel {
    pub fn meta_value(&self, key: &str) -> Option<&DataValue> {
        self.meta.get(key)
    }

    /// The first ability of type `T`.
    pub fn ability<T: RpgObject>(&self) -> Option<&T> {
        self.abilities.iter_of::<T>().next()
    }

    pub fn ability_mut<T: RpgObject>(&mut self) -> Option<&mut T> {
        self.abilities.iter_of_mut::<T>().next()
    }

    pub fn abilities_of<T: RpgObject>(&self) -> impl Iterator<Item = &T> {
        self.abilities.iter_of::<T>()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyComponent> {
        self.abilities_of::<PropertyComponent>().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyComponent> {
        self.abilities
            .iter_of_mut::<PropertyComponent>()
            .find(|p| p.name == name)
    }

    pub fn property_value(&self, name: &str) -> Option<&PropertyValue> {
        self.property(name).map(PropertyComponent::value)
    }

    pub fn range_property(&self, name: &str) -> Option<&RangePropertyComponent> {
        self.abilities_of::<RangePropertyComponent>().find(|p| p.name == name)
    }

    pub fn range_property_mut(&mut self, name: &str) -> Option<&mut RangePropertyComponent> {
        self.abilities
            .iter_of_mut::<RangePropertyComponent>()
            .find(|p| p.name == name)
    }
}

impl RpgObject for RpgModel {
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

pub struct RpgModelConstructor;

impl Constructor for RpgModelConstructor {
    fn name(&self) -> &str {
        "RpgModel"
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        // Non-scalar meta entries are dropped.
        let meta = ctx
            .sub_data(META)?
            .map(|tree| {
                tree.iter()
                    .filter(|(_, value)| value.is_scalar())
                    .map(|(key, value)| (key, value.clone()))
                    .collect::<DataTree>()
            })
            .unwrap_or_default();
        Ok(Box::new(RpgModel {
            element_id: ctx.element_id(),
            meta,
            abilities: ctx.objects(ABILITIES)?.into(),
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let model = ctx.object_as::<RpgModel>()?;
        let data = ctx.data();
        data.put_tree(META, model.meta.clone());
        data.put_objects(ABILITIES, model.abilities.iter())?;
        Ok(())
    }
}
