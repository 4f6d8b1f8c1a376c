//! Shared test fixtures for unit tests, integration tests and downstream
//! crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::constructor::{Constructor, ConstructorRegistry};
use crate::context::{ConstructContext, DATA_KEY, DeconstructContext, ELEMENT_KEY};
use crate::data::{DataHolder, DataTree, DataValue};
use crate::element::{Element, ElementArray, ElementRegistry};
use crate::error::ObjectError;
use crate::id::{Id, NameError};
use crate::object::{ObjectArray, RpgObject, eq_by_downcast};
use std::any::Any;

// ===========================================================================
// Data helpers
// ===========================================================================

pub fn tree(pairs: &[(&str, DataValue)]) -> DataTree {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

/// An inline `{element, data}` reference.
pub fn inline(element: Id, data: &[(&str, DataValue)]) -> DataValue {
    inline_with_data(element, DataValue::Tree(tree(data)))
}

pub fn inline_with_data(element: Id, data: DataValue) -> DataValue {
    let mut reference = DataTree::new();
    reference.insert(ELEMENT_KEY, element.0);
    reference.insert(DATA_KEY, data);
    DataValue::Tree(reference)
}

// ===========================================================================
// Ability / model fixtures
// ===========================================================================

pub const DEFAULT_ABILITY_VALUE: i64 = 10;

pub fn ability_id() -> Id {
    Id(1)
}
pub fn model_id() -> Id {
    Id(2)
}
pub fn ability_constructor_id() -> Id {
    Id(1)
}
pub fn model_constructor_id() -> Id {
    Id(2)
}

/// The declarations of the reference scenario, as JSON.
pub const SCENARIO_DECLARATIONS: &str = r#"[
    {"id": 1, "constructor": 1, "data": {"name": "TestAbility"}},
    {"id": 2, "constructor": 2, "data": {"name": "TestRpgModel", "abilities": [1]}}
]"#;

/// A save of one model holding two abilities with values 1 and 2.
pub const SCENARIO_INSTANCES: &str = r#"[{"element":2,"data":{"abilities":[{"element":1,"data":{"value":1}},{"element":1,"data":{"value":2}}]}}]"#;

#[derive(Debug, Clone, PartialEq)]
pub struct TestAbility {
    pub element_id: Id,
    pub name: String,
    pub value: i64,
}

impl RpgObject for TestAbility {
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

/// Reads `name` (required) and `value` (default 10); saves only `value`.
pub struct TestAbilityConstructor;

impl Constructor for TestAbilityConstructor {
    fn name(&self) -> &str {
        "TestAbility"
    }

    fn id(&self) -> Result<Id, NameError> {
        Ok(ability_constructor_id())
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        Ok(Box::new(TestAbility {
            element_id: ctx.element_id(),
            name: ctx.require_string("name")?.to_string(),
            value: ctx.long("value")?.unwrap_or(DEFAULT_ABILITY_VALUE),
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let ability = ctx.object_as::<TestAbility>()?;
        ctx.data().put_long("value", ability.value);
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
pub struct TestModel {
    pub element_id: Id,
    pub name: String,
    pub abilities: ObjectArray,
}

impl RpgObject for TestModel {
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

/// Reads `name` (required) and `abilities` (references); saves `abilities`.
pub struct TestModelConstructor;

impl Constructor for TestModelConstructor {
    fn name(&self) -> &str {
        "TestRpgModel"
    }

    fn id(&self) -> Result<Id, NameError> {
        Ok(model_constructor_id())
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        Ok(Box::new(TestModel {
            element_id: ctx.element_id(),
            name: ctx.require_string("name")?.to_string(),
            abilities: ctx.objects("abilities")?.into(),
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let model = ctx.object_as::<TestModel>()?;
        ctx.data().put_objects("abilities", model.abilities.iter())?;
        Ok(())
    }
}

pub fn register_test_constructors(constructors: &mut ConstructorRegistry) {
    for result in [
        constructors.register(TestAbilityConstructor),
        constructors.register(TestModelConstructor),
        constructors.register(LinkConstructor),
    ] {
        if let Err(err) = result {
            panic!("test constructor rejected: {err}");
        }
    }
}

pub fn scenario_elements() -> ElementArray {
    vec![
        Element::new(
            ability_id(),
            ability_constructor_id(),
            tree(&[("name", "TestAbility".into())]),
        ),
        Element::new(
            model_id(),
            model_constructor_id(),
            tree(&[
                ("name", "TestRpgModel".into()),
                ("abilities", DataValue::Array(vec![ability_id().0.into()])),
            ]),
        ),
    ]
    .into()
}

pub fn scenario_registries() -> (ElementRegistry, ConstructorRegistry) {
    let mut elements = ElementRegistry::new();
    let mut constructors = ConstructorRegistry::new();
    register_test_constructors(&mut constructors);
    elements.register_all(scenario_elements());
    (elements, constructors)
}

// ===========================================================================
// Linked-list fixtures
// ===========================================================================

/// A node pointing at an optional `next` object.
#[derive(Debug, PartialEq)]
pub struct Link {
    pub element_id: Id,
    pub next: Option<Box<dyn RpgObject>>,
}

impl RpgObject for Link {
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

pub struct LinkConstructor;

impl Constructor for LinkConstructor {
    fn name(&self) -> &str {
        "Link"
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        Ok(Box::new(Link {
            element_id: ctx.element_id(),
            next: ctx.object("next")?,
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let link = ctx.object_as::<Link>()?;
        if let Some(next) = &link.next {
            ctx.data().put_object("next", next.as_ref())?;
        }
        Ok(())
    }
}

pub fn link_constructor_id() -> Id {
    match LinkConstructor.id() {
        Ok(id) => id,
        Err(err) => panic!("link constructor name rejected: {err}"),
    }
}

/// Registries holding one Link Element per `(id, next)` pair.
pub fn link_registries(links: &[(i64, Option<i64>)]) -> (ElementRegistry, ConstructorRegistry) {
    let mut elements = ElementRegistry::new();
    let mut constructors = ConstructorRegistry::new();
    register_test_constructors(&mut constructors);
    for (id, next) in links {
        let data = match next {
            Some(next) => tree(&[("next", DataValue::from(*next))]),
            None => DataTree::new(),
        };
        elements.register(Element::new(Id(*id), link_constructor_id(), data));
    }
    (elements, constructors)
}

/// Number of Links in a chain starting at `object`.
pub fn link_depth(object: &dyn RpgObject) -> usize {
    match object.downcast_ref::<Link>() {
        Some(link) => 1 + link.next.as_deref().map_or(0, link_depth),
        None => 0,
    }
}
