//! Typed scalar properties, such as a character's display name or level.
//!
//! Declared with a `type` of `long` (alias `int`), `double` (alias `number`),
//! `string` or `boolean`, a `name`, an optional `alias` and an optional
//! initial `value`. Only `value` is saved.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use yumerpg_core::constructor::Constructor;
use yumerpg_core::context::{ConstructContext, DeconstructContext};
use yumerpg_core::data::{DataHolder, DataValue};
use yumerpg_core::error::ObjectError;
use yumerpg_core::id::Id;
use yumerpg_core::object::{RpgObject, eq_by_downcast};

pub(crate) const TYPE: &str = "type";
pub(crate) const NAME: &str = "name";
pub(crate) const ALIAS: &str = "alias";
pub(crate) const VALUE: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Long,
    Double,
    String,
    Boolean,
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" | "int" => Ok(PropertyType::Long),
            "double" | "number" => Ok(PropertyType::Double),
            "string" => Ok(PropertyType::String),
            "boolean" => Ok(PropertyType::Boolean),
            other => Err(format!("unsupported property type '{other}'")),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyType::Long => "long",
            PropertyType::Double => "double",
            PropertyType::String => "string",
            PropertyType::Boolean => "boolean",
        })
    }
}

/// Read the declared `type` field, failing on anything unsupported.
pub(crate) fn declared_type(ctx: &ConstructContext<'_>) -> Result<PropertyType, ObjectError> {
    ctx.require_string(TYPE)?
        .parse()
        .map_err(|reason| ObjectError::InvalidData {
            element: ctx.element_id(),
            key: TYPE.to_string(),
            reason,
        })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Long(i64),
    Double(f64),
    String(String),
    Boolean(bool),
}

impl PropertyValue {
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Long(_) => PropertyType::Long,
            PropertyValue::Double(_) => PropertyType::Double,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Boolean(_) => PropertyType::Boolean,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Longs widen to doubles.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            PropertyValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<PropertyValue> for DataValue {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Long(v) => DataValue::Long(v),
            PropertyValue::Double(v) => DataValue::Double(v),
            PropertyValue::String(v) => DataValue::String(v),
            PropertyValue::Boolean(v) => DataValue::Bool(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("property '{name}' holds a {expected}, cannot assign a {found}")]
    TypeMismatch {
        name: String,
        expected: PropertyType,
        found: PropertyType,
    },
}

// ---------------------------------------------------------------------------
// PropertyComponent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyComponent {
    pub element_id: Id,
    pub name: String,
    pub alias: Option<String>,
    value: PropertyValue,
}

impl PropertyComponent {
    pub fn new(element_id: Id, name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            element_id,
            name: name.into(),
            alias: None,
            value,
        }
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    /// Replace the value, keeping the declared type. A long may be assigned
    /// to a double property. Returns the previous value.
    pub fn set(&mut self, value: impl Into<PropertyValue>) -> Result<PropertyValue, PropertyError> {
        let value = match (self.property_type(), value.into()) {
            (PropertyType::Double, PropertyValue::Long(v)) => PropertyValue::Double(v as f64),
            (expected, value) if expected == value.property_type() => value,
            (expected, value) => {
                return Err(PropertyError::TypeMismatch {
                    name: self.name.clone(),
                    expected,
                    found: value.property_type(),
                });
            }
        };
        Ok(std::mem::replace(&mut self.value, value))
    }
}

impl RpgObject for PropertyComponent {
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

pub struct PropertyComponentConstructor;

impl Constructor for PropertyComponentConstructor {
    fn name(&self) -> &str {
        "PropertyComponent"
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        let value = match declared_type(ctx)? {
            PropertyType::Long => PropertyValue::Long(ctx.long(VALUE)?.unwrap_or(0)),
            PropertyType::Double => PropertyValue::Double(ctx.double(VALUE)?.unwrap_or(0.0)),
            PropertyType::String => {
                PropertyValue::String(ctx.string(VALUE)?.unwrap_or_default().to_string())
            }
            PropertyType::Boolean => PropertyValue::Boolean(ctx.boolean(VALUE)?.unwrap_or(false)),
        };
        Ok(Box::new(PropertyComponent {
            element_id: ctx.element_id(),
            name: ctx.require_string(NAME)?.to_string(),
            alias: ctx.string(ALIAS)?.map(str::to_string),
            value,
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let property = ctx.object_as::<PropertyComponent>()?;
        ctx.data().put_value(VALUE, property.value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::registries_for;
    use yumerpg_core::context::SerializeContext;
    use yumerpg_core::element::Element;
    use yumerpg_core::test_utils::tree;

    fn declare(data: &[(&str, DataValue)]) -> Element {
        let constructor = PropertyComponentConstructor.id().unwrap();
        Element::new(Id(100), constructor, tree(data))
    }

    #[test]
    fn type_names_and_aliases() {
        assert_eq!("int".parse::<PropertyType>().unwrap(), PropertyType::Long);
        assert_eq!("number".parse::<PropertyType>().unwrap(), PropertyType::Double);
        assert_eq!("boolean".parse::<PropertyType>().unwrap(), PropertyType::Boolean);
        assert!("float".parse::<PropertyType>().is_err());
    }

    #[test]
    fn zero_defaults_per_type() {
        for (ty, expected) in [
            ("long", PropertyValue::Long(0)),
            ("double", PropertyValue::Double(0.0)),
            ("string", PropertyValue::String(String::new())),
            ("boolean", PropertyValue::Boolean(false)),
        ] {
            let element = declare(&[("type", ty.into()), ("name", "p".into())]);
            let (elements, constructors) = registries_for(vec![element]);
            let codec = SerializeContext::new(&elements, &constructors);
            let object = codec.construct(Id(100), None).unwrap();
            let property = object.downcast_ref::<PropertyComponent>().unwrap();
            assert_eq!(property.value(), &expected, "{ty}");
            assert_eq!(property.alias, None);
        }
    }

    #[test]
    fn declared_and_saved_values() {
        let element = declare(&[
            ("type", "string".into()),
            ("name", "title".into()),
            ("alias", "Title".into()),
            ("value", "Novice".into()),
        ]);
        let (elements, constructors) = registries_for(vec![element]);
        let codec = SerializeContext::new(&elements, &constructors);

        let fresh = codec.construct(Id(100), None).unwrap();
        let fresh = fresh.downcast_ref::<PropertyComponent>().unwrap();
        assert_eq!(fresh.value().as_str(), Some("Novice"));
        assert_eq!(fresh.alias.as_deref(), Some("Title"));

        let saved = tree(&[("value", "Hero".into())]);
        let loaded = codec.construct(Id(100), Some(&saved)).unwrap();
        let loaded = loaded.downcast_ref::<PropertyComponent>().unwrap();
        assert_eq!(loaded.value().as_str(), Some("Hero"));
    }

    #[test]
    fn unsupported_type_is_invalid_data() {
        let element = declare(&[("type", "vector".into()), ("name", "p".into())]);
        let (elements, constructors) = registries_for(vec![element]);
        let codec = SerializeContext::new(&elements, &constructors);
        let err = codec.construct(Id(100), None).err().unwrap();
        assert!(matches!(err, ObjectError::InvalidData { ref key, .. } if key == "type"));
    }

    #[test]
    fn set_keeps_the_declared_type() {
        let mut property = PropertyComponent::new(Id(1), "hp", PropertyValue::Double(1.0));
        assert_eq!(property.set(5).unwrap(), PropertyValue::Double(1.0));
        assert_eq!(property.value(), &PropertyValue::Double(5.0));
        let err = property.set("five").unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                name: "hp".to_string(),
                expected: PropertyType::Double,
                found: PropertyType::String,
            }
        );
    }

    #[test]
    fn only_value_is_saved() {
        let element = declare(&[("type", "long".into()), ("name", "level".into())]);
        let (elements, constructors) = registries_for(vec![element]);
        let codec = SerializeContext::new(&elements, &constructors);
        let mut object = codec.construct(Id(100), None).unwrap();
        object.downcast_mut::<PropertyComponent>().unwrap().set(7).unwrap();
        let data = codec.deconstruct_data(object.as_ref()).unwrap();
        assert_eq!(data, tree(&[("value", 7.into())]));
    }
}
