//! Bounded properties, such as HP or MP.
//!
//! The value always stays within `[minValue, maxValue]`. Any ordered type
//! works: numbers, strings (lexicographic) and booleans (`false < true`).
//! Value and both bounds are saved, since gameplay may move the bounds too.

use crate::property::{ALIAS, NAME, PropertyType, VALUE, declared_type};
use std::any::Any;
use yumerpg_core::constructor::Constructor;
use yumerpg_core::context::{ConstructContext, DeconstructContext};
use yumerpg_core::data::DataHolder;
use yumerpg_core::error::ObjectError;
use yumerpg_core::id::Id;
use yumerpg_core::object::{RpgObject, eq_by_downcast};

const MAX_VALUE: &str = "maxValue";
const MIN_VALUE: &str = "minValue";

/// A value clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeProperty<T> {
    value: T,
    min: T,
    max: T,
}

impl<T: PartialOrd + Clone> RangeProperty<T> {
    /// Returns `None` when `min > max`. The initial value is clamped.
    pub fn new(value: T, min: T, max: T) -> Option<Self> {
        if min > max {
            return None;
        }
        let mut range = Self {
            value: min.clone(),
            min,
            max,
        };
        range.set(value);
        Some(range)
    }

    pub fn value(&self) -> T {
        self.value.clone()
    }

    pub fn min(&self) -> T {
        self.min.clone()
    }

    pub fn max(&self) -> T {
        self.max.clone()
    }

    /// Assign, clamping into the bounds. Returns the stored value.
    pub fn set(&mut self, value: T) -> T {
        self.value = if value > self.max {
            self.max.clone()
        } else if value < self.min {
            self.min.clone()
        } else {
            value
        };
        self.value.clone()
    }

    /// Move the upper bound, never below the lower one, and re-clamp.
    pub fn set_max(&mut self, max: T) {
        self.max = if max < self.min { self.min.clone() } else { max };
        self.set(self.value.clone());
    }

    /// Move the lower bound, never above the upper one, and re-clamp.
    pub fn set_min(&mut self, min: T) {
        self.min = if min > self.max { self.max.clone() } else { min };
        self.set(self.value.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Long(RangeProperty<i64>),
    Double(RangeProperty<f64>),
    String(RangeProperty<String>),
    Boolean(RangeProperty<bool>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangePropertyComponent {
    pub element_id: Id,
    pub name: String,
    pub alias: Option<String>,
    pub range: RangeValue,
}

impl RangePropertyComponent {
    pub fn long(&self) -> Option<&RangeProperty<i64>> {
        match &self.range {
            RangeValue::Long(range) => Some(range),
            _ => None,
        }
    }

    pub fn long_mut(&mut self) -> Option<&mut RangeProperty<i64>> {
        match &mut self.range {
            RangeValue::Long(range) => Some(range),
            _ => None,
        }
    }

    pub fn double(&self) -> Option<&RangeProperty<f64>> {
        match &self.range {
            RangeValue::Double(range) => Some(range),
            _ => None,
        }
    }

    pub fn double_mut(&mut self) -> Option<&mut RangeProperty<f64>> {
        match &mut self.range {
            RangeValue::Double(range) => Some(range),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&RangeProperty<String>> {
        match &self.range {
            RangeValue::String(range) => Some(range),
            _ => None,
        }
    }

    pub fn string_mut(&mut self) -> Option<&mut RangeProperty<String>> {
        match &mut self.range {
            RangeValue::String(range) => Some(range),
            _ => None,
        }
    }

    pub fn boolean(&self) -> Option<&RangeProperty<bool>> {
        match &self.range {
            RangeValue::Boolean(range) => Some(range),
            _ => None,
        }
    }

    pub fn boolean_mut(&mut self) -> Option<&mut RangeProperty<bool>> {
        match &mut self.range {
            RangeValue::Boolean(range) => Some(range),
            _ => None,
        }
    }
}

impl RpgObject for RangePropertyComponent {
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

pub struct RangePropertyComponentConstructor;

fn bounds_error(ctx: &ConstructContext<'_>) -> ObjectError {
    ObjectError::InvalidData {
        element: ctx.element_id(),
        key: MIN_VALUE.to_string(),
        reason: format!("'{MIN_VALUE}' is greater than '{MAX_VALUE}'"),
    }
}

impl Constructor for RangePropertyComponentConstructor {
    fn name(&self) -> &str {
        "RangePropertyComponent"
    }

    fn construct(&self, ctx: &ConstructContext<'_>) -> Result<Box<dyn RpgObject>, ObjectError> {
        let range = match declared_type(ctx)? {
            PropertyType::Long => {
                let max = ctx.require_long(MAX_VALUE)?;
                let min = ctx.require_long(MIN_VALUE)?;
                let value = ctx.long(VALUE)?.unwrap_or(max);
                RangeValue::Long(RangeProperty::new(value, min, max).ok_or_else(|| bounds_error(ctx))?)
            }
            PropertyType::Double => {
                let max = ctx.require_double(MAX_VALUE)?;
                let min = ctx.require_double(MIN_VALUE)?;
                let value = ctx.double(VALUE)?.unwrap_or(max);
                RangeValue::Double(RangeProperty::new(value, min, max).ok_or_else(|| bounds_error(ctx))?)
            }
            PropertyType::String => {
                let max = ctx.require_string(MAX_VALUE)?.to_string();
                let min = ctx.require_string(MIN_VALUE)?.to_string();
                let value = ctx.string(VALUE)?.map_or_else(|| max.clone(), str::to_string);
                RangeValue::String(RangeProperty::new(value, min, max).ok_or_else(|| bounds_error(ctx))?)
            }
            PropertyType::Boolean => {
                let max = ctx.require_bool(MAX_VALUE)?;
                let min = ctx.require_bool(MIN_VALUE)?;
                let value = ctx.boolean(VALUE)?.unwrap_or(max);
                RangeValue::Boolean(RangeProperty::new(value, min, max).ok_or_else(|| bounds_error(ctx))?)
            }
        };
        Ok(Box::new(RangePropertyComponent {
            element_id: ctx.element_id(),
            name: ctx.require_string(NAME)?.to_string(),
            alias: ctx.string(ALIAS)?.map(str::to_string),
            range,
        }))
    }

    fn deconstruct(&self, ctx: &mut DeconstructContext<'_>) -> Result<(), ObjectError> {
        let component = ctx.object_as::<RangePropertyComponent>()?;
        let data = ctx.data();
        match &component.range {
            RangeValue::Long(range) => {
                data.put_long(VALUE, range.value())
                    .put_long(MAX_VALUE, range.max())
                    .put_long(MIN_VALUE, range.min());
            }
            RangeValue::Double(range) => {
                data.put_double(VALUE, range.value())
                    .put_double(MAX_VALUE, range.max())
                    .put_double(MIN_VALUE, range.min());
            }
            RangeValue::String(range) => {
                data.put_string(VALUE, range.value())
                    .put_string(MAX_VALUE, range.max())
                    .put_string(MIN_VALUE, range.min());
            }
            RangeValue::Boolean(range) => {
                data.put_bool(VALUE, range.value())
                    .put_bool(MAX_VALUE, range.max())
                    .put_bool(MIN_VALUE, range.min());
            }
        }
        Ok(())
    }
}
