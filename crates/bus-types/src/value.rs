//! # Bus Values
//!
//! The tagged union every data point and event payload is expressed in.

use serde::{Deserialize, Serialize};

use crate::datetime::BusDateTime;

/// Type tag of a [`BusValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    None,
    Boolean,
    Char,
    Byte,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    String,
    DateTime,
    Bytes,
    Object,
}

/// A typed bus value.
///
/// Width and signedness are part of the variant. Composite values nest
/// through [`BusObject`], which may itself contain objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BusValue {
    #[default]
    None,
    Boolean(bool),
    /// Signed 8-bit character cell.
    Char(i8),
    Byte(u8),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Single(f32),
    Double(f64),
    String(String),
    DateTime(BusDateTime),
    Bytes(Vec<u8>),
    Object(BusObject),
}

impl BusValue {
    /// The active type tag.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Char(_) => ValueType::Char,
            Self::Byte(_) => ValueType::Byte,
            Self::Int8(_) => ValueType::Int8,
            Self::Int16(_) => ValueType::Int16,
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::UInt8(_) => ValueType::UInt8,
            Self::UInt16(_) => ValueType::UInt16,
            Self::UInt32(_) => ValueType::UInt32,
            Self::UInt64(_) => ValueType::UInt64,
            Self::Single(_) => ValueType::Single,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Bytes(_) => ValueType::Bytes,
            Self::Object(_) => ValueType::Object,
        }
    }

    /// Widen any signed integer variant (including char) to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Char(v) | Self::Int8(v) => Some(i64::from(v)),
            Self::Int16(v) => Some(i64::from(v)),
            Self::Int32(v) => Some(i64::from(v)),
            Self::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Widen any unsigned integer variant (including byte) to `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Byte(v) | Self::UInt8(v) => Some(u64::from(v)),
            Self::UInt16(v) => Some(u64::from(v)),
            Self::UInt32(v) => Some(u64::from(v)),
            Self::UInt64(v) => Some(v),
            _ => None,
        }
    }

    /// Widen either floating point variant to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Single(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&BusObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for BusValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for BusValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for BusValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u32> for BusValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<u64> for BusValue {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<f64> for BusValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for BusValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for BusValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<BusDateTime> for BusValue {
    fn from(v: BusDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<u8>> for BusValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<BusObject> for BusValue {
    fn from(v: BusObject) -> Self {
        Self::Object(v)
    }
}

/// A named slot inside a [`BusObject`].
///
/// Both halves are optional because the bus can hand back properties that
/// were never fully populated. Consumers skip such properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Property {
    pub name: Option<String>,
    pub value: Option<BusValue>,
}

impl Property {
    /// A fully populated property.
    pub fn new(name: impl Into<String>, value: impl Into<BusValue>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }

    /// Name and value, if both are present.
    #[must_use]
    pub fn entry(&self) -> Option<(&str, &BusValue)> {
        match (&self.name, &self.value) {
            (Some(name), Some(value)) => Some((name.as_str(), value)),
            _ => None,
        }
    }
}

/// Ordered collection of properties.
///
/// Insertion order is preserved; setting an existing name replaces its value
/// in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BusObject {
    pub name: Option<String>,
    pub properties: Vec<Property>,
}

impl BusObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            properties: Vec::new(),
        }
    }

    /// Builder-style [`BusObject::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<BusValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, replacing the value of an existing one of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<BusValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.as_deref() == Some(name.as_str()))
        {
            Some(existing) => existing.value = Some(value),
            None => self.properties.push(Property {
                name: Some(name),
                value: Some(value),
            }),
        }
    }

    /// Value of the first property with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BusValue> {
        self.properties
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .and_then(|p| p.value.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
