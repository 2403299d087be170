//! # Value Codec
//!
//! Converts between [`BusValue`] and [`serde_json::Value`].
//!
//! | Bus type                         | JSON                         |
//! |----------------------------------|------------------------------|
//! | none                             | null                         |
//! | boolean                          | boolean                      |
//! | char, byte, int8..int64          | integer                      |
//! | uint8..uint64                    | integer                      |
//! | single, double                   | real                         |
//! | string                           | string                       |
//! | datetime                         | `YYYY-MM-DDTHH:MM:SS±HH:MM`  |
//! | bytes                            | array of integers 0-255      |
//! | object                           | object, recursively          |
//!
//! Encoding never fails. Decoding is lossy: JSON carries no width or
//! signedness, so integers come back as `Int64` (or `UInt64` above
//! `i64::MAX`) and reals as `Double`. Clients only ever see plain numbers.

use bus_types::{BusDateTime, BusObject, BusValue};
use serde_json::{Map, Number, Value};

/// Longest datetime text we emit. Anything longer means corrupt fields.
pub const MAX_DATETIME_LEN: usize = 31;

/// Decoding failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid value: {0} is not convertible")]
    Unsupported(&'static str),

    #[error("invalid value: byte array element {index} is not an integer")]
    NonIntegerElement { index: usize },
}

/// Encode a bus value.
#[must_use]
pub fn to_json(value: &BusValue) -> Value {
    match value {
        BusValue::None => Value::Null,
        BusValue::Boolean(b) => Value::Bool(*b),
        BusValue::Char(v) | BusValue::Int8(v) => Value::from(*v),
        BusValue::Byte(v) | BusValue::UInt8(v) => Value::from(*v),
        BusValue::Int16(v) => Value::from(*v),
        BusValue::Int32(v) => Value::from(*v),
        BusValue::Int64(v) => Value::from(*v),
        BusValue::UInt16(v) => Value::from(*v),
        BusValue::UInt32(v) => Value::from(*v),
        BusValue::UInt64(v) => Value::from(*v),
        BusValue::Single(v) => real(f64::from(*v)),
        BusValue::Double(v) => real(*v),
        BusValue::String(s) => Value::String(s.clone()),
        BusValue::DateTime(dt) => format_datetime(dt).map_or(Value::Null, Value::String),
        BusValue::Bytes(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        BusValue::Object(obj) => object_to_json(obj),
    }
}

// NaN and infinities have no JSON form.
fn real(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Encode an object. Properties missing a name or a value are dropped.
#[must_use]
pub fn object_to_json(obj: &BusObject) -> Value {
    let map: Map<String, Value> = obj
        .properties
        .iter()
        .filter_map(|p| p.entry())
        .map(|(name, value)| (name.to_string(), to_json(value)))
        .collect();
    Value::Object(map)
}

/// `YYYY-MM-DDTHH:MM:SS±HH:MM`, or `None` when the fields would not fit in
/// [`MAX_DATETIME_LEN`] characters.
#[must_use]
pub fn format_datetime(dt: &BusDateTime) -> Option<String> {
    let sign = if dt.tz.west { '-' } else { '+' };
    let text = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{:02}:{:02}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second, sign, dt.tz.hours, dt.tz.minutes
    );
    (text.len() <= MAX_DATETIME_LEN).then_some(text)
}

/// Decode a JSON value.
///
/// Arrays are byte sequences: every element must be an integer, and each is
/// truncated to its low 8 bits. Object members that fail to decode are left
/// out of the result instead of failing the whole object.
pub fn from_json(value: &Value) -> Result<BusValue, CodecError> {
    match value {
        Value::Null => Err(CodecError::Unsupported("null")),
        Value::Bool(b) => Ok(BusValue::Boolean(*b)),
        Value::Number(n) => number(n),
        Value::String(s) => Ok(BusValue::String(s.clone())),
        Value::Array(items) => bytes(items).map(BusValue::Bytes),
        Value::Object(map) => Ok(BusValue::Object(object(map))),
    }
}

fn number(n: &Number) -> Result<BusValue, CodecError> {
    if let Some(i) = n.as_i64() {
        Ok(BusValue::Int64(i))
    } else if let Some(u) = n.as_u64() {
        Ok(BusValue::UInt64(u))
    } else {
        n.as_f64()
            .map(BusValue::Double)
            .ok_or(CodecError::Unsupported("number"))
    }
}

fn bytes(items: &[Value]) -> Result<Vec<u8>, CodecError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_i64()
                .map(|v| v as u8)
                .or_else(|| item.as_u64().map(|v| v as u8))
                .ok_or(CodecError::NonIntegerElement { index })
        })
        .collect()
}

fn object(map: &Map<String, Value>) -> BusObject {
    let mut obj = BusObject::new();
    for (key, raw) in map {
        if let Ok(value) = from_json(raw) {
            obj.set(key.as_str(), value);
        }
    }
    obj
}
