//! Runtime scalar values carried by decoded constants.

use std::fmt;

use crate::types::decimal::Decimal;
use crate::types::field_type::{flag, type_code, FieldType};
use crate::types::time::{Duration, Time};

/// A decoded scalar value.
///
/// `String` and `Bytes` both hold raw bytes; the former participates in
/// string-typed (collated) comparisons while the latter is plain binary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(Vec<u8>),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Duration(Duration),
    Time(Time),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type descriptor implied by the value itself, used for constants
    /// whose wire node carries no explicit descriptor (e.g. value-list
    /// elements).
    pub fn implied_field_type(&self) -> FieldType {
        match self {
            Value::Null => FieldType::new(type_code::NULL),
            Value::Int64(_) => FieldType::new(type_code::LONG_LONG),
            Value::Uint64(_) => {
                FieldType::new(type_code::LONG_LONG).with_flag(flag::UNSIGNED)
            }
            Value::Float32(_) | Value::Float64(_) => FieldType::new(type_code::DOUBLE),
            Value::String(_) => FieldType::new(type_code::VAR_STRING),
            Value::Bytes(_) => FieldType::new(type_code::STRING),
            Value::Decimal(_) => FieldType::new(type_code::NEW_DECIMAL),
            Value::Duration(_) => FieldType::new(type_code::DURATION),
            Value::Time(time) => FieldType::new(time.tp),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) | Value::Bytes(v) => {
                write!(f, "{}", String::from_utf8_lossy(v))
            }
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Duration(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
        }
    }
}
