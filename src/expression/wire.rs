//! Wire representation of pushed-down expression nodes.

use bytes::Bytes;

use crate::codec;
use crate::types::field_type::{type_code, WireFieldType};
use crate::types::time::Time;
use crate::types::{Decimal, Value};

/// Node kind tags of the wire expression tree.
///
/// The discriminants are the wire codes; they are grouped by category the
/// same way the coordinator groups them (plain scalars low, MySQL-specific
/// scalars at 102+, structural kinds above).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ExprKind {
    Null = 0,
    Int64 = 1,
    Uint64 = 2,
    Float32 = 3,
    Float64 = 4,
    String = 5,
    Bytes = 6,
    MysqlDecimal = 102,
    MysqlDuration = 103,
    MysqlTime = 104,
    ValueList = 151,
    ColumnRef = 201,
    ScalarFunc = 10000,
}

impl ExprKind {
    /// Map a wire tag to its kind, if known.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ExprKind::Null),
            1 => Some(ExprKind::Int64),
            2 => Some(ExprKind::Uint64),
            3 => Some(ExprKind::Float32),
            4 => Some(ExprKind::Float64),
            5 => Some(ExprKind::String),
            6 => Some(ExprKind::Bytes),
            102 => Some(ExprKind::MysqlDecimal),
            103 => Some(ExprKind::MysqlDuration),
            104 => Some(ExprKind::MysqlTime),
            151 => Some(ExprKind::ValueList),
            201 => Some(ExprKind::ColumnRef),
            10000 => Some(ExprKind::ScalarFunc),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// One node of the expression tree as pushed down by the coordinator.
///
/// `val` is an opaque payload whose meaning depends on `kind`; `children`
/// is non-empty only for [`ExprKind::ScalarFunc`] nodes, which also carry a
/// signature code and a result type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct WireExpr {
    pub kind: ExprKind,
    pub val: Bytes,
    pub children: Vec<WireExpr>,
    pub sig: u32,
    pub field_type: Option<WireFieldType>,
}

impl WireExpr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            val: Bytes::new(),
            children: Vec::new(),
            sig: 0,
            field_type: None,
        }
    }

    fn with_val(kind: ExprKind, val: Vec<u8>) -> Self {
        Self {
            val: Bytes::from(val),
            ..Self::new(kind)
        }
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Null)
    }

    pub fn int64(v: i64) -> Self {
        let mut buf = Vec::new();
        codec::encode_int(&mut buf, v);
        Self::with_val(ExprKind::Int64, buf)
    }

    pub fn uint64(v: u64) -> Self {
        let mut buf = Vec::new();
        codec::encode_uint(&mut buf, v);
        Self::with_val(ExprKind::Uint64, buf)
    }

    pub fn float32(v: f32) -> Self {
        let mut buf = Vec::new();
        codec::encode_float(&mut buf, f64::from(v));
        Self::with_val(ExprKind::Float32, buf)
    }

    pub fn float64(v: f64) -> Self {
        let mut buf = Vec::new();
        codec::encode_float(&mut buf, v);
        Self::with_val(ExprKind::Float64, buf)
    }

    pub fn string(v: impl AsRef<[u8]>) -> Self {
        Self::with_val(ExprKind::String, v.as_ref().to_vec())
    }

    pub fn bytes(v: impl AsRef<[u8]>) -> Self {
        Self::with_val(ExprKind::Bytes, v.as_ref().to_vec())
    }

    pub fn column_ref(offset: i64) -> Self {
        let mut buf = Vec::new();
        codec::encode_int(&mut buf, offset);
        Self::with_val(ExprKind::ColumnRef, buf)
    }

    pub fn decimal(dec: &Decimal) -> Self {
        let mut buf = Vec::new();
        codec::encode_decimal(&mut buf, dec);
        Self::with_val(ExprKind::MysqlDecimal, buf)
    }

    pub fn duration(nanos: i64) -> Self {
        let mut buf = Vec::new();
        codec::encode_int(&mut buf, nanos);
        Self::with_val(ExprKind::MysqlDuration, buf)
    }

    pub fn time(time: &Time, field_type: WireFieldType) -> Self {
        let mut buf = Vec::new();
        codec::encode_uint(&mut buf, time.to_packed_u64());
        Self {
            field_type: Some(field_type),
            ..Self::with_val(ExprKind::MysqlTime, buf)
        }
    }

    /// A value-list node holding the given values in the self-describing
    /// encoding. Fails only for values the value codec cannot carry.
    pub fn value_list(values: &[Value]) -> Result<Self, codec::CodecError> {
        let mut buf = Vec::new();
        for v in values {
            codec::encode_value(&mut buf, v)?;
        }
        Ok(Self::with_val(ExprKind::ValueList, buf))
    }

    pub fn scalar_func(sig: u32, children: Vec<WireExpr>, field_type: WireFieldType) -> Self {
        Self {
            children,
            sig,
            field_type: Some(field_type),
            ..Self::new(ExprKind::ScalarFunc)
        }
    }

    /// The result descriptor most comparison and logical functions carry:
    /// a boolean encoded as a signed integer.
    pub fn bool_field_type() -> WireFieldType {
        WireFieldType::new(type_code::LONG_LONG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in [
            ExprKind::Null,
            ExprKind::Int64,
            ExprKind::Uint64,
            ExprKind::Float32,
            ExprKind::Float64,
            ExprKind::String,
            ExprKind::Bytes,
            ExprKind::MysqlDecimal,
            ExprKind::MysqlDuration,
            ExprKind::MysqlTime,
            ExprKind::ValueList,
            ExprKind::ColumnRef,
            ExprKind::ScalarFunc,
        ] {
            assert_eq!(ExprKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ExprKind::from_code(7), None);
        assert_eq!(ExprKind::from_code(9999), None);
    }

    #[test]
    fn test_leaf_constructors_fill_payloads() {
        assert_eq!(WireExpr::int64(5).val.len(), 8);
        assert_eq!(WireExpr::null().val.len(), 0);
        assert_eq!(WireExpr::string("abc").val.as_ref(), b"abc");

        let func = WireExpr::scalar_func(
            100,
            vec![WireExpr::int64(1), WireExpr::int64(2)],
            WireExpr::bool_field_type(),
        );
        assert_eq!(func.children.len(), 2);
        assert!(func.field_type.is_some());
    }
}
