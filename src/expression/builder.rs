//! Recursive builder turning wire nodes into expression trees.

use chrono::{FixedOffset, Offset, Utc};
use log::{debug, warn};

use crate::codec;
use crate::expression::error::{ExprError, ExprResult};
use crate::expression::expr::Expression;
use crate::expression::signature;
use crate::expression::wire::{ExprKind, WireExpr};
use crate::types::field_type::{flag, type_code};
use crate::types::time::{Duration, Time, MAX_FSP};
use crate::types::{FieldType, Value};

/// Maximum expression nesting depth accepted from the wire.
///
/// The wire format itself does not bound nesting; the builder does, so a
/// hostile fragment cannot exhaust the native call stack.
pub const MAX_EXPR_DEPTH: usize = 200;

/// Decode a batch of pushed-down expressions against a result schema.
///
/// Output order matches input order. The batch is all-or-nothing: the first
/// failing node aborts the whole decode and no partial results are returned.
pub fn build_exprs(
    nodes: &[WireExpr],
    schema: &[FieldType],
    tz: FixedOffset,
) -> ExprResult<Vec<Expression>> {
    debug!("decoding {} pushed-down expressions", nodes.len());
    nodes
        .iter()
        .map(|node| build_expr(node, schema, tz))
        .collect()
}

/// Decode one pushed-down expression against a result schema.
///
/// `tz` is the statement-scoped session timezone, used only when decoding
/// TIMESTAMP-kind time constants.
pub fn build_expr(node: &WireExpr, schema: &[FieldType], tz: FixedOffset) -> ExprResult<Expression> {
    ExprBuilder { schema, tz }.build(node, 0)
}

struct ExprBuilder<'a> {
    schema: &'a [FieldType],
    tz: FixedOffset,
}

impl ExprBuilder<'_> {
    fn build(&self, node: &WireExpr, depth: usize) -> ExprResult<Expression> {
        if depth >= MAX_EXPR_DEPTH {
            warn!("rejecting expression nested deeper than {} levels", MAX_EXPR_DEPTH);
            return Err(ExprError::TooDeep(MAX_EXPR_DEPTH));
        }
        match node.kind {
            ExprKind::ColumnRef => self.build_column_ref(node),
            ExprKind::Null => Ok(Expression::constant(
                Value::Null,
                FieldType::new(type_code::NULL),
            )),
            ExprKind::Int64 => convert_int(&node.val),
            ExprKind::Uint64 => convert_uint(&node.val),
            ExprKind::String => Ok(Expression::constant(
                Value::String(node.val.to_vec()),
                FieldType::new(type_code::VAR_STRING),
            )),
            ExprKind::Bytes => Ok(Expression::constant(
                Value::Bytes(node.val.to_vec()),
                FieldType::new(type_code::STRING),
            )),
            ExprKind::Float32 => convert_float(&node.val, true),
            ExprKind::Float64 => convert_float(&node.val, false),
            ExprKind::MysqlDecimal => convert_decimal(&node.val),
            ExprKind::MysqlDuration => convert_duration(&node.val),
            ExprKind::MysqlTime => self.convert_time(node),
            ExprKind::ScalarFunc => self.build_scalar_func(node, depth),
            // The wire contract guarantees that non-leaf nodes are scalar
            // functions; a bare value list here breaks the protocol.
            ExprKind::ValueList => Err(ExprError::StructuralViolation(ExprKind::ValueList)),
        }
    }

    fn build_column_ref(&self, node: &WireExpr) -> ExprResult<Expression> {
        let (offset, _) = codec::decode_int(&node.val)
            .map_err(|e| ExprError::decode("column offset", &node.val, e))?;
        let index = usize::try_from(offset)
            .ok()
            .filter(|&idx| idx < self.schema.len())
            .ok_or(ExprError::IndexOutOfRange {
                offset,
                schema_len: self.schema.len(),
            })?;
        Ok(Expression::column(index, self.schema[index].clone()))
    }

    fn build_scalar_func(&self, node: &WireExpr, depth: usize) -> ExprResult<Expression> {
        let mut args = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if child.kind == ExprKind::ValueList {
                let values = codec::decode_values(&child.val)
                    .map_err(|e| ExprError::decode("value list", &child.val, e))?;
                if values.is_empty() {
                    // An empty list is encoded as a FALSE constant argument
                    // by contract with the coordinator, so e.g. `IN ()`
                    // stays a well-formed function call.
                    args.push(Expression::constant(
                        Value::Int64(0),
                        FieldType::new(type_code::LONG_LONG),
                    ));
                } else {
                    args.extend(values.into_iter().map(|value| {
                        let ret_type = value.implied_field_type();
                        Expression::constant(value, ret_type)
                    }));
                }
                continue;
            }
            args.push(self.build(child, depth + 1)?);
        }

        let wire_type = node
            .field_type
            .as_ref()
            .ok_or(ExprError::MissingFieldType(ExprKind::ScalarFunc))?;
        let ret_type = FieldType::from_wire(wire_type)?;
        signature::dispatch(node.sig, ret_type, args)
    }

    fn convert_time(&self, node: &WireExpr) -> ExprResult<Expression> {
        let wire_type = node
            .field_type
            .as_ref()
            .ok_or(ExprError::MissingFieldType(ExprKind::MysqlTime))?;
        let ret_type = FieldType::from_wire(wire_type)?;

        let (packed, _) = codec::decode_uint(&node.val)
            .map_err(|e| ExprError::decode("time", &node.val, e))?;
        let mut time = Time::from_packed_u64(packed, ret_type.tp, ret_type.decimal as i8)
            .map_err(|e| ExprError::decode("time", &node.val, e))?;

        // Only zoned timestamps are shifted; DATETIME and DATE fields mean
        // the same thing in every session timezone.
        let utc = Utc.fix();
        if ret_type.tp == type_code::TIMESTAMP && self.tz != utc {
            time.convert_time_zone(utc, self.tz)
                .map_err(|e| ExprError::decode("time", &node.val, e))?;
        }
        Ok(Expression::constant(Value::Time(time), ret_type))
    }
}

fn convert_int(data: &[u8]) -> ExprResult<Expression> {
    let (v, _) = codec::decode_int(data).map_err(|e| ExprError::decode("int", data, e))?;
    Ok(Expression::constant(
        Value::Int64(v),
        FieldType::new(type_code::LONG_LONG),
    ))
}

fn convert_uint(data: &[u8]) -> ExprResult<Expression> {
    let (v, _) = codec::decode_uint(data).map_err(|e| ExprError::decode("uint", data, e))?;
    Ok(Expression::constant(
        Value::Uint64(v),
        FieldType::new(type_code::LONG_LONG).with_flag(flag::UNSIGNED),
    ))
}

fn convert_float(data: &[u8], narrow_to_f32: bool) -> ExprResult<Expression> {
    let (v, _) = codec::decode_float(data).map_err(|e| ExprError::decode("float", data, e))?;
    let value = if narrow_to_f32 {
        Value::Float32(v as f32)
    } else {
        Value::Float64(v)
    };
    Ok(Expression::constant(
        value,
        FieldType::new(type_code::DOUBLE),
    ))
}

fn convert_decimal(data: &[u8]) -> ExprResult<Expression> {
    let (dec, _) =
        codec::decode_decimal(data).map_err(|e| ExprError::decode("decimal", data, e))?;
    Ok(Expression::constant(
        Value::Decimal(dec),
        FieldType::new(type_code::NEW_DECIMAL),
    ))
}

fn convert_duration(data: &[u8]) -> ExprResult<Expression> {
    let (nanos, _) =
        codec::decode_int(data).map_err(|e| ExprError::decode("duration", data, e))?;
    Ok(Expression::constant(
        Value::Duration(Duration::new(nanos, MAX_FSP)),
        FieldType::new(type_code::DURATION),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::expression::expr::Constant;
    use crate::expression::signature::{FuncKind, ScalarFuncSig};
    use crate::types::field_type::WireFieldType;
    use crate::types::Decimal;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn expect_constant(expr: Expression) -> Constant {
        match expr {
            Expression::Constant(constant) => constant,
            other => panic!("expected a constant, got {:?}", other),
        }
    }

    #[test]
    fn test_null_leaf() {
        let expr = build_expr(&WireExpr::null(), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::Null);
        assert_eq!(constant.ret_type.tp, type_code::NULL);
    }

    #[test]
    fn test_int_leaf() {
        let expr = build_expr(&WireExpr::int64(-42), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::Int64(-42));
        assert_eq!(constant.ret_type.tp, type_code::LONG_LONG);
        assert!(!constant.ret_type.is_unsigned());
    }

    #[test]
    fn test_uint_leaf_is_flagged_unsigned() {
        let expr = build_expr(&WireExpr::uint64(7), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::Uint64(7));
        assert!(constant.ret_type.is_unsigned());
    }

    #[test]
    fn test_string_and_bytes_leaves() {
        let expr = build_expr(&WireExpr::string("abc"), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::String(b"abc".to_vec()));
        assert_eq!(constant.ret_type.tp, type_code::VAR_STRING);

        let expr = build_expr(&WireExpr::bytes(b"\x00\x01"), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::Bytes(vec![0, 1]));
        assert_eq!(constant.ret_type.tp, type_code::STRING);
    }

    #[test]
    fn test_float32_is_narrowed() {
        let expr = build_expr(&WireExpr::float32(2.5), &[], utc()).unwrap();
        assert_eq!(expect_constant(expr).value, Value::Float32(2.5));

        let expr = build_expr(&WireExpr::float64(2.5), &[], utc()).unwrap();
        assert_eq!(expect_constant(expr).value, Value::Float64(2.5));
    }

    #[test]
    fn test_decimal_leaf() {
        let dec = Decimal::new(-12345, 7, 2);
        let expr = build_expr(&WireExpr::decimal(&dec), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(constant.value, Value::Decimal(dec));
        assert_eq!(constant.ret_type.tp, type_code::NEW_DECIMAL);
    }

    #[test]
    fn test_duration_leaf() {
        let expr = build_expr(&WireExpr::duration(1_000_000_000), &[], utc()).unwrap();
        let constant = expect_constant(expr);
        assert_eq!(
            constant.value,
            Value::Duration(Duration::new(1_000_000_000, MAX_FSP))
        );
        assert_eq!(constant.ret_type.tp, type_code::DURATION);
    }

    #[test]
    fn test_truncated_leaf_payload_fails() {
        let mut node = WireExpr::int64(1);
        node.val = node.val.slice(0..4);
        let err = build_expr(&node, &[], utc()).unwrap_err();
        match err {
            ExprError::Decode { kind, source, .. } => {
                assert_eq!(kind, "int");
                assert_eq!(source, CodecError::Eof { need: 8, have: 4 });
            }
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_column_ref_resolves_schema_type() {
        let schema = vec![
            FieldType::new(type_code::LONG_LONG),
            FieldType::new(type_code::VAR_STRING),
            FieldType::new(type_code::NEW_DECIMAL),
        ];
        let expr = build_expr(&WireExpr::column_ref(2), &schema, utc()).unwrap();
        match expr {
            Expression::ColumnRef(col) => {
                assert_eq!(col.index, 2);
                assert_eq!(col.ret_type.tp, type_code::NEW_DECIMAL);
            }
            other => panic!("expected a column ref, got {:?}", other),
        }
    }

    #[test]
    fn test_column_ref_out_of_range() {
        let schema = vec![FieldType::new(type_code::LONG_LONG)];
        for offset in [1i64, -1] {
            let err = build_expr(&WireExpr::column_ref(offset), &schema, utc()).unwrap_err();
            match err {
                ExprError::IndexOutOfRange {
                    offset: reported,
                    schema_len,
                } => {
                    assert_eq!(reported, offset);
                    assert_eq!(schema_len, 1);
                }
                other => panic!("expected IndexOutOfRange, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_scalar_func_with_nested_children() {
        // lt_int(plus_int(2, 3), 7)
        let plus = WireExpr::scalar_func(
            ScalarFuncSig::PlusInt.code(),
            vec![WireExpr::int64(2), WireExpr::int64(3)],
            WireFieldType::new(type_code::LONG_LONG),
        );
        let lt = WireExpr::scalar_func(
            ScalarFuncSig::LtInt.code(),
            vec![plus, WireExpr::int64(7)],
            WireExpr::bool_field_type(),
        );
        let expr = build_expr(&lt, &[], utc()).unwrap();
        match expr {
            Expression::FunctionCall(func) => {
                assert_eq!(func.op(), FuncKind::Lt);
                assert_eq!(func.args().len(), 2);
                match &func.args()[0] {
                    Expression::FunctionCall(inner) => {
                        assert_eq!(inner.sig(), ScalarFuncSig::PlusInt)
                    }
                    other => panic!("expected a nested call, got {:?}", other),
                }
            }
            other => panic!("expected a function call, got {:?}", other),
        }
    }

    #[test]
    fn test_value_list_is_spliced_into_args() {
        let list =
            WireExpr::value_list(&[Value::Int64(2), Value::Int64(3), Value::Null]).unwrap();
        let node = WireExpr::scalar_func(
            ScalarFuncSig::InInt.code(),
            vec![WireExpr::int64(1), list],
            WireExpr::bool_field_type(),
        );
        let expr = build_expr(&node, &[], utc()).unwrap();
        match expr {
            Expression::FunctionCall(func) => {
                // Flattened in place: probe value plus three list elements.
                assert_eq!(func.args().len(), 4);
                assert_eq!(
                    expect_constant(func.args()[3].clone()).value,
                    Value::Null
                );
            }
            other => panic!("expected a function call, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_value_list_becomes_false_argument() {
        let node = WireExpr::scalar_func(
            ScalarFuncSig::InInt.code(),
            vec![WireExpr::int64(1), WireExpr::value_list(&[]).unwrap()],
            WireExpr::bool_field_type(),
        );
        let expr = build_expr(&node, &[], utc()).unwrap();
        match expr {
            Expression::FunctionCall(func) => {
                assert_eq!(func.sig(), ScalarFuncSig::InInt);
                assert_eq!(func.args().len(), 2);
                let falsy = expect_constant(func.args()[1].clone());
                assert_eq!(falsy.value, Value::Int64(0));
                assert_eq!(falsy.ret_type.tp, type_code::LONG_LONG);
            }
            other => panic!("expected a function call, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_value_list_is_a_structural_violation() {
        let node = WireExpr::value_list(&[Value::Int64(1)]).unwrap();
        let err = build_expr(&node, &[], utc()).unwrap_err();
        assert!(matches!(
            err,
            ExprError::StructuralViolation(ExprKind::ValueList)
        ));
    }

    #[test]
    fn test_unknown_signature_fails_whole_tree() {
        let inner = WireExpr::scalar_func(
            9999,
            vec![WireExpr::int64(1)],
            WireExpr::bool_field_type(),
        );
        let node = WireExpr::scalar_func(
            ScalarFuncSig::LogicalAnd.code(),
            vec![inner, WireExpr::int64(1)],
            WireExpr::bool_field_type(),
        );
        let err = build_expr(&node, &[], utc()).unwrap_err();
        assert!(matches!(err, ExprError::FunctionNotExists(9999)));
    }

    #[test]
    fn test_missing_field_type_is_an_error() {
        let mut node = WireExpr::scalar_func(
            ScalarFuncSig::LtInt.code(),
            vec![WireExpr::int64(1), WireExpr::int64(2)],
            WireExpr::bool_field_type(),
        );
        node.field_type = None;
        let err = build_expr(&node, &[], utc()).unwrap_err();
        assert!(matches!(
            err,
            ExprError::MissingFieldType(ExprKind::ScalarFunc)
        ));
    }

    #[test]
    fn test_unresolved_collation_fails_decode() {
        let node = WireExpr::scalar_func(
            ScalarFuncSig::LtString.code(),
            vec![WireExpr::string("a"), WireExpr::string("b")],
            WireFieldType::new(type_code::LONG_LONG).with_collation(999),
        );
        let err = build_expr(&node, &[], utc()).unwrap_err();
        assert!(matches!(err, ExprError::UnresolvedCollation(_)));
    }

    #[test]
    fn test_nesting_deeper_than_limit_is_rejected() {
        let mut node = WireExpr::int64(1);
        for _ in 0..=MAX_EXPR_DEPTH {
            node = WireExpr::scalar_func(
                ScalarFuncSig::UnaryNotInt.code(),
                vec![node],
                WireExpr::bool_field_type(),
            );
        }
        let err = build_expr(&node, &[], utc()).unwrap_err();
        assert!(matches!(err, ExprError::TooDeep(MAX_EXPR_DEPTH)));
    }

    #[test]
    fn test_timestamp_is_shifted_into_session_timezone() {
        let time = Time {
            year: 2024,
            month: 3,
            day: 10,
            hour: 12,
            minute: 0,
            second: 0,
            microsecond: 0,
            tp: type_code::TIMESTAMP,
            fsp: 0,
        };
        let wire_type = WireFieldType::new(type_code::TIMESTAMP).with_decimal(0);
        let node = WireExpr::time(&time, wire_type);

        let session = FixedOffset::east_opt(8 * 3600).unwrap();
        let expr = build_expr(&node, &[], session).unwrap();
        match expect_constant(expr).value {
            Value::Time(decoded) => {
                assert_eq!(decoded.hour, 20);
                assert_eq!(decoded.day, 10);
            }
            other => panic!("expected a time value, got {:?}", other),
        }
    }

    #[test]
    fn test_datetime_is_never_shifted() {
        let time = Time {
            year: 2024,
            month: 3,
            day: 10,
            hour: 12,
            minute: 0,
            second: 0,
            microsecond: 0,
            tp: type_code::DATETIME,
            fsp: 0,
        };
        let wire_type = WireFieldType::new(type_code::DATETIME).with_decimal(0);
        let node = WireExpr::time(&time, wire_type);

        let session = FixedOffset::east_opt(8 * 3600).unwrap();
        let expr = build_expr(&node, &[], session).unwrap();
        match expect_constant(expr).value {
            Value::Time(decoded) => assert_eq!(decoded.hour, 12),
            other => panic!("expected a time value, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_decode_is_all_or_nothing() {
        let schema = vec![FieldType::new(type_code::LONG_LONG)];
        let nodes = vec![
            WireExpr::int64(1),
            WireExpr::column_ref(5), // out of range
            WireExpr::int64(3),
        ];
        assert!(build_exprs(&nodes, &schema, utc()).is_err());

        let good = vec![WireExpr::int64(1), WireExpr::column_ref(0)];
        let exprs = build_exprs(&good, &schema, utc()).unwrap();
        assert_eq!(exprs.len(), 2);
    }
}
