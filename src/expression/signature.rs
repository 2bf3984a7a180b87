//! Scalar function signatures and the dispatch table.
//!
//! Every function the coordinator may push down is identified by a wire
//! signature code selecting one type-specialized implementation. The static
//! [`SIG_TABLE`] is the single source of truth: one row per supported code,
//! mapping it to its operator family, operand specialization and display
//! name. Codes are grouped in per-family numeric ranges (comparisons 1xx,
//! arithmetic 2xx, unary and null checks 3xxx, set/control flow 4xxx).

use crate::expression::error::{ExprError, ExprResult};
use crate::expression::expr::{Expression, FuncCallBase, ScalarFunction};
use crate::types::FieldType;

/// Wire signature codes accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ScalarFuncSig {
    LtInt = 100,
    LtReal = 101,
    LtDecimal = 102,
    LtString = 103,
    LtTime = 104,
    LtDuration = 105,
    LeInt = 110,
    LeReal = 111,
    LeDecimal = 112,
    LeString = 113,
    LeTime = 114,
    LeDuration = 115,
    GtInt = 120,
    GtReal = 121,
    GtDecimal = 122,
    GtString = 123,
    GtTime = 124,
    GtDuration = 125,
    GeInt = 130,
    GeReal = 131,
    GeDecimal = 132,
    GeString = 133,
    GeTime = 134,
    GeDuration = 135,
    EqInt = 140,
    EqReal = 141,
    EqDecimal = 142,
    EqString = 143,
    EqTime = 144,
    EqDuration = 145,
    NeInt = 150,
    NeReal = 151,
    NeDecimal = 152,
    NeString = 153,
    NeTime = 154,
    NeDuration = 155,
    PlusReal = 200,
    PlusDecimal = 201,
    PlusInt = 203,
    MinusReal = 204,
    MinusDecimal = 205,
    MinusInt = 207,
    MultiplyReal = 208,
    MultiplyDecimal = 209,
    MultiplyInt = 210,
    DivideReal = 211,
    DivideDecimal = 212,
    MultiplyIntUnsigned = 216,
    UnaryNotInt = 3001,
    UnaryNotDecimal = 3002,
    UnaryNotReal = 3003,
    UnaryMinusInt = 3004,
    UnaryMinusReal = 3005,
    UnaryMinusDecimal = 3006,
    DecimalIsNull = 3011,
    DurationIsNull = 3012,
    RealIsNull = 3013,
    StringIsNull = 3014,
    TimeIsNull = 3015,
    IntIsNull = 3016,
    LogicalAnd = 3101,
    LogicalOr = 3102,
    InInt = 4001,
    InReal = 4002,
    InDecimal = 4003,
    InString = 4004,
    InTime = 4005,
    InDuration = 4006,
    IfNullInt = 4101,
    IfNullReal = 4102,
    IfNullDecimal = 4103,
    IfNullString = 4104,
    IfNullTime = 4105,
    IfNullDuration = 4106,
    IfInt = 4107,
    IfReal = 4108,
    IfDecimal = 4109,
    IfString = 4110,
    IfTime = 4111,
    IfDuration = 4112,
    Length = 4201,
    Strcmp = 4202,
    GetVar = 4301,
    SetVar = 4302,
}

impl ScalarFuncSig {
    /// Map a wire code to its signature, if the dispatcher supports it.
    pub fn from_code(code: u32) -> Option<Self> {
        SigSpec::lookup(code).map(|spec| spec.sig)
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Operator family of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncKind {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Plus,
    Minus,
    Multiply,
    Divide,
    LogicalAnd,
    LogicalOr,
    UnaryNot,
    UnaryMinus,
    IsNull,
    In,
    IfNull,
    If,
    Length,
    Strcmp,
    GetVar,
    SetVar,
}

impl FuncKind {
    /// Get the display string for this operator family.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuncKind::Lt => "<",
            FuncKind::Le => "<=",
            FuncKind::Gt => ">",
            FuncKind::Ge => ">=",
            FuncKind::Eq => "=",
            FuncKind::Ne => "<>",
            FuncKind::Plus => "+",
            FuncKind::Minus => "-",
            FuncKind::Multiply => "*",
            FuncKind::Divide => "/",
            FuncKind::LogicalAnd => "AND",
            FuncKind::LogicalOr => "OR",
            FuncKind::UnaryNot => "NOT",
            FuncKind::UnaryMinus => "unary -",
            FuncKind::IsNull => "IS NULL",
            FuncKind::In => "IN",
            FuncKind::IfNull => "IFNULL",
            FuncKind::If => "IF",
            FuncKind::Length => "LENGTH",
            FuncKind::Strcmp => "STRCMP",
            FuncKind::GetVar => "GET_VAR",
            FuncKind::SetVar => "SET_VAR",
        }
    }
}

/// Argument-type specialization of a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalType {
    Int,
    Real,
    Decimal,
    String,
    Time,
    Duration,
}

/// One row of the dispatch table.
#[derive(Debug, PartialEq, Eq)]
pub struct SigSpec {
    pub sig: ScalarFuncSig,
    pub op: FuncKind,
    pub operand: EvalType,
    pub name: &'static str,
}

const fn row(
    sig: ScalarFuncSig,
    op: FuncKind,
    operand: EvalType,
    name: &'static str,
) -> SigSpec {
    SigSpec {
        sig,
        op,
        operand,
        name,
    }
}

use EvalType as T;
use FuncKind as F;
use ScalarFuncSig as S;

/// The dispatch table, sorted by wire code.
static SIG_TABLE: &[SigSpec] = &[
    row(S::LtInt, F::Lt, T::Int, "lt_int"),
    row(S::LtReal, F::Lt, T::Real, "lt_real"),
    row(S::LtDecimal, F::Lt, T::Decimal, "lt_decimal"),
    row(S::LtString, F::Lt, T::String, "lt_string"),
    row(S::LtTime, F::Lt, T::Time, "lt_time"),
    row(S::LtDuration, F::Lt, T::Duration, "lt_duration"),
    row(S::LeInt, F::Le, T::Int, "le_int"),
    row(S::LeReal, F::Le, T::Real, "le_real"),
    row(S::LeDecimal, F::Le, T::Decimal, "le_decimal"),
    row(S::LeString, F::Le, T::String, "le_string"),
    row(S::LeTime, F::Le, T::Time, "le_time"),
    row(S::LeDuration, F::Le, T::Duration, "le_duration"),
    row(S::GtInt, F::Gt, T::Int, "gt_int"),
    row(S::GtReal, F::Gt, T::Real, "gt_real"),
    row(S::GtDecimal, F::Gt, T::Decimal, "gt_decimal"),
    row(S::GtString, F::Gt, T::String, "gt_string"),
    row(S::GtTime, F::Gt, T::Time, "gt_time"),
    row(S::GtDuration, F::Gt, T::Duration, "gt_duration"),
    row(S::GeInt, F::Ge, T::Int, "ge_int"),
    row(S::GeReal, F::Ge, T::Real, "ge_real"),
    row(S::GeDecimal, F::Ge, T::Decimal, "ge_decimal"),
    row(S::GeString, F::Ge, T::String, "ge_string"),
    row(S::GeTime, F::Ge, T::Time, "ge_time"),
    row(S::GeDuration, F::Ge, T::Duration, "ge_duration"),
    row(S::EqInt, F::Eq, T::Int, "eq_int"),
    row(S::EqReal, F::Eq, T::Real, "eq_real"),
    row(S::EqDecimal, F::Eq, T::Decimal, "eq_decimal"),
    row(S::EqString, F::Eq, T::String, "eq_string"),
    row(S::EqTime, F::Eq, T::Time, "eq_time"),
    row(S::EqDuration, F::Eq, T::Duration, "eq_duration"),
    row(S::NeInt, F::Ne, T::Int, "ne_int"),
    row(S::NeReal, F::Ne, T::Real, "ne_real"),
    row(S::NeDecimal, F::Ne, T::Decimal, "ne_decimal"),
    row(S::NeString, F::Ne, T::String, "ne_string"),
    row(S::NeTime, F::Ne, T::Time, "ne_time"),
    row(S::NeDuration, F::Ne, T::Duration, "ne_duration"),
    row(S::PlusReal, F::Plus, T::Real, "plus_real"),
    row(S::PlusDecimal, F::Plus, T::Decimal, "plus_decimal"),
    row(S::PlusInt, F::Plus, T::Int, "plus_int"),
    row(S::MinusReal, F::Minus, T::Real, "minus_real"),
    row(S::MinusDecimal, F::Minus, T::Decimal, "minus_decimal"),
    row(S::MinusInt, F::Minus, T::Int, "minus_int"),
    row(S::MultiplyReal, F::Multiply, T::Real, "multiply_real"),
    row(S::MultiplyDecimal, F::Multiply, T::Decimal, "multiply_decimal"),
    row(S::MultiplyInt, F::Multiply, T::Int, "multiply_int"),
    row(S::DivideReal, F::Divide, T::Real, "divide_real"),
    row(S::DivideDecimal, F::Divide, T::Decimal, "divide_decimal"),
    row(
        S::MultiplyIntUnsigned,
        F::Multiply,
        T::Int,
        "multiply_int_unsigned",
    ),
    row(S::UnaryNotInt, F::UnaryNot, T::Int, "unary_not_int"),
    row(S::UnaryNotDecimal, F::UnaryNot, T::Decimal, "unary_not_decimal"),
    row(S::UnaryNotReal, F::UnaryNot, T::Real, "unary_not_real"),
    row(S::UnaryMinusInt, F::UnaryMinus, T::Int, "unary_minus_int"),
    row(S::UnaryMinusReal, F::UnaryMinus, T::Real, "unary_minus_real"),
    row(
        S::UnaryMinusDecimal,
        F::UnaryMinus,
        T::Decimal,
        "unary_minus_decimal",
    ),
    row(S::DecimalIsNull, F::IsNull, T::Decimal, "decimal_is_null"),
    row(S::DurationIsNull, F::IsNull, T::Duration, "duration_is_null"),
    row(S::RealIsNull, F::IsNull, T::Real, "real_is_null"),
    row(S::StringIsNull, F::IsNull, T::String, "string_is_null"),
    row(S::TimeIsNull, F::IsNull, T::Time, "time_is_null"),
    row(S::IntIsNull, F::IsNull, T::Int, "int_is_null"),
    row(S::LogicalAnd, F::LogicalAnd, T::Int, "logical_and"),
    row(S::LogicalOr, F::LogicalOr, T::Int, "logical_or"),
    row(S::InInt, F::In, T::Int, "in_int"),
    row(S::InReal, F::In, T::Real, "in_real"),
    row(S::InDecimal, F::In, T::Decimal, "in_decimal"),
    row(S::InString, F::In, T::String, "in_string"),
    row(S::InTime, F::In, T::Time, "in_time"),
    row(S::InDuration, F::In, T::Duration, "in_duration"),
    row(S::IfNullInt, F::IfNull, T::Int, "ifnull_int"),
    row(S::IfNullReal, F::IfNull, T::Real, "ifnull_real"),
    row(S::IfNullDecimal, F::IfNull, T::Decimal, "ifnull_decimal"),
    row(S::IfNullString, F::IfNull, T::String, "ifnull_string"),
    row(S::IfNullTime, F::IfNull, T::Time, "ifnull_time"),
    row(S::IfNullDuration, F::IfNull, T::Duration, "ifnull_duration"),
    row(S::IfInt, F::If, T::Int, "if_int"),
    row(S::IfReal, F::If, T::Real, "if_real"),
    row(S::IfDecimal, F::If, T::Decimal, "if_decimal"),
    row(S::IfString, F::If, T::String, "if_string"),
    row(S::IfTime, F::If, T::Time, "if_time"),
    row(S::IfDuration, F::If, T::Duration, "if_duration"),
    row(S::Length, F::Length, T::String, "length"),
    row(S::Strcmp, F::Strcmp, T::String, "strcmp"),
    row(S::GetVar, F::GetVar, T::String, "get_var"),
    row(S::SetVar, F::SetVar, T::String, "set_var"),
];

impl SigSpec {
    /// Look up the table row for a wire code.
    pub fn lookup(code: u32) -> Option<&'static SigSpec> {
        SIG_TABLE
            .binary_search_by_key(&code, |spec| spec.sig.code())
            .ok()
            .map(|idx| &SIG_TABLE[idx])
    }
}

/// Build the function-call expression for a signature code.
///
/// This is the single totality boundary of the decode path: a code absent
/// from the table fails with [`ExprError::FunctionNotExists`], and that
/// failure aborts the whole containing tree.
pub fn dispatch(code: u32, ret_type: FieldType, args: Vec<Expression>) -> ExprResult<Expression> {
    let spec = SigSpec::lookup(code).ok_or(ExprError::FunctionNotExists(code))?;
    Ok(Expression::FunctionCall(ScalarFunction {
        base: FuncCallBase { args, ret_type },
        spec,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::type_code;
    use crate::types::Value;

    #[test]
    fn test_table_is_sorted_and_unique() {
        for pair in SIG_TABLE.windows(2) {
            assert!(pair[0].sig.code() < pair[1].sig.code());
        }
    }

    #[test]
    fn test_table_covers_every_family() {
        assert_eq!(SIG_TABLE.len(), 84);

        let count = |op: FuncKind| SIG_TABLE.iter().filter(|spec| spec.op == op).count();
        // Six ordering comparisons, each specialized over six operand types.
        for op in [F::Lt, F::Le, F::Gt, F::Ge, F::Eq, F::Ne] {
            assert_eq!(count(op), 6);
        }
        assert_eq!(count(F::Multiply), 4); // incl. the unsigned variant
        assert_eq!(count(F::Divide), 2); // no integer division pushdown
        assert_eq!(count(F::IsNull), 6);
        assert_eq!(count(F::In), 6);
        assert_eq!(count(F::IfNull), 6);
        assert_eq!(count(F::If), 6);
    }

    #[test]
    fn test_lookup_hits_every_row() {
        for spec in SIG_TABLE {
            let found = SigSpec::lookup(spec.sig.code()).unwrap();
            assert_eq!(found.sig, spec.sig);
            assert_eq!(found.name, spec.name);
        }
    }

    #[test]
    fn test_lookup_misses_absent_codes() {
        for code in [0, 99, 106, 202, 206, 213, 5000, u32::MAX] {
            assert!(SigSpec::lookup(code).is_none());
        }
    }

    #[test]
    fn test_dispatch_binds_args_and_result_type() {
        let args = vec![
            Expression::constant(Value::Int64(5), FieldType::new(type_code::LONG_LONG)),
            Expression::constant(Value::Int64(7), FieldType::new(type_code::LONG_LONG)),
        ];
        let ret = FieldType::new(type_code::LONG_LONG);
        let expr = dispatch(ScalarFuncSig::LtInt.code(), ret.clone(), args).unwrap();
        match expr {
            Expression::FunctionCall(func) => {
                assert_eq!(func.sig(), ScalarFuncSig::LtInt);
                assert_eq!(func.op(), FuncKind::Lt);
                assert_eq!(func.args().len(), 2);
                assert_eq!(*func.ret_type(), ret);
            }
            other => panic!("expected a function call, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_unknown_code_carries_the_code() {
        let err = dispatch(9999, FieldType::new(type_code::LONG_LONG), Vec::new());
        match err {
            Err(ExprError::FunctionNotExists(code)) => assert_eq!(code, 9999),
            other => panic!("expected FunctionNotExists, got {:?}", other),
        }
    }
}
