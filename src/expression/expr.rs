//! Decoded expression tree definitions.

use std::fmt;

use crate::expression::signature::{FuncKind, ScalarFuncSig, SigSpec};
use crate::types::{FieldType, Value};

/// Column reference into the result schema supplied at decode time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Column index in the schema (0-based).
    pub index: usize,
    pub ret_type: FieldType,
}

/// Constant scalar value.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
    pub ret_type: FieldType,
}

/// Bound arguments and result type shared by every function variant.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCallBase {
    pub args: Vec<Expression>,
    pub ret_type: FieldType,
}

/// A type-specialized scalar function call.
///
/// The signature row is attached for downstream diagnostics and
/// serialization; the evaluator selects its implementation from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFunction {
    pub base: FuncCallBase,
    pub spec: &'static SigSpec,
}

impl ScalarFunction {
    pub fn sig(&self) -> ScalarFuncSig {
        self.spec.sig
    }

    pub fn op(&self) -> FuncKind {
        self.spec.op
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn args(&self) -> &[Expression] {
        &self.base.args
    }

    pub fn ret_type(&self) -> &FieldType {
        &self.base.ret_type
    }
}

/// A decoded expression tree node.
///
/// Trees are immutable after construction; the evaluator that requested
/// decoding takes ownership and only ever reads them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ColumnRef(ColumnRef),
    Constant(Constant),
    FunctionCall(ScalarFunction),
}

impl Expression {
    /// Create a constant expression.
    pub fn constant(value: Value, ret_type: FieldType) -> Self {
        Expression::Constant(Constant { value, ret_type })
    }

    /// Create a column reference expression.
    pub fn column(index: usize, ret_type: FieldType) -> Self {
        Expression::ColumnRef(ColumnRef { index, ret_type })
    }

    /// The declared result type of this node.
    pub fn ret_type(&self) -> &FieldType {
        match self {
            Expression::ColumnRef(col) => &col.ret_type,
            Expression::Constant(constant) => &constant.ret_type,
            Expression::FunctionCall(func) => func.ret_type(),
        }
    }

    /// Check if this tree contains no column references.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::ColumnRef(_) => false,
            Expression::Constant(_) => true,
            Expression::FunctionCall(func) => func.args().iter().all(|arg| arg.is_constant()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::ColumnRef(col) => write!(f, "col#{}", col.index),
            Expression::Constant(constant) => write!(f, "{}", constant.value),
            Expression::FunctionCall(func) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in func.args().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
