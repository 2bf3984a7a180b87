//! Decoding of pushed-down expression trees.
//!
//! This module provides:
//! - The wire expression node received from the query coordinator
//! - A recursive tree builder producing typed [`Expression`] trees
//! - The signature dispatcher mapping wire codes to function calls
//! - Error types for the whole decode path

pub mod builder;
pub mod error;
pub mod expr;
pub mod signature;
pub mod wire;

pub use builder::{build_expr, build_exprs, MAX_EXPR_DEPTH};
pub use error::{ExprError, ExprResult};
pub use expr::{ColumnRef, Constant, Expression, FuncCallBase, ScalarFunction};
pub use signature::{dispatch, EvalType, FuncKind, ScalarFuncSig, SigSpec};
pub use wire::{ExprKind, WireExpr};
