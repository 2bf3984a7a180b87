//! Error types for expression decoding.

use thiserror::Error;

use crate::codec::CodecError;
use crate::expression::wire::ExprKind;
use crate::types::collation::UnresolvedCollation;

/// Errors that can occur while decoding a pushed-down expression tree.
///
/// Every error aborts the whole tree build; no partial trees are returned.
#[derive(Error, Debug)]
pub enum ExprError {
    /// A primitive byte payload was malformed or truncated.
    #[error("invalid {kind} value {data:02x?}: {source}")]
    Decode {
        kind: &'static str,
        data: Vec<u8>,
        source: CodecError,
    },

    /// A column reference points outside the supplied schema.
    #[error("column offset {offset} out of range for schema with {schema_len} columns")]
    IndexOutOfRange { offset: i64, schema_len: usize },

    /// The signature code is absent from the dispatch table.
    #[error("scalar function signature {0} does not exist")]
    FunctionNotExists(u32),

    /// A non-function node appeared where the protocol guarantees a
    /// scalar function.
    #[error("protocol violation: expected a scalar function node, got {0:?}")]
    StructuralViolation(ExprKind),

    /// The collation id could not be resolved through the static table.
    #[error(transparent)]
    UnresolvedCollation(#[from] UnresolvedCollation),

    /// Expression nesting exceeded the recursion bound.
    #[error("expression nesting deeper than the {0} level limit")]
    TooDeep(usize),

    /// A typed node arrived without its wire type descriptor.
    #[error("{0:?} node is missing its field type")]
    MissingFieldType(ExprKind),
}

impl ExprError {
    pub(crate) fn decode(kind: &'static str, data: &[u8], source: CodecError) -> Self {
        ExprError::Decode {
            kind,
            data: data.to_vec(),
            source,
        }
    }
}

/// Result type for expression decoding.
pub type ExprResult<T> = Result<T, ExprError>;
