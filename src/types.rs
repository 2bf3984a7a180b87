//! Type descriptors and runtime scalar values.
//!
//! This module provides:
//! - The wire and internal type descriptors and their translation
//! - The static collation lookup table
//! - The scalar value union carried by decoded constants
//! - Fixed-point decimal and calendar time/duration values

pub mod collation;
pub mod decimal;
pub mod field_type;
pub mod time;
pub mod value;

pub use collation::UnresolvedCollation;
pub use decimal::Decimal;
pub use field_type::{flag, type_code, FieldType, WireFieldType, UNSPECIFIED_LENGTH};
pub use time::{Duration, Time, MAX_FSP};
pub use value::Value;
