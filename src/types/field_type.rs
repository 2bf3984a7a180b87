//! Wire and internal type descriptors.

use crate::types::collation::{self, UnresolvedCollation, DEFAULT_COLLATION};

/// MySQL column type codes carried by wire type descriptors.
///
/// The descriptor translation copies the code verbatim; these constants
/// exist so the rest of the crate can name the kinds it cares about.
pub mod type_code {
    pub const DECIMAL: u8 = 0;
    pub const TINY: u8 = 1;
    pub const SHORT: u8 = 2;
    pub const LONG: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const DOUBLE: u8 = 5;
    pub const NULL: u8 = 6;
    pub const TIMESTAMP: u8 = 7;
    pub const LONG_LONG: u8 = 8;
    pub const INT24: u8 = 9;
    pub const DATE: u8 = 10;
    pub const DURATION: u8 = 11;
    pub const DATETIME: u8 = 12;
    pub const YEAR: u8 = 13;
    pub const NEW_DATE: u8 = 14;
    pub const VARCHAR: u8 = 15;
    pub const BIT: u8 = 16;
    pub const NEW_DECIMAL: u8 = 246;
    pub const ENUM: u8 = 247;
    pub const SET: u8 = 248;
    pub const TINY_BLOB: u8 = 249;
    pub const MEDIUM_BLOB: u8 = 250;
    pub const LONG_BLOB: u8 = 251;
    pub const BLOB: u8 = 252;
    pub const VAR_STRING: u8 = 253;
    pub const STRING: u8 = 254;
    pub const GEOMETRY: u8 = 255;
}

/// MySQL column flag bits.
pub mod flag {
    pub const NOT_NULL: u32 = 1;
    pub const PRI_KEY: u32 = 1 << 1;
    pub const UNIQUE_KEY: u32 = 1 << 2;
    pub const MULTIPLE_KEY: u32 = 1 << 3;
    pub const BLOB: u32 = 1 << 4;
    pub const UNSIGNED: u32 = 1 << 5;
    pub const ZEROFILL: u32 = 1 << 6;
    pub const BINARY: u32 = 1 << 7;
}

/// Length or decimal-digit count left unspecified by the coordinator.
pub const UNSPECIFIED_LENGTH: i32 = -1;

/// Type metadata as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFieldType {
    pub tp: u8,
    pub flag: u32,
    pub flen: i32,
    pub decimal: i32,
    pub charset: String,
    pub collate: i16,
}

impl WireFieldType {
    pub fn new(tp: u8) -> Self {
        Self {
            tp,
            flag: 0,
            flen: UNSPECIFIED_LENGTH,
            decimal: UNSPECIFIED_LENGTH,
            charset: String::new(),
            collate: 63, // binary
        }
    }

    pub fn with_flag(mut self, flag: u32) -> Self {
        self.flag |= flag;
        self
    }

    pub fn with_decimal(mut self, decimal: i32) -> Self {
        self.decimal = decimal;
        self
    }

    pub fn with_collation(mut self, collate: i16) -> Self {
        self.collate = collate;
        self
    }
}

/// Resolved type descriptor used by the evaluation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub tp: u8,
    pub flag: u32,
    pub flen: i32,
    pub decimal: i32,
    pub charset: String,
    pub collate: &'static str,
}

impl FieldType {
    /// A locally synthesized descriptor with everything but the type code
    /// left unspecified.
    pub fn new(tp: u8) -> Self {
        Self {
            tp,
            flag: 0,
            flen: UNSPECIFIED_LENGTH,
            decimal: UNSPECIFIED_LENGTH,
            charset: String::new(),
            collate: DEFAULT_COLLATION,
        }
    }

    /// Translate a wire type descriptor.
    ///
    /// Type code, flags, length and decimal-digit count are copied verbatim;
    /// only the collation id goes through the static table.
    pub fn from_wire(wire: &WireFieldType) -> Result<Self, UnresolvedCollation> {
        Ok(Self {
            tp: wire.tp,
            flag: wire.flag,
            flen: wire.flen,
            decimal: wire.decimal,
            charset: wire.charset.clone(),
            collate: collation::resolve(wire.collate)?,
        })
    }

    pub fn with_flag(mut self, flag: u32) -> Self {
        self.flag |= flag;
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.flag & flag::UNSIGNED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_copies_fields_verbatim() {
        let wire = WireFieldType {
            tp: type_code::NEW_DECIMAL,
            flag: flag::UNSIGNED | flag::NOT_NULL,
            flen: 20,
            decimal: 4,
            charset: "utf8mb4".to_string(),
            collate: 46,
        };
        let ft = FieldType::from_wire(&wire).unwrap();
        assert_eq!(ft.tp, type_code::NEW_DECIMAL);
        assert_eq!(ft.flag, flag::UNSIGNED | flag::NOT_NULL);
        assert_eq!(ft.flen, 20);
        assert_eq!(ft.decimal, 4);
        assert_eq!(ft.charset, "utf8mb4");
        assert_eq!(ft.collate, "utf8mb4_bin");
        assert!(ft.is_unsigned());
    }

    #[test]
    fn test_from_wire_rejects_unknown_collation() {
        let wire = WireFieldType::new(type_code::VAR_STRING).with_collation(999);
        assert_eq!(
            FieldType::from_wire(&wire),
            Err(UnresolvedCollation(999))
        );
    }

    #[test]
    fn test_new_leaves_lengths_unspecified() {
        let ft = FieldType::new(type_code::LONG_LONG);
        assert_eq!(ft.flen, UNSPECIFIED_LENGTH);
        assert_eq!(ft.decimal, UNSPECIFIED_LENGTH);
        assert_eq!(ft.collate, "binary");
        assert!(!ft.is_unsigned());
    }
}
