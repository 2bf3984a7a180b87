//! Fixed-point decimal values.
//!
//! A decimal is a scaled i128 mantissa plus the precision and scale the
//! coordinator declared for it. The binary wire decoding lives in
//! [`crate::codec::decode_decimal`]; this type only holds the decoded parts.

use std::fmt;

/// A fixed-point decimal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantissa: i128,
    precision: u8,
    frac: u8,
}

impl Decimal {
    /// Build a decimal from its scaled mantissa, total digit count and scale.
    pub fn new(mantissa: i128, precision: u8, frac: u8) -> Self {
        Self {
            mantissa,
            precision,
            frac,
        }
    }

    /// The scaled integer backing this value (`1.1` at scale 1 is `11`).
    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Total number of decimal digits declared for this value.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Number of fractional digits.
    pub fn frac(&self) -> u8 {
        self.frac
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.mantissa.unsigned_abs();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        if self.frac == 0 {
            return write!(f, "{}{}", sign, magnitude);
        }
        let base = 10u128.pow(u32::from(self.frac));
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / base,
            magnitude % base,
            width = self.frac as usize
        )
    }
}
