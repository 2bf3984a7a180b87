//! Calendar time and duration values.

use std::fmt;

use chrono::{Datelike, FixedOffset, NaiveDate, TimeZone, Timelike};

use crate::codec::{CodecError, CodecResult};
use crate::types::field_type::type_code;

/// Maximum fractional-seconds precision.
pub const MAX_FSP: i8 = 6;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// An elapsed-time value with fractional-seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    nanos: i64,
    fsp: i8,
}

impl Duration {
    pub fn new(nanos: i64, fsp: i8) -> Self {
        Self { nanos, fsp }
    }

    pub fn nanos(&self) -> i64 {
        self.nanos
    }

    pub fn fsp(&self) -> i8 {
        self.fsp
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.nanos < 0 { "-" } else { "" };
        let total_secs = self.nanos.unsigned_abs() / NANOS_PER_SEC as u64;
        let sub_nanos = self.nanos.unsigned_abs() % NANOS_PER_SEC as u64;
        write!(
            f,
            "{}{:02}:{:02}:{:02}",
            sign,
            total_secs / 3600,
            total_secs / 60 % 60,
            total_secs % 60
        )?;
        if self.fsp > 0 {
            let micros = sub_nanos / 1_000;
            let shown = micros / 10u64.pow(6 - self.fsp as u32);
            write!(f, ".{:0width$}", shown, width = self.fsp as usize)?;
        }
        Ok(())
    }
}

/// A calendar time value decoded from the packed wire representation.
///
/// `tp` distinguishes zoned TIMESTAMP values from zone-naive DATETIME and
/// DATE values; only the former ever get timezone-converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub microsecond: u32,
    pub tp: u8,
    pub fsp: i8,
}

impl Time {
    /// Unpack the wire representation.
    ///
    /// Layout, from least to most significant:
    /// 24 bits microseconds, 17 bits `hour/minute/second`, then
    /// `(year * 13 + month) << 5 | day`.
    pub fn from_packed_u64(packed: u64, tp: u8, fsp: i8) -> CodecResult<Self> {
        let microsecond = (packed & ((1 << 24) - 1)) as u32;
        let ymdhms = packed >> 24;

        let hms = ymdhms & ((1 << 17) - 1);
        let second = (hms & 0x3f) as u8;
        let minute = ((hms >> 6) & 0x3f) as u8;
        let hour = (hms >> 12) as u8;

        let ymd = ymdhms >> 17;
        let day = (ymd & 0x1f) as u8;
        let ym = ymd >> 5;
        let year = ym / 13;
        let month = (ym % 13) as u8;

        let time = Self {
            year: year as u16,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
            tp,
            fsp,
        };
        if year > 9999
            || month > 12
            || day > 31
            || hour > 23
            || minute > 59
            || second > 59
            || microsecond >= 1_000_000
        {
            return Err(CodecError::BadTime("calendar field out of range"));
        }
        Ok(time)
    }

    /// Pack the calendar fields back into the wire representation.
    pub fn to_packed_u64(&self) -> u64 {
        let ymd = (u64::from(self.year) * 13 + u64::from(self.month)) << 5 | u64::from(self.day);
        let hms =
            u64::from(self.hour) << 12 | u64::from(self.minute) << 6 | u64::from(self.second);
        (ymd << 17 | hms) << 24 | u64::from(self.microsecond)
    }

    /// Whether this is the all-zero time, which denotes "no value" rather
    /// than an instant and is never timezone-adjusted.
    pub fn is_zero(&self) -> bool {
        self.year == 0
            && self.month == 0
            && self.day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
            && self.microsecond == 0
    }

    /// Reinterpret the calendar fields from one UTC offset into another.
    pub fn convert_time_zone(&mut self, from: FixedOffset, to: FixedOffset) -> CodecResult<()> {
        if self.is_zero() {
            return Ok(());
        }
        let naive = NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_micro_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
                self.microsecond,
            )
        })
        .ok_or(CodecError::BadTime("fields do not form a valid datetime"))?;

        let converted = from
            .from_local_datetime(&naive)
            .single()
            .ok_or(CodecError::BadTime("datetime has no instant in source timezone"))?
            .with_timezone(&to)
            .naive_local();

        self.year = converted.year() as u16;
        self.month = converted.month() as u8;
        self.day = converted.day() as u8;
        self.hour = converted.hour() as u8;
        self.minute = converted.minute() as u8;
        self.second = converted.second() as u8;
        Ok(())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.tp == type_code::DATE {
            return Ok(());
        }
        write!(f, " {:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.fsp > 0 {
            let shown = self.microsecond / 10u32.pow(6 - self.fsp as u32);
            write!(f, ".{:0width$}", shown, width = self.fsp as usize)?;
        }
        Ok(())
    }
}
