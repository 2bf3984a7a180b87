//! Binary codecs for pushed-down scalar values.
//!
//! This module provides:
//! - Ordered fixed-width encodings for integers and floats (byte-wise
//!   comparison matches numeric ordering)
//! - Varint and memcomparable/compact byte-string encodings
//! - The self-describing, flag-prefixed value codec used by value lists
//! - The MySQL binary decimal decoding
//!
//! Every decoder takes a byte slice and returns the decoded value together
//! with the remaining bytes. Truncated or malformed input is always reported
//! as a [`CodecError`]; nothing is silently coerced to a default.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::types::{Decimal, Duration, Value, MAX_FSP};

/// Errors that can occur while decoding binary values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of data: need {need} bytes, have {have}")]
    Eof { need: usize, have: usize },

    #[error("invalid padding in byte-string group")]
    BadPadding,

    #[error("malformed varint")]
    BadVarint,

    #[error("unknown value flag: {0}")]
    UnknownFlag(u8),

    #[error("invalid decimal encoding: {0}")]
    Decimal(&'static str),

    #[error("invalid time value: {0}")]
    BadTime(&'static str),

    #[error("cannot encode {0} with the value codec")]
    Unsupported(&'static str),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

const ENC_GROUP_SIZE: usize = 8;
const ENC_MARKER: u8 = 0xff;
const ENC_PAD: u8 = 0x00;

// Flags of the self-describing value encoding.
pub const NIL_FLAG: u8 = 0;
pub const BYTES_FLAG: u8 = 1;
pub const COMPACT_BYTES_FLAG: u8 = 2;
pub const INT_FLAG: u8 = 3;
pub const UINT_FLAG: u8 = 4;
pub const FLOAT_FLAG: u8 = 5;
pub const DECIMAL_FLAG: u8 = 6;
pub const DURATION_FLAG: u8 = 7;
pub const VARINT_FLAG: u8 = 8;
pub const UVARINT_FLAG: u8 = 9;

fn take(data: &[u8], n: usize) -> CodecResult<(&[u8], &[u8])> {
    if data.len() < n {
        return Err(CodecError::Eof {
            need: n,
            have: data.len(),
        });
    }
    Ok(data.split_at(n))
}

/// Decode an ordered-encoded signed integer.
pub fn decode_int(data: &[u8]) -> CodecResult<(i64, &[u8])> {
    let (head, rest) = take(data, 8)?;
    let u = BigEndian::read_u64(head);
    Ok(((u ^ SIGN_MASK) as i64, rest))
}

/// Encode a signed integer so that byte order matches numeric order.
pub fn encode_int(buf: &mut Vec<u8>, v: i64) {
    let mut b = [0u8; 8];
    BigEndian::write_u64(&mut b, (v as u64) ^ SIGN_MASK);
    buf.extend_from_slice(&b);
}

/// Decode an ordered-encoded unsigned integer.
pub fn decode_uint(data: &[u8]) -> CodecResult<(u64, &[u8])> {
    let (head, rest) = take(data, 8)?;
    Ok((BigEndian::read_u64(head), rest))
}

/// Encode an unsigned integer in big-endian order.
pub fn encode_uint(buf: &mut Vec<u8>, v: u64) {
    let mut b = [0u8; 8];
    BigEndian::write_u64(&mut b, v);
    buf.extend_from_slice(&b);
}

/// Decode an ordered-encoded IEEE-754 double.
///
/// Non-negative values are stored with the sign bit set; negative values are
/// stored bitwise-complemented, so byte order matches numeric order.
pub fn decode_float(data: &[u8]) -> CodecResult<(f64, &[u8])> {
    let (head, rest) = take(data, 8)?;
    let mut u = BigEndian::read_u64(head);
    if u & SIGN_MASK != 0 {
        u &= !SIGN_MASK;
    } else {
        u = !u;
    }
    Ok((f64::from_bits(u), rest))
}

/// Encode a double in the ordered encoding.
pub fn encode_float(buf: &mut Vec<u8>, v: f64) {
    let mut u = v.to_bits();
    if u & SIGN_MASK == 0 {
        u |= SIGN_MASK;
    } else {
        u = !u;
    }
    let mut b = [0u8; 8];
    BigEndian::write_u64(&mut b, u);
    buf.extend_from_slice(&b);
}

/// Decode a base-128 unsigned varint.
pub fn decode_uvarint(data: &[u8]) -> CodecResult<(u64, &[u8])> {
    let mut x: u64 = 0;
    let mut s: u32 = 0;
    for (i, &b) in data.iter().enumerate() {
        if i == 10 || (i == 9 && b > 1) {
            return Err(CodecError::BadVarint);
        }
        if b < 0x80 {
            return Ok((x | ((b as u64) << s), &data[i + 1..]));
        }
        x |= ((b & 0x7f) as u64) << s;
        s += 7;
    }
    Err(CodecError::Eof {
        need: data.len() + 1,
        have: data.len(),
    })
}

/// Encode a base-128 unsigned varint.
pub fn encode_uvarint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push(v as u8 | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

/// Decode a zigzag-encoded signed varint.
pub fn decode_varint(data: &[u8]) -> CodecResult<(i64, &[u8])> {
    let (ux, rest) = decode_uvarint(data)?;
    let mut x = (ux >> 1) as i64;
    if ux & 1 != 0 {
        x = !x;
    }
    Ok((x, rest))
}

/// Encode a signed varint with zigzag encoding.
pub fn encode_varint(buf: &mut Vec<u8>, v: i64) {
    let ux = ((v << 1) ^ (v >> 63)) as u64;
    encode_uvarint(buf, ux);
}

/// Decode a memcomparable byte string.
///
/// The encoding splits the data into groups of 8 bytes, each zero-padded and
/// followed by a marker byte of `0xff - pad_count`. A marker below `0xff`
/// terminates the string.
pub fn decode_bytes(data: &[u8]) -> CodecResult<(Vec<u8>, &[u8])> {
    let mut out = Vec::new();
    let mut rest = data;
    loop {
        if rest.len() < ENC_GROUP_SIZE + 1 {
            return Err(CodecError::Eof {
                need: ENC_GROUP_SIZE + 1,
                have: rest.len(),
            });
        }
        let group = &rest[..ENC_GROUP_SIZE];
        let marker = rest[ENC_GROUP_SIZE];
        rest = &rest[ENC_GROUP_SIZE + 1..];

        let pad = (ENC_MARKER - marker) as usize;
        if pad > ENC_GROUP_SIZE {
            return Err(CodecError::BadPadding);
        }
        let real = ENC_GROUP_SIZE - pad;
        out.extend_from_slice(&group[..real]);
        if pad > 0 {
            if group[real..].iter().any(|&b| b != ENC_PAD) {
                return Err(CodecError::BadPadding);
            }
            return Ok((out, rest));
        }
    }
}

/// Encode a byte string in the memcomparable group encoding.
pub fn encode_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    for start in (0..=data.len()).step_by(ENC_GROUP_SIZE) {
        let end = (start + ENC_GROUP_SIZE).min(data.len());
        let chunk = &data[start..end];
        let pad = ENC_GROUP_SIZE - chunk.len();
        buf.extend_from_slice(chunk);
        buf.extend(std::iter::repeat(ENC_PAD).take(pad));
        buf.push(ENC_MARKER - pad as u8);
    }
}

/// Decode a length-prefixed byte string.
pub fn decode_compact_bytes(data: &[u8]) -> CodecResult<(Vec<u8>, &[u8])> {
    let (n, rest) = decode_varint(data)?;
    let n = usize::try_from(n).map_err(|_| CodecError::BadVarint)?;
    let (head, rest) = take(rest, n)?;
    Ok((head.to_vec(), rest))
}

/// Encode a length-prefixed byte string.
pub fn encode_compact_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    encode_varint(buf, data.len() as i64);
    buf.extend_from_slice(data);
}

// MySQL binary decimals pack 9 decimal digits into a 4-byte word; partial
// leading/trailing groups use this many bytes per digit count.
const DIGITS_PER_WORD: usize = 9;
const WORD_BASE: u128 = 1_000_000_000;
const DIG2BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

fn decimal_bin_size(int_digits: usize, frac_digits: usize) -> usize {
    let int_words = int_digits / DIGITS_PER_WORD;
    let leading = int_digits % DIGITS_PER_WORD;
    let frac_words = frac_digits / DIGITS_PER_WORD;
    let trailing = frac_digits % DIGITS_PER_WORD;
    int_words * 4 + DIG2BYTES[leading] + frac_words * 4 + DIG2BYTES[trailing]
}

fn read_digit_group(buf: &[u8], digits: usize) -> CodecResult<i128> {
    let mut v: i128 = 0;
    for &b in buf {
        v = v << 8 | b as i128;
    }
    if v >= 10i128.pow(digits as u32) {
        return Err(CodecError::Decimal("digit group out of range"));
    }
    Ok(v)
}

/// Decode a MySQL binary decimal.
///
/// The encoding is self-describing: a two-byte precision/scale header is
/// followed by sign-flipped big-endian base-10^9 digit groups. The decoded
/// value carries its precision and scale.
pub fn decode_decimal(data: &[u8]) -> CodecResult<(Decimal, &[u8])> {
    let (header, body) = take(data, 2)?;
    let precision = header[0] as usize;
    let frac = header[1] as usize;
    if precision == 0 || frac > precision {
        return Err(CodecError::Decimal("bad precision/scale header"));
    }
    let int_digits = precision - frac;
    let bin_size = decimal_bin_size(int_digits, frac);
    let (encoded, rest) = take(body, bin_size)?;

    let mut buf = encoded.to_vec();
    let negative = buf[0] & 0x80 == 0;
    buf[0] ^= 0x80;
    if negative {
        for b in &mut buf {
            *b = !*b;
        }
    }

    let mut mantissa: i128 = 0;
    let mut pos = 0;
    let push_group = |mantissa: &mut i128, digits: usize, pos: &mut usize| {
        let n = if digits == DIGITS_PER_WORD {
            4
        } else {
            DIG2BYTES[digits]
        };
        let group = read_digit_group(&buf[*pos..*pos + n], digits)?;
        *pos += n;
        *mantissa = mantissa
            .checked_mul(10i128.pow(digits as u32))
            .and_then(|m| m.checked_add(group))
            .ok_or(CodecError::Decimal("magnitude exceeds the backing store"))?;
        Ok::<(), CodecError>(())
    };

    let leading = int_digits % DIGITS_PER_WORD;
    if leading > 0 {
        push_group(&mut mantissa, leading, &mut pos)?;
    }
    for _ in 0..int_digits / DIGITS_PER_WORD {
        push_group(&mut mantissa, DIGITS_PER_WORD, &mut pos)?;
    }
    for _ in 0..frac / DIGITS_PER_WORD {
        push_group(&mut mantissa, DIGITS_PER_WORD, &mut pos)?;
    }
    let trailing = frac % DIGITS_PER_WORD;
    if trailing > 0 {
        push_group(&mut mantissa, trailing, &mut pos)?;
    }

    if negative {
        mantissa = -mantissa;
    }
    Ok((
        Decimal::new(mantissa, precision as u8, frac as u8),
        rest,
    ))
}

fn write_digit_group(buf: &mut Vec<u8>, group: u128, digits: usize) {
    let n = if digits == DIGITS_PER_WORD {
        4
    } else {
        DIG2BYTES[digits]
    };
    for i in (0..n).rev() {
        buf.push((group >> (8 * i)) as u8);
    }
}

/// Encode a decimal in the MySQL binary format.
pub fn encode_decimal(buf: &mut Vec<u8>, dec: &Decimal) {
    let precision = dec.precision() as usize;
    let frac = dec.frac() as usize;
    let int_digits = precision - frac;

    let magnitude = dec.mantissa().unsigned_abs();
    let frac_base = 10u128.pow(frac as u32);
    let mut int_part = magnitude / frac_base;
    let frac_part = magnitude % frac_base;

    buf.push(precision as u8);
    buf.push(frac as u8);
    let body = buf.len();

    // Integer digit groups: split off full base-10^9 words, leaving the
    // partial leading group in `int_part`; emit most significant first.
    let mut int_groups = Vec::new();
    for _ in 0..int_digits / DIGITS_PER_WORD {
        int_groups.push(int_part % WORD_BASE);
        int_part /= WORD_BASE;
    }
    let leading = int_digits % DIGITS_PER_WORD;
    if leading > 0 {
        write_digit_group(buf, int_part, leading);
    }
    while let Some(group) = int_groups.pop() {
        write_digit_group(buf, group, DIGITS_PER_WORD);
    }

    // Fractional digit groups: the trailing partial group holds the least
    // significant digits; the rest splits into full words.
    let trailing = frac % DIGITS_PER_WORD;
    let trailing_base = 10u128.pow(trailing as u32);
    let trailing_group = frac_part % trailing_base;
    let mut head = frac_part / trailing_base;
    let mut frac_groups = Vec::new();
    for _ in 0..frac / DIGITS_PER_WORD {
        frac_groups.push(head % WORD_BASE);
        head /= WORD_BASE;
    }
    while let Some(group) = frac_groups.pop() {
        write_digit_group(buf, group, DIGITS_PER_WORD);
    }
    if trailing > 0 {
        write_digit_group(buf, trailing_group, trailing);
    }

    buf[body] ^= 0x80;
    if dec.mantissa() < 0 {
        for b in &mut buf[body..] {
            *b = !*b;
        }
    }
}

/// Decode one self-describing value.
pub fn decode_value(data: &[u8]) -> CodecResult<(Value, &[u8])> {
    let (flag, rest) = take(data, 1)?;
    match flag[0] {
        NIL_FLAG => Ok((Value::Null, rest)),
        INT_FLAG => decode_int(rest).map(|(v, r)| (Value::Int64(v), r)),
        UINT_FLAG => decode_uint(rest).map(|(v, r)| (Value::Uint64(v), r)),
        VARINT_FLAG => decode_varint(rest).map(|(v, r)| (Value::Int64(v), r)),
        UVARINT_FLAG => decode_uvarint(rest).map(|(v, r)| (Value::Uint64(v), r)),
        FLOAT_FLAG => decode_float(rest).map(|(v, r)| (Value::Float64(v), r)),
        BYTES_FLAG => decode_bytes(rest).map(|(v, r)| (Value::Bytes(v), r)),
        COMPACT_BYTES_FLAG => decode_compact_bytes(rest).map(|(v, r)| (Value::Bytes(v), r)),
        DECIMAL_FLAG => decode_decimal(rest).map(|(v, r)| (Value::Decimal(v), r)),
        DURATION_FLAG => {
            decode_int(rest).map(|(v, r)| (Value::Duration(Duration::new(v, MAX_FSP)), r))
        }
        other => Err(CodecError::UnknownFlag(other)),
    }
}

/// Decode a self-describing value sequence, e.g. a value-list payload.
///
/// An empty payload decodes to an empty sequence.
pub fn decode_values(data: &[u8]) -> CodecResult<Vec<Value>> {
    let mut values = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let (v, r) = decode_value(rest)?;
        values.push(v);
        rest = r;
    }
    Ok(values)
}

/// Encode one value in the self-describing encoding.
pub fn encode_value(buf: &mut Vec<u8>, value: &Value) -> CodecResult<()> {
    match value {
        Value::Null => buf.push(NIL_FLAG),
        Value::Int64(v) => {
            buf.push(INT_FLAG);
            encode_int(buf, *v);
        }
        Value::Uint64(v) => {
            buf.push(UINT_FLAG);
            encode_uint(buf, *v);
        }
        Value::Float32(v) => {
            buf.push(FLOAT_FLAG);
            encode_float(buf, f64::from(*v));
        }
        Value::Float64(v) => {
            buf.push(FLOAT_FLAG);
            encode_float(buf, *v);
        }
        Value::String(v) | Value::Bytes(v) => {
            buf.push(COMPACT_BYTES_FLAG);
            encode_compact_bytes(buf, v);
        }
        Value::Decimal(v) => {
            buf.push(DECIMAL_FLAG);
            encode_decimal(buf, v);
        }
        Value::Duration(v) => {
            buf.push(DURATION_FLAG);
            encode_int(buf, v.nanos());
        }
        Value::Time(_) => return Err(CodecError::Unsupported("time")),
    }
    Ok(())
}
