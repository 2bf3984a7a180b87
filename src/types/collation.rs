//! Static collation lookup table.
//!
//! The coordinator identifies collations by their small-integer MySQL ids;
//! the compute node resolves them to names through this table once, at
//! decode time. The table is immutable after process start and safe to read
//! from any number of threads.

use thiserror::Error;

/// A collation id that is not present in the static table.
///
/// Resolution failure is a hard error: silently falling back to a default
/// collation would change string comparison semantics between coordinator
/// and compute node without a trace.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unresolved collation id: {0}")]
pub struct UnresolvedCollation(pub i16);

/// Collation used when a type descriptor is synthesized locally rather than
/// received from the coordinator.
pub const DEFAULT_COLLATION: &str = "binary";

// Collation ids the coordinator is known to send, sorted by id.
static COLLATIONS: &[(i16, &str)] = &[
    (1, "big5_chinese_ci"),
    (3, "dec8_swedish_ci"),
    (4, "cp850_general_ci"),
    (5, "latin1_german1_ci"),
    (7, "koi8r_general_ci"),
    (8, "latin1_swedish_ci"),
    (9, "latin2_general_ci"),
    (11, "ascii_general_ci"),
    (24, "gb2312_chinese_ci"),
    (28, "gbk_chinese_ci"),
    (33, "utf8_general_ci"),
    (45, "utf8mb4_general_ci"),
    (46, "utf8mb4_bin"),
    (47, "latin1_bin"),
    (54, "utf16_general_ci"),
    (55, "utf16_bin"),
    (60, "utf32_general_ci"),
    (61, "utf32_bin"),
    (63, "binary"),
    (65, "ascii_bin"),
    (83, "utf8_bin"),
    (87, "gbk_bin"),
    (101, "utf16_unicode_ci"),
    (160, "utf32_unicode_ci"),
    (192, "utf8_unicode_ci"),
    (193, "utf8_icelandic_ci"),
    (224, "utf8mb4_unicode_ci"),
    (225, "utf8mb4_icelandic_ci"),
    (246, "utf8mb4_unicode_520_ci"),
    (255, "utf8mb4_0900_ai_ci"),
];

/// Resolve a wire collation id to its name.
pub fn resolve(id: i16) -> Result<&'static str, UnresolvedCollation> {
    COLLATIONS
        .binary_search_by_key(&id, |&(code, _)| code)
        .map(|idx| COLLATIONS[idx].1)
        .map_err(|_| UnresolvedCollation(id))
}
