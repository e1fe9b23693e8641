//! Normalization, validation and ordering of dotted version strings.
//!
//! Versions are kept as plain normalized strings (`"16.10.0"`). Segments are
//! compared numerically with arbitrary precision, so `"16.9"` sorts below
//! `"16.10.0"` and there is no limit on segment count or magnitude.

use std::cmp::Ordering;
use std::fmt;

/// Strip surrounding whitespace and one leading `v`/`V`.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidVersionReason {
    Empty,
    EmptySegment,
    NonNumericSegment,
}

impl fmt::Display for InvalidVersionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "version is empty"),
            Self::EmptySegment => write!(f, "empty segment"),
            Self::NonNumericSegment => write!(f, "non-numeric segment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid version {input:?}: {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: InvalidVersionReason,
}

/// Normalize `raw` and check that it is a dotted sequence of decimal
/// segments.
///
/// # Errors
/// Returns an error for empty input, empty segments (`"1..2"`) and
/// non-numeric segments (`"1.2.x"`, `"lts/*"`).
pub fn parse_version(raw: &str) -> Result<String, VersionParseError> {
    let normalized = normalize(raw);
    let fail = |reason| VersionParseError {
        input: raw.trim().to_string(),
        reason,
    };

    if normalized.is_empty() {
        return Err(fail(InvalidVersionReason::Empty));
    }

    for segment in normalized.split('.') {
        if segment.is_empty() {
            return Err(fail(InvalidVersionReason::EmptySegment));
        }
        if !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(fail(InvalidVersionReason::NonNumericSegment));
        }
    }

    Ok(normalized)
}

/// Order two version strings segment by segment.
///
/// Missing trailing segments count as `0`, as do non-numeric segments, which
/// keeps this a total order over arbitrary input. Callers that need to reject
/// malformed versions run them through [`parse_version`] first.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.').map(numeric_segment);
    let mut right = b.split('.').map(numeric_segment);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => {
                let ordering = cmp_digits(l.unwrap_or("0"), r.unwrap_or("0"));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Whether `a` and `b` name the same version after normalization.
#[must_use]
pub fn same_version(a: &str, b: &str) -> bool {
    compare(&normalize(a), &normalize(b)) == Ordering::Equal
}

/// Leading segment of a normalized version, e.g. `"16"` for `"16.10.0"`.
#[must_use]
pub fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

fn numeric_segment(segment: &str) -> &str {
    let segment = segment.trim();
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return "0";
    }
    let stripped = segment.trim_start_matches('0');
    if stripped.is_empty() { "0" } else { stripped }
}

// Both inputs are canonical digit strings without leading zeros.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
