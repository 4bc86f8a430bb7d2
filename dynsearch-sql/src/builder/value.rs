//! Type-directed parsing of raw wire strings into bound values.
//!
//! [`ValueParser`] is the capability set the operation builders consume.
//! Every method has a default, so [`DefaultParsers`] is an empty impl and a
//! custom parser only overrides the types it handles differently.

use super::types::{QueryType, Value};
use crate::error::{CompileError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use uuid::Uuid;

/// Timestamp layouts tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y%m%d%H%M%S",
];

/// Per-type raw value parsers.
pub trait ValueParser {
    /// Text passthrough. The raw value is not trimmed.
    fn parse_text(&self, raw: &str) -> Result<Value> {
        Ok(Value::Text(raw.to_string()))
    }

    /// Parse a finite floating point number.
    fn parse_numeric(&self, raw: &str) -> Result<Value> {
        parse_numeric(raw).map(Value::Numeric)
    }

    /// Parse a timestamp.
    fn parse_datetime(&self, raw: &str) -> Result<Value> {
        parse_datetime(raw).map(Value::DateTime)
    }

    /// Parse `true` / `false`.
    fn parse_boolean(&self, raw: &str) -> Result<Value> {
        parse_boolean(raw).map(Value::Boolean)
    }

    /// Parse a UUID.
    fn parse_guid(&self, raw: &str) -> Result<Value> {
        parse_guid(raw).map(Value::Guid)
    }

    /// Dispatch on the declared type.
    fn parse(&self, query_type: QueryType, raw: &str) -> Result<Value> {
        match query_type {
            QueryType::Text => self.parse_text(raw),
            QueryType::Numeric => self.parse_numeric(raw),
            QueryType::DateTime => self.parse_datetime(raw),
            QueryType::Boolean => self.parse_boolean(raw),
            QueryType::Guid => self.parse_guid(raw),
        }
    }
}

/// The standard parser set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParsers;

impl ValueParser for DefaultParsers {}

/// Parse a number.
///
/// Surrounding whitespace is ignored. Empty input, digit grouping (`1,000`)
/// and non-finite values (`inf`, `NaN`) are rejected.
pub fn parse_numeric(raw: &str) -> Result<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(CompileError::value_format(QueryType::Numeric, raw, "empty"));
    }
    let n: f64 = s
        .parse()
        .map_err(|e| CompileError::value_format(QueryType::Numeric, raw, format!("{e}")))?;
    if !n.is_finite() {
        return Err(CompileError::value_format(
            QueryType::Numeric,
            raw,
            "not a finite number",
        ));
    }
    Ok(n)
}

/// Parse a timestamp.
///
/// Accepted layouts: RFC 3339 (converted to UTC), `YYYY-MM-DDTHH:MM:SS[.f]`,
/// `YYYY-MM-DD HH:MM:SS[.f]`, `YYYYMMDDHHMMSS`, a bare `YYYY-MM-DD`
/// (midnight) and `YYYY-MM-DDTHH:MM:SS:ffff` where the fraction follows a
/// colon.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(dt);
    }

    if let Some(dt) = parse_colon_fraction(s) {
        return Ok(dt);
    }

    Err(CompileError::value_format(
        QueryType::DateTime,
        raw,
        "unrecognised timestamp layout",
    ))
}

/// `2024-01-03T10:20:30:1234` -> 10:20:30.1234
fn parse_colon_fraction(s: &str) -> Option<NaiveDateTime> {
    let (head, frac) = s.rsplit_once(':')?;
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let base = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S").ok()?;
    let digits: u32 = frac.parse().ok()?;
    let nanos = digits * 10u32.pow(9 - frac.len() as u32);
    base.with_nanosecond(nanos)
}

/// Parse a boolean, case-insensitively.
pub fn parse_boolean(raw: &str) -> Result<bool> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CompileError::value_format(
            QueryType::Boolean,
            raw,
            "expected 'true' or 'false'",
        ))
    }
}

/// Parse a UUID in hyphenated, simple, braced, parenthesised or URN form.
pub fn parse_guid(raw: &str) -> Result<Uuid> {
    let s = raw.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s);
    Uuid::parse_str(s).map_err(|e| CompileError::value_format(QueryType::Guid, raw, e.to_string()))
}

/// Split a bracket-encoded list such as `[a,b,c]`.
///
/// One leading `[` and one trailing `]` are removed if present and the rest
/// is split on `,`. Elements are returned untrimmed; `[]` is the empty list.
///
/// ```
/// use dynsearch_sql::split_bracket_list;
///
/// assert_eq!(split_bracket_list("[Device 1,Device 2]"), vec!["Device 1", "Device 2"]);
/// assert_eq!(split_bracket_list("1,2,3"), vec!["1", "2", "3"]);
/// assert!(split_bracket_list("[]").is_empty());
/// ```
#[must_use]
pub fn split_bracket_list(raw: &str) -> Vec<&str> {
    let inner = raw.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    if inner.is_empty() {
        return Vec::new();
    }
    inner.split(',').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_text_passthrough() {
        let p = DefaultParsers;
        for s in ["hello", "", " ", "special!@#$%", "Hello 世界 🌍", "'; DROP TABLE x; --"] {
            assert_eq!(p.parse_text(s).unwrap(), Value::Text(s.to_string()));
        }
    }

    #[test]
    fn test_numeric_valid() {
        assert_eq!(parse_numeric("0").unwrap(), 0.0);
        assert_eq!(parse_numeric("-1").unwrap(), -1.0);
        assert_eq!(parse_numeric("123.45").unwrap(), 123.45);
        assert_eq!(parse_numeric("1000000").unwrap(), 1_000_000.0);
        assert_eq!(parse_numeric(" 25 ").unwrap(), 25.0);
        assert_eq!(
            parse_numeric("1.7976931348623157E+308").unwrap(),
            f64::MAX
        );
    }

    #[test]
    fn test_numeric_invalid() {
        for s in ["", " ", "abc", "12.34.56", "1,000", "inf", "NaN"] {
            assert!(
                matches!(
                    parse_numeric(s),
                    Err(CompileError::ValueFormat {
                        query_type: QueryType::Numeric,
                        ..
                    })
                ),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_datetime_layouts() {
        assert_eq!(
            parse_datetime("2024-01-03T00:00:00").unwrap(),
            dt(2024, 1, 3, 0, 0, 0)
        );
        assert_eq!(parse_datetime("2024-01-01").unwrap(), dt(2024, 1, 1, 0, 0, 0));
        assert_eq!(
            parse_datetime("2024-01-03 10:20:30").unwrap(),
            dt(2024, 1, 3, 10, 20, 30)
        );
        assert_eq!(
            parse_datetime("20240103102030").unwrap(),
            dt(2024, 1, 3, 10, 20, 30)
        );
        assert_eq!(
            parse_datetime("2024-01-03T12:00:00+02:00").unwrap(),
            dt(2024, 1, 3, 10, 0, 0)
        );
    }

    #[test]
    fn test_datetime_fractions() {
        let expected = dt(2024, 1, 3, 10, 20, 30).with_nanosecond(123_400_000).unwrap();
        assert_eq!(parse_datetime("2024-01-03T10:20:30.1234").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-03T10:20:30:1234").unwrap(), expected);
    }

    #[test]
    fn test_datetime_invalid() {
        for s in ["", "yesterday", "2024-13-01", "2024-01-03T25:00:00", "2024-01-03T10:20:30:"] {
            assert!(parse_datetime(s).is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_boolean() {
        assert!(parse_boolean("true").unwrap());
        assert!(parse_boolean("TRUE").unwrap());
        assert!(!parse_boolean(" False ").unwrap());
        assert!(parse_boolean("1").is_err());
        assert!(parse_boolean("yes").is_err());
        assert!(parse_boolean("").is_err());
    }

    #[test]
    fn test_guid_formats() {
        let expected = Uuid::parse_str("12345678-1234-1234-1234-123456789012").unwrap();
        for s in [
            "12345678-1234-1234-1234-123456789012",
            "{12345678-1234-1234-1234-123456789012}",
            "(12345678-1234-1234-1234-123456789012)",
            "12345678123412341234123456789012",
            "urn:uuid:12345678-1234-1234-1234-123456789012",
        ] {
            assert_eq!(parse_guid(s).unwrap(), expected, "{s}");
        }
        assert_eq!(
            parse_guid("FFFFFFFF-FFFF-FFFF-FFFF-FFFFFFFFFFFF").unwrap(),
            Uuid::from_u128(u128::MAX)
        );
    }

    #[test]
    fn test_guid_round_trip() {
        let id = Uuid::from_u128(0x67e5_5044_10b1_426f_9247_bb68_0e5f_e0c8);
        assert_eq!(parse_guid(&id.to_string()).unwrap(), id);
        assert_eq!(parse_guid(&id.simple().to_string()).unwrap(), id);
    }

    #[test]
    fn test_guid_invalid() {
        for s in ["", "not-a-guid", "12345678", "12345678-1234-1234-1234"] {
            assert!(parse_guid(s).is_err(), "{s:?} should be rejected");
        }
    }

    #[test]
    fn test_dispatch_by_type() {
        let p = DefaultParsers;
        assert_eq!(p.parse(QueryType::Numeric, "25").unwrap(), Value::Numeric(25.0));
        assert_eq!(p.parse(QueryType::Boolean, "true").unwrap(), Value::Boolean(true));
        assert_eq!(p.parse(QueryType::Text, "25").unwrap(), Value::Text("25".into()));
        assert!(matches!(
            p.parse(QueryType::Guid, "x").unwrap_err(),
            CompileError::ValueFormat {
                query_type: QueryType::Guid,
                ..
            }
        ));
    }

    #[test]
    fn test_custom_parser_overrides_one_type() {
        struct Cents;
        impl ValueParser for Cents {
            fn parse_numeric(&self, raw: &str) -> Result<Value> {
                parse_numeric(raw).map(|n| Value::Numeric((n * 100.0).round()))
            }
        }

        assert_eq!(
            Cents.parse(QueryType::Numeric, "1.25").unwrap(),
            Value::Numeric(125.0)
        );
        assert_eq!(
            Cents.parse(QueryType::Text, "1.25").unwrap(),
            Value::Text("1.25".into())
        );
    }

    #[test]
    fn test_split_bracket_list() {
        assert_eq!(split_bracket_list("[1,2.5,3.75,4]"), vec!["1", "2.5", "3.75", "4"]);
        assert_eq!(split_bracket_list("[123.45]"), vec!["123.45"]);
        assert_eq!(split_bracket_list("[a, b]"), vec!["a", " b"]);
        assert_eq!(split_bracket_list("[,]"), vec!["", ""]);
        assert!(split_bracket_list("").is_empty());
        assert!(split_bracket_list("[]").is_empty());
    }
}
