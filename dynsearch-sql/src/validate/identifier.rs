//! Column/identifier validation and quoting for SQL injection prevention.
//!
//! This is the only place user text is allowed into emitted SQL outside of
//! bound parameters, so every rule here is a whitelist.

use crate::builder::SortDir;
use crate::error::{CompileError, Result};

/// Maximum length for an identifier or dotted path.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate that a string is a safe column name or dotted path.
///
/// A valid identifier:
/// - Is 1 to 128 characters long
/// - Contains only ASCII letters, digits, underscores and dots
/// - Neither starts nor ends with a dot
/// - Contains no consecutive dots
///
/// # Examples
///
/// ```
/// use dynsearch_sql::is_valid_identifier;
///
/// assert!(is_valid_identifier("name"));
/// assert!(is_valid_identifier("created_utc"));
/// assert!(is_valid_identifier("type.name"));
/// assert!(is_valid_identifier("1st_column"));
///
/// assert!(!is_valid_identifier(""));
/// assert!(!is_valid_identifier(".name"));
/// assert!(!is_valid_identifier("type..name"));
/// assert!(!is_valid_identifier("name; DROP TABLE users--"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    if !s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
    {
        return false;
    }

    !(s.starts_with('.') || s.ends_with('.') || s.contains(".."))
}

/// Validate an identifier and wrap it in `quote`, doubling any embedded quote
/// characters.
///
/// Dialects call this through [`Dialect::quote_identifier`](crate::Dialect::quote_identifier).
pub fn quote_identifier_with(s: &str, quote: char) -> Result<String> {
    if !is_valid_identifier(s) {
        return Err(CompileError::InvalidIdentifier(s.to_string()));
    }

    let mut doubled = String::with_capacity(2);
    doubled.push(quote);
    doubled.push(quote);

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push(quote);
    quoted.push_str(&s.replace(quote, &doubled));
    quoted.push(quote);
    Ok(quoted)
}

/// Validate and double-quote an identifier (ANSI/Postgres convention).
///
/// ```
/// use dynsearch_sql::quote_identifier;
///
/// assert_eq!(quote_identifier("type.name").unwrap(), "\"type.name\"");
/// assert!(quote_identifier("name\" OR 1=1").is_err());
/// ```
pub fn quote_identifier(s: &str) -> Result<String> {
    quote_identifier_with(s, '"')
}

/// Validate a sort direction against the `asc`/`desc` whitelist.
///
/// Matching is case-insensitive; the returned [`SortDir`] renders as the
/// canonical upper-case keyword.
///
/// ```
/// use dynsearch_sql::{validate_sort_order, SortDir};
///
/// assert_eq!(validate_sort_order("Desc").unwrap(), SortDir::Desc);
/// assert_eq!(validate_sort_order("asc").unwrap().as_sql(), "ASC");
/// assert!(validate_sort_order("asc; DROP").is_err());
/// ```
pub fn validate_sort_order(s: &str) -> Result<SortDir> {
    if s.eq_ignore_ascii_case("asc") {
        Ok(SortDir::Asc)
    } else if s.eq_ignore_ascii_case("desc") {
        Ok(SortDir::Desc)
    } else {
        Err(CompileError::InvalidSortOrder(s.to_string()))
    }
}
