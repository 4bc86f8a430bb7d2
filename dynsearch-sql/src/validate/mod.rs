//! Security validation layer for SQL identifiers and sort directions.
//!
//! Values never reach emitted SQL as text; they are always bound parameters.
//! Identifiers cannot be bound, so they pass through this whitelist and are
//! quoted before being written into a fragment.
//!
//! # Example
//!
//! ```
//! use dynsearch_sql::{is_valid_identifier, quote_identifier, validate_sort_order};
//!
//! assert!(is_valid_identifier("type.name"));
//! assert_eq!(quote_identifier("name").unwrap(), "\"name\"");
//! assert_eq!(validate_sort_order("desc").unwrap().as_sql(), "DESC");
//! ```

mod identifier;

pub use identifier::{
    MAX_IDENTIFIER_LENGTH, is_valid_identifier, quote_identifier, quote_identifier_with,
    validate_sort_order,
};
