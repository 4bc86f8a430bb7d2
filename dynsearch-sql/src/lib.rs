// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // Every fallible fn returns CompileError
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder types carry #[must_use] themselves
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_possible_truncation)] // Fraction digit counts are at most 9
// Tests unwrap known-good fixtures
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::indexing_slicing))]

//! # dynsearch-sql - Parameterized SQL from JSON Search Criteria
//!
//! Compiles a client-supplied filter tree, sort string and page window into a
//! SQL fragment with named `@N` placeholders and an ordered binding table.
//! Values are never written into SQL text. Column names pass an identifier
//! whitelist and are quoted for the target dialect.
//!
//! ## Quick Start
//!
//! ```
//! # use dynsearch_sql::prelude::*;
//! let criteria = QueryCriteria::from_json_str(
//!     r#"{
//!         "filter": {
//!             "kind": "group", "op": "and", "filters": [
//!                 {"kind":"leaf","queryKey":"name","queryType":"text","operation":"contains","queryValue":"Device"},
//!                 {"kind":"leaf","queryKey":"price","queryType":"numeric","operation":"between","queryValue":"[10,100]"}
//!             ]
//!         },
//!         "sorts": "name=asc",
//!         "pageIndex": 1,
//!         "pageSize": 10
//!     }"#,
//!     &FilterDecoder::new(),
//! )
//! .unwrap();
//!
//! let result = postgres().assemble("select * from devices", &criteria, true).unwrap();
//! assert_eq!(
//!     result.sql,
//!     "select * from devices where ( \"name\" LIKE @0 and \"price\" BETWEEN @1 AND @2 ) \
//!      order by \"name\" ASC limit 10 offset 10"
//! );
//! assert_eq!(result.bindings.get("0"), Some(&Value::Text("%Device%".into())));
//! ```
//!
//! ## MySQL Dialect
//!
//! Use `mysql()` for backtick-quoted identifiers. Placeholders stay `@N`:
//!
//! ```
//! # use dynsearch_sql::prelude::*;
//! let criteria = QueryCriteria::with_filter(leaf("name", QueryType::Text, Operation::Eq, "a"));
//! let result = mysql().assemble("select * from t", &criteria, false).unwrap();
//! assert_eq!(result.sql, "select * from t where `name` = @0");
//! ```
//!
//! ## Supported Operations
//!
//! | Code | SQL | Values |
//! |------|-----|--------|
//! | `eq` / `neq` | `=` / `!=` | 1 |
//! | `lt` / `lte` / `gt` / `gte` | `<` / `<=` / `>` / `>=` | 1 |
//! | `contains` / `ncontains` | `LIKE` / `NOT LIKE` `%v%` | 1 (text) |
//! | `sw` | `LIKE` `v%` | 1 (text) |
//! | `ew` | `LIKE` `%v` | 1 (text) |
//! | `in` / `nin` | `IN (..)` / `NOT IN (..)` | 1 or more |
//! | `between` / `nbetween` | `BETWEEN @i AND @j` / `NOT BETWEEN` | exactly 2 |

mod builder;
mod dialect;
mod error;
mod validate;

pub use builder::{
    Arity, Bindings, BuildOptions, Compiled, DEFAULT_MAX_DEPTH, DEFAULT_PAGE_SIZE, DefaultParsers,
    FilterCompiler, FilterDecoder, FilterNode, Group, LogicalOp, Operation, Param, ParamAllocator,
    Predicate, QueryAssembler, QueryCriteria, QueryResult, QueryType, RawValue, SortCompiler,
    SortDir, SortField, Template, Value, ValueParser, WireFormat, and, escape_like_pattern, leaf,
    or, parse_boolean, parse_datetime, parse_guid, parse_numeric, split_bracket_list,
};
pub use dialect::{Dialect, MySql, Postgres};
pub use error::{CompileError, Result};
pub use validate::{
    MAX_IDENTIFIER_LENGTH, is_valid_identifier, quote_identifier, quote_identifier_with,
    validate_sort_order,
};

/// Query assembler for Postgres with default options.
pub fn postgres() -> QueryAssembler<Postgres> {
    QueryAssembler::new()
}

/// Query assembler for MySQL with default options.
pub fn mysql() -> QueryAssembler<MySql> {
    QueryAssembler::from_compiler(FilterCompiler::with_dialect(MySql))
}

/// Prelude module for convenient imports.
///
/// ```
/// use dynsearch_sql::prelude::*;
///
/// let compiled = FilterCompiler::new()
///     .compile_root(&leaf("id", QueryType::Numeric, Operation::Gt, "5"))
///     .unwrap();
/// assert_eq!(compiled.sql, "\"id\" > @0");
/// ```
pub mod prelude {
    pub use crate::{
        Bindings, CompileError, Compiled, Dialect, FilterCompiler, FilterDecoder, FilterNode,
        LogicalOp, MySql, Operation, ParamAllocator, Postgres, QueryAssembler, QueryCriteria,
        QueryResult, QueryType, RawValue, SortCompiler, SortDir, Value, WireFormat, and, leaf,
        mysql, or, postgres,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_from_json() {
        let criteria = QueryCriteria::from_json_str(
            r#"{"filter":{"kind":"leaf","queryKey":"name","queryType":"text","operation":"eq","queryValue":"Device 1"}}"#,
            &FilterDecoder::new(),
        )
        .unwrap();
        let result = postgres().assemble("select * from devices", &criteria, false).unwrap();

        assert_eq!(result.sql, "select * from devices where \"name\" = @0");
        assert_eq!(
            serde_json::to_string(&result.bindings).unwrap(),
            r#"{"0":"Device 1"}"#
        );
    }

    #[test]
    fn test_datetime_and_guid_bindings_serialize() {
        let filter = and(vec![
            leaf(
                "created_utc",
                QueryType::DateTime,
                Operation::Gte,
                "2024-03-01T08:30:00",
            ),
            leaf(
                "id",
                QueryType::Guid,
                Operation::Eq,
                "{67e55044-10b1-426f-9247-bb680e5fe0c8}",
            ),
        ]);
        let compiled = FilterCompiler::new().compile_root(&filter).unwrap();
        assert_eq!(
            serde_json::to_string(&compiled.bindings).unwrap(),
            r#"{"0":"2024-03-01T08:30:00","1":"67e55044-10b1-426f-9247-bb680e5fe0c8"}"#
        );
    }

    #[test]
    fn test_query_result_serializes() {
        let result = postgres()
            .assemble(
                "select 1",
                &QueryCriteria::with_filter(leaf("n", QueryType::Numeric, Operation::Lt, "3")),
                false,
            )
            .unwrap();
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"sql":"select 1 where \"n\" < @0","bindings":{"0":3.0}}"#
        );
    }
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
