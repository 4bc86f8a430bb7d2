//! Search criteria and full query assembly.

use super::filter::FilterCompiler;
use super::param::ParamAllocator;
use super::parse::FilterDecoder;
use super::sort::SortCompiler;
use super::types::{Bindings, FilterNode, QueryResult};
use super::value::{DefaultParsers, ValueParser};
use crate::dialect::{Dialect, Postgres};
use crate::error::{CompileError, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// What to search for: an optional filter tree, an optional sort string and
/// a page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    /// Filter tree, if any.
    pub filter: Option<FilterNode>,
    /// `column=direction` pairs separated by commas.
    pub sorts: Option<String>,
    /// Zero-based page number.
    pub page_index: u32,
    /// Rows per page.
    pub page_size: u32,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaDocument {
    #[serde(default)]
    filter: Option<JsonValue>,
    #[serde(default)]
    sorts: Option<String>,
    #[serde(default)]
    page_index: u32,
    #[serde(default = "default_page_size")]
    page_size: u32,
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl QueryCriteria {
    /// Criteria with just a filter.
    #[must_use]
    pub fn with_filter(filter: FilterNode) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }

    /// Set the sort string.
    #[must_use]
    pub fn sorts(mut self, sorts: impl Into<String>) -> Self {
        self.sorts = Some(sorts.into());
        self
    }

    /// Set the page window.
    #[must_use]
    pub const fn page(mut self, page_index: u32, page_size: u32) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Decode a criteria document:
    /// `{"filter": <node>?, "sorts": "..."?, "pageIndex": 0, "pageSize": 20}`.
    ///
    /// The `filter` member is decoded with `decoder`, so the caller chooses
    /// the wire format and depth limit.
    ///
    /// ```
    /// use dynsearch_sql::{FilterDecoder, QueryCriteria};
    ///
    /// let criteria = QueryCriteria::from_json_str(
    ///     r#"{"sorts":"name=asc","pageIndex":2}"#,
    ///     &FilterDecoder::new(),
    /// )
    /// .unwrap();
    /// assert_eq!(criteria.page_index, 2);
    /// assert_eq!(criteria.page_size, 20);
    /// assert!(criteria.filter.is_none());
    /// ```
    pub fn from_json_str(json: &str, decoder: &FilterDecoder) -> Result<Self> {
        let doc: CriteriaDocument =
            serde_json::from_str(json).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        let filter = match doc.filter {
            None | Some(JsonValue::Null) => None,
            Some(node) => Some(decoder.decode(&node)?),
        };
        Ok(Self {
            filter,
            sorts: doc.sorts,
            page_index: doc.page_index,
            page_size: doc.page_size,
        })
    }

    /// Row offset of the current page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}

/// Appends WHERE, ORDER BY and LIMIT/OFFSET clauses to a base query.
///
/// Paging inputs are not range-checked here; callers validate them first.
///
/// ```
/// use dynsearch_sql::{Operation, QueryAssembler, QueryCriteria, QueryType, leaf};
///
/// let criteria = QueryCriteria::with_filter(leaf("name", QueryType::Text, Operation::Eq, "a"))
///     .sorts("name=desc")
///     .page(2, 10);
///
/// let result = QueryAssembler::new()
///     .assemble("select * from devices", &criteria, true)
///     .unwrap();
/// assert_eq!(
///     result.sql,
///     "select * from devices where \"name\" = @0 order by \"name\" DESC limit 10 offset 20"
/// );
/// ```
#[derive(Debug, Clone)]
#[must_use = "builder does nothing until assemble() is called"]
pub struct QueryAssembler<D: Dialect = Postgres, P: ValueParser = DefaultParsers> {
    filters: FilterCompiler<D, P>,
    sorts: SortCompiler<D>,
}

impl QueryAssembler {
    /// Postgres assembler with default options.
    pub fn new() -> Self {
        Self::from_compiler(FilterCompiler::new())
    }
}

impl Default for QueryAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dialect, P: ValueParser> QueryAssembler<D, P> {
    /// Assembler built around a configured filter compiler. Sorts use the
    /// same dialect.
    pub fn from_compiler(filters: FilterCompiler<D, P>) -> Self {
        let sorts = SortCompiler::with_dialect(*filters.dialect());
        Self { filters, sorts }
    }

    /// Build the full query.
    pub fn assemble(
        &self,
        base: &str,
        criteria: &QueryCriteria,
        paging: bool,
    ) -> Result<QueryResult> {
        let mut sql = String::from(base);
        let mut bindings = Bindings::new();

        if let Some(filter) = &criteria.filter {
            let compiled = self.filters.compile(filter, &mut ParamAllocator::new())?;
            if !compiled.sql.is_empty() {
                sql.push_str(" where ");
                sql.push_str(&compiled.sql);
            }
            bindings = compiled.bindings;
        }

        if let Some(sorts) = criteria.sorts.as_deref().filter(|s| !s.is_empty()) {
            let order = self.sorts.compile(sorts)?;
            if !order.is_empty() {
                sql.push_str(" order by ");
                sql.push_str(&order);
            }
        }

        if paging {
            sql.push_str(&format!(
                " limit {} offset {}",
                criteria.page_size,
                criteria.offset()
            ));
        }

        tracing::debug!(
            query_len = sql.len(),
            bindings = bindings.len(),
            paging,
            "assembled query"
        );
        Ok(QueryResult { sql, bindings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Operation, QueryType, Value, and, leaf, or};
    use crate::dialect::MySql;

    const BASE: &str = "select * from devices";

    #[test]
    fn test_base_only() {
        let result = QueryAssembler::new()
            .assemble(BASE, &QueryCriteria::default(), false)
            .unwrap();
        assert_eq!(result.sql, BASE);
        assert!(result.bindings.is_empty());
    }

    #[test]
    fn test_default_paging() {
        let result = QueryAssembler::new()
            .assemble(BASE, &QueryCriteria::default(), true)
            .unwrap();
        insta::assert_snapshot!(result.sql, @"select * from devices limit 20 offset 0");
    }

    #[test]
    fn test_page_offset() {
        let criteria = QueryCriteria::default().page(2, 20);
        let result = QueryAssembler::new().assemble(BASE, &criteria, true).unwrap();
        assert!(result.sql.ends_with("limit 20 offset 40"));
    }

    #[test]
    fn test_offset_does_not_overflow_u32() {
        let criteria = QueryCriteria::default().page(u32::MAX, u32::MAX);
        assert_eq!(
            criteria.offset(),
            u64::from(u32::MAX) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn test_full_query() {
        let criteria = QueryCriteria::with_filter(and(vec![
            leaf("name", QueryType::Text, Operation::Contains, "Device"),
            or(vec![
                leaf("type.name", QueryType::Text, Operation::In, "[Sensor,Gateway]"),
                leaf("price", QueryType::Numeric, Operation::Between, "[10,99.5]"),
            ]),
        ]))
        .sorts("name=asc,created_utc=desc")
        .page(1, 10);

        let result = QueryAssembler::new().assemble(BASE, &criteria, true).unwrap();
        insta::assert_snapshot!(
            result.sql,
            @r#"select * from devices where ( "name" LIKE @0 and ( "type.name" IN (@1,@2) or "price" BETWEEN @3 AND @4 ) ) order by "name" ASC,"created_utc" DESC limit 10 offset 10"#
        );
        insta::assert_snapshot!(
            serde_json::to_string(&result.bindings).unwrap(),
            @r#"{"0":"%Device%","1":"Sensor","2":"Gateway","3":10.0,"4":99.5}"#
        );
    }

    #[test]
    fn test_mysql_dialect_flows_to_sorts() {
        let criteria = QueryCriteria::with_filter(leaf("name", QueryType::Text, Operation::Eq, "a"))
            .sorts("name=asc");
        let result = QueryAssembler::from_compiler(FilterCompiler::with_dialect(MySql))
            .assemble(BASE, &criteria, false)
            .unwrap();
        insta::assert_snapshot!(result.sql, @"select * from devices where `name` = @0 order by `name` ASC");
    }

    #[test]
    fn test_empty_or_fully_dropped_sorts_omit_order_by() {
        for sorts in ["", "name"] {
            let criteria = QueryCriteria::default().sorts(sorts);
            let result = QueryAssembler::new().assemble(BASE, &criteria, false).unwrap();
            assert_eq!(result.sql, BASE);
        }
    }

    #[test]
    fn test_failures_propagate() {
        let criteria = QueryCriteria::default().sorts("name=sideways");
        assert!(matches!(
            QueryAssembler::new().assemble(BASE, &criteria, true),
            Err(CompileError::InvalidSortOrder(_))
        ));

        let criteria =
            QueryCriteria::with_filter(leaf("bad key", QueryType::Text, Operation::Eq, "a"));
        assert!(matches!(
            QueryAssembler::new().assemble(BASE, &criteria, true),
            Err(CompileError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_criteria_from_json() {
        let json = r#"{
            "filter": {"kind":"leaf","queryKey":"active","queryType":"boolean","operation":"eq","queryValue":true},
            "sorts": "name=desc",
            "pageIndex": 3,
            "pageSize": 5
        }"#;
        let criteria = QueryCriteria::from_json_str(json, &FilterDecoder::new()).unwrap();
        assert_eq!(criteria.page_index, 3);
        assert_eq!(criteria.page_size, 5);
        assert_eq!(criteria.sorts.as_deref(), Some("name=desc"));

        let result = QueryAssembler::new().assemble(BASE, &criteria, true).unwrap();
        assert_eq!(result.bindings.get("0"), Some(&Value::Boolean(true)));
        assert!(result.sql.ends_with("limit 5 offset 15"));
    }

    #[test]
    fn test_criteria_null_filter_and_defaults() {
        let criteria = QueryCriteria::from_json_str(r#"{"filter":null}"#, &FilterDecoder::new()).unwrap();
        assert_eq!(criteria, QueryCriteria::default());
    }

    #[test]
    fn test_criteria_legacy_filter() {
        let json = r#"{"filter":{"or":[{"queryKey":"a","queryType":"numeric","operation":"lt","queryValue":"3"}]}}"#;
        let criteria = QueryCriteria::from_json_str(json, &FilterDecoder::legacy()).unwrap();
        assert_eq!(
            criteria.filter,
            Some(or(vec![leaf("a", QueryType::Numeric, Operation::Lt, "3")]))
        );
    }

    #[test]
    fn test_criteria_invalid_json() {
        assert!(matches!(
            QueryCriteria::from_json_str(r#"{"pageIndex":-1}"#, &FilterDecoder::new()),
            Err(CompileError::InvalidJson(_))
        ));
    }
}
