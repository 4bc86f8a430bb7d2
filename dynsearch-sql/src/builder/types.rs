//! Core types for the filter compiler.

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use uuid::Uuid;

/// Declared type of a leaf's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Free text, bound as-is.
    Text,
    /// Floating point number.
    Numeric,
    /// Timestamp without time zone.
    DateTime,
    /// `true` / `false`.
    Boolean,
    /// UUID.
    Guid,
}

impl QueryType {
    /// Every supported type, in wire-name order.
    pub const ALL: [Self; 5] = [
        Self::Text,
        Self::Numeric,
        Self::DateTime,
        Self::Boolean,
        Self::Guid,
    ];

    /// Parse a wire name (`text`, `numeric`, `datetime`, `boolean`, `guid`).
    ///
    /// ```
    /// use dynsearch_sql::QueryType;
    ///
    /// assert_eq!(QueryType::from_name("datetime"), Some(QueryType::DateTime));
    /// assert_eq!(QueryType::from_name("Numeric"), Some(QueryType::Numeric));
    /// assert_eq!(QueryType::from_name("json"), None);
    /// ```
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
    }

    /// Wire name of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Guid => "guid",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How many values an operation binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one scalar value.
    One,
    /// One or more values from a list.
    Many,
    /// A list of exactly this many values.
    Exactly(usize),
}

/// Leaf operations.
///
/// The set is closed: an operation code that is not listed here is rejected
/// with [`CompileError::UnsupportedOperation`](crate::CompileError::UnsupportedOperation)
/// when the filter is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `key = @0`
    Eq,
    /// `key != @0`
    Neq,
    /// `key < @0`
    Lt,
    /// `key <= @0`
    Lte,
    /// `key > @0`
    Gt,
    /// `key >= @0`
    Gte,
    /// `key LIKE @0` with `%text%`
    Contains,
    /// `key NOT LIKE @0` with `%text%`
    NotContains,
    /// `key LIKE @0` with `text%`
    StartsWith,
    /// `key LIKE @0` with `%text`
    EndsWith,
    /// `key IN (@0,…)`
    In,
    /// `key NOT IN (@0,…)`
    NotIn,
    /// `key BETWEEN @0 AND @1`
    Between,
    /// `key NOT BETWEEN @0 AND @1`
    NotBetween,
}

impl Operation {
    /// Every supported operation.
    pub const ALL: [Self; 14] = [
        Self::Eq,
        Self::Neq,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::In,
        Self::NotIn,
        Self::Between,
        Self::NotBetween,
    ];

    /// Look up an operation by its wire code.
    ///
    /// ```
    /// use dynsearch_sql::Operation;
    ///
    /// assert_eq!(Operation::from_code("sw"), Some(Operation::StartsWith));
    /// assert_eq!(Operation::from_code("nbetween"), Some(Operation::NotBetween));
    /// assert_eq!(Operation::from_code("regex"), None);
    /// ```
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Wire code of this operation.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Contains => "contains",
            Self::NotContains => "ncontains",
            Self::StartsWith => "sw",
            Self::EndsWith => "ew",
            Self::In => "in",
            Self::NotIn => "nin",
            Self::Between => "between",
            Self::NotBetween => "nbetween",
        }
    }

    /// Number of values this operation binds.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::In | Self::NotIn => Arity::Many,
            Self::Between | Self::NotBetween => Arity::Exactly(2),
            _ => Arity::One,
        }
    }

    /// Whether the value is a `LIKE` pattern built from text.
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Logical operators for filter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
}

impl LogicalOp {
    /// Normalise a combinator key: one optional leading marker such as `$`
    /// is stripped and the rest is matched case-insensitively.
    ///
    /// ```
    /// use dynsearch_sql::LogicalOp;
    ///
    /// assert_eq!(LogicalOp::from_key("$and"), Some(LogicalOp::And));
    /// assert_eq!(LogicalOp::from_key("OR"), Some(LogicalOp::Or));
    /// assert_eq!(LogicalOp::from_key("$xor"), None);
    /// ```
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key
            .strip_prefix(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(key);
        if key.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if key.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    /// Keyword used to join compiled children.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Raw, unparsed leaf value as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// A single string. For list operations it may carry the bracket
    /// encoding `[a,b]`.
    Scalar(String),
    /// A first-class list of raw elements.
    List(Vec<String>),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for RawValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|s| (*s).to_string()).collect())
    }
}

/// A leaf predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Column name or dotted path; validated and quoted at compile time.
    pub query_key: String,
    /// Declared type of `query_value`.
    pub query_type: QueryType,
    /// What to compare with.
    pub operation: Operation,
    /// The raw value(s).
    pub query_value: RawValue,
}

/// An AND/OR grouping of child filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// How children are combined.
    pub op: LogicalOp,
    /// Children, compiled in order.
    pub filters: Vec<FilterNode>,
}

/// A filter tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// A single predicate.
    Leaf(Predicate),
    /// A combinator over child nodes.
    Group(Group),
}

impl FilterNode {
    /// Number of group levels in this tree. A lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Group(group) => 1 + group.filters.iter().map(Self::depth).max().unwrap_or(0),
        }
    }
}

/// Helper function to create a leaf filter.
///
/// ```
/// use dynsearch_sql::{leaf, Operation, QueryType};
///
/// let node = leaf("name", QueryType::Text, Operation::Eq, "Device 1");
/// assert_eq!(node.depth(), 0);
/// ```
pub fn leaf(
    query_key: impl Into<String>,
    query_type: QueryType,
    operation: Operation,
    query_value: impl Into<RawValue>,
) -> FilterNode {
    FilterNode::Leaf(Predicate {
        query_key: query_key.into(),
        query_type,
        operation,
        query_value: query_value.into(),
    })
}

/// Helper function to create an AND group.
#[must_use]
pub fn and(filters: Vec<FilterNode>) -> FilterNode {
    FilterNode::Group(Group {
        op: LogicalOp::And,
        filters,
    })
}

/// Helper function to create an OR group.
#[must_use]
pub fn or(filters: Vec<FilterNode>) -> FilterNode {
    FilterNode::Group(Group {
        op: LogicalOp::Or,
        filters,
    })
}

/// A parsed, native-typed value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value (also used for `LIKE` patterns).
    Text(String),
    /// Numeric value.
    Numeric(f64),
    /// Timestamp value.
    DateTime(NaiveDateTime),
    /// Boolean value.
    Boolean(bool),
    /// UUID value.
    Guid(Uuid),
}

impl Value {
    /// The text payload, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Numeric(n) => serializer.serialize_f64(*n),
            Self::DateTime(dt) => dt.serialize(serializer),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Guid(id) => id.serialize(serializer),
        }
    }
}

/// Ordered binding table: placeholder key (`"0"`, `"1"`, …) to value.
///
/// Iteration and serialisation follow insertion order, which is the
/// depth-first, left-to-right order of the source tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Keys arrive from a single allocator, so they are already unique.
    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.entries.push((key, value));
    }

    pub(crate) fn append(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Look up a value by placeholder key (without the `@`).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Number of bound values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Placeholder keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A compiled WHERE fragment and its bindings.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "Compiled must be used to build the query"]
pub struct Compiled {
    /// Fragment containing `@N` placeholders.
    pub sql: String,
    /// Values for each placeholder.
    pub bindings: Bindings,
}

/// Query result with SQL string and bindings.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// Full query text.
    pub sql: String,
    /// Values for each placeholder.
    pub bindings: Bindings,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDir {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SortDir {
    /// Canonical upper-case keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Sort field with direction. `column` has already passed the identifier
/// whitelist but is not yet quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    /// Column name or dotted path.
    pub column: String,
    /// Direction.
    pub dir: SortDir,
}
