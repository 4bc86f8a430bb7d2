//! Runtime JSON decoding of filter trees.
//!
//! Two wire formats are understood, and the caller picks one explicitly:
//!
//! | Format | Group | Leaf |
//! |--------|-------|------|
//! | [`WireFormat::Tagged`] (default) | `{"kind":"group","op":"and","filters":[..]}` | `{"kind":"leaf","queryKey":..,"queryType":..,"operation":..,"queryValue":..}` |
//! | [`WireFormat::Legacy`] | `{"and":[..]}` (exactly one key) | an object with more than one key |
//!
//! Field names are matched case-insensitively. `queryValue` may be a string,
//! an array (of strings, numbers or booleans), a number or a boolean.
//!
//! # Quick Start
//!
//! ```
//! use dynsearch_sql::{FilterDecoder, FilterNode};
//!
//! let node = FilterNode::parse(r#"{
//!     "kind": "group", "op": "or", "filters": [
//!         {"kind":"leaf","queryKey":"name","queryType":"text","operation":"eq","queryValue":"a"},
//!         {"kind":"leaf","queryKey":"price","queryType":"numeric","operation":"in","queryValue":[1,2]}
//!     ]
//! }"#).unwrap();
//! assert_eq!(node.depth(), 1);
//!
//! let legacy = FilterDecoder::legacy()
//!     .decode_str(r#"{"$and":[{"queryKey":"name","queryType":"text","operation":"eq","queryValue":"a"}]}"#)
//!     .unwrap();
//! assert_eq!(legacy.depth(), 1);
//! ```

use super::filter::DEFAULT_MAX_DEPTH;
use super::types::{FilterNode, Group, LogicalOp, Operation, Predicate, QueryType, RawValue};
use crate::error::{CompileError, Result};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// Which JSON shape filter nodes arrive in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Nodes carry an explicit `kind` discriminant.
    #[default]
    Tagged,
    /// Leaf or group is inferred from the number of keys.
    Legacy,
}

/// Decodes JSON into a [`FilterNode`] tree.
#[derive(Debug, Clone, Copy)]
#[must_use = "decoder does nothing until decode() is called"]
pub struct FilterDecoder {
    format: WireFormat,
    max_depth: usize,
}

impl Default for FilterDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterDecoder {
    /// Tagged-format decoder with the default depth limit.
    pub const fn new() -> Self {
        Self {
            format: WireFormat::Tagged,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Legacy-format decoder with the default depth limit.
    pub const fn legacy() -> Self {
        Self::new().format(WireFormat::Legacy)
    }

    /// Set the wire format.
    pub const fn format(mut self, format: WireFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the maximum number of nested group levels.
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decode from a JSON string.
    ///
    /// # Errors
    ///
    /// [`CompileError::InvalidJson`] if the text is not JSON, otherwise any
    /// error [`decode`](Self::decode) returns.
    pub fn decode_str(&self, json: &str) -> Result<FilterNode> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        self.decode(&value)
    }

    /// Decode from raw JSON bytes, such as a request body.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<FilterNode> {
        let value: JsonValue =
            serde_json::from_slice(bytes).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        self.decode(&value)
    }

    /// Decode from an already-parsed JSON value.
    pub fn decode(&self, json: &JsonValue) -> Result<FilterNode> {
        self.decode_node(json, 0)
    }

    fn decode_node(&self, json: &JsonValue, depth: usize) -> Result<FilterNode> {
        let obj = json
            .as_object()
            .ok_or_else(|| CompileError::malformed("filter node must be a JSON object"))?;

        match self.format {
            WireFormat::Tagged => self.decode_tagged(obj, depth),
            WireFormat::Legacy => self.decode_legacy(obj, depth),
        }
    }

    fn decode_tagged(&self, obj: &Map<String, JsonValue>, depth: usize) -> Result<FilterNode> {
        let kind = required_str(obj, "kind")?;
        if kind.eq_ignore_ascii_case("leaf") {
            decode_predicate(obj).map(FilterNode::Leaf)
        } else if kind.eq_ignore_ascii_case("group") {
            let op_key = required_str(obj, "op")?;
            let op = LogicalOp::from_key(op_key)
                .ok_or_else(|| CompileError::InvalidLogicalOperator(op_key.to_string()))?;
            let filters = field(obj, "filters")
                .ok_or_else(|| CompileError::malformed("group is missing 'filters'"))?;
            self.decode_group(op, filters, depth + 1)
        } else {
            Err(CompileError::malformed(format!("unknown node kind '{kind}'")))
        }
    }

    fn decode_legacy(&self, obj: &Map<String, JsonValue>, depth: usize) -> Result<FilterNode> {
        match obj.len() {
            0 => Err(CompileError::malformed("filter node is empty")),
            1 => {
                let Some((key, children)) = obj.iter().next() else {
                    return Err(CompileError::malformed("filter node is empty"));
                };
                let op = LogicalOp::from_key(key)
                    .ok_or_else(|| CompileError::InvalidLogicalOperator(key.clone()))?;
                self.decode_group(op, children, depth + 1)
            },
            _ => decode_predicate(obj).map(FilterNode::Leaf),
        }
    }

    fn decode_group(
        &self,
        op: LogicalOp,
        children: &JsonValue,
        depth: usize,
    ) -> Result<FilterNode> {
        if depth > self.max_depth {
            return Err(CompileError::NestingTooDeep {
                max: self.max_depth,
            });
        }
        let items = children
            .as_array()
            .ok_or_else(|| CompileError::malformed(format!("'{}' expects an array", op.as_sql())))?;
        if items.is_empty() {
            return Err(CompileError::malformed(format!(
                "'{}' group has no filters",
                op.as_sql()
            )));
        }

        let filters = items
            .iter()
            .map(|child| self.decode_node(child, depth))
            .collect::<Result<Vec<_>>>()?;
        Ok(FilterNode::Group(Group { op, filters }))
    }
}

impl FilterNode {
    /// Decode a tagged-format node from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`FilterDecoder::decode_str`].
    pub fn parse(json: &str) -> Result<Self> {
        FilterDecoder::new().decode_str(json)
    }

    /// Decode a tagged-format node from a parsed JSON value.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        FilterDecoder::new().decode(json)
    }

    /// Decode a legacy-format node from a parsed JSON value.
    pub fn from_legacy_json(json: &JsonValue) -> Result<Self> {
        FilterDecoder::legacy().decode(json)
    }
}

/// Case-insensitive field lookup.
fn field<'a>(obj: &'a Map<String, JsonValue>, name: &str) -> Option<&'a JsonValue> {
    obj.get(name).or_else(|| {
        obj.iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v))
    })
}

fn required_str<'a>(obj: &'a Map<String, JsonValue>, name: &str) -> Result<&'a str> {
    match field(obj, name) {
        Some(JsonValue::String(s)) => Ok(s),
        Some(_) => Err(CompileError::malformed(format!("'{name}' must be a string"))),
        None => Err(CompileError::malformed(format!("missing '{name}'"))),
    }
}

fn decode_predicate(obj: &Map<String, JsonValue>) -> Result<Predicate> {
    let query_key = required_str(obj, "queryKey")?;

    let type_name = required_str(obj, "queryType")?;
    let query_type = QueryType::from_name(type_name)
        .ok_or_else(|| CompileError::UnsupportedQueryType(type_name.to_string()))?;

    let code = required_str(obj, "operation")?;
    let operation = Operation::from_code(code)
        .ok_or_else(|| CompileError::UnsupportedOperation(code.to_string()))?;

    let query_value = match field(obj, "queryValue") {
        None | Some(JsonValue::Null) => {
            return Err(CompileError::malformed(format!(
                "predicate on '{query_key}' is missing 'queryValue'"
            )));
        },
        Some(value) => decode_raw_value(value)?,
    };

    Ok(Predicate {
        query_key: query_key.to_string(),
        query_type,
        operation,
        query_value,
    })
}

fn decode_raw_value(json: &JsonValue) -> Result<RawValue> {
    match json {
        JsonValue::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Result<Vec<_>>>()
            .map(RawValue::List),
        other => scalar_text(other).map(RawValue::Scalar),
    }
}

fn scalar_text(json: &JsonValue) -> Result<String> {
    match json {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null => Err(CompileError::malformed("'queryValue' cannot contain null")),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(CompileError::malformed(
            "'queryValue' must be a string, number, boolean or flat array",
        )),
    }
}
