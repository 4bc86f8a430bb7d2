//! Recursive filter compilation.

use super::operation::{BuildOptions, fill_slots};
use super::param::{Param, ParamAllocator};
use super::types::{Bindings, Compiled, FilterNode, Group, Predicate};
use super::value::{DefaultParsers, ValueParser};
use crate::dialect::{Dialect, Postgres};
use crate::error::{CompileError, Result};

/// Default limit on nested group levels.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Compiles a [`FilterNode`] tree into a parameterised WHERE fragment.
///
/// The compiler holds configuration only; all per-call state lives in the
/// [`ParamAllocator`] the caller passes in, so one compiler can be shared
/// freely across threads.
///
/// # Example
///
/// ```
/// use dynsearch_sql::{FilterCompiler, Operation, ParamAllocator, QueryType, Value, and, leaf};
///
/// let filter = and(vec![
///     leaf("name", QueryType::Text, Operation::Eq, "Device 1"),
///     leaf("price", QueryType::Numeric, Operation::Gt, "10"),
/// ]);
///
/// let mut params = ParamAllocator::new();
/// let compiled = FilterCompiler::new().compile(&filter, &mut params).unwrap();
///
/// assert_eq!(compiled.sql, "( \"name\" = @0 and \"price\" > @1 )");
/// assert_eq!(compiled.bindings.get("1"), Some(&Value::Numeric(10.0)));
/// ```
#[derive(Debug, Clone)]
#[must_use = "builder does nothing until compile() is called"]
pub struct FilterCompiler<D: Dialect = Postgres, P: ValueParser = DefaultParsers> {
    dialect: D,
    parsers: P,
    max_depth: usize,
    escape_like: bool,
}

impl FilterCompiler {
    /// Postgres compiler with the default value parsers.
    pub fn new() -> Self {
        Self::with_dialect(Postgres)
    }
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Dialect> FilterCompiler<D> {
    /// Compiler for the given dialect with the default value parsers.
    pub fn with_dialect(dialect: D) -> Self {
        Self {
            dialect,
            parsers: DefaultParsers,
            max_depth: DEFAULT_MAX_DEPTH,
            escape_like: false,
        }
    }
}

impl<D: Dialect, P: ValueParser> FilterCompiler<D, P> {
    /// Replace the value parsers.
    pub fn parsers<Q: ValueParser>(self, parsers: Q) -> FilterCompiler<D, Q> {
        FilterCompiler {
            dialect: self.dialect,
            parsers,
            max_depth: self.max_depth,
            escape_like: self.escape_like,
        }
    }

    /// Set the maximum number of nested group levels.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Escape `LIKE` metacharacters in pattern operations.
    pub fn escape_like(mut self, escape_like: bool) -> Self {
        self.escape_like = escape_like;
        self
    }

    /// The dialect in use.
    pub const fn dialect(&self) -> &D {
        &self.dialect
    }

    /// The configured depth limit.
    #[must_use]
    pub const fn depth_limit(&self) -> usize {
        self.max_depth
    }

    /// Compile `node`, taking placeholder names from `params`.
    ///
    /// On failure `params` is left untouched, so a caller that shares an
    /// allocator across several fragments never sees gaps from a failed
    /// attempt.
    pub fn compile(&self, node: &FilterNode, params: &mut ParamAllocator) -> Result<Compiled> {
        let mut scratch = ParamAllocator::starting_at(params.peek());
        let compiled = self.compile_node(node, &mut scratch, 0)?;
        params.commit(scratch);

        tracing::debug!(
            dialect = self.dialect.name(),
            fragment_len = compiled.sql.len(),
            bindings = compiled.bindings.len(),
            "compiled filter"
        );
        Ok(compiled)
    }

    /// Compile `node` with a fresh allocator starting at `@0`.
    pub fn compile_root(&self, node: &FilterNode) -> Result<Compiled> {
        self.compile(node, &mut ParamAllocator::new())
    }

    fn compile_node(
        &self,
        node: &FilterNode,
        params: &mut ParamAllocator,
        depth: usize,
    ) -> Result<Compiled> {
        match node {
            FilterNode::Leaf(predicate) => self.compile_leaf(predicate, params),
            FilterNode::Group(group) => self.compile_group(group, params, depth + 1),
        }
    }

    fn compile_leaf(&self, predicate: &Predicate, params: &mut ParamAllocator) -> Result<Compiled> {
        let key = self.dialect.quote_identifier(&predicate.query_key)?;
        let template = predicate.operation.build(
            &key,
            predicate.query_type,
            &predicate.query_value,
            &self.parsers,
            BuildOptions {
                escape_like: self.escape_like,
            },
        )?;

        let names: Vec<Param> = template.values.iter().map(|_| params.allocate()).collect();
        let sql = fill_slots(&template.sql, &names);
        let mut bindings = Bindings::with_capacity(names.len());
        for (param, value) in names.iter().zip(template.values) {
            bindings.insert(param.key(), value);
        }

        tracing::trace!(
            column = %predicate.query_key,
            operation = predicate.operation.code(),
            bindings = bindings.len(),
            "compiled predicate"
        );
        Ok(Compiled { sql, bindings })
    }

    fn compile_group(
        &self,
        group: &Group,
        params: &mut ParamAllocator,
        depth: usize,
    ) -> Result<Compiled> {
        if depth > self.max_depth {
            return Err(CompileError::NestingTooDeep {
                max: self.max_depth,
            });
        }
        if group.filters.is_empty() {
            return Err(CompileError::malformed(format!(
                "'{}' group has no filters",
                group.op.as_sql()
            )));
        }

        let mut parts = Vec::with_capacity(group.filters.len());
        let mut bindings = Bindings::new();
        for child in &group.filters {
            let compiled = self.compile_node(child, params, depth)?;
            parts.push(compiled.sql);
            bindings.append(compiled.bindings);
        }

        let joiner = format!(" {} ", group.op.as_sql());
        Ok(Compiled {
            sql: format!("( {} )", parts.join(&joiner)),
            bindings,
        })
    }
}
