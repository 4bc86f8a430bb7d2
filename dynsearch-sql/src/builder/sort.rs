//! Sort string compilation.

use super::types::SortField;
use crate::dialect::{Dialect, Postgres};
use crate::error::Result;
use crate::validate::validate_sort_order;

/// Compiles `column=direction` lists into an ORDER BY body.
///
/// Pairs are separated by `,`. A pair that does not split on `=` into exactly
/// two parts is skipped with a warning; every retained column must pass the
/// identifier whitelist and every direction must be `asc` or `desc`.
///
/// ```
/// use dynsearch_sql::SortCompiler;
///
/// let sql = SortCompiler::new().compile("name=asc,created_utc=desc").unwrap();
/// assert_eq!(sql, "\"name\" ASC,\"created_utc\" DESC");
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[must_use = "builder does nothing until compile() is called"]
pub struct SortCompiler<D: Dialect = Postgres> {
    dialect: D,
}

impl SortCompiler {
    /// Postgres sort compiler.
    pub const fn new() -> Self {
        Self { dialect: Postgres }
    }
}

impl<D: Dialect> SortCompiler<D> {
    /// Sort compiler for the given dialect.
    pub const fn with_dialect(dialect: D) -> Self {
        Self { dialect }
    }

    /// Validate a sort string into fields, in input order.
    pub fn parse(&self, sorts: &str) -> Result<Vec<SortField>> {
        Ok(self
            .quoted_fields(sorts)?
            .into_iter()
            .map(|(field, _)| field)
            .collect())
    }

    /// Compile a sort string into `"col" ASC,"col2" DESC`.
    ///
    /// Returns an empty string when no pair survives.
    pub fn compile(&self, sorts: &str) -> Result<String> {
        let parts: Vec<String> = self
            .quoted_fields(sorts)?
            .into_iter()
            .map(|(field, quoted)| format!("{quoted} {}", field.dir.as_sql()))
            .collect();

        let sql = parts.join(",");
        tracing::debug!(
            dialect = self.dialect.name(),
            fields = parts.len(),
            "compiled sort"
        );
        Ok(sql)
    }

    /// Each retained field with its quoted column.
    fn quoted_fields(&self, sorts: &str) -> Result<Vec<(SortField, String)>> {
        let mut fields = Vec::new();
        for pair in sorts.split(',') {
            if pair.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = pair.split('=').collect();
            let [column, dir] = parts.as_slice() else {
                tracing::warn!(pair, "skipping malformed sort pair");
                continue;
            };
            let column = column.trim();
            let quoted = self.dialect.quote_identifier(column)?;
            let field = SortField {
                column: column.to_string(),
                dir: validate_sort_order(dir.trim())?,
            };
            fields.push((field, quoted));
        }
        Ok(fields)
    }
}
