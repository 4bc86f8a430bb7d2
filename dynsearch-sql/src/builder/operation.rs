//! Per-operation template builders.
//!
//! A builder turns one predicate (with its key already quoted) into a
//! [`Template`]: SQL text holding one `{i}` slot per value, plus the parsed
//! values in slot order. Builders never allocate placeholder names; the
//! compiler substitutes slots with `@N` names afterwards.

use super::param::Param;
use super::types::{Arity, Operation, QueryType, RawValue, Value};
use super::value::{ValueParser, split_bracket_list};
use crate::error::{CompileError, Result};
use std::fmt::Write;

/// SQL text with numbered value slots and the values that fill them.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// SQL containing `{0}`, `{1}`, … slots.
    pub sql: String,
    /// Values in slot order.
    pub values: Vec<Value>,
}

/// Token marking value slot `i` in a template.
///
/// Braces can never appear in a validated identifier, so a slot token cannot
/// collide with the quoted key that shares the template.
#[must_use]
pub(crate) fn slot(i: usize) -> String {
    format!("{{{i}}}")
}

/// Replace every `{i}` slot in `sql` with `params[i]`, in one pass.
///
/// Text that is not a slot token for a known index is copied unchanged.
pub(crate) fn fill_slots(sql: &str, params: &[Param]) -> String {
    let mut out = String::with_capacity(sql.len() + params.len() * 2);
    let mut rest = sql;
    while let Some((head, tail)) = rest.split_once('{') {
        out.push_str(head);
        let filled = tail.split_once('}').and_then(|(index, after)| {
            let param = params.get(index.parse::<usize>().ok()?)?;
            Some((param, after))
        });
        match filled {
            Some((param, after)) => {
                let _ = write!(out, "{param}");
                rest = after;
            },
            None => {
                out.push('{');
                rest = tail;
            },
        }
    }
    out.push_str(rest);
    out
}

/// Options that change how pattern values are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Backslash-escape `%`, `_` and `\` in text before adding wildcards.
    pub escape_like: bool,
}

impl Operation {
    /// Build the template for this operation.
    ///
    /// `key` must already be validated and quoted.
    ///
    /// ```
    /// use dynsearch_sql::{BuildOptions, DefaultParsers, Operation, QueryType, RawValue, Value};
    ///
    /// let t = Operation::Between
    ///     .build(
    ///         "\"price\"",
    ///         QueryType::Numeric,
    ///         &RawValue::from("[10.5,99.99]"),
    ///         &DefaultParsers,
    ///         BuildOptions::default(),
    ///     )
    ///     .unwrap();
    /// assert_eq!(t.sql, "\"price\" BETWEEN {0} AND {1}");
    /// assert_eq!(t.values, vec![Value::Numeric(10.5), Value::Numeric(99.99)]);
    /// ```
    pub fn build<P: ValueParser + ?Sized>(
        self,
        key: &str,
        query_type: QueryType,
        raw: &RawValue,
        parsers: &P,
        options: BuildOptions,
    ) -> Result<Template> {
        match self.arity() {
            Arity::One => {
                let raw = single(self, query_type, raw)?;
                if self.is_pattern() {
                    Ok(build_pattern(self, key, raw, options))
                } else {
                    let value = parsers.parse(query_type, raw)?;
                    Ok(Template {
                        sql: format!("{key} {} {}", comparison(self), slot(0)),
                        values: vec![value],
                    })
                }
            },
            Arity::Many => {
                let values = parse_list(query_type, raw, parsers)?;
                if values.is_empty() {
                    return Err(CompileError::value_format(
                        query_type,
                        describe(raw),
                        format!("'{self}' requires at least one value"),
                    ));
                }
                let slots: Vec<String> = (0..values.len()).map(slot).collect();
                let keyword = if self == Self::NotIn { "NOT IN" } else { "IN" };
                Ok(Template {
                    sql: format!("{key} {keyword} ({})", slots.join(",")),
                    values,
                })
            },
            Arity::Exactly(n) => {
                let values = parse_list(query_type, raw, parsers)?;
                if values.len() != n {
                    return Err(CompileError::value_format(
                        query_type,
                        describe(raw),
                        format!("'{self}' requires exactly {n} values, got {}", values.len()),
                    ));
                }
                let keyword = if self == Self::NotBetween {
                    "NOT BETWEEN"
                } else {
                    "BETWEEN"
                };
                Ok(Template {
                    sql: format!("{key} {keyword} {} AND {}", slot(0), slot(1)),
                    values,
                })
            },
        }
    }
}

fn comparison(op: Operation) -> &'static str {
    match op {
        Operation::Neq => "!=",
        Operation::Lt => "<",
        Operation::Lte => "<=",
        Operation::Gt => ">",
        Operation::Gte => ">=",
        _ => "=",
    }
}

fn single<'a>(op: Operation, query_type: QueryType, raw: &'a RawValue) -> Result<&'a str> {
    match raw {
        RawValue::Scalar(s) => Ok(s),
        RawValue::List(_) => Err(CompileError::value_format(
            query_type,
            describe(raw),
            format!("'{op}' requires a single value, not a list"),
        )),
    }
}

fn parse_list<P: ValueParser + ?Sized>(
    query_type: QueryType,
    raw: &RawValue,
    parsers: &P,
) -> Result<Vec<Value>> {
    match raw {
        RawValue::Scalar(s) => split_bracket_list(s)
            .into_iter()
            .map(|item| parsers.parse(query_type, item))
            .collect(),
        RawValue::List(items) => items
            .iter()
            .map(|item| parsers.parse(query_type, item))
            .collect(),
    }
}

fn build_pattern(op: Operation, key: &str, raw: &str, options: BuildOptions) -> Template {
    let text = if options.escape_like {
        escape_like_pattern(raw)
    } else {
        raw.to_string()
    };
    let pattern = match op {
        Operation::StartsWith => format!("{text}%"),
        Operation::EndsWith => format!("%{text}"),
        _ => format!("%{text}%"),
    };
    let keyword = if op == Operation::NotContains {
        "NOT LIKE"
    } else {
        "LIKE"
    };
    Template {
        sql: format!("{key} {keyword} {}", slot(0)),
        values: vec![Value::Text(pattern)],
    }
}

/// Escape SQL `LIKE` metacharacters (`%`, `_`, `\`) in user text.
///
/// ```
/// use dynsearch_sql::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("100% match_test"), "100\\% match\\_test");
/// ```
#[must_use]
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn describe(raw: &RawValue) -> String {
    match raw {
        RawValue::Scalar(s) => s.clone(),
        RawValue::List(items) => format!("[{}]", items.join(",")),
    }
}
