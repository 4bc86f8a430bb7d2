//! SQL dialect implementations for Postgres and MySQL.
//!
//! The compiler core is dialect-neutral. The one policy a dialect supplies is
//! how a validated identifier is quoted. Placeholders are always `@N`.

use crate::error::Result;
use crate::validate::quote_identifier_with;

/// SQL dialect trait for database-specific identifier quoting.
pub trait Dialect: Clone + Copy {
    /// The character that delimits a quoted identifier.
    fn quote_char(&self) -> char;

    /// Validate an identifier and quote it for this dialect.
    ///
    /// Fails with [`CompileError::InvalidIdentifier`](crate::CompileError::InvalidIdentifier)
    /// when the identifier is not on the whitelist.
    fn quote_identifier(&self, ident: &str) -> Result<String> {
        quote_identifier_with(ident, self.quote_char())
    }

    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;
}

/// Postgres dialect: `"ident"` with embedded `"` doubled.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn quote_char(&self) -> char {
        '"'
    }

    #[inline]
    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// MySQL dialect: `` `ident` `` with embedded backticks doubled.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct MySql;

impl Dialect for MySql {
    #[inline]
    fn quote_char(&self) -> char {
        '`'
    }

    #[inline]
    fn name(&self) -> &'static str {
        "mysql"
    }
}
