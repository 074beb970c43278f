use std::fmt;
use std::str::FromStr;

use crate::error::DbError;
use crate::upsert::{MySqlUpsert, SqliteUpsert, UpsertCompiler};

/// SQL dialect targeted by a pool or a compiled statement.
///
/// Dispatch is a plain enum rather than a runtime registration mechanism:
/// adding a dialect means adding a variant and an `UpsertCompiler` impl,
/// and the compiler never silently falls back to a generic insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// The upsert compiler for this dialect.
    pub fn upsert_compiler(&self) -> &'static dyn UpsertCompiler {
        match self {
            Dialect::MySql => &MySqlUpsert,
            Dialect::Sqlite => &SqliteUpsert,
        }
    }

    /// Quote an identifier (table or column name) for this dialect.
    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", ident),
            Dialect::Sqlite => format!("\"{}\"", ident),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(DbError::unsupported_dialect(other)),
        }
    }
}
