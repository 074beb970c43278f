//! Dialect-specific upsert statement compilation.
//!
//! Both compilers start from the same multi-row `INSERT INTO` and then
//! apply their dialect's conflict handling. MySQL appends an
//! `ON DUPLICATE KEY UPDATE` clause that rewrites exactly the submitted
//! columns to the values that were about to be inserted. SQLite rewrites
//! the leading keyword to `INSERT OR REPLACE INTO`, which deletes and
//! recreates a conflicting row rather than updating columns in place.
//! The two dialects therefore diverge on conflict: partial-column update
//! on MySQL, full-row replace on SQLite. Callers depend on both behaviors,
//! so the divergence is preserved, not unified.

use crate::dialect::Dialect;
use crate::error::{DbError, Result};
use crate::schema::TableDescriptor;
use crate::value::{CompiledStatement, Row, SqlValue};

/// Compiles an "insert, or resolve on key conflict" statement for one
/// dialect. Which uniqueness constraint triggers the conflict path is the
/// database's business; the compiler only shapes the SQL.
pub trait UpsertCompiler: Send + Sync {
    fn compile(&self, table: &TableDescriptor, rows: &[Row]) -> Result<CompiledStatement>;
}

pub struct MySqlUpsert;

impl UpsertCompiler for MySqlUpsert {
    fn compile(&self, table: &TableDescriptor, rows: &[Row]) -> Result<CompiledStatement> {
        let columns = ordered_columns(table, rows)?;
        let mut stmt = build_insert(Dialect::MySql, table, &columns, rows);

        // Only columns the caller actually supplied participate in the
        // conflict-update clause; absent columns are left untouched.
        if !columns.is_empty() {
            let updates = columns
                .iter()
                .map(|c| {
                    let quoted = Dialect::MySql.quote_ident(c);
                    format!("{} = VALUES({})", quoted, quoted)
                })
                .collect::<Vec<_>>()
                .join(", ");
            stmt.sql.push_str(" ON DUPLICATE KEY UPDATE ");
            stmt.sql.push_str(&updates);
        }

        Ok(stmt)
    }
}

pub struct SqliteUpsert;

impl UpsertCompiler for SqliteUpsert {
    fn compile(&self, table: &TableDescriptor, rows: &[Row]) -> Result<CompiledStatement> {
        let columns = ordered_columns(table, rows)?;

        // SQLite rejects the column-less `() VALUES ()` form; a row with
        // no columns degenerates to a plain default-values replace.
        if columns.is_empty() {
            return Ok(CompiledStatement {
                sql: format!(
                    "INSERT OR REPLACE INTO {} DEFAULT VALUES",
                    Dialect::Sqlite.quote_ident(table.name())
                ),
                params: Vec::new(),
            });
        }

        let mut stmt = build_insert(Dialect::Sqlite, table, &columns, rows);
        stmt.sql = stmt.sql.replacen("INSERT INTO", "INSERT OR REPLACE INTO", 1);
        Ok(stmt)
    }
}

/// Column set for a write: the table descriptor's order filtered to the
/// first row's keys. Every row in a batch must carry exactly that key set.
pub(crate) fn ordered_columns<'a>(table: &'a TableDescriptor, rows: &[Row]) -> Result<Vec<&'a str>> {
    let first = rows
        .first()
        .ok_or_else(|| DbError::empty_batch(table.name()))?;

    for key in first.keys() {
        if !table.has_column(key) {
            return Err(DbError::unknown_column(table.name(), key));
        }
    }

    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.len() != first.len() || !row.keys().all(|k| first.contains_key(k)) {
            return Err(DbError::heterogeneous_batch(table.name(), index));
        }
    }

    Ok(table
        .columns()
        .iter()
        .filter(|c| first.contains_key(c.as_str()))
        .map(String::as_str)
        .collect())
}

/// Plain multi-row `INSERT INTO` with `?` placeholders, parameters in
/// row-major order.
pub(crate) fn build_insert(
    dialect: Dialect,
    table: &TableDescriptor,
    columns: &[&str],
    rows: &[Row],
) -> CompiledStatement {
    let column_list = columns
        .iter()
        .map(|c| dialect.quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholder_row = format!(
        "({})",
        columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
    );
    let values_list = rows
        .iter()
        .map(|_| placeholder_row.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        dialect.quote_ident(table.name()),
        column_list,
        values_list
    );

    let params = rows
        .iter()
        .flat_map(|row| {
            columns
                .iter()
                .map(|c| row.get(*c).map(SqlValue::from_json).unwrap_or(SqlValue::Null))
        })
        .collect();

    CompiledStatement { sql, params }
}
