use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::error::{DbError, Result};
use crate::pool::DbPool;
use crate::schema::TableDescriptor;
use crate::upsert::{build_insert, ordered_columns};
use crate::value::{CompiledStatement, Row, SqlValue};

/// Declared capability of a table accessor. Enforced as a precondition on
/// every mutating call, not as a database-level grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Reader,
    Writer,
}

/// Per-table facade over a pooled connection: raw insert, update and
/// upsert, gated by role. Immutable after construction; create one per
/// table, typically once per process.
///
/// Every write stamps `updated_at` with the current Unix timestamp before
/// the statement is built — callers cannot opt out, and a caller-supplied
/// value is overwritten. Accessed tables are expected to carry an
/// `updated_at` integer column.
#[derive(Debug, Clone)]
pub struct Table {
    pool: DbPool,
    descriptor: TableDescriptor,
    role: Role,
}

impl Table {
    pub fn new(pool: DbPool, descriptor: TableDescriptor, role: Role) -> Self {
        Self {
            pool,
            descriptor,
            role,
        }
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Insert one row. Returns the number of affected rows.
    pub async fn insert(&self, mut row: Row) -> Result<u64> {
        self.check_writer("insert")?;
        stamp_updated_at(&mut row);

        let rows = [row];
        let columns = ordered_columns(&self.descriptor, &rows)?;
        let stmt = build_insert(self.pool.dialect(), &self.descriptor, &columns, &rows);
        self.execute(stmt).await
    }

    /// Update rows matching the filter (column equality, ANDed). An empty
    /// filter updates every row. Returns the number of affected rows.
    pub async fn update(&self, filter: Row, mut row: Row) -> Result<u64> {
        self.check_writer("update")?;
        stamp_updated_at(&mut row);

        let stmt = self.build_update(&filter, &row)?;
        self.execute(stmt).await
    }

    /// Insert one row, or resolve a unique/primary-key conflict according
    /// to the pool's dialect (partial-column update on MySQL, full-row
    /// replace on SQLite).
    pub async fn upsert(&self, row: Row) -> Result<u64> {
        self.upsert_many(vec![row]).await
    }

    /// Batch upsert, submitted as one atomic statement. All rows must
    /// share the first row's column set.
    pub async fn upsert_many(&self, mut rows: Vec<Row>) -> Result<u64> {
        self.check_writer("upsert")?;
        for row in &mut rows {
            stamp_updated_at(row);
        }

        let compiler = self.pool.dialect().upsert_compiler();
        let stmt = compiler.compile(&self.descriptor, &rows)?;
        self.execute(stmt).await
    }

    fn check_writer(&self, operation: &str) -> Result<()> {
        if self.role != Role::Writer {
            return Err(DbError::role_violation(self.descriptor.name(), operation));
        }
        Ok(())
    }

    fn build_update(&self, filter: &Row, row: &Row) -> Result<CompiledStatement> {
        let dialect = self.pool.dialect();
        let set_columns = ordered_columns(&self.descriptor, std::slice::from_ref(row))?;
        for key in filter.keys() {
            if !self.descriptor.has_column(key) {
                return Err(DbError::unknown_column(self.descriptor.name(), key));
            }
        }

        let assignments = set_columns
            .iter()
            .map(|c| format!("{} = ?", dialect.quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote_ident(self.descriptor.name()),
            assignments
        );

        let filter_columns: Vec<&str> = self
            .descriptor
            .columns()
            .iter()
            .filter(|c| filter.contains_key(c.as_str()))
            .map(String::as_str)
            .collect();
        if !filter_columns.is_empty() {
            let predicate = filter_columns
                .iter()
                .map(|c| format!("{} = ?", dialect.quote_ident(c)))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }

        let mut params: Vec<SqlValue> = set_columns
            .iter()
            .map(|c| row.get(*c).map(SqlValue::from_json).unwrap_or(SqlValue::Null))
            .collect();
        params.extend(
            filter_columns
                .iter()
                .map(|c| filter.get(*c).map(SqlValue::from_json).unwrap_or(SqlValue::Null)),
        );

        Ok(CompiledStatement { sql, params })
    }

    async fn execute(&self, stmt: CompiledStatement) -> Result<u64> {
        debug!(table = self.descriptor.name(), "executing write");
        self.pool.execute(&stmt.sql, &stmt.params).await
    }
}

/// Non-optional side effect of every mutating call: overwrite `updated_at`
/// with the current Unix timestamp (seconds).
fn stamp_updated_at(row: &mut Row) {
    row.insert(
        "updated_at".to_string(),
        Value::from(Utc::now().timestamp()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Lazy pool against a host that does not exist: any test that reaches
    /// the network would fail loudly instead of passing by accident.
    fn mysql_table(columns: &[&str], role: Role) -> Table {
        let config = crate::config::DbConfig {
            username: "u".into(),
            password: "p".into(),
            host: "host.invalid".into(),
            port: "3306".into(),
            database: "nogi".into(),
        };
        let (pool, _) = crate::pool::connect_lazy(&config, &Default::default()).unwrap();
        Table::new(pool, TableDescriptor::new("users", columns.to_vec()), role)
    }

    #[test]
    fn test_stamp_overwrites_caller_value() {
        let mut r = row(&[("updated_at", json!(1))]);
        stamp_updated_at(&mut r);

        let stamped = r["updated_at"].as_i64().unwrap();
        let now = Utc::now().timestamp();
        assert!((now - stamped).abs() <= 2);
    }

    #[tokio::test]
    async fn test_reader_role_fails_before_io() {
        // A reader-role accessor must fail on the precondition, never on
        // the connection.
        let table = mysql_table(&["id", "updated_at"], Role::Reader);

        for result in [
            table.insert(row(&[("id", json!(1))])).await,
            table.update(Row::new(), row(&[("id", json!(1))])).await,
            table.upsert(row(&[("id", json!(1))])).await,
        ] {
            let err = result.unwrap_err();
            assert!(matches!(err, DbError::RoleViolation { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn test_update_statement_shape() {
        let table = mysql_table(&["id", "name", "updated_at"], Role::Writer);

        let stmt = table
            .build_update(
                &row(&[("id", json!(7))]),
                &row(&[("name", json!("rena")), ("updated_at", json!(123))]),
            )
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `users` SET `name` = ?, `updated_at` = ? WHERE `id` = ?"
        );
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Text("rena".into()),
                SqlValue::Int(123),
                SqlValue::Int(7)
            ]
        );
    }

    #[tokio::test]
    async fn test_update_without_filter_has_no_where() {
        let table = mysql_table(&["id", "name", "updated_at"], Role::Writer);

        let stmt = table
            .build_update(&Row::new(), &row(&[("name", json!("rena"))]))
            .unwrap();
        assert!(!stmt.sql.contains("WHERE"));
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_filter_column() {
        let table = mysql_table(&["id", "updated_at"], Role::Writer);

        let err = table
            .build_update(&row(&[("email", json!("x"))]), &row(&[("id", json!(1))]))
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { .. }));
    }
}
