use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::{DbConfig, PoolTuning};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::json;
use crate::schema::SchemaRegistry;
use crate::value::SqlValue;

/// A bounded connection pool to one database endpoint, tagged by dialect.
///
/// Cloning is cheap; clones share the same underlying pool. All pool
/// behavior (bounded size, acquire timeout, lifetime-based recycling) is
/// sqlx's — this type only adds dialect-aware parameter binding.
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

/// Build a lazy MySQL pool plus an empty schema registry from endpoint
/// configuration. No network I/O happens here; bad credentials or an
/// unreachable host surface at the first statement execution.
pub fn connect_lazy(config: &DbConfig, tuning: &PoolTuning) -> Result<(DbPool, SchemaRegistry)> {
    let pool = MySqlPoolOptions::new()
        .max_connections(tuning.max_connections)
        .acquire_timeout(tuning.acquire_timeout)
        .max_lifetime(tuning.max_lifetime)
        .connect_lazy(&config.mysql_url())?;

    info!(
        host = %config.host,
        database = %config.database,
        max_connections = tuning.max_connections,
        "created lazy mysql pool"
    );
    Ok((DbPool::MySql(pool), SchemaRegistry::new()))
}

impl DbPool {
    /// Open (creating if missing) an embedded SQLite database with the
    /// same pool tuning the MySQL path uses.
    pub async fn sqlite<P: AsRef<Path>>(db_path: P, tuning: &PoolTuning) -> Result<Self> {
        let db_path = db_path.as_ref();
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(tuning.max_connections)
            .acquire_timeout(tuning.acquire_timeout)
            .max_lifetime(tuning.max_lifetime)
            .connect_with(options)
            .await?;

        info!(path = %db_path.display(), "opened sqlite pool");
        Ok(DbPool::Sqlite(pool))
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::MySql(_) => Dialect::MySql,
            DbPool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Execute one statement with bound parameters, returning the number
    /// of affected rows. A pool that cannot hand out a connection within
    /// its acquire timeout fails here with `sqlx::Error::PoolTimedOut`.
    pub async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        debug!(sql, params = params.len(), "executing statement");
        match self {
            DbPool::MySql(pool) => execute_mysql(pool, sql, params).await,
            DbPool::Sqlite(pool) => execute_sqlite(pool, sql, params).await,
        }
    }

    /// Run unparameterized DDL or setup SQL (may contain multiple
    /// statements).
    pub async fn execute_raw(&self, sql: &str) -> Result<()> {
        match self {
            DbPool::MySql(pool) => {
                sqlx::raw_sql(sql).execute(pool).await?;
            }
            DbPool::Sqlite(pool) => {
                sqlx::raw_sql(sql).execute(pool).await?;
            }
        }
        Ok(())
    }
}

async fn execute_mysql(pool: &MySqlPool, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            // MySQL has a native JSON column type; bind structured values
            // directly.
            SqlValue::Json(v) => query.bind(sqlx::types::Json(v.clone())),
        };
    }
    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

async fn execute_sqlite(pool: &SqlitePool, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let mut query = sqlx::query(sql);
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(f) => query.bind(*f),
            SqlValue::Text(s) => query.bind(s.clone()),
            // SQLite has no native JSON type; fall back to the canonical
            // text codec.
            SqlValue::Json(v) => query.bind(json::encode_text(v)?),
        };
    }
    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}
