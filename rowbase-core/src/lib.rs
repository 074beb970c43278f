//! Pooled MySQL/SQLite row access with dialect-aware upserts and
//! JSON-serializing columns for databases without native JSON storage.

pub mod config;
pub mod dialect;
pub mod error;
pub mod json;
pub mod pool;
pub mod schema;
pub mod table;
pub mod upsert;
pub mod value;

pub use config::{DbConfig, PoolTuning};
pub use dialect::Dialect;
pub use error::{DbError, Result};
pub use pool::{connect_lazy, DbPool};
pub use schema::{SchemaRegistry, TableDescriptor};
pub use table::{Role, Table};
pub use upsert::{MySqlUpsert, SqliteUpsert, UpsertCompiler};
pub use value::{CompiledStatement, Row, SqlValue};
