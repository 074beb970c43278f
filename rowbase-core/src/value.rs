use std::collections::BTreeMap;

use serde_json::Value;

/// One unit of insert/update: column name to value, keys unique.
///
/// `serde_json::Value` is the lingua franca here so structured values can
/// flow into JSON columns without a separate row type per table.
pub type Row = BTreeMap<String, Value>;

/// A single bindable SQL parameter, already lowered from JSON.
///
/// Scalars bind as their native SQL types. `Json` carries a structured
/// value whose storage form is decided per dialect at bind time: native
/// JSON on MySQL, canonical text on SQLite.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
}

impl SqlValue {
    /// Lower a JSON value to a bindable parameter. Arrays and objects
    /// stay structured; numbers prefer integer representation.
    pub fn from_json(value: &Value) -> SqlValue {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else {
                    SqlValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(value.clone()),
        }
    }
}

/// A dialect-correct statement plus its parameters in bind order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}
