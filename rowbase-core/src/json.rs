//! Text fallback codec for JSON columns.
//!
//! MySQL stores structured values in its native JSON type; SQLite has no
//! such type, so values are serialized to canonical JSON text on write and
//! parsed back on read. Null/absent values pass through unchanged in both
//! directions — a SQL NULL never becomes the string `"null"`.

use serde_json::Value;

use crate::error::{DbError, Result};

/// Serialize a structured value for a text-backed JSON column.
///
/// `Null` maps to `None` (stored as SQL NULL); everything else becomes its
/// canonical JSON text form. Empty containers serialize to `{}` / `[]`.
pub fn encode_text(value: &Value) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let text = serde_json::to_string(value).map_err(|e| DbError::json("encode json column", e))?;
    Ok(Some(text))
}

/// Parse a stored text value back into a structured value.
///
/// `None` and empty text pass through as `None`. Malformed text fails with
/// a parse error; the codec performs no repair or default substitution.
pub fn decode_text(stored: Option<&str>) -> Result<Option<Value>> {
    match stored {
        None => Ok(None),
        Some(text) if text.is_empty() => Ok(None),
        Some(text) => {
            let value =
                serde_json::from_str(text).map_err(|e| DbError::json("decode json column", e))?;
            Ok(Some(value))
        }
    }
}
