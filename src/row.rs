//! Result rows with named-field access.

use crate::error::{OrmError, OrmResult};
use mysql_async::prelude::FromValue;
use mysql_async::Value;

/// A single result row: an immutable mapping from column name to value.
///
/// Rows are created once per result record and never mutated. Fields are
/// read either dynamically via [`Row::value`] / indexing, or with a typed
/// conversion via [`Row::get`] / [`Row::opt`].
///
/// ```ignore
/// for article in db.query("SELECT * FROM articles", ()).await? {
///     let title: String = article.get("title")?;
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names, in result-set order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw value for a column, if the column exists.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    /// Typed read of a column.
    ///
    /// Fails with [`OrmError::Decode`] if the column is missing or the value
    /// does not convert to `T`. Binary-flagged columns stay raw bytes until
    /// converted here (`Vec<u8>` always succeeds for byte values).
    pub fn get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| OrmError::decode(column, "no such column"))?
            .clone();
        T::from_value_opt(value)
            .map_err(|e| OrmError::decode(column, format!("cannot convert {:?}", e.0)))
    }

    /// Typed read of a nullable column: SQL NULL becomes `None`.
    pub fn opt<T: FromValue>(&self, column: &str) -> OrmResult<Option<T>> {
        match self.value(column) {
            None => Err(OrmError::decode(column, "no such column")),
            Some(Value::NULL) => Ok(None),
            Some(v) => T::from_value_opt(v.clone())
                .map(Some)
                .map_err(|e| OrmError::decode(column, format!("cannot convert {:?}", e.0))),
        }
    }

    /// Render the row as a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.columns.len());
        for (name, value) in self.columns.iter().zip(&self.values) {
            map.insert(name.clone(), value_to_json(value));
        }
        serde_json::Value::Object(map)
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }
}

impl From<mysql_async::Row> for Row {
    fn from(row: mysql_async::Row) -> Self {
        let columns = row
            .columns_ref()
            .iter()
            .map(|c| c.name_str().into_owned())
            .collect();
        let values = row.unwrap();
        Self { columns, values }
    }
}

impl std::ops::Index<&str> for Row {
    type Output = Value;

    /// Dict-style access. Panics if the column does not exist; use
    /// [`Row::value`] for a fallible lookup.
    fn index(&self, column: &str) -> &Value {
        self.value(column)
            .unwrap_or_else(|| panic!("no column named '{column}' in row"))
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::NULL => serde_json::Value::Null,
        Value::Int(n) => serde_json::Value::from(*n),
        Value::UInt(n) => serde_json::Value::from(*n),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
        Value::Date(y, mo, d, h, mi, s, _us) => serde_json::Value::String(format!(
            "{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}"
        )),
        Value::Time(neg, days, h, mi, s, _us) => {
            let hours = u32::from(*h) + days * 24;
            let sign = if *neg { "-" } else { "" };
            serde_json::Value::String(format!("{sign}{hours:02}:{mi:02}:{s:02}"))
        }
    }
}
