//! INSERT query builder.

use crate::conn::Connection;
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote, quote_list};
use crate::qb::to_params;
use mysql_async::Value;

/// INSERT builder.
///
/// Single-row form accumulates ordered column/value pairs with
/// [`InsertQb::set`]; the multi-row form fixes the column list with
/// [`InsertQb::columns`] and appends parameter sets with [`InsertQb::row`],
/// executed as a batch.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl InsertQb {
    /// Create an INSERT builder for the given table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append one column/value pair, preserving insertion order.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        self.columns.push(column.to_string());
        self.rows[0].push(value.into());
        self
    }

    /// Fix the column list for the multi-row form.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one full parameter set; requires a prior [`InsertQb::columns`].
    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Check builder state: at least one column, and every row matching the
    /// column count.
    pub fn validate(&self) -> OrmResult<()> {
        if self.columns.is_empty() {
            return Err(OrmError::MissingField(
                "insert requires at least one field".to_string(),
            ));
        }
        for row in &self.rows {
            if row.len() != self.columns.len() {
                return Err(OrmError::validation(format!(
                    "insert row has {} values for {} columns",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        if self.rows.is_empty() {
            return Err(OrmError::validation("insert has no rows"));
        }
        Ok(())
    }

    /// The rendered SQL (for inspection).
    pub fn to_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(",");
        format!(
            "INSERT INTO {}({}) VALUES ({placeholders})",
            quote(&self.table),
            quote_list(&self.columns),
        )
    }

    /// Parameters for the single-row form, in insertion order.
    pub(crate) fn params(&self) -> Vec<Value> {
        self.rows.first().cloned().unwrap_or_default()
    }

    /// Execute, returning the generated row identifier (if any).
    ///
    /// The multi-row form runs as a batch; the identifier reported is the
    /// one from the last executed statement.
    pub async fn execute(&self, db: &mut Connection) -> OrmResult<Option<u64>> {
        self.validate()?;
        let sql = self.to_sql();
        let result = if self.rows.len() == 1 {
            db.execute(&sql, to_params(self.params())).await?
        } else {
            let batches = self.rows.iter().cloned().map(to_params).collect();
            db.execute_many(&sql, batches).await?
        };
        Ok(result.last_insert_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qb::insert;

    #[test]
    fn renders_in_insertion_order() {
        let qb = insert("T").set("a", 1).set("b", "x");
        assert_eq!(qb.to_sql(), "INSERT INTO `T`(`a`,`b`) VALUES (?,?)");
        assert_eq!(
            qb.params(),
            vec![Value::Int(1), Value::Bytes(b"x".to_vec())]
        );
    }

    #[test]
    fn empty_insert_is_missing_field() {
        let err = insert("T").validate().unwrap_err();
        assert!(matches!(err, OrmError::MissingField(_)));
    }

    #[test]
    fn batch_rows_share_one_statement() {
        let qb = insert("T")
            .columns(&["a", "b"])
            .row(vec![Value::Int(1), Value::Int(2)])
            .row(vec![Value::Int(3), Value::Int(4)]);
        assert!(qb.validate().is_ok());
        assert_eq!(qb.to_sql(), "INSERT INTO `T`(`a`,`b`) VALUES (?,?)");
    }

    #[test]
    fn mismatched_row_width_is_rejected() {
        let qb = insert("T").columns(&["a", "b"]).row(vec![Value::Int(1)]);
        assert!(matches!(
            qb.validate().unwrap_err(),
            OrmError::Validation(_)
        ));
    }
}
