//! DELETE query builder.

use crate::cond::Cond;
use crate::conn::Connection;
use crate::error::OrmResult;
use crate::ident::quote;
use crate::qb::to_params;
use mysql_async::Value;

/// DELETE builder.
///
/// A DELETE without WHERE conditions renders `WHERE 1=0` (no-op) unless
/// [`DeleteQb::allow_delete_all`] is set.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    where_cond: Option<Cond>,
    allow_delete_all: bool,
}

impl DeleteQb {
    /// Create a DELETE builder for the given table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_cond: None,
            allow_delete_all: false,
        }
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_cond = Some(cond);
        self
    }

    /// Allow DELETE without WHERE conditions (deletes all rows).
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

    /// Check any nested sub-select in the WHERE condition.
    pub fn validate(&self) -> OrmResult<()> {
        if let Some(cond) = &self.where_cond {
            cond.validate()?;
        }
        Ok(())
    }

    /// The rendered SQL (for inspection).
    pub fn to_sql(&self) -> String {
        self.build().0
    }

    pub(crate) fn build(&self) -> (String, Vec<Value>) {
        let table = quote(&self.table);
        match &self.where_cond {
            Some(cond) => (
                format!("DELETE FROM {table} WHERE {}", cond.to_sql(None)),
                cond.params(),
            ),
            None if self.allow_delete_all => (format!("DELETE FROM {table}"), Vec::new()),
            None => (format!("DELETE FROM {table} WHERE 1=0"), Vec::new()),
        }
    }

    /// Execute, returning the affected-row count.
    pub async fn execute(&self, db: &mut Connection) -> OrmResult<u64> {
        self.validate()?;
        let (sql, params) = self.build();
        let result = db.execute(&sql, to_params(params)).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cond::Field;
    use crate::qb::delete;

    #[test]
    fn qualified_delete() {
        let qb = delete("users").filter(Field::new("id").eq(1));
        let (sql, params) = qb.build();
        assert_eq!(sql, "DELETE FROM `users` WHERE `id`=?");
        assert_eq!(params, vec![Value::Int(1)]);
    }

    #[test]
    fn unconditional_delete_is_a_noop_by_default() {
        let qb = delete("users");
        assert_eq!(qb.to_sql(), "DELETE FROM `users` WHERE 1=0");
    }

    #[test]
    fn delete_all_requires_explicit_opt_in() {
        let qb = delete("users").allow_delete_all(true);
        assert_eq!(qb.to_sql(), "DELETE FROM `users`");
    }
}
