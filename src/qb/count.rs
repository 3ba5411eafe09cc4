//! COUNT query builder.

use crate::cond::Cond;
use crate::conn::Connection;
use crate::error::OrmResult;
use crate::ident::quote;
use crate::qb::to_params;
use mysql_async::Value;

/// COUNT builder: renders `` SELECT count(1) FROM `T` [WHERE ...] `` and
/// returns a single scalar.
#[derive(Clone, Debug)]
pub struct CountQb {
    table: String,
    where_cond: Option<Cond>,
}

impl CountQb {
    /// Create a COUNT builder for the given table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_cond: None,
        }
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_cond = Some(cond);
        self
    }

    /// The rendered SQL (for inspection).
    pub fn to_sql(&self) -> String {
        self.build().0
    }

    pub(crate) fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT count(1) FROM {}", quote(&self.table));
        let mut params = Vec::new();
        if let Some(cond) = &self.where_cond {
            sql.push_str(" WHERE ");
            sql.push_str(&cond.to_sql(None));
            params.extend(cond.params());
        }
        (sql, params)
    }

    /// Execute, returning the matching-row count.
    pub async fn fetch(&self, db: &mut Connection) -> OrmResult<u64> {
        if let Some(cond) = &self.where_cond {
            cond.validate()?;
        }
        let (sql, params) = self.build();
        db.count(&sql, to_params(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cond::Field;
    use crate::qb::count;

    #[test]
    fn bare_count() {
        assert_eq!(count("users").to_sql(), "SELECT count(1) FROM `users`");
    }

    #[test]
    fn qualified_count() {
        let qb = count("users").filter(Field::new("status").eq("active"));
        let (sql, params) = qb.build();
        assert_eq!(sql, "SELECT count(1) FROM `users` WHERE `status`=?");
        assert_eq!(params, vec![Value::Bytes(b"active".to_vec())]);
    }
}
