//! UPDATE query builder.

use crate::cond::{Assign, Cond};
use crate::conn::Connection;
use crate::error::{OrmError, OrmResult};
use crate::ident::quote;
use crate::qb::to_params;
use mysql_async::Value;

/// UPDATE builder.
///
/// SET expressions come from [`Field`](crate::cond::Field) assignment
/// constructors (`assign` / `add` / `sub`); at least one is required.
/// Parameter order is SET values first, then WHERE parameters.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    assigns: Vec<Assign>,
    where_cond: Option<Cond>,
}

impl UpdateQb {
    /// Create an UPDATE builder for the given table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            assigns: Vec::new(),
            where_cond: None,
        }
    }

    /// Append one SET expression.
    pub fn set(mut self, assign: Assign) -> Self {
        self.assigns.push(assign);
        self
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_cond = Some(cond);
        self
    }

    /// Check builder state: the SET clause cannot be empty.
    pub fn validate(&self) -> OrmResult<()> {
        if self.assigns.is_empty() {
            return Err(OrmError::MissingField(
                "update requires at least one field".to_string(),
            ));
        }
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
        let mut params: Vec<Value> = self.assigns.iter().map(Assign::value).collect();
        let sets: Vec<String> = self.assigns.iter().map(Assign::to_sql).collect();
        let mut sql = format!("UPDATE {} SET {}", quote(&self.table), sets.join(","));
        if let Some(cond) = &self.where_cond {
            sql.push_str(" WHERE ");
            sql.push_str(&cond.to_sql(None));
            params.extend(cond.params());
        }
        (sql, params)
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
    use crate::qb::update;

    fn f(name: &str) -> Field {
        Field::new(name)
    }

    #[test]
    fn plain_set() {
        let qb = update("users")
            .set(f("status").assign("inactive"))
            .filter(f("id").eq(1));
        let (sql, params) = qb.build();
        assert_eq!(sql, "UPDATE `users` SET `status`=? WHERE `id`=?");
        assert_eq!(
            params,
            vec![Value::Bytes(b"inactive".to_vec()), Value::Int(1)]
        );
    }

    #[test]
    fn arithmetic_set_params_precede_where_params() {
        let qb = update("users")
            .set(f("credits").add(5))
            .set(f("strikes").sub(1))
            .filter(f("id").eq(9));
        let (sql, params) = qb.build();
        assert_eq!(
            sql,
            "UPDATE `users` SET `credits`=`credits`+?,`strikes`=`strikes`-? WHERE `id`=?"
        );
        assert_eq!(
            params,
            vec![Value::Int(5), Value::Int(1), Value::Int(9)]
        );
    }

    #[test]
    fn update_without_where_renders_bare() {
        let qb = update("users").set(f("seen").assign(1));
        assert_eq!(qb.to_sql(), "UPDATE `users` SET `seen`=?");
    }

    #[test]
    fn empty_set_is_missing_field() {
        let err = update("users").validate().unwrap_err();
        assert!(matches!(err, OrmError::MissingField(_)));
    }
}
