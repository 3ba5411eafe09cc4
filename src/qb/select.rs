//! SELECT query builder.

use crate::cond::Cond;
use crate::conn::Connection;
use crate::error::{OrmError, OrmResult};
use crate::ident::{qualify, quote, quote_list};
use crate::qb::{to_params, BuildError, TableRef};
use crate::row::Row;
use mysql_async::Value;

/// Sort direction for [`SelectQb::sort`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// SELECT builder.
///
/// Clause rendering order is fixed:
/// `SELECT <cols|*> FROM <table-or-(subquery) AS t> [WHERE ...]
/// [GROUP BY ... [HAVING ...]] [ORDER BY ...] [LIMIT offset,count]`.
///
/// When the FROM target is a nested select, WHERE, GROUP BY, and ORDER BY
/// column references are qualified with the sub-query alias `t`.
#[derive(Clone, Debug)]
pub struct SelectQb {
    from: TableRef,
    fields: Vec<String>,
    where_cond: Option<Cond>,
    sort_specs: Vec<(String, Order)>,
    groups: Vec<String>,
    having_cond: Option<Cond>,
    limit: Option<(u64, u64)>,
    build_error: Option<BuildError>,
}

impl SelectQb {
    /// Create a SELECT builder for a table name.
    pub fn new(table: &str) -> Self {
        Self::with_from(TableRef::name(table))
    }

    /// Create a SELECT builder over a nested sub-select, aliased `t`.
    pub fn from_select(query: SelectQb) -> Self {
        Self::with_from(TableRef::Subquery(Box::new(query)))
    }

    fn with_from(from: TableRef) -> Self {
        Self {
            from,
            fields: Vec::new(),
            where_cond: None,
            sort_specs: Vec::new(),
            groups: Vec::new(),
            having_cond: None,
            limit: None,
            build_error: None,
        }
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, cond: Cond) -> Self {
        self.where_cond = Some(cond);
        self
    }

    /// Append projected columns. An empty projection renders `SELECT *`.
    pub fn collect(mut self, columns: &[&str]) -> Self {
        self.fields.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Replace the sort specification.
    pub fn sort(mut self, specs: &[(&str, Order)]) -> Self {
        self.sort_specs = specs
            .iter()
            .map(|(col, dir)| (col.to_string(), *dir))
            .collect();
        self
    }

    /// Set `LIMIT offset,count`, overriding any previous page slice.
    pub fn limit(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some((offset, count));
        self
    }

    /// Page-slice shorthand: 1-based page number and page size, both >= 1.
    ///
    /// Computes `LIMIT (page-1)*size, size`, overriding `limit`. A page or
    /// size of 0 is recorded and surfaced as [`OrmError::InvalidPage`] at
    /// the first render or execution.
    pub fn slice(mut self, page: u64, size: u64) -> Self {
        if page < 1 || size < 1 {
            self.build_error
                .get_or_insert(BuildError::InvalidPage { page, size });
            return self;
        }
        self.limit = Some(((page - 1) * size, size));
        self
    }

    /// Set GROUP BY columns; requires at least one.
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            self.build_error.get_or_insert(BuildError::MissingField(
                "group_by requires at least one field".to_string(),
            ));
            return self;
        }
        self.groups.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Set the HAVING condition; only meaningful combined with `group_by`.
    pub fn having(mut self, cond: Cond) -> Self {
        self.having_cond = Some(cond);
        self
    }

    /// Check builder state, including any nested sub-select's.
    pub fn validate(&self) -> OrmResult<()> {
        if let Some(err) = &self.build_error {
            return Err(err.to_error());
        }
        if let TableRef::Subquery(sub) = &self.from {
            sub.validate()?;
        }
        if let Some(cond) = &self.where_cond {
            cond.validate()?;
        }
        if let Some(cond) = &self.having_cond {
            cond.validate()?;
        }
        Ok(())
    }

    /// The rendered SQL (for inspection).
    pub fn to_sql(&self) -> String {
        self.build().0
    }

    /// Render the statement and collect parameters in execution order:
    /// sub-query params, then WHERE params, then HAVING params.
    pub(crate) fn build(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        if self.fields.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&quote_list(&self.fields));
        }

        sql.push_str(" FROM ");
        let alias = match &self.from {
            TableRef::Name(name) => {
                sql.push_str(&quote(name));
                None
            }
            TableRef::Subquery(sub) => {
                let (sub_sql, sub_params) = sub.build();
                sql.push('(');
                sql.push_str(&sub_sql);
                sql.push_str(") AS t");
                params.extend(sub_params);
                Some("t")
            }
        };

        if let Some(cond) = &self.where_cond {
            sql.push_str(" WHERE ");
            sql.push_str(&cond.to_sql(alias));
            params.extend(cond.params());
        }

        if !self.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            let cols: Vec<String> = self.groups.iter().map(|g| qualify(alias, g)).collect();
            sql.push_str(&cols.join(","));

            if let Some(cond) = &self.having_cond {
                sql.push_str(" HAVING ");
                sql.push_str(&cond.to_sql(None));
                params.extend(cond.params());
            }
        }

        if !self.sort_specs.is_empty() {
            sql.push_str(" ORDER BY ");
            let specs: Vec<String> = self
                .sort_specs
                .iter()
                .map(|(col, dir)| format!("{} {}", qualify(alias, col), dir.as_sql()))
                .collect();
            sql.push_str(&specs.join(","));
        }

        if let Some((offset, count)) = self.limit {
            sql.push_str(&format!(" LIMIT {offset},{count}"));
        }

        (sql, params)
    }

    /// Execute and return the full result-row sequence.
    pub async fn fetch_all(&self, db: &mut Connection) -> OrmResult<Vec<Row>> {
        self.validate()?;
        let (sql, params) = self.build();
        db.query(&sql, to_params(params)).await
    }

    /// Execute and return at most one row.
    ///
    /// Zero rows yield `Ok(None)`; more than one yields
    /// [`OrmError::TooManyRows`]. Reads eagerly — do not use for unbounded
    /// result sets.
    pub async fn fetch_opt(&self, db: &mut Connection) -> OrmResult<Option<Row>> {
        self.validate()?;
        let (sql, params) = self.build();
        db.get(&sql, to_params(params)).await
    }

    /// Execute and require exactly one row.
    pub async fn fetch_one(&self, db: &mut Connection) -> OrmResult<Row> {
        self.fetch_opt(db)
            .await?
            .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
    }
}
