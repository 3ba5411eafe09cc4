//! Per-table entry point for the query builders.

use crate::cond::Field;
use crate::qb::{CountQb, DeleteQb, InsertQb, SelectQb, UpdateQb};

/// A named table, handed out by [`crate::Connection::table`].
///
/// Carries no schema knowledge; it only binds the table name into fields
/// and builders:
///
/// ```
/// use myorm::Table;
///
/// let users = Table::new("users");
/// let sql = users
///     .select()
///     .filter(users.field("age").gte(18))
///     .to_sql();
/// assert_eq!(sql, "SELECT * FROM `users` WHERE `age`>=?");
/// ```
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A column reference, the starting point for conditions and
    /// assignments.
    pub fn field(&self, name: &str) -> Field {
        Field::new(name)
    }

    pub fn select(&self) -> SelectQb {
        SelectQb::new(&self.name)
    }

    pub fn insert(&self) -> InsertQb {
        InsertQb::new(&self.name)
    }

    pub fn update(&self) -> UpdateQb {
        UpdateQb::new(&self.name)
    }

    pub fn delete(&self) -> DeleteQb {
        DeleteQb::new(&self.name)
    }

    pub fn count(&self) -> CountQb {
        CountQb::new(&self.name)
    }
}
