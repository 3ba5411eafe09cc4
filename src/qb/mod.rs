//! Query builders for single-table statements.
//!
//! Each builder accumulates configuration through chained calls and renders
//! one complete parameterized statement. Rendering is a pure function of
//! builder state, so repeated renders of the same builder produce identical
//! SQL and parameter lists.
//!
//! ```ignore
//! use myorm::qb;
//!
//! let users = qb::select("users")
//!     .filter(table.field("status").eq("active"))
//!     .sort(&[("created_at", qb::Order::Desc)])
//!     .slice(1, 20)
//!     .fetch_all(&mut db)
//!     .await?;
//! ```

mod count;
mod delete;
mod insert;
mod select;
mod update;

pub use count::CountQb;
pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use select::{Order, SelectQb};
pub use update::UpdateQb;

use crate::error::OrmError;
use mysql_async::{Params, Value};

/// The FROM target of a select or count: a plain table name or a nested
/// sub-select rendered parenthesized with alias `t`.
#[derive(Clone, Debug)]
pub enum TableRef {
    Name(String),
    Subquery(Box<SelectQb>),
}

impl TableRef {
    pub(crate) fn name(table: &str) -> Self {
        TableRef::Name(table.to_string())
    }
}

/// Misconfiguration recorded during chained building and surfaced by
/// `validate()` before the first render/execute.
#[derive(Clone, Debug)]
pub(crate) enum BuildError {
    MissingField(String),
    InvalidPage { page: u64, size: u64 },
}

impl BuildError {
    pub(crate) fn to_error(&self) -> OrmError {
        match self {
            BuildError::MissingField(what) => OrmError::MissingField(what.clone()),
            BuildError::InvalidPage { page, size } => OrmError::InvalidPage {
                page: *page,
                size: *size,
            },
        }
    }
}

/// Positional parameter list for the driver; an empty list maps to
/// `Params::Empty` so statements without placeholders bind cleanly.
pub(crate) fn to_params(values: Vec<Value>) -> Params {
    if values.is_empty() {
        Params::Empty
    } else {
        Params::Positional(values)
    }
}

/// Create a SELECT builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create a SELECT builder over a nested sub-select (aliased `t`).
pub fn select_from_query(query: SelectQb) -> SelectQb {
    SelectQb::from_select(query)
}

/// Create an INSERT builder for the given table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Create an UPDATE builder for the given table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Create a DELETE builder for the given table.
///
/// By default a DELETE without WHERE conditions renders `WHERE 1=0`
/// (no-op); use `allow_delete_all(true)` to delete all rows.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Create a COUNT builder for the given table.
pub fn count(table: &str) -> CountQb {
    CountQb::new(table)
}

#[cfg(test)]
mod tests;
