//! # myorm
//!
//! A thin convenience layer over `mysql_async`.
//!
//! ## Features
//!
//! - **SQL visible**: builders render plain parameterized SQL you can
//!   inspect with `to_sql()`
//! - **One session per connection**: `&mut self` everywhere, no pool,
//!   with a ping-and-reconnect probe before each statement
//! - **Composable conditions**: field comparisons chained with `and` /
//!   `or`, left-to-right, no precedence parentheses
//! - **Nested queries**: `IN (SELECT ...)` sub-selects and selecting
//!   from a sub-select aliased as `t`
//! - **Safe defaults**: DELETE without WHERE matches nothing unless
//!   explicitly allowed
//!
//! ## Query builders (qb)
//!
//! ```ignore
//! use myorm::Connection;
//!
//! let mut db = Connection::connect("localhost", "shop", Some("app"), None).await;
//! let users = db.table("users");
//!
//! // SELECT
//! let adults = users
//!     .select()
//!     .filter(users.field("age").gte(18).and(users.field("active").eq(1)))
//!     .sort(&[("name", myorm::Order::Asc)])
//!     .slice(1, 20)
//!     .fetch_all(&mut db)
//!     .await?;
//!
//! // INSERT
//! let id = users
//!     .insert()
//!     .set("name", "alice")
//!     .set("age", 30)
//!     .execute(&mut db)
//!     .await?;
//!
//! // UPDATE
//! users
//!     .update()
//!     .set(users.field("age").add(1))
//!     .filter(users.field("name").eq("alice"))
//!     .execute(&mut db)
//!     .await?;
//!
//! db.commit().await?;
//! ```

pub mod cond;
pub mod conn;
pub mod error;
pub mod ident;
pub mod qb;
pub mod row;
pub mod table;

pub use cond::{Assign, Cond, Connector, Field};
pub use conn::{Connection, ExecResult};
pub use error::{OrmError, OrmResult};
pub use row::Row;
pub use table::Table;

// Re-export qb module for easy access
pub use qb::{
    count, delete, insert, select, select_from_query, update, CountQb, DeleteQb, InsertQb, Order,
    SelectQb, TableRef, UpdateQb,
};
