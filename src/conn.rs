//! Single-session connection wrapper.
//!
//! A [`Connection`] owns at most one live `mysql_async` session. Every query
//! method takes `&mut self`, so concurrent use from multiple tasks is ruled
//! out at compile time; there is no pool and no request queue. Before any
//! session use a lightweight ping is attempted, and a failed probe triggers
//! exactly one reconnect before the statement runs.
//!
//! ```ignore
//! let mut db = Connection::connect("localhost", "mydatabase", None, None).await;
//! for article in db.query("SELECT * FROM articles", ()).await? {
//!     println!("{}", article.get::<String>("title")?);
//! }
//! ```

use crate::error::{OrmError, OrmResult};
use crate::qb::{InsertQb, SelectQb};
use crate::row::Row;
use crate::table::Table;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, Params};

const DEFAULT_PORT: u16 = 3306;

/// Options forced on every session: UTF-8 client encoding, a fixed
/// timezone, strict SQL mode, and explicit commit control.
const SESSION_SETUP: &[&str] = &[
    "SET NAMES utf8mb4",
    "SET time_zone = '+8:00'",
    "SET sql_mode = 'TRADITIONAL'",
    "SET autocommit = 0",
];

/// Outcome of a mutating statement.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecResult {
    /// The generated row identifier, if the statement produced one.
    pub last_insert_id: Option<u64>,
    /// Number of rows affected.
    pub rows_affected: u64,
}

/// A lightweight wrapper around one `mysql_async` connection.
///
/// The host specification is either a filesystem path (Unix-socket
/// transport) or `hostname` / `hostname:port` (TCP, default port 3306).
pub struct Connection {
    host: String,
    opts: Opts,
    session: Option<Conn>,
}

impl Connection {
    /// Open a connection. Construction never fails loudly: an initial
    /// connect failure is logged and the first query attempt will
    /// reconnect. Use [`Connection::is_connected`] to check up front.
    pub async fn connect(
        host: &str,
        database: &str,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        let opts = build_opts(host, database, user, password);
        let mut db = Self {
            host: host.to_string(),
            opts,
            session: None,
        };
        if let Err(e) = db.reconnect().await {
            tracing::error!(host = %db.host, error = %e, "cannot connect to MySQL");
        }
        db
    }

    /// Whether a session is currently held (it may still be stale; query
    /// methods re-probe before use).
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Close the current session, if any.
    pub async fn close(&mut self) {
        if let Some(conn) = self.session.take() {
            if let Err(e) = conn.disconnect().await {
                tracing::debug!(host = %self.host, error = %e, "error closing MySQL session");
            }
        }
    }

    /// Tear down any existing session and open a new one.
    pub async fn reconnect(&mut self) -> OrmResult<()> {
        self.close().await;
        let conn = Conn::new(self.opts.clone())
            .await
            .map_err(|e| OrmError::Connection(e.to_string()))?;
        self.session = Some(conn);
        Ok(())
    }

    /// Liveness-checked session access: ping, reconnect once on failure.
    async fn session(&mut self) -> OrmResult<&mut Conn> {
        let probe = match self.session.as_mut() {
            Some(conn) => Some(conn.ping().await.is_ok()),
            None => None,
        };
        if needs_reconnect(probe) {
            tracing::debug!(host = %self.host, "liveness probe failed, reconnecting");
            self.reconnect().await?;
        }
        self.session
            .as_mut()
            .ok_or_else(|| OrmError::Connection("no live session".to_string()))
    }

    /// Tear down the session after an execution failure and re-raise.
    fn fail(&mut self, err: mysql_async::Error) -> OrmError {
        tracing::error!(host = %self.host, error = %err, "statement execution failed");
        // The dropped Conn cleans itself up in the background.
        self.session = None;
        OrmError::Query(err)
    }

    /// Execute a parameterized statement and return the buffered rows.
    pub async fn query<P>(&mut self, sql: &str, params: P) -> OrmResult<Vec<Row>>
    where
        P: Into<Params> + Send,
    {
        let result = {
            let conn = self.session().await?;
            conn.exec::<mysql_async::Row, _, _>(sql, params).await
        };
        match result {
            Ok(rows) => Ok(rows.into_iter().map(Row::from).collect()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Execute a statement expected to match at most one row.
    ///
    /// Returns `Ok(None)` for no match and [`OrmError::TooManyRows`] for
    /// more than one. Fetches eagerly to detect the multi-row case, so it
    /// cannot be used for unbounded result sets.
    pub async fn get<P>(&mut self, sql: &str, params: P) -> OrmResult<Option<Row>>
    where
        P: Into<Params> + Send,
    {
        let rows = self.query(sql, params).await?;
        one_of(rows)
    }

    /// Execute a statement and visit each row as it is produced, without
    /// buffering the full result set.
    ///
    /// A visitor error stops further visits; the remaining rows are still
    /// drained so the session stays usable, and the first error is
    /// returned.
    pub async fn iterate<P, F>(&mut self, sql: &str, params: P, each: F) -> OrmResult<()>
    where
        P: Into<Params> + Send,
        F: FnMut(Row) -> OrmResult<()> + Send,
    {
        let init: OrmResult<()> = Ok(());
        let outcome = {
            let conn = self.session().await?;
            let mut each = each;
            conn.exec_fold(sql, params, init, move |acc, row: mysql_async::Row| {
                visit_step(acc, Row::from(row), &mut each)
            })
            .await
        };
        match outcome {
            Ok(visited) => visited,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Execute a mutating statement.
    pub async fn execute<P>(&mut self, sql: &str, params: P) -> OrmResult<ExecResult>
    where
        P: Into<Params> + Send,
    {
        let result = {
            let conn = self.session().await?;
            match conn.exec_drop(sql, params).await {
                Ok(()) => Ok(ExecResult {
                    last_insert_id: conn.last_insert_id(),
                    rows_affected: conn.affected_rows(),
                }),
                Err(e) => Err(e),
            }
        };
        result.map_err(|e| self.fail(e))
    }

    /// Execute a mutating statement once per parameter set.
    pub async fn execute_many(&mut self, sql: &str, batches: Vec<Params>) -> OrmResult<ExecResult> {
        let result = {
            let conn = self.session().await?;
            match conn.exec_batch(sql, batches).await {
                Ok(()) => Ok(ExecResult {
                    last_insert_id: conn.last_insert_id(),
                    rows_affected: conn.affected_rows(),
                }),
                Err(e) => Err(e),
            }
        };
        result.map_err(|e| self.fail(e))
    }

    /// Execute a single-scalar read (e.g. `SELECT count(1) ...`).
    pub async fn count<P>(&mut self, sql: &str, params: P) -> OrmResult<u64>
    where
        P: Into<Params> + Send,
    {
        let rows = self.query(sql, params).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(0);
        };
        let column = row
            .columns()
            .first()
            .cloned()
            .ok_or_else(|| OrmError::decode("count", "empty row"))?;
        row.get(&column)
    }

    /// Commit the current transaction.
    ///
    /// The session is probed (and reconnected if stale) first. A commit
    /// failure rolls back, then returns the error.
    pub async fn commit(&mut self) -> OrmResult<()> {
        if self.session.is_none() {
            return Ok(());
        }
        let result = {
            let conn = self.session().await?;
            conn.query_drop("COMMIT").await
        };
        if let Err(e) = result {
            tracing::error!(host = %self.host, error = %e, "commit failed, rolling back");
            if let Some(conn) = self.session.as_mut() {
                if let Err(rb) = conn.query_drop("ROLLBACK").await {
                    tracing::error!(host = %self.host, error = %rb, "rollback after failed commit also failed");
                }
            }
            return Err(OrmError::Query(e));
        }
        Ok(())
    }

    /// Roll back the current transaction.
    pub async fn rollback(&mut self) -> OrmResult<()> {
        let Some(conn) = self.session.as_mut() else {
            return Ok(());
        };
        conn.query_drop("ROLLBACK").await.map_err(OrmError::from)
    }

    /// A [`Table`] façade bound to the given table name.
    pub fn table(&self, name: &str) -> Table {
        Table::new(name)
    }

    /// A SELECT builder over a nested sub-select (aliased `t`).
    pub fn from_query(&self, query: SelectQb) -> SelectQb {
        SelectQb::from_select(query)
    }

    /// An INSERT builder, shorthand for `db.table(name).insert()`.
    pub fn insert(&self, table: &str) -> InsertQb {
        InsertQb::new(table)
    }
}

/// Transport selected by a host specification.
#[derive(Debug, PartialEq, Eq)]
enum HostSpec {
    Socket(String),
    Tcp { host: String, port: u16 },
}

/// A path selects Unix-socket transport; otherwise `host[:port]` with the
/// default MySQL port.
fn parse_host(spec: &str) -> HostSpec {
    if spec.contains('/') {
        return HostSpec::Socket(spec.to_string());
    }
    match spec.split_once(':') {
        Some((host, port)) => HostSpec::Tcp {
            host: host.to_string(),
            port: port.parse().unwrap_or(DEFAULT_PORT),
        },
        None => HostSpec::Tcp {
            host: spec.to_string(),
            port: DEFAULT_PORT,
        },
    }
}

fn build_opts(host: &str, database: &str, user: Option<&str>, password: Option<&str>) -> Opts {
    let mut builder = OptsBuilder::default()
        .db_name(Some(database))
        .user(user)
        .pass(password)
        .init(SESSION_SETUP.to_vec());
    builder = match parse_host(host) {
        HostSpec::Socket(path) => builder.socket(Some(path)),
        HostSpec::Tcp { host, port } => builder.ip_or_hostname(host).tcp_port(port),
    };
    Opts::from(builder)
}

/// 0/1/many arbitration for single-row reads.
fn one_of(mut rows: Vec<Row>) -> OrmResult<Option<Row>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        got => Err(OrmError::too_many_rows(1, got)),
    }
}

/// Whether the session must be (re)established before use: no session is
/// held (`None`), or the liveness probe failed (`Some(false)`).
fn needs_reconnect(probe: Option<bool>) -> bool {
    !matches!(probe, Some(true))
}

/// One visitor step: a prior error short-circuits further visits while
/// the fold keeps draining rows.
fn visit_step<F>(acc: OrmResult<()>, row: Row, each: &mut F) -> OrmResult<()>
where
    F: FnMut(Row) -> OrmResult<()>,
{
    match acc {
        Ok(()) => each(row),
        err => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::Value;

    fn row(id: i64) -> Row {
        Row::from_parts(vec!["id".into()], vec![Value::Int(id)])
    }

    #[test]
    fn plain_hostname_gets_default_port() {
        assert_eq!(
            parse_host("db.example.com"),
            HostSpec::Tcp {
                host: "db.example.com".to_string(),
                port: 3306
            }
        );
    }

    #[test]
    fn explicit_port_is_parsed() {
        assert_eq!(
            parse_host("localhost:3307"),
            HostSpec::Tcp {
                host: "localhost".to_string(),
                port: 3307
            }
        );
    }

    #[test]
    fn path_selects_socket_transport() {
        assert_eq!(
            parse_host("/var/run/mysqld/mysqld.sock"),
            HostSpec::Socket("/var/run/mysqld/mysqld.sock".to_string())
        );
    }

    #[test]
    fn opts_carry_database_and_credentials() {
        let opts = build_opts("localhost:3307", "mydb", Some("alice"), Some("secret"));
        assert_eq!(opts.db_name(), Some("mydb"));
        assert_eq!(opts.user(), Some("alice"));
        assert_eq!(opts.pass(), Some("secret"));
        assert_eq!(opts.tcp_port(), 3307);
    }

    #[test]
    fn socket_opts() {
        let opts = build_opts("/tmp/mysql.sock", "mydb", None, None);
        assert_eq!(opts.socket(), Some("/tmp/mysql.sock"));
    }

    #[test]
    fn single_row_arbitration() {
        assert!(one_of(Vec::new()).unwrap().is_none());

        let only = one_of(vec![row(1)]).unwrap().unwrap();
        assert_eq!(only.get::<i64>("id").unwrap(), 1);

        let err = one_of(vec![row(1), row(2)]).unwrap_err();
        assert!(err.is_too_many_rows());
        assert!(matches!(err, OrmError::TooManyRows { expected: 1, got: 2 }));
    }

    #[test]
    fn probe_failure_forces_reconnect() {
        assert!(needs_reconnect(None));
        assert!(needs_reconnect(Some(false)));
        assert!(!needs_reconnect(Some(true)));
    }

    #[test]
    fn visitor_error_skips_remaining_rows() {
        let mut visited = 0;
        let mut each = |r: Row| -> OrmResult<()> {
            visited += 1;
            if r.get::<i64>("id")? == 2 {
                return Err(OrmError::validation("stop"));
            }
            Ok(())
        };

        let mut acc: OrmResult<()> = Ok(());
        for id in 1..=4 {
            acc = visit_step(acc, row(id), &mut each);
        }
        assert!(matches!(acc, Err(OrmError::Validation(_))));
        assert_eq!(visited, 2);
    }

    #[tokio::test]
    async fn construction_survives_connect_failure() {
        // Port 9 (discard) is not a MySQL server; connect logs and
        // returns a handle whose first use will retry.
        let db = Connection::connect("127.0.0.1:9", "nope", None, None).await;
        assert!(!db.is_connected());
    }
}
