//! Connection capability trait.

use crate::error::DbResult;
use crate::kind::DbKind;
use crate::value::{Row, Value};
use async_trait::async_trait;

/// An already-open, vendor-tagged database connection.
///
/// The engine drives one sequential pipeline over one connection; there is no
/// internal parallelism. Implementations must be `Send + Sync` so the engine
/// can be held across await points.
///
/// Transaction control is explicit (`begin`/`commit`/`rollback`) because the
/// engine's transaction modes span a configurable number of scripts. On
/// engines without transactions (Cassandra) the engine never calls these.
///
/// SQL text uses the parameter placeholder style of the tagged dialect
/// (`$1` for PostgreSQL/CockroachDB, `@p1` for SQL Server, `?` elsewhere);
/// parameters bind positionally.
#[async_trait]
pub trait Connection: Send + Sync {
    /// The DBMS this connection speaks to.
    fn kind(&self) -> DbKind;

    /// Execute a statement, returning the affected row count.
    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64>;

    /// Run a query and return all rows, columns in select-list order.
    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;

    /// Open a transaction.
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction.
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction.
    async fn rollback(&self) -> DbResult<()>;
}
