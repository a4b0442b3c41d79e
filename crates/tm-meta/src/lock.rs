//! Engine-level advisory locks.
//!
//! Dialects with a session-scoped advisory primitive take the application
//! lock here, once per connection session; the metadata-table-level lock is
//! then a no-op for them. Acquisition failure always degrades to `false`.

use sha2::{Digest, Sha256};
use tm_db::{Connection, DbKind, Value};

/// Stable 64-bit lock key derived from the metadata table name, for dialects
/// whose advisory locks are keyed by integer (PostgreSQL).
pub fn lock_key(table_name: &str) -> i64 {
    let digest = Sha256::digest(format!("tidemark:{table_name}").as_bytes());
    i64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

fn lock_name(table_name: &str) -> String {
    format!("tidemark:{table_name}")
}

/// True when the dialect has an engine-native advisory lock.
pub fn has_application_lock(kind: DbKind) -> bool {
    matches!(kind, DbKind::MySql | DbKind::PostgreSql | DbKind::SqlServer)
}

/// Try to take the session advisory lock. Dialects without one return true
/// (their exclusion lives in the metadata-table lock instead).
pub async fn try_acquire_application_lock(conn: &dyn Connection, table_name: &str) -> bool {
    let result = match conn.kind() {
        DbKind::MySql => one_cell_i64(
            conn,
            "SELECT GET_LOCK(?, 0)",
            &[Value::from(lock_name(table_name))],
        )
        .await
        .map(|n| n == Some(1)),
        DbKind::PostgreSql => {
            match conn
                .query(
                    "SELECT pg_try_advisory_lock($1)",
                    &[Value::Int(lock_key(table_name))],
                )
                .await
            {
                Ok(rows) => Ok(first_cell_bool(&rows)),
                Err(e) => Err(e),
            }
        }
        DbKind::SqlServer => one_cell_i64(
            conn,
            "DECLARE @r INT; \
             EXEC @r = sp_getapplock @Resource = @p1, @LockMode = 'Exclusive', \
                  @LockOwner = 'Session', @LockTimeout = 0; \
             SELECT @r",
            &[Value::from(lock_name(table_name))],
        )
        .await
        // sp_getapplock returns 0 (granted) or 1 (granted after wait).
        .map(|n| matches!(n, Some(0) | Some(1))),
        DbKind::Sqlite | DbKind::Cassandra | DbKind::CockroachDb => Ok(true),
    };
    match result {
        Ok(acquired) => acquired,
        Err(e) => {
            log::warn!("application lock acquisition failed: {e}");
            false
        }
    }
}

/// Release the session advisory lock. Failures degrade to `false` and are
/// logged by the caller, never raised.
pub async fn release_application_lock(conn: &dyn Connection, table_name: &str) -> bool {
    let result = match conn.kind() {
        DbKind::MySql => one_cell_i64(
            conn,
            "SELECT RELEASE_LOCK(?)",
            &[Value::from(lock_name(table_name))],
        )
        .await
        .map(|n| n == Some(1)),
        DbKind::PostgreSql => {
            match conn
                .query(
                    "SELECT pg_advisory_unlock($1)",
                    &[Value::Int(lock_key(table_name))],
                )
                .await
            {
                Ok(rows) => Ok(first_cell_bool(&rows)),
                Err(e) => Err(e),
            }
        }
        DbKind::SqlServer => conn
            .execute(
                "EXEC sp_releaseapplock @Resource = @p1, @LockOwner = 'Session'",
                &[Value::from(lock_name(table_name))],
            )
            .await
            .map(|_| true),
        DbKind::Sqlite | DbKind::Cassandra | DbKind::CockroachDb => Ok(true),
    };
    match result {
        Ok(released) => released,
        Err(e) => {
            log::warn!("application lock release failed: {e}");
            false
        }
    }
}

async fn one_cell_i64(
    conn: &dyn Connection,
    sql: &str,
    params: &[Value],
) -> tm_db::DbResult<Option<i64>> {
    let rows = conn.query(sql, params).await?;
    Ok(rows
        .first()
        .and_then(|r| r.first())
        .and_then(|v| v.as_i64().ok()))
}

fn first_cell_bool(rows: &[tm_db::Row]) -> bool {
    rows.first()
        .and_then(|r| r.first())
        .and_then(|v| v.as_bool().ok())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
