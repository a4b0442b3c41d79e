//! Scriptable fake connection for protocol tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tm_db::{Connection, DbError, DbKind, DbResult, Row, Value};

/// Records every statement and replays scripted query results in order.
pub(crate) struct FakeConn {
    kind: DbKind,
    pub executed: Mutex<Vec<(String, Vec<Value>)>>,
    pub queries: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<DbResult<Vec<Row>>>>,
    /// Substring that makes `execute` fail when present in the SQL.
    fail_execute_on: Mutex<Option<String>>,
}

impl FakeConn {
    pub fn new(kind: DbKind) -> Self {
        Self {
            kind,
            executed: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            fail_execute_on: Mutex::new(None),
        }
    }

    /// Queue the result for the next `query` call.
    pub fn push_result(&self, rows: Vec<Row>) {
        self.results.lock().unwrap().push_back(Ok(rows));
    }

    pub fn push_error(&self, message: &str) {
        self.results
            .lock()
            .unwrap()
            .push_back(Err(DbError::execution(message, "")));
    }

    pub fn fail_execute_containing(&self, needle: &str) {
        *self.fail_execute_on.lock().unwrap() = Some(needle.to_string());
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub fn queried_sql(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[async_trait]
impl Connection for FakeConn {
    fn kind(&self) -> DbKind {
        self.kind
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DbResult<u64> {
        if let Some(needle) = self.fail_execute_on.lock().unwrap().as_deref() {
            if sql.contains(needle) {
                return Err(DbError::execution("scripted failure", sql));
            }
        }
        self.executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        self.queries
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match self.results.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }

    async fn begin(&self) -> DbResult<()> {
        self.executed
            .lock()
            .unwrap()
            .push(("BEGIN".to_string(), Vec::new()));
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        self.executed
            .lock()
            .unwrap()
            .push(("COMMIT".to_string(), Vec::new()));
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        self.executed
            .lock()
            .unwrap()
            .push(("ROLLBACK".to_string(), Vec::new()));
        Ok(())
    }
}
