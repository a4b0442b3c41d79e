//! In-memory fakes for orchestrator tests.
//!
//! The connection and the metadata store share one state cell so that
//! metadata rows written inside an open transaction disappear again when
//! the connection rolls back, the way they would against a real database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tm_core::{AppliedMigration, MigrationKind, MigrationScript, Version};
use tm_db::{Connection, DbError, DbKind, DbResult, Row, Value};
use tm_meta::{MetaResult, MetadataStore};

#[derive(Default)]
struct Shared {
    rows: Vec<AppliedMigration>,
    next_id: i64,
    in_tx: bool,
    tx_rows: Vec<i64>,
    executed: Vec<String>,
    results: VecDeque<DbResult<Vec<Row>>>,
    fail_on: Option<String>,
    /// Models the metadata table living inside an erased schema: executing
    /// SQL containing this needle wipes the stored rows.
    clear_rows_on: Option<String>,
    deny_lock: bool,
    table_locks: usize,
    table_releases: usize,
}

impl Shared {
    fn insert(&mut self, row: AppliedMigration) {
        if self.in_tx {
            self.tx_rows.push(row.id);
        }
        self.rows.push(row);
    }
}

pub(crate) struct Harness {
    kind: DbKind,
    state: Arc<Mutex<Shared>>,
}

impl Harness {
    pub fn new(kind: DbKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn conn(&self) -> RecordingConn {
        RecordingConn {
            kind: self.kind,
            state: Arc::clone(&self.state),
        }
    }

    pub fn store(&self) -> Box<MemStore> {
        Box::new(MemStore {
            state: Arc::clone(&self.state),
        })
    }

    pub fn push_result(&self, rows: Vec<Row>) {
        self.state.lock().unwrap().results.push_back(Ok(rows));
    }

    pub fn fail_execute_containing(&self, needle: &str) {
        self.state.lock().unwrap().fail_on = Some(needle.to_string());
    }

    pub fn clear_rows_when_executing(&self, needle: &str) {
        self.state.lock().unwrap().clear_rows_on = Some(needle.to_string());
    }

    pub fn deny_lock(&self) {
        self.state.lock().unwrap().deny_lock = true;
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn rows(&self) -> Vec<AppliedMigration> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn table_locks(&self) -> usize {
        self.state.lock().unwrap().table_locks
    }

    pub fn table_releases(&self) -> usize {
        self.state.lock().unwrap().table_releases
    }

    /// Seed an already-applied script row, as a previous run would have.
    pub fn seed_applied(&self, script: &MigrationScript) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let row = AppliedMigration {
            id: state.next_id,
            kind: script.kind(),
            version: script.version().cloned(),
            description: script.description().to_string(),
            name: script.name().to_string(),
            checksum: Some(script.checksum().to_string()),
            installed_by: "tester".to_string(),
            installed_on: Utc::now(),
            success: true,
        };
        state.insert(row);
    }

    pub fn seed_marker(&self, kind: MigrationKind, version: Option<Version>, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let row = AppliedMigration {
            id: state.next_id,
            kind,
            version,
            description: name.to_string(),
            name: name.to_string(),
            checksum: None,
            installed_by: "tester".to_string(),
            installed_on: Utc::now(),
            success: true,
        };
        state.insert(row);
    }
}

pub(crate) struct RecordingConn {
    kind: DbKind,
    state: Arc<Mutex<Shared>>,
}

#[async_trait]
impl Connection for RecordingConn {
    fn kind(&self) -> DbKind {
        self.kind
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> DbResult<u64> {
        let mut state = self.state.lock().unwrap();
        if let Some(needle) = state.fail_on.as_deref() {
            if sql.contains(needle) {
                return Err(DbError::execution("scripted failure", sql));
            }
        }
        state.executed.push(sql.to_string());
        let wipe = state
            .clear_rows_on
            .as_deref()
            .is_some_and(|needle| sql.contains(needle));
        if wipe {
            state.rows.clear();
            state.tx_rows.clear();
        }
        Ok(1)
    }

    async fn query(&self, _sql: &str, _params: &[Value]) -> DbResult<Vec<Row>> {
        match self.state.lock().unwrap().results.pop_front() {
            Some(result) => result,
            None => Ok(Vec::new()),
        }
    }

    async fn begin(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.executed.push("BEGIN".to_string());
        state.in_tx = true;
        Ok(())
    }

    async fn commit(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.executed.push("COMMIT".to_string());
        state.in_tx = false;
        state.tx_rows.clear();
        Ok(())
    }

    async fn rollback(&self) -> DbResult<()> {
        let mut state = self.state.lock().unwrap();
        state.executed.push("ROLLBACK".to_string());
        state.in_tx = false;
        let discarded = std::mem::take(&mut state.tx_rows);
        state.rows.retain(|r| !discarded.contains(&r.id));
        Ok(())
    }
}

pub(crate) struct MemStore {
    state: Arc<Mutex<Shared>>,
}

#[async_trait]
impl MetadataStore for MemStore {
    async fn create_if_not_exists(&self) -> MetaResult<bool> {
        Ok(false)
    }

    async fn try_lock(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.deny_lock {
            return false;
        }
        state.table_locks += 1;
        true
    }

    async fn release_lock(&self) -> bool {
        self.state.lock().unwrap().table_releases += 1;
        true
    }

    async fn save(&self, script: &MigrationScript, success: bool) -> MetaResult<()> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let row = AppliedMigration {
            id: state.next_id,
            kind: script.kind(),
            version: script.version().cloned(),
            description: script.description().to_string(),
            name: script.name().to_string(),
            checksum: Some(script.checksum().to_string()),
            installed_by: "tester".to_string(),
            installed_on: Utc::now(),
            success,
        };
        state.insert(row);
        Ok(())
    }

    async fn save_marker(
        &self,
        kind: MigrationKind,
        version: Option<&Version>,
        description: &str,
        name: &str,
    ) -> MetaResult<()> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let row = AppliedMigration {
            id: state.next_id,
            kind,
            version: version.cloned(),
            description: description.to_string(),
            name: name.to_string(),
            checksum: None,
            installed_by: "tester".to_string(),
            installed_on: Utc::now(),
            success: true,
        };
        state.insert(row);
        Ok(())
    }

    async fn update_checksum(&self, id: i64, checksum: &str) -> MetaResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.rows.iter_mut().find(|r| r.id == id) {
            row.checksum = Some(checksum.to_string());
        }
        Ok(())
    }

    async fn all_metadata(&self) -> MetaResult<Vec<AppliedMigration>> {
        let mut rows = self.state.lock().unwrap().rows.clone();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }
}
