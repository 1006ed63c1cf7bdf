//! Shared fixtures for the integration tests
#![allow(dead_code)]

pub mod schema;

use std::collections::VecDeque;
use std::sync::Mutex;

use tabula::{Database, DatabaseConfig, ExecutionError, Executor, RowSet};

/// Records every statement and replays queued responses.
///
/// Statements without a queued response succeed with an empty result.
#[derive(Debug, Default)]
pub struct MockExecutor {
    statements: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<RowSet, ExecutionError>>>,
    last_id: Mutex<i64>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next unanswered statement
    pub fn respond(&self, rows: RowSet) {
        self.responses.lock().unwrap().push_back(Ok(rows));
    }

    pub fn fail(&self, error: ExecutionError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn set_last_id(&self, id: i64) {
        *self.last_id.lock().unwrap() = id;
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    pub fn last_statement(&self) -> Option<String> {
        self.statements.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.statements.lock().unwrap().clear();
    }
}

impl Executor for MockExecutor {
    fn execute(&self, sql: &str) -> Result<RowSet, ExecutionError> {
        self.statements.lock().unwrap().push(sql.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RowSet::new()))
    }

    fn last_inserted_id(&self) -> i64 {
        *self.last_id.lock().unwrap()
    }
}

/// A handle on the `garage` database backed by a fresh mock
pub fn setup_db() -> Database<MockExecutor> {
    Database::new(&DatabaseConfig::new("garage"), MockExecutor::new())
}
