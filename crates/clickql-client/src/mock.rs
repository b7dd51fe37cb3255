//! In-memory driver for tests: records every call, returns canned rows

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use clickql_ir::Value;
use clickql_registry::Parameters;

use crate::driver::{Driver, DriverError, Row};

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Select {
        sql: String,
        parameters: Parameters,
    },
    Insert {
        table: String,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    Execute {
        sql: String,
        parameters: Parameters,
    },
}

/// Mock driver for testing
#[derive(Debug)]
pub struct MockDriver {
    calls: Mutex<Vec<DriverCall>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    execute_result: bool,
    failure: Option<String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            results: Mutex::new(VecDeque::new()),
            execute_result: true,
            failure: None,
        }
    }

    /// Queue the rows returned by the next `select`. Selects with nothing
    /// queued return no rows.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rows);
    }

    /// Value reported by `insert` and `execute`.
    pub fn with_execute_result(mut self, result: bool) -> Self {
        self.execute_result = result;
        self
    }

    /// Fail every call with `message` (calls are still recorded).
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: DriverCall) -> Result<(), DriverError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MockDriver {
    fn select(&self, sql: &str, parameters: &Parameters) -> Result<Vec<Row>, DriverError> {
        self.record(DriverCall::Select {
            sql: sql.to_string(),
            parameters: parameters.clone(),
        })?;
        Ok(self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_default())
    }

    fn insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<bool, DriverError> {
        self.record(DriverCall::Insert {
            table: table.to_string(),
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        })?;
        Ok(self.execute_result)
    }

    fn execute(&self, sql: &str, parameters: &Parameters) -> Result<bool, DriverError> {
        self.record(DriverCall::Execute {
            sql: sql.to_string(),
            parameters: parameters.clone(),
        })?;
        Ok(self.execute_result)
    }
}
