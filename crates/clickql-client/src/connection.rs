//! Connection: compile, then hand off to the driver

use clickql_grammar::{CompiledStatement, Grammar};
use clickql_ir::{InsertPayload, Query, Record};
use clickql_registry::Parameters;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::driver::{Driver, Row};
use crate::ConnectionError;

pub struct Connection<D> {
    config: ConnectionConfig,
    driver: D,
    grammar: Grammar,
}

impl<D: Driver> Connection<D> {
    pub fn new(config: ConnectionConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            grammar: Grammar::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn select(&self, query: &Query) -> Result<Vec<Row>, ConnectionError> {
        let statement = self.grammar.compile_select(query)?;
        self.run_select(&statement.sql, &statement.parameters)
    }

    /// First row of the query, fetched with `limit 1`.
    pub fn select_one(&self, query: &Query) -> Result<Option<Row>, ConnectionError> {
        let statement = self.grammar.compile_select(&query.clone().limit(1))?;
        let rows = self.run_select(&statement.sql, &statement.parameters)?;
        Ok(rows.into_iter().next())
    }

    /// Raw `select` text with caller supplied parameters.
    pub fn select_raw(&self, sql: &str, parameters: &Parameters) -> Result<Vec<Row>, ConnectionError> {
        self.run_select(sql, parameters)
    }

    /// `count()` of the rows matching the query. No rows back counts as zero.
    pub fn count(&self, query: &Query) -> Result<u64, ConnectionError> {
        let statement = self.grammar.compile_count(query)?;
        let rows = self.run_select(&statement.sql, &statement.parameters)?;
        let Some(value) = rows.first().and_then(|row| row.values().next()) else {
            return Ok(0);
        };

        // ClickHouse's JSON formats quote 64-bit integers by default.
        let count = match value {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        };
        count.ok_or_else(|| ConnectionError::UnexpectedResult(format!("count() returned {}", value)))
    }

    /// Batch insert. An empty payload succeeds without reaching the driver.
    pub fn insert(
        &self,
        table: &str,
        payload: impl Into<InsertPayload>,
    ) -> Result<bool, ConnectionError> {
        let Some(statement) = self.grammar.compile_insert(table, payload.into())? else {
            debug!(table, "empty insert skipped");
            return Ok(true);
        };
        self.driver
            .insert(&statement.table, &statement.columns, &statement.rows)
            .map_err(ConnectionError::Driver)
    }

    /// Insert from a JSON object or an array of objects.
    pub fn insert_json(
        &self,
        table: &str,
        payload: serde_json::Value,
    ) -> Result<bool, ConnectionError> {
        self.insert(table, InsertPayload::from_json(payload)?)
    }

    /// Run `alter table ... update`. The driver cannot report affected rows,
    /// so the result is 1 when the statement succeeded and 0 otherwise.
    pub fn update(&self, query: &Query, assignments: &Record) -> Result<u64, ConnectionError> {
        let statement = self.grammar.compile_update(query, assignments)?;
        self.affected(&statement)
    }

    /// Run `alter table ... delete`. Same affected-row approximation as
    /// [`Connection::update`].
    pub fn delete(&self, query: &Query) -> Result<u64, ConnectionError> {
        let statement = self.grammar.compile_delete(query)?;
        self.affected(&statement)
    }

    pub fn statement(&self, sql: &str, parameters: &Parameters) -> Result<bool, ConnectionError> {
        self.driver
            .execute(sql, parameters)
            .map_err(ConnectionError::Driver)
    }

    pub fn unprepared(&self, sql: &str) -> Result<bool, ConnectionError> {
        self.statement(sql, &Parameters::default())
    }

    pub fn cursor(&self, _query: &Query) -> Result<(), ConnectionError> {
        Err(unsupported("cursor"))
    }

    pub fn affecting_statement(&self, _sql: &str, _parameters: &Parameters) -> Result<u64, ConnectionError> {
        Err(unsupported("affecting_statement"))
    }

    /// Parameters are already in driver form once compiled.
    pub fn prepare_bindings(&self, _parameters: &Parameters) -> Result<Parameters, ConnectionError> {
        Err(unsupported("prepare_bindings"))
    }

    pub fn pretend<T>(&self, _run: impl FnOnce(&Self) -> T) -> Result<Vec<String>, ConnectionError> {
        Err(unsupported("pretend"))
    }

    pub fn transaction<T>(&self, _run: impl FnOnce(&Self) -> T) -> Result<T, ConnectionError> {
        Err(no_transactions("transaction"))
    }

    pub fn begin_transaction(&self) -> Result<(), ConnectionError> {
        Err(no_transactions("begin_transaction"))
    }

    pub fn commit(&self) -> Result<(), ConnectionError> {
        Err(no_transactions("commit"))
    }

    pub fn roll_back(&self) -> Result<(), ConnectionError> {
        Err(no_transactions("roll_back"))
    }

    pub fn transaction_level(&self) -> Result<u32, ConnectionError> {
        Err(no_transactions("transaction_level"))
    }

    fn run_select(&self, sql: &str, parameters: &Parameters) -> Result<Vec<Row>, ConnectionError> {
        let rows = self
            .driver
            .select(sql, parameters)
            .map_err(ConnectionError::Driver)?;
        debug!(connection = %self.config.name, rows = rows.len(), "select finished");
        Ok(rows)
    }

    fn affected(&self, statement: &CompiledStatement) -> Result<u64, ConnectionError> {
        let ok = self.statement(&statement.sql, &statement.parameters)?;
        Ok(u64::from(ok))
    }
}

fn unsupported(operation: &'static str) -> ConnectionError {
    warn!(operation, "operation not supported by ClickHouse");
    ConnectionError::Unsupported(operation)
}

fn no_transactions(operation: &'static str) -> ConnectionError {
    warn!(operation, "transactions are not supported by ClickHouse");
    ConnectionError::NoTransactions
}
