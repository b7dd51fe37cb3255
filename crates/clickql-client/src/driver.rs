//! Driver seam between compiled statements and a ClickHouse client

use clickql_ir::Value;
use clickql_registry::Parameters;

/// One result row keyed by column name, in server order.
pub type Row = serde_json::Map<String, serde_json::Value>;

pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Executes compiled statements. Implementations substitute each `{token}`
/// placeholder with the matching entry of [`Parameters`] server side.
pub trait Driver {
    /// Run a `select` and return its rows.
    fn select(&self, sql: &str, parameters: &Parameters) -> Result<Vec<Row>, DriverError>;

    /// Batch insert of positional rows. Every row follows `columns`.
    fn insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<bool, DriverError>;

    /// Run a statement that returns no rows.
    fn execute(&self, sql: &str, parameters: &Parameters) -> Result<bool, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &D {
    fn select(&self, sql: &str, parameters: &Parameters) -> Result<Vec<Row>, DriverError> {
        (**self).select(sql, parameters)
    }

    fn insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<bool, DriverError> {
        (**self).insert(table, columns, rows)
    }

    fn execute(&self, sql: &str, parameters: &Parameters) -> Result<bool, DriverError> {
        (**self).execute(sql, parameters)
    }
}
