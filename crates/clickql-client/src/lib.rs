//! ClickHouse connection layer
//!
//! Compiles query descriptions with [`clickql_grammar::Grammar`] and hands
//! the statement text and its parameters to a [`Driver`]. The driver is the
//! only part that talks to a server.

use clickql_grammar::CompileError;
use clickql_ir::IrError;
use thiserror::Error;

pub mod config;
pub mod connection;
pub mod driver;
pub mod logging;
pub mod mock;

pub use config::{Config, ConfigError, ConnectionConfig, LoggingConfig};
pub use connection::Connection;
pub use driver::{Driver, DriverError, Row};
pub use mock::{DriverCall, MockDriver};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("{0} is not supported by the ClickHouse connection")]
    Unsupported(&'static str),

    #[error("Clickhouse does not currently support transactions")]
    NoTransactions,

    #[error("Driver error: {0}")]
    Driver(#[source] DriverError),

    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),
}
