//! Structured logging setup
//!
//! Compiled statements are logged at `debug` by `clickql_grammar`, binding
//! token assignment at `trace` by `clickql_registry`.

use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "clickql.log";

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format for development
    Pretty,
    /// JSON format for production (structured logging)
    Json,
    /// Compact format for testing
    Compact,
}

impl LogFormat {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    File,
    Both,
}

impl LogOutput {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match std::env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            _ => LogOutput::Stdout,
        }
    }
}

/// Install the global subscriber.
///
/// Environment variables:
/// - `RUST_LOG`: Log level (e.g., "debug", "clickql_grammar=trace")
/// - `LOG_FORMAT`: Output format ("pretty", "json", "compact")
/// - `LOG_OUTPUT`: Where to write logs ("stdout", "file", "both")
/// - `LOG_DIR`: Directory for log files (default: "./logs")
///
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let format = LogFormat::from_env();
    let output = LogOutput::from_env();
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

    subscriber(format, output, &log_dir).try_init()?;

    tracing::info!(format = ?format, output = ?output, "Logging system initialized");
    Ok(())
}

/// Build the subscriber [`init`] installs, without installing it.
pub fn subscriber(
    format: LogFormat,
    output: LogOutput,
    log_dir: &str,
) -> impl Subscriber + Send + Sync + 'static {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clickql_client=debug"));

    let stdout_layer = match output {
        LogOutput::File => None,
        LogOutput::Stdout | LogOutput::Both => Some(match format {
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_target(true)
                .boxed(),
            LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
            LogFormat::Compact => fmt::layer().compact().boxed(),
        }),
    };

    let file_layer = match output {
        LogOutput::Stdout => None,
        LogOutput::File | LogOutput::Both => {
            std::fs::create_dir_all(log_dir).ok();
            let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .boxed(),
            )
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both env cases live in one test so parallel tests never race on them.
    #[test]
    fn test_format_and_output_from_env() {
        std::env::set_var("LOG_FORMAT", "json");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);

        std::env::set_var("LOG_FORMAT", "compact");
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);

        std::env::remove_var("LOG_FORMAT");
        assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

        std::env::set_var("LOG_OUTPUT", "file");
        assert_eq!(LogOutput::from_env(), LogOutput::File);

        std::env::set_var("LOG_OUTPUT", "both");
        assert_eq!(LogOutput::from_env(), LogOutput::Both);

        std::env::remove_var("LOG_OUTPUT");
        assert_eq!(LogOutput::from_env(), LogOutput::Stdout);
    }

    #[test]
    fn test_subscriber_accepts_events() {
        let log_dir = std::env::temp_dir().join("clickql_logging_test");
        let log_dir = log_dir.to_string_lossy().into_owned();

        for (format, output) in [
            (LogFormat::Json, LogOutput::Stdout),
            (LogFormat::Compact, LogOutput::Both),
            (LogFormat::Pretty, LogOutput::File),
        ] {
            tracing::subscriber::with_default(subscriber(format, output, &log_dir), || {
                tracing::info!(format = ?format, output = ?output, "subscriber installed");
                tracing::debug!(target: "clickql_client", "statement sent");
            });
        }

        assert!(std::path::Path::new(&log_dir).is_dir());
        std::fs::remove_dir_all(&log_dir).ok();
    }
}
