//! Pipeline log entries routed to `tracing`.
//!
//! Library code logs through the small helpers below; the binary installs
//! the subscriber with [`init_tracing`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level of a pipeline message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Pipeline stage that produced the entry
    #[serde(default)]
    pub stage: Option<String>,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), stage: None }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), stage: None }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), stage: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), stage: None }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Emit this entry as a `tracing` event.
    pub fn emit(&self) {
        let stage = self.stage.as_deref().unwrap_or("-");
        match self.level {
            LogLevel::Info => tracing::info!(stage, "{}", self.message),
            LogLevel::Success => tracing::info!(stage, outcome = "success", "{}", self.message),
            LogLevel::Warning => tracing::warn!(stage, "{}", self.message),
            LogLevel::Error => tracing::error!(stage, "{}", self.message),
        }
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LogEntry::info(msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::success(msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::warning(msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::error(msg).emit();
}

pub fn log_stage(stage: &str, msg: impl Into<String>) {
    LogEntry::info(msg).with_stage(stage).emit();
}

/// Install the console subscriber.
///
/// The filter defaults to `player_ranker=info` (`debug` when `verbose`)
/// and is overridden by `RUST_LOG`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "player_ranker=debug" } else { "player_ranker=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builders() {
        let entry = LogEntry::warning("3 rows dropped").with_stage("clean");
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.stage.as_deref(), Some("clean"));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(LogEntry::success("done")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "done");
    }

    #[test]
    fn test_emit_after_init() {
        init_tracing(false);
        log_stage("load", "loaded 0 rows");
        log_error("nothing to do");
    }
}
