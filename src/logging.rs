//! Structured logging for measurement runs
//!
//! Lightweight line-oriented logger: level filtering, timestamps, a
//! per-run correlation id, and optional JSON output for log aggregators.
//! Log lines go to stderr so they never mix with result output on stdout.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    /// Suppresses all output
    Off = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Off => "OFF",
        }
    }
}

/// Logger with a per-run correlation id
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    json: bool,
    run_id: Uuid,
}

impl Logger {
    /// Create a logger emitting entries at or above `min_level`
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            json: false,
            run_id: Uuid::new_v4(),
        }
    }

    /// Create a logger that discards everything
    pub fn disabled() -> Self {
        Self::new(LogLevel::Off)
    }

    /// Switch to JSON line output
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Whether entries are emitted as JSON lines
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Correlation id shared by every entry of this run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whether an entry at `level` would be emitted
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.min_level
    }

    /// Emit a log entry for `component`
    pub fn log(&self, level: LogLevel, component: &str, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let timestamp = Utc::now();
        if self.json {
            let entry = serde_json::json!({
                "timestamp": timestamp.to_rfc3339(),
                "level": level.as_str(),
                "component": component,
                "run_id": self.run_id,
                "message": message,
            });
            eprintln!("{}", entry);
        } else {
            eprintln!(
                "{} [{}] {} ({}) {}",
                timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                level.as_str(),
                component,
                self.run_id,
                message
            );
        }
    }

    pub fn debug(&self, component: &str, message: &str) {
        self.log(LogLevel::Debug, component, message);
    }

    pub fn info(&self, component: &str, message: &str) {
        self.log(LogLevel::Info, component, message);
    }

    pub fn warn(&self, component: &str, message: &str) {
        self.log(LogLevel::Warn, component, message);
    }

    pub fn error(&self, component: &str, message: &str) {
        self.log(LogLevel::Error, component, message);
    }
}
