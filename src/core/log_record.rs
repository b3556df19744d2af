//! Per-call log record
//!
//! A `LogRecord` lives for a single dispatch: it carries the level, the
//! merged context, the formatted message, the timestamp and the rendered
//! line every sink writes.

use super::config::{LoggerConfig, DEFAULT_TIMESTAMP_FORMAT};
use super::formatter::format_message;
use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt::Write;

/// How a record is turned into a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    pub abbreviate_level: bool,
    pub timestamp_format: String,
}

impl LineFormat {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            abbreviate_level: config.abbreviate_level,
            timestamp_format: config.timestamp_format.clone(),
        }
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            abbreviate_level: false,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub context: Option<LogContext>,
    pub message: String,
    pub timestamp: DateTime<Local>,
    pub line: String,
}

impl LogRecord {
    /// Sanitize log text to prevent log injection
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so one record is always one line.
    fn sanitize(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(
        level: LogLevel,
        context: Option<LogContext>,
        message: impl Into<String>,
        format: &LineFormat,
    ) -> Self {
        let message = Self::sanitize(&message.into());
        let timestamp = Local::now();
        let line = render_line(level, context.as_ref(), &message, &timestamp, format);

        Self {
            level,
            context,
            message,
            timestamp,
            line,
        }
    }

    /// Format `args` and build the record
    pub fn from_args(
        level: LogLevel,
        context: Option<LogContext>,
        args: &[Value],
        format: &LineFormat,
    ) -> Self {
        Self::new(level, context, format_message(args), format)
    }
}

/// `[<TAG>] [<timestamp>] [k1=v1,k2=v2] <message>`
pub fn render_line(
    level: LogLevel,
    context: Option<&LogContext>,
    message: &str,
    timestamp: &DateTime<Local>,
    format: &LineFormat,
) -> String {
    let mut line = format!(
        "[{}] [{}] ",
        level.tag(format.abbreviate_level),
        format_timestamp(timestamp, &format.timestamp_format)
    );

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        line.push('[');
        line.push_str(&LogRecord::sanitize(&context.format_fields()));
        line.push_str("] ");
    }

    line.push_str(message);
    line
}

/// Format with `pattern`, falling back to the default pattern if it is invalid
pub fn format_timestamp(timestamp: &DateTime<Local>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(pattern)).is_err() {
        out.clear();
        let _ = write!(out, "{}", timestamp.format(DEFAULT_TIMESTAMP_FORMAT));
    }
    out
}
