//! Fan-out of records to the terminal, monitor and file appenders
//!
//! Sink failures never propagate to the caller. A failing sink is reported
//! through the sinks that still work; when none do, the report goes to
//! stderr.

use super::monitor::MonitorAppender;
use super::rotating_file::RotatingFileAppender;
use super::terminal::TerminalAppender;
use crate::core::{
    Appender, LineFormat, LogLevel, LogRecord, LoggerConfig, LoggerError, PeripheralProvider, Result,
    Terminal,
};
use std::path::Path;
use std::sync::Arc;

pub struct Dispatcher {
    format: LineFormat,
    terminal: TerminalAppender,
    terminal_enabled: bool,
    monitors: MonitorAppender,
    monitors_enabled: bool,
    file: Option<RotatingFileAppender>,
    file_enabled: bool,
    file_failure_reported: bool,
}

impl Dispatcher {
    /// Dispatcher with terminal and monitors set up from `config`
    ///
    /// The file sink starts out empty; see [`Dispatcher::install_file`].
    pub fn new(terminal: Box<dyn Terminal>, peripherals: Arc<dyn PeripheralProvider>, config: &LoggerConfig) -> Self {
        Self {
            format: LineFormat::from_config(config),
            terminal: TerminalAppender::new(terminal).with_colors(config.colors),
            terminal_enabled: config.outputs.terminal,
            monitors: MonitorAppender::new(peripherals, &config.outputs.monitors, config.colors),
            monitors_enabled: !config.outputs.monitors.is_empty(),
            file: None,
            file_enabled: config.outputs.file,
            file_failure_reported: false,
        }
    }

    /// Apply a new configuration
    ///
    /// Monitors are revalidated silently and any open file is closed. The
    /// caller installs the replacement file afterwards.
    pub fn configure(&mut self, config: &LoggerConfig, peripherals: Arc<dyn PeripheralProvider>) {
        if let Err(e) = self.close_file() {
            eprintln!("[LOGGER ERROR] Failed to close log file: {}", e);
        }

        self.format = LineFormat::from_config(config);
        self.terminal.set_colors(config.colors);
        self.terminal_enabled = config.outputs.terminal;
        self.monitors = MonitorAppender::new(peripherals, &config.outputs.monitors, config.colors);
        self.monitors_enabled = !config.outputs.monitors.is_empty();
        self.file_enabled = config.outputs.file;
        self.file_failure_reported = false;
    }

    /// Take ownership of a freshly opened file sink, or report why it failed
    pub fn install_file(&mut self, file: Result<RotatingFileAppender>) {
        match file {
            Ok(file) => self.file = Some(file),
            Err(e) => {
                self.file = None;
                self.report_file_failure(&e);
            }
        }
    }

    pub fn format(&self) -> &LineFormat {
        &self.format
    }

    /// Write `record` to every enabled sink
    pub fn dispatch(&mut self, record: &LogRecord) {
        if self.terminal_enabled {
            if let Err(e) = self.terminal.append(record) {
                eprintln!("[LOGGER ERROR] Terminal write failed: {}", e);
            }
        }

        if self.monitors_enabled {
            if let Err(e) = self.monitors.append(record) {
                self.monitors_enabled = false;
                self.emit_diagnostic(LogLevel::Warn, &e.to_string());
                self.monitors_enabled = true;
            }
        }

        if self.file_enabled {
            let result = match self.file.as_mut() {
                Some(file) => file.append(record),
                None => Err(LoggerError::sink_unavailable("file", "no log file is open")),
            };
            if let Err(e) = result {
                self.report_file_failure(&e);
            }
        }
    }

    /// Report the first file failure through the other sinks
    ///
    /// Later failures are dropped until the next [`Dispatcher::configure`].
    fn report_file_failure(&mut self, error: &LoggerError) {
        if self.file_failure_reported {
            return;
        }
        self.file_failure_reported = true;

        let enabled = self.file_enabled;
        self.file_enabled = false;
        self.emit_diagnostic(LogLevel::Error, &format!("file output disabled: {}", error));
        self.file_enabled = enabled;
    }

    fn has_live_sink(&self) -> bool {
        self.terminal_enabled
            || (self.monitors_enabled && !self.monitors.active_names().is_empty())
            || (self.file_enabled && self.file.as_ref().is_some_and(|f| f.is_open()))
    }

    /// Emit a message produced by the logger itself, ignoring the level threshold
    pub fn emit_diagnostic(&mut self, level: LogLevel, message: &str) {
        if !self.has_live_sink() {
            eprintln!("[LOGGER ERROR] {}", message);
            return;
        }
        let record = LogRecord::new(level, None, message, &self.format);
        self.dispatch(&record);
    }

    pub fn flush(&mut self) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn close_file(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => file.close(),
            None => Ok(()),
        }
    }

    /// Release the file handle and stop file output
    ///
    /// Terminal and monitor output continue.
    pub fn close(&mut self) -> Result<()> {
        self.file_enabled = false;
        self.close_file()
    }

    pub fn current_log_file(&self) -> Option<&Path> {
        self.file
            .as_ref()
            .filter(|file| file.is_open())
            .map(|file| file.path())
    }
}
