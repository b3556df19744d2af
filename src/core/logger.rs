//! Main logger implementation

use super::{
    child::ChildLogger,
    config::LoggerConfig,
    environment::{Environment, HostInfo, PeripheralProvider, Storage, Terminal},
    error::Result,
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
};
use crate::appenders::rotation::{infer_source_label, BannerInfo};
use crate::appenders::{Dispatcher, RotatingFileAppender};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lifecycle of a logger instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoggerState {
    /// No instance has been created yet
    Unconfigured,
    /// Accepting records on every configured sink
    Configured,
    /// File handle released; terminal and monitors still work
    Closed,
}

/// Anything that accepts log calls
///
/// Implementors supply [`Log::log_with_context`] and [`Log::is_enabled`];
/// the per-level methods all funnel into the former.
pub trait Log: Send + Sync {
    /// Log `args` at `level` with an optional per-call context
    ///
    /// `args` follow the formatter's rules: a leading string with printf
    /// specifiers consumes the matching arguments, anything left over is
    /// appended.
    fn log_with_context(&self, level: LogLevel, context: Option<&LogContext>, args: &[Value]);

    /// Whether a record at `level` would be emitted
    fn is_enabled(&self, level: LogLevel) -> bool;

    fn log(&self, level: LogLevel, args: &[Value]) {
        self.log_with_context(level, None, args);
    }

    fn trace(&self, args: &[Value]) {
        self.log(LogLevel::Trace, args);
    }

    fn debug(&self, args: &[Value]) {
        self.log(LogLevel::Debug, args);
    }

    fn info(&self, args: &[Value]) {
        self.log(LogLevel::Info, args);
    }

    fn warn(&self, args: &[Value]) {
        self.log(LogLevel::Warn, args);
    }

    fn error(&self, args: &[Value]) {
        self.log(LogLevel::Error, args);
    }

    fn fatal(&self, args: &[Value]) {
        self.log(LogLevel::Fatal, args);
    }

    fn trace_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Trace, Some(context), args);
    }

    fn debug_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Debug, Some(context), args);
    }

    fn info_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Info, Some(context), args);
    }

    fn warn_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Warn, Some(context), args);
    }

    fn error_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Error, Some(context), args);
    }

    fn fatal_with_context(&self, context: &LogContext, args: &[Value]) {
        self.log_with_context(LogLevel::Fatal, Some(context), args);
    }

    /// A logger that adds `context` to every call before forwarding here
    fn child(&self, context: LogContext) -> ChildLogger<'_>
    where
        Self: Sized,
    {
        ChildLogger::new(self, context)
    }

    /// Like [`Log::child`], taking the context as a JSON map
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `context` is not an object.
    fn child_value(&self, context: Value) -> Result<ChildLogger<'_>>
    where
        Self: Sized,
    {
        Ok(ChildLogger::new(self, LogContext::try_from(context)?))
    }
}

struct LoggerInner {
    config: LoggerConfig,
    state: LoggerState,
    dispatcher: Dispatcher,
    storage: Arc<dyn Storage>,
    peripherals: Arc<dyn PeripheralProvider>,
    host: HostInfo,
}

impl LoggerInner {
    /// Point every sink at `config` and open a new log file if requested
    fn apply(&mut self, config: LoggerConfig) {
        self.dispatcher.configure(&config, Arc::clone(&self.peripherals));
        self.open_file(&config);
        self.config = config;
        self.state = LoggerState::Configured;
    }

    fn open_file(&mut self, config: &LoggerConfig) {
        if !config.outputs.file {
            return;
        }
        let banner = BannerInfo {
            host: self.host.clone(),
            source_label: infer_source_label(config.file.source_label.as_deref(), &self.host),
            level: config.level,
        };
        let file = RotatingFileAppender::open(Arc::clone(&self.storage), config.file.clone(), banner);
        self.dispatcher.install_file(file);
    }
}

/// Multi-sink logger
///
/// All mutable state sits behind one mutex, so a `Logger` can be shared
/// across threads; each call runs to completion before the next starts.
///
/// # Examples
///
/// ```
/// use cc_logger::prelude::*;
/// use cc_logger::appenders::BufferTerminal;
/// use serde_json::json;
///
/// let screen = BufferTerminal::new();
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .terminal(screen.clone())
///     .build()
///     .unwrap();
///
/// logger.debug(&[json!("fuel at %d%%"), json!(80)]);
/// assert!(screen.lines()[0].ends_with("fuel at 80%"));
/// ```
pub struct Logger {
    inner: Mutex<LoggerInner>,
}

impl Logger {
    /// Create a logger on the default (desktop) environment
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_environment(config, Environment::default())
    }

    /// Create a logger writing through `env`
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate. File sink problems are not
    /// errors; they are reported once through the other sinks.
    pub fn with_environment(config: LoggerConfig, env: Environment) -> Result<Self> {
        config.validate()?;

        let dispatcher = Dispatcher::new(env.terminal, Arc::clone(&env.peripherals), &config);
        let mut inner = LoggerInner {
            config: config.clone(),
            state: LoggerState::Configured,
            dispatcher,
            storage: env.storage,
            peripherals: env.peripherals,
            host: env.host,
        };
        inner.open_file(&config);

        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Merge `overlay` into the current configuration and reapply it
    ///
    /// Maps merge key by key, lists are appended and scalars replaced. The
    /// log file is reopened, so a closed logger resumes file output. On
    /// error nothing changes.
    ///
    /// # Errors
    ///
    /// `InvalidLevel` for an unknown level name, `InvalidConfiguration` for
    /// any other invalid setting.
    pub fn configure(&self, overlay: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        let config = inner.config.merged(overlay)?;
        inner.apply(config);
        Ok(())
    }

    /// Flush and release the log file
    ///
    /// Terminal and monitor output keep working. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == LoggerState::Closed {
            return Ok(());
        }
        inner.state = LoggerState::Closed;
        inner.dispatcher.close()
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.lock().dispatcher.flush()
    }

    /// Log at a level given by name
    ///
    /// # Errors
    ///
    /// `InvalidLevel` when `name` is not a known level.
    pub fn log_named(&self, name: &str, args: &[Value]) -> Result<()> {
        let level: LogLevel = name.parse()?;
        self.log(level, args);
        Ok(())
    }

    pub fn set_level(&self, level: LogLevel) {
        self.inner.lock().config.level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.inner.lock().config.level
    }

    /// Snapshot of the configuration in force
    pub fn config(&self) -> LoggerConfig {
        self.inner.lock().config.clone()
    }

    pub fn state(&self) -> LoggerState {
        self.inner.lock().state
    }

    /// Path of the open log file, if any
    pub fn current_log_file(&self) -> Option<PathBuf> {
        self.inner
            .lock()
            .dispatcher
            .current_log_file()
            .map(Path::to_path_buf)
    }
}

impl Log for Logger {
    fn log_with_context(&self, level: LogLevel, context: Option<&LogContext>, args: &[Value]) {
        let mut inner = self.inner.lock();
        if !level.is_enabled_at(inner.config.level) {
            return;
        }
        let record = LogRecord::from_args(level, context.cloned(), args, inner.dispatcher.format());
        inner.dispatcher.dispatch(&record);
    }

    fn is_enabled(&self, level: LogLevel) -> bool {
        level.is_enabled_at(self.level())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Logger")
            .field("level", &inner.config.level)
            .field("state", &inner.state)
            .field("log_file", &inner.dispatcher.current_log_file())
            .finish()
    }
}

/// Builder for Logger with fluent API
///
/// Settings go into a [`LoggerConfig`]; host collaborators default to the
/// desktop [`Environment`].
///
/// # Example
/// ```no_run
/// use cc_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .abbreviate_level(true)
///     .monitors(["top", "monitor_2"])
///     .file_output(true)
///     .log_directory("/logs")
///     .max_retained_files(5)
///     .build()
///     .unwrap();
///
/// logger.info(&["started".into()]);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    env: Environment,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            env: Environment::default(),
        }
    }

    /// Replace every setting with `config`
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn abbreviate_level(mut self, abbreviate: bool) -> Self {
        self.config.abbreviate_level = abbreviate;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn colors(mut self, colors: bool) -> Self {
        self.config.colors = colors;
        self
    }

    /// strftime pattern for the timestamp block
    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, pattern: impl Into<String>) -> Self {
        self.config.timestamp_format = pattern.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn terminal_output(mut self, enabled: bool) -> Self {
        self.config.outputs.terminal = enabled;
        self
    }

    /// Add one monitor by device name
    #[must_use = "builder methods return a new value"]
    pub fn monitor(mut self, name: impl Into<String>) -> Self {
        self.config.outputs.monitors.push(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn monitors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.outputs.monitors.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_output(mut self, enabled: bool) -> Self {
        self.config.outputs.file = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.file.base_directory = dir.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_retained_files(mut self, count: usize) -> Self {
        self.config.file.max_retained_files = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn write_banner(mut self, enabled: bool) -> Self {
        self.config.file.write_banner = enabled;
        self
    }

    /// Label used in log file names instead of the program name
    #[must_use = "builder methods return a new value"]
    pub fn source_label(mut self, label: impl Into<String>) -> Self {
        self.config.file.source_label = Some(label.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.file.max_file_bytes = Some(bytes);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn terminal<T: Terminal + 'static>(mut self, terminal: T) -> Self {
        self.env.terminal = Box::new(terminal);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn peripherals(mut self, provider: Arc<dyn PeripheralProvider>) -> Self {
        self.env.peripherals = provider;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.env.storage = storage;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn host(mut self, host: HostInfo) -> Self {
        self.env.host = host;
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Fails when the collected configuration does not validate.
    pub fn build(self) -> Result<Logger> {
        Logger::with_environment(self.config, self.env)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
