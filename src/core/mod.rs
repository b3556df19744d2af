//! Core logger types and traits

pub mod appender;
pub mod child;
pub mod config;
pub mod environment;
pub mod error;
pub mod formatter;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod registry;

pub use appender::Appender;
pub use child::ChildLogger;
pub use config::{merge_config, FileSinkConfig, LoggerConfig, OutputsConfig};
pub use environment::{
    BuildInfo, Environment, HostInfo, LocalStorage, Monitor, NoPeripherals, PeripheralProvider,
    Storage, Terminal,
};
pub use error::{LoggerError, Result};
pub use formatter::{count_specifiers, format_message, stringify_value, to_arg};
pub use log_context::{merge_context, LogContext};
pub use log_level::LogLevel;
pub use log_record::{LineFormat, LogRecord};
pub use logger::{Log, Logger, LoggerBuilder, LoggerState};
pub use registry::LoggerRegistry;
