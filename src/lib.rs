//! # cc_logger
//!
//! A structured, multi-sink logger for small automation hosts: a terminal
//! with text colors, any number of attached monitor peripherals, and a
//! directory of rotating log files.
//!
//! ## Features
//!
//! - **Level filtering**: `TRACE` through `FATAL`, inclusive threshold
//! - **printf-style messages**: `%d`, `%s`, `%q` and friends, with a raw
//!   fallback that never fails the call
//! - **Context**: sorted key-value fields, inherited through child loggers
//! - **Rotation**: one file per run, bounded retention, optional size limit
//! - **Injectable host**: terminal, peripherals and storage are traits
//!
//! ## Example
//!
//! ```
//! use cc_logger::prelude::*;
//! use cc_logger::appenders::BufferTerminal;
//! use cc_logger::info;
//!
//! let screen = BufferTerminal::new();
//! let logger = Logger::builder()
//!     .abbreviate_level(true)
//!     .terminal(screen.clone())
//!     .build()
//!     .unwrap();
//!
//! info!(logger, "mined %d blocks in %.1fs", 64, 12.34);
//! assert!(screen.lines()[0].starts_with("[I] ["));
//! assert!(screen.lines()[0].ends_with("mined 64 blocks in 12.3s"));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        merge_context, ChildLogger, Environment, HostInfo, Log, LogContext, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggerRegistry, LoggerState, Result,
    };
}

pub use crate::appenders::{BufferTerminal, StdoutTerminal};
pub use crate::core::{
    merge_config, merge_context, Appender, BuildInfo, ChildLogger, Environment, FileSinkConfig,
    HostInfo, LocalStorage, Log, LogContext, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerRegistry, LoggerState, Monitor, NoPeripherals, OutputsConfig,
    PeripheralProvider, Result, Storage, Terminal,
};
