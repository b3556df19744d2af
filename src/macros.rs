//! Logging macros
//!
//! Each macro takes a logger (anything implementing [`Log`](crate::Log))
//! followed by the message arguments. Arguments may be any `Serialize`
//! value; they are converted with
//! [`to_arg`](crate::core::formatter::to_arg) and formatted with the
//! printf-style rules of the formatter.
//!
//! # Examples
//!
//! ```
//! use cc_logger::prelude::*;
//! use cc_logger::appenders::BufferTerminal;
//! use cc_logger::{info, warn};
//!
//! let screen = BufferTerminal::new();
//! let logger = Logger::builder().terminal(screen.clone()).build().unwrap();
//!
//! info!(logger, "Server started");
//! warn!(logger, "fuel %d/%d", 12, 80);
//! warn!(logger, "inventory", vec!["coal", "iron"]);
//!
//! let lines = screen.lines();
//! assert!(lines[1].ends_with("fuel 12/80"));
//! assert!(lines[2].ends_with("inventory [\"coal\",\"iron\"]"));
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use cc_logger::prelude::*;
/// # let logger = Logger::builder().terminal(cc_logger::BufferTerminal::new()).build().unwrap();
/// use cc_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: %d", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:expr),+ $(,)?) => {{
        use $crate::Log as _;
        $logger.log($level, &[$($crate::core::formatter::to_arg(&$arg)),+])
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg),+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg),+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use cc_logger::prelude::*;
/// # let logger = Logger::builder().terminal(cc_logger::BufferTerminal::new()).build().unwrap();
/// use cc_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing %d items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg),+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg),+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg),+)
    };
}

/// Log a fatal-level message.
///
/// Fatal records are logged like any other; the program keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg),+)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::BufferTerminal;
    use crate::core::{LogContext, LogLevel, Logger, Log};

    #[test]
    fn test_macros_reach_the_logger() {
        let screen = BufferTerminal::new();
        let logger = Logger::builder()
            .level(LogLevel::Trace)
            .terminal(screen.clone())
            .build()
            .unwrap();

        trace!(logger, "t");
        debug!(logger, "d %s", "x");
        info!(logger, "i %d", 1);
        warn!(logger, "w");
        error!(logger, "e %q", "quoted");
        fatal!(logger, "f", 2, true);

        let lines = screen.lines();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].ends_with("d x"));
        assert!(lines[2].ends_with("i 1"));
        assert!(lines[4].ends_with("e \"quoted\""));
        assert!(lines[5].ends_with("f 2 true"));
    }

    #[test]
    fn test_macros_work_on_children() {
        let screen = BufferTerminal::new();
        let logger = Logger::builder().terminal(screen.clone()).build().unwrap();
        let child = logger.child(LogContext::new().with_field("job", "farm"));

        info!(child, "harvested %d", 12);
        assert!(screen.lines()[0].ends_with("[job=farm] harvested 12"));
    }
}
