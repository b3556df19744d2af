//! Appender implementations

pub mod dispatcher;
pub mod monitor;
pub mod rotating_file;
pub mod rotation;
pub mod terminal;

pub use dispatcher::Dispatcher;
pub use monitor::MonitorAppender;
pub use rotating_file::RotatingFileAppender;
pub use rotation::BannerInfo;
pub use terminal::{BufferTerminal, StdoutTerminal, TerminalAppender};

pub use crate::core::Appender;
