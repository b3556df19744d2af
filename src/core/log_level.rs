//! Log level definitions

use super::error::LoggerError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    /// Every level, lowest rank first
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Numeric weight used for threshold filtering
    #[must_use]
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lowercase name as it appears in configuration
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Level tag for a rendered line: `I` when abbreviated, `INFO` otherwise
    pub fn tag(&self, abbreviate: bool) -> &'static str {
        if abbreviate {
            &self.to_str()[..1]
        } else {
            self.to_str()
        }
    }

    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }

    /// Whether `name` parses as a level
    pub fn is_valid(name: &str) -> bool {
        name.parse::<LogLevel>().is_ok()
    }

    /// Inclusive threshold check: a record at `self` passes a logger set to `threshold`
    #[inline]
    pub fn is_enabled_at(&self, threshold: LogLevel) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

// Case-insensitive, so "WARN" and "warning" in a config file both work
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_monotonic() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(" Fatal ".parse::<LogLevel>().unwrap(), LogLevel::Fatal);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let err = "verbose".parse::<LogLevel>().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(ref name) if name == "verbose"));
        assert!(!LogLevel::is_valid("success"));
        assert!(LogLevel::is_valid("trace"));
    }

    #[test]
    fn test_tag() {
        assert_eq!(LogLevel::Error.tag(false), "ERROR");
        assert_eq!(LogLevel::Error.tag(true), "E");
        assert_eq!(LogLevel::Trace.tag(true), "T");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(LogLevel::Warn.is_enabled_at(LogLevel::Warn));
        assert!(LogLevel::Fatal.is_enabled_at(LogLevel::Warn));
        assert!(!LogLevel::Info.is_enabled_at(LogLevel::Warn));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LogLevel::Debug).unwrap();
        assert_eq!(json, "\"debug\"");

        let parsed: LogLevel = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(parsed, LogLevel::Error);

        assert!(serde_json::from_str::<LogLevel>("\"loud\"").is_err());
    }
}
