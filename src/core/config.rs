//! Logger configuration
//!
//! `LoggerConfig` is plain serde data. It can be built in code, through
//! [`LoggerBuilder`](crate::core::logger::LoggerBuilder), or loaded from a
//! JSON value, a JSON string or a TOML file (optionally under a `[logging]`
//! table).
//!
//! Reconfiguration goes through [`merge_config`], a recursive merge: nested
//! maps merge key by key, sequences are appended and scalars are replaced.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";
pub const DEFAULT_MAX_RETAINED_FILES: usize = 10;

/// Configuration for the logger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level to record
    pub level: LogLevel,

    /// Render the level tag as a single letter
    pub abbreviate_level: bool,

    /// Colorize terminal and monitor output by level
    pub colors: bool,

    /// strftime-style timestamp pattern
    pub timestamp_format: String,

    pub outputs: OutputsConfig,

    pub file: FileSinkConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            abbreviate_level: false,
            colors: true,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            outputs: OutputsConfig::default(),
            file: FileSinkConfig::default(),
        }
    }
}

/// Which sinks are enabled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub terminal: bool,

    /// Monitor device names, in write order
    pub monitors: Vec<String>,

    pub file: bool,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            terminal: true,
            monitors: Vec::new(),
            file: false,
        }
    }
}

/// Options for the rotating file sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Directory that holds the log files
    pub base_directory: PathBuf,

    /// Maximum number of log files kept in `base_directory`
    pub max_retained_files: usize,

    /// Write a descriptive header at the top of each new file
    pub write_banner: bool,

    /// Label embedded in file names; inferred from the running program when absent
    pub source_label: Option<String>,

    /// Roll over to a fresh file once the current one reaches this size
    pub max_file_bytes: Option<u64>,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            max_retained_files: DEFAULT_MAX_RETAINED_FILES,
            write_banner: true,
            source_label: None,
            max_file_bytes: None,
        }
    }
}

/// Wrapper to accept a `[logging]` section in TOML files
#[derive(Debug, Deserialize)]
struct ConfigWrapper {
    logging: toml::Value,
}

impl LoggerConfig {
    /// Build a configuration from a (possibly partial) JSON value
    ///
    /// Missing keys take their defaults. An unknown level name fails with
    /// `InvalidLevel`; any other shape problem fails with
    /// `InvalidConfiguration`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cc_logger::{LoggerConfig, LogLevel};
    /// use serde_json::json;
    ///
    /// let config = LoggerConfig::from_value(json!({"level": "warn"})).unwrap();
    /// assert_eq!(config.level, LogLevel::Warn);
    /// assert!(config.outputs.terminal);
    ///
    /// assert!(LoggerConfig::from_value(json!({"level": "loud"})).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "configuration must be a map",
            ));
        }
        check_level(&value)?;

        let config: LoggerConfig = serde_json::from_value(value)
            .map_err(|e| LoggerError::config("LoggerConfig", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a TOML document, with or without a `[logging]` table
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table = match toml::from_str::<ConfigWrapper>(text) {
            Ok(wrapper) => wrapper.logging,
            Err(_) => toml::from_str::<toml::Value>(text)?,
        };
        let value = serde_json::to_value(table)?;
        Self::from_value(value)
    }

    /// Load a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.file.max_retained_files < 1 {
            return Err(LoggerError::config(
                "file",
                "max_retained_files must be at least 1",
            ));
        }
        if self.file.max_file_bytes == Some(0) {
            return Err(LoggerError::config(
                "file",
                "max_file_bytes must be greater than 0",
            ));
        }
        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                "timestamp_format",
                format!("'{}' is not a valid strftime pattern", self.timestamp_format),
            ));
        }
        if self.outputs.monitors.iter().any(|name| name.trim().is_empty()) {
            return Err(LoggerError::config(
                "outputs",
                "monitor names must not be empty",
            ));
        }
        Ok(())
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deep-merge `overlay` into a copy of this configuration
    ///
    /// The receiver is left untouched, so a failed merge never leaves a
    /// half-applied configuration behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use cc_logger::LoggerConfig;
    /// use serde_json::json;
    ///
    /// let base = LoggerConfig::from_value(json!({"outputs": {"monitors": ["left"]}})).unwrap();
    /// let merged = base.merged(json!({"outputs": {"monitors": ["top"]}, "colors": false})).unwrap();
    ///
    /// assert_eq!(merged.outputs.monitors, vec!["left", "top"]);
    /// assert!(!merged.colors);
    /// assert!(merged.outputs.terminal);
    /// ```
    pub fn merged(&self, overlay: Value) -> Result<Self> {
        if !overlay.is_object() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "configuration overlay must be a map",
            ));
        }
        check_level(&overlay)?;

        let mut base = self.to_value()?;
        merge_config(&mut base, overlay);
        Self::from_value(base)
    }
}

fn check_level(value: &Value) -> Result<()> {
    match value.get("level") {
        None => Ok(()),
        Some(Value::String(name)) => name.parse::<LogLevel>().map(|_| ()),
        Some(other) => Err(LoggerError::invalid_level(other.to_string())),
    }
}

/// Recursive configuration merge
///
/// Maps merge key by key, arrays are appended, every other value is
/// replaced by the overlay.
pub fn merge_config(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_config(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items);
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.outputs.terminal);
        assert!(!config.outputs.file);
        assert_eq!(config.file.max_retained_files, DEFAULT_MAX_RETAINED_FILES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_value_partial() {
        let config = LoggerConfig::from_value(json!({
            "level": "DEBUG",
            "abbreviate_level": true,
            "file": {"max_retained_files": 3}
        }))
        .unwrap();

        assert_eq!(config.level, LogLevel::Debug);
        assert!(config.abbreviate_level);
        assert_eq!(config.file.max_retained_files, 3);
        assert!(config.file.write_banner);
    }

    #[test]
    fn test_invalid_level_is_reported_as_such() {
        let err = LoggerConfig::from_value(json!({"level": "success"})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(_)));

        let err = LoggerConfig::from_value(json!({"level": 3})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(_)));
    }

    #[test]
    fn test_validation_errors() {
        let err = LoggerConfig::from_value(json!({"file": {"max_retained_files": 0}})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerConfig::from_value(json!({"timestamp_format": "%Y-%Q"})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerConfig::from_value(json!({"colors": "yes"})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        assert!(LoggerConfig::from_value(json!(["level", "warn"])).is_err());
    }

    #[test]
    fn test_merge_config_semantics() {
        let mut base = json!({
            "level": "info",
            "outputs": {"terminal": true, "monitors": ["left"]},
            "file": {"base_directory": "logs"}
        });
        merge_config(
            &mut base,
            json!({
                "level": "error",
                "outputs": {"monitors": ["right"], "file": true},
                "extra": {"nested": 1}
            }),
        );

        assert_eq!(
            base,
            json!({
                "level": "error",
                "outputs": {"terminal": true, "monitors": ["left", "right"], "file": true},
                "file": {"base_directory": "logs"},
                "extra": {"nested": 1}
            })
        );
    }

    #[test]
    fn test_merged_keeps_original_on_error() {
        let base = LoggerConfig::default();
        assert!(base.merged(json!({"level": "nope"})).is_err());
        assert!(base.merged(json!("warn")).is_err());
        assert_eq!(base.level, LogLevel::Info);
    }

    #[test]
    fn test_from_toml_with_logging_table() {
        let config = LoggerConfig::from_toml_str(
            r#"
            [logging]
            level = "warn"
            colors = false

            [logging.outputs]
            monitors = ["top", "monitor_3"]
            file = true

            [logging.file]
            base_directory = "/var/log/turtle"
            source_label = "miner"
            "#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Warn);
        assert!(!config.colors);
        assert_eq!(config.outputs.monitors, vec!["top", "monitor_3"]);
        assert_eq!(config.file.base_directory, PathBuf::from("/var/log/turtle"));
        assert_eq!(config.file.source_label.as_deref(), Some("miner"));
    }

    #[test]
    fn test_from_toml_without_table() {
        let config = LoggerConfig::from_toml_str("level = \"trace\"\nabbreviate_level = true\n").unwrap();
        assert_eq!(config.level, LogLevel::Trace);
        assert!(config.abbreviate_level);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logger.toml");
        fs::write(&path, "level = \"error\"\n").unwrap();

        assert_eq!(LoggerConfig::from_file(&path).unwrap().level, LogLevel::Error);
        assert!(LoggerConfig::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_from_json_str() {
        let config = LoggerConfig::from_json_str(r#"{"outputs": {"terminal": false}}"#).unwrap();
        assert!(!config.outputs.terminal);
        assert!(LoggerConfig::from_json_str("{not json").is_err());
    }
}
