//! Default logger instance
//!
//! Programs that do not want to pass a logger around share one through a
//! [`LoggerRegistry`]. The registry creates its logger lazily on first use,
//! applies later configuration to that same instance, and tears it down on
//! [`LoggerRegistry::close`].

use super::config::LoggerConfig;
use super::environment::Environment;
use super::error::Result;
use super::logger::{Logger, LoggerState};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

type EnvironmentFactory = Box<dyn Fn() -> Environment + Send + Sync>;

static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();

/// Holder of at most one shared [`Logger`]
///
/// # Examples
///
/// ```
/// use cc_logger::prelude::*;
/// use serde_json::json;
///
/// let registry = LoggerRegistry::new(LoggerConfig::default());
/// assert_eq!(registry.state(), LoggerState::Unconfigured);
///
/// let first = registry.default().unwrap();
/// registry.configure(json!({"level": "debug"})).unwrap();
/// let second = registry.default().unwrap();
///
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(second.level(), LogLevel::Debug);
/// ```
pub struct LoggerRegistry {
    config: Mutex<LoggerConfig>,
    factory: EnvironmentFactory,
    instance: Mutex<Option<Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Registry whose logger runs on the default environment
    pub fn new(config: LoggerConfig) -> Self {
        Self::with_environment_factory(config, Environment::default)
    }

    /// Registry that builds a fresh environment each time it creates a logger
    pub fn with_environment_factory<F>(config: LoggerConfig, factory: F) -> Self
    where
        F: Fn() -> Environment + Send + Sync + 'static,
    {
        Self {
            config: Mutex::new(config),
            factory: Box::new(factory),
            instance: Mutex::new(None),
        }
    }

    /// The process-wide registry, created with default settings on first use
    pub fn global() -> &'static LoggerRegistry {
        GLOBAL.get_or_init(|| LoggerRegistry::new(LoggerConfig::default()))
    }

    /// The shared logger, created from the stored configuration if needed
    ///
    /// # Errors
    ///
    /// Fails when the stored configuration does not validate.
    pub fn default(&self) -> Result<Arc<Logger>> {
        let mut instance = self.instance.lock();
        if let Some(logger) = instance.as_ref() {
            return Ok(Arc::clone(logger));
        }

        let config = self.config.lock().clone();
        let logger = Arc::new(Logger::with_environment(config, (self.factory)())?);
        *instance = Some(Arc::clone(&logger));
        Ok(logger)
    }

    /// Merge `overlay` into the registry's configuration
    ///
    /// A live logger is reconfigured in place; otherwise the merged settings
    /// are used when [`LoggerRegistry::default`] creates one.
    ///
    /// # Errors
    ///
    /// On an invalid overlay nothing changes.
    pub fn configure(&self, overlay: Value) -> Result<()> {
        let instance = self.instance.lock();
        let mut config = self.config.lock();

        match instance.as_ref() {
            Some(logger) => {
                logger.configure(overlay)?;
                *config = logger.config();
            }
            None => *config = config.merged(overlay)?,
        }
        Ok(())
    }

    /// Close and forget the shared logger
    ///
    /// Loggers already handed out keep their terminal and monitor output;
    /// the next [`LoggerRegistry::default`] builds a new instance.
    pub fn close(&self) -> Result<()> {
        match self.instance.lock().take() {
            Some(logger) => logger.close(),
            None => Ok(()),
        }
    }

    pub fn state(&self) -> LoggerState {
        match self.instance.lock().as_ref() {
            Some(logger) => logger.state(),
            None => LoggerState::Unconfigured,
        }
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("LoggerRegistry")
            .field("config", &*self.config.lock())
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::BufferTerminal;
    use crate::core::{HostInfo, LocalStorage, LogLevel, Log, LoggerError, NoPeripherals};
    use serde_json::json;

    fn buffered_registry(screen: &BufferTerminal) -> LoggerRegistry {
        let screen = screen.clone();
        LoggerRegistry::with_environment_factory(LoggerConfig::default(), move || Environment {
            terminal: Box::new(screen.clone()),
            peripherals: Arc::new(NoPeripherals),
            storage: Arc::new(LocalStorage),
            host: HostInfo::detect(),
        })
    }

    #[test]
    fn test_default_is_created_once() {
        let screen = BufferTerminal::new();
        let registry = buffered_registry(&screen);

        let a = registry.default().unwrap();
        let b = registry.default().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.state(), LoggerState::Configured);

        a.info(&[json!("shared")]);
        assert_eq!(screen.lines().len(), 1);
    }

    #[test]
    fn test_configure_before_first_use() {
        let registry = buffered_registry(&BufferTerminal::new());
        registry.configure(json!({"level": "error"})).unwrap();

        assert_eq!(registry.state(), LoggerState::Unconfigured);
        assert_eq!(registry.default().unwrap().level(), LogLevel::Error);
    }

    #[test]
    fn test_configure_updates_live_instance() {
        let registry = buffered_registry(&BufferTerminal::new());
        let logger = registry.default().unwrap();

        registry.configure(json!({"level": "trace"})).unwrap();
        assert_eq!(logger.level(), LogLevel::Trace);

        let err = registry.configure(json!({"level": "chatty"})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel(_)));
        assert_eq!(logger.level(), LogLevel::Trace);
    }

    #[test]
    fn test_close_tears_down() {
        let registry = buffered_registry(&BufferTerminal::new());
        let first = registry.default().unwrap();

        registry.close().unwrap();
        registry.close().unwrap();
        assert_eq!(registry.state(), LoggerState::Unconfigured);
        assert_eq!(first.state(), LoggerState::Closed);

        let second = registry.default().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_global_is_a_singleton() {
        assert!(std::ptr::eq(LoggerRegistry::global(), LoggerRegistry::global()));
    }
}
