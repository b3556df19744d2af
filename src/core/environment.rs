//! Host collaborators the logger writes through
//!
//! The logger never talks to a concrete terminal, peripheral bus or
//! filesystem directly. Each is a trait, bundled into an [`Environment`] and
//! handed to the logger at construction time.

use crate::appenders::terminal::StdoutTerminal;
use colored::Color;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A text output device with a current text color
pub trait Terminal: Send {
    fn text_color(&self) -> Color;
    fn set_text_color(&mut self, color: Color);
    fn print_line(&mut self, line: &str);
}

/// An attached monitor peripheral
pub trait Monitor: Terminal {
    /// Whether the device is still attached
    fn is_present(&self) -> bool {
        true
    }
}

/// Resolves device names to monitor handles
pub trait PeripheralProvider: Send + Sync {
    /// Returns a handle when `name` is attached and is a monitor with text
    /// color controls, otherwise a human-readable reason.
    fn validate(&self, name: &str) -> std::result::Result<Box<dyn Monitor>, String>;
}

/// Provider for hosts without a peripheral bus
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPeripherals;

impl PeripheralProvider for NoPeripherals {
    fn validate(&self, name: &str) -> std::result::Result<Box<dyn Monitor>, String> {
        Err(format!("no peripheral named '{}'", name))
    }
}

/// File access used by the rotating file sink
pub trait Storage: Send + Sync {
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Names of the regular files directly inside `dir`
    fn list(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Open `path` for appending, creating it if needed
    fn open_append(&self, path: &Path) -> io::Result<Box<dyn Write + Send>>;

    fn size(&self, path: &Path) -> io::Result<u64>;
}

/// `Storage` on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn open_append(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Box::new(file))
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }
}

/// Version metadata of the host program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub branch: String,
    pub build_date: String,
}

impl BuildInfo {
    pub fn new(
        version: impl Into<String>,
        commit: impl Into<String>,
        branch: impl Into<String>,
        build_date: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            commit: commit.into(),
            branch: branch.into(),
            build_date: build_date.into(),
        }
    }
}

/// Identity of the computer and program doing the logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub computer_id: String,
    pub computer_label: Option<String>,
    pub program_path: Option<PathBuf>,
    pub platform_version: String,
    pub build: Option<BuildInfo>,
}

impl HostInfo {
    /// Best-effort identity of the current process
    pub fn detect() -> Self {
        let computer_id = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_else(|_| String::from("unknown"));

        Self {
            computer_id,
            computer_label: None,
            program_path: std::env::current_exe().ok(),
            platform_version: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
            build: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.computer_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_program_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_build(mut self, build: BuildInfo) -> Self {
        self.build = Some(build);
        self
    }
}

impl Default for HostInfo {
    fn default() -> Self {
        Self::detect()
    }
}

/// Everything the logger needs from its host
pub struct Environment {
    pub terminal: Box<dyn Terminal>,
    pub peripherals: Arc<dyn PeripheralProvider>,
    pub storage: Arc<dyn Storage>,
    pub host: HostInfo,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            terminal: Box::new(StdoutTerminal::new()),
            peripherals: Arc::new(NoPeripherals),
            storage: Arc::new(LocalStorage),
            host: HostInfo::detect(),
        }
    }
}
