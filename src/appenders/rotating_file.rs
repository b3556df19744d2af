//! Rotating file appender
//!
//! Opens a fresh file per run in the configured directory, trimming old files
//! first so that at most `max_retained_files` remain. When `max_file_bytes`
//! is set the appender rolls over to a new file once the current one reaches
//! that size.

use super::rotation::{enforce_retention, next_filename, write_banner, BannerInfo};
use crate::core::{Appender, FileSinkConfig, LogRecord, LoggerError, Result, Storage};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct RotatingFileAppender {
    storage: Arc<dyn Storage>,
    options: FileSinkConfig,
    banner: BannerInfo,
    writer: Option<Box<dyn Write + Send>>,
    current_path: PathBuf,
    current_size: u64,
}

impl RotatingFileAppender {
    /// Trim the directory and open a new log file
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or listed, or if
    /// the file cannot be opened.
    pub fn open(storage: Arc<dyn Storage>, options: FileSinkConfig, banner: BannerInfo) -> Result<Self> {
        let (writer, current_path, current_size) = Self::open_next(storage.as_ref(), &options, &banner)?;

        Ok(Self {
            storage,
            options,
            banner,
            writer: Some(writer),
            current_path,
            current_size,
        })
    }

    fn open_next(
        storage: &dyn Storage,
        options: &FileSinkConfig,
        banner: &BannerInfo,
    ) -> Result<(Box<dyn Write + Send>, PathBuf, u64)> {
        let directory = &options.base_directory;
        enforce_retention(storage, directory, options.max_retained_files)?;

        let path = directory.join(next_filename(&banner.source_label));
        let mut writer = storage.open_append(&path).map_err(|e| {
            LoggerError::io_operation(
                "opening log file",
                format!("cannot open '{}': {}", path.display(), e),
                e,
            )
        })?;

        let mut size = storage.size(&path).unwrap_or(0);
        if size == 0 && options.write_banner {
            let mut header = Vec::new();
            write_banner(&mut header, banner, &Local::now())?;
            writer.write_all(&header)?;
            writer.flush()?;
            size = header.len() as u64;
        }

        Ok((writer, path, size))
    }

    fn should_rotate(&self) -> bool {
        self.options
            .max_file_bytes
            .is_some_and(|limit| self.current_size >= limit)
    }

    /// Close the current file and continue in a new one
    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let (writer, path, size) = Self::open_next(self.storage.as_ref(), &self.options, &self.banner)?;
        self.writer = Some(writer);
        self.current_path = path;
        self.current_size = size;
        Ok(())
    }

    /// Flush and release the file handle
    ///
    /// Calling this more than once is harmless.
    pub fn close(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(mut writer) => writer.flush().map_err(|e| {
                LoggerError::io_operation(
                    "closing log file",
                    format!("cannot flush '{}'", self.current_path.display()),
                    e,
                )
            }),
            None => Ok(()),
        }
    }

    /// Path of the file currently (or last) written
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.current_path
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }
}

impl Appender for RotatingFileAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        if self.writer.is_some() && self.should_rotate() {
            self.rotate()?;
        }

        let Some(writer) = self.writer.as_mut() else {
            return Err(LoggerError::sink_unavailable(
                "file",
                format!("'{}' is not open", self.current_path.display()),
            ));
        };

        let result = writer
            .write_all(record.line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());

        match result {
            Ok(()) => {
                self.current_size += record.line.len() as u64 + 1;
                Ok(())
            }
            Err(e) => {
                self.writer = None;
                Err(LoggerError::io_operation(
                    "writing log file",
                    format!("cannot write '{}': {}", self.current_path.display(), e),
                    e,
                ))
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HostInfo, LineFormat, LocalStorage, LogLevel};
    use std::fs;
    use tempfile::tempdir;

    fn banner() -> BannerInfo {
        BannerInfo {
            host: HostInfo::detect().with_program_path("/programs/miner"),
            source_label: "miner".to_string(),
            level: LogLevel::Info,
        }
    }

    fn options(dir: &Path) -> FileSinkConfig {
        FileSinkConfig {
            base_directory: dir.to_path_buf(),
            ..FileSinkConfig::default()
        }
    }

    fn record(message: &str) -> LogRecord {
        LogRecord::new(LogLevel::Info, None, message, &LineFormat::default())
    }

    fn log_files(dir: &Path) -> Vec<String> {
        let mut names = LocalStorage.list(dir).unwrap();
        names.sort();
        names
    }

    #[test]
    fn test_writes_banner_then_lines() {
        let dir = tempdir().unwrap();
        let mut appender =
            RotatingFileAppender::open(Arc::new(LocalStorage), options(dir.path()), banner()).unwrap();

        appender.append(&record("first")).unwrap();
        appender.append(&record("second")).unwrap();

        let text = fs::read_to_string(appender.path()).unwrap();
        assert!(text.contains("Source: miner (/programs/miner)"));
        assert!(text.contains("] first\n"));
        assert!(text.ends_with("second\n"));
        assert!(appender
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_miner.log")));
    }

    #[test]
    fn test_without_banner() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.write_banner = false;

        let mut appender = RotatingFileAppender::open(Arc::new(LocalStorage), opts, banner()).unwrap();
        appender.append(&record("only")).unwrap();

        let text = fs::read_to_string(appender.path()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_stops_writes() {
        let dir = tempdir().unwrap();
        let mut appender =
            RotatingFileAppender::open(Arc::new(LocalStorage), options(dir.path()), banner()).unwrap();

        appender.close().unwrap();
        appender.close().unwrap();
        assert!(!appender.is_open());

        let err = appender.append(&record("late")).unwrap_err();
        assert!(matches!(err, LoggerError::SinkUnavailable { .. }));
    }

    #[test]
    fn test_retention_on_open() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.max_retained_files = 2;

        for _ in 0..5 {
            let appender = RotatingFileAppender::open(Arc::new(LocalStorage), opts.clone(), banner()).unwrap();
            drop(appender);
        }

        assert_eq!(log_files(dir.path()).len(), 2);
    }

    #[test]
    fn test_rolls_over_at_size_limit() {
        let dir = tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.write_banner = false;
        opts.max_file_bytes = Some(64);
        opts.max_retained_files = 3;

        let mut appender = RotatingFileAppender::open(Arc::new(LocalStorage), opts, banner()).unwrap();
        let first = appender.path().to_path_buf();
        for i in 0..20 {
            appender.append(&record(&format!("entry number {}", i))).unwrap();
        }

        assert_ne!(appender.path(), first.as_path());
        assert!(log_files(dir.path()).len() <= 3);
    }

    #[test]
    fn test_open_fails_when_directory_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();

        let result = RotatingFileAppender::open(Arc::new(LocalStorage), options(&blocker), banner());
        assert!(result.is_err());
    }
}
