//! Log file naming, retention and banners
//!
//! Every run of a program gets its own file named
//! `<15-digit epoch millis>_<source label>.log`. Names sort chronologically,
//! so retention simply deletes from the front of the sorted listing.

use crate::core::{HostInfo, LogLevel, LoggerError, Result, Storage};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

const BANNER_RULE: &str = "==================================================";

/// Last stamp handed out by [`next_filename`]
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// Keep ASCII alphanumerics, `-` and `_`; everything else becomes `_`
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        String::from("unknown")
    } else {
        cleaned
    }
}

/// Strictly increasing millisecond stamp, shared by the whole process
fn next_stamp() -> u64 {
    let now = u64::try_from(Local::now().timestamp_millis()).unwrap_or(0);
    let mut last = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let stamp = now.max(last + 1);
        match LAST_STAMP.compare_exchange_weak(last, stamp, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return stamp,
            Err(current) => last = current,
        }
    }
}

/// File name for a new log file
///
/// # Examples
///
/// ```
/// use cc_logger::appenders::rotation::{is_log_file_name, next_filename};
///
/// let first = next_filename("miner");
/// let second = next_filename("miner");
/// assert!(first < second);
/// assert!(is_log_file_name(&first));
/// assert!(first.ends_with("_miner.log"));
/// ```
pub fn next_filename(source_label: &str) -> String {
    format!("{:015}_{}.log", next_stamp(), sanitize_label(source_label))
}

/// Whether `name` looks like a file produced by [`next_filename`]
pub fn is_log_file_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".log") else {
        return false;
    };
    let Some((digits, label)) = stem.split_once('_') else {
        return false;
    };
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) && !label.is_empty()
}

/// Make room for one more file in `directory`
///
/// Creates the directory when missing, then deletes the oldest log files
/// until fewer than `max_files` remain. Other files are left alone. Returns
/// the names that were deleted; a file that cannot be deleted is reported
/// on stderr and skipped.
pub fn enforce_retention(storage: &dyn Storage, directory: &Path, max_files: usize) -> Result<Vec<String>> {
    storage.create_dir_all(directory).map_err(|e| {
        LoggerError::io_operation(
            "creating log directory",
            format!("cannot create '{}': {}", directory.display(), e),
            e,
        )
    })?;

    let mut names: Vec<String> = storage
        .list(directory)?
        .into_iter()
        .filter(|name| is_log_file_name(name))
        .collect();
    names.sort();

    let excess = (names.len() + 1).saturating_sub(max_files.max(1));
    let mut deleted = Vec::with_capacity(excess);
    for name in names.into_iter().take(excess) {
        match storage.remove(&directory.join(&name)) {
            Ok(()) => deleted.push(name),
            Err(e) => eprintln!("[WARN] Failed to remove old log file {}: {}", name, e),
        }
    }

    Ok(deleted)
}

/// Source label from an explicit setting or the running program's file stem
pub fn infer_source_label(explicit: Option<&str>, host: &HostInfo) -> String {
    if let Some(label) = explicit.filter(|l| !l.trim().is_empty()) {
        return sanitize_label(label);
    }

    host.program_path
        .as_deref()
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .map(sanitize_label)
        .unwrap_or_else(|| String::from("unknown"))
}

/// What the file banner describes
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub host: HostInfo,
    pub source_label: String,
    pub level: LogLevel,
}

/// Write the header placed at the top of a fresh log file
pub fn write_banner(writer: &mut dyn Write, info: &BannerInfo, now: &DateTime<Local>) -> std::io::Result<()> {
    let host = &info.host;
    let program = host
        .program_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| String::from("unknown"));

    writeln!(writer, "{}", BANNER_RULE)?;
    writeln!(writer, "Log started: {}", now.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(writer, "Computer ID: {}", host.computer_id)?;
    writeln!(
        writer,
        "Computer label: {}",
        host.computer_label.as_deref().unwrap_or("(none)")
    )?;
    writeln!(writer, "Source: {} ({})", info.source_label, program)?;
    writeln!(writer, "Platform: {}", host.platform_version)?;
    if let Some(build) = &host.build {
        writeln!(
            writer,
            "Build: {} ({}@{}, {})",
            build.version, build.commit, build.branch, build.build_date
        )?;
    }
    writeln!(writer, "Level: {}", info.level.to_str())?;
    writeln!(writer, "{}", BANNER_RULE)?;
    Ok(())
}
