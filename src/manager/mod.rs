//! Concurrent day-bucketed log manager
//!
//! [`LogManager`] owns a storage root and routes each accepted entry to the
//! JSON-lines file for its calendar day. Every operation, including reads of
//! and changes to the configuration, runs under one mutex per manager, so
//! appends never interleave and readers never observe a partial line.
//!
//! Safety only holds within a single manager instance. Two managers pointed
//! at the same directory take no file locks and may corrupt each other's
//! writes.

mod clock;
mod console;
mod fs;
mod layout;

pub use clock::{Clock, FixedClock, SystemClock};
pub use console::{ConsoleSink, MemoryConsole, StdoutConsole};
pub use fs::{FileSystem, OsFileSystem};
pub use layout::{
    day_file_name, day_file_path, parse_day_file_name, DayCalendar, LOG_FILE_EXTENSION,
};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::config::{default_storage_dir, ManagerConfig};
use crate::entry::{LogEntry, LogSource, Metadata};
use crate::error::{LogError, Result};
use crate::level::Level;

/// Runtime-adjustable settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settings {
    /// Entries below this level are silently dropped
    pub min_level: Level,
    /// Echo stored entries to the console sink
    pub echo: bool,
}

/// Construction options for a [`LogManager`]
#[derive(Clone)]
pub struct ManagerOptions {
    /// Directory that holds the day files
    pub storage_dir: PathBuf,
    /// Initial settings
    pub settings: Settings,
    /// Calendar used for day buckets
    pub calendar: DayCalendar,
    /// Source of default timestamps
    pub clock: Arc<dyn Clock>,
    /// Destination of echoed lines
    pub console: Arc<dyn ConsoleSink>,
    /// Filesystem accessor
    pub file_system: Arc<dyn FileSystem>,
}

impl ManagerOptions {
    /// Default options for a storage directory
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            settings: Settings::default(),
            calendar: DayCalendar::default(),
            clock: Arc::new(SystemClock),
            console: Arc::new(StdoutConsole),
            file_system: Arc::new(OsFileSystem),
        }
    }

    /// Options derived from a loaded configuration file
    pub fn from_config(config: &ManagerConfig) -> anyhow::Result<Self> {
        let mut options = Self::new(config.storage_dir()?);
        options.settings = Settings {
            min_level: config.min_level,
            echo: config.echo,
        };
        Ok(options)
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self::new(default_storage_dir())
    }
}

/// State guarded by the manager's mutex
struct Inner {
    storage_dir: PathBuf,
    settings: Settings,
    calendar: DayCalendar,
    clock: Arc<dyn Clock>,
    console: Arc<dyn ConsoleSink>,
    fs: Arc<dyn FileSystem>,
}

/// Thread-safe, file-backed log sink partitioned by calendar day
///
/// Calls block for the duration of their file I/O. There is no timeout or
/// cancellation; a stuck filesystem call blocks its caller.
pub struct LogManager {
    inner: Mutex<Inner>,
}

impl LogManager {
    /// Create a manager storing day files under `storage_dir` with default settings
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(ManagerOptions::new(storage_dir))
    }

    /// Create a manager from explicit options
    pub fn with_options(options: ManagerOptions) -> Self {
        Self {
            inner: Mutex::new(Inner {
                storage_dir: options.storage_dir,
                settings: options.settings,
                calendar: options.calendar,
                clock: options.clock,
                console: options.console,
                fs: options.file_system,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Inner holds no invariant a panicking holder could break
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Directory holding the day files
    pub fn storage_dir(&self) -> PathBuf {
        self.lock().storage_dir.clone()
    }

    /// Current settings
    pub fn settings(&self) -> Settings {
        self.lock().settings
    }

    /// Minimum level an entry needs to be stored
    pub fn min_level(&self) -> Level {
        self.lock().settings.min_level
    }

    /// Change the minimum level; applies to every append that starts after this returns
    pub fn set_min_level(&self, level: Level) {
        self.lock().settings.min_level = level;
    }

    /// Whether stored entries are echoed to the console sink
    pub fn echo_enabled(&self) -> bool {
        self.lock().settings.echo
    }

    /// Enable or disable console echo
    pub fn set_echo(&self, echo: bool) {
        self.lock().settings.echo = echo;
    }

    /// Replace all settings at once
    pub fn set_settings(&self, settings: Settings) {
        self.lock().settings = settings;
    }

    /// Append an entry timestamped with the manager's clock
    pub fn append<S: LogSource + ?Sized>(
        &self,
        message: impl Into<String>,
        level: Level,
        source: &S,
        metadata: Metadata,
    ) -> Result<()> {
        let inner = self.lock();
        let timestamp = inner.clock.now();
        inner.append(timestamp, message.into(), level, source, metadata)
    }

    /// Append an entry with an explicit timestamp (past or future instants are fine)
    pub fn append_at<S: LogSource + ?Sized>(
        &self,
        message: impl Into<String>,
        level: Level,
        source: &S,
        metadata: Metadata,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.lock()
            .append(timestamp, message.into(), level, source, metadata)
    }

    /// Append an entry without metadata, timestamped now
    pub fn log<S: LogSource + ?Sized>(
        &self,
        level: Level,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.append(message, level, source, Metadata::new())
    }

    pub fn debug<S: LogSource + ?Sized>(
        &self,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.log(Level::Debug, source, message)
    }

    pub fn info<S: LogSource + ?Sized>(
        &self,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.log(Level::Info, source, message)
    }

    pub fn warning<S: LogSource + ?Sized>(
        &self,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.log(Level::Warning, source, message)
    }

    pub fn error<S: LogSource + ?Sized>(
        &self,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.log(Level::Error, source, message)
    }

    pub fn critical<S: LogSource + ?Sized>(
        &self,
        source: &S,
        message: impl Into<String>,
    ) -> Result<()> {
        self.log(Level::Critical, source, message)
    }

    /// Path of the day file an instant maps to (the file may not exist)
    pub fn log_file_path(&self, day: DateTime<Utc>) -> PathBuf {
        self.lock().day_path(day)
    }

    /// Read all entries stored for the calendar day containing `day`
    ///
    /// Returns an empty list if nothing was logged that day. Decoding stops at
    /// the first malformed line.
    pub fn read(&self, day: DateTime<Utc>) -> Result<Vec<LogEntry>> {
        let inner = self.lock();
        let path = inner.day_path(day);
        inner.read_file(&path)
    }

    /// Read all entries of a day file, e.g. one returned by [`list_log_files`](Self::list_log_files)
    pub fn read_log_file(&self, path: &Path) -> Result<Vec<LogEntry>> {
        self.lock().read_file(path)
    }

    /// Day files under the storage root, sorted by name (chronological)
    pub fn list_log_files(&self) -> Result<Vec<PathBuf>> {
        self.lock().list_log_files()
    }

    /// Copy the day file for `day` into `destination`, overwriting any existing copy
    ///
    /// Returns the path of the copy.
    pub fn export_one(&self, day: DateTime<Utc>, destination: &Path) -> Result<PathBuf> {
        let inner = self.lock();
        let day_key = inner.calendar.day_key(day);
        let source = layout::day_file_path(&inner.storage_dir, &day_key);
        if !inner.fs.is_file(&source) {
            return Err(LogError::NotFound { day: day_key });
        }

        inner.ensure_dir(destination)?;
        let copied = inner.copy_into(&source, destination)?;
        tracing::debug!("Exported {} to {}", source.display(), copied.display());
        Ok(copied)
    }

    /// Copy every day file into `destination`, in [`list_log_files`](Self::list_log_files) order
    ///
    /// Stops at the first failed copy.
    pub fn export_all(&self, destination: &Path) -> Result<Vec<PathBuf>> {
        let inner = self.lock();
        let files = inner.list_log_files()?;

        inner.ensure_dir(destination)?;
        let copied = files
            .iter()
            .map(|source| inner.copy_into(source, destination))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Exported {} log files to {}",
            copied.len(),
            destination.display()
        );
        Ok(copied)
    }
}

impl Inner {
    fn day_path(&self, day: DateTime<Utc>) -> PathBuf {
        layout::day_file_path(&self.storage_dir, &self.calendar.day_key(day))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.fs
            .create_dir_all(dir)
            .map_err(|e| LogError::io("creating directory", dir, e))
    }

    fn append<S: LogSource + ?Sized>(
        &self,
        timestamp: DateTime<Utc>,
        message: String,
        level: Level,
        source: &S,
        metadata: Metadata,
    ) -> Result<()> {
        if level < self.settings.min_level {
            return Ok(());
        }

        let entry = LogEntry::new(timestamp, level, source.source_name(), message, metadata);
        let path = self.day_path(entry.timestamp);

        let mut line = entry.to_json_line().map_err(LogError::Encode)?;
        line.push('\n');

        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        self.fs
            .append(&path, line.as_bytes())
            .map_err(|e| LogError::io("appending to", &path, e))?;

        if self.settings.echo {
            self.console.write_line(&entry.console_line());
        }

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<LogEntry>> {
        let content = match self.fs.read(path) {
            Ok(Some(content)) => content,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => return Err(LogError::io("reading", path, e)),
        };

        content
            .split(|&byte| byte == b'\n')
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(index, line)| {
                LogEntry::from_json_line(line).map_err(|source| LogError::Decode {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })
            })
            .collect()
    }

    fn list_log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = self
            .fs
            .list_files(&self.storage_dir)
            .map_err(|e| LogError::io("listing", &self.storage_dir, e))?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(layout::parse_day_file_name)
                    .is_some()
            })
            .collect();

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn copy_into(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        let target = match source.file_name() {
            Some(name) => destination.join(name),
            None => destination.to_path_buf(),
        };

        // Copying a file onto itself truncates it
        let same_file = self
            .fs
            .is_same_file(source, &target)
            .map_err(|e| LogError::io("resolving", &target, e))?;
        if !same_file {
            self.fs
                .copy(source, &target)
                .map_err(|e| LogError::io("copying", source, e))?;
        }

        Ok(target)
    }
}

impl fmt::Debug for LogManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("LogManager")
            .field("storage_dir", &inner.storage_dir)
            .field("settings", &inner.settings)
            .field("calendar", &inner.calendar)
            .finish_non_exhaustive()
    }
}
