//! Error types for log manager operations

use std::io;
use std::path::PathBuf;

/// Errors returned by [`LogManager`](crate::LogManager) operations
///
/// Entries filtered out by the minimum level are not errors. Reading a day
/// with no file is not an error either; exporting one is.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A filesystem operation failed
    #[error("I/O error while {action} {}: {source}", path.display())]
    Io {
        /// What was being done, e.g. "appending to"
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No day file exists for the requested day
    #[error("log file not found for day {day}")]
    NotFound { day: String },

    /// A stored line could not be decoded as an entry
    #[error("malformed entry at line {line} of {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        /// 1-based line number within the file
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An entry could not be serialized
    #[error("failed to encode entry: {0}")]
    Encode(#[source] serde_json::Error),
}

impl LogError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LogError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Categorize the failure for user-facing display
    ///
    /// Returns `None` for errors that are not disk related.
    pub fn disk_error_kind(&self) -> Option<DiskErrorKind> {
        match self {
            LogError::Io { source, .. } => Some(DiskErrorKind::from(source)),
            LogError::NotFound { .. } => Some(DiskErrorKind::NotFound),
            LogError::Decode { .. } | LogError::Encode(_) => None,
        }
    }
}

/// Result alias for log manager operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Categories of disk errors for user-friendly messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Get a user-friendly message for this error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "Disk full - free space needed to write logs",
            DiskErrorKind::PermissionDenied => "Permission denied accessing the log directory",
            DiskErrorKind::NotFound => "Log file or directory not found",
            DiskErrorKind::Other => "Failed to access log files",
        }
    }
}

impl From<&io::Error> for DiskErrorKind {
    fn from(e: &io::Error) -> Self {
        match (e.kind(), e.raw_os_error()) {
            (io::ErrorKind::StorageFull | io::ErrorKind::WriteZero, _) => DiskErrorKind::DiskFull,
            (io::ErrorKind::PermissionDenied, _) => DiskErrorKind::PermissionDenied,
            (io::ErrorKind::NotFound, _) => DiskErrorKind::NotFound,
            // ENOSPC, or EDQUOT (122 on Linux, 69 on macOS)
            #[cfg(unix)]
            (_, Some(28 | 69 | 122)) => DiskErrorKind::DiskFull,
            _ => DiskErrorKind::Other,
        }
    }
}
