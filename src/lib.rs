//! daylog - file-backed structured log sink
//!
//! Log entries carrying a severity, a source label and string metadata are
//! appended as JSON lines to one file per calendar day
//! (`<storage root>/YYYY-MM-DD.log`). A [`LogManager`] serializes all writers
//! and readers of its storage root, and supports reading days back and
//! exporting day files.
//!
//! ```no_run
//! use daylog::{Level, LogManager, Metadata};
//!
//! let manager = LogManager::new("/tmp/daylog");
//! manager.info("Network.Auth", "token refreshed")?;
//!
//! let mut metadata = Metadata::new();
//! metadata.insert("status".to_string(), "503".to_string());
//! manager.append("upstream unavailable", Level::Error, "Network.Http", metadata)?;
//! # Ok::<(), daylog::LogError>(())
//! ```

pub mod bridge;
pub mod config;
pub mod entry;
pub mod error;
pub mod level;
pub mod manager;
pub mod shared;

pub use bridge::ManagerLayer;
pub use config::ManagerConfig;
pub use entry::{LogEntry, LogSource, Metadata};
pub use error::{DiskErrorKind, LogError, Result};
pub use level::Level;
pub use manager::{DayCalendar, LogManager, ManagerOptions, Settings};
pub use shared::shared;
