//! Process-wide default log manager
//!
//! This is global mutable state: one [`LogManager`] shared by the whole
//! process, created on first access and alive until the process exits.
//! Libraries should prefer taking a `&LogManager` (or `Arc<LogManager>`) so
//! callers and tests can inject their own instance.

use std::sync::OnceLock;

use crate::config::default_storage_dir;
use crate::manager::LogManager;

static SHARED: OnceLock<LogManager> = OnceLock::new();

/// Get the shared manager, creating it with default settings and the default
/// storage location on first access
pub fn shared() -> &'static LogManager {
    SHARED.get_or_init(|| LogManager::new(default_storage_dir()))
}

/// Install `manager` as the shared instance
///
/// Only succeeds before the shared manager has been created (by an earlier
/// install or a call to [`shared`]); otherwise the manager is handed back.
pub fn install_shared(manager: LogManager) -> Result<&'static LogManager, LogManager> {
    SHARED.set(manager)?;
    Ok(shared())
}

/// Whether the shared manager has been created yet
pub fn is_initialized() -> bool {
    SHARED.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::manager::{DayCalendar, ManagerOptions};
    use tempfile::TempDir;

    // One test only: the shared instance cannot be reset within a process
    #[test]
    fn test_install_then_shared() {
        let temp_dir = TempDir::new().unwrap();
        let mut options = ManagerOptions::new(temp_dir.path());
        options.calendar = DayCalendar::Utc;
        let installed = LogManager::with_options(options);

        let manager = match install_shared(installed) {
            Ok(manager) => manager,
            // Another test in this process initialized it first
            Err(_) => return,
        };

        assert!(is_initialized());
        assert!(std::ptr::eq(manager, shared()));
        assert_eq!(shared().storage_dir(), temp_dir.path());

        shared().info("UnitTest", "global").unwrap();
        assert_eq!(shared().list_log_files().unwrap().len(), 1);

        let again = install_shared(LogManager::new(temp_dir.path().join("other")));
        assert!(again.is_err());
        assert_eq!(shared().min_level(), Level::Debug);
    }
}
