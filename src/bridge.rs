//! `tracing` integration
//!
//! [`ManagerLayer`] forwards `tracing` events into a [`LogManager`], so code
//! instrumented with `tracing` macros ends up in the day files.

use std::cell::Cell;
use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::entry::Metadata;
use crate::level::Level;
use crate::manager::LogManager;

/// Events from this crate are never forwarded; the manager may emit them
/// while holding its own lock.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

thread_local! {
    /// Set while this thread is inside a forwarded append
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Clears [`FORWARDING`] when the forwarded append returns or unwinds
struct ForwardingGuard;

impl ForwardingGuard {
    /// Returns `None` if this thread is already forwarding an event
    fn enter() -> Option<Self> {
        if FORWARDING.with(|f| f.replace(true)) {
            None
        } else {
            Some(ForwardingGuard)
        }
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|f| f.set(false));
    }
}

/// Layer that appends every `tracing` event to a log manager
///
/// The event target becomes the entry source, the `message` field becomes the
/// message, and all other fields are stored as metadata. Append failures are
/// dropped.
///
/// Events emitted while an append is in progress on the same thread (for
/// example by a custom [`ConsoleSink`](crate::manager::ConsoleSink) or
/// [`FileSystem`](crate::manager::FileSystem) that logs through `tracing`)
/// are not forwarded, since the manager's lock is not reentrant.
pub struct ManagerLayer {
    manager: Arc<LogManager>,
}

impl ManagerLayer {
    pub fn new(manager: Arc<LogManager>) -> Self {
        Self { manager }
    }
}

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Collects the message and remaining fields of an event
#[derive(Default)]
struct FieldCollector {
    message: String,
    metadata: Metadata,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.metadata
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let mut rendered = String::new();
        let _ = write!(rendered, "{:?}", value);
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.metadata.insert(field.name().to_string(), rendered);
        }
    }
}

impl<S: Subscriber> Layer<S> for ManagerLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        let Some(_guard) = ForwardingGuard::enter() else {
            return;
        };

        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let _ = self.manager.append(
            fields.message,
            Level::from(*meta.level()),
            meta.target(),
            fields.metadata,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::{ConsoleSink, DayCalendar, FixedClock, ManagerOptions};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    fn test_manager(temp_dir: &TempDir) -> Arc<LogManager> {
        let mut options = ManagerOptions::new(temp_dir.path());
        options.calendar = DayCalendar::Utc;
        options.clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 2, 11, 10, 0, 0).unwrap()));
        Arc::new(LogManager::with_options(options))
    }

    #[test]
    fn test_is_own_target() {
        assert!(is_own_target("daylog"));
        assert!(is_own_target("daylog::manager"));
        assert!(!is_own_target("daylogger"));
        assert!(!is_own_target("app::daylog"));
    }

    #[test]
    fn test_events_are_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let manager = test_manager(&temp_dir);
        let subscriber =
            tracing_subscriber::registry().with(ManagerLayer::new(Arc::clone(&manager)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "app::net", attempt = 3, host = "example.org", "retrying");
            tracing::trace!(target: "app::net", "noisy");
            tracing::info!(target: "daylog::manager", "internal");
        });

        let entries = manager
            .read(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].level, Level::Warning);
        assert_eq!(entries[0].source, "app::net");
        assert_eq!(entries[0].message, "retrying");
        assert_eq!(entries[0].metadata["attempt"], "3");
        assert_eq!(entries[0].metadata["host"], "example.org");

        assert_eq!(entries[1].level, Level::Debug);
        assert_eq!(entries[1].message, "noisy");
    }

    #[test]
    fn test_forwarding_respects_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let manager = test_manager(&temp_dir);
        manager.set_min_level(Level::Error);
        let subscriber =
            tracing_subscriber::registry().with(ManagerLayer::new(Arc::clone(&manager)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "app", "dropped");
            tracing::error!(target: "app", "kept");
        });

        let entries = manager
            .read(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
    }

    /// Console sink that logs through `tracing` while the manager lock is held
    struct TracingConsole;

    impl ConsoleSink for TracingConsole {
        fn write_line(&self, line: &str) {
            tracing::info!(target: "app::console", "echoed {}", line);
        }
    }

    #[test]
    fn test_nested_event_from_sink_is_not_forwarded() {
        let temp_dir = TempDir::new().unwrap();
        let mut options = ManagerOptions::new(temp_dir.path());
        options.calendar = DayCalendar::Utc;
        options.clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 2, 11, 10, 0, 0).unwrap()));
        options.console = Arc::new(TracingConsole);
        let manager = Arc::new(LogManager::with_options(options));
        manager.set_echo(true);
        let subscriber =
            tracing_subscriber::registry().with(ManagerLayer::new(Arc::clone(&manager)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "app", "first");
            tracing::warn!(target: "app", "second");
        });

        let entries = manager
            .read(Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap())
            .unwrap();
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
