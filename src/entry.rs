//! Log entry model
//!
//! A [`LogEntry`] is an immutable record of one log occurrence. Each entry is
//! stored as a single JSON object on its own line of a day file.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::level::Level;

/// Free-form string metadata attached to an entry, ordered by key
pub type Metadata = BTreeMap<String, String>;

/// Anything that can name the logical origin of an entry (e.g. `"Network.Auth"`)
///
/// Implement this for application enums to get typed source labels; plain
/// strings work out of the box.
pub trait LogSource {
    /// Render the source label that is stored with the entry
    fn source_name(&self) -> Cow<'_, str>;
}

impl LogSource for str {
    fn source_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl LogSource for String {
    fn source_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl LogSource for Cow<'_, str> {
    fn source_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&**self)
    }
}

impl<T: LogSource + ?Sized> LogSource for &T {
    fn source_name(&self) -> Cow<'_, str> {
        (**self).source_name()
    }
}

/// A single log entry
///
/// Unknown fields are ignored when decoding so that newer writers can add
/// fields without breaking older readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry occurred (caller-supplied, may be backdated)
    pub timestamp: DateTime<Utc>,
    /// Severity
    pub level: Level,
    /// Logical origin of the entry
    pub source: String,
    /// Log message
    pub message: String,
    /// Additional key/value pairs
    #[serde(default)]
    pub metadata: Metadata,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(
        timestamp: DateTime<Utc>,
        level: Level,
        source: impl Into<String>,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            timestamp,
            level,
            source: source.into(),
            message: message.into(),
            metadata,
        }
    }

    /// Serialize to a single JSON line (without the trailing newline)
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode an entry from one stored line
    ///
    /// Takes raw bytes; a line cut inside a multibyte character is a decode
    /// error like any other malformed line.
    pub fn from_json_line(line: impl AsRef<[u8]>) -> serde_json::Result<Self> {
        serde_json::from_slice(line.as_ref())
    }

    /// Render the human-readable console line
    ///
    /// Format: `[<timestamp>] [<LEVEL>] [<source>] <message>`, followed by
    /// ` | k=v,k2=v2` when metadata is present.
    pub fn console_line(&self) -> String {
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            self.level.as_str(),
            self.source,
            self.message
        );

        if !self.metadata.is_empty() {
            let pairs: Vec<String> = self
                .metadata
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            line.push_str(" | ");
            line.push_str(&pairs.join(","));
        }

        line
    }
}
