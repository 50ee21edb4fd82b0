//! Day-bucket file layout
//!
//! Entries are routed to `<root>/<YYYY>-<MM>-<DD>.log`, where the date is the
//! entry timestamp's calendar day in the manager's [`DayCalendar`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

/// Extension of day files
pub const LOG_FILE_EXTENSION: &str = "log";

/// Format of the day-bucket key
const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar used to map instants onto day buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayCalendar {
    /// The system's local timezone
    #[default]
    Local,
    /// UTC
    Utc,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl DayCalendar {
    /// Calendar date of an instant
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DayCalendar::Local => instant.with_timezone(&Local).date_naive(),
            DayCalendar::Utc => instant.date_naive(),
            DayCalendar::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Zero-padded `YYYY-MM-DD` bucket key for an instant
    pub fn day_key(&self, instant: DateTime<Utc>) -> String {
        self.date_of(instant).format(DAY_KEY_FORMAT).to_string()
    }
}

/// File name for a day key (`2026-02-11` -> `2026-02-11.log`)
pub fn day_file_name(day_key: &str) -> String {
    format!("{}.{}", day_key, LOG_FILE_EXTENSION)
}

/// Path of the day file for a key under the storage root
pub fn day_file_path(root: &Path, day_key: &str) -> PathBuf {
    root.join(day_file_name(day_key))
}

/// Parse the date out of a `YYYY-MM-DD.log` file name
///
/// Returns `None` for names that do not follow the day-file convention.
pub fn parse_day_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(&format!(".{}", LOG_FILE_EXTENSION))?;
    if stem.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(stem, DAY_KEY_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_key_is_zero_padded() {
        let instant = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
        assert_eq!(DayCalendar::Utc.day_key(instant), "2026-02-01");
    }

    #[test]
    fn test_day_key_follows_calendar_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 2, 11, 23, 30, 0).unwrap();
        let tokyo = DayCalendar::Fixed(FixedOffset::east_opt(9 * 3600).unwrap());
        let honolulu = DayCalendar::Fixed(FixedOffset::west_opt(10 * 3600).unwrap());

        assert_eq!(DayCalendar::Utc.day_key(instant), "2026-02-11");
        assert_eq!(tokyo.day_key(instant), "2026-02-12");
        assert_eq!(honolulu.day_key(instant), "2026-02-11");
    }

    #[test]
    fn test_same_day_same_bucket() {
        let morning = Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2026, 2, 11, 23, 59, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2026, 2, 12, 0, 0, 0).unwrap();

        assert_eq!(DayCalendar::Utc.day_key(morning), DayCalendar::Utc.day_key(night));
        assert_ne!(DayCalendar::Utc.day_key(night), DayCalendar::Utc.day_key(next));
    }

    #[test]
    fn test_day_file_path() {
        let path = day_file_path(Path::new("/tmp/logs"), "2026-02-11");
        assert_eq!(path, PathBuf::from("/tmp/logs/2026-02-11.log"));
    }

    #[test]
    fn test_parse_day_file_name() {
        assert_eq!(
            parse_day_file_name("2026-02-11.log"),
            NaiveDate::from_ymd_opt(2026, 2, 11)
        );
        assert_eq!(parse_day_file_name("2026-2-11.log"), None);
        assert_eq!(parse_day_file_name("2026-02-11.txt"), None);
        assert_eq!(parse_day_file_name("notes.log"), None);
        assert_eq!(parse_day_file_name("2026-02-30.log"), None);
    }
}
