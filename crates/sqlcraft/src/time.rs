//! Symbolic time ranges for the time-suffixed operators.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

pub(crate) const FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a datetime the way bound time values are rendered.
pub fn format(dt: NaiveDateTime) -> String {
    dt.format(FMT).to_string()
}

/// Resolve a built-in symbolic range name relative to `now`.
///
/// Half-open ranges `[start, end)`; weeks start on Monday. The single-letter
/// shortcuts `d`, `w`, `m`, `y` alias the current day, week, month and year.
pub fn builtin_range(name: &str, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let today = now.date();
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let (start, end) = match name.trim().to_ascii_lowercase().as_str() {
        "today" | "d" => (today, today.succ_opt()?),
        "yesterday" => (today.pred_opt()?, today),
        "week" | "w" => (monday, monday + Days::new(7)),
        "last week" => (monday - Days::new(7), monday),
        "month" | "m" => {
            let first = today.with_day(1)?;
            (first, first + Months::new(1))
        }
        "last month" => {
            let first = today.with_day(1)?;
            (first - Months::new(1), first)
        }
        "year" | "y" => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
        ),
        "last year" => (
            NaiveDate::from_ymd_opt(today.year() - 1, 1, 1)?,
            NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        ),
        _ => return None,
    };
    Some((start.and_time(NaiveTime::MIN), end.and_time(NaiveTime::MIN)))
}

/// Normalize a user-supplied datetime string.
///
/// Full datetimes pass through, bare dates gain a midnight time component,
/// anything else is left for the database to interpret.
pub(crate) fn normalize(s: &str) -> String {
    if NaiveDateTime::parse_from_str(s, FMT).is_ok() {
        return s.to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return format(date.and_time(NaiveTime::MIN));
    }
    s.to_string()
}

/// Render a unix timestamp as a datetime string.
pub(crate) fn from_timestamp(ts: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(ts, 0).map(|dt| format(dt.naive_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> NaiveDateTime {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    fn range(name: &str) -> (String, String) {
        let (start, end) = builtin_range(name, anchor()).unwrap();
        (format(start), format(end))
    }

    #[test]
    fn today_and_yesterday() {
        assert_eq!(
            range("today"),
            ("2025-03-12 00:00:00".into(), "2025-03-13 00:00:00".into())
        );
        assert_eq!(range("d"), range("today"));
        assert_eq!(
            range("yesterday"),
            ("2025-03-11 00:00:00".into(), "2025-03-12 00:00:00".into())
        );
    }

    #[test]
    fn weeks_start_monday() {
        assert_eq!(
            range("week"),
            ("2025-03-10 00:00:00".into(), "2025-03-17 00:00:00".into())
        );
        assert_eq!(
            range("last week"),
            ("2025-03-03 00:00:00".into(), "2025-03-10 00:00:00".into())
        );
    }

    #[test]
    fn months_and_years() {
        assert_eq!(
            range("month"),
            ("2025-03-01 00:00:00".into(), "2025-04-01 00:00:00".into())
        );
        assert_eq!(
            range("last month"),
            ("2025-02-01 00:00:00".into(), "2025-03-01 00:00:00".into())
        );
        assert_eq!(
            range("year"),
            ("2025-01-01 00:00:00".into(), "2026-01-01 00:00:00".into())
        );
        assert_eq!(
            range("last year"),
            ("2024-01-01 00:00:00".into(), "2025-01-01 00:00:00".into())
        );
    }

    #[test]
    fn unknown_name() {
        assert!(builtin_range("fortnight", anchor()).is_none());
    }

    #[test]
    fn normalize_dates() {
        assert_eq!(normalize("2025-01-02 03:04:05"), "2025-01-02 03:04:05");
        assert_eq!(normalize("2025-01-02"), "2025-01-02 00:00:00");
        assert_eq!(normalize("whenever"), "whenever");
    }

    #[test]
    fn timestamp_rendering() {
        assert_eq!(from_timestamp(0).as_deref(), Some("1970-01-01 00:00:00"));
    }
}
