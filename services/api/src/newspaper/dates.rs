//! services/api/src/newspaper/dates.rs
//!
//! Calendar math for editions and retention. All of it runs in one fixed
//! timezone so "today" does not depend on where the server happens to run.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// The fixed timezone all edition dates and retention cutoffs are computed in.
pub const NEWSPAPER_TZ: Tz = chrono_tz::Asia::Tokyo;

/// Historical editions can be requested this many days back.
pub const EDITION_WINDOW_DAYS: i64 = 7;

/// Editions older than this many days are swept.
pub const RETENTION_DAYS: i64 = 7;

/// When a target day yields too few articles, the filter widens to this many
/// days before the target.
pub const WIDENED_WINDOW_DAYS: i64 = 7;

/// Today's date in the newspaper timezone.
pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&NEWSPAPER_TZ).date_naive()
}

/// An edition date is valid only within [today - 7, today].
pub fn edition_date_in_window(date: NaiveDate, today: NaiveDate) -> bool {
    let earliest = today - Duration::days(EDITION_WINDOW_DAYS);
    date >= earliest && date <= today
}

/// The retention cutoff: editions dated strictly before this are deleted.
pub fn retention_cutoff(today: NaiveDate) -> NaiveDate {
    today - Duration::days(RETENTION_DAYS)
}

/// Converts a publish timestamp to its calendar day in the newspaper
/// timezone.
pub fn published_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&NEWSPAPER_TZ).date_naive()
}

/// True when the timestamp falls exactly on the target day.
pub fn on_day(ts: DateTime<Utc>, day: NaiveDate) -> bool {
    published_day(ts) == day
}

/// True when the timestamp falls inside [day - WIDENED_WINDOW_DAYS, day].
pub fn in_widened_window(ts: DateTime<Utc>, day: NaiveDate) -> bool {
    let published = published_day(ts);
    published <= day && published >= day - Duration::days(WIDENED_WINDOW_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn edition_window_is_inclusive_both_ends() {
        let today = day(2026, 8, 28);
        assert!(edition_date_in_window(today, today));
        assert!(edition_date_in_window(day(2026, 8, 21), today));
        assert!(!edition_date_in_window(day(2026, 8, 20), today));
        assert!(!edition_date_in_window(day(2026, 8, 29), today));
    }

    #[test]
    fn retention_cutoff_is_seven_days_back() {
        assert_eq!(retention_cutoff(day(2026, 8, 28)), day(2026, 8, 21));
    }

    #[test]
    fn day_boundaries_follow_the_fixed_timezone() {
        // 2026-08-27 16:00 UTC is already 2026-08-28 01:00 in Tokyo.
        let ts = Utc.with_ymd_and_hms(2026, 8, 27, 16, 0, 0).unwrap();
        assert_eq!(published_day(ts), day(2026, 8, 28));
        assert!(on_day(ts, day(2026, 8, 28)));
        assert!(!on_day(ts, day(2026, 8, 27)));
    }

    #[test]
    fn widened_window_spans_seven_days_before_target() {
        let target = day(2026, 8, 28);
        let inside = Utc.with_ymd_and_hms(2026, 8, 21, 3, 0, 0).unwrap();
        let outside = Utc.with_ymd_and_hms(2026, 8, 20, 3, 0, 0).unwrap();
        assert!(in_widened_window(inside, target));
        assert!(!in_widened_window(outside, target));
    }
}
