use chrono::{Datelike, Duration, NaiveDate};

use crate::errors::{EngineError, Result};

/// parse a date-like string into a civil date
///
/// accepts `YYYY-MM-DD`, or an ISO datetime where the date part is taken
/// verbatim (`YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`). no timezone
/// conversion is ever applied. returns None on unparseable input.
pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() < 10 {
        return None;
    }

    let (date_part, rest) = trimmed.split_at(10);
    if !rest.is_empty() && !rest.starts_with('T') && !rest.starts_with(' ') {
        return None;
    }

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// parse a required date field, surfacing the failure
pub fn require_date_key(value: &str) -> Result<NaiveDate> {
    parse_date_key(value).ok_or_else(|| EngineError::InvalidDateFormat {
        value: value.to_string(),
    })
}

/// format a civil date as its `YYYY-MM-DD` key
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// whole days between two dates, counting both endpoints
///
/// `days_between_inclusive(d, d) == 1`; symmetric in its arguments.
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// add calendar days
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// next occurrence of `target_day` strictly after `from`
///
/// with `month_offset == 0`: the target day in `from`'s month if still
/// ahead, otherwise in the following month. with an offset: the target
/// day `month_offset` months ahead of `from`'s month. a target day past
/// the end of the resulting month clamps to that month's last day.
pub fn next_day_of_month(from: NaiveDate, target_day: u32, month_offset: u32) -> NaiveDate {
    let target_day = target_day.clamp(1, 31);

    if month_offset > 0 {
        let (year, month) = shift_month(from.year(), from.month(), month_offset);
        return clamped_date(year, month, target_day);
    }

    let candidate = clamped_date(from.year(), from.month(), target_day);
    if candidate > from {
        candidate
    } else {
        let (year, month) = shift_month(from.year(), from.month(), 1);
        clamped_date(year, month, target_day)
    }
}

/// date at (year, month, day) with day clamped to the month's length
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("day clamped to month length")
}

fn shift_month(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let zero_based = (month - 1) + offset;
    (year + (zero_based / 12) as i32, (zero_based % 12) + 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(parse_date_key("2024-03-15"), Some(d(2024, 3, 15)));
        assert_eq!(parse_date_key("2024-03-15T10:30:00"), Some(d(2024, 3, 15)));
        assert_eq!(parse_date_key("2024-03-15 10:30:00"), Some(d(2024, 3, 15)));
        assert_eq!(parse_date_key(" 2024-03-15 "), Some(d(2024, 3, 15)));

        assert_eq!(parse_date_key("15-03-2024"), None);
        assert_eq!(parse_date_key("2024-13-01"), None);
        assert_eq!(parse_date_key("2024-02-30"), None);
        assert_eq!(parse_date_key("garbage"), None);
        assert_eq!(parse_date_key(""), None);
    }

    #[test]
    fn test_require_date_key() {
        assert!(require_date_key("2024-03-15").is_ok());
        assert!(matches!(
            require_date_key("not-a-date"),
            Err(EngineError::InvalidDateFormat { .. })
        ));
    }

    #[test]
    fn test_date_key_round_trip() {
        let date = d(2024, 2, 29);
        assert_eq!(date_key(date), "2024-02-29");
        assert_eq!(parse_date_key(&date_key(date)), Some(date));
    }

    #[test]
    fn test_days_between_inclusive() {
        let day = d(2024, 3, 15);
        assert_eq!(days_between_inclusive(day, day), 1);

        assert_eq!(days_between_inclusive(d(2024, 3, 1), d(2024, 3, 15)), 15);

        // symmetric in magnitude
        assert_eq!(
            days_between_inclusive(d(2024, 3, 15), d(2024, 3, 1)),
            days_between_inclusive(d(2024, 3, 1), d(2024, 3, 15)),
        );

        // across the leap day
        assert_eq!(days_between_inclusive(d(2024, 2, 28), d(2024, 3, 1)), 3);
        assert_eq!(days_between_inclusive(d(2023, 2, 28), d(2023, 3, 1)), 2);
    }

    #[test]
    fn test_next_day_of_month_strictly_after() {
        // target still ahead in the same month
        assert_eq!(next_day_of_month(d(2024, 3, 10), 25, 0), d(2024, 3, 25));

        // target already passed rolls to next month
        assert_eq!(next_day_of_month(d(2024, 3, 25), 10, 0), d(2024, 4, 10));

        // same day rolls forward, never returns the input
        assert_eq!(next_day_of_month(d(2024, 3, 15), 15, 0), d(2024, 4, 15));

        // december rollover
        assert_eq!(next_day_of_month(d(2024, 12, 20), 5, 0), d(2025, 1, 5));
    }

    #[test]
    fn test_next_day_of_month_clamping() {
        // feb-31 clamps to feb 29 in a leap year
        assert_eq!(next_day_of_month(d(2024, 1, 31), 31, 1), d(2024, 2, 29));
        // and to feb 28 otherwise
        assert_eq!(next_day_of_month(d(2023, 1, 31), 31, 1), d(2023, 2, 28));

        // clamped result still strictly after the input at offset 0
        assert_eq!(next_day_of_month(d(2024, 2, 28), 31, 0), d(2024, 2, 29));
        assert_eq!(next_day_of_month(d(2024, 2, 29), 31, 0), d(2024, 3, 31));
    }

    #[test]
    fn test_next_day_of_month_with_offset() {
        assert_eq!(next_day_of_month(d(2024, 3, 10), 10, 1), d(2024, 4, 10));
        assert_eq!(next_day_of_month(d(2024, 11, 10), 10, 2), d(2025, 1, 10));
        // offset counts months even when the target day sits before the anchor
        assert_eq!(next_day_of_month(d(2024, 3, 25), 5, 1), d(2024, 4, 5));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(d(2024, 2, 28), 2), d(2024, 3, 1));
        assert_eq!(add_days(d(2024, 12, 31), 15), d(2025, 1, 15));
    }
}
