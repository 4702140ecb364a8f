//! Pattern matching: does a calendar date satisfy a recurrence pattern?
//!
//! All arithmetic is anchored at the range start date. Dates are plain calendar
//! dates (`NaiveDate`), so day counts are never skewed by time of day or zone.

use chrono::{Datelike, NaiveDate};

use crate::model::{DayOfWeek, RecurrencePattern};
use crate::policy::MonthDayOverflow;

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Calendar months from `from` to `to`, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Number of the last day in `date`'s month (28..=31).
pub fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Check `date` against `pattern` anchored at `start_date`, skipping months
/// that lack the anchor day.
///
/// Dates before `start_date` and malformed patterns never match.
pub fn matches(date: NaiveDate, pattern: &RecurrencePattern, start_date: NaiveDate) -> bool {
    matches_with(date, pattern, start_date, MonthDayOverflow::default())
}

/// [`matches`] with an explicit policy for anchor days a month lacks.
pub fn matches_with(
    date: NaiveDate,
    pattern: &RecurrencePattern,
    start_date: NaiveDate,
    overflow: MonthDayOverflow,
) -> bool {
    if date < start_date || !pattern.is_well_formed() {
        return false;
    }
    let interval = i64::from(pattern.interval());

    match pattern {
        RecurrencePattern::Daily { .. } => days_between(start_date, date) % interval == 0,
        RecurrencePattern::Weekly { days_of_week, .. } => {
            // Weeks are counted in 7-day blocks from the start date, not
            // from a calendar week boundary.
            days_of_week.contains(&DayOfWeek::of(date))
                && (days_between(start_date, date) / 7) % interval == 0
        }
        RecurrencePattern::Monthly { .. } => {
            day_matches(date, start_date.day(), overflow)
                && months_between(start_date, date) % interval == 0
        }
        RecurrencePattern::Yearly { .. } => {
            date.month() == start_date.month()
                && day_matches(date, start_date.day(), overflow)
                && i64::from(date.year() - start_date.year()) % interval == 0
        }
    }
}

fn day_matches(date: NaiveDate, anchor_day: u32, overflow: MonthDayOverflow) -> bool {
    if date.day() == anchor_day {
        return true;
    }
    match overflow {
        MonthDayOverflow::Skip => false,
        MonthDayOverflow::ClampToMonthEnd => {
            let last = last_day_of_month(date);
            anchor_day > last && date.day() == last
        }
    }
}
