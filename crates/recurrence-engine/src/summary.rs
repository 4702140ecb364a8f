//! Human-readable recurrence summaries.
//!
//! Output is a deterministic function of the inputs. Malformed patterns
//! (zero interval, weekly without days) summarize to an empty string.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::{DayOfWeek, MasterEvent, RangeEnd, RecurrencePattern, RecurrenceRange};

/// Date layout in summaries, e.g. `Mar 31, 2024`.
pub const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

/// Whether an ad-hoc date was added to or removed from the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AdjustmentTag {
    Added,
    Excluded,
}

/// One ad-hoc date edit, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub date: NaiveDate,
    pub date_text: String,
    pub tag: AdjustmentTag,
}

/// Base summary plus the ad-hoc edits, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedSummary {
    pub base: String,
    pub adjustments: Vec<Adjustment>,
}

/// Summarize a pattern and its range.
///
/// ```
/// use chrono::NaiveDate;
/// use recurrence_engine::model::{DayOfWeek, RecurrencePattern, RecurrenceRange};
/// use recurrence_engine::summary::format;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let pattern = RecurrencePattern::weekly(
///     2,
///     [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday],
/// );
/// let range = RecurrenceRange::numbered(start, 10);
/// assert_eq!(
///     format(&pattern, &range),
///     "Occurs every 2 weeks on M, W, F. For 10 occurrences"
/// );
/// ```
pub fn format(pattern: &RecurrencePattern, range: &RecurrenceRange) -> String {
    let Some(base) = describe_pattern(pattern, range.start_date) else {
        return String::new();
    };
    match range.end {
        RangeEnd::EndDate(end) => format!("{}. Until {}", base, end.format(DISPLAY_DATE_FORMAT)),
        RangeEnd::Numbered(1) => format!("{}. For 1 occurrence", base),
        RangeEnd::Numbered(n) => format!("{}. For {} occurrences", base, n),
        RangeEnd::NoEnd => base,
    }
}

/// Summarize a pattern and range together with ad-hoc additions and exclusions.
pub fn format_enhanced(
    pattern: &RecurrencePattern,
    range: &RecurrenceRange,
    additions: &BTreeSet<NaiveDate>,
    exclusions: &BTreeSet<NaiveDate>,
) -> EnhancedSummary {
    let mut edits: Vec<(NaiveDate, AdjustmentTag)> = additions
        .iter()
        .map(|d| (*d, AdjustmentTag::Added))
        .chain(exclusions.iter().map(|d| (*d, AdjustmentTag::Excluded)))
        .collect();
    edits.sort();

    EnhancedSummary {
        base: format(pattern, range),
        adjustments: edits
            .into_iter()
            .map(|(date, tag)| Adjustment {
                date,
                date_text: date.format(DISPLAY_DATE_FORMAT).to_string(),
                tag,
            })
            .collect(),
    }
}

/// [`format_enhanced`] for a master event; an empty summary without a recurrence.
pub fn format_event(master: &MasterEvent) -> EnhancedSummary {
    match &master.recurrence {
        Some(r) => format_enhanced(
            &r.pattern,
            &r.range,
            &master.ad_hoc_additions,
            &master.ad_hoc_exclusions,
        ),
        None => EnhancedSummary {
            base: String::new(),
            adjustments: Vec::new(),
        },
    }
}

fn describe_pattern(pattern: &RecurrencePattern, start_date: NaiveDate) -> Option<String> {
    if !pattern.is_well_formed() {
        return None;
    }
    let text = match pattern {
        RecurrencePattern::Daily { interval } => every("day", *interval),
        RecurrencePattern::Weekly {
            interval,
            days_of_week,
            first_day_of_week,
        } => format!(
            "{} on {}",
            every("week", *interval),
            day_list(days_of_week, first_day_of_week.unwrap_or(DayOfWeek::Sunday))
        ),
        RecurrencePattern::Monthly { interval } => {
            format!("{} on day {}", every("month", *interval), start_date.day())
        }
        RecurrencePattern::Yearly { interval } => {
            format!("{} on {}", every("year", *interval), start_date.format("%B %-d"))
        }
    };
    Some(text)
}

fn every(unit: &str, interval: u32) -> String {
    if interval == 1 {
        format!("Occurs every {}", unit)
    } else {
        format!("Occurs every {} {}s", interval, unit)
    }
}

/// Abbreviated day list in week order, starting from `first_day`.
fn day_list(days: &BTreeSet<DayOfWeek>, first_day: DayOfWeek) -> String {
    let offset = first_day.index_from_sunday();
    (0..7)
        .map(|i| DayOfWeek::ALL[(offset + i) % 7])
        .filter(|day| days.contains(day))
        .map(DayOfWeek::abbreviation)
        .collect::<Vec<_>>()
        .join(", ")
}
