//! Data model for recurring series: patterns, ranges, exceptions, master events
//! and the occurrences they expand into.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};

/// Calendar date layout used on the wire and in event ids.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RecurrenceError::InvalidDate(s.to_string()))
}

/// Parse an ISO 8601 local datetime (`2024-01-01T09:00:00`, optional fraction).
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    s.trim()
        .parse::<NaiveDateTime>()
        .map_err(|_| RecurrenceError::InvalidDateTime(s.to_string()))
}

/// Truncate a recorded date or datetime string to its calendar date.
///
/// Accepts `YYYY-MM-DD`, a local ISO 8601 datetime, or an RFC 3339 datetime
/// with an offset. Any other string that begins with a `YYYY-MM-DD` date
/// (minute precision, basic-format offsets, a space separator) falls back to
/// that leading date. The date portion is taken as written, never shifted into
/// another zone. Returns `None` when no leading date can be read.
pub fn truncate_to_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = parse_date(s) {
        return Some(date);
    }
    if let Ok(dt) = parse_datetime(s) {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    if s.len() > 10 && s.is_char_boundary(10) {
        return parse_date(&s[..10]).ok();
    }
    None
}

// ---------------------------------------------------------------------------
// Days of the week
// ---------------------------------------------------------------------------

/// A day of the week. Ordered Sunday first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All days, Sunday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// The day a calendar date falls on.
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    /// Lower-case wire name (`"monday"`).
    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    /// Short label used in summaries (`M`, `Tu`, `W`, `Th`, `F`, `Sa`, `Su`).
    pub fn abbreviation(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Su",
            DayOfWeek::Monday => "M",
            DayOfWeek::Tuesday => "Tu",
            DayOfWeek::Wednesday => "W",
            DayOfWeek::Thursday => "Th",
            DayOfWeek::Friday => "F",
            DayOfWeek::Saturday => "Sa",
        }
    }

    /// Position counting from Sunday (0..=6).
    pub fn index_from_sunday(self) -> usize {
        self as usize
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = RecurrenceError;

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Ok(DayOfWeek::Sunday),
            "monday" | "mon" => Ok(DayOfWeek::Monday),
            "tuesday" | "tue" => Ok(DayOfWeek::Tuesday),
            "wednesday" | "wed" => Ok(DayOfWeek::Wednesday),
            "thursday" | "thu" => Ok(DayOfWeek::Thursday),
            "friday" | "fri" => Ok(DayOfWeek::Friday),
            "saturday" | "sat" => Ok(DayOfWeek::Saturday),
            _ => Err(RecurrenceError::UnknownDayOfWeek(s.to_string())),
        }
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = RecurrenceError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Pattern and range
// ---------------------------------------------------------------------------

/// The repeating rule of a series.
///
/// An `interval` of 0 is malformed: such a pattern matches no date and
/// summarizes to an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrencePattern {
    Daily {
        interval: u32,
    },
    Weekly {
        interval: u32,
        /// Days the series occurs on. Empty matches nothing.
        days_of_week: BTreeSet<DayOfWeek>,
        /// Display order hint for summaries; never affects matching.
        first_day_of_week: Option<DayOfWeek>,
    },
    Monthly {
        interval: u32,
    },
    Yearly {
        interval: u32,
    },
}

impl RecurrencePattern {
    pub fn daily(interval: u32) -> Self {
        RecurrencePattern::Daily { interval }
    }

    pub fn weekly(interval: u32, days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        RecurrencePattern::Weekly {
            interval,
            days_of_week: days.into_iter().collect(),
            first_day_of_week: None,
        }
    }

    pub fn monthly(interval: u32) -> Self {
        RecurrencePattern::Monthly { interval }
    }

    pub fn yearly(interval: u32) -> Self {
        RecurrencePattern::Yearly { interval }
    }

    /// Set the advisory first day of the week. No-op for non-weekly patterns.
    pub fn with_first_day_of_week(mut self, day: DayOfWeek) -> Self {
        if let RecurrencePattern::Weekly {
            first_day_of_week, ..
        } = &mut self
        {
            *first_day_of_week = Some(day);
        }
        self
    }

    pub fn interval(&self) -> u32 {
        match self {
            RecurrencePattern::Daily { interval }
            | RecurrencePattern::Weekly { interval, .. }
            | RecurrencePattern::Monthly { interval }
            | RecurrencePattern::Yearly { interval } => *interval,
        }
    }

    /// False for a zero interval or a weekly pattern without days.
    pub fn is_well_formed(&self) -> bool {
        match self {
            RecurrencePattern::Weekly {
                interval,
                days_of_week,
                ..
            } => *interval >= 1 && !days_of_week.is_empty(),
            other => other.interval() >= 1,
        }
    }
}

/// How a recurrence range ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// Last possible occurrence date, inclusive.
    EndDate(NaiveDate),
    /// Total number of occurrences in the series.
    Numbered(u32),
    NoEnd,
}

/// The temporal bound of a pattern. `start_date` anchors all interval arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRange {
    pub start_date: NaiveDate,
    pub end: RangeEnd,
}

impl RecurrenceRange {
    pub fn no_end(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end: RangeEnd::NoEnd,
        }
    }

    pub fn end_date(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end: RangeEnd::EndDate(end_date),
        }
    }

    pub fn numbered(start_date: NaiveDate, number_of_occurrences: u32) -> Self {
        Self {
            start_date,
            end: RangeEnd::Numbered(number_of_occurrences),
        }
    }
}

/// A pattern together with its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    pub pattern: RecurrencePattern,
    pub range: RecurrenceRange,
}

impl Recurrence {
    pub fn new(pattern: RecurrencePattern, range: RecurrenceRange) -> Self {
        Self { pattern, range }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A local wall-clock datetime with its time zone carried alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: NaiveDateTime,
    pub time_zone: String,
}

impl EventDateTime {
    pub fn new(date_time: NaiveDateTime, time_zone: impl Into<String>) -> Self {
        Self {
            date_time,
            time_zone: time_zone.into(),
        }
    }

    /// Build from an ISO 8601 local datetime string.
    pub fn parse(date_time: &str, time_zone: &str) -> Result<Self> {
        Ok(Self::new(parse_datetime(date_time)?, time_zone))
    }

    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }

    /// Same time of day and zone, on another calendar date.
    pub fn on_date(&self, date: NaiveDate) -> Self {
        Self {
            date_time: date.and_time(self.date_time.time()),
            time_zone: self.time_zone.clone(),
        }
    }

    /// Resolve to a UTC instant through the IANA zone.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    ///
    /// # Errors
    /// `InvalidTimezone` for an unknown zone name; `InvalidDateTime` when the
    /// local time falls in a DST gap.
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        let tz: Tz = self
            .time_zone
            .parse()
            .map_err(|_| RecurrenceError::InvalidTimezone(self.time_zone.clone()))?;
        tz.from_local_datetime(&self.date_time)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                RecurrenceError::InvalidDateTime(format!(
                    "{} does not exist in {}",
                    self.date_time, self.time_zone
                ))
            })
    }
}

/// A per-date override of one occurrence: a cancellation or a modification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Exception {
    /// Id of the stored exception instance, if it has one.
    pub id: Option<String>,
    /// Recorded original start of the overridden occurrence (date or datetime).
    #[serde(alias = "originalDate")]
    pub original_start: Option<String>,
    pub is_cancelled: bool,
    pub subject: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    pub location: Option<String>,
}

impl Exception {
    pub fn cancelled(original_date: NaiveDate) -> Self {
        Self {
            original_start: Some(original_date.format(DATE_FORMAT).to_string()),
            is_cancelled: true,
            ..Self::default()
        }
    }

    pub fn modified(original_date: NaiveDate) -> Self {
        Self {
            original_start: Some(original_date.format(DATE_FORMAT).to_string()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_times(mut self, start: EventDateTime, end: EventDateTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// The date this exception overrides, or `None` if missing or malformed.
    pub fn original_date(&self) -> Option<NaiveDate> {
        self.original_start.as_deref().and_then(truncate_to_date)
    }
}

/// The series definition: pattern, range, exceptions and ad-hoc date edits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterEvent {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default, deserialize_with = "crate::wire::lenient::deserialize")]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub exceptions: Vec<Exception>,
    #[serde(default)]
    pub ad_hoc_additions: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub ad_hoc_exclusions: BTreeSet<NaiveDate>,
}

impl MasterEvent {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        start: EventDateTime,
        end: EventDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            location: None,
            start,
            end,
            recurrence: None,
            exceptions: Vec::new(),
            ad_hoc_additions: BTreeSet::new(),
            ad_hoc_exclusions: BTreeSet::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn with_exception(mut self, exception: Exception) -> Self {
        self.exceptions.push(exception);
        self
    }

    pub fn with_addition(mut self, date: NaiveDate) -> Self {
        self.ad_hoc_additions.insert(date);
        self
    }

    pub fn with_exclusion(mut self, date: NaiveDate) -> Self {
        self.ad_hoc_exclusions.insert(date);
        self
    }

    /// Human-readable description of the series; empty without a recurrence.
    pub fn summary(&self) -> String {
        self.recurrence
            .as_ref()
            .map(|r| crate::summary::format(&r.pattern, &r.range))
            .unwrap_or_default()
    }
}

/// One concrete dated instance of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub event_id: String,
    pub series_master_id: String,
    /// The series date this instance belongs to, before any override moved it.
    pub original_date: NaiveDate,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub subject: String,
    pub location: Option<String>,
    pub is_recurring: bool,
    pub is_exception: bool,
}

/// Occurrence id for a series date: `<masterId>-YYYY-MM-DD`.
pub fn occurrence_id(master_id: &str, date: NaiveDate) -> String {
    format!("{}-{}", master_id, date.format(DATE_FORMAT))
}
