//! Mapping between the internal recurrence model and the calendar API's wire
//! schema.
//!
//! ```text
//! {
//!   "pattern": { "type": "weekly", "interval": 1,
//!                "daysOfWeek": ["monday"], "firstDayOfWeek": "sunday" },
//!   "range":   { "type": "endDate", "startDate": "2024-01-01",
//!                "recurrenceTimeZone": "UTC", "endDate": "2024-03-31" }
//! }
//! ```
//!
//! `type` values are kept as plain strings so that unknown variants still
//! deserialize and are rejected by [`from_wire`] with a typed error.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{RecurrenceError, Result};
use crate::model::{
    parse_date, DayOfWeek, RangeEnd, Recurrence, RecurrencePattern, RecurrenceRange, DATE_FORMAT,
};

/// Wire form of a recurrence: pattern plus range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecurrence {
    pub pattern: WirePattern,
    pub range: WireRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePattern {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_interval")]
    pub interval: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_day_of_week: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRange {
    #[serde(rename = "type")]
    pub kind: String,
    pub start_date: String,
    #[serde(default)]
    pub recurrence_time_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_occurrences: Option<i64>,
}

fn default_interval() -> i64 {
    1
}

/// Map a recurrence to its wire form, tagging the range with `time_zone`.
///
/// `daysOfWeek` is only written for weekly patterns with at least one day;
/// `endDate` and `numberOfOccurrences` only for their own range type.
pub fn to_wire(recurrence: &Recurrence, time_zone: &str) -> WireRecurrence {
    let (kind, days_of_week, first_day_of_week) = match &recurrence.pattern {
        RecurrencePattern::Daily { .. } => ("daily", None, None),
        RecurrencePattern::Weekly {
            days_of_week,
            first_day_of_week,
            ..
        } => (
            "weekly",
            (!days_of_week.is_empty())
                .then(|| days_of_week.iter().map(|d| d.name().to_string()).collect::<Vec<_>>()),
            first_day_of_week.map(|d| d.name().to_string()),
        ),
        RecurrencePattern::Monthly { .. } => ("monthly", None, None),
        RecurrencePattern::Yearly { .. } => ("yearly", None, None),
    };

    let range = &recurrence.range;
    let (range_kind, end_date, number_of_occurrences) = match range.end {
        RangeEnd::EndDate(end) => ("endDate", Some(end.format(DATE_FORMAT).to_string()), None),
        RangeEnd::Numbered(n) => ("numbered", None, Some(i64::from(n))),
        RangeEnd::NoEnd => ("noEnd", None, None),
    };

    WireRecurrence {
        pattern: WirePattern {
            kind: kind.to_string(),
            interval: i64::from(recurrence.pattern.interval()),
            days_of_week,
            first_day_of_week,
        },
        range: WireRange {
            kind: range_kind.to_string(),
            start_date: range.start_date.format(DATE_FORMAT).to_string(),
            recurrence_time_zone: time_zone.to_string(),
            end_date,
            number_of_occurrences,
        },
    }
}

/// Map a wire recurrence back to the internal model.
///
/// Type and day names are case-insensitive. `absoluteMonthly` and
/// `absoluteYearly` are accepted as aliases of `monthly` and `yearly`.
///
/// # Errors
/// Unknown types or day names, an interval or occurrence count below 1,
/// unparseable dates, and a missing `endDate`/`numberOfOccurrences` for the
/// range type that requires it.
pub fn from_wire(wire: &WireRecurrence) -> Result<Recurrence> {
    Ok(Recurrence {
        pattern: pattern_from_wire(&wire.pattern)?,
        range: range_from_wire(&wire.range)?,
    })
}

/// Parse a wire recurrence from JSON text.
pub fn from_json(json: &str) -> Result<Recurrence> {
    let wire: WireRecurrence = serde_json::from_str(json)?;
    from_wire(&wire)
}

/// Render a recurrence as wire JSON.
pub fn to_json(recurrence: &Recurrence, time_zone: &str) -> Result<String> {
    Ok(serde_json::to_string(&to_wire(recurrence, time_zone))?)
}

fn pattern_from_wire(wire: &WirePattern) -> Result<RecurrencePattern> {
    let interval = u32::try_from(wire.interval)
        .ok()
        .filter(|i| *i >= 1)
        .ok_or(RecurrenceError::InvalidInterval(wire.interval))?;

    match wire.kind.to_ascii_lowercase().as_str() {
        "daily" => Ok(RecurrencePattern::Daily { interval }),
        "weekly" => {
            let days_of_week = wire
                .days_of_week
                .iter()
                .flatten()
                .map(|name| name.parse::<DayOfWeek>())
                .collect::<Result<BTreeSet<DayOfWeek>>>()?;
            let first_day_of_week: Option<DayOfWeek> = wire
                .first_day_of_week
                .as_deref()
                .map(str::parse::<DayOfWeek>)
                .transpose()?;
            Ok(RecurrencePattern::Weekly {
                interval,
                days_of_week,
                first_day_of_week,
            })
        }
        "monthly" | "absolutemonthly" => Ok(RecurrencePattern::Monthly { interval }),
        "yearly" | "absoluteyearly" => Ok(RecurrencePattern::Yearly { interval }),
        _ => Err(RecurrenceError::UnknownPatternType(wire.kind.clone())),
    }
}

fn range_from_wire(wire: &WireRange) -> Result<RecurrenceRange> {
    if wire.start_date.trim().is_empty() {
        return Err(RecurrenceError::MissingField("startDate"));
    }
    let start_date = parse_date(&wire.start_date)?;

    let end = match wire.kind.to_ascii_lowercase().as_str() {
        "enddate" => {
            let raw = wire
                .end_date
                .as_deref()
                .ok_or(RecurrenceError::MissingField("endDate"))?;
            RangeEnd::EndDate(parse_date(raw)?)
        }
        "numbered" => {
            let raw = wire
                .number_of_occurrences
                .ok_or(RecurrenceError::MissingField("numberOfOccurrences"))?;
            let n = u32::try_from(raw)
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(RecurrenceError::InvalidOccurrenceCount(raw))?;
            RangeEnd::Numbered(n)
        }
        "noend" => RangeEnd::NoEnd,
        _ => return Err(RecurrenceError::UnknownRangeType(wire.kind.clone())),
    };

    Ok(RecurrenceRange { start_date, end })
}

/// Serde helper for recurrence fields on stored events: anything that does not
/// map to a valid recurrence becomes `None` instead of failing the document.
pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use tracing::debug;

    use super::WireRecurrence;
    use crate::model::Recurrence;

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<Recurrence>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| {
            let parsed = serde_json::from_value::<WireRecurrence>(value)
                .map_err(crate::error::RecurrenceError::from)
                .and_then(|wire| super::from_wire(&wire));
            match parsed {
                Ok(recurrence) => Some(recurrence),
                Err(e) => {
                    debug!(error = %e, "treating malformed recurrence as absent");
                    None
                }
            }
        }))
    }
}
