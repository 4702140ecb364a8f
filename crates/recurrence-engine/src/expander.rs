//! Series expansion -- turns a master event into concrete occurrences within a
//! query window, overlaying exceptions and ad-hoc date edits.
//!
//! Expansion is a pure function of its inputs: every call recomputes the
//! result, and nothing is cached or mutated.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use crate::model::{
    occurrence_id, EventDateTime, Exception, MasterEvent, Occurrence, RangeEnd, Recurrence,
};
use crate::pattern;
use crate::policy::{CountAnchor, ExpandOptions, MonthDayOverflow};
use crate::range::{self, DateWindow};

/// Expand `master` into the occurrences falling within
/// `[query_start, query_end]` (both inclusive), using default policies.
///
/// Occurrences are ordered by their series date. A master event without a
/// recurrence, or a query window that is empty after clipping, yields nothing.
pub fn expand(master: &MasterEvent, query_start: NaiveDate, query_end: NaiveDate) -> Vec<Occurrence> {
    expand_with(master, query_start, query_end, ExpandOptions::default())
}

/// Expand `master` with explicit policies.
///
/// For each candidate date in the clipped window, the date is a series date
/// when it matches the pattern or is an ad-hoc addition, and is not an ad-hoc
/// exclusion. A cancelling exception on a series date suppresses it; any other
/// exception replaces the synthesized occurrence with its overrides.
///
/// `Numbered` ranges stop after `n` series dates. With
/// [`CountAnchor::SeriesStart`] the count includes series dates before the
/// query window; cancelled dates consume a slot either way.
pub fn expand_with(
    master: &MasterEvent,
    query_start: NaiveDate,
    query_end: NaiveDate,
    options: ExpandOptions,
) -> Vec<Occurrence> {
    let Some(recurrence) = &master.recurrence else {
        debug!(master_id = %master.id, "master event has no recurrence; nothing to expand");
        return Vec::new();
    };

    let window = range::clip(&recurrence.range, query_start, query_end);
    if window.is_empty() {
        trace!(master_id = %master.id, %query_start, %query_end, "empty window after clipping");
        return Vec::new();
    }

    let limit = match recurrence.range.end {
        RangeEnd::Numbered(n) => Some(n as usize),
        RangeEnd::EndDate(_) | RangeEnd::NoEnd => None,
    };
    let scan_start = match (limit, options.count_anchor) {
        (Some(_), CountAnchor::SeriesStart) => recurrence.range.start_date,
        _ => window.start,
    };

    let exceptions = index_exceptions(master);
    let mut counted = 0usize;
    let mut occurrences = Vec::new();

    for date in DateWindow::new(scan_start, window.end).days() {
        if limit.is_some_and(|n| counted >= n) {
            break;
        }
        if !is_series_date(master, recurrence, date, options.overflow) {
            continue;
        }
        counted += 1;
        if date < window.start {
            continue;
        }

        match exceptions.get(&date) {
            Some(exception) if exception.is_cancelled => {}
            Some(exception) => occurrences.push(from_exception(master, date, exception)),
            None => occurrences.push(synthesize(master, date)),
        }
    }

    trace!(
        master_id = %master.id,
        window_start = %window.start,
        window_end = %window.end,
        series_dates = counted,
        emitted = occurrences.len(),
        "expanded series"
    );
    occurrences
}

/// Expand several series over the same window and merge the results, ordered
/// by the UTC instant of each start and then event id.
///
/// A start that cannot be resolved (unknown zone, DST gap) is ordered by its
/// local wall-clock time read as UTC.
pub fn expand_many(
    masters: &[MasterEvent],
    query_start: NaiveDate,
    query_end: NaiveDate,
) -> Vec<Occurrence> {
    let mut all: Vec<Occurrence> = masters
        .iter()
        .flat_map(|m| expand(m, query_start, query_end))
        .collect();
    all.sort_by_cached_key(|o| (start_instant(o), o.event_id.clone()));
    all
}

fn start_instant(occurrence: &Occurrence) -> NaiveDateTime {
    match occurrence.start.to_utc() {
        Ok(utc) => utc.naive_utc(),
        Err(e) => {
            debug!(
                event_id = %occurrence.event_id,
                error = %e,
                "unresolvable start; ordering by wall-clock time"
            );
            occurrence.start.date_time
        }
    }
}

fn is_series_date(
    master: &MasterEvent,
    recurrence: &Recurrence,
    date: NaiveDate,
    overflow: MonthDayOverflow,
) -> bool {
    let patterned =
        pattern::matches_with(date, &recurrence.pattern, recurrence.range.start_date, overflow);
    (patterned || master.ad_hoc_additions.contains(&date))
        && !master.ad_hoc_exclusions.contains(&date)
}

/// Key exceptions by the date they override. The first exception listed for a
/// date wins; exceptions without a usable date are dropped.
fn index_exceptions(master: &MasterEvent) -> HashMap<NaiveDate, &Exception> {
    let mut by_date = HashMap::with_capacity(master.exceptions.len());
    for exception in &master.exceptions {
        match exception.original_date() {
            Some(date) => {
                by_date.entry(date).or_insert(exception);
            }
            None => debug!(
                master_id = %master.id,
                original_start = ?exception.original_start,
                "ignoring exception without a valid original date"
            ),
        }
    }
    by_date
}

/// Build the occurrence for `date` from the master alone, keeping its time of
/// day and its day span (an overnight master stays overnight).
fn synthesize(master: &MasterEvent, date: NaiveDate) -> Occurrence {
    let span = master.end.date() - master.start.date();
    let end_date = date.checked_add_signed(span).unwrap_or(date);

    Occurrence {
        event_id: occurrence_id(&master.id, date),
        series_master_id: master.id.clone(),
        original_date: date,
        start: master.start.on_date(date),
        end: master.end.on_date(end_date),
        subject: master.subject.clone(),
        location: master.location.clone(),
        is_recurring: true,
        is_exception: false,
    }
}

/// Overlay a non-cancelled exception's overrides on the synthesized occurrence.
fn from_exception(master: &MasterEvent, date: NaiveDate, exception: &Exception) -> Occurrence {
    let Occurrence {
        event_id,
        series_master_id,
        original_date,
        start,
        end,
        subject,
        location,
        ..
    } = synthesize(master, date);

    // A one-sided time override keeps the master's duration.
    let duration = master.end.date_time - master.start.date_time;
    let (start, end) = match (&exception.start, &exception.end) {
        (Some(s), Some(e)) => (s.clone(), e.clone()),
        (Some(s), None) => {
            let end = s
                .date_time
                .checked_add_signed(duration)
                .map(|dt| EventDateTime::new(dt, s.time_zone.clone()))
                .unwrap_or(end);
            (s.clone(), end)
        }
        (None, Some(e)) => {
            let start = e
                .date_time
                .checked_sub_signed(duration)
                .map(|dt| EventDateTime::new(dt, e.time_zone.clone()))
                .unwrap_or(start);
            (start, e.clone())
        }
        (None, None) => (start, end),
    };

    Occurrence {
        event_id: exception.id.clone().unwrap_or(event_id),
        series_master_id,
        original_date,
        start,
        end,
        subject: exception.subject.clone().unwrap_or(subject),
        location: exception.location.clone().or(location),
        is_recurring: true,
        is_exception: true,
    }
}
