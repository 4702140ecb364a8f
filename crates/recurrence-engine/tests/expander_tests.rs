//! Series expansion tests: pattern enumeration, range bounds, numbered
//! counting, exception overlay and ad-hoc additions/exclusions.

use chrono::{NaiveDate, NaiveDateTime};
use recurrence_engine::model::{
    DayOfWeek, EventDateTime, Exception, MasterEvent, Occurrence, Recurrence, RecurrencePattern,
    RecurrenceRange,
};
use recurrence_engine::{clip, expand, expand_many, expand_with, CountAnchor, ExpandOptions};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dt(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

fn at(s: &str) -> EventDateTime {
    EventDateTime::parse(s, "America/New_York").unwrap()
}

/// A 09:00–09:30 master event starting on `start`.
fn series(pattern: RecurrencePattern, range: RecurrenceRange) -> MasterEvent {
    let day = range.start_date.format("%Y-%m-%d").to_string();
    MasterEvent::new(
        "evt1",
        "Team Sync",
        at(&format!("{}T09:00:00", day)),
        at(&format!("{}T09:30:00", day)),
    )
    .with_location("Room 4")
    .with_recurrence(Recurrence::new(pattern, range))
}

fn mwf() -> RecurrencePattern {
    RecurrencePattern::weekly(
        1,
        [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday],
    )
}

fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
    occurrences.iter().map(|o| o.original_date).collect()
}

// ---------------------------------------------------------------------------
// Pattern enumeration
// ---------------------------------------------------------------------------

#[test]
fn weekly_mon_wed_fri_two_weeks() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));

    assert_eq!(
        dates(&result),
        vec![
            d(2024, 1, 1),
            d(2024, 1, 3),
            d(2024, 1, 5),
            d(2024, 1, 8),
            d(2024, 1, 10),
            d(2024, 1, 12),
        ]
    );
}

#[test]
fn biweekly_tue_thu_alternating_weeks() {
    // 2026-01-06 is a Tuesday.
    let pattern = RecurrencePattern::weekly(2, [DayOfWeek::Tuesday, DayOfWeek::Thursday]);
    let master = series(pattern, RecurrenceRange::numbered(d(2026, 1, 6), 8));
    let result = expand(&master, d(2026, 1, 1), d(2026, 12, 31));

    assert_eq!(
        dates(&result),
        vec![
            d(2026, 1, 6),
            d(2026, 1, 8),
            d(2026, 1, 20),
            d(2026, 1, 22),
            d(2026, 2, 3),
            d(2026, 2, 5),
            d(2026, 2, 17),
            d(2026, 2, 19),
        ]
    );
}

#[test]
fn monthly_on_31st_has_nothing_in_february() {
    let master = series(
        RecurrencePattern::monthly(1),
        RecurrenceRange::no_end(d(2024, 1, 31)),
    );
    assert!(expand(&master, d(2024, 2, 1), d(2024, 2, 29)).is_empty());
}

#[test]
fn monthly_on_31st_over_a_year_skips_short_months() {
    let master = series(
        RecurrencePattern::monthly(1),
        RecurrenceRange::no_end(d(2024, 1, 31)),
    );
    let result = expand(&master, d(2024, 1, 1), d(2024, 12, 31));
    assert_eq!(
        dates(&result),
        vec![
            d(2024, 1, 31),
            d(2024, 3, 31),
            d(2024, 5, 31),
            d(2024, 7, 31),
            d(2024, 8, 31),
            d(2024, 10, 31),
            d(2024, 12, 31),
        ]
    );
}

#[test]
fn monthly_clamp_policy_fills_every_month() {
    let master = series(
        RecurrencePattern::monthly(1),
        RecurrenceRange::no_end(d(2024, 1, 31)),
    );
    let options = ExpandOptions {
        overflow: recurrence_engine::MonthDayOverflow::ClampToMonthEnd,
        ..ExpandOptions::default()
    };
    let result = expand_with(&master, d(2024, 1, 1), d(2024, 6, 30), options);
    assert_eq!(
        dates(&result),
        vec![
            d(2024, 1, 31),
            d(2024, 2, 29),
            d(2024, 3, 31),
            d(2024, 4, 30),
            d(2024, 5, 31),
            d(2024, 6, 30),
        ]
    );
}

#[test]
fn yearly_leap_day_series() {
    let master = series(
        RecurrencePattern::yearly(1),
        RecurrenceRange::no_end(d(2024, 2, 29)),
    );
    let result = expand(&master, d(2024, 1, 1), d(2028, 12, 31));
    assert_eq!(dates(&result), vec![d(2024, 2, 29), d(2028, 2, 29)]);
}

// ---------------------------------------------------------------------------
// Range bounds
// ---------------------------------------------------------------------------

#[test]
fn end_date_range_stops_at_end_date() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::end_date(d(2024, 1, 1), d(2024, 1, 5)),
    );
    let result = expand(&master, d(2023, 12, 1), d(2024, 1, 31));
    assert_eq!(result.len(), 5);
    assert_eq!(result.first().unwrap().original_date, d(2024, 1, 1));
    assert_eq!(result.last().unwrap().original_date, d(2024, 1, 5));
}

#[test]
fn clip_takes_later_start_and_earlier_end() {
    let range = RecurrenceRange::end_date(d(2024, 1, 10), d(2024, 2, 10));
    let window = clip(&range, d(2024, 1, 1), d(2024, 3, 1));
    assert_eq!(window.start, d(2024, 1, 10));
    assert_eq!(window.end, d(2024, 2, 10));

    let unbounded = RecurrenceRange::numbered(d(2024, 1, 10), 3);
    let window = clip(&unbounded, d(2024, 1, 15), d(2024, 3, 1));
    assert_eq!(window.start, d(2024, 1, 15));
    assert_eq!(window.end, d(2024, 3, 1));
}

#[test]
fn query_before_series_start_is_empty() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    );
    assert!(expand(&master, d(2023, 12, 1), d(2023, 12, 31)).is_empty());
}

#[test]
fn query_after_end_date_is_empty() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::end_date(d(2024, 1, 1), d(2024, 1, 5)),
    );
    let range = master.recurrence.as_ref().unwrap().range;
    assert!(clip(&range, d(2024, 2, 1), d(2024, 2, 28)).is_empty());
    assert!(expand(&master, d(2024, 2, 1), d(2024, 2, 28)).is_empty());
}

#[test]
fn inverted_query_window_is_empty() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)));
    assert!(expand(&master, d(2024, 1, 14), d(2024, 1, 1)).is_empty());
}

#[test]
fn master_without_recurrence_expands_to_nothing() {
    let master = MasterEvent::new(
        "single",
        "One-off",
        at("2024-01-01T09:00:00"),
        at("2024-01-01T10:00:00"),
    );
    assert!(expand(&master, d(2024, 1, 1), d(2024, 12, 31)).is_empty());
}

#[test]
fn malformed_pattern_expands_to_nothing() {
    let master = series(
        RecurrencePattern::weekly(1, []),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    );
    assert!(expand(&master, d(2024, 1, 1), d(2024, 3, 1)).is_empty());
}

// ---------------------------------------------------------------------------
// Numbered ranges
// ---------------------------------------------------------------------------

#[test]
fn numbered_daily_stops_after_count() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::numbered(d(2024, 1, 1), 3),
    );
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 10));
    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
}

#[test]
fn numbered_counts_from_series_start_by_default() {
    // Series is Jan 1..=5; a window starting Jan 4 only sees the last two.
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::numbered(d(2024, 1, 1), 5),
    );
    let result = expand(&master, d(2024, 1, 4), d(2024, 1, 31));
    assert_eq!(dates(&result), vec![d(2024, 1, 4), d(2024, 1, 5)]);
}

#[test]
fn numbered_query_start_anchor_restarts_count_in_window() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::numbered(d(2024, 1, 1), 5),
    );
    let options = ExpandOptions {
        count_anchor: CountAnchor::QueryStart,
        ..ExpandOptions::default()
    };
    let result = expand_with(&master, d(2024, 1, 4), d(2024, 1, 31), options);
    assert_eq!(
        dates(&result),
        vec![
            d(2024, 1, 4),
            d(2024, 1, 5),
            d(2024, 1, 6),
            d(2024, 1, 7),
            d(2024, 1, 8),
        ]
    );
}

#[test]
fn cancelled_occurrence_still_consumes_a_numbered_slot() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::numbered(d(2024, 1, 1), 3),
    )
    .with_exception(Exception::cancelled(d(2024, 1, 2)));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 10));
    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 3)]);
}

#[test]
fn excluded_date_does_not_consume_a_numbered_slot() {
    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::numbered(d(2024, 1, 1), 3),
    )
    .with_exclusion(d(2024, 1, 2));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 10));
    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 4)]);
}

// ---------------------------------------------------------------------------
// Synthesized occurrences
// ---------------------------------------------------------------------------

#[test]
fn synthesized_occurrence_copies_master_fields() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)));
    let result = expand(&master, d(2024, 1, 3), d(2024, 1, 3));
    assert_eq!(result.len(), 1);

    let occ = &result[0];
    assert_eq!(occ.event_id, "evt1-2024-01-03");
    assert_eq!(occ.series_master_id, "evt1");
    assert_eq!(occ.subject, "Team Sync");
    assert_eq!(occ.location.as_deref(), Some("Room 4"));
    assert_eq!(occ.start.date_time, dt("2024-01-03T09:00:00"));
    assert_eq!(occ.end.date_time, dt("2024-01-03T09:30:00"));
    assert_eq!(occ.start.time_zone, "America/New_York");
    assert!(occ.is_recurring);
    assert!(!occ.is_exception);
}

#[test]
fn overnight_master_keeps_its_day_span() {
    let master = MasterEvent::new(
        "night",
        "Night shift",
        at("2024-01-01T22:00:00"),
        at("2024-01-02T06:00:00"),
    )
    .with_recurrence(Recurrence::new(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    ));
    let result = expand(&master, d(2024, 1, 5), d(2024, 1, 5));
    assert_eq!(result[0].start.date_time, dt("2024-01-05T22:00:00"));
    assert_eq!(result[0].end.date_time, dt("2024-01-06T06:00:00"));
}

// ---------------------------------------------------------------------------
// Exceptions
// ---------------------------------------------------------------------------

#[test]
fn modified_exception_overrides_subject() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exception(Exception::modified(d(2024, 1, 3)).with_subject("Moved Meeting"));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));

    assert_eq!(result.len(), 6);
    let jan3: Vec<_> = result
        .iter()
        .filter(|o| o.original_date == d(2024, 1, 3))
        .collect();
    assert_eq!(jan3.len(), 1);
    assert_eq!(jan3[0].subject, "Moved Meeting");
    assert!(jan3[0].is_exception);
    // Fields the exception leaves out fall back to the master.
    assert_eq!(jan3[0].location.as_deref(), Some("Room 4"));
    assert_eq!(jan3[0].start.date_time, dt("2024-01-03T09:00:00"));

    assert_eq!(result.iter().filter(|o| o.is_exception).count(), 1);
}

#[test]
fn cancelled_exception_removes_occurrence() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exception(Exception::cancelled(d(2024, 1, 3)).with_subject("Moved Meeting"));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));

    assert_eq!(result.len(), 5);
    assert!(!dates(&result).contains(&d(2024, 1, 3)));
}

#[test]
fn exception_overrides_times_and_id() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1))).with_exception(
        Exception::modified(d(2024, 1, 5))
            .with_id("exc-42")
            .with_location("Room 9")
            .with_times(at("2024-01-06T14:00:00"), at("2024-01-06T15:00:00")),
    );
    let result = expand(&master, d(2024, 1, 5), d(2024, 1, 5));

    assert_eq!(result.len(), 1);
    let occ = &result[0];
    assert_eq!(occ.event_id, "exc-42");
    assert_eq!(occ.original_date, d(2024, 1, 5));
    assert_eq!(occ.start.date_time, dt("2024-01-06T14:00:00"));
    assert_eq!(occ.end.date_time, dt("2024-01-06T15:00:00"));
    assert_eq!(occ.subject, "Team Sync");
    assert_eq!(occ.location.as_deref(), Some("Room 9"));
}

#[test]
fn exception_keyed_by_original_start_datetime() {
    let exception = Exception {
        original_start: Some("2024-01-08T09:00:00.0000000".to_string()),
        is_cancelled: true,
        ..Exception::default()
    };
    assert_eq!(exception.original_date(), Some(d(2024, 1, 8)));

    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1))).with_exception(exception);
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));
    assert!(!dates(&result).contains(&d(2024, 1, 8)));
}

#[test]
fn exception_with_offset_datetime_truncates_without_shifting() {
    let exception = Exception {
        original_start: Some("2024-01-10T23:30:00-05:00".to_string()),
        ..Exception::default()
    };
    assert_eq!(exception.original_date(), Some(d(2024, 1, 10)));
}

#[test]
fn exception_with_minute_precision_original_start_cancels_date() {
    let exception = Exception {
        original_start: Some("2024-01-03T09:00".to_string()),
        is_cancelled: true,
        ..Exception::default()
    };
    assert_eq!(exception.original_date(), Some(d(2024, 1, 3)));

    let master = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    )
    .with_exception(exception);
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 4));
    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 4)]);
}

#[test]
fn other_iso_datetime_layouts_truncate_to_leading_date() {
    for original_start in ["2024-01-03T09:00:00+0000", "2024-01-03 09:00:00"] {
        let exception = Exception {
            original_start: Some(original_start.to_string()),
            ..Exception::default()
        };
        assert_eq!(exception.original_date(), Some(d(2024, 1, 3)), "{}", original_start);
    }
}

#[test]
fn exception_moving_only_start_keeps_master_duration() {
    let moved = Exception {
        original_start: Some("2024-01-03".to_string()),
        start: Some(at("2024-01-03T14:00:00")),
        ..Exception::default()
    };
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1))).with_exception(moved);
    let result = expand(&master, d(2024, 1, 3), d(2024, 1, 3));

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].start.date_time, dt("2024-01-03T14:00:00"));
    assert_eq!(result[0].end.date_time, dt("2024-01-03T14:30:00"));
}

#[test]
fn exception_moving_only_end_keeps_master_duration() {
    let moved = Exception {
        original_start: Some("2024-01-03".to_string()),
        end: Some(at("2024-01-03T17:00:00")),
        ..Exception::default()
    };
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1))).with_exception(moved);
    let result = expand(&master, d(2024, 1, 3), d(2024, 1, 3));

    assert_eq!(result[0].start.date_time, dt("2024-01-03T16:30:00"));
    assert_eq!(result[0].end.date_time, dt("2024-01-03T17:00:00"));
}

#[test]
fn malformed_or_missing_original_date_is_ignored() {
    let broken = Exception {
        original_start: Some("not-a-date".to_string()),
        is_cancelled: true,
        ..Exception::default()
    };
    let missing = Exception {
        is_cancelled: true,
        ..Exception::default()
    };
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exception(broken)
        .with_exception(missing);

    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));
    assert_eq!(result.len(), 6);
    assert!(result.iter().all(|o| !o.is_exception));
}

#[test]
fn exception_on_non_series_date_is_ignored() {
    // Tuesday Jan 2 is not part of a Mon/Wed/Fri series.
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exception(Exception::modified(d(2024, 1, 2)).with_subject("Ghost"));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 7));
    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 3), d(2024, 1, 5)]);
}

#[test]
fn first_exception_for_a_date_wins() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exception(Exception::modified(d(2024, 1, 3)).with_subject("First"))
        .with_exception(Exception::cancelled(d(2024, 1, 3)));
    let result = expand(&master, d(2024, 1, 3), d(2024, 1, 3));
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].subject, "First");
}

// ---------------------------------------------------------------------------
// Ad-hoc additions and exclusions
// ---------------------------------------------------------------------------

#[test]
fn ad_hoc_addition_adds_off_pattern_date() {
    let pattern = RecurrencePattern::weekly(1, [DayOfWeek::Monday]);
    let master = series(pattern, RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_addition(d(2024, 1, 4))
        // Before the series start: outside the effective window.
        .with_addition(d(2023, 12, 28));
    let result = expand(&master, d(2023, 12, 1), d(2024, 1, 14));

    assert_eq!(dates(&result), vec![d(2024, 1, 1), d(2024, 1, 4), d(2024, 1, 8)]);
    let added = &result[1];
    assert_eq!(added.event_id, "evt1-2024-01-04");
    assert_eq!(added.start.date_time, dt("2024-01-04T09:00:00"));
    assert!(!added.is_exception);
}

#[test]
fn ad_hoc_exclusion_suppresses_pattern_date() {
    let master = series(mwf(), RecurrenceRange::no_end(d(2024, 1, 1)))
        .with_exclusion(d(2024, 1, 8))
        .with_exception(Exception::modified(d(2024, 1, 8)).with_subject("Hidden"));
    let result = expand(&master, d(2024, 1, 1), d(2024, 1, 14));
    assert_eq!(result.len(), 5);
    assert!(!dates(&result).contains(&d(2024, 1, 8)));
}

// ---------------------------------------------------------------------------
// Multiple series
// ---------------------------------------------------------------------------

#[test]
fn expand_many_merges_by_start_time() {
    let morning = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    );
    let early = MasterEvent::new(
        "evt0",
        "Early",
        at("2024-01-02T07:00:00"),
        at("2024-01-02T07:30:00"),
    )
    .with_recurrence(Recurrence::new(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 2)),
    ));

    let result = expand_many(&[morning, early], d(2024, 1, 1), d(2024, 1, 2));
    let ids: Vec<&str> = result.iter().map(|o| o.event_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["evt1-2024-01-01", "evt0-2024-01-02", "evt1-2024-01-02"]
    );
}

#[test]
fn expand_many_orders_across_time_zones_by_instant() {
    // 10:00 in Berlin is 09:00 UTC; 09:00 in New York is 14:00 UTC.
    let new_york = series(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    );
    let berlin = MasterEvent::new(
        "evt2",
        "Standup",
        EventDateTime::parse("2024-01-01T10:00:00", "Europe/Berlin").unwrap(),
        EventDateTime::parse("2024-01-01T10:15:00", "Europe/Berlin").unwrap(),
    )
    .with_recurrence(Recurrence::new(
        RecurrencePattern::daily(1),
        RecurrenceRange::no_end(d(2024, 1, 1)),
    ));

    let result = expand_many(&[new_york, berlin], d(2024, 1, 1), d(2024, 1, 1));
    let ids: Vec<&str> = result.iter().map(|o| o.event_id.as_str()).collect();
    assert_eq!(ids, vec!["evt2-2024-01-01", "evt1-2024-01-01"]);
}

#[test]
fn expansion_is_repeatable() {
    let master = series(mwf(), RecurrenceRange::numbered(d(2024, 1, 1), 10))
        .with_exception(Exception::cancelled(d(2024, 1, 5)));
    let a = expand(&master, d(2024, 1, 1), d(2024, 2, 1));
    let b = expand(&master, d(2024, 1, 1), d(2024, 2, 1));
    assert_eq!(a, b);
}
