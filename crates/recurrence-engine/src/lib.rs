//! # recurrence-engine
//!
//! Recurring-event computation for calendar series.
//!
//! Given a master event (pattern, range, exceptions and ad-hoc date edits), the
//! engine decides which calendar dates the series occurs on and expands it into
//! concrete occurrences inside a query window. It is a pure, synchronous
//! library: no I/O, no shared state, safe to call from any thread.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use recurrence_engine::model::{
//!     DayOfWeek, EventDateTime, MasterEvent, Recurrence, RecurrencePattern, RecurrenceRange,
//! };
//! use recurrence_engine::expand;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let master = MasterEvent::new(
//!     "standup",
//!     "Standup",
//!     EventDateTime::parse("2024-01-01T09:00:00", "UTC").unwrap(),
//!     EventDateTime::parse("2024-01-01T09:15:00", "UTC").unwrap(),
//! )
//! .with_recurrence(Recurrence::new(
//!     RecurrencePattern::weekly(1, [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]),
//!     RecurrenceRange::no_end(day(1)),
//! ));
//!
//! let dates: Vec<_> = expand(&master, day(1), day(14))
//!     .iter()
//!     .map(|o| o.original_date)
//!     .collect();
//! assert_eq!(dates, vec![day(1), day(3), day(5), day(8), day(10), day(12)]);
//! ```
//!
//! ## Modules
//!
//! - [`model`]: patterns, ranges, exceptions, master events, occurrences
//! - [`pattern`]: does a date satisfy a pattern?
//! - [`range`]: clip a recurrence range to a query window
//! - [`expander`]: master event → occurrences, with exception overlay
//! - [`summary`]: human-readable recurrence text
//! - [`wire`]: mapping to and from the calendar API's recurrence object
//! - [`policy`]: month-end overflow and occurrence-count anchoring
//! - [`error`]: error types for the fallible boundary operations

pub mod error;
pub mod expander;
pub mod model;
pub mod pattern;
pub mod policy;
pub mod range;
pub mod summary;
pub mod wire;

pub use error::RecurrenceError;
pub use expander::{expand, expand_many, expand_with};
pub use model::{
    DayOfWeek, EventDateTime, Exception, MasterEvent, Occurrence, RangeEnd, Recurrence,
    RecurrencePattern, RecurrenceRange,
};
pub use pattern::{matches, matches_with};
pub use policy::{CountAnchor, ExpandOptions, MonthDayOverflow};
pub use range::{clip, DateWindow};
pub use summary::{format_enhanced, EnhancedSummary};
pub use wire::{from_wire, to_wire, WireRecurrence};
