//! Range clipping: intersect a recurrence range with a caller's query window.

use chrono::NaiveDate;

use crate::model::{RangeEnd, RecurrenceRange};

/// An inclusive window of calendar dates. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the window, ascending. Yields nothing when empty.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Clip the query window `[query_start, query_end]` to `range`.
///
/// The start is the later of the query start and the range start. Only
/// `EndDate` ranges bound the end; `Numbered` ranges are capped by count
/// during expansion instead.
pub fn clip(range: &RecurrenceRange, query_start: NaiveDate, query_end: NaiveDate) -> DateWindow {
    let start = query_start.max(range.start_date);
    let end = match range.end {
        RangeEnd::EndDate(end_date) => query_end.min(end_date),
        RangeEnd::Numbered(_) | RangeEnd::NoEnd => query_end,
    };
    DateWindow { start, end }
}
