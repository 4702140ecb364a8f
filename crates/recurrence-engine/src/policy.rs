//! Expansion policies for edge cases where more than one behavior is defensible.

/// How Monthly and Yearly patterns treat an anchor day the candidate month lacks
/// (day 31 in a 30-day month, Feb 29 in a common year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthDayOverflow {
    /// No occurrence that month (or year).
    #[default]
    Skip,
    /// Occur on the last day of the month instead.
    ClampToMonthEnd,
}

/// Where the occurrence ceiling of a `Numbered` range starts counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountAnchor {
    /// Count from the series start date, so occurrences before the query
    /// window still consume slots.
    #[default]
    SeriesStart,
    /// Count from the later of the query start and the series start.
    QueryStart,
}

/// Options for [`crate::expander::expand_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpandOptions {
    pub overflow: MonthDayOverflow,
    pub count_anchor: CountAnchor,
}
