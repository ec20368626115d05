use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{Result, TrackerError},
    utils::time::DATE_FORMAT,
};

use super::entities::{ProjectFilter, TimeEntry};

/// Inclusive range of calendar dates. Construction rejects inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(TrackerError::validation(
                "end_date",
                format!(
                    "end date {} must not be before start date {}",
                    end.format(DATE_FORMAT),
                    start.format(DATE_FORMAT)
                ),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn filter_by_project<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    filter: &ProjectFilter,
) -> Vec<&'a TimeEntry> {
    entries.into_iter().filter(|v| filter.matches(v)).collect()
}

pub fn filter_by_date_range<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    range: DateRange,
) -> Vec<&'a TimeEntry> {
    entries
        .into_iter()
        .filter(|v| range.contains(v.date))
        .collect()
}
