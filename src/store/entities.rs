use std::{convert::Infallible, fmt::Display, str::FromStr};

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TrackerError},
    utils::time::{span_between, DATE_FORMAT, TIME_FORMAT},
};

/// One recorded work interval. Rows of the entries file map onto this struct field by field, so
/// the field order here is the column order on disk.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TimeEntry {
    pub project: String,
    #[serde(with = "date_ser")]
    pub date: NaiveDate,
    #[serde(with = "time_ser")]
    pub start_time: NaiveTime,
    #[serde(with = "time_ser")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub note: String,
}

impl TimeEntry {
    pub fn new(
        project: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        note: impl Into<String>,
    ) -> Result<Self> {
        let entry = Self {
            project: project.into(),
            date,
            start_time,
            end_time,
            note: note.into(),
        };
        entry.check_invariants()?;
        Ok(entry)
    }

    /// Time spent on the entry. Always positive for entries that passed validation.
    pub fn duration(&self) -> Duration {
        span_between(self.start_time, self.end_time)
    }

    pub(crate) fn check_invariants(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(TrackerError::validation("project", "project name is required"));
        }
        if self.end_time <= self.start_time {
            return Err(TrackerError::validation(
                "end_time",
                format!(
                    "end time {} must be after start time {}",
                    self.end_time.format(TIME_FORMAT),
                    self.start_time.format(TIME_FORMAT)
                ),
            ));
        }
        Ok(())
    }
}

impl Display for TimeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Project: {}, Date: {}, Start Time: {}, End Time: {}",
            self.project,
            self.date.format(DATE_FORMAT),
            self.start_time.format(TIME_FORMAT),
            self.end_time.format(TIME_FORMAT),
        )?;
        if !self.note.is_empty() {
            write!(f, ", Note: {}", self.note)?;
        }
        Ok(())
    }
}

/// Raw field values as typed by the user. Nothing here is trusted until [EntryDraft::validate]
/// turns it into a [TimeEntry].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub project: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub note: String,
}

impl EntryDraft {
    pub fn new(
        project: impl Into<String>,
        date: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            date: date.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            note: note.into(),
        }
    }

    /// Checks every field in display order and reports the first one that is wrong.
    pub fn validate(&self) -> Result<TimeEntry> {
        let project = self.project.trim();
        if project.is_empty() {
            return Err(TrackerError::validation("project", "project name is required"));
        }
        let date = parse_date("date", &self.date)?;
        let start_time = parse_time("start_time", &self.start_time)?;
        let end_time = parse_time("end_time", &self.end_time)?;
        TimeEntry::new(project, date, start_time, end_time, self.note.clone())
    }
}

impl From<&TimeEntry> for EntryDraft {
    fn from(entry: &TimeEntry) -> Self {
        Self {
            project: entry.project.clone(),
            date: entry.date.format(DATE_FORMAT).to_string(),
            start_time: entry.start_time.format(TIME_FORMAT).to_string(),
            end_time: entry.end_time.format(TIME_FORMAT).to_string(),
            note: entry.note.clone(),
        }
    }
}

/// Parses a `YYYY-MM-DD` field, naming `field` in the error.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrackerError::validation(field, "date is required"));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        TrackerError::validation(field, format!("'{value}' is not a YYYY-MM-DD date: {e}"))
    })
}

/// Parses a `HH:MM:SS` field, naming `field` in the error.
pub fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrackerError::validation(field, "time is required"));
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
        TrackerError::validation(field, format!("'{value}' is not a HH:MM:SS time: {e}"))
    })
}

/// Project selection used by filters. The literal `All` selects every project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectFilter {
    #[default]
    All,
    Project(String),
}

pub const ALL_PROJECTS: &str = "All";

impl ProjectFilter {
    pub fn matches(&self, entry: &TimeEntry) -> bool {
        match self {
            ProjectFilter::All => true,
            ProjectFilter::Project(name) => entry.project == *name,
        }
    }
}

impl FromStr for ProjectFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<&str> for ProjectFilter {
    fn from(value: &str) -> Self {
        if value == ALL_PROJECTS {
            ProjectFilter::All
        } else {
            ProjectFilter::Project(value.to_string())
        }
    }
}

impl Display for ProjectFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectFilter::All => write!(f, "{ALL_PROJECTS}"),
            ProjectFilter::Project(name) => write!(f, "{name}"),
        }
    }
}

mod date_ser {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::DATE_FORMAT;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod time_ser {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::TIME_FORMAT;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use crate::error::TrackerError;

    use super::{EntryDraft, ProjectFilter, TimeEntry};

    fn field_of(result: Result<TimeEntry, TrackerError>) -> &'static str {
        match result {
            Err(TrackerError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_draft_validates_into_entry() {
        let entry = EntryDraft::new("  Alpha ", "2024-01-01", "09:00:00", "10:30:00", "kickoff")
            .validate()
            .unwrap();
        assert_eq!(entry.project, "Alpha");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(entry.duration(), Duration::minutes(90));
    }

    #[test]
    fn test_draft_names_offending_field() {
        let ok = EntryDraft::new("Alpha", "2024-01-01", "09:00:00", "10:00:00", "");
        assert_eq!(
            field_of(EntryDraft { project: " ".into(), ..ok.clone() }.validate()),
            "project"
        );
        assert_eq!(
            field_of(EntryDraft { date: "2024-13-01".into(), ..ok.clone() }.validate()),
            "date"
        );
        assert_eq!(
            field_of(EntryDraft { start_time: "9am".into(), ..ok.clone() }.validate()),
            "start_time"
        );
        assert_eq!(
            field_of(EntryDraft { end_time: "".into(), ..ok.clone() }.validate()),
            "end_time"
        );
    }

    #[test]
    fn test_end_must_be_after_start() {
        let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for end in [
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 59, 59).unwrap(),
            NaiveTime::MIN,
        ] {
            assert!(TimeEntry::new("Alpha", date, start, end, "").is_err());
        }
        assert!(TimeEntry::new("Alpha", date, start, start + Duration::seconds(1), "").is_ok());
    }

    #[test]
    fn test_draft_round_trips_entry() {
        let draft = EntryDraft::new("Alpha", "2024-01-01", "09:00:00", "10:30:00", "a, \"b\"");
        let entry = draft.validate().unwrap();
        assert_eq!(EntryDraft::from(&entry), draft);
    }

    #[test]
    fn test_project_filter_sentinel() {
        assert_eq!(ProjectFilter::from("All"), ProjectFilter::All);
        assert_eq!(
            ProjectFilter::from("Beta"),
            ProjectFilter::Project("Beta".into())
        );
        assert_eq!(ProjectFilter::All.to_string(), "All");
    }
}
