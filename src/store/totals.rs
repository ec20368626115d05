use std::collections::{btree_map, BTreeMap};

use chrono::Duration;
use serde::Serialize;

use super::entities::TimeEntry;

/// Accumulated time per project. Always derived from a set of entries, never stored. Iteration
/// goes in project name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectTotals {
    totals: BTreeMap<String, Duration>,
}

impl ProjectTotals {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> Self {
        let mut totals = BTreeMap::<String, Duration>::new();
        for entry in entries {
            *totals
                .entry(entry.project.clone())
                .or_insert_with(Duration::zero) += entry.duration();
        }
        Self { totals }
    }

    /// Total of a project, zero for projects without entries.
    pub fn get(&self, project: &str) -> Duration {
        self.totals.get(project).copied().unwrap_or_else(Duration::zero)
    }

    pub fn contains(&self, project: &str) -> bool {
        self.totals.contains_key(project)
    }

    /// Sum over every project.
    pub fn total(&self) -> Duration {
        self.totals.values().fold(Duration::zero(), |acc, v| acc + *v)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Duration> {
        self.totals.iter()
    }

    /// Projects ordered by descending total, ties by name.
    pub fn ranked(&self) -> Vec<(&str, Duration)> {
        let mut ranked = self
            .totals
            .iter()
            .map(|(project, duration)| (project.as_str(), *duration))
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

impl<'a> IntoIterator for &'a ProjectTotals {
    type Item = (&'a String, &'a Duration);
    type IntoIter = btree_map::Iter<'a, String, Duration>;

    fn into_iter(self) -> Self::IntoIter {
        self.totals.iter()
    }
}

impl Serialize for ProjectTotals {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(
            self.totals
                .iter()
                .map(|(project, duration)| (project, duration.num_seconds())),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveTime};

    use crate::store::entities::TimeEntry;

    use super::ProjectTotals;

    fn entry(project: &str, start: (u32, u32), end: (u32, u32)) -> TimeEntry {
        TimeEntry::new(
            project,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            "",
        )
        .unwrap()
    }

    #[test]
    fn test_totals_sum_per_project() {
        let entries = [
            entry("Alpha", (9, 0), (10, 30)),
            entry("Beta", (11, 0), (11, 20)),
            entry("Alpha", (13, 0), (13, 15)),
        ];
        let totals = ProjectTotals::from_entries(&entries);

        assert_eq!(totals.get("Alpha"), Duration::minutes(105));
        assert_eq!(totals.get("Beta"), Duration::minutes(20));
        assert_eq!(totals.get("Gamma"), Duration::zero());
        assert!(!totals.contains("Gamma"));
        assert_eq!(totals.total(), Duration::minutes(125));
        assert_eq!(
            totals.ranked(),
            vec![("Alpha", Duration::minutes(105)), ("Beta", Duration::minutes(20))]
        );
    }

    #[test]
    fn test_totals_empty() {
        let totals = ProjectTotals::from_entries(&Vec::<TimeEntry>::new());
        assert!(totals.is_empty());
        assert_eq!(totals.total(), Duration::zero());
    }

    #[test]
    fn test_totals_serialize_as_seconds() {
        let totals = ProjectTotals::from_entries(&[entry("Alpha", (9, 0), (9, 1))]);
        assert_eq!(serde_json::to_string(&totals).unwrap(), r#"{"Alpha":60}"#);
    }
}
