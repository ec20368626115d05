use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use crate::{
    config::AppConfig,
    report::summary_lines,
    store::{
        backup as entry_backup,
        entities::{EntryDraft, ProjectFilter},
        entry_store::{EntryStore, SortCriterion},
        filters::DateRange,
    },
    utils::time::{format_hours_minutes, DATE_FORMAT},
};

/// Fields given to `edit`. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct EntryChanges {
    pub project: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub note: Option<String>,
}

impl EntryChanges {
    fn apply(self, current: EntryDraft) -> EntryDraft {
        EntryDraft {
            project: self.project.unwrap_or(current.project),
            date: self.date.unwrap_or(current.date),
            start_time: self.start.unwrap_or(current.start_time),
            end_time: self.end.unwrap_or(current.end_time),
            note: self.note.unwrap_or(current.note),
        }
    }
}

pub async fn add(
    store: &mut EntryStore,
    project: String,
    date: Option<String>,
    start: String,
    end: String,
    note: String,
) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().format(DATE_FORMAT).to_string());
    let draft = EntryDraft::new(project, date, start, end, note);
    let index = store.add(&draft).await?;
    if let Some(entry) = store.get(index) {
        println!("{index:>4}  {entry}");
    }
    Ok(())
}

pub async fn edit(store: &mut EntryStore, index: usize, changes: EntryChanges) -> Result<()> {
    let current = store
        .get(index)
        .map(EntryDraft::from)
        .with_context(|| format!("Entry {index} does not exist, there are {} entries", store.len()))?;
    store.update(index, &changes.apply(current)).await?;
    if let Some(entry) = store.get(index) {
        println!("{index:>4}  {entry}");
    }
    Ok(())
}

pub async fn delete(store: &mut EntryStore, index: usize) -> Result<()> {
    let removed = store.delete(index).await?;
    println!("Deleted {removed}");
    Ok(())
}

/// Prints matching entries with the index `edit` and `delete` expect.
pub fn list(
    store: &EntryStore,
    project: &ProjectFilter,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<()> {
    let range = range
        .map(|(from, to)| DateRange::new(from, to))
        .transpose()?;
    for (index, entry) in store.entries().iter().enumerate() {
        if !project.matches(entry) {
            continue;
        }
        if range.is_some_and(|range| !range.contains(entry.date)) {
            continue;
        }
        println!("{index:>4}  {entry}");
    }
    Ok(())
}

pub fn totals(store: &EntryStore) {
    for line in summary_lines(store.project_totals()) {
        println!("{line}");
    }
    println!(
        "All projects: {}",
        format_hours_minutes(store.project_totals().total())
    );
}

pub async fn sort(store: &mut EntryStore, criterion: SortCriterion) -> Result<()> {
    store.sort(criterion).await?;
    list(store, &ProjectFilter::All, None)
}

pub async fn backup(config: &AppConfig, store: &EntryStore) -> Result<()> {
    entry_backup::backup(store, &config.backup_path()).await?;
    println!("Backed up to {}", config.backup_path().display());
    Ok(())
}

pub async fn restore(config: &AppConfig, store: &mut EntryStore) -> Result<()> {
    entry_backup::restore(store, &config.backup_path()).await?;
    println!(
        "Restored {} entries from {}",
        store.len(),
        config.backup_path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::store::entities::EntryDraft;

    use super::EntryChanges;

    #[test]
    fn test_changes_keep_unset_fields() {
        let current = EntryDraft::new("Alpha", "2024-01-01", "09:00:00", "10:00:00", "note");
        let changes = EntryChanges {
            end: Some("11:00:00".into()),
            note: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(
            changes.apply(current),
            EntryDraft::new("Alpha", "2024-01-01", "09:00:00", "11:00:00", "")
        );
    }
}
