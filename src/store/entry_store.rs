use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use clap::ValueEnum;
use tracing::{debug, info, instrument};

use crate::{
    error::{Result, TrackerError},
    fs::operations::{read_locked, write_atomic},
};

use super::{
    entities::{EntryDraft, ProjectFilter, TimeEntry, ALL_PROJECTS},
    filters::{self, DateRange},
    totals::ProjectTotals,
};

/// Orderings that can be applied to the collection.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortCriterion {
    /// Project name, ascending.
    Project,
    /// Calendar date, oldest first.
    Date,
    /// Project aggregate, largest first.
    TotalTime,
}

/// Owns every time entry and the file they live in. Each mutation is written to disk before it
/// becomes visible in memory, so the collection never holds changes the file is missing.
pub struct EntryStore {
    path: PathBuf,
    entries: Vec<TimeEntry>,
    totals: ProjectTotals,
}

impl EntryStore {
    /// Creates an empty store bound to `path`. Nothing is read until [EntryStore::load].
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: Vec::new(),
            totals: ProjectTotals::default(),
        }
    }

    /// Creates a store and loads the current contents of `path`.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let mut store = Self::new(path);
        store.load().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TimeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the collection with the file contents. A missing file is an empty collection.
    /// A single corrupt row rejects the whole file and leaves the current collection untouched,
    /// since the next save would otherwise drop the rows that failed to parse.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub async fn load(&mut self) -> Result<()> {
        let entries = match read_locked(&self.path).await? {
            Some(contents) => parse_entries(&contents)?,
            None => {
                debug!("Entries file doesn't exist yet, starting empty");
                Vec::new()
            }
        };
        debug!("Loaded {} entries", entries.len());
        self.entries = entries;
        self.recompute();
        Ok(())
    }

    /// Writes the whole collection, replacing the file atomically.
    pub async fn save(&self) -> Result<()> {
        let contents = serialize_entries(&self.entries)?;
        write_atomic(&self.path, &contents).await?;
        Ok(())
    }

    /// Validates and appends a new entry, returning its index.
    pub async fn add(&mut self, draft: &EntryDraft) -> Result<usize> {
        let entry = draft.validate()?;
        info!("Adding entry {entry}");
        let mut entries = self.entries.clone();
        entries.push(entry);
        self.commit(entries).await?;
        Ok(self.entries.len() - 1)
    }

    /// Validates `draft` and puts it in place of the entry at `index`.
    pub async fn update(&mut self, index: usize, draft: &EntryDraft) -> Result<()> {
        self.check_index(index)?;
        let entry = draft.validate()?;
        info!("Replacing entry {index} with {entry}");
        let mut entries = self.entries.clone();
        entries[index] = entry;
        self.commit(entries).await
    }

    /// Removes and returns the entry at `index`.
    pub async fn delete(&mut self, index: usize) -> Result<TimeEntry> {
        self.check_index(index)?;
        let mut entries = self.entries.clone();
        let removed = entries.remove(index);
        info!("Deleting entry {index}: {removed}");
        self.commit(entries).await?;
        Ok(removed)
    }

    /// Entries of one project, or every entry for [ProjectFilter::All].
    pub fn filter_by_project(&self, filter: &ProjectFilter) -> Vec<&TimeEntry> {
        filters::filter_by_project(&self.entries, filter)
    }

    /// Entries dated within `start..=end`.
    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<&TimeEntry>> {
        let range = DateRange::new(start, end)?;
        Ok(filters::filter_by_date_range(&self.entries, range))
    }

    /// Reorders the collection and persists the new order. Sorting is stable, so entries that
    /// compare equal keep their relative order.
    pub async fn sort(&mut self, criterion: SortCriterion) -> Result<()> {
        let mut entries = self.entries.clone();
        match criterion {
            SortCriterion::Project => entries.sort_by(|a, b| a.project.cmp(&b.project)),
            SortCriterion::Date => entries.sort_by_key(|v| v.date),
            SortCriterion::TotalTime => {
                let totals = &self.totals;
                entries.sort_by(|a, b| {
                    totals
                        .get(&b.project)
                        .cmp(&totals.get(&a.project))
                        .then_with(|| a.project.cmp(&b.project))
                })
            }
        }
        info!("Sorting entries by {criterion:?}");
        self.commit(entries).await
    }

    pub fn project_totals(&self) -> &ProjectTotals {
        &self.totals
    }

    /// Values offered by a project filter: the `All` sentinel followed by every known project.
    pub fn project_choices(&self) -> Vec<String> {
        let projects = self
            .entries
            .iter()
            .map(|v| v.project.as_str())
            .collect::<BTreeSet<_>>();
        std::iter::once(ALL_PROJECTS)
            .chain(projects)
            .map(String::from)
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(TrackerError::Index {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Persists `entries` and only then makes them the current collection.
    async fn commit(&mut self, entries: Vec<TimeEntry>) -> Result<()> {
        let contents = serialize_entries(&entries)?;
        write_atomic(&self.path, &contents).await?;
        self.entries = entries;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.totals = ProjectTotals::from_entries(&self.entries);
    }
}

/// Encodes entries as headerless CSV rows `project,date,start_time,end_time,note`.
pub fn serialize_entries(entries: &[TimeEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for entry in entries {
        writer.serialize(entry).map_err(std::io::Error::from)?;
    }
    writer
        .into_inner()
        .map_err(|e| TrackerError::Io(e.into_error()))
}

/// A row without a note has four fields.
const MIN_FIELDS: usize = 4;
const MAX_FIELDS: usize = 5;

/// Decodes the entries file. Row numbers in errors are 1-based record numbers.
pub fn parse_entries(contents: &[u8]) -> Result<Vec<TimeEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents);

    let mut entries = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let row = row + 1;
        let record = record.map_err(|e| TrackerError::Parse {
            row,
            reason: e.to_string(),
        })?;
        if !(MIN_FIELDS..=MAX_FIELDS).contains(&record.len()) {
            return Err(TrackerError::Parse {
                row,
                reason: format!(
                    "expected {MIN_FIELDS} or {MAX_FIELDS} fields, found {}",
                    record.len()
                ),
            });
        }
        let entry = record
            .deserialize::<TimeEntry>(None)
            .map_err(|e| TrackerError::Parse {
                row,
                reason: e.to_string(),
            })?;
        entry.check_invariants().map_err(|e| TrackerError::Parse {
            row,
            reason: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
