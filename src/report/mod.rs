//! Reports over a slice of the entries. [ReportEngine::build_report] produces the textual
//! summary, [ReportEngine::export] the PDF document.

pub mod export;

use std::{fmt::Display, path::PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::{
    error::Result,
    fs::operations::write_atomic,
    store::{
        entities::{ProjectFilter, TimeEntry},
        entry_store::EntryStore,
        filters::{filter_by_date_range, filter_by_project, DateRange},
        totals::ProjectTotals,
    },
    utils::time::format_hours_minutes,
};

/// Entries selected for a report together with totals computed over those entries only.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub range: DateRange,
    pub project: String,
    pub entries: Vec<TimeEntry>,
    pub totals: ProjectTotals,
}

impl Report {
    /// One `<project>: <H>h <M>m` line per project, in project name order.
    pub fn summary_lines(&self) -> Vec<String> {
        summary_lines(&self.totals)
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.summary_lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

pub fn summary_lines(totals: &ProjectTotals) -> Vec<String> {
    totals
        .iter()
        .map(|(project, duration)| format!("{project}: {}", format_hours_minutes(*duration)))
        .collect()
}

pub struct ReportEngine {
    export_path: PathBuf,
}

impl ReportEngine {
    /// `export_path` is the fixed location every export overwrites.
    pub fn new(export_path: PathBuf) -> Self {
        Self { export_path }
    }

    /// Selects the entries of `store` dated within `start..=end` that match `project`.
    pub fn build_report(
        &self,
        store: &EntryStore,
        start: NaiveDate,
        end: NaiveDate,
        project: &ProjectFilter,
    ) -> Result<Report> {
        let range = DateRange::new(start, end)?;
        let entries = filter_by_project(filter_by_date_range(store.entries(), range), project)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let totals = ProjectTotals::from_entries(&entries);
        Ok(Report {
            range,
            project: project.to_string(),
            entries,
            totals,
        })
    }

    /// Renders the PDF and replaces whatever is at the export path.
    pub async fn export(&self, entries: &[TimeEntry], totals: &ProjectTotals) -> Result<PathBuf> {
        let document = export::render_pdf(entries, totals)?;
        write_atomic(&self.export_path, &document).await?;
        info!(
            "Exported {} entries to {:?}",
            entries.len(),
            self.export_path
        );
        Ok(self.export_path.clone())
    }
}
