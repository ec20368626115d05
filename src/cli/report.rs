use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    config::AppConfig,
    report::ReportEngine,
    store::{
        entities::{ProjectFilter, TimeEntry},
        entry_store::EntryStore,
        totals::ProjectTotals,
    },
};

pub fn report(
    config: &AppConfig,
    store: &EntryStore,
    from: NaiveDate,
    to: NaiveDate,
    project: &ProjectFilter,
    json: bool,
) -> Result<()> {
    let engine = ReportEngine::new(config.export_path());
    let report = engine.build_report(store, from, to, project)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.entries.is_empty() {
        println!("No entries between {from} and {to}");
    } else {
        print!("{report}");
    }
    Ok(())
}

/// Exports everything when no range is given, otherwise the same selection `report` would show.
pub async fn export(
    config: &AppConfig,
    store: &EntryStore,
    project: &ProjectFilter,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<()> {
    let engine = ReportEngine::new(config.export_path());
    let (entries, totals): (Vec<TimeEntry>, ProjectTotals) = match range {
        Some((from, to)) => {
            let report = engine.build_report(store, from, to, project)?;
            (report.entries, report.totals)
        }
        None => {
            let entries = store
                .filter_by_project(project)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            let totals = ProjectTotals::from_entries(&entries);
            (entries, totals)
        }
    };
    let path = engine.export(&entries, &totals).await?;
    println!("Entries exported to {} successfully", path.display());
    Ok(())
}
