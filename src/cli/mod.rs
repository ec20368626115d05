pub mod entries;
pub mod report;
pub mod shutdown;
pub mod track;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    config::AppConfig,
    store::{
        entities::{parse_date, ProjectFilter},
        entry_store::{EntryStore, SortCriterion},
    },
    utils::logging::enable_logging,
};

#[derive(Parser, Debug)]
#[command(name = "Llama Time", version, long_about = None)]
#[command(about = "Track time spent on projects", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Data directory. By default uses $XDG_STATE_HOME/llamatime or $HOME/.local/state/llamatime"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record a finished interval")]
    Add {
        #[arg(short, long)]
        project: String,
        #[arg(short, long, help = "Date as YYYY-MM-DD. Defaults to today")]
        date: Option<String>,
        #[arg(short, long, help = "Start time as HH:MM:SS")]
        start: String,
        #[arg(short, long, help = "End time as HH:MM:SS")]
        end: String,
        #[arg(short, long, default_value = "")]
        note: String,
    },
    #[command(about = "Change an entry. Omitted fields keep their current value")]
    Edit {
        #[arg(help = "Index shown by `list`")]
        index: usize,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        end: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    #[command(about = "Remove an entry")]
    Delete {
        #[arg(help = "Index shown by `list`")]
        index: usize,
    },
    #[command(about = "List entries, optionally filtered")]
    List {
        #[arg(short, long, default_value = "All", help = "Project name or All")]
        project: ProjectFilter,
        #[command(flatten)]
        range: RangeArgs,
    },
    #[command(about = "Show total time per project")]
    Totals {},
    #[command(about = "Show the known projects")]
    Projects {},
    #[command(about = "Reorder entries and save the new order")]
    Sort {
        #[arg(value_enum)]
        criterion: SortCriterion,
    },
    #[command(about = "Summarize time per project over a date range")]
    Report {
        #[arg(long, value_parser = parse_date_arg)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date_arg)]
        to: NaiveDate,
        #[arg(short, long, default_value = "All", help = "Project name or All")]
        project: ProjectFilter,
        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },
    #[command(about = "Export entries and totals to a PDF document")]
    Export {
        #[arg(short, long, default_value = "All", help = "Project name or All")]
        project: ProjectFilter,
        #[command(flatten)]
        range: RangeArgs,
    },
    #[command(about = "Run a live timer and record the interval when it stops")]
    Track {
        #[arg(short, long)]
        project: String,
        #[arg(short, long, default_value = "")]
        note: String,
        #[arg(long, help = "Remind every N minutes (1-120)")]
        remind: Option<u32>,
    },
    #[command(about = "Copy the entries file to the backup location")]
    Backup {},
    #[command(about = "Replace the entries file with the backup")]
    Restore {},
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct RangeArgs {
    #[arg(long, value_parser = parse_date_arg, requires = "to", help = "First day, YYYY-MM-DD")]
    from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg, requires = "from", help = "Last day, YYYY-MM-DD")]
    to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.from.zip(self.to)
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date("date", value).map_err(|e| e.to_string())
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::resolve(args.dir)?;
    let logging_level = if args.log {
        Some(args.log_filter.unwrap_or(LevelFilter::TRACE))
    } else {
        args.log_filter
    };
    enable_logging(&config.log_dir(), logging_level, args.log)?;

    let mut store = EntryStore::open(config.entries_path())
        .await
        .with_context(|| format!("Failed to load {:?}", config.entries_path()))?;

    match args.commands {
        Commands::Add {
            project,
            date,
            start,
            end,
            note,
        } => entries::add(&mut store, project, date, start, end, note).await,
        Commands::Edit {
            index,
            project,
            date,
            start,
            end,
            note,
        } => {
            let changes = entries::EntryChanges {
                project,
                date,
                start,
                end,
                note,
            };
            entries::edit(&mut store, index, changes).await
        }
        Commands::Delete { index } => entries::delete(&mut store, index).await,
        Commands::List { project, range } => entries::list(&store, &project, range.bounds()),
        Commands::Totals {} => {
            entries::totals(&store);
            Ok(())
        }
        Commands::Projects {} => {
            for project in store.project_choices() {
                println!("{project}");
            }
            Ok(())
        }
        Commands::Sort { criterion } => entries::sort(&mut store, criterion).await,
        Commands::Report {
            from,
            to,
            project,
            json,
        } => report::report(&config, &store, from, to, &project, json),
        Commands::Export { project, range } => {
            report::export(&config, &store, &project, range.bounds()).await
        }
        Commands::Track {
            project,
            note,
            remind,
        } => track::track(&config, &mut store, project, note, remind).await,
        Commands::Backup {} => entries::backup(&config, &store).await,
        Commands::Restore {} => entries::restore(&config, &mut store).await,
    }
}
