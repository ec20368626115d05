use std::{io::Write, sync::Arc};

use ansi_term::Colour;
use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    config::AppConfig,
    store::{entities::EntryDraft, entry_store::EntryStore},
    tracking::{
        reminder::{Reminder, ReminderInterval, ReminderObserver},
        tracker::{TrackCommand, TrackOutcome, Tracker},
    },
    utils::clock::DefaultClock,
};

use super::shutdown::detect_shutdown;

/// Prints reminders to the terminal.
struct ConsoleNotifier;

impl ReminderObserver for ConsoleNotifier {
    fn notify(&mut self, reminder: Reminder) {
        let colour = match reminder {
            Reminder::StartTimer => Colour::Yellow,
            Reminder::StopTimer => Colour::Cyan,
        };
        println!("\x07\n{}", colour.bold().paint(reminder.to_string()));
    }
}

pub async fn track(
    config: &AppConfig,
    store: &mut EntryStore,
    project: String,
    note: String,
    remind: Option<u32>,
) -> Result<()> {
    let interval = remind
        .map(ReminderInterval::from_minutes)
        .transpose()?
        .unwrap_or(config.reminder_interval);

    let tracker = Tracker::new(Arc::new(DefaultClock), Some(interval), Box::new(ConsoleNotifier));

    let shutdown = CancellationToken::new();
    let (sender, commands) = mpsc::channel(1);
    tokio::spawn(read_commands(sender));
    tokio::spawn(detect_shutdown(shutdown.clone()));

    println!(
        "Tracking {project}. Press Enter to stop and record, type 'd' and Enter to discard. Reminders every {} minutes.",
        interval.minutes()
    );

    let outcome = tracker
        .run(store, &project, &note, commands, shutdown.clone(), |status| {
            print!("\r{status}");
            let _ = std::io::stdout().flush();
        })
        .await;
    shutdown.cancel();
    println!();

    match outcome? {
        TrackOutcome::Recorded { index, entry } => println!("{index:>4}  {entry}"),
        TrackOutcome::Discarded => println!("Discarded"),
        TrackOutcome::Rejected { draft, error } => {
            println!("The tracked interval was not recorded. Fix the fields and record it with:");
            println!("{}", add_command(&draft));
            return Err(error.into());
        }
    }
    Ok(())
}

/// Renders the `add` invocation that records `draft`.
fn add_command(draft: &EntryDraft) -> String {
    let mut command = format!(
        "llamatime add --project {:?} --date {} --start {} --end {}",
        draft.project, draft.date, draft.start_time, draft.end_time
    );
    if !draft.note.is_empty() {
        command.push_str(&format!(" --note {:?}", draft.note));
    }
    command
}

/// Forwards stdin lines as tracker commands until one is sent or stdin closes.
async fn read_commands(sender: mpsc::Sender<TrackCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let command = match lines.next_line().await {
        Ok(Some(line)) if matches!(line.trim(), "d" | "discard") => TrackCommand::Discard,
        Ok(_) => TrackCommand::Stop,
        Err(e) => {
            error!("Failed to read from stdin {e:?}");
            TrackCommand::Stop
        }
    };
    let _ = sender.send(command).await;
}
