use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{
    error::{Result, TrackerError},
    store::{
        entities::{EntryDraft, TimeEntry},
        entry_store::EntryStore,
    },
    utils::clock::Clock,
};

use super::{
    reminder::{
        ReminderAlarm, ReminderInterval, ReminderObserver, ReminderScheduler,
        DEFAULT_REMINDER_INTERVAL,
    },
    session::TimerSession,
};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Input accepted by a running tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackCommand {
    /// Stop the timer and record the entry.
    Stop,
    /// Stop the timer and throw the interval away.
    Discard,
}

#[derive(Debug)]
pub enum TrackOutcome {
    Recorded { index: usize, entry: TimeEntry },
    Discarded,
    /// The store refused the interval. `draft` holds the captured fields so they can be fixed
    /// and entered again.
    Rejected { draft: EntryDraft, error: TrackerError },
}

/// Drives one live tracking session: the timer, its reminders and the status refresh all run on
/// the loop in [Tracker::run], which is also the only place that touches the timer and the store.
pub struct Tracker {
    clock: Arc<dyn Clock>,
    timer: TimerSession,
    reminders: ReminderScheduler,
    alarms: mpsc::Receiver<ReminderAlarm>,
    reminder_interval: Option<ReminderInterval>,
    observer: Box<dyn ReminderObserver + Send>,
    refresh_interval: Duration,
}

impl Tracker {
    pub fn new(
        clock: Arc<dyn Clock>,
        reminder_interval: Option<ReminderInterval>,
        observer: Box<dyn ReminderObserver + Send>,
    ) -> Self {
        let (reminders, alarms) = ReminderScheduler::new(
            clock.clone(),
            reminder_interval.unwrap_or(DEFAULT_REMINDER_INTERVAL),
        );
        Self {
            timer: TimerSession::new(clock.clone()),
            clock,
            reminders,
            alarms,
            reminder_interval,
            observer,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(self, refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            ..self
        }
    }

    /// Runs the timer for `project` until a command arrives, the command channel closes or
    /// `shutdown` fires. Everything but [TrackCommand::Discard] records the interval in `store`.
    /// An interval the store refuses comes back as [TrackOutcome::Rejected] instead of an error.
    #[instrument(skip_all, fields(project = %project))]
    pub async fn run(
        mut self,
        store: &mut EntryStore,
        project: &str,
        note: &str,
        mut commands: mpsc::Receiver<TrackCommand>,
        shutdown: CancellationToken,
        mut display: impl FnMut(&str),
    ) -> Result<TrackOutcome> {
        if project.trim().is_empty() {
            return Err(TrackerError::validation("project", "project name is required"));
        }

        self.timer.start();
        if let Some(interval) = self.reminder_interval {
            self.reminders.start(interval);
        }

        let mut refresh_point = self.clock.instant();
        let command = loop {
            refresh_point += self.refresh_interval;

            tokio::select! {
                _ = shutdown.cancelled() => {
                    break TrackCommand::Stop;
                }
                command = commands.recv() => {
                    break command.unwrap_or(TrackCommand::Stop);
                }
                Some(alarm) = self.alarms.recv() => {
                    self.reminders.dispatch(alarm, &self.timer, self.observer.as_mut());
                    refresh_point -= self.refresh_interval;
                }
                _ = self.clock.sleep_until(refresh_point) => {
                    display(&self.timer.status_line());
                }
            }
        };

        self.reminders.stop();
        let Some(stop) = self.timer.stop() else {
            warn!("Timer was not running when tracking ended");
            return Ok(TrackOutcome::Discarded);
        };

        match command {
            TrackCommand::Discard => {
                info!("Discarding tracked interval");
                Ok(TrackOutcome::Discarded)
            }
            TrackCommand::Stop => {
                let draft = stop.to_draft(project, note);
                let index = match store.add(&draft).await {
                    Ok(index) => index,
                    Err(error) => {
                        warn!("Tracked interval was not recorded {error}");
                        return Ok(TrackOutcome::Rejected { draft, error });
                    }
                };
                let entry = store
                    .get(index)
                    .cloned()
                    .ok_or(TrackerError::Index {
                        index,
                        len: store.len(),
                    })?;
                info!("Recorded tracked entry {entry}");
                Ok(TrackOutcome::Recorded { index, entry })
            }
        }
    }
}
