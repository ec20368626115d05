use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::{
    store::entities::EntryDraft,
    utils::{
        clock::Clock,
        time::{format_clock, DATE_FORMAT, TIME_FORMAT},
    },
};

#[derive(Debug, Clone, Copy)]
enum TimerState {
    Idle,
    Running {
        since: Instant,
        started_at: DateTime<Local>,
    },
}

/// Result of stopping a running timer. Carries the wall-clock bounds needed to record an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStop {
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl TimerStop {
    /// Builds the raw fields of an entry covering the stopped interval. The date is the one the
    /// timer was started on.
    pub fn to_draft(&self, project: &str, note: &str) -> EntryDraft {
        EntryDraft::new(
            project,
            self.started_at.format(DATE_FORMAT).to_string(),
            self.started_at.format(TIME_FORMAT).to_string(),
            self.stopped_at.format(TIME_FORMAT).to_string(),
            note,
        )
    }
}

/// Start/stop state machine of the live timer. Elapsed time is always derived from the instant
/// the timer was started, so it stays correct no matter how often it's polled.
pub struct TimerSession {
    clock: Arc<dyn Clock>,
    state: TimerState,
    accumulated: Duration,
}

impl TimerSession {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: TimerState::Idle,
            accumulated: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Starts a fresh session. Returns `false` without touching anything if already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            debug!("Timer is already running");
            return false;
        }
        let started_at = self.clock.time();
        self.state = TimerState::Running {
            since: self.clock.instant(),
            started_at,
        };
        self.accumulated = Duration::ZERO;
        info!("Timer started at {started_at}");
        true
    }

    /// Stops the timer. Stopping an idle timer is a no-op and returns `None`.
    pub fn stop(&mut self) -> Option<TimerStop> {
        let TimerState::Running { since, started_at } = self.state else {
            debug!("Timer isn't running, nothing to stop");
            return None;
        };
        let elapsed = self.clock.instant().saturating_duration_since(since);
        self.accumulated += elapsed;
        self.state = TimerState::Idle;
        let stopped_at = self.clock.time();
        info!("Timer stopped at {stopped_at} after {}", format_clock(elapsed));
        Some(TimerStop {
            started_at,
            stopped_at,
            elapsed,
        })
    }

    pub fn current_elapsed(&self) -> Duration {
        match self.state {
            TimerState::Idle => self.accumulated,
            TimerState::Running { since, .. } => {
                self.accumulated + self.clock.instant().saturating_duration_since(since)
            }
        }
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Short description for status displays, e.g. `Timer: 00:12:03`.
    pub fn status_line(&self) -> String {
        if self.is_running() {
            format!("Timer: {}", format_clock(self.current_elapsed()))
        } else {
            "Timer: Stopped".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use chrono::NaiveTime;

    use crate::utils::clock::testing::TestClock;

    use super::TimerSession;

    fn session() -> TimerSession {
        TimerSession::new(Arc::new(TestClock::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_wait_stop() {
        let mut timer = session();
        assert!(timer.start());
        tokio::time::advance(Duration::from_secs(2)).await;
        let stop = timer.stop().expect("timer was running");

        assert_eq!(stop.elapsed, Duration::from_secs(2));
        assert_eq!(timer.accumulated(), Duration::from_secs(2));
        assert_eq!(timer.current_elapsed(), Duration::from_secs(2));
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_stop_is_noop() {
        let mut timer = session();
        timer.start();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(timer.stop().is_some());
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(timer.stop().is_none());
        assert_eq!(timer.accumulated(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_is_noop() {
        let mut timer = session();
        assert!(timer.start());
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(!timer.start());
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(timer.current_elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_is_recomputed_not_counted() {
        let mut timer = session();
        assert_eq!(timer.status_line(), "Timer: Stopped");
        timer.start();
        tokio::time::advance(Duration::from_secs(3723)).await;
        assert_eq!(timer.status_line(), "Timer: 01:02:03");
        assert_eq!(timer.current_elapsed(), timer.current_elapsed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_start_resets_accumulated() {
        let mut timer = session();
        timer.start();
        tokio::time::advance(Duration::from_secs(10)).await;
        timer.stop();
        timer.start();
        assert_eq!(timer.current_elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_produces_entry_draft() {
        let mut timer = session();
        timer.start();
        tokio::time::advance(Duration::from_secs(90 * 60)).await;
        let stop = timer.stop().unwrap();

        let entry = stop.to_draft("Alpha", "focus").validate().unwrap();
        assert_eq!(entry.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(entry.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(entry.note, "focus");
    }
}
