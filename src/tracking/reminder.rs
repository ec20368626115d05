use std::{fmt::Display, sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    error::{Result, TrackerError},
    utils::clock::Clock,
};

use super::session::TimerSession;

pub const MIN_REMINDER_MINUTES: u32 = 1;
pub const MAX_REMINDER_MINUTES: u32 = 120;
pub const DEFAULT_REMINDER_INTERVAL: ReminderInterval = ReminderInterval(30);

/// Reminder period, always between 1 and 120 minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderInterval(u32);

impl ReminderInterval {
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if !(MIN_REMINDER_MINUTES..=MAX_REMINDER_MINUTES).contains(&minutes) {
            return Err(TrackerError::validation(
                "reminder_interval",
                format!(
                    "{minutes} minutes is outside of {MIN_REMINDER_MINUTES}..={MAX_REMINDER_MINUTES}"
                ),
            ));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0 as u64 * 60)
    }
}

/// What the user is reminded about, chosen by the timer state at the moment the alarm is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    StartTimer,
    StopTimer,
}

impl Display for Reminder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reminder::StartTimer => write!(f, "The timer is idle. Remember to start it."),
            Reminder::StopTimer => write!(f, "The timer is running. Remember to stop it."),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ReminderObserver {
    fn notify(&mut self, reminder: Reminder);
}

/// Message sent from the alarm task to the event loop. The generation ties it to the schedule
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderAlarm {
    generation: u64,
}

/// Owns the periodic reminder alarm. The alarm runs as a separate task that only sends
/// [ReminderAlarm] messages; turning them into reminders happens in [ReminderScheduler::handle_alarm]
/// on the loop that owns the timer.
pub struct ReminderScheduler {
    clock: Arc<dyn Clock>,
    sender: mpsc::Sender<ReminderAlarm>,
    interval: watch::Sender<ReminderInterval>,
    generation: u64,
    pending: Option<CancellationToken>,
}

impl ReminderScheduler {
    pub fn new(
        clock: Arc<dyn Clock>,
        interval: ReminderInterval,
    ) -> (Self, mpsc::Receiver<ReminderAlarm>) {
        let (sender, receiver) = mpsc::channel(4);
        let (interval, _) = watch::channel(interval);
        (
            Self {
                clock,
                sender,
                interval,
                generation: 0,
                pending: None,
            },
            receiver,
        )
    }

    pub fn interval(&self) -> ReminderInterval {
        *self.interval.borrow()
    }

    pub fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    /// Changes the period used by alarms scheduled from now on. An alarm that is already waiting
    /// keeps its original deadline.
    pub fn set_interval(&mut self, minutes: u32) -> Result<()> {
        let interval = ReminderInterval::from_minutes(minutes)?;
        debug!("Reminder interval set to {minutes} minutes");
        self.interval.send_replace(interval);
        Ok(())
    }

    /// Replaces any pending alarm with a new self-renewing one firing every `interval`.
    pub fn start(&mut self, interval: ReminderInterval) {
        self.stop();
        self.interval.send_replace(interval);
        self.generation += 1;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let clock = self.clock.clone();
        let sender = self.sender.clone();
        let mut next_interval = self.interval.subscribe();
        let alarm = ReminderAlarm {
            generation: self.generation,
        };

        tokio::spawn(async move {
            let mut wait = interval.as_duration();
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => return,
                    _ = clock.sleep(wait) => ()
                }
                trace!("Reminder alarm {alarm:?} fired");
                if sender.send(alarm).await.is_err() {
                    return;
                }
                wait = next_interval.borrow_and_update().as_duration();
            }
        });

        info!("Reminders scheduled every {} minutes", interval.minutes());
        self.pending = Some(token);
    }

    /// Cancels the pending alarm. Alarms already queued become stale and are ignored.
    pub fn stop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
            self.generation += 1;
            info!("Reminders stopped");
        }
    }

    /// Turns an alarm into a reminder, or drops it if it belongs to a cancelled schedule.
    pub fn handle_alarm(&self, alarm: ReminderAlarm, timer: &TimerSession) -> Option<Reminder> {
        if self.pending.is_none() || alarm.generation != self.generation {
            debug!("Ignoring stale reminder alarm {alarm:?}");
            return None;
        }
        Some(if timer.is_running() {
            Reminder::StopTimer
        } else {
            Reminder::StartTimer
        })
    }

    /// Handles an alarm and passes the resulting reminder to `observer`.
    pub fn dispatch(
        &self,
        alarm: ReminderAlarm,
        timer: &TimerSession,
        observer: &mut dyn ReminderObserver,
    ) {
        if let Some(reminder) = self.handle_alarm(alarm, timer) {
            observer.notify(reminder);
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use mockall::predicate::eq;
    use tokio::time::{timeout, Instant};

    use crate::{
        error::TrackerError,
        tracking::session::TimerSession,
        utils::clock::{testing::TestClock, Clock},
    };

    use super::{MockReminderObserver, Reminder, ReminderInterval, ReminderScheduler};

    fn minutes(value: u32) -> ReminderInterval {
        ReminderInterval::from_minutes(value).unwrap()
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(TestClock::new())
    }

    #[test]
    fn test_interval_bounds() {
        assert!(ReminderInterval::from_minutes(1).is_ok());
        assert!(ReminderInterval::from_minutes(120).is_ok());
        assert!(matches!(
            ReminderInterval::from_minutes(0),
            Err(TrackerError::Validation { .. })
        ));
        assert!(ReminderInterval::from_minutes(121).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_validates() {
        let (mut scheduler, _alarms) = ReminderScheduler::new(clock(), minutes(30));
        assert!(scheduler.set_interval(0).is_err());
        assert!(scheduler.set_interval(121).is_err());
        assert_eq!(scheduler.interval(), minutes(30));
        scheduler.set_interval(45).unwrap();
        assert_eq!(scheduler.interval(), minutes(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_alarm_renews_and_follows_timer_state() {
        let clock = clock();
        let (mut scheduler, mut alarms) = ReminderScheduler::new(clock.clone(), minutes(30));
        let mut timer = TimerSession::new(clock);
        let begin = Instant::now();

        scheduler.start(minutes(1));

        let alarm = alarms.recv().await.unwrap();
        assert_eq!(begin.elapsed(), Duration::from_secs(60));
        assert_eq!(scheduler.handle_alarm(alarm, &timer), Some(Reminder::StartTimer));

        timer.start();
        let alarm = alarms.recv().await.unwrap();
        assert_eq!(begin.elapsed(), Duration::from_secs(120));
        assert_eq!(scheduler.handle_alarm(alarm, &timer), Some(Reminder::StopTimer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_is_not_retroactive() {
        let (mut scheduler, mut alarms) = ReminderScheduler::new(clock(), minutes(30));
        let begin = Instant::now();

        scheduler.start(minutes(10));
        scheduler.set_interval(1).unwrap();

        alarms.recv().await.unwrap();
        assert_eq!(begin.elapsed(), Duration::from_secs(10 * 60));
        alarms.recv().await.unwrap();
        assert_eq!(begin.elapsed(), Duration::from_secs(11 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_and_invalidates_alarms() {
        let clock = clock();
        let (mut scheduler, mut alarms) = ReminderScheduler::new(clock.clone(), minutes(30));
        let timer = TimerSession::new(clock);

        scheduler.start(minutes(1));
        let queued = alarms.recv().await.unwrap();
        scheduler.stop();
        scheduler.stop();

        assert!(!scheduler.is_active());
        assert_eq!(scheduler.handle_alarm(queued, &timer), None);
        assert!(timeout(Duration::from_secs(3600), alarms.recv())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_drops_previous_schedule() {
        let clock = clock();
        let (mut scheduler, mut alarms) = ReminderScheduler::new(clock.clone(), minutes(30));
        let timer = TimerSession::new(clock);

        scheduler.start(minutes(1));
        let old = alarms.recv().await.unwrap();
        scheduler.start(minutes(2));

        assert_eq!(scheduler.handle_alarm(old, &timer), None);
        let new = alarms.recv().await.unwrap();
        assert_eq!(scheduler.handle_alarm(new, &timer), Some(Reminder::StartTimer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_notifies_observer() {
        let clock = clock();
        let (mut scheduler, mut alarms) = ReminderScheduler::new(clock.clone(), minutes(30));
        let mut timer = TimerSession::new(clock);
        let mut observer = MockReminderObserver::new();
        observer
            .expect_notify()
            .with(eq(Reminder::StopTimer))
            .times(1)
            .return_const(());

        timer.start();
        scheduler.start(minutes(5));
        let alarm = alarms.recv().await.unwrap();
        scheduler.dispatch(alarm, &timer, &mut observer);
    }
}
