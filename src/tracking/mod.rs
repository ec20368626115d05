//! Live tracking. [session::TimerSession] measures the interval being worked on,
//! [reminder::ReminderScheduler] nags periodically and [tracker::Tracker] runs both on one loop.

pub mod reminder;
pub mod session;
pub mod tracker;
