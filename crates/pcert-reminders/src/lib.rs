//! # pcert-reminders — Expiry Reminder Scheduling
//!
//! Maintains a per-certification reminder schedule around the expiry
//! date (90/60/30/14/7/1 days before, the expiry day, and 1/7/30 days
//! after) and delivers due reminders through the notification sink.
//!
//! The schedule is a table, not a job queue: every entry carries a
//! Scheduled/Sent/Superseded state, rescheduling supersedes rather than
//! deletes, and the state is re-checked at delivery time. That makes the
//! table safe to rebuild by replaying the outbox and safe against stale
//! entries firing after a renewal.

pub mod schedule;
pub mod scheduler;

pub use schedule::{ReminderEntry, ReminderKind, ReminderState, ScheduleStore};
pub use scheduler::{deliver_due, should_schedule, ReminderReactor};
