pub mod clock;
mod matcher;
mod message;

pub use matcher::{spawn_reminder_job, ReminderMatcher};
