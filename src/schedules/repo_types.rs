use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Reminder record in the `schedules` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub pet_name: String,
    pub vaccine_name: String,
    pub vaccination_date: String, // YYYY-MM-DD, display only
    pub reminder_date: String,    // YYYY-MM-DD
    pub reminder_time: String,    // HH:MM
    pub email: String,
    pub sent: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Schedule {
    /// Exact match on the wall-clock date and minute; sent records are never due.
    pub fn is_due(&self, today: &str, minute: &str) -> bool {
        !self.sent && self.reminder_date == today && self.reminder_time == minute
    }
}

/// `YYYY-MM-DD`, the form stored and compared by the reminder job.
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// `HH:MM`, the form stored and compared by the reminder job.
pub fn format_minute(hour: u8, minute: u8) -> String {
    format!("{:02}:{:02}", hour, minute)
}

/// Validated input for a new record; `id`, `sent` and `created_at` come from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub pet_name: String,
    pub vaccine_name: String,
    pub vaccination_date: String,
    pub reminder_date: String,
    pub reminder_time: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rex(sent: bool) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            pet_name: "Rex".into(),
            vaccine_name: "Rabies".into(),
            vaccination_date: "2024-06-01".into(),
            reminder_date: "2024-05-25".into(),
            reminder_time: "09:00".into(),
            email: "a@b.com".into(),
            sent,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn due_only_on_exact_date_and_minute() {
        let s = rex(false);
        assert!(s.is_due("2024-05-25", "09:00"));
        assert!(!s.is_due("2024-05-25", "09:01"));
        assert!(!s.is_due("2024-05-26", "09:00"));
        assert!(!s.is_due("2024-06-01", "09:00"));
    }

    #[test]
    fn stored_forms_are_zero_padded() {
        assert_eq!(format_date(time::macros::date!(2024 - 05 - 05)), "2024-05-05");
        assert_eq!(format_minute(9, 7), "09:07");
        assert_eq!(format_minute(23, 59), "23:59");
    }

    #[test]
    fn sent_record_is_never_due() {
        assert!(!rex(true).is_due("2024-05-25", "09:00"));
    }
}
