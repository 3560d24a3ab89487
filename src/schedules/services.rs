use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};
use tracing::{error, info, warn};

use super::dto::{sent_glyph, CreateScheduleRequest};
use super::repo::ScheduleStore;
use super::repo_types::{format_date, format_minute, NewSchedule, Schedule};
use crate::error::{StoreError, ValidationError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn parse_date(field: &'static str, value: &str) -> Result<String, ValidationError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map(format_date)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

pub fn validate_new_schedule(req: CreateScheduleRequest) -> Result<NewSchedule, ValidationError> {
    let pet_name = req.pet_name.trim().to_string();
    let vaccine_name = req.vaccine_name.trim().to_string();
    let email = req.email.trim().to_string();

    let required = [&pet_name, &vaccine_name, &email, &req.vaccination_date, &req.reminder_date];
    let (Some(hour), Some(minute)) = (req.reminder_hour, req.reminder_minute) else {
        return Err(ValidationError::MissingFields);
    };
    if required.iter().any(|v| v.trim().is_empty()) {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    if hour > 23 {
        return Err(ValidationError::InvalidHour(hour));
    }
    if minute > 59 {
        return Err(ValidationError::InvalidMinute(minute));
    }

    Ok(NewSchedule {
        pet_name,
        vaccine_name,
        vaccination_date: parse_date("vaccination_date", &req.vaccination_date)?,
        reminder_date: parse_date("reminder_date", &req.reminder_date)?,
        reminder_time: format_minute(hour, minute),
        email,
    })
}

pub fn confirmation_message(s: &Schedule) -> String {
    format!(
        "Reminder saved for {}'s vaccine on {}. Email will be sent at {} on {}.",
        s.pet_name, s.vaccination_date, s.reminder_time, s.reminder_date
    )
}

pub const CSV_HEADER: [&str; 8] = [
    "S.No",
    "Pet Name",
    "Vaccine Name",
    "Vaccination Date",
    "Owner Email",
    "Reminder Date",
    "Reminder Time",
    "Sent",
];

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders the listing as CSV, one row per record in the given order.
pub fn export_csv(schedules: &[Schedule]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for (idx, s) in schedules.iter().enumerate() {
        let index = (idx + 1).to_string();
        let fields = [
            index.as_str(),
            s.pet_name.as_str(),
            s.vaccine_name.as_str(),
            s.vaccination_date.as_str(),
            s.email.as_str(),
            s.reminder_date.as_str(),
            s.reminder_time.as_str(),
            sent_glyph(s.sent),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Deletes every record present when called, one at a time.
/// Per-record failures are logged and skipped; returns how many were removed.
pub async fn delete_all(store: &dyn ScheduleStore) -> Result<usize, StoreError> {
    let ids: Vec<_> = store.list().await?.into_iter().map(|s| s.id).collect();
    let mut deleted = 0;
    for id in ids {
        match store.delete(id).await {
            Ok(()) => deleted += 1,
            Err(StoreError::NotFound(_)) => {
                warn!(%id, "schedule already gone during bulk delete");
            }
            Err(e) => {
                error!(error = %e, %id, "bulk delete failed for schedule");
            }
        }
    }
    info!(deleted, "bulk delete finished");
    Ok(deleted)
}
