use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Schedule;

/// Request body for creating a reminder. Every field may be absent so that
/// missing input is reported by validation rather than by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateScheduleRequest {
    pub pet_name: String,
    pub vaccine_name: String,
    pub vaccination_date: String,
    pub reminder_date: String,
    pub reminder_hour: Option<u8>,
    pub reminder_minute: Option<u8>,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedScheduleResponse {
    pub message: String,
    pub schedule: Schedule,
}

/// One line of the listing, numbered from 1 in display order.
#[derive(Debug, Serialize)]
pub struct ScheduleRow {
    pub index: usize,
    pub id: Uuid,
    pub pet_name: String,
    pub vaccine_name: String,
    pub vaccination_date: String,
    pub email: String,
    pub reminder_date: String,
    pub reminder_time: String,
    pub sent: bool,
    pub sent_display: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ScheduleRow {
    pub fn new(index: usize, s: Schedule) -> Self {
        Self {
            index,
            id: s.id,
            sent_display: sent_glyph(s.sent),
            pet_name: s.pet_name,
            vaccine_name: s.vaccine_name,
            vaccination_date: s.vaccination_date,
            email: s.email,
            reminder_date: s.reminder_date,
            reminder_time: s.reminder_time,
            sent: s.sent,
            created_at: s.created_at,
        }
    }
}

pub fn sent_glyph(sent: bool) -> &'static str {
    if sent {
        "✅"
    } else {
        "❌"
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
}
