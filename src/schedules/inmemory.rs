use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::ScheduleStore;
use super::repo_types::{NewSchedule, Schedule};
use crate::error::StoreError;

/// Process-local store used with `STORE_BACKEND=memory` and in tests.
/// Keeps insertion order, which is also the display order.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<Vec<Schedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn insert(&self, new: NewSchedule) -> Result<Schedule, StoreError> {
        let schedule = Schedule {
            id: Uuid::new_v4(),
            pet_name: new.pet_name,
            vaccine_name: new.vaccine_name,
            vaccination_date: new.vaccination_date,
            reminder_date: new.reminder_date,
            reminder_time: new.reminder_time,
            email: new.email,
            sent: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.schedules.write().await.push(schedule.clone());
        Ok(schedule)
    }

    async fn list(&self) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.schedules.read().await.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Schedule>, StoreError> {
        let schedules = self.schedules.read().await;
        Ok(schedules.iter().find(|s| s.id == id).cloned())
    }

    async fn query_unsent(&self) -> Result<Vec<Schedule>, StoreError> {
        let schedules = self.schedules.read().await;
        Ok(schedules.iter().filter(|s| !s.sent).cloned().collect())
    }

    async fn mark_sent(&self, id: Uuid) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write().await;
        match schedules.iter_mut().find(|s| s.id == id) {
            Some(s) => {
                s.sent = true;
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write().await;
        let idx = schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))?;
        schedules.remove(idx);
        Ok(())
    }
}
