use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{NewSchedule, Schedule};
use crate::error::StoreError;

/// Access to the `schedules` collection, shared by the HTTP handlers and the reminder job.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn insert(&self, new: NewSchedule) -> Result<Schedule, StoreError>;
    /// All records in display order.
    async fn list(&self) -> Result<Vec<Schedule>, StoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Schedule>, StoreError>;
    /// Records with `sent = false`, filtered by the store.
    async fn query_unsent(&self) -> Result<Vec<Schedule>, StoreError>;
    async fn mark_sent(&self, id: Uuid) -> Result<(), StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgScheduleStore {
    db: PgPool,
}

impl PgScheduleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn insert(&self, new: NewSchedule) -> Result<Schedule, StoreError> {
        let schedule = sqlx::query_as::<_, Schedule>(
            r#"
            INSERT INTO schedules
                (pet_name, vaccine_name, vaccination_date, reminder_date, reminder_time, email, sent)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING id, pet_name, vaccine_name, vaccination_date, reminder_date,
                      reminder_time, email, sent, created_at
            "#,
        )
        .bind(&new.pet_name)
        .bind(&new.vaccine_name)
        .bind(&new.vaccination_date)
        .bind(&new.reminder_date)
        .bind(&new.reminder_time)
        .bind(&new.email)
        .fetch_one(&self.db)
        .await?;
        debug!(id = %schedule.id, "schedule inserted");
        Ok(schedule)
    }

    async fn list(&self) -> Result<Vec<Schedule>, StoreError> {
        let rows = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, pet_name, vaccine_name, vaccination_date, reminder_date,
                   reminder_time, email, sent, created_at
            FROM schedules
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Schedule>, StoreError> {
        let row = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, pet_name, vaccine_name, vaccination_date, reminder_date,
                   reminder_time, email, sent, created_at
            FROM schedules
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn query_unsent(&self) -> Result<Vec<Schedule>, StoreError> {
        let rows = sqlx::query_as::<_, Schedule>(
            r#"
            SELECT id, pet_name, vaccine_name, vaccination_date, reminder_date,
                   reminder_time, email, sent, created_at
            FROM schedules
            WHERE sent = FALSE
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query(r#"UPDATE schedules SET sent = TRUE WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let res = sqlx::query(r#"DELETE FROM schedules WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "schedule deleted");
        Ok(())
    }
}
