use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::clock::{date_and_minute, Clock};
use super::message::compose;
use crate::error::StoreError;
use crate::notifier::Notifier;
use crate::schedules::repo::ScheduleStore;
use crate::schedules::repo_types::Schedule;

/// Outcome counters for one matcher cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub scanned: usize,
    pub due: usize,
    pub notified: usize,
    pub send_failed: usize,
    pub mark_failed: usize,
}

#[derive(Clone)]
pub struct ReminderMatcher {
    store: Arc<dyn ScheduleStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ReminderMatcher {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// One pass over the unsent records: notify every record due this minute
    /// and flag it as sent. Only the initial read can fail the cycle; per-record
    /// failures are logged and counted.
    pub async fn run_once(&self) -> Result<CycleReport, StoreError> {
        let (today, minute) = date_and_minute(self.clock.now());
        let unsent = self.store.query_unsent().await?;

        let mut report = CycleReport {
            scanned: unsent.len(),
            ..CycleReport::default()
        };
        for schedule in unsent.iter().filter(|s| s.is_due(&today, &minute)) {
            report.due += 1;
            self.deliver(schedule, &mut report).await;
        }
        Ok(report)
    }

    async fn deliver(&self, schedule: &Schedule, report: &mut CycleReport) {
        let msg = compose(schedule);
        if let Err(e) = self
            .notifier
            .send(&schedule.email, &msg.subject, &msg.body)
            .await
        {
            warn!(error = %e, id = %schedule.id, "reminder email failed; left unsent");
            report.send_failed += 1;
            return;
        }
        report.notified += 1;
        info!(id = %schedule.id, to = %schedule.email, "reminder email sent");

        match self.store.mark_sent(schedule.id).await {
            Ok(()) => {}
            Err(StoreError::NotFound(id)) => {
                info!(%id, "schedule deleted before it could be marked sent");
            }
            Err(e) => {
                error!(error = %e, id = %schedule.id, "mark_sent failed");
                report.mark_failed += 1;
            }
        }
    }
}

/// Runs `run_once` immediately and then every `period` on its own task.
/// Cycles never overlap; late ticks are delayed, not bunched up.
pub fn spawn_reminder_job(matcher: ReminderMatcher, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs(), "reminder job started");
        loop {
            ticker.tick().await;
            match matcher.run_once().await {
                Ok(report) if report.due > 0 => info!(?report, "reminder cycle finished"),
                Ok(report) => debug!(?report, "reminder cycle finished"),
                Err(e) => error!(error = %e, "could not load unsent schedules"),
            }
        }
    })
}
