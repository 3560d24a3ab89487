use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;

mod app;
mod config;
mod error;
mod notifier;
mod reminders;
mod schedules;
mod state;

use crate::config::AppConfig;
use crate::reminders::{
    clock::{host_offset, SystemClock},
    spawn_reminder_job, ReminderMatcher,
};
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "pet_reminder=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Read before any runtime threads exist.
    let offset = host_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(offset))
}

async fn run(offset: UtcOffset) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config).await?;

    let matcher = ReminderMatcher::new(
        app_state.store.clone(),
        notifier::from_config(&app_state.config.notifier),
        Arc::new(SystemClock::new(offset)),
    );
    let period = Duration::from_secs(app_state.config.reminders.poll_interval_secs);
    let job = spawn_reminder_job(matcher, period);
    tracing::info!(%offset, "reminder job scheduled");

    let addr = app_state.config.http.socket_addr()?;
    let result = app::serve(app::build_app(app_state), addr).await;

    job.abort();
    result
}
