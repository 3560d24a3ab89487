use crate::config::{AppConfig, StoreConfig};
use crate::schedules::{inmemory::InMemoryScheduleStore, repo::{PgScheduleStore, ScheduleStore}};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    /// Connects the configured store; any failure here is fatal for the process.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match &config.store {
            StoreConfig::Postgres { database_url } => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(database_url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                info!("postgres schedule store ready");
                Arc::new(PgScheduleStore::new(db)) as Arc<dyn ScheduleStore>
            }
            StoreConfig::Memory => {
                warn!("using in-memory schedule store; records are lost on restart");
                Arc::new(InMemoryScheduleStore::new()) as Arc<dyn ScheduleStore>
            }
        };

        Ok(Self { config, store })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{HttpConfig, NotifierConfig, NotifierKind, ReminderConfig};

        let config = Arc::new(AppConfig {
            http: HttpConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            store: StoreConfig::Memory,
            notifier: NotifierConfig {
                kind: NotifierKind::Log,
                api_url: String::new(),
                api_key: String::new(),
                sender: "reminders@test.local".into(),
            },
            reminders: ReminderConfig {
                poll_interval_secs: 60,
            },
        });
        Self {
            config,
            store: Arc::new(InMemoryScheduleStore::new()),
        }
    }
}
