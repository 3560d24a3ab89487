use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Shape of the `STORE_CONFIG` blob and of the local credential file.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCredentials {
    pub database_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Http,
    Log,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub kind: NotifierKind,
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl HttpConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub store: StoreConfig,
    pub notifier: NotifierConfig,
    pub reminders: ReminderConfig,
}

const DEFAULT_CREDENTIALS_FILE: &str = "store_credentials.json";
const DEFAULT_POLL_SECS: u64 = 60;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match var("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreConfig::Postgres {
                database_url: resolve_database_url(&var)?,
            },
            Some("memory") => StoreConfig::Memory,
            Some(other) => anyhow::bail!("unknown STORE_BACKEND {other:?}"),
        };

        let kind = match var("NOTIFIER_KIND").as_deref() {
            None | Some("http") => NotifierKind::Http,
            Some("log") => NotifierKind::Log,
            Some(other) => anyhow::bail!("unknown NOTIFIER_KIND {other:?}"),
        };
        let notifier = match kind {
            NotifierKind::Http => NotifierConfig {
                kind,
                api_url: var("NOTIFIER_API_URL").context("NOTIFIER_API_URL is not set")?,
                api_key: var("NOTIFIER_API_KEY").context("NOTIFIER_API_KEY is not set")?,
                sender: var("NOTIFIER_SENDER").context("NOTIFIER_SENDER is not set")?,
            },
            NotifierKind::Log => NotifierConfig {
                kind,
                api_url: String::new(),
                api_key: String::new(),
                sender: var("NOTIFIER_SENDER").unwrap_or_else(|| "reminders@localhost".into()),
            },
        };

        let poll_interval_secs = match var("REMINDER_POLL_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("REMINDER_POLL_SECS {v:?} is not a number"))?,
            None => DEFAULT_POLL_SECS,
        };
        // A longer period can skip a whole due minute.
        anyhow::ensure!(
            (1..=60).contains(&poll_interval_secs),
            "REMINDER_POLL_SECS must be between 1 and 60, got {poll_interval_secs}"
        );

        let port = match var("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT {v:?} is not a port number"))?,
            None => DEFAULT_PORT,
        };
        let http = HttpConfig {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
        };

        Ok(Self {
            http,
            store,
            notifier,
            reminders: ReminderConfig { poll_interval_secs },
        })
    }
}

fn resolve_database_url<F>(var: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("DATABASE_URL") {
        return Ok(url);
    }

    if let Some(blob) = var("STORE_CONFIG") {
        let creds: StoreCredentials =
            serde_json::from_str(&blob).context("parse STORE_CONFIG")?;
        return Ok(creds.database_url);
    }

    let path = var("STORE_CREDENTIALS_FILE").unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.into());
    read_credentials_file(Path::new(&path))
        .with_context(|| format!("no DATABASE_URL or STORE_CONFIG and could not use {path}"))
}

fn read_credentials_file(path: &Path) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(path)?;
    let creds: StoreCredentials = serde_json::from_str(&raw)?;
    Ok(creds.database_url)
}
