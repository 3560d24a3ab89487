use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{NotifierConfig, NotifierKind};
use crate::error::NotifierError;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError>;
}

#[derive(Debug, Serialize)]
struct EmailMessage<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Sends plain-text email through a transactional email HTTP API.
///
/// The request carries no timeout, so a hung API call stalls the rest of
/// the reminder cycle.
#[derive(Clone)]
pub struct HttpEmailNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    sender: String,
}

impl HttpEmailNotifier {
    pub fn new(api_url: &str, api_key: &str, sender: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message = EmailMessage {
            from: &self.sender,
            to: [to],
            subject,
            text: body,
        };
        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&message)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(%to, %status, "email accepted");
        Ok(())
    }
}

/// Dry-run notifier: logs the message instead of sending it.
#[derive(Clone)]
pub struct LogNotifier {
    sender: String,
}

impl LogNotifier {
    pub fn new(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        info!(from = %self.sender, %to, %subject, %body, "email (dry run)");
        Ok(())
    }
}

pub fn from_config(cfg: &NotifierConfig) -> Arc<dyn Notifier> {
    match cfg.kind {
        NotifierKind::Http => Arc::new(HttpEmailNotifier::new(
            &cfg.api_url,
            &cfg.api_key,
            &cfg.sender,
        )),
        NotifierKind::Log => Arc::new(LogNotifier::new(&cfg.sender)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use std::sync::Mutex;

    type Captured = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    async fn capture(
        State(seen): State<Captured>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> StatusCode {
        let auth = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.lock().unwrap().push((auth, body));
        StatusCode::ACCEPTED
    }

    async fn reject() -> (StatusCode, &'static str) {
        (StatusCode::UNPROCESSABLE_ENTITY, "bad recipient")
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn posts_message_with_bearer_secret() {
        let seen: Captured = Arc::default();
        let app = Router::new()
            .route("/send", post(capture))
            .with_state(seen.clone());
        let base = serve(app).await;

        let notifier = HttpEmailNotifier::new(&format!("{base}/send"), "s3cret", "pets@example.com");
        notifier
            .send("a@b.com", "Reminder: Rex's Vaccination is on 2024-06-01", "hello")
            .await
            .expect("send");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (auth, body) = &seen[0];
        assert_eq!(auth.as_deref(), Some("Bearer s3cret"));
        assert_eq!(body["from"], "pets@example.com");
        assert_eq!(body["to"][0], "a@b.com");
        assert_eq!(body["subject"], "Reminder: Rex's Vaccination is on 2024-06-01");
        assert_eq!(body["text"], "hello");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let base = serve(Router::new().route("/send", post(reject))).await;

        let notifier = HttpEmailNotifier::new(&format!("{base}/send"), "k", "pets@example.com");
        let err = notifier.send("a@b.com", "s", "b").await.unwrap_err();

        match err {
            NotifierError::Rejected { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad recipient");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn log_kind_never_touches_the_network() {
        let cfg = NotifierConfig {
            kind: NotifierKind::Log,
            api_url: "http://127.0.0.1:1/unused".into(),
            api_key: String::new(),
            sender: "reminders@localhost".into(),
        };
        from_config(&cfg)
            .send("a@b.com", "s", "b")
            .await
            .expect("dry run");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier = HttpEmailNotifier::new(&format!("http://{addr}/send"), "k", "pets@example.com");
        let err = notifier.send("a@b.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, NotifierError::Transport(_)));
    }
}
