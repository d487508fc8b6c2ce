//! Webhook notifier
//!
//! Posts `{"text": message}` to an incoming-webhook URL (Slack-compatible).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::ports::NotificationPort;
use crate::error::NotificationError;

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl NotificationPort for WebhookNotifier {
    async fn send_notification(&self, message: &str) -> Result<(), NotificationError> {
        let response = self
            .http
            .post(&self.url)
            .json(&WebhookMessage { text: message })
            .send()
            .await
            .map_err(NotificationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!("Notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;

    use super::*;

    type Received = Arc<Mutex<Vec<Value>>>;

    async fn webhook(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();

        let app = Router::new()
            .route(
                "/hooks/ops",
                post(
                    move |State(received): State<Received>, Json(body): Json<Value>| async move {
                        received.lock().unwrap().push(body);
                        status
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/hooks/ops", addr), received)
    }

    #[tokio::test]
    async fn posts_text_payload() {
        let (url, received) = webhook(StatusCode::OK).await;
        let notifier = WebhookNotifier::new(url);

        notifier.send_notification("3 users went dormant").await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["text"], "3 users went dormant");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (url, _) = webhook(StatusCode::FORBIDDEN).await;
        let notifier = WebhookNotifier::new(url);

        let err = notifier.send_notification("hello").await.unwrap_err();

        assert!(matches!(err, NotificationError::Rejected { status: 403 }));
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_transport_error() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hooks".to_string());

        let err = notifier.send_notification("hello").await.unwrap_err();

        assert!(matches!(err, NotificationError::Transport(_)));
    }
}
