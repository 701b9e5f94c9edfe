use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::instrument;

use crate::error::MessagingError;

use super::types::{ErrorEnvelope, SendTextResponse, SessionStatusResponse};

const PASSTHROUGH_STATUSES: [u16; 5] = [400, 401, 404, 409, 422];

/// Builds `MessagingError::HttpError` from a non-2xx response: the
/// `{error:{message}}` envelope's message when present, raw text otherwise,
/// and the status clamped to the documented passthrough set (else `502`).
async fn http_error(resp: Response) -> MessagingError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or(body);
    let status = if PASSTHROUGH_STATUSES.contains(&status) { status } else { 502 };
    MessagingError::HttpError { status, message }
}

/// Capability interface the dispatcher and approval coordinator depend on.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn session_is_ready(&self) -> Result<bool, MessagingError>;
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<Option<String>, MessagingError>;
}

pub struct WhatsAppMessagingClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WhatsAppMessagingClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, MessagingError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(MessagingError::Unreachable)?;
        Ok(Self { http, base_url, api_key })
    }

    fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl MessagingClient for WhatsAppMessagingClient {
    #[instrument(skip(self), level = "debug")]
    async fn session_is_ready(&self) -> Result<bool, MessagingError> {
        if !self.has_key() {
            return Err(MessagingError::KeyMissing);
        }
        let url = format!("{}/session/status", self.base_url);
        let resp = self.http.get(&url).header("X-API-Key", &self.api_key).send().await?;

        if !resp.status().is_success() {
            return Err(http_error(resp).await);
        }

        let body: SessionStatusResponse = resp.json().await.map_err(|e| MessagingError::InvalidResponse(e.to_string()))?;
        Ok(body.is_ready)
    }

    #[instrument(skip(self, text), fields(chat_id = %chat_id), level = "debug")]
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<Option<String>, MessagingError> {
        if !self.has_key() {
            return Err(MessagingError::KeyMissing);
        }
        let url = format!("{}/messages/send-text", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(http_error(resp).await);
        }

        let body: SendTextResponse = resp.json().await.map_err(|e| MessagingError::InvalidResponse(e.to_string()))?;
        Ok(body.message_id)
    }
}
