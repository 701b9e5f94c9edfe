//! Point-in-time aggregate view of engine state, used by any external caller
//! that wants a status snapshot without driving a tick itself.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::domain::{AutomationSettings, PostingWindow};
use crate::error::EngineError;
use crate::messaging::MessagingClient;
use crate::repository::AutomationRepository;

#[derive(Debug)]
pub struct MessagingStatus {
    pub status: String,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct EngineStatus {
    pub settings: AutomationSettings,
    pub window: Option<PostingWindow>,
    pub queue_counts: HashMap<String, i64>,
    pub suggestion_counts: HashMap<String, i64>,
    pub messaging: MessagingStatus,
    pub tick_seconds: u64,
    pub next_suggested_generation_at: Option<DateTime<Utc>>,
}

pub async fn status(
    repo: &dyn AutomationRepository,
    messaging: &dyn MessagingClient,
    cfg: &AppConfig,
) -> Result<EngineStatus, EngineError> {
    let settings = repo.get_settings().await?.ok_or(EngineError::PostingWindowMissing)?;
    let window = repo.get_posting_window().await?;
    let queue_counts = repo.count_queue_items_by_status().await?;
    let suggestion_counts = repo.count_suggestions_by_status().await?;

    let messaging_status = match messaging.session_is_ready().await {
        Ok(true) => MessagingStatus { status: "ready".to_string(), code: None, message: None },
        Ok(false) => MessagingStatus { status: "not_ready".to_string(), code: None, message: None },
        Err(err) => {
            let message = err.to_string();
            let engine_err = EngineError::from(err);
            MessagingStatus { status: "unavailable".to_string(), code: Some(engine_err.code().to_string()), message: Some(message) }
        }
    };

    let next_suggested_generation_at = settings.next_suggested_generation_at(cfg.suggestion_interval_minutes);

    Ok(EngineStatus {
        settings,
        window,
        queue_counts,
        suggestion_counts,
        messaging: messaging_status,
        tick_seconds: cfg.tick_seconds,
        next_suggested_generation_at,
    })
}
