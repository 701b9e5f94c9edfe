//! Queue dispatcher: drains at most 10 due queue items per tick, gated on
//! messaging-session readiness, re-checking the window and daily cap for
//! each item immediately before sending.

use chrono::{Duration, Utc};
use tracing::{instrument, warn};

use crate::domain::{QueueStatus, SuggestionStatus};
use crate::error::EngineError;
use crate::messaging::MessagingClient;
use crate::repository::{AutomationRepository, NewPostHistoryEntry};
use crate::scheduler::window_scheduler;

const MAX_ITEMS_PER_PASS: i64 = 10;

#[derive(Debug, Default)]
pub struct DispatchResult {
    pub skipped_not_ready: bool,
    pub sent: u32,
    pub rescheduled: u32,
    pub failed: u32,
}

#[instrument(skip(repo, messaging))]
pub async fn run_dispatch(
    repo: &dyn AutomationRepository,
    messaging: &dyn MessagingClient,
    timezone: chrono_tz::Tz,
    daily_post_limit: i64,
) -> Result<DispatchResult, EngineError> {
    let mut result = DispatchResult::default();

    let ready = match messaging.session_is_ready().await {
        Ok(ready) => ready,
        Err(err) => {
            warn!(error = %err, "messaging session status check failed, skipping dispatch pass");
            result.skipped_not_ready = true;
            return Ok(result);
        }
    };

    if !ready {
        result.skipped_not_ready = true;
        return Ok(result);
    }

    let now = Utc::now();
    let due = repo.due_queue_items(now, MAX_ITEMS_PER_PASS).await?;
    let window = repo.get_posting_window().await?;

    for mut item in due {
        let now = Utc::now();

        let Some(mut suggestion) = repo.get_suggestion(item.suggestion_id).await? else {
            item.status = QueueStatus::Failed;
            item.last_error = Some("Suggestion not found".to_string());
            repo.update_queue_item(&item).await?;
            result.failed += 1;
            continue;
        };

        if let Some(window) = window.as_ref().filter(|w| w.is_active) {
            let (window_start, window_end) = crate::time::window_bounds_for_day(now, timezone, window.start_time, window.end_time);
            let within_window = now >= window_start && now <= window_end;
            if !within_window {
                item.scheduled_at = crate::time::next_window_start(now, timezone, window.start_time, window.end_time);
                repo.update_queue_item(&item).await?;
                result.rescheduled += 1;
                continue;
            }

            let sent_today = window_scheduler::sent_count(repo, &item.chat_id, now, window, timezone).await?;
            if sent_today >= daily_post_limit {
                let tomorrow = now + Duration::days(1);
                item.scheduled_at = crate::time::next_window_start(tomorrow, timezone, window.start_time, window.end_time);
                repo.update_queue_item(&item).await?;
                result.rescheduled += 1;
                continue;
            }
        }

        item.status = QueueStatus::Sending;
        item.attempts += 1;
        repo.update_queue_item(&item).await?;

        match messaging.send_text(&item.chat_id, &item.message_text).await {
            Ok(wa_message_id) => {
                let sent_at = Utc::now();
                item.status = QueueStatus::Sent;
                item.sent_at = Some(sent_at);
                item.wa_message_id = wa_message_id.clone();
                item.last_error = None;
                repo.update_queue_item(&item).await?;

                suggestion.status = SuggestionStatus::Sent;
                suggestion.sent_at = Some(sent_at);
                suggestion.last_error = None;
                repo.update_suggestion(&suggestion).await?;

                repo.insert_post_history(NewPostHistoryEntry {
                    suggestion_id: Some(suggestion.id),
                    item_id: suggestion.item_id.clone(),
                    shop_id: suggestion.shop_id.clone(),
                    chat_id: item.chat_id.clone(),
                    product_name: suggestion.product_name.clone(),
                    message_text: item.message_text.clone(),
                    short_link: suggestion.short_link.clone(),
                    wa_message_id,
                    sent_at,
                })
                .await?;

                result.sent += 1;
            }
            Err(err) => {
                let message = err.to_string();
                item.status = QueueStatus::Failed;
                item.last_error = Some(message.clone());
                repo.update_queue_item(&item).await?;

                suggestion.status = SuggestionStatus::Failed;
                suggestion.last_error = Some(message);
                repo.update_suggestion(&suggestion).await?;

                result.failed += 1;
            }
        }
    }

    Ok(result)
}
