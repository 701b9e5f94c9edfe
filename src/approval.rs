//! Approval coordinator: the only place a `pending` suggestion transitions
//! out of that state.

use chrono::Utc;
use tracing::instrument;

use crate::catalog::CatalogClient;
use crate::domain::{ApprovedAction, SuggestionStatus};
use crate::error::EngineError;
use crate::messaging::MessagingClient;
use crate::repository::{AutomationRepository, NewPostHistoryEntry, NewQueueItem};
use crate::renderer;
use crate::scheduler::window_scheduler;

async fn load_pending(repo: &dyn AutomationRepository, id: i64) -> Result<crate::domain::Suggestion, EngineError> {
    let suggestion = repo.get_suggestion(id).await?.ok_or(EngineError::SuggestionNotFound { id })?;
    if !suggestion.is_pending() {
        return Err(EngineError::SuggestionNotPending { id, status: suggestion.status.as_str().to_string() });
    }
    Ok(suggestion)
}

#[instrument(skip(repo, catalog), fields(suggestion_id = id))]
pub async fn approve_schedule(
    repo: &dyn AutomationRepository,
    catalog: &dyn CatalogClient,
    id: i64,
) -> Result<crate::domain::QueueItem, EngineError> {
    let mut suggestion = load_pending(repo, id).await?;

    let settings = repo.get_settings().await?.ok_or(EngineError::PostingWindowMissing)?;
    let chat_id = settings.target_group_id.clone().filter(|s| !s.is_empty()).ok_or(EngineError::TargetGroupNotConfigured)?;

    let message_text = renderer::render(&settings.message_template, &mut suggestion, catalog).await?;

    let window = repo.get_posting_window().await?;
    let timezone = crate::time::parse_timezone(&settings.timezone)?;
    let scheduled_at = window_scheduler::next_send_at(
        repo,
        &chat_id,
        window.as_ref(),
        timezone,
        settings.daily_post_target,
        settings.daily_post_limit,
        Utc::now(),
    )
    .await?;

    let queue_item = repo
        .insert_queue_item(NewQueueItem { suggestion_id: suggestion.id, chat_id, scheduled_at, message_text })
        .await?;

    suggestion.status = SuggestionStatus::Queued;
    suggestion.approved_action = Some(ApprovedAction::Schedule);
    suggestion.approved_at = Some(Utc::now());
    suggestion.queue_scheduled_for = Some(scheduled_at);
    suggestion.last_error = None;
    repo.update_suggestion(&suggestion).await?;

    Ok(queue_item)
}

#[instrument(skip(repo, catalog, messaging), fields(suggestion_id = id))]
pub async fn approve_send_now(
    repo: &dyn AutomationRepository,
    catalog: &dyn CatalogClient,
    messaging: &dyn MessagingClient,
    id: i64,
) -> Result<(), EngineError> {
    let mut suggestion = load_pending(repo, id).await?;

    let settings = repo.get_settings().await?.ok_or(EngineError::PostingWindowMissing)?;
    let chat_id = settings.target_group_id.clone().filter(|s| !s.is_empty()).ok_or(EngineError::TargetGroupNotConfigured)?;

    suggestion.approved_action = Some(ApprovedAction::SendNow);
    suggestion.approved_at = Some(Utc::now());

    let message_text = renderer::render(&settings.message_template, &mut suggestion, catalog).await?;

    let wa_message_id = messaging.send_text(&chat_id, &message_text).await?;

    let now = Utc::now();
    repo.insert_post_history(NewPostHistoryEntry {
        suggestion_id: Some(suggestion.id),
        item_id: suggestion.item_id.clone(),
        shop_id: suggestion.shop_id.clone(),
        chat_id,
        product_name: suggestion.product_name.clone(),
        message_text,
        short_link: suggestion.short_link.clone(),
        wa_message_id,
        sent_at: now,
    })
    .await?;

    suggestion.status = SuggestionStatus::Sent;
    suggestion.sent_at = Some(now);
    suggestion.last_error = None;
    repo.update_suggestion(&suggestion).await?;

    Ok(())
}

#[instrument(skip(repo), fields(suggestion_id = id))]
pub async fn reject(repo: &dyn AutomationRepository, id: i64, reason: Option<String>) -> Result<(), EngineError> {
    let mut suggestion = load_pending(repo, id).await?;
    suggestion.status = SuggestionStatus::Rejected;
    suggestion.rejection_reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    repo.update_suggestion(&suggestion).await?;
    Ok(())
}
