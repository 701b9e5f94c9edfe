//! Persistence boundary. `AutomationRepository` is the single capability
//! interface every component depends on; `sqlx_repo` provides the
//! `sqlx::AnyPool`-backed implementation and tests exercise the trait
//! against an in-memory sqlite pool rather than a hand-written fake, since
//! the query surface is the thing worth verifying.

pub mod sqlx_repo;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AutomationSettings, PostHistoryEntry, PostingWindow, QueueItem, QueueStatus, Suggestion, SuggestionStatus, Theme,
};
use crate::error::RepositoryError;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Fields needed to insert a new suggestion; everything else (id, status,
/// created_at) is assigned by the repository.
#[derive(Clone, Debug)]
pub struct NewSuggestion {
    pub source_keyword: String,
    pub item_id: String,
    pub shop_id: Option<String>,
    pub product_name: String,
    pub image_url: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub formatted_price: Option<String>,
    pub product_link: Option<String>,
    pub offer_link: Option<String>,
    pub commission_rate: Option<f64>,
    pub rating_star: Option<f64>,
    pub sales: Option<f64>,
    pub score: f64,
    pub raw_payload: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct NewQueueItem {
    pub suggestion_id: i64,
    pub chat_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub message_text: String,
}

#[derive(Clone, Debug)]
pub struct NewPostHistoryEntry {
    pub suggestion_id: Option<i64>,
    pub item_id: String,
    pub shop_id: Option<String>,
    pub chat_id: String,
    pub product_name: String,
    pub message_text: String,
    pub short_link: Option<String>,
    pub wa_message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[async_trait]
pub trait AutomationRepository: Send + Sync {
    async fn get_settings(&self) -> RepoResult<Option<AutomationSettings>>;
    async fn upsert_settings(&self, settings: &AutomationSettings) -> RepoResult<()>;
    async fn touch_generation_timestamp(&self, at: DateTime<Utc>) -> RepoResult<()>;
    async fn touch_scheduler_timestamp(&self, at: DateTime<Utc>) -> RepoResult<()>;

    async fn get_posting_window(&self) -> RepoResult<Option<PostingWindow>>;
    async fn upsert_posting_window(&self, window: &PostingWindow) -> RepoResult<()>;

    async fn list_themes(&self, only_active: bool) -> RepoResult<Vec<Theme>>;
    async fn theme_exists(&self, keyword: &str) -> RepoResult<bool>;
    async fn create_theme(&self, keyword: &str) -> RepoResult<Theme>;
    async fn set_theme_active(&self, id: i64, is_active: bool) -> RepoResult<Theme>;
    async fn count_themes(&self) -> RepoResult<i64>;
    async fn seed_themes(&self, keywords: &[String]) -> RepoResult<()>;

    /// `item_id`s sent successfully within `since..=now`.
    async fn recent_sent_item_ids(&self, since: DateTime<Utc>) -> RepoResult<HashSet<String>>;
    /// `item_id`s of suggestions still open (pending/approved/queued) created since `since`.
    async fn open_suggestion_item_ids(&self, since: DateTime<Utc>) -> RepoResult<HashSet<String>>;

    async fn insert_suggestion(&self, new: NewSuggestion) -> RepoResult<Suggestion>;
    async fn get_suggestion(&self, id: i64) -> RepoResult<Option<Suggestion>>;
    async fn list_suggestions(&self, status: Option<SuggestionStatus>, limit: i64) -> RepoResult<Vec<Suggestion>>;
    async fn update_suggestion(&self, suggestion: &Suggestion) -> RepoResult<()>;
    async fn count_suggestions_by_status(&self) -> RepoResult<HashMap<String, i64>>;

    async fn insert_queue_item(&self, new: NewQueueItem) -> RepoResult<QueueItem>;
    async fn due_queue_items(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<QueueItem>>;
    async fn update_queue_item(&self, item: &QueueItem) -> RepoResult<()>;
    async fn list_queue_items(&self, status: Option<QueueStatus>, limit: i64) -> RepoResult<Vec<QueueItem>>;
    async fn count_queue_items_by_status(&self) -> RepoResult<HashMap<String, i64>>;
    async fn latest_queue_scheduled_at(&self, chat_id: &str) -> RepoResult<Option<DateTime<Utc>>>;
    async fn count_queue_items_in_range(
        &self,
        chat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<i64>;

    async fn insert_post_history(&self, new: NewPostHistoryEntry) -> RepoResult<PostHistoryEntry>;
    async fn latest_post_history_sent_at(&self, chat_id: &str) -> RepoResult<Option<DateTime<Utc>>>;
    async fn count_post_history_in_range(
        &self,
        chat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<i64>;
    async fn list_post_history(&self, limit: i64) -> RepoResult<Vec<PostHistoryEntry>>;
}
