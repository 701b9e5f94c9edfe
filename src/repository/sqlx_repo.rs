use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{AnyPool, Row};

use crate::domain::{
    ApprovedAction, AutomationSettings, PostHistoryEntry, PostingWindow, QueueItem, QueueStatus, Suggestion,
    SuggestionStatus, Theme,
};
use crate::error::RepositoryError;
use crate::time::ClockTime;

use super::{AutomationRepository, NewPostHistoryEntry, NewQueueItem, NewSuggestion, RepoResult};

/// `sqlx`-backed implementation of `AutomationRepository`, responsible only
/// for persistence and row mapping. `AnyPool` lets the same query set run
/// against sqlite (tests, local dev) and postgres (production).
pub struct SqlxAutomationRepository {
    pool: AnyPool,
}

impl SqlxAutomationRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

fn bool_to_i64(b: bool) -> i64 {
    if b { 1 } else { 0 }
}

fn row_bool(row: &sqlx::any::AnyRow, col: &str) -> Result<bool, RepositoryError> {
    let raw: i64 = row.try_get(col)?;
    Ok(raw != 0)
}

fn row_to_settings(row: &sqlx::any::AnyRow) -> Result<AutomationSettings, RepositoryError> {
    Ok(AutomationSettings {
        automation_enabled: row_bool(row, "automation_enabled")?,
        timezone: row.try_get("timezone")?,
        target_group_id: row.try_get("target_group_id")?,
        target_group_name: row.try_get("target_group_name")?,
        daily_post_target: row.try_get("daily_post_target")?,
        daily_post_limit: row.try_get("daily_post_limit")?,
        price_prefix: row.try_get("price_prefix")?,
        message_template: row.try_get("message_template")?,
        last_suggestion_generation_at: row.try_get("last_suggestion_generation_at")?,
        last_scheduler_run_at: row.try_get("last_scheduler_run_at")?,
    })
}

fn row_to_window(row: &sqlx::any::AnyRow) -> Result<PostingWindow, RepositoryError> {
    let start_raw: String = row.try_get("start_time")?;
    let end_raw: String = row.try_get("end_time")?;
    let start_time = ClockTime::parse(&start_raw).map_err(|_| RepositoryError::NotFound("posting window".into()))?;
    let end_time = ClockTime::parse(&end_raw).map_err(|_| RepositoryError::NotFound("posting window".into()))?;
    Ok(PostingWindow { start_time, end_time, is_active: row_bool(row, "is_active")? })
}

fn row_to_theme(row: &sqlx::any::AnyRow) -> Result<Theme, RepositoryError> {
    Ok(Theme { id: row.try_get("id")?, keyword: row.try_get("keyword")?, is_active: row_bool(row, "is_active")? })
}

fn row_to_suggestion(row: &sqlx::any::AnyRow) -> Result<Suggestion, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = SuggestionStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::NotFound(format!("unknown suggestion status: {status_raw}")))?;
    let approved_action: Option<String> = row.try_get("approved_action")?;
    let raw_payload_text: String = row.try_get("raw_payload")?;
    let raw_payload = serde_json::from_str(&raw_payload_text).unwrap_or(serde_json::Value::Null);

    Ok(Suggestion {
        id: row.try_get("id")?,
        source_keyword: row.try_get("source_keyword")?,
        item_id: row.try_get("item_id")?,
        shop_id: row.try_get("shop_id")?,
        product_name: row.try_get("product_name")?,
        image_url: row.try_get("image_url")?,
        price_min: row.try_get("price_min")?,
        price_max: row.try_get("price_max")?,
        formatted_price: row.try_get("formatted_price")?,
        product_link: row.try_get("product_link")?,
        offer_link: row.try_get("offer_link")?,
        short_link: row.try_get("short_link")?,
        commission_rate: row.try_get("commission_rate")?,
        rating_star: row.try_get("rating_star")?,
        sales: row.try_get("sales")?,
        score: row.try_get("score")?,
        status,
        approved_action: approved_action.and_then(|a| ApprovedAction::parse(&a)),
        rejection_reason: row.try_get("rejection_reason")?,
        queue_scheduled_for: row.try_get("queue_scheduled_for")?,
        last_error: row.try_get("last_error")?,
        raw_payload,
        created_at: row.try_get("created_at")?,
        approved_at: row.try_get("approved_at")?,
        sent_at: row.try_get("sent_at")?,
    })
}

fn row_to_queue_item(row: &sqlx::any::AnyRow) -> Result<QueueItem, RepositoryError> {
    let status_raw: String = row.try_get("status")?;
    let status = QueueStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::NotFound(format!("unknown queue status: {status_raw}")))?;
    Ok(QueueItem {
        id: row.try_get("id")?,
        suggestion_id: row.try_get("suggestion_id")?,
        chat_id: row.try_get("chat_id")?,
        scheduled_at: row.try_get("scheduled_at")?,
        status,
        message_text: row.try_get("message_text")?,
        attempts: row.try_get("attempts")?,
        wa_message_id: row.try_get("wa_message_id")?,
        last_error: row.try_get("last_error")?,
        sent_at: row.try_get("sent_at")?,
    })
}

fn row_to_history(row: &sqlx::any::AnyRow) -> Result<PostHistoryEntry, RepositoryError> {
    Ok(PostHistoryEntry {
        id: row.try_get("id")?,
        suggestion_id: row.try_get("suggestion_id")?,
        item_id: row.try_get("item_id")?,
        shop_id: row.try_get("shop_id")?,
        chat_id: row.try_get("chat_id")?,
        product_name: row.try_get("product_name")?,
        message_text: row.try_get("message_text")?,
        short_link: row.try_get("short_link")?,
        wa_message_id: row.try_get("wa_message_id")?,
        sent_at: row.try_get("sent_at")?,
    })
}

#[async_trait]
impl AutomationRepository for SqlxAutomationRepository {
    async fn get_settings(&self) -> RepoResult<Option<AutomationSettings>> {
        let row = sqlx::query("SELECT * FROM automation_settings WHERE id = 1").fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_settings).transpose()
    }

    async fn upsert_settings(&self, s: &AutomationSettings) -> RepoResult<()> {
        sqlx::query(
            r#"
INSERT INTO automation_settings
  (id, automation_enabled, timezone, target_group_id, target_group_name,
   daily_post_target, daily_post_limit, price_prefix, message_template,
   last_suggestion_generation_at, last_scheduler_run_at)
VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
  automation_enabled = excluded.automation_enabled,
  timezone = excluded.timezone,
  target_group_id = excluded.target_group_id,
  target_group_name = excluded.target_group_name,
  daily_post_target = excluded.daily_post_target,
  daily_post_limit = excluded.daily_post_limit,
  price_prefix = excluded.price_prefix,
  message_template = excluded.message_template,
  last_suggestion_generation_at = excluded.last_suggestion_generation_at,
  last_scheduler_run_at = excluded.last_scheduler_run_at
"#,
        )
        .bind(bool_to_i64(s.automation_enabled))
        .bind(&s.timezone)
        .bind(&s.target_group_id)
        .bind(&s.target_group_name)
        .bind(s.daily_post_target)
        .bind(s.daily_post_limit)
        .bind(&s.price_prefix)
        .bind(&s.message_template)
        .bind(s.last_suggestion_generation_at)
        .bind(s.last_scheduler_run_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch_generation_timestamp(&self, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query("UPDATE automation_settings SET last_suggestion_generation_at = ? WHERE id = 1")
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn touch_scheduler_timestamp(&self, at: DateTime<Utc>) -> RepoResult<()> {
        sqlx::query("UPDATE automation_settings SET last_scheduler_run_at = ? WHERE id = 1")
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_posting_window(&self) -> RepoResult<Option<PostingWindow>> {
        let row = sqlx::query("SELECT * FROM posting_windows WHERE id = 1").fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_window).transpose()
    }

    async fn upsert_posting_window(&self, w: &PostingWindow) -> RepoResult<()> {
        sqlx::query(
            r#"
INSERT INTO posting_windows (id, start_time, end_time, is_active)
VALUES (1, ?, ?, ?)
ON CONFLICT(id) DO UPDATE SET
  start_time = excluded.start_time,
  end_time = excluded.end_time,
  is_active = excluded.is_active
"#,
        )
        .bind(w.start_time.format())
        .bind(w.end_time.format())
        .bind(bool_to_i64(w.is_active))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_themes(&self, only_active: bool) -> RepoResult<Vec<Theme>> {
        let rows = if only_active {
            sqlx::query("SELECT * FROM themes WHERE is_active = 1 ORDER BY id ASC").fetch_all(&self.pool).await?
        } else {
            sqlx::query("SELECT * FROM themes ORDER BY id ASC").fetch_all(&self.pool).await?
        };
        rows.iter().map(row_to_theme).collect()
    }

    async fn theme_exists(&self, keyword: &str) -> RepoResult<bool> {
        let row = sqlx::query("SELECT COUNT(*) AS c FROM themes WHERE LOWER(keyword) = LOWER(?)")
            .bind(keyword)
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("c")?;
        Ok(count > 0)
    }

    async fn create_theme(&self, keyword: &str) -> RepoResult<Theme> {
        let row = sqlx::query("INSERT INTO themes (keyword, is_active) VALUES (?, 1) RETURNING *")
            .bind(keyword)
            .fetch_one(&self.pool)
            .await?;
        row_to_theme(&row)
    }

    async fn set_theme_active(&self, id: i64, is_active: bool) -> RepoResult<Theme> {
        let row = sqlx::query("UPDATE themes SET is_active = ? WHERE id = ? RETURNING *")
            .bind(bool_to_i64(is_active))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("theme {id}")))?;
        row_to_theme(&row)
    }

    async fn count_themes(&self) -> RepoResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS c FROM themes").fetch_one(&self.pool).await?;
        Ok(row.try_get("c")?)
    }

    async fn seed_themes(&self, keywords: &[String]) -> RepoResult<()> {
        for keyword in keywords {
            sqlx::query("INSERT INTO themes (keyword, is_active) VALUES (?, 1)").bind(keyword).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn recent_sent_item_ids(&self, since: DateTime<Utc>) -> RepoResult<HashSet<String>> {
        let rows = sqlx::query("SELECT DISTINCT item_id FROM post_history WHERE status = 'sent' AND sent_at >= ?")
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        let mut out = HashSet::new();
        for row in rows {
            out.insert(row.try_get::<String, _>("item_id")?);
        }
        Ok(out)
    }

    async fn open_suggestion_item_ids(&self, since: DateTime<Utc>) -> RepoResult<HashSet<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT item_id FROM suggestions WHERE status IN ('pending','approved','queued') AND created_at >= ?",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        let mut out = HashSet::new();
        for row in rows {
            out.insert(row.try_get::<String, _>("item_id")?);
        }
        Ok(out)
    }

    async fn insert_suggestion(&self, new: NewSuggestion) -> RepoResult<Suggestion> {
        let now = Utc::now();
        let raw_payload_text = new.raw_payload.to_string();
        let row = sqlx::query(
            r#"
INSERT INTO suggestions
  (source_keyword, item_id, shop_id, product_name, image_url, price_min, price_max,
   formatted_price, product_link, offer_link, short_link, commission_rate, rating_star,
   sales, score, status, approved_action, rejection_reason, queue_scheduled_for,
   last_error, raw_payload, created_at, approved_at, sent_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, 'pending', NULL, NULL, NULL, NULL, ?, ?, NULL, NULL)
RETURNING *
"#,
        )
        .bind(&new.source_keyword)
        .bind(&new.item_id)
        .bind(&new.shop_id)
        .bind(&new.product_name)
        .bind(&new.image_url)
        .bind(&new.price_min)
        .bind(&new.price_max)
        .bind(&new.formatted_price)
        .bind(&new.product_link)
        .bind(&new.offer_link)
        .bind(new.commission_rate)
        .bind(new.rating_star)
        .bind(new.sales)
        .bind(new.score)
        .bind(raw_payload_text)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        row_to_suggestion(&row)
    }

    async fn get_suggestion(&self, id: i64) -> RepoResult<Option<Suggestion>> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE id = ?").bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_suggestion).transpose()
    }

    async fn list_suggestions(&self, status: Option<SuggestionStatus>, limit: i64) -> RepoResult<Vec<Suggestion>> {
        let rows = match status {
            Some(s) => sqlx::query("SELECT * FROM suggestions WHERE status = ? ORDER BY id DESC LIMIT ?")
                .bind(s.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?,
            None => {
                sqlx::query("SELECT * FROM suggestions ORDER BY id DESC LIMIT ?").bind(limit).fetch_all(&self.pool).await?
            }
        };
        rows.iter().map(row_to_suggestion).collect()
    }

    async fn update_suggestion(&self, s: &Suggestion) -> RepoResult<()> {
        sqlx::query(
            r#"
UPDATE suggestions SET
  formatted_price = ?, short_link = ?, score = ?, status = ?, approved_action = ?,
  rejection_reason = ?, queue_scheduled_for = ?, last_error = ?, approved_at = ?, sent_at = ?
WHERE id = ?
"#,
        )
        .bind(&s.formatted_price)
        .bind(&s.short_link)
        .bind(s.score)
        .bind(s.status.as_str())
        .bind(s.approved_action.map(|a| a.as_str()))
        .bind(&s.rejection_reason)
        .bind(s.queue_scheduled_for)
        .bind(&s.last_error)
        .bind(s.approved_at)
        .bind(s.sent_at)
        .bind(s.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_suggestions_by_status(&self) -> RepoResult<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS c FROM suggestions GROUP BY status").fetch_all(&self.pool).await?;
        let mut out = HashMap::new();
        for row in rows {
            out.insert(row.try_get::<String, _>("status")?, row.try_get::<i64, _>("c")?);
        }
        Ok(out)
    }

    async fn insert_queue_item(&self, new: NewQueueItem) -> RepoResult<QueueItem> {
        let row = sqlx::query(
            r#"
INSERT INTO queue_items (suggestion_id, chat_id, scheduled_at, status, message_text, attempts, wa_message_id, last_error, sent_at)
VALUES (?, ?, ?, 'queued', ?, 0, NULL, NULL, NULL)
RETURNING *
"#,
        )
        .bind(new.suggestion_id)
        .bind(&new.chat_id)
        .bind(new.scheduled_at)
        .bind(&new.message_text)
        .fetch_one(&self.pool)
        .await?;
        row_to_queue_item(&row)
    }

    async fn due_queue_items(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<QueueItem>> {
        let rows = sqlx::query(
            "SELECT * FROM queue_items WHERE status = 'queued' AND scheduled_at <= ? ORDER BY scheduled_at ASC, id ASC LIMIT ?",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_queue_item).collect()
    }

    async fn update_queue_item(&self, item: &QueueItem) -> RepoResult<()> {
        sqlx::query(
            r#"
UPDATE queue_items SET
  scheduled_at = ?, status = ?, attempts = ?, wa_message_id = ?, last_error = ?, sent_at = ?
WHERE id = ?
"#,
        )
        .bind(item.scheduled_at)
        .bind(item.status.as_str())
        .bind(item.attempts)
        .bind(&item.wa_message_id)
        .bind(&item.last_error)
        .bind(item.sent_at)
        .bind(item.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_queue_items(&self, status: Option<QueueStatus>, limit: i64) -> RepoResult<Vec<QueueItem>> {
        let rows = match status {
            Some(s) => sqlx::query("SELECT * FROM queue_items WHERE status = ? ORDER BY scheduled_at DESC LIMIT ?")
                .bind(s.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?,
            None => {
                sqlx::query("SELECT * FROM queue_items ORDER BY scheduled_at DESC LIMIT ?").bind(limit).fetch_all(&self.pool).await?
            }
        };
        rows.iter().map(row_to_queue_item).collect()
    }

    async fn count_queue_items_by_status(&self) -> RepoResult<HashMap<String, i64>> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS c FROM queue_items GROUP BY status").fetch_all(&self.pool).await?;
        let mut out = HashMap::new();
        for row in rows {
            out.insert(row.try_get::<String, _>("status")?, row.try_get::<i64, _>("c")?);
        }
        Ok(out)
    }

    async fn latest_queue_scheduled_at(&self, chat_id: &str) -> RepoResult<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            "SELECT MAX(scheduled_at) AS latest FROM queue_items WHERE chat_id = ? AND status IN ('queued','sending','sent')",
        )
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("latest")?)
    }

    async fn count_queue_items_in_range(
        &self,
        chat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS c FROM queue_items WHERE chat_id = ? AND status IN ('queued','sending') AND scheduled_at >= ? AND scheduled_at < ?",
        )
        .bind(chat_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("c")?)
    }

    async fn insert_post_history(&self, new: NewPostHistoryEntry) -> RepoResult<PostHistoryEntry> {
        let row = sqlx::query(
            r#"
INSERT INTO post_history
  (suggestion_id, item_id, shop_id, chat_id, product_name, message_text, short_link, wa_message_id, status, sent_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'sent', ?)
RETURNING *
"#,
        )
        .bind(new.suggestion_id)
        .bind(&new.item_id)
        .bind(&new.shop_id)
        .bind(&new.chat_id)
        .bind(&new.product_name)
        .bind(&new.message_text)
        .bind(&new.short_link)
        .bind(&new.wa_message_id)
        .bind(new.sent_at)
        .fetch_one(&self.pool)
        .await?;
        row_to_history(&row)
    }

    async fn latest_post_history_sent_at(&self, chat_id: &str) -> RepoResult<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT MAX(sent_at) AS latest FROM post_history WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("latest")?)
    }

    async fn count_post_history_in_range(
        &self,
        chat_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepoResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS c FROM post_history WHERE chat_id = ? AND status = 'sent' AND sent_at >= ? AND sent_at < ?",
        )
        .bind(chat_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("c")?)
    }

    async fn list_post_history(&self, limit: i64) -> RepoResult<Vec<PostHistoryEntry>> {
        let rows = sqlx::query("SELECT * FROM post_history ORDER BY sent_at DESC LIMIT ?").bind(limit).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_history).collect()
    }
}
