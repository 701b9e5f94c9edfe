//! Dispatcher behavior: readiness gating (S6) and failure bookkeeping (S7).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use uuid::Uuid;

use promoflow::db::schema;
use promoflow::dispatcher::run_dispatch;
use promoflow::domain::{PostingWindow, QueueStatus, SuggestionStatus};
use promoflow::error::MessagingError;
use promoflow::messaging::MessagingClient;
use promoflow::repository::sqlx_repo::SqlxAutomationRepository;
use promoflow::repository::{AutomationRepository, NewQueueItem, NewSuggestion};
use promoflow::time::ClockTime;

const CHAT: &str = "chat-1";

async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();
    let db_name = Uuid::new_v4().to_string();
    let conn = format!("sqlite:file:{db_name}?mode=memory&cache=shared");
    let pool = AnyPoolOptions::new().max_connections(5).connect(&conn).await.expect("connect sqlite memory db");
    schema::migrate(&pool).await.expect("migrate");
    pool
}

struct NotReadyMessaging;

#[async_trait]
impl MessagingClient for NotReadyMessaging {
    async fn session_is_ready(&self) -> Result<bool, MessagingError> {
        Ok(false)
    }
    async fn send_text(&self, _chat_id: &str, _text: &str) -> Result<Option<String>, MessagingError> {
        panic!("must not be called while not ready");
    }
}

struct FailingMessaging;

#[async_trait]
impl MessagingClient for FailingMessaging {
    async fn session_is_ready(&self) -> Result<bool, MessagingError> {
        Ok(true)
    }
    async fn send_text(&self, _chat_id: &str, _text: &str) -> Result<Option<String>, MessagingError> {
        Err(MessagingError::HttpError { status: 502, message: "upstream down".to_string() })
    }
}

async fn seed_pending_queue_item(repo: &SqlxAutomationRepository) -> i64 {
    let suggestion = repo
        .insert_suggestion(NewSuggestion {
            source_keyword: "iphone".to_string(),
            item_id: "item-1".to_string(),
            shop_id: None,
            product_name: "iPhone".to_string(),
            image_url: None,
            price_min: None,
            price_max: None,
            formatted_price: Some("4.999,00".to_string()),
            product_link: Some("https://shop.example/1".to_string()),
            offer_link: None,
            commission_rate: None,
            rating_star: None,
            sales: None,
            score: 10.0,
            raw_payload: serde_json::Value::Null,
        })
        .await
        .unwrap();

    repo.insert_queue_item(NewQueueItem {
        suggestion_id: suggestion.id,
        chat_id: CHAT.to_string(),
        scheduled_at: Utc::now() - chrono::Duration::minutes(1),
        message_text: "hello".to_string(),
    })
    .await
    .unwrap();

    suggestion.id
}

#[tokio::test]
async fn s6_skips_dispatch_when_session_not_ready() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    let w = PostingWindow { start_time: ClockTime::parse("00:00").unwrap(), end_time: ClockTime::parse("23:59").unwrap(), is_active: true };
    repo.upsert_posting_window(&w).await.unwrap();
    seed_pending_queue_item(&repo).await;

    let messaging = NotReadyMessaging;
    let tz: chrono_tz::Tz = "UTC".parse().unwrap();
    let result = run_dispatch(&repo, &messaging, tz, 15).await.unwrap();

    assert!(result.skipped_not_ready);
    assert_eq!(result.sent, 0);

    let items = repo.list_queue_items(Some(QueueStatus::Queued), 10).await.unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn s7_upstream_error_marks_item_and_suggestion_failed() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    let w = PostingWindow { start_time: ClockTime::parse("00:00").unwrap(), end_time: ClockTime::parse("23:59").unwrap(), is_active: true };
    repo.upsert_posting_window(&w).await.unwrap();
    let suggestion_id = seed_pending_queue_item(&repo).await;

    let messaging = FailingMessaging;
    let tz: chrono_tz::Tz = "UTC".parse().unwrap();
    let result = run_dispatch(&repo, &messaging, tz, 15).await.unwrap();

    assert_eq!(result.failed, 1);

    let items = repo.list_queue_items(Some(QueueStatus::Failed), 10).await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].last_error.is_some());

    let suggestion = repo.get_suggestion(suggestion_id).await.unwrap().unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::Failed);

    let history = repo.list_post_history(10).await.unwrap();
    assert!(history.is_empty());
}
