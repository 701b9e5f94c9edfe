//! Approval coordinator transitions: schedule, reject, and the
//! not-pending/not-found guard rails.

use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use uuid::Uuid;

use promoflow::approval::{approve_schedule, reject};
use promoflow::catalog::{CatalogClient, ProductNode};
use promoflow::db::schema;
use promoflow::domain::{AutomationSettings, PostingWindow, SuggestionStatus};
use promoflow::error::CatalogError;
use promoflow::repository::sqlx_repo::SqlxAutomationRepository;
use promoflow::repository::{AutomationRepository, NewSuggestion};
use promoflow::time::ClockTime;

async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();
    let db_name = Uuid::new_v4().to_string();
    let conn = format!("sqlite:file:{db_name}?mode=memory&cache=shared");
    let pool = AnyPoolOptions::new().max_connections(5).connect(&conn).await.expect("connect sqlite memory db");
    schema::migrate(&pool).await.expect("migrate");
    pool
}

struct FakeCatalog;

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_products(&self, _keyword: &str, _limit: u32) -> Result<Vec<ProductNode>, CatalogError> {
        Ok(vec![])
    }
    async fn generate_short_link(&self, _origin_url: &str) -> Result<String, CatalogError> {
        Ok("https://short.link/x".to_string())
    }
}

async fn seed_settings_and_window(repo: &SqlxAutomationRepository) {
    repo.upsert_settings(&AutomationSettings {
        automation_enabled: true,
        timezone: "America/Sao_Paulo".to_string(),
        target_group_id: Some("group-1".to_string()),
        target_group_name: Some("Group".to_string()),
        daily_post_target: 10,
        daily_post_limit: 15,
        price_prefix: "R$".to_string(),
        message_template: "{productName} {formattedPrice} {shortLink}".to_string(),
        last_suggestion_generation_at: None,
        last_scheduler_run_at: None,
    })
    .await
    .unwrap();

    repo.upsert_posting_window(&PostingWindow {
        start_time: ClockTime::parse("09:00").unwrap(),
        end_time: ClockTime::parse("22:00").unwrap(),
        is_active: true,
    })
    .await
    .unwrap();
}

async fn seed_pending(repo: &SqlxAutomationRepository) -> i64 {
    repo.insert_suggestion(NewSuggestion {
        source_keyword: "iphone".to_string(),
        item_id: "item-1".to_string(),
        shop_id: None,
        product_name: "iPhone".to_string(),
        image_url: None,
        price_min: Some("199900".to_string()),
        price_max: None,
        formatted_price: None,
        product_link: Some("https://shop.example/1".to_string()),
        offer_link: None,
        commission_rate: None,
        rating_star: None,
        sales: None,
        score: 10.0,
        raw_payload: serde_json::Value::Null,
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn approve_schedule_creates_queue_item_and_transitions_suggestion() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    seed_settings_and_window(&repo).await;
    let id = seed_pending(&repo).await;

    let catalog = FakeCatalog;
    let queue_item = approve_schedule(&repo, &catalog, id).await.unwrap();

    assert_eq!(queue_item.suggestion_id, id);
    assert!(queue_item.message_text.contains("iPhone"));

    let suggestion = repo.get_suggestion(id).await.unwrap().unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::Queued);
    assert!(suggestion.queue_scheduled_for.is_some());
}

#[tokio::test]
async fn reject_sets_status_and_trims_reason() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    seed_settings_and_window(&repo).await;
    let id = seed_pending(&repo).await;

    reject(&repo, id, Some("  not relevant  ".to_string())).await.unwrap();

    let suggestion = repo.get_suggestion(id).await.unwrap().unwrap();
    assert_eq!(suggestion.status, SuggestionStatus::Rejected);
    assert_eq!(suggestion.rejection_reason.as_deref(), Some("not relevant"));
}

#[tokio::test]
async fn approving_twice_fails_not_pending() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    seed_settings_and_window(&repo).await;
    let id = seed_pending(&repo).await;

    let catalog = FakeCatalog;
    approve_schedule(&repo, &catalog, id).await.unwrap();
    let err = approve_schedule(&repo, &catalog, id).await.unwrap_err();
    assert_eq!(err.code(), "suggestion_not_pending");
}

#[tokio::test]
async fn unknown_suggestion_fails_not_found() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    seed_settings_and_window(&repo).await;

    let catalog = FakeCatalog;
    let err = approve_schedule(&repo, &catalog, 999).await.unwrap_err();
    assert_eq!(err.code(), "suggestion_not_found");
}
