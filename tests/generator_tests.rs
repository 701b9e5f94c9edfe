//! Generator dedup behavior (S5) and basic insertion against a fake catalog.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use uuid::Uuid;

use promoflow::catalog::{CatalogClient, ProductNode};
use promoflow::db::schema;
use promoflow::error::CatalogError;
use promoflow::generator::{GenerationOptions, generate_suggestions};
use promoflow::repository::sqlx_repo::SqlxAutomationRepository;
use promoflow::repository::{AutomationRepository, NewPostHistoryEntry};

async fn setup_db() -> AnyPool {
    sqlx::any::install_default_drivers();
    let db_name = Uuid::new_v4().to_string();
    let conn = format!("sqlite:file:{db_name}?mode=memory&cache=shared");
    let pool = AnyPoolOptions::new().max_connections(5).connect(&conn).await.expect("connect sqlite memory db");
    schema::migrate(&pool).await.expect("migrate");
    pool
}

struct FakeCatalog {
    nodes: Vec<ProductNode>,
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_products(&self, _keyword: &str, _limit: u32) -> Result<Vec<ProductNode>, CatalogError> {
        Ok(self.nodes.clone())
    }
    async fn generate_short_link(&self, _origin_url: &str) -> Result<String, CatalogError> {
        Ok("https://short.link/x".to_string())
    }
}

fn node(item_id: &str) -> ProductNode {
    ProductNode {
        item_id: item_id.to_string(),
        product_name: format!("Product {item_id}"),
        shop_id: None,
        image_url: None,
        price_min: Some("199900".to_string()),
        price_max: None,
        product_link: Some("https://shop.example/p".to_string()),
        offer_link: None,
        commission_rate: Some("0.1".to_string()),
        rating_star: Some("4.5".to_string()),
        sales: Some(800.0),
        price_discount_rate: Some(10.0),
    }
}

#[tokio::test]
async fn s5_skips_items_sent_within_dedup_window() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    repo.seed_themes(&["iphone".to_string()]).await.unwrap();

    repo.insert_post_history(NewPostHistoryEntry {
        suggestion_id: None,
        item_id: "42".to_string(),
        shop_id: None,
        chat_id: "chat-1".to_string(),
        product_name: "iPhone".to_string(),
        message_text: "x".to_string(),
        short_link: None,
        wa_message_id: None,
        sent_at: Utc::now() - chrono::Duration::days(3),
    })
    .await
    .unwrap();

    let catalog = FakeCatalog { nodes: vec![node("42")] };
    let result =
        generate_suggestions(&repo, &catalog, 12, 30, 7, GenerationOptions { only_active_themes: true, ..Default::default() })
            .await
            .unwrap();

    assert_eq!(result.inserted, 0);
    assert_eq!(result.skipped_duplicates, 1);
}

#[tokio::test]
async fn inserts_new_distinct_items() {
    let pool = setup_db().await;
    let repo = SqlxAutomationRepository::new(pool);
    repo.seed_themes(&["iphone".to_string()]).await.unwrap();

    let catalog = FakeCatalog { nodes: vec![node("1"), node("2")] };
    let result =
        generate_suggestions(&repo, &catalog, 12, 30, 7, GenerationOptions { only_active_themes: true, ..Default::default() })
            .await
            .unwrap();

    assert_eq!(result.inserted, 2);
    assert_eq!(result.skipped_duplicates, 0);
    assert!(result.suggestions.iter().all(|s| s.score > 0.0));
}
