//! Message text substitution. Text is rendered once, at approval time, and
//! stored verbatim on the queue item so a later dispatch always matches what
//! the admin previewed.

use crate::catalog::CatalogClient;
use crate::domain::Suggestion;
use crate::error::EngineError;
use crate::pricing::format_price;

pub async fn render(
    template: &str,
    suggestion: &mut Suggestion,
    catalog: &dyn CatalogClient,
) -> Result<String, EngineError> {
    if suggestion.short_link.as_deref().unwrap_or("").is_empty() {
        let origin = suggestion
            .product_link
            .clone()
            .or_else(|| suggestion.offer_link.clone())
            .ok_or(EngineError::SuggestionMissingLinks { id: suggestion.id })?;
        let short_link = catalog.generate_short_link(&origin).await?;
        suggestion.short_link = Some(short_link);
    }

    let formatted_price = suggestion
        .formatted_price
        .clone()
        .or_else(|| format_price(suggestion.price_min.as_deref()))
        .or_else(|| suggestion.price_min.clone())
        .unwrap_or_else(|| "-".to_string());

    let text = template
        .replace("{productName}", &suggestion.product_name)
        .replace("{formattedPrice}", &formatted_price)
        .replace("{shortLink}", suggestion.short_link.as_deref().unwrap_or(""));

    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FakeCatalog;

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn search_products(&self, _keyword: &str, _limit: u32) -> Result<Vec<crate::catalog::ProductNode>, crate::error::CatalogError> {
            Ok(vec![])
        }
        async fn generate_short_link(&self, _origin_url: &str) -> Result<String, crate::error::CatalogError> {
            Ok("https://short.link/abc".to_string())
        }
    }

    fn base_suggestion() -> Suggestion {
        Suggestion {
            id: 1,
            source_keyword: "iphone".into(),
            item_id: "item-1".into(),
            shop_id: None,
            product_name: "iPhone 15".into(),
            image_url: None,
            price_min: Some("499900".into()),
            price_max: None,
            formatted_price: None,
            product_link: Some("https://shop.example/item-1".into()),
            offer_link: None,
            short_link: None,
            commission_rate: None,
            rating_star: None,
            sales: None,
            score: 0.0,
            status: crate::domain::SuggestionStatus::Pending,
            approved_action: None,
            rejection_reason: None,
            queue_scheduled_for: None,
            last_error: None,
            raw_payload: serde_json::Value::Null,
            created_at: Utc::now(),
            approved_at: None,
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn substitutes_all_placeholders() {
        let mut s = base_suggestion();
        let catalog = FakeCatalog;
        let text = render("{productName} - R$ {formattedPrice} - {shortLink}", &mut s, &catalog).await.unwrap();
        assert_eq!(text, "iPhone 15 - R$ 4.999,00 - https://short.link/abc");
        assert_eq!(s.short_link.as_deref(), Some("https://short.link/abc"));
    }

    #[tokio::test]
    async fn missing_links_is_an_error() {
        let mut s = base_suggestion();
        s.product_link = None;
        s.offer_link = None;
        let catalog = FakeCatalog;
        let err = render("{productName}", &mut s, &catalog).await.unwrap_err();
        assert_eq!(err.code(), "suggestion_missing_links");
    }
}
