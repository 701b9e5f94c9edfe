//! Suggestion generator: walks active themes, queries the upstream catalog,
//! filters duplicates, and persists new `pending` suggestions.

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::catalog::CatalogClient;
use crate::dedup::{self, ForbiddenItems};
use crate::domain::Suggestion;
use crate::error::EngineError;
use crate::pricing::format_price;
use crate::repository::{AutomationRepository, NewSuggestion};
use crate::scoring::{self, ScoreInputs};

#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub limit_per_theme: Option<u32>,
    pub max_new_suggestions: Option<u32>,
    pub only_active_themes: bool,
}

#[derive(Debug, Default)]
pub struct GenerationResult {
    pub inserted: u32,
    pub skipped_duplicates: u32,
    pub inspected: u32,
    pub suggestions: Vec<Suggestion>,
}

#[instrument(skip(repo, catalog, opts), fields(inserted = tracing::field::Empty))]
pub async fn generate_suggestions(
    repo: &dyn AutomationRepository,
    catalog: &dyn CatalogClient,
    default_limit_per_theme: u32,
    default_max_new: u32,
    dedup_days: i64,
    opts: GenerationOptions,
) -> Result<GenerationResult, EngineError> {
    let themes = repo.list_themes(opts.only_active_themes).await?;
    let mut forbidden: ForbiddenItems = dedup::forbidden_items(repo, dedup_days).await?;

    let limit_per_theme = opts.limit_per_theme.unwrap_or(default_limit_per_theme);
    let max_new = opts.max_new_suggestions.unwrap_or(default_max_new);

    let mut result = GenerationResult::default();

    'themes: for theme in themes {
        if result.inserted >= max_new {
            break;
        }

        let nodes = match catalog.search_products(&theme.keyword, limit_per_theme).await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(theme = %theme.keyword, error = %err, "catalog search failed for theme, continuing");
                continue;
            }
        };

        for node in nodes {
            result.inspected += 1;

            if node.item_id.trim().is_empty() || node.product_name.trim().is_empty() {
                continue;
            }
            if forbidden.contains(&node.item_id) {
                result.skipped_duplicates += 1;
                continue;
            }

            let commission_rate = node.commission_rate.as_deref().and_then(scoring::parse_lenient);
            let rating_star = node.rating_star.as_deref().and_then(scoring::parse_lenient);
            let score = scoring::score(ScoreInputs {
                commission_rate,
                rating_star,
                sales: node.sales,
                discount_rate: node.price_discount_rate,
            });
            let formatted_price = format_price(node.price_min.as_deref());

            let raw_payload = serde_json::to_value(&node).unwrap_or(serde_json::Value::Null);

            let new = NewSuggestion {
                source_keyword: theme.keyword.clone(),
                item_id: node.item_id.clone(),
                shop_id: node.shop_id.clone(),
                product_name: node.product_name.clone(),
                image_url: node.image_url.clone(),
                price_min: node.price_min.clone(),
                price_max: node.price_max.clone(),
                formatted_price,
                product_link: node.product_link.clone(),
                offer_link: node.offer_link.clone(),
                commission_rate,
                rating_star,
                sales: node.sales,
                score,
                raw_payload,
            };

            let suggestion = repo.insert_suggestion(new).await?;
            forbidden.mark_open(node.item_id.clone());
            result.inserted += 1;
            result.suggestions.push(suggestion);

            if result.inserted >= max_new {
                break 'themes;
            }
        }
    }

    repo.touch_generation_timestamp(Utc::now()).await?;

    info!(inserted = result.inserted, skipped = result.skipped_duplicates, inspected = result.inspected, "generation run complete");
    tracing::Span::current().record("inserted", result.inserted as u64);

    Ok(result)
}
