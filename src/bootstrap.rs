//! Idempotent seeding of the settings row, posting window row, and default
//! themes. Called once at startup and again at the top of every tick so the
//! engine tolerates an empty database at any point.

use chrono::Utc;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{AutomationSettings, PostingWindow};
use crate::error::EngineError;
use crate::repository::AutomationRepository;

pub async fn ensure_defaults(repo: &dyn AutomationRepository, cfg: &AppConfig) -> Result<(), EngineError> {
    if repo.get_settings().await?.is_none() {
        let settings = AutomationSettings {
            automation_enabled: cfg.automation_enabled,
            timezone: cfg.timezone.clone(),
            target_group_id: Some(cfg.default_group_id.clone()).filter(|s| !s.is_empty()),
            target_group_name: Some(cfg.default_group_name.clone()),
            daily_post_target: cfg.default_daily_target,
            daily_post_limit: cfg.default_daily_limit,
            price_prefix: cfg.default_price_prefix.clone(),
            message_template: cfg.default_message_template.clone(),
            last_suggestion_generation_at: None,
            last_scheduler_run_at: None,
        };
        repo.upsert_settings(&settings).await?;
        info!("seeded default automation settings");
    }

    if repo.get_posting_window().await?.is_none() {
        let window = PostingWindow { start_time: cfg.default_start_time, end_time: cfg.default_end_time, is_active: true };
        repo.upsert_posting_window(&window).await?;
        info!("seeded default posting window");
    }

    if repo.count_themes().await? == 0 {
        repo.seed_themes(&cfg.default_theme_keywords).await?;
        info!(count = cfg.default_theme_keywords.len(), "seeded default themes");
    }

    let _ = Utc::now();
    Ok(())
}
