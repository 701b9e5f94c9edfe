use std::sync::Arc;
use std::time::Duration;

use promoflow::catalog::ShopeeCatalogClient;
use promoflow::config::AppConfig;
use promoflow::db::Db;
use promoflow::engine::Engine;
use promoflow::logger::init_tracing;
use promoflow::messaging::WhatsAppMessagingClient;
use promoflow::repository::sqlx_repo::SqlxAutomationRepository;
use promoflow::scheduler::tick::spawn_tick_loop;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqlx::any::install_default_drivers();

    let is_production = std::env::var("APP_ENV").unwrap_or_default() == "production";
    init_tracing(is_production);

    tracing::info!("Starting promoflow automation engine...");

    let cfg = AppConfig::from_env()?;

    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;

    let repository = Arc::new(SqlxAutomationRepository::new((*db.pool).clone()));

    let catalog = Arc::new(ShopeeCatalogClient::new(
        cfg.shopee_api_base_url.clone(),
        cfg.shopee_api_username.clone(),
        cfg.shopee_api_password.clone(),
        Duration::from_secs_f64(cfg.shopee_api_timeout_seconds),
    )?);

    let messaging = Arc::new(WhatsAppMessagingClient::new(
        cfg.wa_api_base_url.clone(),
        cfg.wa_api_key.clone(),
        Duration::from_secs_f64(cfg.wa_api_timeout_seconds),
    )?);

    let tick_seconds = cfg.tick_seconds;
    let engine = Arc::new(Engine::new(cfg, repository, catalog, messaging));
    engine.ensure_defaults().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tick_handle = spawn_tick_loop(engine.clone(), tick_seconds, shutdown_rx);

    tracing::info!("Engine started; waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    shutdown_tx.send(true).ok();
    tick_handle.await?;

    Ok(())
}
