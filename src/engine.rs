//! The engine ties configuration, persistence, and the two external
//! collaborators together into one constructible unit. Every public
//! operation and the tick driver take `&Engine`, replacing the module-level
//! cached singletons the original service used.

use std::sync::Arc;

use crate::approval;
use crate::bootstrap;
use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::dispatcher::{self, DispatchResult};
use crate::domain::{QueueItem, QueueStatus, Suggestion, SuggestionStatus, Theme};
use crate::error::EngineError;
use crate::generator::{self, GenerationOptions, GenerationResult};
use crate::messaging::MessagingClient;
use crate::repository::AutomationRepository;
use crate::status::{self, EngineStatus};

pub struct Engine {
    pub config: AppConfig,
    pub repository: Arc<dyn AutomationRepository>,
    pub catalog: Arc<dyn CatalogClient>,
    pub messaging: Arc<dyn MessagingClient>,
}

impl Engine {
    pub fn new(
        config: AppConfig,
        repository: Arc<dyn AutomationRepository>,
        catalog: Arc<dyn CatalogClient>,
        messaging: Arc<dyn MessagingClient>,
    ) -> Self {
        Self { config, repository, catalog, messaging }
    }

    pub async fn ensure_defaults(&self) -> Result<(), EngineError> {
        bootstrap::ensure_defaults(self.repository.as_ref(), &self.config).await
    }

    pub async fn list_themes(&self, only_active: bool) -> Result<Vec<Theme>, EngineError> {
        Ok(self.repository.list_themes(only_active).await?)
    }

    pub async fn create_theme(&self, keyword: &str) -> Result<Theme, EngineError> {
        if self.repository.theme_exists(keyword).await? {
            return Err(EngineError::ThemeExists { keyword: keyword.to_string() });
        }
        Ok(self.repository.create_theme(keyword).await?)
    }

    pub async fn set_theme_active(&self, id: i64, is_active: bool) -> Result<Theme, EngineError> {
        self.repository.set_theme_active(id, is_active).await.map_err(|e| match e {
            crate::error::RepositoryError::NotFound(_) => EngineError::ThemeNotFound { id },
            other => other.into(),
        })
    }

    pub async fn generate_suggestions(&self, opts: GenerationOptions) -> Result<GenerationResult, EngineError> {
        self.ensure_defaults().await?;
        generator::generate_suggestions(
            self.repository.as_ref(),
            self.catalog.as_ref(),
            self.config.suggestion_fetch_limit_per_theme,
            self.config.suggestion_max_per_run,
            self.config.product_dedup_days,
            opts,
        )
        .await
    }

    pub async fn list_suggestions(&self, status: Option<SuggestionStatus>, limit: i64) -> Result<Vec<Suggestion>, EngineError> {
        Ok(self.repository.list_suggestions(status, limit).await?)
    }

    pub async fn approve_schedule(&self, id: i64) -> Result<QueueItem, EngineError> {
        approval::approve_schedule(self.repository.as_ref(), self.catalog.as_ref(), id).await
    }

    pub async fn approve_send_now(&self, id: i64) -> Result<(), EngineError> {
        approval::approve_send_now(self.repository.as_ref(), self.catalog.as_ref(), self.messaging.as_ref(), id).await
    }

    pub async fn reject(&self, id: i64, reason: Option<String>) -> Result<(), EngineError> {
        approval::reject(self.repository.as_ref(), id, reason).await
    }

    pub async fn list_queue(&self, status: Option<QueueStatus>, limit: i64) -> Result<Vec<QueueItem>, EngineError> {
        Ok(self.repository.list_queue_items(status, limit).await?)
    }

    pub async fn list_history(&self, limit: i64) -> Result<Vec<crate::domain::PostHistoryEntry>, EngineError> {
        Ok(self.repository.list_post_history(limit).await?)
    }

    pub async fn status(&self) -> Result<EngineStatus, EngineError> {
        status::status(self.repository.as_ref(), self.messaging.as_ref(), &self.config).await
    }

    pub async fn run_dispatch(&self) -> Result<DispatchResult, EngineError> {
        let settings = self.repository.get_settings().await?.ok_or(EngineError::PostingWindowMissing)?;
        let timezone = crate::time::parse_timezone(&settings.timezone)?;
        dispatcher::run_dispatch(self.repository.as_ref(), self.messaging.as_ref(), timezone, settings.daily_post_limit).await
    }
}
