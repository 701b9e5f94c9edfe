//! Computes the set of `item_id`s a generation run must not re-suggest.

use std::collections::HashSet;

use chrono::{Duration, Utc};

use crate::error::EngineError;
use crate::repository::AutomationRepository;

#[derive(Debug, Default)]
pub struct ForbiddenItems {
    pub recent_sent: HashSet<String>,
    pub open_suggestions: HashSet<String>,
}

impl ForbiddenItems {
    pub fn contains(&self, item_id: &str) -> bool {
        self.recent_sent.contains(item_id) || self.open_suggestions.contains(item_id)
    }

    pub fn mark_open(&mut self, item_id: String) {
        self.open_suggestions.insert(item_id);
    }
}

pub async fn forbidden_items(repo: &dyn AutomationRepository, dedup_days: i64) -> Result<ForbiddenItems, EngineError> {
    let since = Utc::now() - Duration::days(dedup_days);
    let recent_sent = repo.recent_sent_item_ids(since).await?;
    let open_suggestions = repo.open_suggestion_item_ids(since).await?;
    Ok(ForbiddenItems { recent_sent, open_suggestions })
}
