use chrono::{DateTime, Utc};

/// The single settings row (`id = 1`). Created by bootstrap; read on every
/// tick and every approval, mutated by admin updates and by the tick driver.
#[derive(Clone, Debug)]
pub struct AutomationSettings {
    pub automation_enabled: bool,
    pub timezone: String,
    pub target_group_id: Option<String>,
    pub target_group_name: Option<String>,
    pub daily_post_target: i64,
    pub daily_post_limit: i64,
    pub price_prefix: String,
    pub message_template: String,
    pub last_suggestion_generation_at: Option<DateTime<Utc>>,
    pub last_scheduler_run_at: Option<DateTime<Utc>>,
}

impl AutomationSettings {
    pub fn next_suggested_generation_at(&self, interval_minutes: i64) -> Option<DateTime<Utc>> {
        self.last_suggestion_generation_at
            .map(|at| at + chrono::Duration::minutes(interval_minutes))
    }
}
