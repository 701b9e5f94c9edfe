use chrono::{DateTime, Utc};

/// Append-only record of a successfully sent message. Source of truth for
/// the daily sent count and the dedup window.
#[derive(Clone, Debug)]
pub struct PostHistoryEntry {
    pub id: i64,
    pub suggestion_id: Option<i64>,
    pub item_id: String,
    pub shop_id: Option<String>,
    pub chat_id: String,
    pub product_name: String,
    pub message_text: String,
    pub short_link: Option<String>,
    pub wa_message_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}
