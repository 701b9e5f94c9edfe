use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionStatus {
    Pending,
    Approved,
    Queued,
    Sent,
    Rejected,
    Failed,
}

impl SuggestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Queued => "queued",
            Self::Sent => "sent",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "queued" => Self::Queued,
            "sent" => Self::Sent,
            "rejected" => Self::Rejected,
            "failed" => Self::Failed,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovedAction {
    Schedule,
    SendNow,
}

impl ApprovedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::SendNow => "send_now",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "schedule" => Self::Schedule,
            "send_now" => Self::SendNow,
            _ => return None,
        })
    }
}

/// A candidate product surfaced by the generator, awaiting human
/// disposition. `raw_payload` keeps the original catalog node around for
/// debugging and re-rendering without a second upstream round-trip.
#[derive(Clone, Debug)]
pub struct Suggestion {
    pub id: i64,
    pub source_keyword: String,
    pub item_id: String,
    pub shop_id: Option<String>,
    pub product_name: String,
    pub image_url: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub formatted_price: Option<String>,
    pub product_link: Option<String>,
    pub offer_link: Option<String>,
    pub short_link: Option<String>,
    pub commission_rate: Option<f64>,
    pub rating_star: Option<f64>,
    pub sales: Option<f64>,
    pub score: f64,
    pub status: SuggestionStatus,
    pub approved_action: Option<ApprovedAction>,
    pub rejection_reason: Option<String>,
    pub queue_scheduled_for: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub fn is_pending(&self) -> bool {
        self.status == SuggestionStatus::Pending
    }
}
