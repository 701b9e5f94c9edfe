use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueStatus {
    Queued,
    Sending,
    Sent,
    Failed,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "queued" => Self::Queued,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "failed" => Self::Failed,
            _ => return None,
        })
    }
}

/// A scheduled dispatch of one suggestion to one chat at one future instant.
/// `message_text` is rendered once at approval time and sent verbatim so the
/// admin's preview always matches what goes out.
#[derive(Clone, Debug)]
pub struct QueueItem {
    pub id: i64,
    pub suggestion_id: i64,
    pub chat_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: QueueStatus,
    pub message_text: String,
    pub attempts: i32,
    pub wa_message_id: Option<String>,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}
