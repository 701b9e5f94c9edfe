//! Computes the next legal send instant for a chat: inside the posting
//! window, spaced from the latest queued/sent item, and under the daily cap.

use chrono::{DateTime, Duration, Utc};

use crate::domain::PostingWindow;
use crate::error::EngineError;
use crate::repository::AutomationRepository;
use crate::time;

const MIN_SPACING_SECONDS: i64 = 180;
const DEFAULT_SPACING_SECONDS: i64 = 1800;

/// `max(180s, window_duration / max(1, daily_target))`; falls back to 1800s
/// when no window is configured (callers should not normally hit that path
/// since `next_send_at` requires an active window up front).
pub fn spacing_seconds(window: Option<&PostingWindow>, daily_post_target: i64) -> i64 {
    let Some(window) = window else {
        return DEFAULT_SPACING_SECONDS;
    };
    let duration = time::window_duration_seconds(window.start_time, window.end_time);
    let target = daily_post_target.max(1);
    (duration / target).max(MIN_SPACING_SECONDS)
}

/// Sent-plus-queued count for the day containing `reference`. Used by
/// `next_send_at` to decide whether scheduling another item would push the
/// day over its cap.
pub async fn daily_counts(
    repo: &dyn AutomationRepository,
    chat_id: &str,
    reference: DateTime<Utc>,
    window: &PostingWindow,
    timezone: chrono_tz::Tz,
) -> Result<i64, EngineError> {
    let (day_start, day_end) = time::window_bounds_for_day(reference, timezone, window.start_time, window.end_time);
    let sent = repo.count_post_history_in_range(chat_id, day_start, day_end).await?;
    let queued = repo.count_queue_items_in_range(chat_id, day_start, day_end).await?;
    Ok(sent + queued)
}

/// Sent-only count for the day containing `reference`. Used by the
/// dispatcher's pre-send recheck, which must not bounce an item just
/// because the day's queue is already full up to the cap — only an
/// already-sent count at the limit should defer it.
pub async fn sent_count(
    repo: &dyn AutomationRepository,
    chat_id: &str,
    reference: DateTime<Utc>,
    window: &PostingWindow,
    timezone: chrono_tz::Tz,
) -> Result<i64, EngineError> {
    let (day_start, day_end) = time::window_bounds_for_day(reference, timezone, window.start_time, window.end_time);
    Ok(repo.count_post_history_in_range(chat_id, day_start, day_end).await?)
}

pub async fn next_send_at(
    repo: &dyn AutomationRepository,
    chat_id: &str,
    window: Option<&PostingWindow>,
    timezone: chrono_tz::Tz,
    daily_post_target: i64,
    daily_post_limit: i64,
    reference: DateTime<Utc>,
) -> Result<DateTime<Utc>, EngineError> {
    let window = window.filter(|w| w.is_active).ok_or(EngineError::PostingWindowMissing)?;

    let spacing = spacing_seconds(Some(window), daily_post_target);

    let mut candidate = time::next_window_start(reference, timezone, window.start_time, window.end_time);

    if let Some(latest_queue) = repo.latest_queue_scheduled_at(chat_id).await? {
        candidate = candidate.max(latest_queue + Duration::seconds(spacing));
    }
    if let Some(latest_history) = repo.latest_post_history_sent_at(chat_id).await? {
        candidate = candidate.max(latest_history + Duration::seconds(spacing));
    }

    let (_, today_end) = time::window_bounds_for_day(candidate, timezone, window.start_time, window.end_time);
    if candidate > today_end {
        candidate = time::next_window_start(candidate, timezone, window.start_time, window.end_time);
    }

    let used = daily_counts(repo, chat_id, candidate, window, timezone).await?;
    if used >= daily_post_limit {
        let tomorrow = candidate + Duration::days(1);
        candidate = time::next_window_start(tomorrow, timezone, window.start_time, window.end_time);
    }

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ClockTime;

    fn window(start: &str, end: &str) -> PostingWindow {
        PostingWindow { start_time: ClockTime::parse(start).unwrap(), end_time: ClockTime::parse(end).unwrap(), is_active: true }
    }

    #[test]
    fn spacing_matches_scenario_s1() {
        let w = window("09:00", "22:00");
        // (13h * 3600) / 10 = 4680
        assert_eq!(spacing_seconds(Some(&w), 10), 4680);
    }

    #[test]
    fn spacing_floors_at_minimum() {
        let w = window("09:00", "09:01");
        assert_eq!(spacing_seconds(Some(&w), 1000), MIN_SPACING_SECONDS);
    }

    #[test]
    fn spacing_defaults_without_window() {
        assert_eq!(spacing_seconds(None, 10), DEFAULT_SPACING_SECONDS);
    }
}
