//! Clock and timezone helpers.
//!
//! Every stored timestamp is UTC. Only window and daily-cap boundaries need a
//! local calendar day, so the IANA lookup lives entirely in this module —
//! nothing else in the crate should call `chrono_tz` directly.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::EngineError;

/// Wall-clock time of day, `HH:MM`, 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let (h, m) = raw
            .split_once(':')
            .ok_or_else(|| EngineError::validation(format!("time must be HH:MM: {raw}")))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| EngineError::validation(format!("time must be HH:MM: {raw}")))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| EngineError::validation(format!("time must be HH:MM: {raw}")))?;
        if hour > 23 || minute > 59 {
            return Err(EngineError::validation(format!("time must be HH:MM: {raw}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn to_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).expect("validated range")
    }

    pub fn format(self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn parse_timezone(name: &str) -> Result<Tz, EngineError> {
    name.parse::<Tz>()
        .map_err(|_| EngineError::InvalidTimezone { name: name.to_string() })
}

/// The `[start, end)` bounds of the posting window on the local calendar day
/// containing `instant`, expressed back in UTC. Handles windows that cross
/// local midnight by pushing `end` onto the following day.
pub fn window_bounds_for_day(
    instant: DateTime<Utc>,
    tz: Tz,
    start: ClockTime,
    end: ClockTime,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_date = instant.with_timezone(&tz).date_naive();
    window_bounds_for_local_date(local_date, tz, start, end)
}

pub fn window_bounds_for_local_date(
    local_date: NaiveDate,
    tz: Tz,
    start: ClockTime,
    end: ClockTime,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_naive = local_date.and_time(start.to_naive());
    let mut end_date = local_date;
    if end.to_naive() <= start.to_naive() {
        end_date = local_date.succ_opt().expect("date not at range end");
    }
    let end_naive = end_date.and_time(end.to_naive());

    let start_local = tz
        .from_local_datetime(&start_naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&start_naive));
    let end_local = tz
        .from_local_datetime(&end_naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&end_naive));

    (start_local.with_timezone(&Utc), end_local.with_timezone(&Utc))
}

/// Window length in seconds, floored at 300s, after the midnight-wrap
/// adjustment — used as the numerator of the spacing formula.
pub fn window_duration_seconds(start: ClockTime, end: ClockTime) -> i64 {
    let start_secs = i64::from(start.hour) * 3600 + i64::from(start.minute) * 60;
    let mut end_secs = i64::from(end.hour) * 3600 + i64::from(end.minute) * 60;
    if end_secs <= start_secs {
        end_secs += 24 * 3600;
    }
    (end_secs - start_secs).max(300)
}

/// Earliest instant at or after `from` that falls inside some day's posting
/// window (today's window if `from` precedes or sits inside it, otherwise
/// tomorrow's).
pub fn next_window_start(from: DateTime<Utc>, tz: Tz, start: ClockTime, end: ClockTime) -> DateTime<Utc> {
    let (today_start, today_end) = window_bounds_for_day(from, tz, start, end);
    if from < today_start {
        return today_start;
    }
    if from <= today_end {
        return from;
    }
    let local_date = from.with_timezone(&tz).date_naive();
    let next_date = local_date.succ_opt().expect("date not at range end");
    let (next_start, _) = window_bounds_for_local_date(next_date, tz, start, end);
    next_start
}

pub fn add_seconds(instant: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    instant + Duration::seconds(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> Tz {
        "America/Sao_Paulo".parse().unwrap()
    }

    #[test]
    fn parses_valid_hhmm() {
        let t = ClockTime::parse("09:05").unwrap();
        assert_eq!(t.hour, 9);
        assert_eq!(t.minute, 5);
        assert_eq!(t.format(), "09:05");
    }

    #[test]
    fn rejects_malformed_hhmm() {
        assert!(ClockTime::parse("9:5").is_ok()); // single digits still parse fine
        assert!(ClockTime::parse("25:00").is_err());
        assert!(ClockTime::parse("noon").is_err());
    }

    #[test]
    fn window_duration_handles_wraparound() {
        let start = ClockTime::parse("22:00").unwrap();
        let end = ClockTime::parse("02:00").unwrap();
        assert_eq!(window_duration_seconds(start, end), 4 * 3600);
    }

    #[test]
    fn window_duration_is_floored() {
        let start = ClockTime::parse("09:00").unwrap();
        let end = ClockTime::parse("09:02").unwrap();
        assert_eq!(window_duration_seconds(start, end), 300);
    }

    #[test]
    fn next_window_start_before_today_snaps_to_today() {
        let start = ClockTime::parse("09:00").unwrap();
        let end = ClockTime::parse("22:00").unwrap();
        let (today_start, _) = window_bounds_for_day(Utc::now(), tz(), start, end);
        let before = today_start - Duration::hours(1);
        assert_eq!(next_window_start(before, tz(), start, end), today_start);
    }

    #[test]
    fn next_window_start_after_today_snaps_to_tomorrow() {
        let start = ClockTime::parse("09:00").unwrap();
        let end = ClockTime::parse("22:00").unwrap();
        let (_, today_end) = window_bounds_for_day(Utc::now(), tz(), start, end);
        let after = today_end + Duration::hours(1);
        let next = next_window_start(after, tz(), start, end);
        assert!(next > today_end);
    }
}
