use crate::time::ClockTime;

/// The single posting-window row (`id = 1`).
#[derive(Clone, Debug)]
pub struct PostingWindow {
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub is_active: bool,
}
