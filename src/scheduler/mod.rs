pub mod tick;
pub mod window_scheduler;
