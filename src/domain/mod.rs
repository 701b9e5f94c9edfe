//! Domain entities shared by the generator, scheduler, dispatcher, and
//! approval coordinator. These are plain data types; persistence lives in
//! `crate::repository`, behavior lives in the component modules.

mod history;
mod queue_item;
mod settings;
mod suggestion;
mod theme;
mod window;

pub use history::PostHistoryEntry;
pub use queue_item::{QueueItem, QueueStatus};
pub use settings::AutomationSettings;
pub use suggestion::{ApprovedAction, Suggestion, SuggestionStatus};
pub use theme::Theme;
pub use window::PostingWindow;
