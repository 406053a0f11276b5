// tasklist - local to-do list with derived views and persisted preferences

pub mod config;
pub mod filter;
pub mod jsonl;
pub mod prefs;
pub mod render;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{SortMode, StatusFilter, ViewQuery};
pub use prefs::{Preferences, Theme, UiMode};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use store::TaskStore;
pub use task::{Counts, Task, now_ms};
pub use view::{View, derive_view};
