// Task data model and load-time normalization

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d1c_2f4a_8b3e_4c55_9a71_0e2d_f4b8_c613);

/// A single to-do item
///
/// Field names on the wire follow the persisted shape:
/// `{"id", "task", "desc", "done", "createdAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(rename = "task")]
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default)]
    pub done: bool,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Task {
    /// Build a fresh, not-yet-done task. Title and description are trimmed.
    pub fn new(title: &str, description: &str, created_at: i64) -> Self {
        Self {
            id: generate_id(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            done: false,
            created_at,
        }
    }

    /// Coerce an arbitrary stored entry into a task
    ///
    /// Returns `None` only when the entry is not a JSON object. Every other
    /// missing or mistyped field falls back to a safe default:
    /// - `id`: derived from `index` and the entry when absent or blank, so the
    ///   same stored entry gets the same id on every load; numbers are stringified
    /// - `task` / `desc`: empty string when not text
    /// - `done`: false when not a boolean
    /// - `createdAt`: `now` when absent or not numeric
    pub fn normalize(entry: &Value, index: usize, now: i64) -> Option<Self> {
        let obj = entry.as_object()?;

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => derived_id(index, entry),
        };

        let text = |key: &str| obj.get(key).and_then(Value::as_str).unwrap_or_default().to_string();

        let created_at = obj
            .get("createdAt")
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(now);

        Some(Self {
            id,
            title: text("task"),
            description: text("desc"),
            done: obj.get("done").and_then(Value::as_bool).unwrap_or(false),
            created_at,
        })
    }

    /// Case-insensitive substring match against title or description
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// Totals shown in the list header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
}

impl Counts {
    pub fn of(tasks: &[Task]) -> Self {
        let done = tasks.iter().filter(|t| t.done).count();
        Self {
            total: tasks.len(),
            pending: tasks.len() - done,
            done,
        }
    }
}

/// Generate a new opaque task id (time-ordered UUID v7)
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

/// Stable id for a stored entry that lacks a usable one (UUID v5)
///
/// Depends only on the entry's position and its serialized content.
pub fn derived_id(index: usize, entry: &Value) -> String {
    Uuid::new_v5(&ID_NAMESPACE, format!("{}:{}", index, entry).as_bytes()).to_string()
}

/// Current time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
