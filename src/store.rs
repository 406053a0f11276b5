// Task store: the canonical task list and its mutations

use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use crate::storage::{Storage, TASKS_KEY};
use crate::task::{Counts, Task, derived_id, generate_id, now_ms};

type Listener = Box<dyn FnMut(&[Task])>;

/// Ordered task list mirrored to durable storage
///
/// The only way to obtain a store is [`TaskStore::load`], so no mutation can
/// persist before the initial load has finished.
pub struct TaskStore<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
    revision: u64,
    listeners: Vec<Listener>,
}

impl<S: Storage> fmt::Debug for TaskStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore")
            .field("tasks", &self.tasks)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S: Storage> TaskStore<S> {
    /// Hydrate the store from storage
    ///
    /// Never fails: a missing, unreadable, malformed or non-array payload
    /// yields an empty list.
    pub fn load(storage: S) -> Self {
        let tasks = match storage.get(TASKS_KEY) {
            Ok(Some(raw)) => Self::parse(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = ?e, "Failed to read task list, starting empty");
                Vec::new()
            }
        };

        info!(count = tasks.len(), "Loaded task list");

        Self {
            storage,
            tasks,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    fn parse(raw: &str) -> Vec<Task> {
        let entries = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(other) => {
                warn!(kind = json_kind(&other), "Stored task list is not an array, discarding");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = ?e, "Stored task list is not valid JSON, discarding");
                return Vec::new();
            }
        };

        let now = now_ms();
        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let Some(mut task) = Task::normalize(entry, index, now) else {
                warn!(index, "Skipping stored task that is not an object");
                continue;
            };

            if !seen.insert(task.id.clone()) {
                // Derived from the entry so the replacement survives reloads
                let mut fresh = derived_id(index, entry);
                if seen.contains(&fresh) {
                    fresh = generate_id();
                }
                warn!(index, id = %task.id, %fresh, "Duplicate task id, assigning a new one");
                task.id = fresh.clone();
                seen.insert(fresh);
            }

            tasks.push(task);
        }

        tasks
    }

    /// Tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.tasks)
    }

    /// Bumped on every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback run with the full task list after every mutation
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[Task]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Look up a task by exact id, falling back to a unique id prefix
    pub fn find(&self, id_or_prefix: &str) -> Result<&Task> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(eyre!("Task id cannot be empty"));
        }

        if let Some(task) = self.get(needle) {
            return Ok(task);
        }

        let mut matches = self.tasks.iter().filter(|t| t.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(eyre!("Task id prefix '{}' is ambiguous", needle)),
            (None, _) => Err(eyre!("No task matches '{}'", needle)),
        }
    }

    /// Append a new task
    ///
    /// Returns `Ok(None)` without touching anything when the trimmed title is
    /// empty; otherwise the new task's id.
    pub fn add(&mut self, title: &str, description: &str) -> Result<Option<String>> {
        if title.trim().is_empty() {
            debug!("add: empty title, ignoring");
            return Ok(None);
        }

        // createdAt must not go backwards relative to the last appended task
        let floor = self.tasks.last().map(|t| t.created_at).unwrap_or(i64::MIN);
        let task = Task::new(title, description, now_ms().max(floor));
        let id = task.id.clone();
        debug!(id = %id, title = %task.title, "add");

        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next)?;

        Ok(Some(id))
    }

    /// Flip `done` for a task. Returns false if no task has that id.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "toggle: no such task");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next[index].done = !next[index].done;
        debug!(id, done = next[index].done, "toggle");
        self.commit(next)?;

        Ok(true)
    }

    /// Remove a task. Returns false if no task has that id.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "remove: no such task");
            return Ok(false);
        };

        let mut next = self.tasks.clone();
        next.remove(index);
        debug!(id, "remove");
        self.commit(next)?;

        Ok(true)
    }

    /// Empty the list. Returns the number of tasks removed.
    pub fn remove_all(&mut self) -> Result<usize> {
        let removed = self.tasks.len();
        debug!(removed, "remove_all");
        self.commit(Vec::new())?;

        Ok(removed)
    }

    /// Drop every completed task, keeping the order of the rest
    pub fn remove_completed(&mut self) -> Result<usize> {
        let next: Vec<Task> = self.tasks.iter().filter(|t| !t.done).cloned().collect();
        let removed = self.tasks.len() - next.len();
        debug!(removed, "remove_completed");
        self.commit(next)?;

        Ok(removed)
    }

    /// Append externally sourced entries
    ///
    /// Entries are normalized the same way as on load, using their position
    /// in `entries` for derived ids. Entries whose id is already present, or
    /// whose title is blank, are skipped. Returns the number of tasks appended.
    pub fn import(&mut self, entries: &[Value]) -> Result<usize> {
        let now = now_ms();
        let mut seen: HashSet<String> = self.tasks.iter().map(|t| t.id.clone()).collect();
        let mut next = self.tasks.clone();

        for (index, entry) in entries.iter().enumerate() {
            let Some(mut task) = Task::normalize(entry, index, now) else {
                continue;
            };

            task.title = task.title.trim().to_string();
            task.description = task.description.trim().to_string();

            if task.title.is_empty() {
                debug!(id = %task.id, "import: blank title, skipping");
                continue;
            }
            if !seen.insert(task.id.clone()) {
                debug!(id = %task.id, "import: id already present, skipping");
                continue;
            }

            next.push(task);
        }

        let imported = next.len() - self.tasks.len();
        if imported > 0 {
            self.commit(next)?;
        }

        info!(imported, skipped = entries.len() - imported, "Imported tasks");
        Ok(imported)
    }

    /// Persist `next`, then make it the current list
    ///
    /// On a storage error nothing changes in memory.
    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        let json = serde_json::to_string(&next).context("Failed to serialize task list")?;
        self.storage.set(TASKS_KEY, &json).context("Failed to persist task list")?;

        self.tasks = next;
        self.revision += 1;

        for listener in &mut self.listeners {
            listener(&self.tasks);
        }

        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
