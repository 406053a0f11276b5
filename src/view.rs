// View derivation: filter, search and sort over the task list

use tracing::debug;

use crate::filter::{SortMode, StatusFilter, ViewQuery};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::Task;

/// Positions into `tasks` of the rows a query displays, in display order
///
/// Pure: never reorders `tasks`. Filter and search compose with AND; the
/// sort is stable so ties keep insertion order.
pub fn derive_indices(tasks: &[Task], query: &ViewQuery) -> Vec<usize> {
    let needle = query.needle();

    let mut rows: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| query.filter.keeps(task))
        .filter(|(_, task)| needle.as_deref().is_none_or(|n| task.matches(n)))
        .map(|(index, _)| index)
        .collect();

    rows.sort_by(|&a, &b| query.sort.compare(&tasks[a], &tasks[b]));
    rows
}

/// The tasks a query displays, in display order
pub fn derive_view<'a>(tasks: &'a [Task], query: &ViewQuery) -> Vec<&'a Task> {
    derive_indices(tasks, query).into_iter().map(|i| &tasks[i]).collect()
}

/// A view over a [`TaskStore`] that recomputes only when its inputs change
///
/// The cache is keyed on the store revision plus the query; any setter that
/// actually changes the query drops the cached rows.
#[derive(Debug, Default)]
pub struct View {
    query: ViewQuery,
    cached: Option<(u64, Vec<usize>)>,
}

impl View {
    pub fn new(query: ViewQuery) -> Self {
        Self { query, cached: None }
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.query.search {
            self.query.search = search;
            self.cached = None;
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        if filter != self.query.filter {
            self.query.filter = filter;
            self.cached = None;
        }
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        if sort != self.query.sort {
            self.query.sort = sort;
            self.cached = None;
        }
    }

    /// Rows for the store's current state
    pub fn rows<'a, S: Storage>(&mut self, store: &'a TaskStore<S>) -> Vec<&'a Task> {
        let revision = store.revision();
        let tasks = store.tasks();

        let stale = !matches!(&self.cached, Some((r, _)) if *r == revision);
        if stale {
            debug!(revision, query = ?self.query, "recomputing view");
            self.cached = Some((revision, derive_indices(tasks, &self.query)));
        }

        self.cached
            .as_ref()
            .map(|(_, rows)| rows.iter().filter_map(|&i| tasks.get(i)).collect())
            .unwrap_or_default()
    }
}
