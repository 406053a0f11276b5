// Query inputs for view derivation

use clap::ValueEnum;
use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::task::Task;

/// Which tasks a view keeps based on completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Done,
}

impl StatusFilter {
    pub fn keeps(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.done,
            StatusFilter::Done => task.done,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Done => write!(f, "done"),
        }
    }
}

/// Display order of a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SortMode {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "a-z")]
    #[value(name = "a-z")]
    AZ,
    #[serde(rename = "z-a")]
    #[value(name = "z-a")]
    ZA,
}

impl SortMode {
    /// Comparator for a stable sort; ties keep their incoming order
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortMode::Newest => b.created_at.cmp(&a.created_at),
            SortMode::Oldest => a.created_at.cmp(&b.created_at),
            SortMode::AZ => collate(&a.title, &b.title),
            SortMode::ZA => collate(&b.title, &a.title),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::Newest => write!(f, "newest"),
            SortMode::Oldest => write!(f, "oldest"),
            SortMode::AZ => write!(f, "a-z"),
            SortMode::ZA => write!(f, "z-a"),
        }
    }
}

/// The user-controlled inputs of a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewQuery {
    pub search: String,
    pub filter: StatusFilter,
    pub sort: SortMode,
}

impl ViewQuery {
    pub fn new(search: impl Into<String>, filter: StatusFilter, sort: SortMode) -> Self {
        Self {
            search: search.into(),
            filter,
            sort,
        }
    }

    /// Search text as matched against tasks, or `None` when it matches everything
    ///
    /// Surrounding whitespace is not significant: the query is trimmed, then
    /// lowercased, so `"rent "` finds "rental" too.
    pub fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

/// Title collation
///
/// Compares accent-stripped, case-folded text first ("éclair" sorts with
/// "eclair"), then the case-folded originals, then lowercase before uppercase.
pub fn collate(a: &str, b: &str) -> Ordering {
    let base = |s: &str| deunicode(s).to_lowercase();
    let case_rank = |s: &str| s.chars().map(char::is_uppercase).collect::<Vec<_>>();

    base(a)
        .cmp(&base(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| case_rank(a).cmp(&case_rank(b)))
}
