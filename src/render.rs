// Terminal rendering of a derived view

use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use std::fmt::Write;

use crate::filter::ViewQuery;
use crate::prefs::{Theme, UiMode};
use crate::task::{Counts, Task};

/// Colors and glyphs for one (theme, mode) combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub done: Color,
    pub muted: Color,
    pub open_mark: &'static str,
    pub done_mark: &'static str,
}

impl Palette {
    pub fn new(theme: Theme, mode: UiMode) -> Self {
        let muted = match theme {
            Theme::Light => Color::BrightBlack,
            Theme::Dark => Color::White,
        };

        match mode {
            UiMode::Normal => Self {
                accent: match theme {
                    Theme::Light => Color::Blue,
                    Theme::Dark => Color::BrightBlue,
                },
                done: Color::Green,
                muted,
                open_mark: "○",
                done_mark: "✓",
            },
            UiMode::Retro => Self {
                accent: Color::Green,
                done: Color::Yellow,
                muted,
                open_mark: "[ ]",
                done_mark: "[x]",
            },
            UiMode::Futuristic => Self {
                accent: Color::Cyan,
                done: Color::BrightCyan,
                muted,
                open_mark: "◇",
                done_mark: "◆",
            },
            UiMode::Neon => Self {
                accent: Color::BrightMagenta,
                done: Color::BrightGreen,
                muted,
                open_mark: "☆",
                done_mark: "★",
            },
        }
    }
}

/// Local wall-clock rendering of a millisecond timestamp
pub fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_header(counts: Counts, query: &ViewQuery, now: DateTime<Local>, palette: &Palette) -> String {
    let mut out = format!(
        "{}  {}",
        "My To-Do List".color(palette.accent).bold(),
        now.format("%H:%M:%S").to_string().color(palette.muted)
    );

    if counts.total > 0 {
        let _ = write!(
            out,
            "  {} pending, {} done",
            counts.pending.to_string().color(palette.accent),
            counts.done.to_string().color(palette.done)
        );
    }

    let search = query.needle().map(|n| format!(", search \"{}\"", n)).unwrap_or_default();
    let _ = write!(
        out,
        "\n{}",
        format!("filter {}, sort {}{}", query.filter, query.sort, search).color(palette.muted)
    );

    out
}

pub fn render_task(task: &Task, palette: &Palette) -> String {
    let (mark, title) = if task.done {
        (
            palette.done_mark.color(palette.done),
            task.title.as_str().strikethrough().color(palette.muted),
        )
    } else {
        (palette.open_mark.color(palette.accent), task.title.as_str().bold())
    };

    let mut line = format!(
        "{} {}  {}  {}",
        mark,
        title,
        task.id.as_str().color(palette.muted),
        format_timestamp(task.created_at).color(palette.muted)
    );

    if !task.description.is_empty() {
        let _ = write!(line, "\n    {}", task.description.as_str().color(palette.muted));
    }

    line
}

/// Header plus one entry per row, or a hint when there is nothing to show
pub fn render_view(
    rows: &[&Task],
    counts: Counts,
    query: &ViewQuery,
    palette: &Palette,
    now: DateTime<Local>,
) -> String {
    let mut out = render_header(counts, query, now, palette);
    out.push('\n');

    if counts.total == 0 {
        let _ = write!(out, "\n{}", "No tasks yet, add one with `tasklist add`".color(palette.muted));
    } else if rows.is_empty() {
        let _ = write!(out, "\n{}", "No tasks match".color(palette.muted));
    } else {
        for task in rows {
            out.push('\n');
            out.push_str(&render_task(task, palette));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortMode, StatusFilter};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_palette_marks_per_mode() {
        assert_eq!(Palette::new(Theme::Light, UiMode::Retro).done_mark, "[x]");
        assert_eq!(Palette::new(Theme::Dark, UiMode::Neon).open_mark, "☆");
        assert_ne!(
            Palette::new(Theme::Light, UiMode::Normal).accent,
            Palette::new(Theme::Dark, UiMode::Normal).accent
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(i64::MAX), "-");
        assert_eq!(format_timestamp(0).len(), "1970-01-01 00:00".len());
    }

    #[test]
    fn test_render_task_with_description() {
        plain();
        let mut task = Task::new("Buy milk", "two liters", 0);
        task.id = "t1".to_string();
        let palette = Palette::new(Theme::Light, UiMode::Retro);

        let out = render_task(&task, &palette);
        assert!(out.starts_with("[ ] Buy milk  t1"));
        assert!(out.ends_with("\n    two liters"));

        task.done = true;
        assert!(render_task(&task, &palette).starts_with("[x] Buy milk"));
    }

    #[test]
    fn test_render_view_states() {
        plain();
        let palette = Palette::new(Theme::Dark, UiMode::Normal);
        let query = ViewQuery::new("milk", StatusFilter::Active, SortMode::AZ);
        let now = Local::now();

        let empty = render_view(&[], Counts::default(), &query, &palette, now);
        assert!(empty.contains("No tasks yet"));
        assert!(empty.contains("filter active, sort a-z, search \"milk\""));

        let task = Task::new("Pay rent", "", 0);
        let counts = Counts::of(std::slice::from_ref(&task));
        let none = render_view(&[], counts, &query, &palette, now);
        assert!(none.contains("No tasks match"));
        assert!(none.contains("1 pending, 0 done"));

        let some = render_view(&[&task], counts, &query, &palette, now);
        assert!(some.contains("○ Pay rent"));
    }
}
