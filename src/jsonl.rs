// JSONL export and import of task lists

use eyre::{Context, Result};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::task::Task;

/// Write tasks to a JSONL file, one task per line, replacing its contents
pub fn write_tasks<'a, I>(path: &Path, tasks: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Task>,
{
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .context("Failed to open JSONL file for writing")?;

    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for task in tasks {
        let json = serde_json::to_string(task)?;
        writeln!(writer, "{}", json)?;
        count += 1;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?; // Ensure data is flushed to disk

    info!(file = ?path, count, "Exported tasks to JSONL");
    Ok(count)
}

/// Read every parseable JSON value from a JSONL file
///
/// Blank lines are ignored; unreadable or malformed lines are skipped with a
/// warning. The values are not validated as tasks here.
pub fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open JSONL file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(value) => entries.push(value),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = entries.len(), "Read entries from JSONL");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample(title: &str, done: bool) -> Task {
        let mut task = Task::new(title, "notes", 1000);
        task.done = done;
        task
    }

    #[test]
    fn test_write_tasks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.jsonl");

        let tasks = vec![sample("Buy milk", false), sample("Pay rent", true)];
        assert_eq!(write_tasks(&path, &tasks).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"task\":\"Buy milk\""));
        assert!(content.contains("\"done\":true"));
    }

    #[test]
    fn test_write_replaces_previous_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.jsonl");

        write_tasks(&path, &vec![sample("a", false), sample("b", false)]).unwrap();
        write_tasks(&path, &vec![sample("c", false)]).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["task"], "c");
    }

    #[test]
    fn test_read_entries_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        assert!(read_entries(&temp.path().join("missing.jsonl")).is_err());
    }

    #[test]
    fn test_read_entries_malformed_line() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.jsonl");

        // Valid record, malformed, blank, then another valid
        fs::write(
            &path,
            r#"{"id":"t1","task":"Valid","desc":"","done":false,"createdAt":1000}
{malformed json}

{"task":"Partial"}
"#,
        )
        .unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], "t1");
        assert_eq!(entries[1]["task"], "Partial");
    }
}
