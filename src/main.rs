use chrono::Local;
use clap::{Parser, Subcommand};
use eyre::{Context, Result};
use std::path::PathBuf;
use tasklist::prefs::detect_system_theme;
use tasklist::render::{Palette, render_task, render_view};
use tasklist::{Config, Preferences, SortMode, SqliteStorage, StatusFilter, TaskStore, Theme, UiMode, View, ViewQuery, jsonl};
use tracing::Level;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "A local to-do list with filtering, search, sorting and persisted themes")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the .tasklist store (default: from config, then the user data dir)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Config file (default: <config dir>/tasklist/tasklist.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        title: String,

        /// Optional description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show tasks
    List {
        /// Case-insensitive text to look for in titles and descriptions
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        #[arg(short, long, value_enum)]
        filter: Option<StatusFilter>,

        #[arg(short = 'o', long, value_enum)]
        sort: Option<SortMode>,
    },

    /// Mark a task done, or not done again
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete every completed task
    ClearDone,

    /// Delete every task
    DeleteAll,

    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        theme: Option<Theme>,

        /// Switch between light and dark
        #[arg(short, long, conflicts_with = "theme")]
        toggle: bool,
    },

    /// Show or change the UI skin
    Mode {
        #[arg(value_enum)]
        mode: Option<UiMode>,
    },

    /// Write all tasks to a JSONL file
    Export { path: PathBuf },

    /// Append tasks from a JSONL file
    Import { path: PathBuf },

    /// Show task counts
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    setup_logging(cli.verbose, &config);

    let store_path = config.resolve_store_path(cli.store_path.as_deref());
    let storage = SqliteStorage::open(&store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;

    let system_theme = config.color_scheme.unwrap_or_else(detect_system_theme);
    let mut prefs = Preferences::load(&storage, system_theme);
    let mut store = TaskStore::load(&storage);
    let palette = Palette::new(prefs.theme(), prefs.mode());

    match cli.command {
        Commands::Add { title, description } => match store.add(&title, &description)? {
            Some(id) => {
                if let Some(task) = store.get(&id) {
                    println!("{}", render_task(task, &palette));
                }
            }
            None => println!("Nothing added: title is empty"),
        },
        Commands::List { search, filter, sort } => {
            let query = ViewQuery::new(
                search,
                filter.unwrap_or(config.default_filter),
                sort.unwrap_or(config.default_sort),
            );
            let mut view = View::new(query);
            let rows = view.rows(&store);
            println!(
                "{}",
                render_view(&rows, store.counts(), view.query(), &palette, Local::now())
            );
        }
        Commands::Toggle { id } => {
            let id = store.find(&id)?.id.clone();
            store.toggle(&id)?;
            if let Some(task) = store.get(&id) {
                println!("{}", render_task(task, &palette));
            }
        }
        Commands::Rm { id } => {
            let task = store.find(&id)?.clone();
            store.remove(&task.id)?;
            println!("Deleted \"{}\"", task.title);
        }
        Commands::ClearDone => {
            let removed = store.remove_completed()?;
            println!("Cleared {} completed task(s)", removed);
        }
        Commands::DeleteAll => {
            let removed = store.remove_all()?;
            println!("Deleted {} task(s)", removed);
        }
        Commands::Theme { theme, toggle } => {
            if toggle {
                prefs.toggle_theme()?;
            } else if let Some(theme) = theme {
                prefs.set_theme(theme)?;
            }
            println!("Theme: {}", prefs.theme());
        }
        Commands::Mode { mode } => {
            if let Some(mode) = mode {
                prefs.set_mode(mode)?;
            }
            println!("Mode: {}", prefs.mode());
        }
        Commands::Export { path } => {
            let count = jsonl::write_tasks(&path, store.tasks())?;
            println!("Exported {} task(s) to {}", count, path.display());
        }
        Commands::Import { path } => {
            let entries = jsonl::read_entries(&path)?;
            let imported = store.import(&entries)?;
            println!(
                "Imported {} of {} task(s) from {}",
                imported,
                entries.len(),
                path.display()
            );
        }
        Commands::Stats => {
            let counts = store.counts();
            println!("{} total, {} pending, {} done", counts.total, counts.pending, counts.done);
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, config: &Config) {
    let level = if verbose {
        Level::DEBUG
    } else {
        config
            .log_level
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(Level::WARN)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
