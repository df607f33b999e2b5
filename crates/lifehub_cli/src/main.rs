//! Developer CLI over `lifehub_core`.
//!
//! # Responsibility
//! - Verify core linkage (`status`).
//! - Inspect and poke a persisted state database for local sanity checks.

use clap::{Parser, Subcommand};
use lifehub_core::{
    init_from_config, AppStore, CoreConfig, ItemData, SqliteStateRepository,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "lifehub.sqlite3";

#[derive(Parser)]
#[command(name = "lifehub")]
#[command(about = "LifeHub core developer CLI")]
struct Cli {
    /// SQLite database holding the persisted state document.
    #[arg(long, value_name = "PATH", global = true, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,
    /// Optional TOML config file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core version and health.
    Status,
    /// List notebooks and their items.
    Summary,
    /// Search item names, notes and table cells.
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// Create a notebook.
    AddNotebook {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Create a note inside the first notebook named NOTEBOOK.
    AddNote {
        #[arg(value_name = "NOTEBOOK")]
        notebook: String,
        #[arg(value_name = "TITLE")]
        title: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("lifehub_core ping={}", lifehub_core::ping());
            println!("lifehub_core version={}", lifehub_core::core_version());
        }
        Commands::Summary => {
            let store = open_store(&cli.db, cli.config.as_deref())?;
            print_summary(&store);
        }
        Commands::Search { query } => {
            let store = open_store(&cli.db, cli.config.as_deref())?;
            let hits = store.search_items(&query);
            println!("{} match(es)", hits.len());
            for item in hits {
                println!("  [{}] {}  {}", item.kind().as_str(), item.name, item.id);
            }
        }
        Commands::AddNotebook { name } => {
            let mut store = open_store(&cli.db, cli.config.as_deref())?;
            let notebook = store.create_notebook(name, None, None)?;
            println!("created notebook {}", notebook.id);
        }
        Commands::AddNote { notebook, title } => {
            let mut store = open_store(&cli.db, cli.config.as_deref())?;
            let notebook_id = store
                .state()
                .notebooks
                .iter()
                .find(|current| current.name == notebook)
                .map(|current| current.id)
                .ok_or_else(|| format!("no notebook named `{notebook}`"))?;
            let item = store.create_note(notebook_id, title)?;
            println!("created note {}", item.id);
        }
    }
    Ok(())
}

/// Loads config, starts logging and opens the store over `db`.
fn open_store(
    db: &Path,
    config_path: Option<&Path>,
) -> Result<AppStore<SqliteStateRepository>, Box<dyn Error>> {
    let config = CoreConfig::load(config_path)?;
    init_from_config(&config)?;
    let repo = SqliteStateRepository::open(db, config.storage_key.as_str())?;
    Ok(AppStore::from_config(repo, &config)?)
}

fn print_summary(store: &AppStore<SqliteStateRepository>) {
    let state = store.state();
    println!(
        "{} notebook(s), {} item(s), {} tag(s)",
        state.notebooks.len(),
        state.item_count(),
        state.tags.len()
    );
    for notebook in &state.notebooks {
        let marker = if state.current_notebook_id == Some(notebook.id) {
            "*"
        } else {
            " "
        };
        println!("{marker} {} ({})", notebook.name, notebook.items.len());
        for item in &notebook.items {
            let detail = match &item.data {
                ItemData::Note(note) => format!("{} tag(s)", note.tags.len()),
                ItemData::Table(table) => format!(
                    "{} column(s), {} record(s)",
                    table.property_definitions.len(),
                    table.records.len()
                ),
            };
            println!("    [{}] {}  {}", item.kind().as_str(), item.name, detail);
        }
    }
}
