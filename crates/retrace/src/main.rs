use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;

use retrace_config::EngineConfig;
use retrace_mod_history::{HistoryConfig, UndoManager};

mod editor;
mod script;

/// Replays a script of inputs through the undo/redo engine and prints the
/// resulting history.
#[derive(Parser, Debug)]
#[command(name = "retrace", version, about)]
struct Cli {
    /// JSON Lines file with one input per line.
    script: PathBuf,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured history bound.
    #[arg(long = "history-bound")]
    history_bound: Option<usize>,

    /// JSON file holding the initial document (defaults to `{}`).
    #[arg(long)]
    initial: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the history output
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_create(&EngineConfig::config_path()),
    };
    let mut config = HistoryConfig::from(&file_config);
    if let Some(bound) = cli.history_bound {
        config = config.with_history_bound(bound);
    }
    tracing::info!(history_bound = config.history_bound, "Starting retrace");

    let initial = match &cli.initial {
        Some(path) => read_json(path)?,
        None => Value::Object(Default::default()),
    };

    let text = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("Failed to read script {}", cli.script.display()))?;
    let lines = script::parse(&text)?;

    let manager = UndoManager::new(editor::document_editor(initial), config);
    let history = script::replay(&manager, &lines)?;
    tracing::info!(
        inputs = lines.len(),
        undo_units = history.past_units(),
        redo_units = history.future_units(),
        "Replay finished"
    );

    let json = serde_json::to_string_pretty(&history).context("Failed to serialize history")?;
    println!("{json}");
    Ok(())
}

fn read_json(path: &std::path::Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}
