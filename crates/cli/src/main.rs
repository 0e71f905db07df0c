#![forbid(unsafe_code)]

mod commands;
mod render;

use clap::Parser;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_storage::{SqliteStore, TodoRepository};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Command;
use crate::render::Style;

const DEFAULT_DB: &str = "todos.db";
const VERBOSE_FILTER: &str = "todo_storage=debug,todo_cli=debug";
const QUIET_FILTER: &str = "warn";

/// todo - keep a small todo list in a local SQLite file
#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path of the SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DB, env = "TODO_DB")]
    db: PathBuf,

    /// Log storage operations to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print categories without colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        db,
        no_color,
        command,
        ..
    } = cli;
    let style = Style::detect(no_color);
    tracing::debug!(db = %db.display(), ?command, "running command");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    SqliteStore::with_open(&db, |store| -> anyhow::Result<()> {
        let mut repo = TodoRepository::new(store)?;
        commands::dispatch(&mut repo, command, &mut out, style)
    })?;
    out.flush()?;
    Ok(())
}

// Filter precedence: $TODO_LOG, then $RUST_LOG, then the --verbose default.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };
    let filter = EnvFilter::try_from_env("TODO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
