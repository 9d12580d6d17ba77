//! tf - kanban task board for the terminal.
//!
//! Running `tf` with no subcommand opens the interactive board. Data is kept
//! as JSON files in `~/.taskflow` (or `--dir` / `TASKFLOW_DIR`).

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskflow::board::Board;
use taskflow::cli::Cli;
use taskflow::cmd::{self, Commands};
use taskflow::config::Config;
use taskflow::db::FileStore;
use taskflow::error::Result;

fn main() {
    // Tracing is opt-in via RUST_LOG and goes to stderr so board output stays clean.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        std::process::exit(if err.is_user_error() { 2 } else { 1 });
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.data_dir();
    let command = cli.command.unwrap_or(Commands::Board);

    // Completions need no board.
    if let Commands::Completions { shell } = command {
        cmd::cmd_completions(shell);
        return Ok(());
    }

    let storage = FileStore::open(&dir)?;
    let config = Config::load(&dir)?.detect_system_theme();
    let mut board = Board::open(Box::new(storage), config);
    cmd::run(command, &mut board)
}
