use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Kanban task board with project scoping and due-date tracking.
/// Data lives in ~/.taskflow unless --dir or TASKFLOW_DIR says otherwise.
#[derive(Parser)]
#[command(name = "tf", version, about = "Kanban task board for the terminal")]
pub struct Cli {
    /// Directory holding the board's data files and config.toml.
    #[arg(long, global = true, env = "TASKFLOW_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Resolve the data directory: `--dir`, then `$HOME/.taskflow`, then `./.taskflow`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.dir {
            return dir.clone();
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".taskflow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::DueSoonFilter;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_dir_wins() {
        let cli = Cli::try_parse_from(["tf", "--dir", "/tmp/board", "stats"]).unwrap();
        assert_eq!(cli.data_dir(), PathBuf::from("/tmp/board"));
    }

    #[test]
    fn bare_invocation_opens_the_board() {
        let cli = Cli::try_parse_from(["tf"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn due_takes_a_search_term() {
        let cli = Cli::try_parse_from(["tf", "due", "--filter", "week", "--search", "login"]).unwrap();
        match cli.command {
            Some(Commands::Due { filter, search }) => {
                assert_eq!(filter, DueSoonFilter::Week);
                assert_eq!(search.as_deref(), Some("login"));
            }
            _ => panic!("expected the due command"),
        }
    }
}
