//! Board configuration.
//!
//! Read from `config.toml` in the data directory. Every field is optional.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::due::DEFAULT_DUE_SOON_DAYS;
use crate::error::{BoardError, Result};
use crate::theme::Theme;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Days ahead that count as "due soon".
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,

    /// User id matched by the assigned-to-me filter.
    #[serde(default)]
    pub current_user: Option<String>,

    /// Theme to use when no preference has been stored.
    #[serde(default)]
    pub system_theme: Option<Theme>,
}

fn default_due_soon_days() -> i64 {
    DEFAULT_DUE_SOON_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            due_soon_days: default_due_soon_days(),
            current_user: None,
            system_theme: None,
        }
    }
}

impl Config {
    /// Load `config.toml` from `dir`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        let mut config: Config =
            toml::from_str(&raw).map_err(|source| BoardError::Config { path, source })?;
        config.due_soon_days = config.due_soon_days.max(0);
        Ok(config)
    }

    /// Fill in `system_theme` from the terminal when the file left it unset.
    pub fn detect_system_theme(mut self) -> Self {
        if self.system_theme.is_none() {
            self.system_theme = Theme::detect_system();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.due_soon_days, 3);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "current_user = \"user1\"\nsystem_theme = \"dark\"\n").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.current_user.as_deref(), Some("user1"));
        assert_eq!(config.system_theme, Some(Theme::Dark));
        assert_eq!(config.due_soon_days, 3);
    }

    #[test]
    fn malformed_file_is_a_user_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "due_soon_days = \"soon\"").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, BoardError::Config { .. }));
        assert!(err.is_user_error());
    }
}
