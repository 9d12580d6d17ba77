//! Light/dark theme preference.
//!
//! The stored preference wins; without one the system preference is used, and
//! without that the board is light.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::db::{Storage, THEME_KEY};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Guess the terminal's preference from `COLORFGBG` ("fg;bg"), where a
    /// background of 0-6 or 8 is a dark palette entry.
    pub fn from_colorfgbg(value: &str) -> Option<Theme> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(if bg <= 6 || bg == 8 { Theme::Dark } else { Theme::Light })
    }

    /// System preference from the environment, if one can be read.
    pub fn detect_system() -> Option<Theme> {
        std::env::var("COLORFGBG").ok().and_then(|v| Theme::from_colorfgbg(&v))
    }

    /// Resolve the effective theme: stored preference, then `system`, then light.
    pub fn load(storage: &dyn Storage, system: Option<Theme>) -> Theme {
        match storage.get(THEME_KEY) {
            Ok(Some(raw)) => match raw.parse::<Theme>() {
                Ok(theme) => return theme,
                Err(()) => debug!(value = %raw.trim(), "ignoring unrecognised stored theme"),
            },
            Ok(None) => {}
            Err(e) => error!(error = %e, "error loading theme preference"),
        }
        system.unwrap_or_default()
    }

    /// Store the preference. Failures are logged.
    pub fn save(self, storage: &mut dyn Storage) -> bool {
        match storage.set(THEME_KEY, self.as_str()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "error saving theme preference");
                false
            }
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
