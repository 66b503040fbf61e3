use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn iced_theme(self) -> iced::Theme {
        match self {
            ThemePreference::Light => iced::Theme::Light,
            ThemePreference::Dark => iced::Theme::TokyoNight,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Preferences {
    #[serde(default)]
    theme: ThemePreference,
}

/// Durable home of the light/dark flag, a one-key TOML file.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ThemeStore { path: path.into() }
    }

    pub fn default_location() -> Self {
        Self::new(Config::get_config_dir().join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Anything missing or unreadable means light.
    pub fn load(&self) -> ThemePreference {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ThemePreference::default();
            }
            Err(e) => {
                tracing::warn!("Could not read preferences at {}: {}", self.path.display(), e);
                return ThemePreference::default();
            }
        };

        match toml::from_str::<Preferences>(&contents) {
            Ok(prefs) => prefs.theme,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences at {}: {}", self.path.display(), e);
                ThemePreference::default()
            }
        }
    }

    pub fn save(&self, theme: ThemePreference) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(&Preferences { theme })?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
