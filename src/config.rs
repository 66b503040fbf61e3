use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BACKEND_URL_ENV: &str = "SMARTENERGY_BACKEND_URL";

fn default_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,
    /// Applied to every request, upload and chat alike.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            host: default_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 900,
            height: 720,
            min_width: 480,
            min_height: 480,
        }
    }
}

impl BackendConfig {
    /// Zero would fail every request instantly, so it means the default.
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            tracing::warn!(
                "backend.timeout_secs = 0 is not usable, using {}s",
                default_timeout_secs()
            );
            return Duration::from_secs(default_timeout_secs());
        }
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::get_config_path());

        if let Ok(host) = std::env::var(BACKEND_URL_ENV) {
            if !host.trim().is_empty() {
                tracing::debug!(%host, "backend host overridden from environment");
                config.backend.host = host;
            }
        }

        config
    }

    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Error parsing config.toml: {}. Using defaults.", e),
                },
                Err(e) => tracing::warn!("Error reading config.toml: {}. Using defaults.", e),
            }
        } else if let Some(parent) = config_path.parent() {
            // Create config directory if it doesn't exist
            let _ = fs::create_dir_all(parent);
        }

        Config::default()
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/smartenergy-hub")
        } else {
            PathBuf::from(".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nested/config.toml"));

        assert_eq!(config.backend.host, "http://localhost:8080");
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));
        assert_eq!(config.window.width, 900);
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\nhost = \"http://energy.local:9000\"\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.backend.host, "http://energy.local:9000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.window.min_height, 480);
    }

    #[test]
    fn test_partial_window_table_keeps_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[backend]\nhost = \"http://energy.local:9000\"\n\n[window]\nwidth = 1000\n",
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.backend.host, "http://energy.local:9000");
        assert_eq!(config.window.width, 1000);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.min_width, 480);
    }

    #[test]
    fn test_zero_timeout_means_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\ntimeout_secs = 0\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.backend.timeout(), Duration::from_secs(30));

        let config = BackendConfig {
            timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend = [not toml").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.backend.host, "http://localhost:8080");
    }
}
