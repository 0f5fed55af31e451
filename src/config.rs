use anyhow::{Context, Result};
use dirs::{config_dir, data_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_URL;
use crate::mapping::ClearPolicy;

const APP_NAME: &str = "taskmap";
const CONFIG_FILE: &str = "config.json";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL (env: TASKMAP_URL)
    pub base_url: String,
    /// Where the session record is kept (env: TASKMAP_SESSION_FILE)
    pub session_file: Option<PathBuf>,
    /// Authenticated endpoint used to check whether the session is still valid
    pub session_probe_path: String,
    /// Whether a failed mapping submission keeps the selections
    pub clear_policy: ClearPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            session_file: None,
            session_probe_path: "/getproject".to_string(),
            clear_policy: ClearPolicy::OnSuccess,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the user's config directory, then apply
    /// environment overrides. Falls back to defaults if the file doesn't
    /// exist or fails to parse.
    pub fn load() -> Self {
        let mut config = match config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TASKMAP_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(path) = lookup("TASKMAP_SESSION_FILE").filter(|s| !s.trim().is_empty()) {
            self.session_file = Some(PathBuf::from(path));
        }
    }

    /// Save the current configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The configured session file, or the default under the data directory.
    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let mut path =
            data_dir().ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        path.push(APP_NAME);
        path.push(SESSION_FILE);
        Ok(path)
    }
}

/// `config.json` under the user's config directory.
pub fn config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://localhost:6060");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"base_url":"http://board:9000","clear_policy":"always"}"#).unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://board:9000");
        assert_eq!(config.clear_policy, ClearPolicy::Always);
        assert_eq!(config.session_probe_path, "/getproject");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("config.json");
        let config = ClientConfig {
            session_file: Some(dir.path().join("s.json")),
            ..ClientConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ClientConfig::default();
        config.apply_env(|key| match key {
            "TASKMAP_URL" => Some(" http://remote:6060 ".to_string()),
            "TASKMAP_SESSION_FILE" => Some("/tmp/s.json".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://remote:6060");
        assert_eq!(config.session_path().unwrap(), PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }
}
