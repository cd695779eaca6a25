//! Bot configuration
//!
//! Values come from an optional config file (JSON or YAML) and are overridden
//! by environment variables, which `dotenvy` may have populated from `.env`.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: YAML config files alongside JSON
//! - 1.1.0: Environment overrides and validation of required values
//! - 1.0.0: Initial JSON config file

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_BOT_NAME: &str = "inclusive-bot";
pub const DEFAULT_WORD_LIST_FILE: &str = "word_list.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Config file contents, every field optional
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub site_url: Option<String>,
    pub bot_token: Option<String>,
    pub team_name: Option<String>,
    pub bot_name: Option<String>,
    pub debug_channel_name: Option<String>,
    pub word_list_file: Option<String>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Read a config file, picking the format from its extension.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read(path: &str) -> Result<Option<Self>> {
        if !Path::new(path).exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;

        let is_yaml = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("invalid YAML in config file {path}"))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("invalid JSON in config file {path}"))?
        };

        Ok(Some(config))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub site_url: String,
    pub bot_token: String,
    pub team_name: String,
    pub bot_name: String,
    pub debug_channel_name: String,
    pub word_list_file: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from `CONFIG_PATH` (or `config.json`) plus the process environment
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = FileConfig::read(&path)?.unwrap_or_default();
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge file values with environment overrides, apply defaults and validate
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, file_value: Option<String>| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or(file_value)
                .map(|v| v.trim().to_string())
        };

        let bot_name = pick("BOT_NAME", file.bot_name)
            .unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());
        let debug_channel_name = pick("DEBUG_CHANNEL_NAME", file.debug_channel_name)
            .unwrap_or_else(|| format!("debug-{bot_name}"));

        let config = Config {
            site_url: pick("SITE_URL", file.site_url)
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            bot_token: pick("BOT_TOKEN", file.bot_token).unwrap_or_default(),
            team_name: pick("TEAM_NAME", file.team_name).unwrap_or_default(),
            bot_name,
            debug_channel_name,
            word_list_file: pick("WORD_LIST_FILE", file.word_list_file)
                .unwrap_or_else(|| DEFAULT_WORD_LIST_FILE.to_string()),
            log_level: pick("LOG_LEVEL", file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("site_url", &self.site_url),
            ("bot_token", &self.bot_token),
            ("team_name", &self.team_name),
            ("bot_name", &self.bot_name),
            ("debug_channel_name", &self.debug_channel_name),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(anyhow!("missing required configuration value: {key}"));
            }
        }

        if !self.site_url.starts_with("http://") && !self.site_url.starts_with("https://") {
            return Err(anyhow!(
                "site_url must start with http:// or https://: {}",
                self.site_url
            ));
        }

        Ok(())
    }

    /// REST API base, e.g. `https://chat.example.com/api/v4`
    pub fn api_url(&self) -> String {
        format!("{}/api/v4", self.site_url)
    }

    /// Event stream endpoint with the scheme swapped to ws/wss
    pub fn websocket_url(&self) -> String {
        let base = if let Some(rest) = self.site_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.site_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.site_url.clone()
        };
        format!("{base}/api/v4/websocket")
    }
}
