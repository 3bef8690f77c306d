// SPDX-License-Identifier: MPL-2.0

use crate::config::{APP_ID, DEFAULT_API_BASE, SEARCH_DEBOUNCE_MS, SEARCH_LIMIT};
use crate::mentions::{DisplayMode, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub const API_URL_ENV: &str = "GIGLINK_API_URL";
pub const TOKEN_ENV: &str = "GIGLINK_TOKEN";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub api_base: String,
    /// Credential sent with user searches; bare-name resolution is skipped without it
    pub auth_token: Option<String>,
    pub search_limit: usize,
    pub debounce_ms: u64,
    pub display_mode: DisplayMode,
    pub show_avatar: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            auth_token: None,
            search_limit: SEARCH_LIMIT,
            debounce_ms: SEARCH_DEBOUNCE_MS,
            display_mode: DisplayMode::Link,
            show_avatar: false,
        }
    }
}

impl AppSettings {
    /// Get the settings file path (~/.config/io.giglink.GigLink/settings.json)
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push(APP_ID);
            p.push("settings.json");
            p
        })
    }

    /// Load settings from disk (or defaults), then apply environment overrides
    pub fn load() -> Self {
        let settings = Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        settings.with_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        )
    }

    /// A missing file yields defaults; an unreadable one is logged and ignored
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn with_overrides(mut self, api_base: Option<String>, token: Option<String>) -> Self {
        if let Some(api_base) = api_base.filter(|v| !v.trim().is_empty()) {
            self.api_base = api_base;
        }
        if let Some(token) = token.filter(|v| !v.trim().is_empty()) {
            self.auth_token = Some(token);
        }
        self
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            display_mode: self.display_mode,
            show_avatar: self.show_avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"display_mode":"chip","show_avatar":true}"#).unwrap();
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.search_limit, SEARCH_LIMIT);
        assert_eq!(settings.render_options(), RenderOptions::chip(true));
    }

    #[test]
    fn test_env_overrides_win_unless_blank() {
        let settings = AppSettings::default()
            .with_overrides(Some("https://api.giglink.io".into()), Some(" ".into()));
        assert_eq!(settings.api_base, "https://api.giglink.io");
        assert_eq!(settings.auth_token, None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("giglink-settings-{}", std::process::id()));
        let path = dir.join("settings.json");
        let settings = AppSettings {
            auth_token: Some("abc".into()),
            debounce_ms: 150,
            ..AppSettings::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
        assert_eq!(AppSettings::load_from(&path).debounce(), Duration::from_millis(150));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("giglink-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
