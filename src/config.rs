//! Configuration management
//!
//! User preferences read from a TOML config file.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::style::StyleId;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: DraftDefaults,
    pub export: ExportPreferences,
    pub render: RenderPreferences,
    pub ui: UiPreferences,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = project_dirs() {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("chatmock.toml"))
        }
    }

    /// Directory that receives the log file
    pub fn log_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "chatmock", "chatmock")
}

/// Initial values for a fresh draft
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftDefaults {
    pub style: StyleId,
    pub sender_name: String,
    pub body_text: String,
    pub timestamp: String,
    pub read: bool,
}

/// Export preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    /// Where exported PNGs are saved; the working directory when unset
    pub output_dir: Option<PathBuf>,
    /// Put the exported image on the clipboard as well
    pub copy_to_clipboard: bool,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            output_dir: None,
            copy_to_clipboard: false,
        }
    }
}

impl ExportPreferences {
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Rasterizer preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderPreferences {
    /// TrueType/OpenType font used for exported text
    pub font_path: Option<PathBuf>,
}

/// UI preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub show_help_on_start: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            show_help_on_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.style, StyleId::TgAndroid);
        assert!(!config.defaults.read);
        assert!(config.export.output_dir.is_none());
        assert_eq!(config.export.resolved_output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.defaults.style = StyleId::Vk;
        config.defaults.body_text = "Hi\nthere".to_string();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.defaults.style, StyleId::Vk);
        assert_eq!(parsed.defaults.body_text, "Hi\nthere");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[defaults]\nstyle = \"tg-ios\"\n").unwrap();
        assert_eq!(parsed.defaults.style, StyleId::TgIos);
        assert!(!parsed.ui.show_help_on_start);
        assert!(parsed.render.font_path.is_none());
    }
}
