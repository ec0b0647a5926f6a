//! Application settings

use anyhow::{Context, Result};
use attrform_core::DEFAULT_WIDGET_TYPE;
use attrform_widgets::RegistrationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_VERSION: u32 = 1;

/// Application-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Version of the settings format
    pub version: u32,
    /// Widget type used when a wrapper cannot drive its bound control
    pub fallback_widget: String,
    /// Widget types that are not registered at startup
    pub disabled_widgets: Vec<String>,
    /// Register the web view widget (only with the `webview` feature)
    pub webview_enabled: bool,
}

impl Settings {
    /// Load settings from the user config directory, defaults when missing
    pub fn load() -> Result<Self> {
        let path = Self::settings_path()?;

        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Save settings to the user config directory
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::settings_path()?)
    }

    /// Get the settings file path
    pub fn settings_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "attrform", "attrform")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("settings.json"))
    }

    /// Load settings from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// Options passed to the built-in factory registration
    pub fn registration_options(&self) -> RegistrationOptions {
        RegistrationOptions {
            webview_enabled: self.webview_enabled,
            disabled_widgets: self.disabled_widgets.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            fallback_widget: DEFAULT_WIDGET_TYPE.to_string(),
            disabled_widgets: Vec::new(),
            webview_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("attrform-{}", uuid::Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path();
        let settings = Settings {
            fallback_widget: "Hidden".to_string(),
            disabled_widgets: vec!["Photo".to_string()],
            ..Settings::default()
        };
        settings.save_to_path(&path).unwrap();

        let loaded = Settings::load_from_path(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.registration_options().disabled_widgets, vec!["Photo"]);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"disabled_widgets": ["Color"]}"#).unwrap();
        assert_eq!(settings.fallback_widget, "TextEdit");
        assert_eq!(settings.version, SETTINGS_VERSION);
        assert!(!settings.webview_enabled);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(Settings::load_from_path(&temp_path()).is_err());
    }
}
