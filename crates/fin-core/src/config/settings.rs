use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default, skip_serializing_if = "KeymapConfig::is_empty")]
    pub keymap: KeymapConfig,

    #[serde(default)]
    pub apps: AppConfig,
}

impl Config {
    /// Load config from file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Poll loop cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl PollConfig {
    /// Poll period, never shorter than one millisecond.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    100
}

/// Window sizes for the two geometry classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_collapsed_height")]
    pub collapsed_height: u32,

    #[serde(default = "default_expanded_height")]
    pub expanded_height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            collapsed_height: default_collapsed_height(),
            expanded_height: default_expanded_height(),
        }
    }
}

fn default_width() -> u32 {
    600
}
fn default_collapsed_height() -> u32 {
    50
}
fn default_expanded_height() -> u32 {
    400
}

/// Keymap overrides: action name (camelCase) to shortcut strings.
///
/// An action listed here replaces all of its default bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeymapConfig(pub BTreeMap<String, Vec<String>>);

impl KeymapConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// External command overrides for the system shell.
///
/// Each value is a command line; the target path or nothing (clipboard) is
/// appended as the final argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_manager: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.poll.interval_ms, 100);
        assert_eq!(config.poll.interval(), Duration::from_millis(100));
        assert_eq!(config.window.width, 600);
        assert_eq!(config.window.collapsed_height, 50);
        assert_eq!(config.window.expanded_height, 400);
        assert!(config.keymap.is_empty());
        assert!(config.apps.launcher.is_none());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let poll = PollConfig { interval_ms: 0 };
        assert_eq!(poll.interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"window": {"expandedHeight": 520}}"#).unwrap();
        assert_eq!(config.window.expanded_height, 520);
        assert_eq!(config.window.width, 600);
        assert_eq!(config.poll.interval_ms, 100);
    }

    #[test]
    fn test_keymap_and_apps_parse() {
        let config: Config = serde_json::from_str(
            r#"{
                "keymap": {"clear": ["Ctrl+G"], "next": ["Tab", "Ctrl+J"]},
                "apps": {"fileManager": "nautilus", "clipboard": "wl-copy -n"}
            }"#,
        )
        .unwrap();

        let bindings: Vec<_> = config.keymap.iter().collect();
        assert_eq!(bindings[0], ("clear", &["Ctrl+G".to_string()][..]));
        assert_eq!(bindings[1].1.len(), 2);
        assert_eq!(config.apps.file_manager.as_deref(), Some("nautilus"));
        assert_eq!(config.apps.clipboard.as_deref(), Some("wl-copy -n"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");

        let mut config = Config::default();
        config.poll.interval_ms = 250;
        config.apps.launcher = Some("gtk-launch".to_string());
        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"intervalMs\": 250"));
        assert!(!content.contains("keymap"));

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(crate::Error::Json(_))));
    }
}
