use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("List style `{style}` is configured more than once")]
    DuplicateVariant { style: ListStyle },
}

/// The list container variants a user can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Bullet,
    Ordered,
    Task,
}

impl std::fmt::Display for ListStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListStyle::Bullet => write!(f, "bullet"),
            ListStyle::Ordered => write!(f, "ordered"),
            ListStyle::Task => write!(f, "task"),
        }
    }
}

/// Per-variant behavior: how it is toggled and which item attributes a
/// split resets instead of copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub style: ListStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_key: Option<String>,
    #[serde(default = "default_ignored_attrs")]
    pub split_ignored_attrs: Vec<String>,
}

impl VariantConfig {
    pub fn new(style: ListStyle, toggle_key: &str) -> Self {
        Self {
            style,
            toggle_key: Some(toggle_key.to_string()),
            split_ignored_attrs: default_ignored_attrs(),
        }
    }
}

fn default_ignored_attrs() -> Vec<String> {
    vec!["checked".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    pub indent: Vec<String>,
    pub dedent: Vec<String>,
    pub split: Vec<String>,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            indent: vec!["Tab".to_string()],
            dedent: vec!["Shift-Tab".to_string()],
            split: vec!["Enter".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub variants: Vec<VariantConfig>,
    pub keymap: KeymapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variants: vec![
                VariantConfig::new(ListStyle::Bullet, "Mod-Shift-8"),
                VariantConfig::new(ListStyle::Ordered, "Mod-Shift-9"),
                VariantConfig::new(ListStyle::Task, "Mod-Shift-7"),
            ],
            keymap: KeymapConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/listedit");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Rejects configurations that name the same list style twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = Vec::new();
        for variant in &self.variants {
            if seen.contains(&variant.style) {
                return Err(ConfigError::DuplicateVariant {
                    style: variant.style,
                });
            }
            seen.push(variant.style);
        }
        Ok(())
    }

    pub fn variant(&self, style: ListStyle) -> Option<&VariantConfig> {
        self.variants.iter().find(|v| v.style == style)
    }
}
