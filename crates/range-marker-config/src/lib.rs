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

    #[error("Invalid config file at {config_path}: {reason}")]
    ConfigInvalidError { config_path: PathBuf, reason: String },
}

/// A label offered by the label picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Class name written onto wrapper elements.
    pub class: String,
    pub title: String,
}

/// Process-wide annotation settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tags whose elements are never split or entered.
    pub atomic_tags: Vec<String>,
    /// Classes whose elements are never split or entered.
    pub atomic_classes: Vec<String>,
    /// Tag used for the wrapper elements that carry labels.
    pub wrapper_tag: String,
    /// Prefix for generated classes such as comment labels.
    pub class_prefix: String,
    pub labels: Vec<LabelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let class_prefix = "rtm-".to_string();
        Self {
            atomic_tags: vec!["img".to_string()],
            atomic_classes: vec!["ql-formula".to_string()],
            wrapper_tag: "span".to_string(),
            labels: vec![LabelConfig {
                class: format!("{class_prefix}underline"),
                title: "Underline".to_string(),
            }],
            class_prefix,
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

        config
            .validate()
            .map_err(|reason| ConfigError::ConfigInvalidError {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load from `config_path` when given, otherwise from the default location,
    /// falling back to defaults when there is no file.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match config_path {
            Some(path) => Self::load_from_path(Self::expand_path(path).unwrap_or(path.into()))?,
            None => Self::load()?,
        };
        Ok(loaded.unwrap_or_default())
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

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/range-marker");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand a leading tilde and environment variables in `path`.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        if !is_name(&self.wrapper_tag) {
            return Err(format!("wrapper_tag {:?} is not a tag name", self.wrapper_tag));
        }
        if self.class_prefix.chars().any(char::is_whitespace) {
            return Err(format!(
                "class_prefix {:?} contains whitespace",
                self.class_prefix
            ));
        }
        for label in &self.labels {
            if label.class.is_empty() || label.class.chars().any(char::is_whitespace) {
                return Err(format!("label class {:?} is not a class name", label.class));
            }
        }
        Ok(())
    }
}

fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}
