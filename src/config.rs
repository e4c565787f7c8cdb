use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// External share command
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShareConfig {
    /// Program and arguments; `{file}`, `{title}` and `{caption}` are
    /// substituted. Unset means cards are always saved to the download dir.
    pub command: Option<Vec<String>>,
}

/// Webhook delivery timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// How long the CLI waits for a pending push before exiting
    pub grace_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            grace_secs: 5,
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the persisted slots
    pub data_dir: ConfigValue<PathBuf>,
    /// Where cards are saved when sharing is unavailable
    pub download_dir: ConfigValue<PathBuf>,
    /// Font used for card text; discovered from system fonts when unset
    pub font_path: ConfigValue<Option<PathBuf>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub share: ShareConfig,
    pub webhook: WebhookConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    share: Option<ShareConfig>,
    webhook: Option<WebhookConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut download_dir =
            ConfigValue::new(Self::default_download_dir(), ConfigSource::Default);
        let mut font_path = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;
        let mut share = ShareConfig::default();
        let mut webhook = WebhookConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                data_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            if let Some(dir) = file_config.download_dir {
                download_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            if let Some(font) = file_config.font_path {
                font_path = ConfigValue::new(Some(resolve(&path, font)), ConfigSource::File);
            }
            if let Some(share_config) = file_config.share {
                share = share_config;
            }
            if let Some(webhook_config) = file_config.webhook {
                webhook = webhook_config;
            }
        }

        if let Ok(dir) = std::env::var("PROCURE_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("PROCURE_DOWNLOAD_DIR") {
            download_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(font) = std::env::var("PROCURE_FONT_PATH") {
            font_path = ConfigValue::new(Some(PathBuf::from(font)), ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            download_dir,
            font_path,
            config_file,
            share,
            webhook,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/procure/
    /// - macOS: ~/Library/Application Support/procure/
    /// - Windows: %APPDATA%/procure/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("procure")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/procure/
    /// - macOS: ~/Library/Application Support/procure/
    /// - Windows: %APPDATA%/procure/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("procure")
    }

    /// The user's download directory, or the working directory.
    pub fn default_download_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Resolve relative paths against the config file's directory
fn resolve(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
