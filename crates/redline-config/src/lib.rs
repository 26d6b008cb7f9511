use redline_core::{DEFAULT_NER_LABELS, MatchSource, RedactMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for redline (~/.config/redline/config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub redact: RedactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// External HWPX viewer; the saved file's URL is passed as `?file=`
    #[serde(default)]
    pub hwpx_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Rule names to match; empty means every rule the server knows
    #[serde(default)]
    pub rules: Vec<String>,

    #[serde(default = "default_ner_labels")]
    pub ner_labels: Vec<String>,

    #[serde(default)]
    pub source: MatchSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactConfig {
    #[serde(default)]
    pub mode: RedactMode,

    #[serde(default = "default_fill")]
    pub fill: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            ner_labels: default_ner_labels(),
            source: MatchSource::default(),
        }
    }
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            mode: RedactMode::default(),
            fill: default_fill(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_ner_labels() -> Vec<String> {
    DEFAULT_NER_LABELS.iter().map(|l| l.to_string()).collect()
}

fn default_fill() -> String {
    "black".to_string()
}

/// Strip trailing slashes so endpoint paths can be appended verbatim
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there if it is missing
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "redline", "redline") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.redline/config.toml")
        }
    }

    /// Apply command-line / environment overrides on top of the file values
    pub fn with_overrides(mut self, api_base: Option<String>, viewer_url: Option<String>) -> Self {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api.base_url = base;
        }
        if let Some(url) = viewer_url {
            self.viewer.hwpx_url = Some(url);
        }
        self.api.base_url = normalize_base_url(&self.api.base_url);
        self.viewer.hwpx_url = self
            .viewer
            .hwpx_url
            .take()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        self
    }
}
