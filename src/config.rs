use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub compliance: ComplianceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Filesystem location of the persisted collection.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/documents.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Maximum results returned by search.
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            final_limit: default_final_limit(),
        }
    }
}

fn default_final_limit() -> usize {
    12
}

#[derive(Debug, Deserialize, Clone)]
pub struct ComplianceConfig {
    /// Language codes that do not trigger the `unsupported_language` rule.
    #[serde(default = "default_allowed_languages")]
    pub allowed_languages: Vec<String>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            allowed_languages: default_allowed_languages(),
        }
    }
}

fn default_allowed_languages() -> Vec<String> {
    vec!["en".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7411".to_string()
}

impl Config {
    /// A default configuration used when no config file is present.
    pub fn minimal() -> Self {
        Self {
            store: StoreConfig::default(),
            search: SearchConfig::default(),
            compliance: ComplianceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.final_limit < 1 {
        anyhow::bail!("search.final_limit must be >= 1");
    }

    if config.compliance.allowed_languages.is_empty() {
        anyhow::bail!("compliance.allowed_languages must not be empty");
    }

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}
