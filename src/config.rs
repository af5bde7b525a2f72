use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

pub const DEFAULT_SOURCE_PATH: &str = "data/users.csv";
pub const DEFAULT_ARCHIVE_PATH: &str = "data/users_data.json";
pub const DEFAULT_DATABASE_PATH: &str = "data/users.db";
pub const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE_NAME: &str = "post-harvest.json";

/// On-disk shape of `post-harvest.json`. Every field is optional and falls
/// back to the built-in default.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub archive_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub database_path: Option<Utf8PathBuf>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub source_path: Utf8PathBuf,
    pub archive_path: Utf8PathBuf,
    pub database_path: Utf8PathBuf,
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_path: Utf8PathBuf::from(DEFAULT_SOURCE_PATH),
            archive_path: Utf8PathBuf::from(DEFAULT_ARCHIVE_PATH),
            database_path: Utf8PathBuf::from(DEFAULT_DATABASE_PATH),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolves the pipeline configuration. Without an explicit path the
    /// optional `post-harvest.json` in the working directory is used, and
    /// its absence just means defaults.
    pub fn resolve(path: Option<&str>) -> Result<PipelineConfig, HarvestError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE_NAME),
        };

        if path.is_none() && !config_path.exists() {
            return Ok(PipelineConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HarvestError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| HarvestError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<PipelineConfig, HarvestError> {
        let defaults = PipelineConfig::default();

        let api_url = config.api_url.unwrap_or(defaults.api_url);
        if api_url.trim().is_empty() {
            return Err(HarvestError::ConfigParse("api_url must not be empty".to_string()));
        }
        let request_timeout_secs = config
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs);
        if request_timeout_secs == 0 {
            return Err(HarvestError::ConfigParse(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(PipelineConfig {
            source_path: config.source_path.unwrap_or(defaults.source_path),
            archive_path: config.archive_path.unwrap_or(defaults.archive_path),
            database_path: config.database_path.unwrap_or(defaults.database_path),
            api_url,
            request_timeout_secs,
        })
    }
}
