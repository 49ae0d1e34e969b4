use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, SubtranError};
use crate::subtitle::DEFAULT_CHUNK_SIZE;

/// Environment variable holding the translation endpoint address
pub const ENDPOINT_ENV_VAR: &str = "SUBTRAN_API_URL";

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "subtran.toml";

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_separator() -> String {
    "\n\n".to_string()
}

fn default_export_extension() -> String {
    "srt".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub job: JobConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation endpoint URL (POST, JSON in and out)
    #[serde(default)]
    pub endpoint: String,
    /// Retries after the first failed attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff delay, multiplied by the 1-indexed retry number
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Maximum number of cues sent in one request
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Joins cue texts inside a request and splits the translated reply
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Extension of exported files
    #[serde(default = "default_export_extension")]
    pub export_extension: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            separator: default_separator(),
            export_extension: default_export_extension(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtranError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubtranError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtranError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtranError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load from an explicit file, else `subtran.toml` in the working
    /// directory, else defaults. The endpoint environment variable wins
    /// over whatever the file says.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env(std::env::var(ENDPOINT_ENV_VAR).ok());
        Ok(config)
    }

    /// Override the endpoint with the environment value, if any
    pub fn apply_env(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint {
            let endpoint = endpoint.trim();
            if !endpoint.is_empty() {
                self.translate.endpoint = endpoint.to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.endpoint.trim().is_empty() {
            return Err(SubtranError::Config(format!(
                "Translation endpoint is not defined. Set {} or translate.endpoint in the config file",
                ENDPOINT_ENV_VAR
            )));
        }
        if self.job.chunk_size == 0 {
            return Err(SubtranError::Config("job.chunk_size must be at least 1".to_string()));
        }
        if self.job.separator.is_empty() {
            return Err(SubtranError::Config("job.separator must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = Config::default();
        assert_eq!(config.translate.max_retries, 3);
        assert_eq!(config.translate.retry_delay_ms, 2000);
        assert_eq!(config.job.chunk_size, 5);
        assert_eq!(config.job.separator, "\n\n");
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(SubtranError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file_endpoint() {
        let mut config = Config::default();
        config.translate.endpoint = "http://file.example/translate".to_string();

        config.apply_env(Some("  ".to_string()));
        assert_eq!(config.translate.endpoint, "http://file.example/translate");

        config.apply_env(Some("http://env.example/translate".to_string()));
        assert_eq!(config.translate.endpoint, "http://env.example/translate");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::default();
        config.translate.endpoint = "http://localhost:8000/translate".to_string();
        config.job.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            "[translate]\nendpoint = \"http://localhost:8000/translate\"\n",
        )
        .unwrap();
        assert_eq!(config.translate.max_retries, 3);
        assert_eq!(config.job.chunk_size, 5);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtran.toml");

        let mut config = Config::default();
        config.translate.endpoint = "http://localhost:8000/translate".to_string();
        config.job.chunk_size = 8;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.translate.endpoint, "http://localhost:8000/translate");
        assert_eq!(loaded.job.chunk_size, 8);
    }
}
