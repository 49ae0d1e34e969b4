use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtranError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    /// Terminal failure: every attempt for one request failed.
    #[error("Max retries reached after {attempts} attempts. Translation failed: {last_error}")]
    MaxRetries { attempts: u32, last_error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Job cancelled: {0}")]
    Cancelled(String),
}

impl SubtranError {
    /// True for the error a retry loop gives up with.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MaxRetries { .. })
    }
}

pub type Result<T> = std::result::Result<T, SubtranError>;
