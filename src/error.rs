//! Error types for release planning

use crate::types::RepositoryFailure;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release planning operations
pub type Result<T> = std::result::Result<T, PlanningError>;

/// Main error type for release planning operations
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("Missing options: {}", .0.join(", "))]
    MissingRequiredOption(Vec<String>),

    #[error("Module source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Unable to process {repo}: {reason}")]
    RepositoryProcessing { repo: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No tag matching the tag filter in {0}")]
    NoMatchingTag(String),

    #[error("Network error: {0}")]
    NetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("API error from {service}: {message}")]
    ApiError { service: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("Formatting error: {0}")]
    FormatError(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Rate limit exceeded for {service}. Retry after: {retry_after:?}")]
    RateLimitExceeded {
        service: String,
        retry_after: Option<std::time::Duration>,
    },
}

#[derive(Debug)]
struct StringError(String);

impl std::fmt::Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StringError {}

impl PlanningError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(Box::new(StringError(msg.into())))
    }

    /// Create an API error
    pub fn api(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<RepositoryFailure> for PlanningError {
    fn from(failure: RepositoryFailure) -> Self {
        Self::RepositoryProcessing {
            repo: failure.repo,
            reason: failure.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_options_lists_every_flag() {
        let err = PlanningError::MissingRequiredOption(vec![
            "-n or -f".to_string(),
            "-t".to_string(),
            "-m or -c".to_string(),
        ]);
        assert_eq!(err.to_string(), "Missing options: -n or -f, -t, -m or -c");
    }

    #[test]
    fn test_repository_error_keeps_reason() {
        let inner = PlanningError::api("GitHub", "Repository not found");
        let err = PlanningError::from(RepositoryFailure {
            repo: "puppetlabs/apt".to_string(),
            reason: inner.to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Unable to process puppetlabs/apt: API error from GitHub: Repository not found"
        );
    }
}
