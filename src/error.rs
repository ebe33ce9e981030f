//! Error types for classification actions

use serde::Serialize;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Errors that abort the current action
#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    /// Missing or invalid startup settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The classification service could not be reached or rejected the request
    #[error("Classification service error: {0}")]
    Service(String),

    /// Input rejected locally before any network call
    #[error("Invalid input: {0}")]
    UserInput(String),
}

impl ClassifierError {
    pub fn is_user_input(&self) -> bool {
        matches!(self, ClassifierError::UserInput(_))
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(e: reqwest::Error) -> Self {
        ClassifierError::Service(e.to_string())
    }
}

/// Why a single video id could not be turned into a stream URL.
///
/// These never abort a resolution; they are collected next to the URLs
/// that did resolve.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ResolveFailure {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("metadata endpoint returned status {0}")]
    Status(u16),

    #[error("malformed metadata response: {0}")]
    Malformed(String),

    #[error("no HLS video URL in metadata")]
    MissingUrl,
}
