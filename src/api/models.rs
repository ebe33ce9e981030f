//! API data models

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::taxonomy::Category;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Newly created session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
}

/// Categories visible to a session
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListing {
    pub builtin: Vec<Category>,
    pub custom: Vec<Category>,
    pub names: Vec<String>,
}

/// Add-category form body; prompts are comma-separated
#[derive(Debug, Serialize, Deserialize)]
pub struct AddCategoryRequest {
    pub name: String,
    pub prompts: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// Handler error carrying the HTTP status to answer with
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn session_not_found(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("Session not found: {}", id),
        }
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        let status = match &e {
            ClassifierError::UserInput(_) => StatusCode::BAD_REQUEST,
            ClassifierError::Service(_) => StatusCode::BAD_GATEWAY,
            ClassifierError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}
