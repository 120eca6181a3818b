use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload returned by the catalog service on non-success responses.
/// Older deployments use `error`, newer ones `message`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl GatewayError {
    pub fn rejected(status: u16, body: Option<ApiError>, fallback: &str) -> Self {
        let message = body
            .as_ref()
            .and_then(ApiError::text)
            .unwrap_or(fallback)
            .to_string();
        Self::Rejected { status, message }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport(message) => message,
            Self::Rejected { message, .. } => message,
        }
    }
}
