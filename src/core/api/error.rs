//! Error types shared by every REST client

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Generic error label used when a failed response has no readable body
pub const FALLBACK_ERROR: &str = "Error";

/// Generic message used when a failed response has no readable body
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Structured error body returned by the backend for non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl ApiError {
    /// Error synthesized when the response body is not an error document
    pub fn fallback(status: u16) -> Self {
        Self {
            status,
            error: FALLBACK_ERROR.to_string(),
            message: FALLBACK_MESSAGE.to_string(),
            validation_errors: None,
        }
    }

    /// Decode a failed response body, falling back to the generic error
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|_| Self::fallback(status))
    }

    /// First field-level message, if the backend reported any
    pub fn first_validation_error(&self) -> Option<&str> {
        self.validation_errors
            .as_ref()
            .and_then(|errors| errors.values().next())
            .map(String::as_str)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.error, self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Connection-level failure: the request never produced an HTTP response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Request failed: {0}")]
pub struct TransportError(pub String);

/// Errors returned by the REST clients
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx response
    #[error("{0}")]
    Api(ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 2xx response whose body does not match the expected shape
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// Binary download rejected by the server
    #[error("Failed to download report (status {status})")]
    Download { status: u16 },
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        ClientError::Api(err)
    }
}

impl ClientError {
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(err) => Some(err.status),
            ClientError::Download { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }

    /// Text suitable for an inline error banner
    ///
    /// Prefers the first field-level validation message, then the server's
    /// message, then `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api(err) => err
                .first_validation_error()
                .map(str::to_string)
                .or_else(|| (!err.message.is_empty()).then(|| err.message.clone()))
                .unwrap_or_else(|| fallback.to_string()),
            _ => fallback.to_string(),
        }
    }
}
