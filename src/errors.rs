use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unknown tool: {name}")]
    UnknownCapability { name: String },
    #[error("Unknown resource: {uri}")]
    UnknownResource { uri: String },
    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
    #[error("Division by zero is not allowed")]
    DivisionByZero,
    #[error("Failed to read {uri}: {reason}")]
    ResourceUnavailable { uri: String, reason: String },
    #[error("Unknown operation: {operation}")]
    UnknownOperation { operation: String },
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("internal error")]
    Internal { message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl AppError {
    pub fn unknown_capability(name: impl Into<String>) -> Self {
        Self::UnknownCapability { name: name.into() }
    }

    pub fn unknown_resource(uri: impl Into<String>) -> Self {
        Self::UnknownResource { uri: uri.into() }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn resource_unavailable(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable identifier of the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCapability { .. } => "unknown_capability",
            Self::UnknownResource { .. } => "unknown_resource",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::DivisionByZero => "division_by_zero",
            Self::ResourceUnavailable { .. } => "resource_unavailable",
            Self::UnknownOperation { .. } => "unknown_operation",
            Self::BadRequest { code, .. } => *code,
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Body attached to protocol errors. Internal faults never leak their message.
    pub fn to_error_response(&self) -> ErrorResponse {
        let (message, details) = match self {
            Self::UnknownCapability { name } => (self.to_string(), json!({ "name": name })),
            Self::UnknownResource { uri } => (self.to_string(), json!({ "uri": uri })),
            Self::ResourceUnavailable { uri, reason } => {
                (self.to_string(), json!({ "uri": uri, "reason": reason }))
            }
            Self::UnknownOperation { operation } => {
                (self.to_string(), json!({ "operation": operation }))
            }
            Self::BadRequest { message, .. } => (message.to_string(), json!({})),
            Self::Internal { message } => {
                tracing::error!(error = %message, "request failed with internal error");
                ("internal server error".to_string(), json!({}))
            }
            Self::InvalidArguments { .. } | Self::DivisionByZero => (self.to_string(), json!({})),
        };

        ErrorResponse {
            code: self.code().to_string(),
            message,
            details,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("stream i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}
