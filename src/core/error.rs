//! Chat platform error types
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Decode the platform's JSON error body into `ApiError::Server`
//! - 1.0.0: Initial transport/decode errors

use log::error;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the chat platform client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{message} (id: {id}, status: {status})")]
    Server {
        status: u16,
        id: String,
        message: String,
        detailed_error: String,
    },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Error body as sent by the server on failed requests
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    detailed_error: String,
}

impl ApiError {
    /// Build a `Server` error from a status code and raw response body.
    ///
    /// Bodies that are not the platform's error JSON are kept verbatim in
    /// `detailed_error` so nothing is lost from the diagnostic.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.id.is_empty() || !parsed.message.is_empty() => ApiError::Server {
                status,
                id: parsed.id,
                message: parsed.message,
                detailed_error: parsed.detailed_error,
            },
            _ => ApiError::Server {
                status,
                id: String::new(),
                message: format!("request failed with status {status}"),
                detailed_error: body.to_string(),
            },
        }
    }

    /// Shorthand for a server-side error, mostly useful for fakes in tests
    pub fn server(status: u16, id: &str, message: &str) -> Self {
        ApiError::Server {
            status,
            id: id.to_string(),
            message: message.to_string(),
            detailed_error: String::new(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Log the full diagnostic (message, error id, detailed error)
    pub fn log_details(&self, context: &str) {
        error!("{context}");
        match self {
            ApiError::Server {
                status,
                id,
                message,
                detailed_error,
            } => {
                error!("  Error Details:");
                error!("    message: {message}");
                error!("    id: {id}");
                error!("    detailed_error: {detailed_error}");
                error!("    status: {status}");
            }
            other => error!("  {other}"),
        }
    }
}
