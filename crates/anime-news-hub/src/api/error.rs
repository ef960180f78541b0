//! Error types for upstream requests

use reqwest::StatusCode;

/// Errors that can occur when talking to an upstream catalog
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{source_name} request error: {error}")]
    Http {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },

    #[error("{source_name} API error: {status}: {body}")]
    Status {
        source_name: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{source_name} GraphQL error: {message}")]
    GraphQl {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} returned an unexpected payload: {error}")]
    Decode {
        source_name: &'static str,
        #[source]
        error: serde_json::Error,
    },

    #[error("{source_name} does not serve feed {feed}")]
    Unsupported {
        source_name: &'static str,
        feed: String,
    },
}

impl SourceError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Http { .. } => true,
            SourceError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            SourceError::GraphQl { .. }
            | SourceError::Decode { .. }
            | SourceError::Unsupported { .. } => false,
        }
    }
}
