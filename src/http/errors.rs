use serde::Deserialize;
use thiserror::Error;

/// Failures talking to the backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with HTTP {status}")]
    Status {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Error body the backend sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for the user: the server's own message when it sent one,
    /// otherwise a description of what went wrong on the wire
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            BackendError::Status { status, .. } => {
                format!("Request failed with status code {status}")
            }
            BackendError::Transport { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }

    pub(crate) fn from_status(endpoint: &str, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.error)
            .filter(|message| !message.trim().is_empty());
        BackendError::Status {
            endpoint: endpoint.to_string(),
            status,
            message,
        }
    }
}
