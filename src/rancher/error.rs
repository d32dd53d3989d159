use thiserror::Error;

use crate::retry::PollTimeout;

/// Errors from the Rancher REST API.
///
/// Messages never include bearer tokens or passwords.
#[derive(Debug, Error)]
pub enum RancherError {
    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("{kind} not found: '{name}'")]
    NotFound { kind: String, name: String },

    #[error("token request failed: status {0}")]
    TokenStatus(u16),

    #[error("received empty token in response")]
    EmptyToken,

    #[error(transparent)]
    Timeout(#[from] PollTimeout),
}

impl RancherError {
    pub(crate) fn not_found(kind: &str, name: &str) -> Self {
        RancherError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }
}
