use thiserror::Error;

/// Errors surfaced by the upstream clients and the unification layer.
///
/// A 429 is not represented here: the request queue treats it as a retry
/// signal and the caller never observes it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error: {status}")]
    Status { status: u16 },

    #[error("malformed upstream payload: {0}")]
    UpstreamData(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{entity} not found upstream")]
    NotFound { entity: String },
}

impl ClientError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamData(msg.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// True for responses that were received but carried a non-success status.
    #[must_use]
    pub const fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::UpstreamData(err.to_string())
    }
}
