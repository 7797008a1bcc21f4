use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Flow error: {0}")]
    Flow(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RemediationError {
    /// True for the transport family: network failures, timeouts and non-2xx replies.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RemediationError::Transport(_) | RemediationError::Http { .. } | RemediationError::Timeout(_)
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            RemediationError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
