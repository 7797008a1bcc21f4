use super::types::RemediationError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl RemediationError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            RemediationError::Transport(_) => ErrorClassification {
                error_type: "TransportError",
                retryable: true,
            },
            RemediationError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },
            RemediationError::Http { status, .. } => match status {
                429 => ErrorClassification {
                    error_type: "RateLimitError",
                    retryable: true,
                },
                408 | 500..=599 => ErrorClassification {
                    error_type: "TransportError",
                    retryable: true,
                },
                401 | 403 => ErrorClassification {
                    error_type: "AuthenticationError",
                    retryable: false,
                },
                _ => ErrorClassification {
                    error_type: "RequestError",
                    retryable: false,
                },
            },
            RemediationError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },

            // Non-retryable errors
            RemediationError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            RemediationError::Decode(_) => ErrorClassification {
                error_type: "DecodeError",
                retryable: false,
            },
            RemediationError::Flow(_) => ErrorClassification {
                error_type: "FlowError",
                retryable: false,
            },
            RemediationError::Schedule(_) => ErrorClassification {
                error_type: "ScheduleError",
                retryable: false,
            },
            RemediationError::Notify(_) => ErrorClassification {
                error_type: "NotifyError",
                retryable: false,
            },
            RemediationError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            RemediationError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            RemediationError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
