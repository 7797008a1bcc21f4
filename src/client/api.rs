use async_trait::async_trait;
use crate::errors::RemediationError;
use crate::models::{SessionDetails, SessionHandle};
use super::request::CreateSessionRequest;

/// The remote "create a monitored AI task" service.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Create a session. Retries, if any, happen inside the implementation.
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionHandle, RemediationError>;

    /// Fetch the current status and structured output of a session.
    async fn get_session(&self, session_id: &str) -> Result<SessionDetails, RemediationError>;
}
