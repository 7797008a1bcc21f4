use async_trait::async_trait;
use crate::errors::RemediationError;
use crate::models::Finding;

#[async_trait]
pub trait FindingSource: Send + Sync {
    /// Fetch the current scan's findings. An empty list means a clean scan,
    /// not a failure.
    async fn fetch_findings(&self) -> Result<Vec<Finding>, RemediationError>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}
