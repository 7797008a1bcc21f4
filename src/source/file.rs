use std::path::PathBuf;
use async_trait::async_trait;
use tracing::info;
use crate::errors::RemediationError;
use crate::models::Finding;
use super::provider::FindingSource;

/// Reads a JSON array of findings exported by a scanner.
pub struct FileFindingSource {
    path: PathBuf,
}

impl FileFindingSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl FindingSource for FileFindingSource {
    async fn fetch_findings(&self) -> Result<Vec<Finding>, RemediationError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let findings: Vec<Finding> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };
        info!(path = %self.path.display(), count = findings.len(), "Loaded findings file");
        Ok(findings)
    }

    fn source_name(&self) -> &str { "findings-file" }
}
