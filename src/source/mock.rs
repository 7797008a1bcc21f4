use std::time::Duration;
use async_trait::async_trait;
use tracing::info;
use crate::errors::RemediationError;
use crate::models::{Finding, Severity};
use super::provider::FindingSource;

/// Stand-in for the SAST/SCA scanner API.
pub struct MockScanner {
    findings: Vec<Finding>,
    latency: Duration,
}

impl MockScanner {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings, latency: Duration::ZERO }
    }

    /// The canned four-finding scan across three repositories.
    pub fn sample() -> Self {
        Self::new(sample_findings())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl FindingSource for MockScanner {
    async fn fetch_findings(&self) -> Result<Vec<Finding>, RemediationError> {
        info!(source = self.source_name(), "Checking scanner for vulnerabilities");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        info!(count = self.findings.len(), "Scanner returned findings");
        Ok(self.findings.clone())
    }

    fn source_name(&self) -> &str { "mock-checkmarx" }
}

pub fn sample_findings() -> Vec<Finding> {
    vec![
        Finding {
            id: "CX-SQL-001".to_string(),
            vuln_type: "SQL Injection".to_string(),
            severity: Severity::High,
            repository: Some("backend-api".to_string()),
            file: "/api/users.py".to_string(),
            line: 45,
            description: "User input is not properly sanitized before being used in SQL query".to_string(),
        },
        Finding {
            id: "CX-XSS-002".to_string(),
            vuln_type: "Cross-Site Scripting (XSS)".to_string(),
            severity: Severity::Medium,
            repository: Some("frontend-app".to_string()),
            file: "/frontend/components/UserProfile.tsx".to_string(),
            line: 78,
            description: "User-controlled data is rendered without proper encoding".to_string(),
        },
        Finding {
            id: "CX-PATH-003".to_string(),
            vuln_type: "Path Traversal".to_string(),
            severity: Severity::High,
            repository: Some("backend-api".to_string()),
            file: "/api/files.py".to_string(),
            line: 23,
            description: "File path constructed from user input without validation".to_string(),
        },
        Finding {
            id: "CX-CRYPTO-004".to_string(),
            vuln_type: "Weak Cryptography".to_string(),
            severity: Severity::Medium,
            repository: Some("auth-service".to_string()),
            file: "/auth/password_utils.py".to_string(),
            line: 12,
            description: "MD5 hash used for password storage".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_sample_scan() {
        let findings = MockScanner::sample().fetch_findings().await.unwrap();
        assert_eq!(findings.len(), 4);
        let ids: HashSet<_> = findings.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_scan_is_ok() {
        let findings = MockScanner::empty().fetch_findings().await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_latency_is_simulated() {
        let started = std::time::Instant::now();
        MockScanner::empty()
            .with_latency(Duration::from_millis(20))
            .fetch_findings()
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
