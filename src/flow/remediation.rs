use std::sync::Arc;
use futures::stream::{self, StreamExt};
use tracing::{error, info, info_span, warn, Instrument};
use crate::client::{CreateSessionRequest, SessionApi};
use crate::config::FlowConfig;
use crate::errors::RemediationError;
use crate::models::{Finding, FlowOutcome, ScanClock, ScanSummary, SessionHandle};
use crate::notify::{Notification, Notifier};
use crate::prompts::{fix_request, orchestrator_request};
use crate::source::FindingSource;
use super::stage::FlowStage;

#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Upper bound on fix-session creations in flight at once.
    pub max_concurrency: usize,
    pub orchestrator_tags: Vec<String>,
    pub fix_tags: Vec<String>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self::from(&FlowConfig::default())
    }
}

impl From<&FlowConfig> for FlowSettings {
    fn from(config: &FlowConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency,
            orchestrator_tags: config.orchestrator_tags.clone(),
            fix_tags: config.fix_tags.clone(),
        }
    }
}

/// fetch findings -> one orchestrator session -> one fix session per finding
/// -> summary -> notification.
///
/// Each run is independent; the flow holds no state between runs.
pub struct RemediationFlow {
    source: Arc<dyn FindingSource>,
    sessions: Arc<dyn SessionApi>,
    notifier: Arc<dyn Notifier>,
    settings: FlowSettings,
}

impl RemediationFlow {
    pub fn new(
        source: Arc<dyn FindingSource>,
        sessions: Arc<dyn SessionApi>,
        notifier: Arc<dyn Notifier>,
        settings: FlowSettings,
    ) -> Self {
        Self { source, sessions, notifier, settings }
    }

    pub async fn run(&self) -> Result<FlowOutcome, RemediationError> {
        self.run_at(ScanClock::now()).await
    }

    /// Run with a fixed scan clock.
    pub async fn run_at(&self, clock: ScanClock) -> Result<FlowOutcome, RemediationError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("flow_run", run_id = %run_id, scan_date = %clock.scan_date());
        self.execute(clock).instrument(span).await
    }

    async fn execute(&self, clock: ScanClock) -> Result<FlowOutcome, RemediationError> {
        info!(scan_date = %clock.scan_date(), "Starting daily vulnerability scan");

        self.enter(FlowStage::Fetching);
        let findings = self.source.fetch_findings().await.map_err(|e| {
            RemediationError::Flow(format!(
                "fetching findings from {} failed: {}",
                self.source.source_name(),
                e
            ))
        })?;

        if findings.is_empty() {
            info!("No vulnerabilities found in today's scan");
            self.deliver(&Notification::clean(&clock)).await;
            self.enter(FlowStage::Done);
            return Ok(FlowOutcome::NoVulnerabilities);
        }
        info!(count = findings.len(), "Vulnerabilities found");

        self.enter(FlowStage::Orchestrating);
        let request = orchestrator_request(&findings, &clock, &self.settings.orchestrator_tags);
        let orchestrator = self.sessions.create_session(&request).await.map_err(|e| {
            RemediationError::Flow(format!("creating orchestrator session failed: {}", e))
        })?;
        info!(session_id = %orchestrator.id, url = %orchestrator.url, "Orchestrator session created");

        self.enter(FlowStage::Fixing);
        let fix_sessions = match self.create_fix_sessions(&findings, &clock).await {
            Ok(handles) => handles,
            Err(e) => {
                warn!(
                    session_id = %orchestrator.id,
                    url = %orchestrator.url,
                    "Run aborted after orchestrator session was created; session left orphaned"
                );
                return Err(e);
            }
        };

        self.enter(FlowStage::Summarizing);
        let summary = ScanSummary::assemble(&clock, &findings, orchestrator, fix_sessions);
        self.deliver(&Notification::from(&summary)).await;

        self.enter(FlowStage::Done);
        info!(
            sessions_created = summary.total_sessions_created,
            vulnerabilities = summary.total_vulnerabilities,
            "Daily vulnerability scan completed"
        );
        Ok(FlowOutcome::Completed(summary))
    }

    /// Create one fix session per finding with at most `max_concurrency` in
    /// flight. Waits for every call to finish; handles come back in finding
    /// order. Any failure fails the step.
    async fn create_fix_sessions(
        &self,
        findings: &[Finding],
        clock: &ScanClock,
    ) -> Result<Vec<SessionHandle>, RemediationError> {
        let limit = self.settings.max_concurrency.max(1);
        let fix_tags = &self.settings.fix_tags;
        let sessions = &self.sessions;

        let requests: Vec<CreateSessionRequest> = findings
            .iter()
            .map(|finding| fix_request(finding, clock, fix_tags))
            .collect();
        info!(count = requests.len(), limit, "Creating fix sessions");

        // Collected up front so the run future stays `Send`.
        let calls: Vec<_> = requests
            .iter()
            .map(|request| sessions.create_session(request))
            .collect();
        let results: Vec<Result<SessionHandle, RemediationError>> = stream::iter(calls)
            .buffered(limit)
            .collect()
            .await;

        let mut handles = Vec::with_capacity(findings.len());
        let mut failed = Vec::new();
        for (finding, result) in findings.iter().zip(results) {
            match result {
                Ok(handle) => {
                    info!(finding_id = %finding.id, url = %handle.url, "Fix session created");
                    handles.push(handle);
                }
                Err(e) => {
                    error!(finding_id = %finding.id, error = %e, "Fix session creation failed");
                    failed.push(finding.id.clone());
                }
            }
        }

        if !failed.is_empty() {
            for handle in &handles {
                warn!(session_id = %handle.id, url = %handle.url, "Fix session created but run aborted; session left orphaned");
            }
            return Err(RemediationError::Flow(format!(
                "{} of {} fix sessions failed: {}",
                failed.len(),
                findings.len(),
                failed.join(", ")
            )));
        }

        Ok(handles)
    }

    async fn deliver(&self, notification: &Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(channel = self.notifier.channel_name(), error = %e, "Notification failed");
        }
    }

    fn enter(&self, stage: FlowStage) {
        info!(stage = %stage, "Flow stage");
    }
}
