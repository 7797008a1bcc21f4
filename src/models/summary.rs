use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use super::finding::{Finding, SeverityCounts};
use super::session::SessionHandle;

/// Wall-clock instant captured once at the start of a run so that every
/// prompt, title and summary of that run agrees on the scan date.
#[derive(Debug, Clone, Copy)]
pub struct ScanClock {
    started: DateTime<Local>,
}

impl ScanClock {
    pub fn now() -> Self {
        Self { started: Local::now() }
    }

    pub fn at(started: DateTime<Local>) -> Self {
        Self { started }
    }

    pub fn scan_date(&self) -> String {
        self.started.format("%Y-%m-%d").to_string()
    }

    pub fn scan_time(&self) -> String {
        self.started.format("%H:%M").to_string()
    }

    pub fn date_time(&self) -> String {
        self.started.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Result of one completed remediation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_date: String,
    pub scan_time: String,
    pub orchestrator_session: SessionHandle,
    /// One handle per finding, in the order the scanner reported them.
    pub fix_sessions: Vec<SessionHandle>,
    pub total_sessions_created: usize,
    pub total_vulnerabilities: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
    pub timestamp: DateTime<Local>,
}

impl ScanSummary {
    pub fn assemble(
        clock: &ScanClock,
        findings: &[Finding],
        orchestrator_session: SessionHandle,
        fix_sessions: Vec<SessionHandle>,
    ) -> Self {
        let counts = SeverityCounts::from_findings(findings);
        Self {
            scan_date: clock.scan_date(),
            scan_time: clock.scan_time(),
            total_sessions_created: fix_sessions.len() + 1,
            orchestrator_session,
            fix_sessions,
            total_vulnerabilities: findings.len(),
            high_severity: counts.high,
            medium_severity: counts.medium,
            low_severity: counts.low,
            timestamp: Local::now(),
        }
    }
}

/// What a run returns to its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// The scan was clean; no sessions were created.
    NoVulnerabilities,
    Completed(ScanSummary),
}

impl FlowOutcome {
    pub fn sessions_created(&self) -> usize {
        match self {
            FlowOutcome::NoVulnerabilities => 0,
            FlowOutcome::Completed(s) => s.total_sessions_created,
        }
    }

    pub fn summary(&self) -> Option<&ScanSummary> {
        match self {
            FlowOutcome::NoVulnerabilities => None,
            FlowOutcome::Completed(s) => Some(s),
        }
    }
}

impl Serialize for FlowOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlowOutcome::NoVulnerabilities => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("status", "no_vulnerabilities")?;
                map.serialize_entry("sessions_created", &0)?;
                map.end()
            }
            FlowOutcome::Completed(summary) => summary.serialize(serializer),
        }
    }
}
