use serde::Serialize;
use crate::models::{ScanClock, ScanSummary, SeverityCounts};

/// Human-facing digest of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub scan_date: String,
    pub scan_time: String,
    pub total_sessions_created: usize,
    pub total_vulnerabilities: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
}

impl Notification {
    /// Digest for a clean scan.
    pub fn clean(clock: &ScanClock) -> Self {
        Self::from_counts(clock.scan_date(), clock.scan_time(), 0, SeverityCounts::default())
    }

    fn from_counts(scan_date: String, scan_time: String, sessions: usize, counts: SeverityCounts) -> Self {
        Self {
            scan_date,
            scan_time,
            total_sessions_created: sessions,
            total_vulnerabilities: counts.total(),
            high_severity: counts.high,
            medium_severity: counts.medium,
            low_severity: counts.low,
        }
    }
}

impl From<&ScanSummary> for Notification {
    fn from(summary: &ScanSummary) -> Self {
        Self {
            scan_date: summary.scan_date.clone(),
            scan_time: summary.scan_time.clone(),
            total_sessions_created: summary.total_sessions_created,
            total_vulnerabilities: summary.total_vulnerabilities,
            high_severity: summary.high_severity,
            medium_severity: summary.medium_severity,
            low_severity: summary.low_severity,
        }
    }
}
