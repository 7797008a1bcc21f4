use serde_json::Value;
use crate::client::CreateSessionRequest;
use crate::models::{Finding, ScanClock, SeverityCounts, StructuredOutputTemplate};

/// Findings grouped by repository, in the order each repository first appears.
pub fn group_by_repository(findings: &[Finding]) -> Vec<(&str, Vec<&Finding>)> {
    let mut groups: Vec<(&str, Vec<&Finding>)> = Vec::new();
    for f in findings {
        let repo = f.repository_or_unknown();
        match groups.iter_mut().find(|(name, _)| *name == repo) {
            Some((_, members)) => members.push(f),
            None => groups.push((repo, vec![f])),
        }
    }
    groups
}

pub fn orchestrator_template(findings: &[Finding], clock: &ScanClock) -> StructuredOutputTemplate {
    let counts = SeverityCounts::from_findings(findings);
    StructuredOutputTemplate::new()
        .field("scan_date", clock.scan_date())
        .field("scan_time", clock.scan_time())
        .field("status", "initializing")
        .field("total_vulnerabilities", findings.len())
        .field("high_severity", counts.high)
        .field("medium_severity", counts.medium)
        .field("low_severity", counts.low)
        .field("remediation_progress", 0)
}

pub fn fix_template(finding: &Finding, scan_date: &str) -> StructuredOutputTemplate {
    StructuredOutputTemplate::new()
        .field("scan_date", scan_date)
        .field("repository", finding.repository_or_unknown())
        .field("vulnerability_id", finding.id.as_str())
        .field("status", "fixing")
        .field("fixed", false)
        .field("fix_timestamp", Value::Null)
}

pub fn orchestrator_prompt(findings: &[Finding], clock: &ScanClock) -> String {
    let mut listing = String::new();
    for (repo, members) in group_by_repository(findings) {
        listing.push_str(&format!("\n**Repository: {}**\n", repo));
        for f in members {
            listing.push_str(&format!("  - {}: {} ({})\n", f.id, f.vuln_type, f.severity));
        }
    }

    format!(
        "Daily vulnerability scan orchestrator for {date}.\n\n\
         Orchestrate vulnerability remediation across multiple repositories:\n\
         {listing}\n\
         Track progress with this structured output:\n\
         {template}\n",
        date = clock.scan_date(),
        listing = listing,
        template = orchestrator_template(findings, clock).render(),
    )
}

pub fn orchestrator_title(clock: &ScanClock) -> String {
    format!("Daily Vulnerability Scan - {}", clock.date_time())
}

pub fn fix_prompt(finding: &Finding, scan_date: &str) -> String {
    format!(
        "Fix this security vulnerability found in daily scan on {scan_date}:\n\n\
         **Repository**: {repo}\n\
         **ID**: {id}\n\
         **Type**: {vuln_type}\n\
         **Severity**: {severity}\n\
         **File**: {file}\n\
         **Line**: {line}\n\n\
         {description}\n\n\
         Update this structured output:\n\
         {template}\n",
        scan_date = scan_date,
        repo = finding.repository_or_unknown(),
        id = finding.id,
        vuln_type = finding.vuln_type,
        severity = finding.severity,
        file = finding.file,
        line = finding.line,
        description = finding.description,
        template = fix_template(finding, scan_date).render(),
    )
}

pub fn fix_title(finding: &Finding, scan_date: &str) -> String {
    format!("[{}] Fix {}", scan_date, finding.id)
}

/// Creation request for the single orchestrator session of a scan.
pub fn orchestrator_request(findings: &[Finding], clock: &ScanClock, tags: &[String]) -> CreateSessionRequest {
    CreateSessionRequest::new(orchestrator_prompt(findings, clock))
        .with_title(orchestrator_title(clock))
        .with_tags(tags.iter().cloned())
}

/// Creation request for the fix session of one finding. The finding's
/// severity is appended to `tags`.
pub fn fix_request(finding: &Finding, clock: &ScanClock, tags: &[String]) -> CreateSessionRequest {
    let scan_date = clock.scan_date();
    CreateSessionRequest::new(fix_prompt(finding, &scan_date))
        .with_title(fix_title(finding, &scan_date))
        .with_tags(tags.iter().cloned())
        .with_tags([finding.severity.as_tag()])
}
