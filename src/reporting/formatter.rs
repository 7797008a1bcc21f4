use chrono::{DateTime, Local, Utc};
use console::style;
use crate::models::FlowOutcome;
use crate::notify::Notification;
use crate::poll::SessionReport;
use crate::scheduler::DeploymentRegistry;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn heading(text: &str, color: bool) -> String {
    if color {
        style(text).bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn format_notification(n: &Notification, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&rule());
    out.push('\n');
    out.push_str(&heading("DAILY VULNERABILITY SCAN NOTIFICATION", color));
    out.push('\n');
    out.push_str(&rule());
    out.push('\n');
    out.push_str(&format!("Date: {}\n", n.scan_date));
    out.push_str(&format!("Time: {}\n", n.scan_time));
    out.push_str(&format!("Total Sessions Created: {}\n", n.total_sessions_created));
    out.push_str(&format!("Vulnerabilities Found: {}\n", n.total_vulnerabilities));
    out.push_str(&format!("  - High Severity: {}\n", n.high_severity));
    out.push_str(&format!("  - Medium Severity: {}\n", n.medium_severity));
    out.push_str(&format!("  - Low Severity: {}\n", n.low_severity));
    if n.total_sessions_created > 0 {
        out.push_str("\nSessions have been created and are being processed.\n");
    } else {
        out.push_str("\nNo vulnerabilities found in today's scan.\n");
    }
    out.push_str(&rule());
    out
}

/// Result block printed by a manual run.
pub fn format_run_result(outcome: &FlowOutcome) -> String {
    match outcome {
        FlowOutcome::NoVulnerabilities => "No vulnerabilities found in this scan.\n".to_string(),
        FlowOutcome::Completed(summary) => {
            let mut out = format!("Created {} sessions:\n", summary.total_sessions_created);
            out.push_str(&format!("\nOrchestrator: {}\n", summary.orchestrator_session.url));
            out.push_str("\nFix Sessions:\n");
            for session in &summary.fix_sessions {
                out.push_str(&format!("   - {}\n", session.url));
            }
            out
        }
    }
}

pub fn format_session_report(report: &SessionReport) -> String {
    let mut out = format!("Session: {}\n", report.session_id);
    out.push_str(&format!("Status: {}\n", report.status));
    out.push_str(&format!("State: {}\n", report.state));
    out.push_str(&"-".repeat(50));
    out.push('\n');
    match &report.output {
        Some(output) if output.is_parsed() => {
            out.push_str("Has structured output:\n");
            out.push_str(&output.to_pretty());
        }
        Some(output) => {
            out.push_str("Raw output (not valid JSON):\n");
            out.push_str(&output.to_pretty());
        }
        None => {
            out.push_str("No structured output available yet\n");
            out.push_str("The session might still be processing the task");
        }
    }
    out
}

/// Registered deployments with their next run in local time.
pub fn format_deployments(registry: &DeploymentRegistry, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for d in registry.iter() {
        out.push_str(&format!("Deployment: {}\n", d.name));
        if let Some(description) = &d.description {
            out.push_str(&format!("   {}\n", description));
        }
        match &d.schedule {
            Some(schedule) => {
                out.push_str(&format!("   Cron: {}\n", schedule.expression()));
                if let Some(next) = d.next_fire(now) {
                    out.push_str(&format!(
                        "   Next run: {}\n",
                        next.with_timezone(&Local).format("%Y-%m-%d %H:%M %Z")
                    ));
                }
            }
            None => out.push_str("   Schedule: none (manual trigger only)\n"),
        }
        if !d.tags.is_empty() {
            out.push_str(&format!("   Tags: {}\n", d.tags.join(", ")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScanSummary, SessionHandle, StructuredOutput};
    use chrono::Local;

    fn summary() -> ScanSummary {
        ScanSummary {
            scan_date: "2026-10-19".into(),
            scan_time: "08:00".into(),
            orchestrator_session: SessionHandle { id: "o".into(), url: "https://s/o".into() },
            fix_sessions: vec![
                SessionHandle { id: "a".into(), url: "https://s/a".into() },
                SessionHandle { id: "b".into(), url: "https://s/b".into() },
            ],
            total_sessions_created: 3,
            total_vulnerabilities: 2,
            high_severity: 1,
            medium_severity: 0,
            low_severity: 1,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_notification_block() {
        let text = format_notification(&Notification::from(&summary()), false);
        assert!(text.contains("Date: 2026-10-19"));
        assert!(text.contains("Total Sessions Created: 3"));
        assert!(text.contains("  - Low Severity: 1"));
        assert!(text.contains("being processed"));
    }

    #[test]
    fn test_run_result_lists_urls_in_order() {
        let text = format_run_result(&FlowOutcome::Completed(summary()));
        assert!(text.starts_with("Created 3 sessions:"));
        let a = text.find("https://s/a").unwrap();
        let b = text.find("https://s/b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_run_result_clean_scan() {
        let text = format_run_result(&FlowOutcome::NoVulnerabilities);
        assert!(text.contains("No vulnerabilities"));
    }

    #[test]
    fn test_deployments_listing() {
        use crate::config::ScheduleConfig;
        let registry = crate::scheduler::default_registry(&ScheduleConfig::default()).unwrap();
        let text = format_deployments(&registry, Utc::now());
        assert!(text.contains("Deployment: daily-8am-vulnerability-scan"));
        assert!(text.contains("Cron: 0 8 * * *"));
        assert!(text.contains("Next run: "));
        assert!(text.contains("manual trigger only"));
    }

    #[test]
    fn test_session_report_raw_output() {
        let report = SessionReport {
            session_id: "devin-1".into(),
            status: "running".into(),
            state: "working".into(),
            output: Some(StructuredOutput::Raw("half-written {".into())),
        };
        let text = format_session_report(&report);
        assert!(text.contains("Raw output (not valid JSON):"));
        assert!(text.contains("half-written {"));
    }
}
