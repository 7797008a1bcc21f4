use std::time::Duration;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use crate::client::SessionApi;
use crate::errors::RemediationError;
use crate::models::StructuredOutput;

pub const SESSION_ID_PREFIX: &str = "devin-";

/// Accepts a bare id, a prefixed id, or a session URL, and returns the
/// prefixed id the API expects. An empty id is a `Config` error.
pub fn normalize_session_id(input: &str) -> Result<String, RemediationError> {
    let trimmed = input.trim();
    let id = match trimmed.find("/sessions/") {
        Some(pos) => trimmed[pos + "/sessions/".len()..]
            .split(['?', '#', '/'])
            .next()
            .unwrap_or_default(),
        None => trimmed,
    };
    let bare = id.strip_prefix(SESSION_ID_PREFIX).unwrap_or(id);
    if bare.is_empty() {
        return Err(RemediationError::Config(format!("no session id in '{}'", input)));
    }
    Ok(format!("{}{}", SESSION_ID_PREFIX, bare))
}

/// Snapshot of one session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub status: String,
    pub state: String,
    /// Decoded when possible, otherwise the raw payload.
    pub output: Option<StructuredOutput>,
}

pub async fn check_structured_output(
    api: &dyn SessionApi,
    session: &str,
) -> Result<SessionReport, RemediationError> {
    let session_id = normalize_session_id(session)?;
    let details = api.get_session(&session_id).await?;
    let output = details.structured_output().map(StructuredOutput::normalize_lossy);
    if let Some(StructuredOutput::Raw(_)) = &output {
        warn!(session_id = %session_id, "Structured output is not valid JSON, showing raw payload");
    }
    Ok(SessionReport {
        status: details.status_or_unknown().to_string(),
        state: details.state_or_unknown().to_string(),
        session_id,
        output,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Ready { output: StructuredOutput, status: String },
    TimedOut,
}

/// Poll a session until it reports structured output or `timeout` elapses.
/// Gateway timeouts and other transient failures are tolerated; anything
/// non-retryable ends the wait with an error.
pub async fn wait_for_structured_output(
    api: &dyn SessionApi,
    session_id: &str,
    settings: PollSettings,
) -> Result<PollOutcome, RemediationError> {
    let deadline = Instant::now() + settings.timeout;
    info!(session_id, timeout_secs = settings.timeout.as_secs(), "Waiting for structured output");

    loop {
        match api.get_session(session_id).await {
            Ok(details) => {
                if let Some(output) = details.structured_output() {
                    return Ok(PollOutcome::Ready {
                        output: output.normalize_lossy(),
                        status: details.status_or_unknown().to_string(),
                    });
                }
                debug!(session_id, status = details.status_or_unknown(), "No structured output yet");
            }
            Err(e) if e.classify().retryable => {
                debug!(session_id, error = %e, "Transient error while polling, continuing");
            }
            Err(e) => return Err(e),
        }

        if Instant::now() + settings.interval > deadline {
            warn!(session_id, "Timed out waiting for structured output");
            return Ok(PollOutcome::TimedOut);
        }
        tokio::time::sleep(settings.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CreateSessionRequest;
    use crate::models::{SessionDetails, SessionHandle};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays scripted `get_session` results, repeating the last one.
    struct ScriptedSessions {
        replies: Mutex<Vec<Result<serde_json::Value, u16>>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedSessions {
        fn new(replies: Vec<Result<serde_json::Value, u16>>) -> Self {
            Self { replies: Mutex::new(replies), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl SessionApi for ScriptedSessions {
        async fn create_session(&self, _: &CreateSessionRequest) -> Result<SessionHandle, RemediationError> {
            Err(RemediationError::Internal("not scripted".into()))
        }

        async fn get_session(&self, session_id: &str) -> Result<SessionDetails, RemediationError> {
            self.seen.lock().unwrap().push(session_id.to_string());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 { replies.remove(0) } else { replies[0].clone() };
            match reply {
                Ok(body) => Ok(serde_json::from_value(body).unwrap()),
                Err(status) => Err(RemediationError::Http { status, body: String::new() }),
            }
        }
    }

    fn fast() -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(5),
            timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_normalize_session_id() {
        assert_eq!(normalize_session_id("abc123").unwrap(), "devin-abc123");
        assert_eq!(normalize_session_id("devin-abc123").unwrap(), "devin-abc123");
        assert_eq!(
            normalize_session_id("https://app.devin.ai/sessions/f06264f43bb9").unwrap(),
            "devin-f06264f43bb9"
        );
        assert_eq!(
            normalize_session_id(" https://app.devin.ai/sessions/abc?tab=1 ").unwrap(),
            "devin-abc"
        );
    }

    #[test]
    fn test_empty_session_id_rejected() {
        for input in ["", "   ", "devin-", "https://app.devin.ai/sessions/", "https://app.devin.ai/sessions/?tab=1"] {
            assert!(
                matches!(normalize_session_id(input), Err(RemediationError::Config(_))),
                "{:?}",
                input
            );
        }
    }

    #[tokio::test]
    async fn test_check_without_session_id_sends_no_request() {
        let api = ScriptedSessions::new(vec![Ok(json!({"status": "running"}))]);
        let err = check_structured_output(&api, "https://app.devin.ai/sessions/").await.unwrap_err();
        assert!(matches!(err, RemediationError::Config(_)));
        assert!(api.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_parses_string_payload() {
        let api = ScriptedSessions::new(vec![Ok(json!({
            "status": "running",
            "state": "working",
            "structured_output": "{\"status\": \"fixing\"}"
        }))]);
        let report = check_structured_output(&api, "abc").await.unwrap();
        assert_eq!(report.session_id, "devin-abc");
        assert_eq!(report.status, "running");
        let map = report.output.unwrap().normalize().unwrap();
        assert_eq!(map["status"], "fixing");
        assert_eq!(api.seen.lock().unwrap()[0], "devin-abc");
    }

    #[tokio::test]
    async fn test_check_keeps_raw_payload_on_decode_failure() {
        let api = ScriptedSessions::new(vec![Ok(json!({"structured_output": "not json"}))]);
        let report = check_structured_output(&api, "devin-x").await.unwrap();
        assert_eq!(report.output, Some(StructuredOutput::Raw("not json".into())));
        assert_eq!(report.state, "unknown");
    }

    #[tokio::test]
    async fn test_wait_tolerates_gateway_timeouts() {
        let api = ScriptedSessions::new(vec![
            Err(504),
            Ok(json!({"status": "running"})),
            Ok(json!({"status": "running", "structured_output": {"phases": []}})),
        ]);
        let outcome = wait_for_structured_output(&api, "devin-1", fast()).await.unwrap();
        match outcome {
            PollOutcome::Ready { output, status } => {
                assert_eq!(status, "running");
                assert!(output.is_parsed());
            }
            PollOutcome::TimedOut => panic!("expected output"),
        }
        assert_eq!(api.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let api = ScriptedSessions::new(vec![Ok(json!({"status": "running"}))]);
        let outcome = wait_for_structured_output(&api, "devin-1", fast()).await.unwrap();
        assert_eq!(outcome, PollOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_wait_aborts_on_auth_failure() {
        let api = ScriptedSessions::new(vec![Err(401)]);
        let err = wait_for_structured_output(&api, "devin-1", fast()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(401));
    }
}
