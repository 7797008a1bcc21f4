use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, warn};
use crate::config::{ApiConfig, Credentials};
use crate::config::credentials::redact_credentials;
use crate::errors::{with_retry, RemediationError, RetryConfig};
use crate::models::{CreateSessionResponse, SessionDetails, SessionHandle};
use super::api::SessionApi;
use super::request::CreateSessionRequest;

/// `SessionApi` over HTTPS with a bearer token, a per-request timeout and
/// fixed-count retries.
pub struct HttpSessionClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryConfig,
    idempotent: bool,
}

impl HttpSessionClient {
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Result<Self, RemediationError> {
        let client = Client::builder()
            .timeout(api.request_timeout())
            .build()
            .map_err(|e| RemediationError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            credentials,
            retry: api.retry_config(),
            idempotent: api.idempotent,
        })
    }

    /// Resolve the token from the config/environment, then build the client.
    /// A missing token fails here, before any request is made.
    pub fn from_config(api: &ApiConfig) -> Result<Self, RemediationError> {
        let credentials = Credentials::resolve(api)?;
        Self::new(api, credentials)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_session(&self, request: &CreateSessionRequest) -> Result<SessionHandle, RemediationError> {
        let resp = self.client
            .post(format!("{}/v1/sessions", self.base_url))
            .bearer_auth(self.credentials.bearer())
            .json(request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let resp = self.check_status(resp).await?;
        let created: CreateSessionResponse = resp.json().await
            .map_err(|e| RemediationError::Decode(format!("Failed to parse create-session response: {}", e)))?;
        if created.is_new_session == Some(false) {
            info!(session_id = %created.session_id, "API returned an existing session for an idempotent request");
        }
        Ok(created.into())
    }

    async fn fetch_session(&self, session_id: &str) -> Result<SessionDetails, RemediationError> {
        let resp = self.client
            .get(format!("{}/v1/sessions/{}", self.base_url, session_id))
            .bearer_auth(self.credentials.bearer())
            .send()
            .await
            .map_err(classify_send_error)?;

        let resp = self.check_status(resp).await?;
        resp.json().await
            .map_err(|e| RemediationError::Decode(format!("Failed to parse session response: {}", e)))
    }

    async fn check_status(&self, resp: Response) -> Result<Response, RemediationError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let body = redact_credentials(&body, &[self.credentials.bearer()]);
        Err(RemediationError::Http { status: status.as_u16(), body })
    }
}

fn classify_send_error(e: reqwest::Error) -> RemediationError {
    if e.is_timeout() {
        RemediationError::Timeout(format!("Session API request timed out: {}", e))
    } else {
        RemediationError::Transport(format!("Session API request failed: {}", e))
    }
}

#[async_trait]
impl SessionApi for HttpSessionClient {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionHandle, RemediationError> {
        let mut request = request.clone();
        if self.idempotent && request.idempotent.is_none() {
            request.idempotent = Some(true);
        }
        let title = request.title.clone().unwrap_or_default();

        let mut attempt = 0u32;
        let handle = with_retry("create_session", &self.retry, || {
            attempt += 1;
            if attempt > 1 && request.idempotent != Some(true) {
                // The earlier attempt may have reached the server.
                warn!(title = %title, attempt, "Retrying non-idempotent session creation; a duplicate session may be created");
            }
            self.post_session(&request)
        }).await?;

        info!(session_id = %handle.id, url = %handle.url, title = %title, "Session created");
        Ok(handle)
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionDetails, RemediationError> {
        let details = with_retry("get_session", &self.retry, || self.fetch_session(session_id)).await?;
        debug!(session_id, status = details.status_or_unknown(), "Fetched session");
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ApiConfig {
            base_url: "https://api.example.test/".into(),
            ..ApiConfig::default()
        };
        let client = HttpSessionClient::new(&api, Credentials::new("tok-1234").unwrap()).unwrap();
        assert_eq!(client.base_url(), "https://api.example.test");
    }

    #[test]
    fn test_from_config_without_token_is_config_error() {
        let api = ApiConfig {
            api_key_env: "REMEDIATOR_TEST_CLIENT_UNSET".into(),
            ..ApiConfig::default()
        };
        let err = HttpSessionClient::from_config(&api).err().unwrap();
        assert!(matches!(err, RemediationError::Config(_)));
    }
}
