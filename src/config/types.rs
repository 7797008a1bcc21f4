use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use crate::errors::RetryConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.devin.ai";
pub const DEFAULT_API_KEY_ENV: &str = "DEVIN_API_KEY";
pub const DEFAULT_CRON: &str = "0 8 * * *";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RemediatorConfig {
    pub api: ApiConfig,
    pub flow: FlowConfig,
    pub schedule: ScheduleConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Inline token or `$VAR` reference; takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Forwarded as the `idempotent` flag on session creation when set.
    pub idempotent: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            request_timeout_secs: 30,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            idempotent: false,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            ..RetryConfig::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Upper bound on concurrent fix-session creations.
    pub max_concurrency: usize,
    /// Simulated scanner latency for the built-in mock scanner.
    pub scan_latency_ms: u64,
    /// JSON file of findings to use instead of the mock scanner.
    pub findings_file: Option<PathBuf>,
    pub orchestrator_tags: Vec<String>,
    pub fix_tags: Vec<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            scan_latency_ms: 2000,
            findings_file: None,
            orchestrator_tags: vec![
                "daily-scan".to_string(),
                "automated".to_string(),
                "checkmarx".to_string(),
            ],
            fix_tags: vec!["vulnerability-fix".to_string(), "automated".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleTimezone {
    #[default]
    Local,
    Utc,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub cron: String,
    pub deployment_name: String,
    pub manual_deployment_name: String,
    pub timezone: ScheduleTimezone,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: DEFAULT_CRON.to_string(),
            deployment_name: "daily-8am-vulnerability-scan".to_string(),
            manual_deployment_name: "test-immediate".to_string(),
            timezone: ScheduleTimezone::Local,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
