use std::path::Path;
use crate::errors::RemediationError;
use crate::scheduler::CronSchedule;
use super::types::RemediatorConfig;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

/// Load the config file if one was given, otherwise fall back to defaults.
pub async fn load_config(path: Option<&Path>) -> Result<RemediatorConfig, RemediationError> {
    match path {
        Some(p) => parse_config(p).await,
        None => {
            let config = RemediatorConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

pub async fn parse_config(path: &Path) -> Result<RemediatorConfig, RemediationError> {
    if !path.exists() {
        return Err(RemediationError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(RemediationError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    Ok(config)
}

pub fn parse_config_str(content: &str) -> Result<RemediatorConfig, RemediationError> {
    let config: RemediatorConfig = if content.trim().is_empty() {
        RemediatorConfig::default()
    } else {
        serde_yaml::from_str(content)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Reject values that would make the flow or scheduler unusable.
fn validate_config(config: &RemediatorConfig) -> Result<(), RemediationError> {
    if config.api.base_url.trim().is_empty() {
        return Err(RemediationError::Config("api.base_url must not be empty".into()));
    }
    if !config.api.base_url.starts_with("http://") && !config.api.base_url.starts_with("https://") {
        return Err(RemediationError::Config(format!(
            "api.base_url must be an http(s) URL: {}",
            config.api.base_url
        )));
    }
    if config.api.request_timeout_secs == 0 {
        return Err(RemediationError::Config("api.request_timeout_secs must be at least 1".into()));
    }
    if config.flow.max_concurrency == 0 {
        return Err(RemediationError::Config("flow.max_concurrency must be at least 1".into()));
    }
    if config.schedule.deployment_name == config.schedule.manual_deployment_name {
        return Err(RemediationError::Config(
            "schedule.deployment_name and schedule.manual_deployment_name must differ".into(),
        ));
    }
    CronSchedule::parse(&config.schedule.cron)
        .map_err(|e| RemediationError::Config(format!("schedule.cron: {}", e)))?;
    Ok(())
}
