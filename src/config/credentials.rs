use tracing::debug;
use crate::config::ApiConfig;
use crate::errors::RemediationError;

/// Bearer token for the session API. Resolved once at startup and handed to
/// the client; never printed.
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Result<Self, RemediationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(RemediationError::Config("API token is empty".into()));
        }
        Ok(Self { token })
    }

    /// Read the token from the named environment variable.
    pub fn from_env(var_name: &str) -> Result<Self, RemediationError> {
        match std::env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(var = %var_name, "Resolved API token from environment");
                Ok(Self { token: value })
            }
            _ => Err(RemediationError::Config(format!(
                "{} not found in environment",
                var_name
            ))),
        }
    }

    /// Resolve from config: an inline `api_key` (possibly a `$VAR` reference)
    /// wins over `api_key_env`.
    pub fn resolve(api: &ApiConfig) -> Result<Self, RemediationError> {
        match api.api_key.as_deref() {
            Some(value) => match value.strip_prefix('$') {
                Some(var_name) => Self::from_env(var_name),
                None => Self::new(value),
            },
            None => Self::from_env(&api.api_key_env),
        }
    }

    pub fn bearer(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("token", &"[REDACTED]").finish()
    }
}

/// Redact sensitive values in a string. Replaces known credential patterns
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}
