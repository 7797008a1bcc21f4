use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use crate::errors::RemediationError;

/// Identifier/URL pair of a remote session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub id: String,
    pub url: String,
}

/// Body returned by `POST /v1/sessions`. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub url: String,
    #[serde(default)]
    pub is_new_session: Option<bool>,
}

impl From<CreateSessionResponse> for SessionHandle {
    fn from(resp: CreateSessionResponse) -> Self {
        Self { id: resp.session_id, url: resp.url }
    }
}

/// Body returned by `GET /v1/sessions/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionDetails {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub structured_output: Option<StructuredOutput>,
}

impl SessionDetails {
    pub fn status_or_unknown(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }

    pub fn state_or_unknown(&self) -> &str {
        self.state.as_deref().unwrap_or("unknown")
    }

    /// Structured output, treating an empty string or empty object as absent.
    pub fn structured_output(&self) -> Option<&StructuredOutput> {
        self.structured_output.as_ref().filter(|o| !o.is_empty())
    }
}

/// Field name to initial value, embedded in a prompt for the session to keep updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredOutputTemplate(Map<String, Value>);

impl StructuredOutputTemplate {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Structured output as reported by the API: either a JSON-encoded string or
/// an already-decoded object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredOutput {
    Raw(String),
    Parsed(Map<String, Value>),
}

impl StructuredOutput {
    pub fn is_empty(&self) -> bool {
        match self {
            StructuredOutput::Raw(s) => s.trim().is_empty(),
            StructuredOutput::Parsed(m) => m.is_empty(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, StructuredOutput::Parsed(_))
    }

    /// Decode into a mapping. A raw payload that is not a JSON object is a `Decode` error.
    pub fn normalize(&self) -> Result<Map<String, Value>, RemediationError> {
        match self {
            StructuredOutput::Parsed(m) => Ok(m.clone()),
            StructuredOutput::Raw(s) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(m)) => Ok(m),
                Ok(other) => Err(RemediationError::Decode(format!(
                    "structured output is JSON but not an object: {}",
                    other
                ))),
                Err(e) => Err(RemediationError::Decode(format!(
                    "structured output is not valid JSON: {}",
                    e
                ))),
            },
        }
    }

    /// Like `normalize`, but keeps the raw payload when it cannot be decoded.
    pub fn normalize_lossy(&self) -> StructuredOutput {
        match self.normalize() {
            Ok(m) => StructuredOutput::Parsed(m),
            Err(_) => self.clone(),
        }
    }

    pub fn to_pretty(&self) -> String {
        match self {
            StructuredOutput::Raw(s) => s.clone(),
            StructuredOutput::Parsed(m) => {
                serde_json::to_string_pretty(m).unwrap_or_else(|_| format!("{:?}", m))
            }
        }
    }
}

impl From<Value> for StructuredOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(m) => StructuredOutput::Parsed(m),
            Value::String(s) => StructuredOutput::Raw(s),
            other => StructuredOutput::Raw(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for StructuredOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(StructuredOutput::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_response_into_handle() {
        let resp: CreateSessionResponse = serde_json::from_value(json!({
            "session_id": "devin-abc",
            "url": "https://app.devin.ai/sessions/abc",
            "is_new_session": true,
            "extra": 1
        })).unwrap();
        let handle = SessionHandle::from(resp);
        assert_eq!(handle.id, "devin-abc");
        assert_eq!(handle.url, "https://app.devin.ai/sessions/abc");
    }

    #[test]
    fn test_string_and_object_payloads_normalize_identically() {
        let as_string: SessionDetails = serde_json::from_value(json!({
            "status": "running",
            "structured_output": "{\"status\": \"fixing\", \"fixed\": false}"
        })).unwrap();
        let as_object: SessionDetails = serde_json::from_value(json!({
            "status": "running",
            "structured_output": {"status": "fixing", "fixed": false}
        })).unwrap();

        let a = as_string.structured_output().unwrap().normalize().unwrap();
        let b = as_object.structured_output().unwrap().normalize().unwrap();
        assert_eq!(a, b);
        assert_eq!(a["fixed"], json!(false));
    }

    #[test]
    fn test_invalid_raw_payload_is_decode_error() {
        let out = StructuredOutput::Raw("status: fixing".into());
        assert!(matches!(out.normalize(), Err(RemediationError::Decode(_))));
        assert_eq!(out.normalize_lossy(), out);
    }

    #[test]
    fn test_non_object_json_is_decode_error() {
        let out = StructuredOutput::Raw("[1, 2]".into());
        assert!(matches!(out.normalize(), Err(RemediationError::Decode(_))));
    }

    #[test]
    fn test_missing_and_empty_output_are_absent() {
        let none: SessionDetails = serde_json::from_value(json!({"status": "running"})).unwrap();
        assert!(none.structured_output().is_none());

        let null: SessionDetails = serde_json::from_value(json!({"structured_output": null})).unwrap();
        assert!(null.structured_output().is_none());

        let empty: SessionDetails = serde_json::from_value(json!({"structured_output": ""})).unwrap();
        assert!(empty.structured_output().is_none());
        assert_eq!(empty.status_or_unknown(), "unknown");
    }

    #[test]
    fn test_template_preserves_field_order() {
        let t = StructuredOutputTemplate::new()
            .field("scan_date", "2026-10-19")
            .field("status", "fixing")
            .field("fixed", false)
            .field("fix_timestamp", Value::Null);
        let rendered = t.render();
        let date_pos = rendered.find("scan_date").unwrap();
        let fixed_pos = rendered.find("\"fixed\"").unwrap();
        assert!(date_pos < fixed_pos);
        assert!(rendered.contains("\"fix_timestamp\": null"));
    }
}
