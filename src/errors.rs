use serde_json::Value;
use thiserror::Error;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend answered with status {status}")]
    Status { status: u16, body: Option<Value> },

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Status { status: 401, .. })
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            GatewayError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Message suited for the login screen: `detail`, then the first
    /// `non_field_errors` entry.
    pub fn login_message(&self, fallback: &str) -> String {
        let Some(body) = self.body() else {
            return fallback.to_string();
        };
        if let Some(detail) = body.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
        body.get("non_field_errors")
            .and_then(Value::as_array)
            .and_then(|errors| errors.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Most specific human-readable message the backend provided.
    ///
    /// Field errors are flattened as `field: a, b; other: c`.
    pub fn human_message(&self, fallback: &str) -> String {
        let Some(body) = self.body() else {
            return fallback.to_string();
        };
        for key in ["detail", "message"] {
            if let Some(text) = body.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
        let Some(fields) = body.as_object() else {
            return fallback.to_string();
        };
        let joined = fields
            .iter()
            .map(|(field, value)| format!("{}: {}", field, flatten(value)))
            .collect::<Vec<_>>()
            .join("; ");
        if joined.is_empty() {
            fallback.to_string()
        } else {
            joined
        }
    }
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(flatten).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected identifier/secret, locked account or unreachable login endpoint.
    #[error("{0}")]
    Credential(String),

    /// Token accepted but the profile lookup failed. Login degrades instead of
    /// surfacing this.
    #[error("profile could not be resolved: {0}")]
    ProfileResolution(#[source] GatewayError),

    /// A persisted token whose profile could not be resolved at boot.
    #[error("persisted session is no longer valid")]
    SessionInvalid,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
