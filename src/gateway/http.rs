use async_trait::async_trait;
use serde_json::Value;

use crate::config::ShellConfig;
use crate::errors::GatewayError;
use crate::gateway::{ApiRequest, BackendGateway};

/// reqwest-backed gateway against the configured API base URL.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ShellConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = request.bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            tracing::warn!(method = %request.method, %url, "backend unreachable: {}", err);
            GatewayError::from(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        tracing::debug!(method = %request.method, %url, status = status.as_u16(), "backend answered");

        if status.is_success() {
            body.ok_or_else(|| GatewayError::Decode(format!("{} {} returned non-JSON", request.method, url)))
        } else {
            Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Empty bodies (204 No Content) read as `null`; non-JSON bodies as `None`.
fn decode_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Some(Value::Null);
    }
    serde_json::from_slice(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(decode_body(b""), Some(Value::Null));
        assert_eq!(decode_body(b" \n"), Some(Value::Null));
    }

    #[test]
    fn html_error_page_is_not_json() {
        assert_eq!(decode_body(b"<html>502</html>"), None);
        assert_eq!(decode_body(br#"{"detail":"x"}"#), Some(json!({"detail": "x"})));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = ShellConfig {
            api_base_url: "http://localhost:8000/".to_string(),
            ..ShellConfig::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(
            gateway.url("/api/tickets/"),
            "http://localhost:8000/api/tickets/"
        );
    }
}
