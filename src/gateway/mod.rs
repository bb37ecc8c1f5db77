//! Access to the help-desk REST backend.
//!
//! Every other part of the portal reaches the backend through a
//! [`BackendGateway`]; the HTTP implementation lives in [`http`] and the typed
//! collection helpers in [`resources`].

pub mod http;
pub mod resources;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::errors::GatewayError;

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const CURRENT_USER_PATH: &str = "/api/usuarios/me/";

/// A single call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query = params;
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }
}

/// The sole channel to the REST API.
///
/// Implementations must attach `bearer` as an `Authorization: Bearer` header,
/// map non-2xx answers to [`GatewayError::Status`] keeping the body, and return
/// `Value::Null` for empty bodies.
#[async_trait]
pub trait BackendGateway: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError>;
}
