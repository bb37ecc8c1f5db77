use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

use crate::errors::ConfigError;

/// Portal settings, read from the environment (and `.env` through dotenvy).
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub api_base_url: String,
    pub bind_addr: SocketAddr,
    pub session_file: PathBuf,
    pub log_level: Level,
    /// Unset means the transport default: no timeout.
    pub request_timeout: Option<Duration>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            session_file: PathBuf::from(".ticket_portal/session.json"),
            log_level: Level::INFO,
            request_timeout: None,
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: addr.clone(),
            })?;
        }
        if let Some(path) = lookup("SESSION_FILE").filter(|v| !v.trim().is_empty()) {
            config.session_file = PathBuf::from(path.trim());
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = level.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "LOG_LEVEL",
                value: level.clone(),
            })?;
        }
        if let Some(secs) = lookup("API_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "API_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ShellConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ShellConfig::from_lookup(lookup(&[
            ("API_BASE_URL", "https://helpdesk.example.com"),
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("LOG_LEVEL", "debug"),
            ("API_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://helpdesk.example.com");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = ShellConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
