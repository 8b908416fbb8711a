// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Connection descriptor for an IPF route.

use std::time::Duration;

use edilink_core::{EdiError, Result};

/// Connection parameters for one IPF route.
///
/// All of host, port, credentials, environment tag and system id are
/// required; [`IpfConfig::validate`] fails closed before any network call is
/// made. Certificate verification is on unless explicitly disabled for a
/// development endpoint.
#[derive(Debug, Clone)]
pub struct IpfConfig {
    /// API host including scheme, e.g. `https://ipf.example.com`.
    pub host: String,
    /// API port as it appears in the URL.
    pub port: String,
    /// Credential id (`{client}` in URL templates).
    pub client_id: String,
    /// Credential secret (`{secret}` in URL templates).
    pub client_secret: String,
    /// Value of the `AF-Environment` header, e.g. `U1`, `T2`, `PROD`.
    pub environment: String,
    /// Value of the `AF-SystemId` header.
    pub system_id: String,
    /// Pass-through assertion token for message types that require one.
    pub assertion_token: Option<String>,
    /// Verify the server certificate. Disable only against development
    /// endpoints.
    pub verify_server_certificate: bool,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Overall request timeout (connect + read).
    pub request_timeout: Duration,
}

impl Default for IpfConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            environment: String::new(),
            system_id: String::new(),
            assertion_token: None,
            verify_server_certificate: true,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl IpfConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Variables: `EDILINK_IPF_HOST`, `EDILINK_IPF_PORT`,
    /// `EDILINK_IPF_CLIENT_ID`, `EDILINK_IPF_CLIENT_SECRET`,
    /// `EDILINK_IPF_ENVIRONMENT`, `EDILINK_IPF_SYSTEM_ID`,
    /// `EDILINK_IPF_ASSERTION_TOKEN` (optional),
    /// `EDILINK_IPF_VERIFY_CERT` (default `true`),
    /// `EDILINK_IPF_CONNECT_TIMEOUT_MS` (default 10000),
    /// `EDILINK_IPF_REQUEST_TIMEOUT_MS` (default 30000).
    ///
    /// Missing required values surface through [`IpfConfig::validate`] at
    /// dispatch time, not here.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let millis = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        Self {
            host: var("EDILINK_IPF_HOST"),
            port: var("EDILINK_IPF_PORT"),
            client_id: var("EDILINK_IPF_CLIENT_ID"),
            client_secret: var("EDILINK_IPF_CLIENT_SECRET"),
            environment: var("EDILINK_IPF_ENVIRONMENT"),
            system_id: var("EDILINK_IPF_SYSTEM_ID"),
            assertion_token: std::env::var("EDILINK_IPF_ASSERTION_TOKEN").ok(),
            verify_server_certificate: std::env::var("EDILINK_IPF_VERIFY_CERT")
                .map(|v| !(v.eq_ignore_ascii_case("false") || v == "0"))
                .unwrap_or(true),
            connect_timeout: Duration::from_millis(millis("EDILINK_IPF_CONNECT_TIMEOUT_MS", 10_000)),
            request_timeout: Duration::from_millis(millis("EDILINK_IPF_REQUEST_TIMEOUT_MS", 30_000)),
        }
    }

    /// Set the API host (scheme included).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API port.
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Set the credential pair.
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Set the environment tag.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the system id.
    pub fn with_system_id(mut self, system_id: impl Into<String>) -> Self {
        self.system_id = system_id.into();
        self
    }

    /// Set the pass-through assertion token.
    pub fn with_assertion_token(mut self, token: impl Into<String>) -> Self {
        self.assertion_token = Some(token.into());
        self
    }

    /// Enable or disable server certificate verification.
    pub fn with_verify_server_certificate(mut self, verify: bool) -> Self {
        self.verify_server_certificate = verify;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the overall request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check that every required field is set, naming the missing ones.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.host.is_empty() {
            missing.push("host");
        }
        if self.port.is_empty() {
            missing.push("port");
        }
        if self.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.is_empty() {
            missing.push("client_secret");
        }
        if self.environment.is_empty() {
            missing.push("environment");
        }
        if self.system_id.is_empty() {
            missing.push("system_id");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EdiError::MissingConnectionConfig { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> IpfConfig {
        IpfConfig::new()
            .with_host("https://ipf.example.com")
            .with_port("443")
            .with_credentials("client-1", "secret-1")
            .with_environment("U1")
            .with_system_id("AF-SYSTEM")
    }

    #[test]
    fn test_default_config() {
        let config = IpfConfig::default();
        assert!(config.verify_server_certificate);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.assertion_token.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let config = complete()
            .with_assertion_token("jwt")
            .with_verify_server_certificate(false)
            .with_connect_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(60));
        assert_eq!(config.host, "https://ipf.example.com");
        assert_eq!(config.client_id, "client-1");
        assert_eq!(config.assertion_token.as_deref(), Some("jwt"));
        assert!(!config.verify_server_certificate);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_validate_accepts_complete_descriptor() {
        complete().validate().unwrap();
    }

    #[test]
    fn test_validate_names_every_missing_field() {
        let err = IpfConfig::default().validate().unwrap_err();
        match err {
            EdiError::MissingConnectionConfig { missing } => {
                assert_eq!(
                    missing,
                    vec![
                        "host",
                        "port",
                        "client_id",
                        "client_secret",
                        "environment",
                        "system_id"
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_names_single_missing_field() {
        let mut config = complete();
        config.client_secret = String::new();
        let err = config.validate().unwrap_err();
        match err {
            EdiError::MissingConnectionConfig { missing } => {
                assert_eq!(missing, vec!["client_secret"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
