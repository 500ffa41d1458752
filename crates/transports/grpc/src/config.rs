//! Client configuration
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Environment values override the file; callers (e.g. CLI flags) override both.

use crate::connection::{Connection, ConnectionProvider, TlsOptions, TransportSecurity};
use crate::error::{ConfigError, Result as GatewayResult};
use crate::invoker::CallOptions;
use crate::metadata::CallContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoint used for local development
pub const DEFAULT_ENDPOINT: &str = "localhost:50051";

/// Calling application name sent when none is configured
pub const DEFAULT_REQUEST_SERVICE: &str = "example-rust-test";

/// Settings for reaching the Transaction Gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// `host:port` or full URI of the gateway
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Use TLS instead of plaintext
    #[serde(default)]
    pub tls: bool,

    /// Extra trusted CA certificate (PEM)
    #[serde(default)]
    pub ca_certificate: Option<PathBuf>,

    /// Override for the TLS verification host name
    #[serde(default)]
    pub tls_domain: Option<String>,

    /// Value of the `x-request-service` header
    #[serde(default = "default_request_service")]
    pub request_service: String,

    /// Value of the optional `x-request-id` header
    #[serde(default)]
    pub request_id: Option<String>,

    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,

    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_service() -> String {
    DEFAULT_REQUEST_SERVICE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            tls: false,
            ca_certificate: None,
            tls_domain: None,
            request_service: default_request_service(),
            request_id: None,
            connect_timeout_ms: None,
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        let config: ClientConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load the file named by `path` (or `TX_GATEWAY_CONFIG`) when present, then
    /// apply environment overrides
    ///
    /// The result is not validated: callers layer their own overrides on top and
    /// call [`ClientConfig::validate`] once the final values are known.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        let file = path
            .map(|p| p.as_ref().to_path_buf())
            .or_else(|| std::env::var("TX_GATEWAY_CONFIG").ok().map(PathBuf::from));

        let mut config = match file {
            Some(p) => Self::from_file(p)?,
            None => ClientConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from `TX_GATEWAY_*` variables resolved through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("TX_GATEWAY_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(tls) = lookup("TX_GATEWAY_TLS") {
            self.tls = parse_bool("TX_GATEWAY_TLS", &tls)?;
        }
        // A CA certificate or verification host implies TLS
        if let Some(path) = lookup("TX_GATEWAY_CA_CERT") {
            self.ca_certificate = Some(PathBuf::from(path));
            self.tls = true;
        }
        if let Some(domain) = lookup("TX_GATEWAY_TLS_DOMAIN") {
            self.tls_domain = Some(domain);
            self.tls = true;
        }
        if let Some(service) = lookup("TX_GATEWAY_REQUEST_SERVICE") {
            self.request_service = service;
        }
        if let Some(id) = lookup("TX_GATEWAY_REQUEST_ID") {
            self.request_id = Some(id);
        }
        if let Some(ms) = lookup("TX_GATEWAY_CONNECT_TIMEOUT_MS") {
            self.connect_timeout_ms = Some(parse_millis("TX_GATEWAY_CONNECT_TIMEOUT_MS", &ms)?);
        }
        if let Some(ms) = lookup("TX_GATEWAY_REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = Some(parse_millis("TX_GATEWAY_REQUEST_TIMEOUT_MS", &ms)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint cannot be empty".to_string()));
        }
        if self.request_service.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "request_service (x-request-service) is required".to_string(),
            ));
        }
        if !self.tls && (self.ca_certificate.is_some() || self.tls_domain.is_some()) {
            return Err(ConfigError::Invalid(
                "ca_certificate and tls_domain require tls = true".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transport_security(&self) -> TransportSecurity {
        if self.tls {
            TransportSecurity::Tls(TlsOptions {
                ca_certificate: self.ca_certificate.clone(),
                domain_name: self.tls_domain.clone(),
            })
        } else {
            TransportSecurity::Insecure
        }
    }

    pub fn connection_provider(&self) -> ConnectionProvider {
        match self.connect_timeout_ms {
            Some(ms) => ConnectionProvider::new().with_connect_timeout(Duration::from_millis(ms)),
            None => ConnectionProvider::new(),
        }
    }

    /// Gateway headers for one call
    pub fn call_context(&self) -> CallContext {
        CallContext::for_service(self.request_service.clone(), self.request_id.clone())
    }

    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Validate, then open a connection to the configured endpoint
    pub async fn connect(&self) -> GatewayResult<Connection> {
        self.validate()?;
        let connection = self
            .connection_provider()
            .open(self.endpoint.clone(), &self.transport_security())
            .await?;
        Ok(connection)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!(
            "{} must be a number of milliseconds, got '{}'",
            key, value
        ))
    })
}
