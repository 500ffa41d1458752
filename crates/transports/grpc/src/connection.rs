//! Connection provider for the Transaction Gateway
//!
//! Opens a tonic [`Channel`] to one endpoint with a pluggable transport security
//! policy. A single eager connect attempt is made; failures are surfaced to the
//! caller and never retried here.
//!
//! The returned [`Connection`] owns the channel. It is released by
//! [`Connection::close`] or, on every other exit path, when the connection is
//! dropped.

use crate::error::ConnectionError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tonic::transport::{Certificate, Channel, ClientTlsConfig};
use tracing::{debug, info};

/// Transport security applied to a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportSecurity {
    /// Plaintext HTTP/2, local development only
    #[default]
    Insecure,
    /// TLS using the webpki root store plus an optional custom CA
    Tls(TlsOptions),
}

/// Options for [`TransportSecurity::Tls`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// PEM file with an additional trusted CA certificate
    pub ca_certificate: Option<PathBuf>,
    /// Overrides the host name used for SNI and certificate verification
    pub domain_name: Option<String>,
}

impl TransportSecurity {
    pub fn tls() -> Self {
        TransportSecurity::Tls(TlsOptions::default())
    }

    fn scheme(&self) -> &'static str {
        match self {
            TransportSecurity::Insecure => "http",
            TransportSecurity::Tls(_) => "https",
        }
    }
}

/// Address of the remote service, immutable for the lifetime of a connection
///
/// Accepts `host:port` or a full `http://` / `https://` URI. A bare address gets
/// the scheme implied by the security policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: String,
    uri: String,
}

impl Endpoint {
    pub fn parse(
        address: impl Into<String>,
        security: &TransportSecurity,
    ) -> Result<Self, ConnectionError> {
        let address = address.into();
        let trimmed = address.trim();

        if trimmed.is_empty() {
            return Err(ConnectionError::InvalidEndpoint {
                endpoint: address,
                reason: "gRPC endpoint cannot be empty".to_string(),
            });
        }

        let uri = if let Some((scheme, rest)) = trimmed.split_once("://") {
            if !scheme.eq_ignore_ascii_case(security.scheme()) {
                return Err(ConnectionError::InvalidEndpoint {
                    endpoint: address.clone(),
                    reason: format!(
                        "scheme '{}' does not match transport security (expected '{}')",
                        scheme,
                        security.scheme()
                    ),
                });
            }
            format!("{}://{}", security.scheme(), rest)
        } else {
            format!("{}://{}", security.scheme(), trimmed)
        };

        tonic::transport::Endpoint::from_shared(uri.clone()).map_err(|e| {
            ConnectionError::InvalidEndpoint {
                endpoint: address.clone(),
                reason: error_chain(&e),
            }
        })?;

        Ok(Self { address, uri })
    }

    /// Address as supplied by the caller
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Full URI dialed by the transport
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Opens connections to the gateway
#[derive(Debug, Clone, Default)]
pub struct ConnectionProvider {
    connect_timeout: Option<Duration>,
}

impl ConnectionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the connect attempt; the transport default applies otherwise
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Open a connection with a single connect attempt
    ///
    /// # Errors
    ///
    /// * [`ConnectionError::InvalidEndpoint`] - the address cannot be parsed
    /// * [`ConnectionError::Tls`] - the CA file cannot be read or TLS setup fails
    /// * [`ConnectionError::Unreachable`] - resolve or connect failed
    pub async fn open(
        &self,
        address: impl Into<String>,
        security: &TransportSecurity,
    ) -> Result<Connection, ConnectionError> {
        let endpoint = Endpoint::parse(address, security)?;

        let mut transport = tonic::transport::Endpoint::from_shared(endpoint.uri().to_string())
            .map_err(|e| ConnectionError::InvalidEndpoint {
                endpoint: endpoint.address().to_string(),
                reason: error_chain(&e),
            })?;

        if let Some(timeout) = self.connect_timeout {
            transport = transport.connect_timeout(timeout);
        }

        if let TransportSecurity::Tls(options) = security {
            let tls = tls_config(&endpoint, options).await?;
            transport = transport
                .tls_config(tls)
                .map_err(|e| ConnectionError::Tls {
                    endpoint: endpoint.address().to_string(),
                    reason: error_chain(&e),
                })?;
        }

        debug!(endpoint = %endpoint, uri = endpoint.uri(), "Opening gRPC connection");

        let channel = transport
            .connect()
            .await
            .map_err(|e| ConnectionError::Unreachable {
                endpoint: endpoint.address().to_string(),
                reason: error_chain(&e),
            })?;

        info!(endpoint = %endpoint, "gRPC connection established");

        Ok(Connection {
            endpoint,
            channel: Some(channel),
        })
    }
}

async fn tls_config(
    endpoint: &Endpoint,
    options: &TlsOptions,
) -> Result<ClientTlsConfig, ConnectionError> {
    let mut tls = ClientTlsConfig::new().with_webpki_roots();

    if let Some(path) = &options.ca_certificate {
        let pem = tokio::fs::read(path)
            .await
            .map_err(|e| ConnectionError::Tls {
                endpoint: endpoint.address().to_string(),
                reason: format!("cannot read CA certificate {}: {}", path.display(), e),
            })?;
        tls = tls.ca_certificate(Certificate::from_pem(pem));
    }

    if let Some(domain) = &options.domain_name {
        tls = tls.domain_name(domain.clone());
    }

    Ok(tls)
}

/// Exclusively owned channel to one endpoint
///
/// Once closed, the connection refuses further calls.
#[derive(Debug)]
pub struct Connection {
    endpoint: Endpoint,
    channel: Option<Channel>,
}

impl Connection {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_none()
    }

    /// Handle to the underlying channel for a single call
    pub fn channel(&self) -> Result<Channel, ConnectionError> {
        self.channel
            .clone()
            .ok_or_else(|| ConnectionError::Closed {
                endpoint: self.endpoint.address().to_string(),
            })
    }

    /// Release the channel. Safe to call more than once.
    pub fn close(&mut self) {
        if self.channel.take().is_some() {
            debug!(endpoint = %self.endpoint, "gRPC connection closed");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Flatten an error and its sources into one line
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
