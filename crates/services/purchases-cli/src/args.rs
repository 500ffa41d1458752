//! Command-line arguments and their precedence over file and environment values

use crate::report::{OutputFormat, ReportOptions};
use clap::Parser;
use std::path::PathBuf;
use transaction_gateway_grpc::ClientConfig;

/// Request id sent when none is configured
pub const DEMO_REQUEST_ID: &str = "test-request-001";

/// Transaction Gateway example client
///
/// Calls PurchasesService/GetPurchasesByDomain once and reports the outcome.
#[derive(Parser, Debug)]
#[command(name = "purchases-example", author, version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, env = "TX_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Gateway address (host:port or URI)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Use TLS transport security
    #[arg(long)]
    pub tls: bool,

    /// Additional trusted CA certificate (PEM), implies --tls
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// Host name used for TLS verification, implies --tls
    #[arg(long)]
    pub tls_domain: Option<String>,

    /// Value of the x-request-service header
    #[arg(long)]
    pub request_service: Option<String>,

    /// Value of the x-request-id header
    #[arg(long)]
    pub request_id: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    pub connect_timeout_ms: Option<u64>,

    /// Call deadline in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Shop domain to look up
    #[arg(long, default_value = "example-shop.com")]
    pub domain: String,

    /// Output format for purchase records
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Also print next booking date and pending downgrade
    #[arg(long)]
    pub verbose_records: bool,

    /// Treat NotFound as a failed run
    #[arg(long)]
    pub not_found_is_error: bool,

    /// Treat an Unimplemented answer as a working client
    #[arg(long)]
    pub allow_unimplemented: bool,

    /// Emit logs as JSON
    #[arg(long, env = "TX_GATEWAY_JSON_LOGS")]
    pub json_logs: bool,
}

impl Args {
    /// Flags take precedence over environment and file values
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if self.tls || self.ca_cert.is_some() || self.tls_domain.is_some() {
            config.tls = true;
        }
        if let Some(path) = &self.ca_cert {
            config.ca_certificate = Some(path.clone());
        }
        if let Some(domain) = &self.tls_domain {
            config.tls_domain = Some(domain.clone());
        }
        if let Some(service) = &self.request_service {
            config.request_service = service.clone();
        }
        if let Some(id) = &self.request_id {
            config.request_id = Some(id.clone());
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = Some(ms);
        }
        if let Some(ms) = self.timeout_ms {
            config.request_timeout_ms = Some(ms);
        }
        if config.request_id.is_none() {
            config.request_id = Some(DEMO_REQUEST_ID.to_string());
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            format: self.output,
            verbose_records: self.verbose_records,
            not_found_is_error: self.not_found_is_error,
            allow_unimplemented: self.allow_unimplemented,
        }
    }
}
