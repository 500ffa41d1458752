//! Transaction Gateway example client
//!
//! Connects to the gateway, attaches the required metadata headers, calls
//! `GetPurchasesByDomain` once and prints the result.
//!
//! # Usage
//!
//! ```bash
//! # Local development gateway on localhost:50051 (plaintext)
//! cargo run -p transaction-gateway-cli
//!
//! # Another domain against a TLS endpoint
//! cargo run -p transaction-gateway-cli -- \
//!   --endpoint transaction-gateway.example.com:443 --tls \
//!   --domain my-shop.example.com --request-service my-service-name
//!
//! # Machine-readable output
//! cargo run -p transaction-gateway-cli -- --domain sw9.service.com --output json
//! ```
//!
//! # Environment Variables
//!
//! - `TX_GATEWAY_CONFIG`: TOML configuration file
//! - `TX_GATEWAY_ENDPOINT`: Gateway address (default: `localhost:50051`)
//! - `TX_GATEWAY_TLS`, `TX_GATEWAY_CA_CERT`, `TX_GATEWAY_TLS_DOMAIN`: Transport security
//! - `TX_GATEWAY_REQUEST_SERVICE`, `TX_GATEWAY_REQUEST_ID`: Metadata headers
//! - `TX_GATEWAY_CONNECT_TIMEOUT_MS`, `TX_GATEWAY_REQUEST_TIMEOUT_MS`: Timeouts
//! - `RUST_LOG`: Logging level (default: `warn`)
//!
//! Exit code is non-zero for connection errors and unclassified failures.

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transaction_gateway_cli::{run, Args};
use transaction_gateway_grpc::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    init_tracing(args.json_logs);

    let mut config = ClientConfig::load(args.config.as_ref())
        .context("Failed to load client configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid client configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.endpoint,
        tls = config.tls,
        domain = %args.domain,
        "Transaction Gateway example starting"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let verdict = run(&config, &args, &mut out).await?;

    Ok(verdict.into())
}

fn init_tracing(json: bool) {
    // Initialize tracing with EnvFilter for RUST_LOG support; logs go to stderr
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
