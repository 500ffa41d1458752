//! Transaction Gateway example client
//!
//! The `purchases-example` binary parses [`Args`], resolves a [`ClientConfig`]
//! and hands both to [`run`], which performs one `GetPurchasesByDomain` call
//! and writes the report.

pub mod args;
pub mod report;

pub use args::{Args, DEMO_REQUEST_ID};
pub use report::{OutputFormat, ReportOptions, Verdict};

use std::io::Write;
use tracing::debug;
use transaction_gateway_grpc::{
    CallInvoker, ClientConfig, Error, GetPurchasesByDomainRequest, PurchasesInvoker,
};

pub const BANNER_TITLE: &str = "Transaction Gateway Rust Example";

/// Banner, open, invoke, close, report
///
/// Connection failures are reported on `out` and yield [`Verdict::Failed`];
/// an invalid configuration or a write error is returned as `Err`.
pub async fn run<W: Write>(
    config: &ClientConfig,
    args: &Args,
    out: &mut W,
) -> anyhow::Result<Verdict> {
    report::banner(out, BANNER_TITLE)?;
    writeln!(out, "GetPurchasesByDomain...")?;
    writeln!(out)?;

    let mut connection = match config.connect().await {
        Ok(connection) => connection,
        Err(Error::Connection(e)) => return Ok(report::connection_failed(out, &e)?),
        Err(e) => return Err(e.into()),
    };

    let request = GetPurchasesByDomainRequest {
        domain: args.domain.clone(),
    };
    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(request, config.call_context(), config.call_options())
        .await;

    connection.close();
    debug!(success = outcome.is_success(), "Call finished");

    report::report_outcome(out, &config.endpoint, outcome, &args.report_options())
}
