//! Human-readable reporting of a GetPurchasesByDomain outcome

use std::io::Write;
use std::process::ExitCode;
use transaction_gateway_grpc::{
    purchase_records, ErrorKind, GetPurchasesByDomainResponse, GrpcCode, Outcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per purchase
    Text,
    /// Purchase records as a JSON array
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub verbose_records: bool,
    pub not_found_is_error: bool,
    pub allow_unimplemented: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            verbose_records: false,
            not_found_is_error: false,
            allow_unimplemented: false,
        }
    }
}

/// Whether the run counts as a success for the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Passed => ExitCode::SUCCESS,
            Verdict::Failed => ExitCode::FAILURE,
        }
    }
}

pub fn banner<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    let rule = "=".repeat(50);
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule)?;
    writeln!(out)
}

pub fn connection_failed<W: Write>(
    out: &mut W,
    error: &dyn std::fmt::Display,
) -> std::io::Result<Verdict> {
    writeln!(out, "❌ Failed to connect: {}", error)?;
    Ok(Verdict::Failed)
}

/// Print the outcome and decide the verdict
///
/// NotFound counts as a passed run unless `not_found_is_error` is set: against a
/// test domain it proves the round trip works.
pub fn report_outcome<W: Write>(
    out: &mut W,
    endpoint: &str,
    outcome: Outcome<GetPurchasesByDomainResponse>,
    options: &ReportOptions,
) -> anyhow::Result<Verdict> {
    match outcome {
        Outcome::Success(response) => {
            let records = purchase_records(response);
            match options.format {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut *out, &records)?;
                    writeln!(out)?;
                }
                OutputFormat::Text => {
                    writeln!(out, "✅ Found {} purchases:", records.len())?;
                    for record in &records {
                        writeln!(
                            out,
                            "  Plugin: {}, Identifier: {}, Quantity: {}",
                            record.plugin_name, record.identifier, record.quantity
                        )?;
                        if options.verbose_records {
                            if let Some(date) = &record.next_booking_date {
                                writeln!(out, "    Next Booking: {}", date)?;
                            }
                            if let Some(downgrade) = &record.pending_downgrade_identifier {
                                writeln!(out, "    Pending Downgrade: {}", downgrade)?;
                            }
                        }
                    }
                }
            }
            Ok(Verdict::Passed)
        }
        Outcome::Classified {
            kind: ErrorKind::NotFound,
            message,
        } => {
            if options.not_found_is_error {
                writeln!(out, "❌ GetPurchasesByDomain failed: (NotFound) {}", message)?;
                return Ok(Verdict::Failed);
            }
            writeln!(
                out,
                "✅ Connection successful - got expected NotFound for test domain"
            )?;
            writeln!(out, "❌ Error: {}", message)?;
            Ok(Verdict::Passed)
        }
        Outcome::Classified {
            kind: ErrorKind::Cancelled,
            message,
        } => {
            writeln!(out, "❌ GetPurchasesByDomain cancelled: {}", message)?;
            Ok(Verdict::Failed)
        }
        Outcome::Unclassified {
            code: GrpcCode::Unimplemented,
            message,
        } if options.allow_unimplemented => {
            writeln!(
                out,
                "✅ gRPC client works - server does not implement this service"
            )?;
            writeln!(
                out,
                "   (This is expected if running against a different server: {})",
                message
            )?;
            Ok(Verdict::Passed)
        }
        Outcome::Unclassified {
            code: GrpcCode::Unavailable,
            message,
        } => {
            writeln!(
                out,
                "❌ Server unavailable - is the gRPC server running on {}?",
                endpoint
            )?;
            writeln!(out, "   {}", message)?;
            Ok(Verdict::Failed)
        }
        Outcome::Unclassified { code, message } => {
            writeln!(out, "❌ GetPurchasesByDomain failed: ({:?}) {}", code, message)?;
            Ok(Verdict::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transaction_gateway_grpc::Purchase;

    fn render(
        outcome: Outcome<GetPurchasesByDomainResponse>,
        options: &ReportOptions,
    ) -> (String, Verdict) {
        let mut out = Vec::new();
        let verdict = report_outcome(&mut out, "localhost:50051", outcome, options).unwrap();
        (String::from_utf8(out).unwrap(), verdict)
    }

    fn not_found() -> Outcome<GetPurchasesByDomainResponse> {
        Outcome::Classified {
            kind: ErrorKind::NotFound,
            message: "purchase record not found for domain example-shop.com".to_string(),
        }
    }

    fn two_purchases() -> GetPurchasesByDomainResponse {
        GetPurchasesByDomainResponse {
            purchases: vec![
                Purchase {
                    plugin_name: "SwagPayPal".to_string(),
                    identifier: "paypal-plus".to_string(),
                    next_booking_date: "2026-11-01".to_string(),
                    quantity: 1,
                    pending_downgrade_identifier: Some("paypal-basic".to_string()),
                },
                Purchase {
                    plugin_name: "SwagCmsExtensions".to_string(),
                    identifier: "cms".to_string(),
                    next_booking_date: String::new(),
                    quantity: 2,
                    pending_downgrade_identifier: None,
                },
            ],
        }
    }

    #[test]
    fn test_banner() {
        let mut out = Vec::new();
        banner(&mut out, "Transaction Gateway Rust Example").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=".repeat(50));
        assert_eq!(lines[1], "Transaction Gateway Rust Example");
        assert_eq!(lines[2], "=".repeat(50));
    }

    #[test]
    fn test_not_found_passes_by_default() {
        let (text, verdict) = render(not_found(), &ReportOptions::default());
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(
            text,
            "✅ Connection successful - got expected NotFound for test domain\n\
             ❌ Error: purchase record not found for domain example-shop.com\n"
        );
    }

    #[test]
    fn test_not_found_fails_when_requested() {
        let options = ReportOptions {
            not_found_is_error: true,
            ..ReportOptions::default()
        };
        let (text, verdict) = render(not_found(), &options);
        assert_eq!(verdict, Verdict::Failed);
        assert!(text.contains("(NotFound)"));
    }

    #[test]
    fn test_success_lists_purchases() {
        let (text, verdict) = render(Outcome::Success(two_purchases()), &ReportOptions::default());
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(
            text,
            "✅ Found 2 purchases:\n\
             \x20 Plugin: SwagPayPal, Identifier: paypal-plus, Quantity: 1\n\
             \x20 Plugin: SwagCmsExtensions, Identifier: cms, Quantity: 2\n"
        );
    }

    #[test]
    fn test_verbose_records_show_optional_fields() {
        let options = ReportOptions {
            verbose_records: true,
            ..ReportOptions::default()
        };
        let (text, _) = render(Outcome::Success(two_purchases()), &options);
        assert!(text.contains("    Next Booking: 2026-11-01\n"));
        assert!(text.contains("    Pending Downgrade: paypal-basic\n"));
        assert_eq!(text.matches("Next Booking").count(), 1);
    }

    #[test]
    fn test_json_output() {
        let options = ReportOptions {
            format: OutputFormat::Json,
            ..ReportOptions::default()
        };
        let (text, verdict) = render(Outcome::Success(two_purchases()), &options);
        assert_eq!(verdict, Verdict::Passed);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["pluginName"], "SwagPayPal");
        assert_eq!(value[1]["quantity"], 2);
    }

    #[test]
    fn test_unavailable_names_endpoint() {
        let outcome = Outcome::failure(GrpcCode::Unavailable, "tcp connect error");
        let (text, verdict) = render(outcome, &ReportOptions::default());
        assert_eq!(verdict, Verdict::Failed);
        assert!(text.starts_with(
            "❌ Server unavailable - is the gRPC server running on localhost:50051?"
        ));
    }

    #[test]
    fn test_unimplemented_depends_on_flag() {
        let outcome = || Outcome::failure(GrpcCode::Unimplemented, "unknown service");

        let (text, verdict) = render(outcome(), &ReportOptions::default());
        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(
            text,
            "❌ GetPurchasesByDomain failed: (Unimplemented) unknown service\n"
        );

        let options = ReportOptions {
            allow_unimplemented: true,
            ..ReportOptions::default()
        };
        let (text, verdict) = render(outcome(), &options);
        assert_eq!(verdict, Verdict::Passed);
        assert!(text.starts_with("✅ gRPC client works"));
    }

    #[test]
    fn test_cancelled_fails() {
        let (text, verdict) = render(
            Outcome::cancelled("deadline of 100ms exceeded"),
            &ReportOptions::default(),
        );
        assert_eq!(verdict, Verdict::Failed);
        assert!(text.contains("deadline of 100ms exceeded"));
    }

    #[test]
    fn test_connection_failed() {
        let mut out = Vec::new();
        let verdict = connection_failed(&mut out, &"refused").unwrap();
        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(String::from_utf8(out).unwrap(), "❌ Failed to connect: refused\n");
    }
}
