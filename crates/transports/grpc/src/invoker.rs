//! Typed call invoker for the PurchasesService
//!
//! Performs exactly one unary round trip per invocation and classifies the result
//! into an [`Outcome`]. There are no retries. A deadline from [`CallOptions`] is
//! sent to the server as `grpc-timeout` and enforced locally as well.

use crate::connection::Connection;
use crate::generated::purchases_service_client::PurchasesServiceClient;
use crate::generated::{GetPurchasesByDomainRequest, GetPurchasesByDomainResponse};
use crate::metadata::CallContext;
use crate::outcome::Outcome;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tonic::{Code, Request};
use tracing::{debug, warn};

/// Fully qualified path of the GetPurchasesByDomain operation
pub const GET_PURCHASES_BY_DOMAIN: &str =
    "/transaction.purchases.v1.PurchasesService/GetPurchasesByDomain";

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Deadline for the round trip; the transport default applies when unset
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// One method per remote operation of the PurchasesService
#[async_trait]
pub trait CallInvoker: Send {
    async fn get_purchases_by_domain(
        &mut self,
        request: GetPurchasesByDomainRequest,
        context: CallContext,
        options: CallOptions,
    ) -> Outcome<GetPurchasesByDomainResponse>;
}

/// [`CallInvoker`] over a borrowed [`Connection`]
///
/// Borrowing the connection keeps it from being closed while the invoker is alive.
pub struct PurchasesInvoker<'c> {
    connection: &'c Connection,
}

impl<'c> PurchasesInvoker<'c> {
    pub fn new(connection: &'c Connection) -> Self {
        Self { connection }
    }

    /// Like [`CallInvoker::get_purchases_by_domain`], terminating early when
    /// `cancel` resolves first
    pub async fn get_purchases_by_domain_until<F>(
        &mut self,
        request: GetPurchasesByDomainRequest,
        context: CallContext,
        options: CallOptions,
        cancel: F,
    ) -> Outcome<GetPurchasesByDomainResponse>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            outcome = self.call(request, context, options) => outcome,
            _ = cancel => {
                debug!(operation = GET_PURCHASES_BY_DOMAIN, "Call cancelled by caller");
                Outcome::cancelled("call cancelled by caller")
            }
        }
    }

    async fn call(
        &self,
        message: GetPurchasesByDomainRequest,
        context: CallContext,
        options: CallOptions,
    ) -> Outcome<GetPurchasesByDomainResponse> {
        let endpoint = self.connection.endpoint().clone();

        let channel = match self.connection.channel() {
            Ok(channel) => channel,
            Err(e) => return Outcome::failure(Code::Unavailable, e.to_string()),
        };

        let metadata = match context.into_metadata() {
            Ok(metadata) => metadata,
            Err(e) => return Outcome::failure(Code::InvalidArgument, e.to_string()),
        };

        let mut request = Request::new(message);
        *request.metadata_mut() = metadata;
        if let Some(timeout) = options.timeout {
            request.set_timeout(timeout);
        }

        debug!(
            operation = GET_PURCHASES_BY_DOMAIN,
            endpoint = %endpoint,
            domain = %request.get_ref().domain,
            "Invoking unary call"
        );

        let mut client = PurchasesServiceClient::new(channel);
        let call = client.get_purchases_by_domain(request);

        let result = match options.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(
                        operation = GET_PURCHASES_BY_DOMAIN,
                        timeout_ms = timeout.as_millis() as u64,
                        "Deadline exceeded"
                    );
                    return Outcome::cancelled(format!(
                        "deadline of {}ms exceeded",
                        timeout.as_millis()
                    ));
                }
            },
            None => call.await,
        };

        let outcome = Outcome::from(result.map(|response| response.into_inner()));

        if let Outcome::Unclassified { code, message } = &outcome {
            warn!(
                operation = GET_PURCHASES_BY_DOMAIN,
                endpoint = %endpoint,
                code = ?code,
                "Unary call failed: {}",
                message
            );
        }

        outcome
    }
}

#[async_trait]
impl CallInvoker for PurchasesInvoker<'_> {
    async fn get_purchases_by_domain(
        &mut self,
        request: GetPurchasesByDomainRequest,
        context: CallContext,
        options: CallOptions,
    ) -> Outcome<GetPurchasesByDomainResponse> {
        self.call(request, context, options).await
    }
}
