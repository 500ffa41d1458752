//! gRPC client for the Transaction Gateway
//!
//! Wires a single unary call to the gateway's `PurchasesService`:
//!
//! 1. [`ConnectionProvider::open`] dials the endpoint with a [`TransportSecurity`] policy
//! 2. a [`CallContext`] carries the `x-request-service` / `x-request-id` headers
//! 3. [`CallInvoker`] performs one round trip and classifies the result into an [`Outcome`]
//! 4. the [`Connection`] is released by [`Connection::close`] or on drop
//!
//! # Usage
//!
//! ```no_run
//! use transaction_gateway_grpc::{
//!     CallContext, CallInvoker, CallOptions, ConnectionProvider, GetPurchasesByDomainRequest,
//!     Outcome, PurchasesInvoker, TransportSecurity,
//! };
//!
//! # tokio_test::block_on(async {
//! let mut connection = ConnectionProvider::new()
//!     .open("localhost:50051", &TransportSecurity::Insecure)
//!     .await
//!     .unwrap();
//!
//! let context = CallContext::for_service("my-service-name", Some("optional-trace-id".into()));
//! let request = GetPurchasesByDomainRequest {
//!     domain: "my-shop.example.com".to_string(),
//! };
//!
//! match PurchasesInvoker::new(&connection)
//!     .get_purchases_by_domain(request, context, CallOptions::default())
//!     .await
//! {
//!     Outcome::Success(response) => println!("{} purchases", response.purchases.len()),
//!     Outcome::Classified { kind, message } => println!("{}: {}", kind, message),
//!     Outcome::Unclassified { code, message } => eprintln!("{:?}: {}", code, message),
//! }
//!
//! connection.close();
//! # });
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod invoker;
pub mod metadata;
pub mod outcome;
pub mod records;

/// Protobuf types and stubs for `transaction.purchases.v1`
pub mod generated {
    tonic::include_proto!("transaction.purchases.v1");
}

pub use config::ClientConfig;
pub use connection::{Connection, ConnectionProvider, Endpoint, TlsOptions, TransportSecurity};
pub use error::{ConfigError, ConnectionError, Error, MetadataError, Result};
pub use generated::{GetPurchasesByDomainRequest, GetPurchasesByDomainResponse, Purchase};
pub use invoker::{CallInvoker, CallOptions, PurchasesInvoker, GET_PURCHASES_BY_DOMAIN};
pub use metadata::{check_request_service, CallContext, REQUEST_ID_HEADER, REQUEST_SERVICE_HEADER};
pub use outcome::{ErrorKind, Outcome};
pub use records::{purchase_records, PurchaseRecord};

// Re-export tonic types callers match on
pub use tonic::{Code as GrpcCode, Status as GrpcStatus};
