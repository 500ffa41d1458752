//! End-to-end tests against an in-process PurchasesService
//!
//! Each test starts a tonic server on an ephemeral port with a configurable mock
//! service, then drives it through the connection provider and invoker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};
use transaction_gateway_grpc::generated::purchases_service_server::{
    PurchasesService, PurchasesServiceServer,
};
use transaction_gateway_grpc::{
    check_request_service, CallContext, CallInvoker, CallOptions, ClientConfig, ConnectionError,
    ConnectionProvider, Error, ErrorKind, GetPurchasesByDomainRequest,
    GetPurchasesByDomainResponse, Outcome, Purchase, PurchasesInvoker, TransportSecurity,
};

/// Gateway double: answers from a fixed table and records received `x-` headers
#[derive(Clone, Default)]
struct MockPurchases {
    domains: HashMap<String, Vec<Purchase>>,
    forced_status: Option<(Code, String)>,
    delay: Option<Duration>,
    received: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl MockPurchases {
    fn with_domain(mut self, domain: &str, purchases: Vec<Purchase>) -> Self {
        self.domains.insert(domain.to_string(), purchases);
        self
    }

    fn failing_with(mut self, code: Code, message: &str) -> Self {
        self.forced_status = Some((code, message.to_string()));
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[tonic::async_trait]
impl PurchasesService for MockPurchases {
    async fn get_purchases_by_domain(
        &self,
        request: Request<GetPurchasesByDomainRequest>,
    ) -> Result<Response<GetPurchasesByDomainResponse>, Status> {
        let headers: Vec<(String, String)> = request
            .metadata()
            .clone()
            .into_headers()
            .iter()
            .filter(|(name, _)| name.as_str().starts_with("x-"))
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        self.received.lock().unwrap().push(headers);

        check_request_service(&request)?;

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        if let Some((code, message)) = &self.forced_status {
            return Err(Status::new(*code, message.clone()));
        }

        let domain = request.into_inner().domain;
        match self.domains.get(&domain) {
            Some(purchases) => Ok(Response::new(GetPurchasesByDomainResponse {
                purchases: purchases.clone(),
            })),
            None => Err(Status::not_found(format!(
                "purchase record not found for domain {}",
                domain
            ))),
        }
    }
}

/// Start gRPC server in background
async fn start_test_server(service: MockPurchases) -> (String, tokio::task::JoinHandle<()>) {
    let addr: std::net::SocketAddr = "127.0.0.1:0".parse().unwrap();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let local_addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        Server::builder()
            .add_service(PurchasesServiceServer::new(service))
            .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    // Give server time to start
    sleep(Duration::from_millis(100)).await;

    (local_addr.to_string(), handle)
}

fn purchase(plugin_name: &str, identifier: &str, quantity: u32) -> Purchase {
    Purchase {
        plugin_name: plugin_name.to_string(),
        identifier: identifier.to_string(),
        next_booking_date: "2026-11-01".to_string(),
        quantity,
        pending_downgrade_identifier: None,
    }
}

fn request(domain: &str) -> GetPurchasesByDomainRequest {
    GetPurchasesByDomainRequest {
        domain: domain.to_string(),
    }
}

fn gateway_context() -> CallContext {
    CallContext::for_service("example-rust-test", Some("test-request-001".to_string()))
}

#[tokio::test]
async fn test_open_invoke_close_returns_configured_purchases() {
    let mock = MockPurchases::default().with_domain(
        "sw9.service.com",
        vec![
            purchase("SwagPayPal", "paypal-plus", 1),
            purchase("SwagCmsExtensions", "cms", 0),
        ],
    );
    let (addr, _server) = start_test_server(mock).await;

    let mut connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("sw9.service.com"),
            gateway_context(),
            CallOptions::default(),
        )
        .await;

    let response = outcome.success().expect("expected Success");
    assert_eq!(response.purchases.len(), 2);
    assert_eq!(response.purchases[0].plugin_name, "SwagPayPal");
    assert_eq!(response.purchases[1].quantity, 0);

    connection.close();
    assert!(connection.is_closed());
}

#[tokio::test]
async fn test_unknown_domain_is_classified_not_found() {
    let (addr, _server) = start_test_server(MockPurchases::default()).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("example-shop.com"),
            gateway_context(),
            CallOptions::default(),
        )
        .await;

    assert_eq!(
        outcome,
        Outcome::Classified {
            kind: ErrorKind::NotFound,
            message: "purchase record not found for domain example-shop.com".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_before_invoke() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        endpoint: addr.to_string(),
        connect_timeout_ms: Some(2_000),
        ..ClientConfig::default()
    };

    let result = config.connect().await;

    assert!(matches!(
        result,
        Err(Error::Connection(ConnectionError::Unreachable { .. }))
    ));
}

#[tokio::test]
async fn test_server_sees_metadata_in_insertion_order() {
    let mock = MockPurchases::default().with_domain("sw9.service.com", vec![]);
    let received = mock.received.clone();
    let (addr, _server) = start_test_server(mock).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let context = CallContext::new()
        .with("x-request-service", "example-rust-test")
        .with("x-request-id", "test-request-001");

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(request("sw9.service.com"), context, CallOptions::default())
        .await;
    assert!(outcome.is_success());

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0],
        vec![
            ("x-request-service".to_string(), "example-rust-test".to_string()),
            ("x-request-id".to_string(), "test-request-001".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_close_is_idempotent_and_refuses_further_calls() {
    let mock = MockPurchases::default();
    let received = mock.received.clone();
    let (addr, _server) = start_test_server(mock).await;

    let mut connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    connection.close();
    connection.close();
    assert!(connection.is_closed());

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("sw9.service.com"),
            gateway_context(),
            CallOptions::default(),
        )
        .await;

    assert!(matches!(
        outcome,
        Outcome::Unclassified {
            code: Code::Unavailable,
            ..
        }
    ));
    assert!(received.lock().unwrap().is_empty(), "no call may reach the server");
}

#[tokio::test]
async fn test_missing_request_service_is_unclassified_failure() {
    let (addr, _server) = start_test_server(MockPurchases::default()).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("sw9.service.com"),
            CallContext::new().with("x-request-id", "test-request-001"),
            CallOptions::default(),
        )
        .await;

    match outcome {
        Outcome::Unclassified { code, message } => {
            assert_eq!(code, Code::Unauthenticated);
            assert!(message.contains("x-request-service"));
        }
        other => panic!("expected Unclassified, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_server_codes_surface_verbatim() {
    let mock = MockPurchases::default().failing_with(Code::Unimplemented, "unknown service");
    let (addr, _server) = start_test_server(mock).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("sw9.service.com"),
            gateway_context(),
            CallOptions::default(),
        )
        .await;

    assert_eq!(
        outcome,
        Outcome::Unclassified {
            code: Code::Unimplemented,
            message: "unknown service".to_string(),
        }
    );
}

#[tokio::test]
async fn test_deadline_yields_cancelled() {
    let mock = MockPurchases::default()
        .with_domain("sw9.service.com", vec![])
        .delayed(Duration::from_secs(2));
    let (addr, _server) = start_test_server(mock).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain(
            request("sw9.service.com"),
            gateway_context(),
            CallOptions::with_timeout(Duration::from_millis(100)),
        )
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::Cancelled));
}

#[tokio::test]
async fn test_caller_cancellation_yields_cancelled() {
    let mock = MockPurchases::default()
        .with_domain("sw9.service.com", vec![])
        .delayed(Duration::from_secs(2));
    let (addr, _server) = start_test_server(mock).await;

    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();

    let outcome = PurchasesInvoker::new(&connection)
        .get_purchases_by_domain_until(
            request("sw9.service.com"),
            gateway_context(),
            CallOptions::default(),
            sleep(Duration::from_millis(50)),
        )
        .await;

    assert_eq!(outcome, Outcome::cancelled("call cancelled by caller"));
}

/// Callers can depend on the capability rather than the tonic-backed invoker
async fn count_purchases<I: CallInvoker>(invoker: &mut I, domain: &str) -> Option<usize> {
    invoker
        .get_purchases_by_domain(request(domain), gateway_context(), CallOptions::default())
        .await
        .map(|response| response.purchases.len())
        .success()
}

#[tokio::test]
async fn test_invoker_capability_is_substitutable() {
    struct CannedInvoker(Outcome<GetPurchasesByDomainResponse>);

    #[async_trait::async_trait]
    impl CallInvoker for CannedInvoker {
        async fn get_purchases_by_domain(
            &mut self,
            _request: GetPurchasesByDomainRequest,
            _context: CallContext,
            _options: CallOptions,
        ) -> Outcome<GetPurchasesByDomainResponse> {
            self.0.clone()
        }
    }

    let mut canned = CannedInvoker(Outcome::Success(GetPurchasesByDomainResponse {
        purchases: vec![purchase("SwagPayPal", "paypal-plus", 1)],
    }));
    assert_eq!(count_purchases(&mut canned, "any").await, Some(1));

    let mock = MockPurchases::default().with_domain(
        "sw9.service.com",
        vec![purchase("A", "a", 1), purchase("B", "b", 2), purchase("C", "c", 3)],
    );
    let (addr, _server) = start_test_server(mock).await;
    let connection = ConnectionProvider::new()
        .open(addr, &TransportSecurity::Insecure)
        .await
        .unwrap();
    let mut invoker = PurchasesInvoker::new(&connection);
    assert_eq!(count_purchases(&mut invoker, "sw9.service.com").await, Some(3));
    assert_eq!(count_purchases(&mut invoker, "example-shop.com").await, None);
}
