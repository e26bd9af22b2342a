//! End-to-end issuance scenarios against in-memory collaborators.

use assert_matches::assert_matches;
use async_trait::async_trait;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use turnstile_cookie::{CipherConfig, CipherPolicy, CookieValueCodec};
use turnstile_core::{
    ClientContext, Credential, ErrorKind, IssuancePhase, RequestContext, RequestThrottle,
    ResponsePayload, Result, Ticket, TicketId, TicketKind, TicketStore, TurnstileError,
};
use turnstile_issuance::TicketIssuanceService;
use turnstile_response::{
    CasProtocolResponseFactory, CompositeResponseResolver, PlainTextResponseFactory,
    ResponseFactory, ResponseFactoryRegistry,
};
use turnstile_testkit::{FixedAuthenticator, InMemoryTicketStore, RecordingObserver};

const SIGNING: &str = "signing-secret-0123456789";
const ENCRYPTION: &str = "encryption-secret-0123456789";

struct Harness {
    service: TicketIssuanceService,
    store: Arc<InMemoryTicketStore>,
    observer: Arc<RecordingObserver>,
}

/// Factory that always claims the request and always fails to build.
struct BrokenFactory;

impl ResponseFactory for BrokenFactory {
    fn id(&self) -> &'static str {
        "broken"
    }

    fn supports(&self, _request: &RequestContext) -> bool {
        true
    }

    fn build(&self, _ticket: &Ticket, _request: &RequestContext) -> Result<ResponsePayload> {
        Err(TurnstileError::internal_cipher("renderer crashed"))
    }
}

/// Store that mints ticket ids the cookie codec refuses to encode.
struct DelimitedIdStore;

#[async_trait]
impl TicketStore for DelimitedIdStore {
    async fn create(&self, kind: TicketKind, parent: Option<&TicketId>) -> Result<Ticket> {
        let now = OffsetDateTime::now_utc();
        Ok(Ticket {
            id: TicketId::new("TGT@delimited"),
            kind,
            parent: parent.cloned(),
            issued_at: now,
            expires_at: now + Duration::hours(1),
        })
    }

    async fn find(&self, id: &TicketId) -> Result<Ticket> {
        Err(TurnstileError::ticket_unavailable(format!(
            "no live ticket '{id}'"
        )))
    }

    async fn invalidate(&self, _id: &TicketId) -> Result<()> {
        Ok(())
    }
}

/// Throttle that denies everything.
struct DenyAll;

impl RequestThrottle for DenyAll {
    fn permit(&self, _client_key: &str) -> bool {
        false
    }
}

fn default_resolver() -> CompositeResponseResolver {
    let mut registry = ResponseFactoryRegistry::new();
    registry
        .register(Arc::new(CasProtocolResponseFactory))
        .unwrap();
    registry
        .register_default(Arc::new(PlainTextResponseFactory))
        .unwrap();
    CompositeResponseResolver::new(registry.finalize().unwrap())
}

fn harness_with(resolver: CompositeResponseResolver) -> Harness {
    let resolved = CipherPolicy::resolve(&CipherConfig::protected(SIGNING, ENCRYPTION)).unwrap();
    let store = Arc::new(InMemoryTicketStore::new());
    let observer = Arc::new(RecordingObserver::new());
    let service = TicketIssuanceService::new(
        Arc::new(FixedAuthenticator::new().with_user("casuser", "Mellon")),
        Arc::clone(&store) as Arc<dyn turnstile_core::TicketStore>,
        CookieValueCodec::new(resolved.cipher),
        resolver,
    )
    .with_observer(Arc::clone(&observer) as Arc<dyn turnstile_core::IssuanceObserver>);
    Harness {
        service,
        store,
        observer,
    }
}

fn harness() -> Harness {
    harness_with(default_resolver())
}

fn client() -> ClientContext {
    ClientContext::new("10.0.0.1", "Mozilla/5.0")
}

#[tokio::test]
async fn credential_to_cas_protocol_response() {
    let h = harness();
    let issued = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::with_protocol_hint("cas-protocol-v3"),
        )
        .await
        .unwrap();

    assert_eq!(issued.ticket.kind, TicketKind::Granting);
    assert_eq!(issued.response.status, 200);
    assert_eq!(
        issued.response.header("Location"),
        Some(format!("/v1/tickets/{}", issued.ticket.id).as_str())
    );
    assert!(issued.response.body.contains(issued.ticket.id.as_str()));

    // The cookie is opaque and decodes back to the granting ticket id.
    let cookie = issued.cookie.as_deref().unwrap();
    assert!(!cookie.contains(issued.ticket.id.as_str()));
    assert_eq!(h.observer.issued(), vec![issued.ticket.id.clone()]);
}

#[tokio::test]
async fn cookie_exchanges_for_service_ticket() {
    let h = harness();
    let granted = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await
        .unwrap();

    let issued = h
        .service
        .issue_service_ticket(
            granted.cookie.as_deref().unwrap(),
            Some(&client()),
            &RequestContext {
                protocol_hint: Some("cas-protocol-v3".to_string()),
                service: Some("https://app.example.org".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(issued.ticket.kind, TicketKind::Service);
    assert_eq!(issued.ticket.parent.as_ref(), Some(&granted.ticket.id));
    assert_eq!(issued.cookie, None);
    assert_eq!(issued.response.status, 200);
    assert!(issued.response.body.contains(issued.ticket.id.as_str()));
}

#[tokio::test]
async fn replayed_cookie_from_other_client_is_rejected() {
    let h = harness();
    let granted = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await
        .unwrap();

    let elsewhere = ClientContext::new("203.0.113.7", "curl/8.0");
    let result = h
        .service
        .issue_service_ticket(
            granted.cookie.as_deref().unwrap(),
            Some(&elsewhere),
            &RequestContext::default(),
        )
        .await;

    assert_matches!(result, Err(TurnstileError::BindingMismatch { .. }));
    let failures = h.observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ErrorKind::BindingMismatch);
    assert_eq!(failures[0].phase, IssuancePhase::Received);
    // No service ticket was created.
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn bad_credential_creates_nothing() {
    let h = harness();
    let result = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "wrong"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await;

    assert_matches!(result, Err(TurnstileError::AuthenticationFailed { .. }));
    assert!(h.store.is_empty());
    let failures = h.observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ErrorKind::AuthenticationFailed);
    assert_eq!(failures[0].ticket_id, None);
}

#[tokio::test]
async fn expired_granting_ticket_blocks_service_issuance() {
    let h = harness();
    let granted = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await
        .unwrap();

    h.store.advance(Duration::hours(9));
    let result = h
        .service
        .issue_service_ticket(
            granted.cookie.as_deref().unwrap(),
            Some(&client()),
            &RequestContext::default(),
        )
        .await;

    assert_matches!(result, Err(TurnstileError::TicketUnavailable { .. }));
    // Only the (now expired) granting ticket exists.
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn response_build_failure_leaves_ticket_valid() {
    let mut registry = ResponseFactoryRegistry::new();
    registry.register(Arc::new(BrokenFactory)).unwrap();
    registry
        .register_default(Arc::new(PlainTextResponseFactory))
        .unwrap();
    let h = harness_with(CompositeResponseResolver::new(registry.finalize().unwrap()));

    let result = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await;

    let failures = h.observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ErrorKind::ResponseBuild);
    assert_eq!(failures[0].phase, IssuancePhase::CookieEncoded);
    let ticket_id = failures[0].ticket_id.clone().unwrap();
    assert_matches!(result, Err(TurnstileError::ResponseBuild { .. }));

    // No rollback: the granting ticket survives and is retrievable.
    let status = h.service.ticket_status(&ticket_id).await.unwrap();
    assert_eq!(status.status, 200);
    assert_eq!(status.body, ticket_id.as_str());
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn unencodable_ticket_id_fails_as_internal_cipher_error() {
    let resolved = CipherPolicy::resolve(&CipherConfig::protected(SIGNING, ENCRYPTION)).unwrap();
    let observer = Arc::new(RecordingObserver::new());
    let service = TicketIssuanceService::new(
        Arc::new(FixedAuthenticator::new().with_user("casuser", "Mellon")),
        Arc::new(DelimitedIdStore),
        CookieValueCodec::new(resolved.cipher),
        default_resolver(),
    )
    .with_observer(Arc::clone(&observer) as Arc<dyn turnstile_core::IssuanceObserver>);

    let result = service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await;

    // The codec refusal is remapped to the internal cipher category and
    // reported against the phase that had been reached. Not retried.
    assert_matches!(result, Err(TurnstileError::InternalCipher { .. }));
    let failures = observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ErrorKind::InternalCipher);
    assert_eq!(failures[0].phase, IssuancePhase::TicketCreated);
    assert_eq!(
        failures[0].ticket_id.as_ref().map(TicketId::as_str),
        Some("TGT@delimited")
    );
}

#[tokio::test]
async fn status_lookup_does_not_mutate_the_store() {
    let h = harness();
    let granted = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await
        .unwrap();

    for _ in 0..3 {
        h.service.ticket_status(&granted.ticket.id).await.unwrap();
    }
    assert_eq!(h.store.len(), 1);
    assert!(h.store.find(&granted.ticket.id).await.is_ok());
}

#[tokio::test]
async fn throttled_request_never_reaches_the_authenticator() {
    let h = harness();
    let service = h.service.with_throttle(Arc::new(DenyAll));

    // Even a valid credential is rejected before authentication.
    let result = service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await;

    assert_matches!(result, Err(TurnstileError::AuthenticationFailed { .. }));
    assert!(h.store.is_empty());
    let failures = h.observer.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].phase, IssuancePhase::Received);
}

#[tokio::test]
async fn destroyed_granting_ticket_stops_issuing() {
    let h = harness();
    let granted = h
        .service
        .issue_ticket_granting(
            &Credential::new("casuser", "Mellon"),
            Some(&client()),
            &RequestContext::default(),
        )
        .await
        .unwrap();
    let cookie = granted.cookie.as_deref().unwrap();

    let destroyed = h
        .service
        .destroy_ticket_granting(cookie, Some(&client()))
        .await
        .unwrap();
    assert_eq!(destroyed, granted.ticket.id);
    assert!(h.store.is_empty());

    let result = h
        .service
        .issue_service_ticket(cookie, Some(&client()), &RequestContext::default())
        .await;
    assert_matches!(result, Err(TurnstileError::TicketUnavailable { .. }));
}
