//! The ticket issuance service.
//!
//! Per-request state machine:
//! `Received → Authenticated → TicketCreated/TicketValidated → CookieEncoded
//! → ResponseBuilt → Completed`, with a terminal `Error` reachable from any
//! step. Every terminal error is reported to the issuance observer as a
//! structured event tagged with the last phase reached, the error kind, and
//! the ticket id when one existed — never credentials or key material.

use std::sync::Arc;
use turnstile_cookie::CookieValueCodec;
use turnstile_core::{
    Authenticator, ClientContext, Credential, IssuanceFailure, IssuanceObserver, IssuancePhase,
    NoOpObserver, NoThrottle, RequestContext, RequestThrottle, ResponsePayload, Result, Ticket,
    TicketId, TicketKind, TicketStore, TurnstileError,
};
use turnstile_response::CompositeResponseResolver;

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// The issued ticket.
    pub ticket: Ticket,
    /// Encoded cookie value, present for granting-ticket issuance. Cookie
    /// attributes (name, path, flags) are the host's concern.
    pub cookie: Option<String>,
    /// Shaped response payload for the hosting HTTP layer.
    pub response: ResponsePayload,
}

/// Orchestrates authentication, ticket lifecycle, cookie encoding, and
/// response shaping for a single issuance request.
///
/// All fields are constructed once at startup and immutable afterwards; the
/// service performs no locking and no retries of its own.
pub struct TicketIssuanceService {
    authenticator: Arc<dyn Authenticator>,
    store: Arc<dyn TicketStore>,
    codec: CookieValueCodec,
    resolver: CompositeResponseResolver,
    observer: Arc<dyn IssuanceObserver>,
    throttle: Arc<dyn RequestThrottle>,
}

impl TicketIssuanceService {
    /// Build a service with no-op observer and throttle.
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        store: Arc<dyn TicketStore>,
        codec: CookieValueCodec,
        resolver: CompositeResponseResolver,
    ) -> Self {
        Self {
            authenticator,
            store,
            codec,
            resolver,
            observer: Arc::new(NoOpObserver),
            throttle: Arc::new(NoThrottle),
        }
    }

    /// Attach an audit observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn IssuanceObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach a request throttle, consulted before authentication.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Arc<dyn RequestThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Authenticate a credential and issue a ticket-granting ticket.
    ///
    /// On success the granting ticket id is bound into a cookie value
    /// (carrying the client context when the cipher is protective) and the
    /// response is shaped by the resolved factory. A response-build failure
    /// leaves the created ticket valid in the store; the client may retrieve
    /// it again through [`ticket_status`](Self::ticket_status).
    pub async fn issue_ticket_granting(
        &self,
        credential: &Credential,
        client: Option<&ClientContext>,
        request: &RequestContext,
    ) -> Result<IssuedTicket> {
        self.check_throttle(client)?;

        let principal = self
            .authenticator
            .authenticate(credential)
            .await
            .map_err(|err| self.fail(IssuancePhase::Received, err, None))?;
        tracing::debug!(principal = %principal.name, "credential authenticated");

        let ticket = self
            .store
            .create(TicketKind::Granting, None)
            .await
            .map_err(|err| self.fail(IssuancePhase::Authenticated, err, None))?;

        // Keys were validated when the cipher was constructed, so a failure
        // here is unexpected and fatal for this request, never retried.
        let cookie = self
            .codec
            .encode(&ticket.id, client)
            .map_err(|err| {
                let err = TurnstileError::internal_cipher(err.to_string());
                self.fail(IssuancePhase::TicketCreated, err, Some(&ticket.id))
            })?;

        let response = self
            .resolver
            .build(&ticket, request)
            .map_err(|err| self.fail(IssuancePhase::CookieEncoded, err, Some(&ticket.id)))?;
        tracing::debug!(ticket = %ticket.id, phase = %IssuancePhase::ResponseBuilt, "response payload built");

        tracing::info!(ticket = %ticket.id, principal = %principal.name, phase = %IssuancePhase::Completed, "granting ticket issued");
        self.observer.ticket_issued(&ticket.id);
        Ok(IssuedTicket {
            ticket,
            cookie: Some(cookie),
            response,
        })
    }

    /// Exchange a granting-ticket cookie for a service ticket.
    ///
    /// The cookie value is untrusted input: it is decoded (and, when it
    /// embeds a client binding, checked against the presenting client)
    /// before the granting ticket is validated against the store. No new
    /// cookie is issued.
    pub async fn issue_service_ticket(
        &self,
        cookie_value: &str,
        client: Option<&ClientContext>,
        request: &RequestContext,
    ) -> Result<IssuedTicket> {
        self.check_throttle(client)?;

        let granting_id = self
            .codec
            .decode(cookie_value, client)
            .map_err(|err| self.fail(IssuancePhase::Received, err, None))?;

        let granting = self
            .store
            .find(&granting_id)
            .await
            .map_err(|err| self.fail(IssuancePhase::Received, err, Some(&granting_id)))?;

        let ticket = self
            .store
            .create(TicketKind::Service, Some(&granting.id))
            .await
            .map_err(|err| self.fail(IssuancePhase::TicketValidated, err, Some(&granting.id)))?;

        let response = self
            .resolver
            .build(&ticket, request)
            .map_err(|err| self.fail(IssuancePhase::TicketCreated, err, Some(&ticket.id)))?;
        tracing::debug!(ticket = %ticket.id, phase = %IssuancePhase::ResponseBuilt, "response payload built");

        tracing::info!(ticket = %ticket.id, parent = %granting.id, phase = %IssuancePhase::Completed, "service ticket issued");
        self.observer.ticket_issued(&ticket.id);
        Ok(IssuedTicket {
            ticket,
            cookie: None,
            response,
        })
    }

    /// Side-effect-free status lookup for an already-issued ticket.
    ///
    /// Lets a client re-fetch a ticket whose response failed to build;
    /// never mutates store state.
    pub async fn ticket_status(&self, ticket_id: &TicketId) -> Result<ResponsePayload> {
        let ticket = self.store.find(ticket_id).await?;
        tracing::debug!(ticket = %ticket.id, "ticket status lookup");
        Ok(ResponsePayload::ok(ticket.id.as_str()).with_header("Content-Type", "text/plain"))
    }

    /// Decode a granting-ticket cookie and invalidate the ticket.
    ///
    /// Single-logout propagation to relying applications is outside this
    /// core; only the granting ticket itself is destroyed.
    pub async fn destroy_ticket_granting(
        &self,
        cookie_value: &str,
        client: Option<&ClientContext>,
    ) -> Result<TicketId> {
        let granting_id = self
            .codec
            .decode(cookie_value, client)
            .map_err(|err| self.fail(IssuancePhase::Received, err, None))?;
        self.store.invalidate(&granting_id).await?;
        tracing::info!(ticket = %granting_id, "granting ticket destroyed");
        Ok(granting_id)
    }

    /// Consult the throttle before any credential or cookie is examined.
    fn check_throttle(&self, client: Option<&ClientContext>) -> Result<()> {
        let client_key = client.map_or("unknown", |c| c.address.as_str());
        if self.throttle.permit(client_key) {
            return Ok(());
        }
        let err = TurnstileError::authentication_failed(format!(
            "request from '{client_key}' was throttled"
        ));
        Err(self.fail(IssuancePhase::Received, err, None))
    }

    /// Map an error to the terminal `Error` state: emit the structured
    /// failure event, then hand the error back to the caller.
    fn fail(
        &self,
        phase: IssuancePhase,
        err: TurnstileError,
        ticket_id: Option<&TicketId>,
    ) -> TurnstileError {
        let failure = IssuanceFailure {
            phase,
            kind: err.kind(),
            ticket_id: ticket_id.cloned(),
        };
        tracing::warn!(
            phase = %phase,
            kind = ?failure.kind,
            ticket = ticket_id.map_or("-", TicketId::as_str),
            "issuance request failed: {err}"
        );
        self.observer.issuance_failed(&failure);
        err
    }
}
