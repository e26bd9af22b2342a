//! Concrete response factories.

use crate::factory::ResponseFactory;
use serde::Serialize;
use turnstile_core::{RequestContext, ResponsePayload, Result, Ticket, TicketKind, TurnstileError};

/// Hint prefix claimed by the protocol-native factory.
const CAS_PROTOCOL_PREFIX: &str = "cas-protocol-";

#[derive(Serialize)]
struct CasTicketBody<'a> {
    ticket: &'a str,
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<&'a str>,
}

/// CAS-protocol-shaped ticket responses.
///
/// Answers requests whose protocol hint starts with `cas-protocol-` (any
/// version). The body is JSON carrying the ticket id; granting tickets
/// additionally get a `Location` header pointing at the ticket resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct CasProtocolResponseFactory;

impl ResponseFactory for CasProtocolResponseFactory {
    fn id(&self) -> &'static str {
        "cas-protocol"
    }

    fn supports(&self, request: &RequestContext) -> bool {
        request
            .protocol_hint
            .as_deref()
            .is_some_and(|hint| hint.starts_with(CAS_PROTOCOL_PREFIX))
    }

    fn build(&self, ticket: &Ticket, request: &RequestContext) -> Result<ResponsePayload> {
        let body = serde_json::to_string(&CasTicketBody {
            ticket: ticket.id.as_str(),
            kind: match ticket.kind {
                TicketKind::Granting => "granting",
                TicketKind::Service => "service",
            },
            service: request.service.as_deref(),
        })
        .map_err(|e| {
            TurnstileError::response_build(self.id(), ticket.id.as_str(), e.to_string())
        })?;

        let payload = match ticket.kind {
            TicketKind::Granting => ResponsePayload::ok(body)
                .with_header("Location", format!("/v1/tickets/{}", ticket.id)),
            TicketKind::Service => ResponsePayload::ok(body),
        };
        Ok(payload.with_header("Content-Type", "application/json"))
    }
}

/// Generic fallback: the bare ticket id as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextResponseFactory;

impl ResponseFactory for PlainTextResponseFactory {
    fn id(&self) -> &'static str {
        "plain-text"
    }

    fn supports(&self, _request: &RequestContext) -> bool {
        true
    }

    fn build(&self, ticket: &Ticket, _request: &RequestContext) -> Result<ResponsePayload> {
        Ok(ResponsePayload::ok(ticket.id.as_str()).with_header("Content-Type", "text/plain"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};
    use turnstile_core::TicketId;

    fn ticket(id: &str, kind: TicketKind) -> Ticket {
        let issued = OffsetDateTime::from_unix_timestamp(1_735_689_600).unwrap();
        Ticket {
            id: TicketId::from(id),
            kind,
            parent: (kind == TicketKind::Service).then(|| TicketId::from("TGT-1")),
            issued_at: issued,
            expires_at: issued + Duration::hours(8),
        }
    }

    #[test]
    fn cas_factory_claims_only_cas_hints() {
        let factory = CasProtocolResponseFactory;
        assert!(factory.supports(&RequestContext::with_protocol_hint("cas-protocol-v3")));
        assert!(factory.supports(&RequestContext::with_protocol_hint("cas-protocol-v2")));
        assert!(!factory.supports(&RequestContext::with_protocol_hint("saml-v2")));
        assert!(!factory.supports(&RequestContext::default()));
    }

    #[test]
    fn granting_ticket_gets_ok_with_location() {
        let request = RequestContext::with_protocol_hint("cas-protocol-v3");
        let payload = CasProtocolResponseFactory
            .build(&ticket("TGT-1", TicketKind::Granting), &request)
            .unwrap();
        assert_eq!(payload.status, 200);
        assert_eq!(payload.header("Location"), Some("/v1/tickets/TGT-1"));
        assert!(payload.body.contains("TGT-1"));
    }

    #[test]
    fn service_ticket_gets_ok_with_service_echoed() {
        let request = RequestContext {
            protocol_hint: Some("cas-protocol-v3".to_string()),
            service: Some("https://app.example.org".to_string()),
        };
        let payload = CasProtocolResponseFactory
            .build(&ticket("ST-9", TicketKind::Service), &request)
            .unwrap();
        assert_eq!(payload.status, 200);
        assert!(payload.body.contains("ST-9"));
        assert!(payload.body.contains("https://app.example.org"));
    }

    #[test]
    fn plain_text_supports_anything() {
        let factory = PlainTextResponseFactory;
        assert!(factory.supports(&RequestContext::default()));
        let payload = factory
            .build(&ticket("TGT-1", TicketKind::Granting), &RequestContext::default())
            .unwrap();
        assert_eq!(payload.status, 200);
        assert_eq!(payload.body, "TGT-1");
    }
}
