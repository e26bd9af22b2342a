//! Extension points for audit and throttling collaborators.
//!
//! The algorithms behind these seams (audit trail recording, rate limiting)
//! live outside this core. The orchestration service reports every terminal
//! outcome through [`IssuanceObserver`] and consults [`RequestThrottle`] once
//! per inbound request, before authentication. Events carry error kind and
//! ticket id, never credentials or key material.

use crate::errors::ErrorKind;
use crate::ticket::TicketId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of the per-request issuance state machine.
///
/// A failure event is tagged with the last phase that had been reached when
/// the error occurred. The final two phases cannot appear in a failure:
/// nothing runs after the response is built, and success is reported through
/// [`IssuanceObserver::ticket_issued`]. They are emitted in progress traces
/// so log consumers see the same phase names for the whole progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuancePhase {
    /// Request accepted, nothing verified yet
    Received,
    /// Credential verified
    Authenticated,
    /// Ticket created by the store
    TicketCreated,
    /// Existing ticket validated against the store
    TicketValidated,
    /// Cookie value encoded
    CookieEncoded,
    /// Response payload built
    ResponseBuilt,
    /// Terminal success
    Completed,
}

impl fmt::Display for IssuancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Authenticated => "authenticated",
            Self::TicketCreated => "ticket-created",
            Self::TicketValidated => "ticket-validated",
            Self::CookieEncoded => "cookie-encoded",
            Self::ResponseBuilt => "response-built",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Structured failure event for a terminal `Error` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceFailure {
    /// Last phase reached before the failure
    pub phase: IssuancePhase,
    /// Error category
    pub kind: ErrorKind,
    /// Ticket involved, when one existed by the time of the failure
    pub ticket_id: Option<TicketId>,
}

/// Receives terminal issuance outcomes.
pub trait IssuanceObserver: Send + Sync {
    /// A ticket was issued and its response built.
    fn ticket_issued(&self, ticket_id: &TicketId);

    /// An issuance request reached a terminal `Error` state.
    fn issuance_failed(&self, failure: &IssuanceFailure);
}

/// Observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl IssuanceObserver for NoOpObserver {
    fn ticket_issued(&self, _ticket_id: &TicketId) {}
    fn issuance_failed(&self, _failure: &IssuanceFailure) {}
}

/// Rate-throttling hook, consulted before authentication.
pub trait RequestThrottle: Send + Sync {
    /// Whether the request identified by `client_key` may proceed. A denial
    /// is reported to the caller as `AuthenticationFailed` without the
    /// authenticator ever seeing the credential.
    fn permit(&self, client_key: &str) -> bool;
}

/// Throttle that permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

impl RequestThrottle for NoThrottle {
    fn permit(&self, _client_key: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_are_stable_and_distinct() {
        let phases = [
            (IssuancePhase::Received, "received"),
            (IssuancePhase::Authenticated, "authenticated"),
            (IssuancePhase::TicketCreated, "ticket-created"),
            (IssuancePhase::TicketValidated, "ticket-validated"),
            (IssuancePhase::CookieEncoded, "cookie-encoded"),
            (IssuancePhase::ResponseBuilt, "response-built"),
            (IssuancePhase::Completed, "completed"),
        ];
        for (phase, name) in phases {
            assert_eq!(phase.to_string(), name);
        }
    }
}
