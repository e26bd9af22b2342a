//! Ticket identifiers and the ticket entity.
//!
//! Tickets are owned by the external ticket store; this core only references
//! them. A service ticket always carries a reference to the granting ticket
//! that spawned it, and its validity window is bounded by the parent's —
//! enforced by the store, consumed as a precondition here.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Opaque ticket identifier.
///
/// The id string is the only piece of a ticket that ever crosses the trust
/// boundary to the client (inside a cookie value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Kind of ticket held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    /// Long-lived ticket-granting ticket proving prior authentication.
    Granting,
    /// Short-lived, application-scoped ticket issued against a granting one.
    Service,
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granting => f.write_str("granting"),
            Self::Service => f.write_str("service"),
        }
    }
}

/// Ticket state as reported by the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier
    pub id: TicketId,
    /// Granting or service
    pub kind: TicketKind,
    /// Granting ticket this ticket was issued against; `None` for granting
    /// tickets themselves.
    pub parent: Option<TicketId>,
    /// Issuance instant
    pub issued_at: OffsetDateTime,
    /// Expiry instant; the store caps a service ticket's expiry at its
    /// parent's.
    pub expires_at: OffsetDateTime,
}

impl Ticket {
    /// Whether the ticket is expired at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}
