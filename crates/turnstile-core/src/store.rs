//! Seams to the external collaborators this core consumes.
//!
//! The ticket store owns ticket lifecycle (expiry policy, the rule that a
//! service ticket cannot outlive its granting ticket) and is assumed safe for
//! concurrent use. The core performs no locking and no retries of its own;
//! store timeouts and cancellation propagate upward through `.await`.

use crate::errors::Result;
use crate::request::{Credential, Principal};
use crate::ticket::{Ticket, TicketId, TicketKind};
use async_trait::async_trait;

/// Create/lookup/invalidate tickets by id.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Create a ticket of the given kind. Service tickets must name their
    /// granting parent; creation against a missing or expired parent fails
    /// with [`TurnstileError::TicketUnavailable`].
    ///
    /// [`TurnstileError::TicketUnavailable`]: crate::TurnstileError::TicketUnavailable
    async fn create(&self, kind: TicketKind, parent: Option<&TicketId>) -> Result<Ticket>;

    /// Look up a live ticket. Missing or expired tickets fail with
    /// `TicketUnavailable`; lookup never mutates validity.
    async fn find(&self, id: &TicketId) -> Result<Ticket>;

    /// Invalidate a ticket. Idempotent on already-absent ids.
    async fn invalidate(&self, id: &TicketId) -> Result<()>;
}

/// Verifies a credential and yields the authenticated principal.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify the credential. Failure is the expected, user-facing
    /// `AuthenticationFailed` — never an internal fault.
    async fn authenticate(&self, credential: &Credential) -> Result<Principal>;
}
