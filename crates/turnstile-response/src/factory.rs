//! The response factory capability.

use turnstile_core::{RequestContext, ResponsePayload, Result, Ticket};

/// Builds the outgoing payload for an issued ticket.
///
/// Factories are registered once at composition time and shared read-only
/// afterwards, so implementations must be `Send + Sync` and must not rely on
/// interior mutability for per-request state.
pub trait ResponseFactory: Send + Sync {
    /// Stable identity used in diagnostics and build-failure errors.
    fn id(&self) -> &'static str;

    /// Whether this factory can shape a response for the request.
    fn supports(&self, request: &RequestContext) -> bool;

    /// Build the response payload for the ticket.
    ///
    /// Failures propagate to the caller as `ResponseBuild` errors carrying
    /// this factory's [`id`](Self::id) and the ticket id; they are never
    /// silently swallowed.
    fn build(&self, ticket: &Ticket, request: &RequestContext) -> Result<ResponsePayload>;
}
