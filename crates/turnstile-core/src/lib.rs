//! Turnstile Core
//!
//! Foundation types for the Turnstile single-sign-on ticket core:
//!
//! - Ticket identifiers and the ticket entity referenced (not owned) by the
//!   core, with granting/service kinds and parent references.
//! - Request-side types: credentials, authenticated principals, the
//!   per-request negotiation context, and the client-binding context embedded
//!   into protected cookies.
//! - The `ResponsePayload` handed back to the hosting HTTP layer, treated as
//!   opaque `{status, headers, body}` with no HTTP semantics interpreted here.
//! - The unified [`TurnstileError`] taxonomy shared by every crate in the
//!   workspace.
//! - Seams to the external collaborators this core consumes but does not
//!   implement: [`TicketStore`] and [`Authenticator`], plus the audit and
//!   throttling extension points ([`IssuanceObserver`], [`RequestThrottle`]).

#![forbid(unsafe_code)]

pub mod errors;
pub mod observe;
pub mod request;
pub mod response;
pub mod store;
pub mod ticket;

pub use errors::{ErrorKind, Result, TurnstileError};
pub use observe::{
    IssuanceFailure, IssuanceObserver, IssuancePhase, NoOpObserver, NoThrottle, RequestThrottle,
};
pub use request::{ClientContext, Credential, Principal, RequestContext};
pub use response::ResponsePayload;
pub use store::{Authenticator, TicketStore};
pub use ticket::{Ticket, TicketId, TicketKind};
