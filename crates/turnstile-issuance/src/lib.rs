//! Turnstile Issuance
//!
//! Orchestrates a single sign-on issuance request end to end: authenticate
//! the credential, drive ticket lifecycle through the external store, bind
//! the ticket id into a cookie value, and shape the outgoing response
//! through the composite resolver.
//!
//! Each request runs to completion on the caller's task; the only awaits are
//! the calls into the external authenticator and ticket store, whose
//! timeouts and cancellation propagate upward untouched. The service holds
//! only immutable, startup-constructed state and is shared freely across
//! concurrent requests.

#![forbid(unsafe_code)]

pub mod service;

pub use service::{IssuedTicket, TicketIssuanceService};
