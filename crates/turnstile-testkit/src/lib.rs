//! Turnstile Testkit
//!
//! In-memory implementations of the external collaborators the core
//! consumes, for use in tests across the workspace. The ticket store runs on
//! a manually-advanced clock so expiry behavior is deterministic.

#![forbid(unsafe_code)]

mod authenticator;
mod observer;
mod store;

pub use authenticator::FixedAuthenticator;
pub use observer::RecordingObserver;
pub use store::InMemoryTicketStore;
