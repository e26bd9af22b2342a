//! Turnstile Cookie
//!
//! Secure cookie value management for the ticket-granting cookie:
//!
//! - [`CipherConfig`]: host-supplied crypto settings for the cookie.
//! - [`CipherPolicy`]: decides once, at startup, whether cookie values are
//!   cryptographically protected, escalating to protected when keys are
//!   configured even if protection was left disabled.
//! - [`CookieCipher`]: sign-then-encrypt string cipher with an explicit
//!   identity (no-op) variant.
//! - [`CookieValueCodec`]: binds a ticket id (plus optional client-binding
//!   context) into an opaque cookie string and back.
//!
//! Everything here is pure transformation — no network or storage I/O. The
//! cookie value is the one artifact that crosses the trust boundary to the
//! client and is treated as untrusted input on every decode.

#![forbid(unsafe_code)]

pub mod cipher;
pub mod codec;
pub mod config;
pub mod policy;

pub use cipher::CookieCipher;
pub use codec::CookieValueCodec;
pub use config::CipherConfig;
pub use policy::{CipherPolicy, CipherWarning, ResolvedCipher};
