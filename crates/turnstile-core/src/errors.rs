//! Unified error type for the Turnstile workspace.
//!
//! One enum covers the whole taxonomy so that errors cross crate boundaries
//! without re-wrapping, and so audit collaborators can record a stable
//! [`ErrorKind`] instead of matching on message strings.

use serde::{Deserialize, Serialize};

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, TurnstileError>;

/// Unified error type for all Turnstile operations.
///
/// Messages never contain key material; cipher failures are reported by
/// category only.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum TurnstileError {
    /// Invalid cipher keys or settings. Fatal at startup: the process must
    /// not continue with a cipher state it did not intend.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What was misconfigured
        message: String,
    },

    /// An inbound cookie value failed structural or cryptographic checks.
    /// Always recovered as "treat as absent/invalid session".
    #[error("Invalid cookie value: {message}")]
    InvalidCookieValue {
        /// Which check failed
        message: String,
    },

    /// The client-binding context embedded in a cookie does not match the
    /// context of the client presenting it.
    #[error("Cookie client binding mismatch: {message}")]
    BindingMismatch {
        /// Mismatch description
        message: String,
    },

    /// Credential verification failed, or the request was throttled before
    /// reaching the authenticator.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Failure cause for the audit trail
        message: String,
    },

    /// The ticket store could not create, find, or validate a ticket.
    #[error("Ticket unavailable: {message}")]
    TicketUnavailable {
        /// Store-reported cause
        message: String,
    },

    /// A resolved response factory failed to build its payload. Carries the
    /// factory identity and ticket id for diagnostics.
    #[error("Response factory '{factory}' failed for ticket {ticket_id}: {message}")]
    ResponseBuild {
        /// Identity of the factory that failed
        factory: String,
        /// Ticket the response was being built for
        ticket_id: String,
        /// Factory-reported cause
        message: String,
    },

    /// A factory registration arrived after the plan was finalized.
    #[error("Composition is closed: {message}")]
    CompositionClosed {
        /// What was registered too late
        message: String,
    },

    /// Unexpected cipher failure after startup validation. Fatal for the
    /// single request, never retried.
    #[error("Internal cipher error: {message}")]
    InternalCipher {
        /// Failure category, with secret material stripped
        message: String,
    },
}

impl TurnstileError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid-cookie-value error
    pub fn invalid_cookie_value(message: impl Into<String>) -> Self {
        Self::InvalidCookieValue {
            message: message.into(),
        }
    }

    /// Create a binding-mismatch error
    pub fn binding_mismatch(message: impl Into<String>) -> Self {
        Self::BindingMismatch {
            message: message.into(),
        }
    }

    /// Create an authentication-failed error
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Create a ticket-unavailable error
    pub fn ticket_unavailable(message: impl Into<String>) -> Self {
        Self::TicketUnavailable {
            message: message.into(),
        }
    }

    /// Create a response-build error carrying factory and ticket identity
    pub fn response_build(
        factory: impl Into<String>,
        ticket_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ResponseBuild {
            factory: factory.into(),
            ticket_id: ticket_id.into(),
            message: message.into(),
        }
    }

    /// Create a composition-closed error
    pub fn composition_closed(message: impl Into<String>) -> Self {
        Self::CompositionClosed {
            message: message.into(),
        }
    }

    /// Create an internal cipher error
    pub fn internal_cipher(message: impl Into<String>) -> Self {
        Self::InternalCipher {
            message: message.into(),
        }
    }

    /// Stable kind discriminant for audit events and failure mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::InvalidCookieValue { .. } => ErrorKind::InvalidCookieValue,
            Self::BindingMismatch { .. } => ErrorKind::BindingMismatch,
            Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            Self::TicketUnavailable { .. } => ErrorKind::TicketUnavailable,
            Self::ResponseBuild { .. } => ErrorKind::ResponseBuild,
            Self::CompositionClosed { .. } => ErrorKind::CompositionClosed,
            Self::InternalCipher { .. } => ErrorKind::InternalCipher,
        }
    }
}

/// Payload-free discriminant of [`TurnstileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Invalid cipher keys or settings
    Configuration,
    /// Untrusted cookie value failed structural/cryptographic checks
    InvalidCookieValue,
    /// Cookie presented from a different client context
    BindingMismatch,
    /// Credential verification failed or request throttled
    AuthenticationFailed,
    /// Ticket store could not satisfy the request
    TicketUnavailable,
    /// Response factory failure
    ResponseBuild,
    /// Registration after plan finalization
    CompositionClosed,
    /// Unexpected cipher failure
    InternalCipher,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = TurnstileError::response_build("cas-protocol", "ST-1", "boom");
        assert_eq!(err.kind(), ErrorKind::ResponseBuild);
        assert!(err.to_string().contains("cas-protocol"));
        assert!(err.to_string().contains("ST-1"));
    }

    #[test]
    fn errors_serialize_for_audit_sinks() {
        let err = TurnstileError::ticket_unavailable("granting ticket expired");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("granting ticket expired"));
    }
}
