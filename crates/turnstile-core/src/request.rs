//! Request-side types handed to the core by the hosting HTTP layer.
//!
//! Routing and parameter binding happen outside this core: by the time these
//! types exist, the request has already been parsed.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A parsed credential presented for authentication.
///
/// The secret is zeroized when the credential is dropped.
#[derive(Debug, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    /// Claimed identity
    #[zeroize(skip)]
    pub username: String,
    /// Proof of identity (password or equivalent)
    pub secret: String,
}

impl Credential {
    /// Build a credential from its parts.
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

/// The identity established by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Canonical principal name
    pub name: String,
}

impl Principal {
    /// Build a principal.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Per-request negotiation context consumed by response factories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Declared protocol / response-shape hint (e.g. `cas-protocol-v3`).
    pub protocol_hint: Option<String>,
    /// Target application, when issuing a service ticket.
    pub service: Option<String>,
}

impl RequestContext {
    /// Context with a protocol hint only.
    pub fn with_protocol_hint(hint: impl Into<String>) -> Self {
        Self {
            protocol_hint: Some(hint.into()),
            ..Self::default()
        }
    }

    /// Context for a service-ticket request.
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: Some(service.into()),
            ..Self::default()
        }
    }
}

/// Client-identifying context captured at cookie-issuance time.
///
/// Embedded into protected cookie values so that a cookie replayed from a
/// different network address or user agent is rejected on decode. Opaque to
/// the codec beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    /// Requesting client's network address
    pub address: String,
    /// Requesting client's user agent
    pub user_agent: String,
}

impl ClientContext {
    /// Build a client context from its parts.
    pub fn new(address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user_agent: user_agent.into(),
        }
    }
}
