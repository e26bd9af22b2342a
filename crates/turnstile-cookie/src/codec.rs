//! Cookie value codec: ticket id (+ optional client binding) to opaque
//! cookie string and back.
//!
//! Under a protective cipher the client-binding context is embedded at
//! issuance as delimiter-safe base64 segments and compared against the
//! presenting client on decode, rejecting cookies replayed from a different
//! address or user agent. The no-op cipher never embeds binding, so decode
//! performs only structural validation.
//!
//! Decoding never touches the ticket store; it only yields the ticket id.

use crate::cipher::CookieCipher;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use subtle::ConstantTimeEq;
use turnstile_core::{ClientContext, Result, TicketId, TurnstileError};

/// Separator between the ticket id and binding segments. Binding segments
/// are base64-encoded, so the separator cannot appear inside them.
const DELIMITER: char = '@';

/// Encodes and decodes ticket-granting cookie values.
#[derive(Debug)]
pub struct CookieValueCodec {
    cipher: CookieCipher,
}

impl CookieValueCodec {
    /// Build a codec over a resolved cipher.
    pub fn new(cipher: CookieCipher) -> Self {
        Self { cipher }
    }

    /// Whether cookie values produced by this codec are protected.
    pub fn is_protected(&self) -> bool {
        self.cipher.is_protected()
    }

    /// Encode a ticket id into a cookie value.
    ///
    /// The client context is embedded only under a protective cipher; an
    /// unprotected value would expose it without any integrity guarantee.
    pub fn encode(&self, ticket_id: &TicketId, client: Option<&ClientContext>) -> Result<String> {
        let id = ticket_id.as_str();
        if id.is_empty() {
            return Err(TurnstileError::invalid_cookie_value("ticket id is empty"));
        }
        if id.contains(DELIMITER) {
            return Err(TurnstileError::invalid_cookie_value(
                "ticket id contains the binding delimiter",
            ));
        }

        let plaintext = match client.filter(|_| self.cipher.is_protected()) {
            Some(client) => format!(
                "{id}{DELIMITER}{}{DELIMITER}{}",
                URL_SAFE_NO_PAD.encode(&client.address),
                URL_SAFE_NO_PAD.encode(&client.user_agent),
            ),
            None => id.to_string(),
        };
        self.cipher.encode(&plaintext)
    }

    /// Decode an untrusted cookie value back to its ticket id.
    ///
    /// When the value embeds a client-binding context, it is compared in
    /// constant time against `current`; a mismatch (or an absent current
    /// context) fails with `BindingMismatch`.
    pub fn decode(&self, value: &str, current: Option<&ClientContext>) -> Result<TicketId> {
        if value.trim().is_empty() {
            return Err(TurnstileError::invalid_cookie_value("cookie value is empty"));
        }
        let plaintext = self.cipher.decode(value)?;

        if !self.cipher.is_protected() {
            // Binding was never embedded; only structural validation applies.
            return validate_bare_id(&plaintext);
        }

        let segments: Vec<&str> = plaintext.split(DELIMITER).collect();
        match segments.as_slice() {
            [id] => validate_bare_id(id),
            [id, address, user_agent] => {
                let id = validate_bare_id(id)?;
                let bound = decode_binding(address, user_agent)?;
                let current = current.ok_or_else(|| {
                    TurnstileError::binding_mismatch(
                        "cookie embeds a client binding but no client context was presented",
                    )
                })?;
                verify_binding(&bound, current)?;
                Ok(id)
            }
            _ => Err(TurnstileError::invalid_cookie_value(
                "unexpected number of cookie value segments",
            )),
        }
    }
}

fn validate_bare_id(id: &str) -> Result<TicketId> {
    if id.is_empty() {
        return Err(TurnstileError::invalid_cookie_value(
            "ticket id is empty after decoding",
        ));
    }
    if id.contains(DELIMITER) || id.chars().any(char::is_control) {
        return Err(TurnstileError::invalid_cookie_value(
            "ticket id contains invalid characters",
        ));
    }
    Ok(TicketId::new(id))
}

fn decode_binding(address: &str, user_agent: &str) -> Result<ClientContext> {
    let address = URL_SAFE_NO_PAD
        .decode(address)
        .ok()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or_else(|| TurnstileError::invalid_cookie_value("malformed binding segment"))?;
    let user_agent = URL_SAFE_NO_PAD
        .decode(user_agent)
        .ok()
        .and_then(|b| String::from_utf8(b).ok())
        .ok_or_else(|| TurnstileError::invalid_cookie_value("malformed binding segment"))?;
    Ok(ClientContext::new(address, user_agent))
}

fn verify_binding(bound: &ClientContext, current: &ClientContext) -> Result<()> {
    // Both attributes are compared unconditionally, in constant time.
    let address_ok = bound.address.as_bytes().ct_eq(current.address.as_bytes());
    let agent_ok = bound
        .user_agent
        .as_bytes()
        .ct_eq(current.user_agent.as_bytes());
    if (address_ok & agent_ok).unwrap_u8() != 1 {
        return Err(TurnstileError::binding_mismatch(
            "cookie was issued to a different client context",
        ));
    }
    Ok(())
}
