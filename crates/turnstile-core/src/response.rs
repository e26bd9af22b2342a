//! The response payload handed back to the hosting HTTP layer.

use serde::{Deserialize, Serialize};

/// An already-shaped response: status, headers, body.
///
/// The core treats this as an opaque sum — it never interprets HTTP
/// semantics. Cookie attributes (name, path, flags) are the host's concern;
/// only the encoded cookie value travels with the issuance result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    /// Status code, uninterpreted
    pub status: u16,
    /// Header name/value pairs, uninterpreted
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: String,
}

impl ResponsePayload {
    /// A 200 payload with the given body and no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let payload = ResponsePayload::ok("TGT-1")
            .with_header("Location", "/v1/tickets/TGT-1")
            .with_header("Content-Type", "text/plain");
        assert_eq!(payload.status, 200);
        assert_eq!(payload.header("location"), Some("/v1/tickets/TGT-1"));
        assert_eq!(payload.header("content-type"), Some("text/plain"));
        assert_eq!(payload.header("x-missing"), None);
    }
}
