//! Cookie cipher configuration.

use serde::{Deserialize, Serialize};

/// Crypto settings for the ticket-granting cookie.
///
/// Loaded by the host from its configuration source; validated when the
/// cipher is constructed, so misconfiguration surfaces at startup rather
/// than on the first user request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    /// Whether cookie values must be signed and encrypted.
    #[serde(default)]
    pub enabled: bool,
    /// Secret the signing key is derived from.
    #[serde(default)]
    pub signing_key: Option<String>,
    /// Secret the encryption key is derived from.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

impl CipherConfig {
    /// Configuration with protection explicitly enabled.
    pub fn protected(signing_key: impl Into<String>, encryption_key: impl Into<String>) -> Self {
        Self {
            enabled: true,
            signing_key: Some(signing_key.into()),
            encryption_key: Some(encryption_key.into()),
        }
    }

    /// Configuration with protection off and no keys.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The signing secret, if present and non-blank.
    pub(crate) fn signing_secret(&self) -> Option<&str> {
        self.signing_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The encryption secret, if present and non-blank.
    pub(crate) fn encryption_secret(&self) -> Option<&str> {
        self.encryption_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
