//! Startup decision: is the cookie cipher protective or a pass-through?
//!
//! Decided once, as a pure function of [`CipherConfig`], independent of how
//! the host wires its components. Protection is fail-safe-on: when signing
//! and encryption keys are configured, the cipher is protective even if the
//! host forgot to flip `enabled` — never silently fail-open.

use crate::cipher::{CookieCipher, ProtectedCipher};
use crate::config::CipherConfig;
use turnstile_core::{Result, TurnstileError};

/// Warning raised while resolving the cipher.
///
/// Returned as data (in addition to a `tracing` warning) so hosts and tests
/// can observe the decision without a log-capture layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherWarning {
    /// Protection was not enabled in configuration, but both keys were
    /// present; the cipher was escalated to protected.
    ImplicitEscalation,
    /// No protection: cookie values travel as plain ticket ids.
    ProtectionDisabled,
}

/// Outcome of cipher resolution.
#[derive(Debug)]
pub struct ResolvedCipher {
    /// The cipher to hand to the codec.
    pub cipher: CookieCipher,
    /// Warning raised during resolution, if any.
    pub warning: Option<CipherWarning>,
}

/// Resolves a [`CipherConfig`] into the cipher used for cookie values.
pub struct CipherPolicy;

impl CipherPolicy {
    /// Decide the effective protection state and construct the cipher.
    ///
    /// Fails with `Configuration` when protection is explicitly enabled but
    /// a key is blank or malformed — an enabled cipher never silently
    /// downgrades to a pass-through.
    pub fn resolve(config: &CipherConfig) -> Result<ResolvedCipher> {
        let signing = config.signing_secret();
        let encryption = config.encryption_secret();

        if config.enabled {
            let signing = signing.ok_or_else(|| {
                TurnstileError::configuration("cookie cipher is enabled but the signing key is blank")
            })?;
            let encryption = encryption.ok_or_else(|| {
                TurnstileError::configuration(
                    "cookie cipher is enabled but the encryption key is blank",
                )
            })?;
            return Ok(ResolvedCipher {
                cipher: CookieCipher::Protected(ProtectedCipher::new(signing, encryption)?),
                warning: None,
            });
        }

        if let (Some(signing), Some(encryption)) = (signing, encryption) {
            tracing::warn!(
                "cookie encryption/signing is not enabled in configuration, yet signing and \
                 encryption keys are defined; escalating to signed+encrypted cookie values"
            );
            return Ok(ResolvedCipher {
                cipher: CookieCipher::Protected(ProtectedCipher::new(signing, encryption)?),
                warning: Some(CipherWarning::ImplicitEscalation),
            });
        }

        tracing::warn!(
            "ticket-granting cookie encryption/signing is turned off; cookie values are \
             unprotected, which may not be safe in a production environment"
        );
        Ok(ResolvedCipher {
            cipher: CookieCipher::NoOp,
            warning: Some(CipherWarning::ProtectionDisabled),
        })
    }
}
