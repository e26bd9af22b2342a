//! The cookie value cipher.
//!
//! Sign-then-encrypt on encode: an HMAC-SHA512 tag is appended to the
//! plaintext and the whole buffer sealed with AES-256-GCM under a random
//! nonce. Decode reverses it — decrypt, then verify the tag in constant time
//! before any decrypted content is released to the caller.
//!
//! The identity cipher is an explicit enum variant, not a separate type, so
//! every call site handles both shapes the same way.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use turnstile_core::{Result, TurnstileError};
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha512 = Hmac<Sha512>;

const NONCE_LEN: usize = 12;
const GCM_TAG_LEN: usize = 16;
const MAC_LEN: usize = 64;

/// GCM associated data binding ciphertexts to this use.
const AAD_LABEL: &[u8] = b"turnstile-cookie-v1";

/// Minimum length of a configured secret, in characters.
const MIN_SECRET_LEN: usize = 16;

/// Cipher applied to cookie values.
#[derive(Debug)]
pub enum CookieCipher {
    /// Signing + encryption.
    Protected(ProtectedCipher),
    /// Identity pass-through.
    NoOp,
}

impl CookieCipher {
    /// Whether this cipher actually protects values.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    /// Encode a plaintext cookie value.
    ///
    /// Never fails under normal operation once construction has validated the
    /// keys; a failure here is an unexpected `InternalCipher` error.
    pub fn encode(&self, plaintext: &str) -> Result<String> {
        match self {
            Self::Protected(cipher) => cipher.encode(plaintext),
            Self::NoOp => Ok(plaintext.to_string()),
        }
    }

    /// Decode an untrusted cookie value back to its plaintext.
    ///
    /// Under the protected variant any structural, decryption, or signature
    /// failure maps to `InvalidCookieValue`.
    pub fn decode(&self, value: &str) -> Result<String> {
        match self {
            Self::Protected(cipher) => cipher.decode(value),
            Self::NoOp => Ok(value.to_string()),
        }
    }
}

/// Sign-then-encrypt cipher over derived keys.
///
/// Keys are derived from the configured secrets with BLAKE3 under distinct
/// domain-separation labels, validated at construction, and zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ProtectedCipher {
    signing_key: [u8; 32],
    encryption_key: [u8; 32],
}

impl std::fmt::Debug for ProtectedCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material never reaches logs.
        f.debug_struct("ProtectedCipher").finish_non_exhaustive()
    }
}

impl ProtectedCipher {
    /// Build a cipher from the configured secrets.
    ///
    /// Fails with `Configuration` when either secret is blank or shorter
    /// than 16 characters.
    pub fn new(signing_secret: &str, encryption_secret: &str) -> Result<Self> {
        validate_secret("signing key", signing_secret)?;
        validate_secret("encryption key", encryption_secret)?;
        Ok(Self {
            signing_key: derive_key(signing_secret, b"turnstile.cookie.signing.v1"),
            encryption_key: derive_key(encryption_secret, b"turnstile.cookie.encryption.v1"),
        })
    }

    fn encode(&self, plaintext: &str) -> Result<String> {
        let mut buf = plaintext.as_bytes().to_vec();
        buf.extend_from_slice(&self.sign(plaintext.as_bytes()));

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let cipher = Aes256Gcm::new(&self.encryption_key.into());
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &buf,
                    aad: AAD_LABEL,
                },
            )
            .map_err(|_| TurnstileError::internal_cipher("AES-GCM encryption failed"))?;
        buf.zeroize();

        let mut wire = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        wire.extend_from_slice(&nonce);
        wire.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(wire))
    }

    fn decode(&self, value: &str) -> Result<String> {
        let wire = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| TurnstileError::invalid_cookie_value("value is not valid base64"))?;
        if wire.len() < NONCE_LEN + GCM_TAG_LEN + MAC_LEN {
            return Err(TurnstileError::invalid_cookie_value("value is too short"));
        }
        let (nonce, ciphertext) = wire.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(&self.encryption_key.into());
        let buf = cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: AAD_LABEL,
                },
            )
            .map_err(|_| TurnstileError::invalid_cookie_value("decryption failed"))?;
        if buf.len() < MAC_LEN {
            return Err(TurnstileError::invalid_cookie_value("decrypted value is truncated"));
        }

        // Verify before trusting: the plaintext is released only after the
        // signature check passes.
        let (plaintext, tag) = buf.split_at(buf.len() - MAC_LEN);
        let expected = self.sign(plaintext);
        if expected.as_slice().ct_eq(tag).unwrap_u8() != 1 {
            return Err(TurnstileError::invalid_cookie_value(
                "signature verification failed",
            ));
        }

        String::from_utf8(plaintext.to_vec())
            .map_err(|_| TurnstileError::invalid_cookie_value("plaintext is not valid UTF-8"))
    }

    fn sign(&self, data: &[u8]) -> [u8; MAC_LEN] {
        // Key length is fixed at 32 bytes, accepted by HMAC unconditionally.
        #[allow(clippy::expect_used)]
        let mut mac =
            <HmacSha512 as Mac>::new_from_slice(&self.signing_key)
                .expect("HMAC accepts any key length");
        mac.update(data);
        let digest = mac.finalize().into_bytes();
        let mut tag = [0u8; MAC_LEN];
        tag.copy_from_slice(&digest);
        tag
    }
}

fn validate_secret(name: &str, secret: &str) -> Result<()> {
    if secret.trim().is_empty() {
        return Err(TurnstileError::configuration(format!(
            "cookie {name} is blank"
        )));
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(TurnstileError::configuration(format!(
            "cookie {name} is too short: need at least {MIN_SECRET_LEN} characters"
        )));
    }
    Ok(())
}

/// Derive a 32-byte key from a configured secret under a domain label.
fn derive_key(secret: &str, label: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(label);
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}
