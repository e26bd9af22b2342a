//! Fixed-credential authenticator.

use async_trait::async_trait;
use std::collections::HashMap;
use turnstile_core::{Authenticator, Credential, Principal, Result, TurnstileError};

/// Authenticator backed by a static username/secret table.
#[derive(Debug, Clone, Default)]
pub struct FixedAuthenticator {
    users: HashMap<String, String>,
}

impl FixedAuthenticator {
    /// Empty table; every authentication fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user.
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.users.insert(username.into(), secret.into());
        self
    }
}

#[async_trait]
impl Authenticator for FixedAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Result<Principal> {
        match self.users.get(&credential.username) {
            Some(secret) if *secret == credential.secret => {
                Ok(Principal::new(credential.username.clone()))
            }
            _ => Err(TurnstileError::authentication_failed(format!(
                "invalid credentials for '{}'",
                credential.username
            ))),
        }
    }
}
