//! In-memory exchange credentials.
//!
//! Credentials live only for the lifetime of the process and are never
//! written to disk or logged.

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

use crate::errors::{CoreError, Result};

struct ExchangeCredentials {
    api_key: SecretString,
    // Stored for a future trading client; only tests read it today.
    #[cfg_attr(not(test), allow(dead_code))]
    secret_key: SecretString,
}

/// Holds the exchange API key pair entered on the configuration page.
#[derive(Default)]
pub struct CredentialStore {
    inner: RwLock<Option<ExchangeCredentials>>,
}

impl CredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored credentials. Surrounding whitespace is trimmed and
    /// blank fields are rejected.
    pub fn save(&self, api_key: &str, secret_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        let secret_key = secret_key.trim();
        if api_key.is_empty() {
            return Err(CoreError::EmptyCredential("api_key"));
        }
        if secret_key.is_empty() {
            return Err(CoreError::EmptyCredential("secret_key"));
        }

        *self.inner.write() = Some(ExchangeCredentials {
            api_key: SecretString::from(api_key.to_owned()),
            secret_key: SecretString::from(secret_key.to_owned()),
        });
        Ok(())
    }

    /// Whether a key pair has been saved.
    pub fn is_configured(&self) -> bool {
        self.inner.read().is_some()
    }

    #[cfg(test)]
    fn with_credentials<R>(&self, f: impl FnOnce(&str, &str) -> R) -> Option<R> {
        let guard = self.inner.read();
        let creds = guard.as_ref()?;
        Some(f(creds.api_key.expose_secret(), creds.secret_key.expose_secret()))
    }

    /// Masked API key showing only its last four characters, e.g. `****c0de`.
    pub fn api_key_hint(&self) -> Option<String> {
        let guard = self.inner.read();
        let creds = guard.as_ref()?;
        let key = creds.api_key.expose_secret();
        let tail_start = key
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(idx, _)| idx);
        Some(format!("****{}", &key[tail_start..]))
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}
