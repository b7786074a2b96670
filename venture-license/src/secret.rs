//! The shared HMAC signing secret.

use crate::error::{LicenseError, LicenseResult};
use std::env;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Environment variable holding the signing secret.
pub const SECRET_ENV_VAR: &str = "LICENSE_SIGNING_SECRET";

/// Fallback secret for local development. Tokens signed with it are worthless.
pub const DEV_SECRET: &str = "dev-secret";

/// A signing secret with automatic zeroization on drop.
///
/// Deliberately has no `Display` impl; `Debug` is redacted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret {
    bytes: Vec<u8>,
}

impl SigningSecret {
    /// Creates a secret from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Reads the secret from `LICENSE_SIGNING_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingSecret`] if the variable is unset or not UTF-8.
    pub fn from_env() -> LicenseResult<Self> {
        env::var(SECRET_ENV_VAR)
            .map(Self::from)
            .map_err(|_| LicenseError::MissingSecret(SECRET_ENV_VAR))
    }

    /// Reads the secret from the environment, falling back to [`DEV_SECRET`].
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|_| {
            tracing::warn!(
                var = SECRET_ENV_VAR,
                "signing secret not configured, using development secret"
            );
            Self::from(DEV_SECRET)
        })
    }

    /// Returns true if this is the development fallback secret.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.bytes == DEV_SECRET.as_bytes()
    }

    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&str> for SigningSecret {
    fn from(secret: &str) -> Self {
        Self::from_bytes(secret.as_bytes())
    }
}

impl From<String> for SigningSecret {
    fn from(secret: String) -> Self {
        Self::from_bytes(secret.into_bytes())
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
