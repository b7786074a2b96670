//! HMAC-SHA256 license token signing and verification.
//!
//! Tokens use the format: `base64url(body).base64url(hmac_sha256(secret, body))`
//!
//! The MAC covers the exact body bytes carried in the token. Verification
//! never re-serializes the payload before checking it, since two encodings
//! of the same JSON object need not be byte-identical.

use crate::codec;
use crate::error::{LicenseError, LicenseResult};
use crate::payload::LicensePayload;
use crate::secret::SigningSecret;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Separator between the body and signature segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Status of a verification, in its wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LicenseStatus {
    /// Authentic and currently valid.
    Ok,
    /// Authentic but past its `exp`.
    Expired,
    /// Well-formed but not signed with the given secret.
    InvalidSignature,
    /// Not a decodable token.
    Malformed,
    /// No token presented.
    Missing,
}

impl LicenseStatus {
    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Expired => "expired",
            Self::InvalidSignature => "invalid-signature",
            Self::Malformed => "malformed",
            Self::Missing => "missing",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying a license token.
///
/// The payload is only carried once its signature has been checked.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// No token presented.
    Missing,
    /// Token structure, base64 or JSON could not be decoded.
    Malformed,
    /// Signature does not match the secret.
    InvalidSignature,
    /// Authentic token whose expiry has passed.
    Expired(LicensePayload),
    /// Authentic and unexpired.
    Valid(LicensePayload),
}

impl Verification {
    /// Returns true only for [`Verification::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the status of this outcome.
    #[must_use]
    pub fn status(&self) -> LicenseStatus {
        match self {
            Self::Missing => LicenseStatus::Missing,
            Self::Malformed => LicenseStatus::Malformed,
            Self::InvalidSignature => LicenseStatus::InvalidSignature,
            Self::Expired(_) => LicenseStatus::Expired,
            Self::Valid(_) => LicenseStatus::Ok,
        }
    }

    /// Returns the authenticated payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&LicensePayload> {
        match self {
            Self::Expired(payload) | Self::Valid(payload) => Some(payload),
            _ => None,
        }
    }

    /// Splits into `(valid, payload, status)`.
    #[must_use]
    pub fn into_parts(self) -> (bool, Option<LicensePayload>, LicenseStatus) {
        let valid = self.is_valid();
        let status = self.status();
        let payload = match self {
            Self::Expired(payload) | Self::Valid(payload) => Some(payload),
            _ => None,
        };
        (valid, payload, status)
    }
}

/// Signs a payload with the given secret, producing a token.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidPayload`] if `extra` holds `plan` or `exp`
/// (the body would carry the member twice), or an error if the payload
/// cannot be serialized.
pub fn sign(payload: &LicensePayload, secret: &SigningSecret) -> LicenseResult<String> {
    payload.ensure_signable()?;
    let body = serde_json::to_vec(payload)?;
    let signature = compute_mac(secret, &body)?;
    Ok(format!(
        "{}{SEGMENT_SEPARATOR}{}",
        codec::encode(&body),
        codec::encode(&signature)
    ))
}

/// Verifies a token against the system clock.
#[must_use]
pub fn verify(token: &str, secret: &SigningSecret) -> Verification {
    verify_at(token, secret, chrono::Utc::now().timestamp())
}

/// Verifies a token at `now` (seconds since epoch).
#[must_use]
pub fn verify_at(token: &str, secret: &SigningSecret, now: i64) -> Verification {
    let verification = match check(token.trim(), secret, now) {
        Ok(verification) => verification,
        Err(e) => {
            debug!(error = %e, "license token rejected as malformed");
            Verification::Malformed
        }
    };

    debug!(
        status = %verification.status(),
        plan = verification.payload().map(LicensePayload::plan_name),
        "license token verified"
    );
    verification
}

/// Every `Err` from here collapses to [`Verification::Malformed`].
fn check(token: &str, secret: &SigningSecret, now: i64) -> LicenseResult<Verification> {
    let (body_b64, sig_b64) = token
        .split_once(SEGMENT_SEPARATOR)
        .filter(|(body, sig)| !body.is_empty() && !sig.is_empty())
        .ok_or_else(|| {
            LicenseError::InvalidTokenFormat(
                "token must have two non-empty parts separated by a dot".to_string(),
            )
        })?;

    let body = codec::decode(body_b64)?;
    let expected = compute_mac(secret, &body)?;
    let provided = codec::decode(sig_b64)?;

    // Length mismatch yields false without short-circuiting on content
    if !bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
        return Ok(Verification::InvalidSignature);
    }

    let payload: LicensePayload = serde_json::from_slice(&body)
        .map_err(|e| LicenseError::InvalidPayload(format!("invalid payload JSON: {e}")))?;

    if payload.is_expired_at(now)? {
        return Ok(Verification::Expired(payload));
    }
    Ok(Verification::Valid(payload))
}

fn compute_mac(secret: &SigningSecret, body: &[u8]) -> LicenseResult<[u8; 32]> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(secret.as_bytes())
        .map_err(|e| LicenseError::InvalidSecret(e.to_string()))?;
    mac.update(body);
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
