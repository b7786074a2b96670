//! Shared test helpers for license tests.

#![allow(dead_code)]

use hmac::{Hmac, Mac};
use sha2::Sha256;
use venture_license::{codec, sign, verify_at, LicensePayload, SigningSecret, Verification};

/// Fixed "current time" used by expiry tests (2025-01-01T00:00:00Z).
pub const NOW: i64 = 1_735_689_600;

/// Returns the secret used across tests.
pub fn test_secret() -> SigningSecret {
    SigningSecret::from("test-signing-secret")
}

/// Creates a token over arbitrary body bytes: `base64url(body).base64url(hmac)`.
/// Lets tests sign bodies the payload serializer would never produce.
pub fn sign_raw(secret: &SigningSecret, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    let sig = mac.finalize().into_bytes();
    format!("{}.{}", codec::encode(body), codec::encode(&sig))
}

/// Creates a token for `plan` with an optional expiry.
pub fn make_token(plan: &str, exp: Option<i64>) -> String {
    let payload = match exp {
        Some(exp) => LicensePayload::new(plan).with_expiry(exp),
        None => LicensePayload::new(plan),
    };
    sign(&payload, &test_secret()).unwrap()
}

/// Signs a JSON body string as-is and verifies it at [`NOW`].
pub fn verify_body(body: &str) -> Verification {
    let secret = test_secret();
    verify_at(&sign_raw(&secret, body.as_bytes()), &secret, NOW)
}

/// Replaces the character at `idx` with a different base64url character.
pub fn flip_char(segment: &str, idx: usize) -> String {
    let mut chars: Vec<char> = segment.chars().collect();
    chars[idx] = if chars[idx] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}
