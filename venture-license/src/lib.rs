//! Licensing and plan entitlements for Venture Studio.
//!
//! This crate handles:
//! - Offline license verification via HMAC-SHA256
//! - Token issuance for the billing side
//! - Mapping plans to usage limits
//! - Gating daily runs against those limits
//!
//! # Design Principles
//!
//! - **Offline**: no network, file or database access
//! - **Fail closed**: every non-`ok` token and every unknown plan gets the free tier
//! - **No hidden state**: the secret and the current time are passed in by the caller
//!
//! # License Token Format
//!
//! Tokens are formatted as: `base64url(payload).base64url(signature)`
//! The payload is a JSON object with an optional `plan` and `exp`; the
//! signature is HMAC-SHA256 over the exact payload bytes.

pub mod codec;
mod entitlement;
mod error;
mod payload;
mod secret;
mod usage;
mod verifier;

pub use entitlement::{resolve, Entitlement, Limits, Plan};
pub use error::{LicenseError, LicenseResult};
pub use payload::{LicensePayload, EXP_KEY, PLAN_KEY};
pub use secret::{SigningSecret, DEV_SECRET, SECRET_ENV_VAR};
pub use usage::{DailyUsage, RunGate, UsageLedger};
pub use verifier::{sign, verify, verify_at, LicenseStatus, Verification, SEGMENT_SEPARATOR};
