//! Error types for the licensing module.
//!
//! Verification outcomes (expired, bad signature, ...) are not errors; see
//! [`crate::Verification`]. These variants cover codec failures, issuance,
//! configuration and quota gating.

use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Token or segment does not follow the `body.signature` base64url layout.
    #[error("invalid license token format: {0}")]
    InvalidTokenFormat(String),

    /// Payload JSON is malformed or has fields of the wrong type.
    #[error("invalid license payload: {0}")]
    InvalidPayload(String),

    /// Signing secret rejected by the MAC.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    /// No signing secret configured.
    #[error("signing secret not configured (set {0})")]
    MissingSecret(&'static str),

    /// The plan's daily run quota is used up.
    #[error("daily limit reached ({limit} runs per day)")]
    DailyLimitReached {
        /// Runs allowed per day on the active plan.
        limit: u32,
    },

    /// Export is not part of the active plan.
    #[error("export is not available on the {0} plan")]
    ExportNotAllowed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
