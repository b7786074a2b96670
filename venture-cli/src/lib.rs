//! Shared types and command logic for the license tool.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use venture_license::{
    sign, Entitlement, LicensePayload, LicenseStatus, Limits, Plan, SigningSecret,
};

/// JSON report printed by `verify`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VerifyReport {
    pub valid: bool,
    pub status: LicenseStatus,
    pub plan: Plan,
    pub payload: Option<LicensePayload>,
    pub limits: Limits,
}

impl From<Entitlement> for VerifyReport {
    fn from(ent: Entitlement) -> Self {
        Self {
            valid: ent.status == LicenseStatus::Ok,
            status: ent.status,
            plan: ent.plan,
            payload: ent.payload,
            limits: ent.limits,
        }
    }
}

/// Parses a `key=value` pair. Values that parse as JSON keep their type,
/// anything else is stored as a string.
pub fn parse_field(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("field `{raw}` must look like key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("field `{raw}` has an empty key");
    }
    if key == "plan" || key == "exp" {
        bail!("use --plan/--exp instead of --field {key}=...");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Builds and signs a payload.
pub fn issue_token(
    plan: &str,
    exp: Option<i64>,
    fields: Vec<(String, Value)>,
    secret: &SigningSecret,
) -> Result<String> {
    let mut payload = LicensePayload::new(plan);
    if let Some(exp) = exp {
        payload = payload.with_expiry(exp);
    }
    for (key, value) in fields {
        payload = payload.with_field(key, value);
    }
    if Plan::from_name(plan).as_str() != plan {
        tracing::warn!(plan, "unknown plan, token will resolve to the free tier");
    }
    sign(&payload, secret).context("Failed to sign license payload")
}

/// Verifies a token and reports the resulting entitlement.
pub fn verify_report(token: &str, secret: &SigningSecret, now: i64) -> VerifyReport {
    Entitlement::evaluate(Some(token), secret, now).into()
}

/// Resolves an absolute expiry from `--exp` or `--expires-in`.
pub fn resolve_expiry(exp: Option<i64>, expires_in: Option<i64>, now: i64) -> Result<Option<i64>> {
    match (exp, expires_in) {
        (Some(_), Some(_)) => bail!("--exp and --expires-in are mutually exclusive"),
        (Some(exp), None) => Ok(Some(exp)),
        (None, Some(secs)) => now
            .checked_add(secs)
            .map(Some)
            .context("--expires-in overflows the timestamp range"),
        (None, None) => Ok(None),
    }
}
