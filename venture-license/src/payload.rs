//! Decoded license claims.
//!
//! The payload is a JSON object with an optional `plan` and an optional
//! `exp` (seconds since epoch). Both are kept as the raw JSON values the
//! issuer wrote and only interpreted on demand. Any other members are kept
//! verbatim in [`LicensePayload::extra`] and re-emitted when the payload is
//! signed.

use crate::entitlement::Plan;
use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Member holding the plan name.
pub const PLAN_KEY: &str = "plan";

/// Member holding the expiration timestamp.
pub const EXP_KEY: &str = "exp";

/// The claims carried inside a license token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicensePayload {
    /// Plan claim. Anything but a known plan name resolves to the free tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    /// Expiration claim (seconds since epoch). A falsy value never expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<Value>,
    /// Members this crate does not interpret. Must not hold `plan` or `exp`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LicensePayload {
    /// Creates a non-expiring payload for the given plan.
    #[must_use]
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            plan: Some(Value::String(plan.into())),
            exp: None,
            extra: Map::new(),
        }
    }

    /// Builds a payload from a decoded JSON object.
    ///
    /// Duplicate members were already resolved by the JSON parser (last wins).
    #[must_use]
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            plan: map.remove(PLAN_KEY),
            exp: map.remove(EXP_KEY),
            extra: map,
        }
    }

    /// Sets the expiration timestamp.
    #[must_use]
    pub fn with_expiry(mut self, exp: i64) -> Self {
        self.exp = Some(Value::from(exp));
        self
    }

    /// Adds a member. `plan` and `exp` go to their claims, not to `extra`.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            PLAN_KEY => self.plan = Some(value),
            EXP_KEY => self.exp = Some(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    /// Returns the plan name, or the free plan's name if the claim is absent
    /// or not a string.
    #[must_use]
    pub fn plan_name(&self) -> &str {
        match &self.plan {
            Some(Value::String(name)) => name.as_str(),
            _ => Plan::Free.as_str(),
        }
    }

    /// Returns the effective expiration timestamp.
    ///
    /// A falsy claim (`null`, `false`, `0`, `0.0`, `""`, `[]`, `{}`) never
    /// expires. A truthy claim is converted to whole seconds: floats are
    /// truncated toward zero, `true` is `1`, numeric strings are parsed, and
    /// out-of-range values saturate.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPayload`] for a truthy claim that has
    /// no integer reading (a non-numeric string, a non-empty array or object).
    pub fn expires_at(&self) -> LicenseResult<Option<i64>> {
        let Some(exp) = self.exp.as_ref().filter(|exp| is_truthy(exp)) else {
            return Ok(None);
        };
        match exp {
            Value::Bool(_) => Ok(Some(1)),
            Value::Number(n) => Ok(Some(if let Some(i) = n.as_i64() {
                i
            } else if n.as_u64().is_some() {
                i64::MAX
            } else {
                // `as` saturates out-of-range floats
                n.as_f64().map_or(0, |f| f.trunc() as i64)
            })),
            Value::String(s) => s
                .trim()
                .parse::<i128>()
                .map(|i| Some(i.clamp(i64::MIN.into(), i64::MAX.into()) as i64))
                .map_err(|e| {
                    LicenseError::InvalidPayload(format!("exp `{s}` is not an integer: {e}"))
                }),
            other => Err(LicenseError::InvalidPayload(format!(
                "exp must be a number, got {other}"
            ))),
        }
    }

    /// Returns true if `now` (seconds since epoch) is past the expiration.
    ///
    /// # Errors
    ///
    /// Same as [`LicensePayload::expires_at`].
    pub fn is_expired_at(&self, now: i64) -> LicenseResult<bool> {
        Ok(self.expires_at()?.is_some_and(|exp| now > exp))
    }

    /// Checks that no reserved member is hiding in `extra`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidPayload`] naming the offending key.
    pub fn ensure_signable(&self) -> LicenseResult<()> {
        match [PLAN_KEY, EXP_KEY]
            .into_iter()
            .find(|key| self.extra.contains_key(*key))
        {
            Some(key) => Err(LicenseError::InvalidPayload(format!(
                "`{key}` must be set on the claim, not as an extra member"
            ))),
            None => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for LicensePayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}

/// JSON truthiness as the issuing side evaluates it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => !members.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LicensePayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn unknown_members_preserved() {
        let payload = parse(r#"{"plan":"pro","email":"a@b.c","seats":3}"#);
        assert_eq!(payload.plan_name(), "pro");
        assert_eq!(payload.extra["email"], "a@b.c");
        assert_eq!(payload.extra["seats"], 3);
        assert!(!payload.extra.contains_key(PLAN_KEY));
    }

    #[test]
    fn duplicate_members_last_wins() {
        let payload = parse(r#"{"plan":"pro","plan":"agency"}"#);
        assert_eq!(payload.plan_name(), "agency");
    }

    #[test]
    fn non_string_plan_reads_as_free() {
        assert_eq!(parse(r#"{"plan":5}"#).plan_name(), "free");
        assert_eq!(parse(r#"{"plan":null}"#).plan_name(), "free");
        assert_eq!(parse("{}").plan_name(), "free");
    }

    #[test]
    fn falsy_exp_never_expires() {
        for json in [
            r#"{"exp":null}"#,
            r#"{"exp":0}"#,
            r#"{"exp":0.0}"#,
            r#"{"exp":false}"#,
            r#"{"exp":""}"#,
            r#"{"exp":[]}"#,
            r#"{"exp":{}}"#,
        ] {
            let payload = parse(json);
            assert_eq!(payload.expires_at().unwrap(), None, "{json}");
            assert!(!payload.is_expired_at(i64::MAX).unwrap(), "{json}");
        }
    }

    #[test]
    fn fractional_exp_truthy_then_truncated() {
        assert_eq!(parse(r#"{"exp":0.5}"#).expires_at().unwrap(), Some(0));
        assert_eq!(parse(r#"{"exp":-0.5}"#).expires_at().unwrap(), Some(0));
        assert_eq!(parse(r#"{"exp":1700000000.9}"#).expires_at().unwrap(), Some(1_700_000_000));
    }

    #[test]
    fn out_of_range_exp_saturates() {
        assert_eq!(parse(r#"{"exp":1e20}"#).expires_at().unwrap(), Some(i64::MAX));
        assert_eq!(parse(r#"{"exp":-1e20}"#).expires_at().unwrap(), Some(i64::MIN));
        assert_eq!(
            parse(r#"{"exp":18446744073709551615}"#).expires_at().unwrap(),
            Some(i64::MAX)
        );
    }

    #[test]
    fn bool_and_string_exp() {
        assert_eq!(parse(r#"{"exp":true}"#).expires_at().unwrap(), Some(1));
        assert_eq!(parse(r#"{"exp":" 42 "}"#).expires_at().unwrap(), Some(42));
        assert!(parse(r#"{"exp":"soon"}"#).expires_at().is_err());
        assert!(parse(r#"{"exp":[1]}"#).expires_at().is_err());
    }

    #[test]
    fn with_field_routes_reserved_keys() {
        let payload = LicensePayload::new("pro")
            .with_field("plan", "agency")
            .with_field("exp", 5);
        assert_eq!(payload.plan_name(), "agency");
        assert_eq!(payload.expires_at().unwrap(), Some(5));
        assert!(payload.extra.is_empty());
        assert!(payload.ensure_signable().is_ok());
    }

    #[test]
    fn reserved_key_in_extra_not_signable() {
        let mut payload = LicensePayload::new("pro");
        payload.extra.insert("plan".into(), "agency".into());
        let err = payload.ensure_signable().unwrap_err();
        assert!(matches!(err, LicenseError::InvalidPayload(ref msg) if msg.contains("plan")));
    }
}
