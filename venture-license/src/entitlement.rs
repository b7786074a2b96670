//! Plans, their limits, and the caller-side entitlement flow.

use crate::error::{LicenseError, LicenseResult};
use crate::payload::LicensePayload;
use crate::secret::SigningSecret;
use crate::verifier::{verify_at, LicenseStatus, Verification};
use serde::{Deserialize, Serialize};

/// A subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Baseline tier, also used for any unrecognized plan name.
    #[default]
    Free,
    /// Paid individual tier.
    Pro,
    /// Paid agency tier.
    Agency,
}

impl Plan {
    /// Maps a plan name to a tier. Unknown names map to [`Plan::Free`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "agency" => Self::Agency,
            "pro" => Self::Pro,
            _ => Self::Free,
        }
    }

    /// Returns the wire name of this plan.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Agency => "agency",
        }
    }

    /// Returns the limits for this plan.
    #[must_use]
    pub const fn limits(&self) -> Limits {
        match self {
            Self::Agency => Limits {
                max_runs_per_day: 200,
                max_ideas: 15,
                allow_export: true,
            },
            Self::Pro => Limits {
                max_runs_per_day: 20,
                max_ideas: 12,
                allow_export: true,
            },
            Self::Free => Limits {
                max_runs_per_day: 2,
                max_ideas: 5,
                allow_export: false,
            },
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage limits granted by a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limits {
    /// Generation runs allowed per UTC day.
    pub max_runs_per_day: u32,
    /// Upper bound on ideas generated in one run.
    pub max_ideas: u32,
    /// Whether results may be exported.
    pub allow_export: bool,
}

impl Limits {
    /// Smallest batch a run may request.
    pub const MIN_IDEAS: u32 = 3;

    /// Preferred batch size when the user has not chosen one.
    #[must_use]
    pub fn default_ideas(&self) -> u32 {
        self.max_ideas.min(10)
    }

    /// Clamps a requested batch size into `[MIN_IDEAS, max_ideas]`.
    #[must_use]
    pub fn clamp_ideas(&self, requested: u32) -> u32 {
        requested.max(Self::MIN_IDEAS).min(self.max_ideas)
    }

    /// Checks that export is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::ExportNotAllowed`] naming `plan` when it is not.
    pub fn ensure_export(&self, plan: Plan) -> LicenseResult<()> {
        if self.allow_export {
            Ok(())
        } else {
            Err(LicenseError::ExportNotAllowed(plan.as_str().to_string()))
        }
    }
}

/// Resolves a plan name to its limits. Total over all inputs.
#[must_use]
pub fn resolve(plan: &str) -> Limits {
    Plan::from_name(plan).limits()
}

/// The plan and limits a user is entitled to after presenting a token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entitlement {
    /// Active plan (free unless the token verified `ok`).
    pub plan: Plan,
    /// Verification status of the presented token.
    pub status: LicenseStatus,
    /// Limits of the active plan.
    pub limits: Limits,
    /// Authenticated payload, present for `ok` and `expired`.
    pub payload: Option<LicensePayload>,
}

impl Entitlement {
    /// Evaluates an optional user-supplied token at `now` (seconds since epoch).
    ///
    /// An absent or blank token is `missing` and skips verification entirely.
    /// Any status other than `ok` degrades to the free plan.
    #[must_use]
    pub fn evaluate(token: Option<&str>, secret: &SigningSecret, now: i64) -> Self {
        let verification = match token.map(str::trim) {
            Some(token) if !token.is_empty() => verify_at(token, secret, now),
            _ => Verification::Missing,
        };
        Self::from_verification(verification)
    }

    /// Evaluates a token against the system clock.
    #[must_use]
    pub fn evaluate_now(token: Option<&str>, secret: &SigningSecret) -> Self {
        Self::evaluate(token, secret, chrono::Utc::now().timestamp())
    }

    /// Derives the entitlement from a verification outcome.
    #[must_use]
    pub fn from_verification(verification: Verification) -> Self {
        let plan = match &verification {
            Verification::Valid(payload) => Plan::from_name(payload.plan_name()),
            _ => Plan::Free,
        };
        let (_, payload, status) = verification.into_parts();

        Self {
            plan,
            status,
            limits: plan.limits(),
            payload,
        }
    }

    /// One-line description of the active limits.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Runs/day: {}, max ideas/run: {}, Export: {}",
            self.limits.max_runs_per_day,
            self.limits.max_ideas,
            if self.limits.allow_export { "yes" } else { "no" }
        )
    }
}
