//! Daily run quota.
//!
//! The ledger only counts; the quota itself comes from [`Limits`]. Counts are
//! in-memory and keyed by UTC day, so a new day starts from zero.

use crate::entitlement::Limits;
use crate::error::{LicenseError, LicenseResult};
use chrono::NaiveDate;

/// Records generation runs per day.
pub trait UsageLedger {
    /// Returns the number of runs recorded on `day`.
    fn runs_on(&self, day: NaiveDate) -> u32;

    /// Records one run on `day`.
    fn record_run(&mut self, day: NaiveDate);
}

/// In-memory ledger tracking a single day.
///
/// Recording a run on a later day discards the previous day's count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyUsage {
    day: Option<NaiveDate>,
    count: u32,
}

impl DailyUsage {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the day currently being counted.
    #[must_use]
    pub fn day(&self) -> Option<NaiveDate> {
        self.day
    }
}

impl UsageLedger for DailyUsage {
    fn runs_on(&self, day: NaiveDate) -> u32 {
        if self.day == Some(day) { self.count } else { 0 }
    }

    fn record_run(&mut self, day: NaiveDate) {
        if self.day != Some(day) {
            self.day = Some(day);
            self.count = 0;
        }
        self.count = self.count.saturating_add(1);
    }
}

/// Enforces [`Limits::max_runs_per_day`] against a ledger.
pub struct RunGate;

impl RunGate {
    /// Checks that another run is allowed on `day`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::DailyLimitReached`] once the quota is used up.
    pub fn check(ledger: &impl UsageLedger, limits: &Limits, day: NaiveDate) -> LicenseResult<()> {
        if ledger.runs_on(day) >= limits.max_runs_per_day {
            return Err(LicenseError::DailyLimitReached {
                limit: limits.max_runs_per_day,
            });
        }
        Ok(())
    }

    /// Checks the quota and records the run if allowed, returning the runs left.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::DailyLimitReached`] without recording if the
    /// quota is used up.
    pub fn admit(
        ledger: &mut impl UsageLedger,
        limits: &Limits,
        day: NaiveDate,
    ) -> LicenseResult<u32> {
        Self::check(&*ledger, limits, day)?;
        ledger.record_run(day);
        let used = ledger.runs_on(day);
        tracing::debug!(%day, used, limit = limits.max_runs_per_day, "run admitted");
        Ok(limits.max_runs_per_day.saturating_sub(used))
    }

    /// Returns today's date in UTC.
    #[must_use]
    pub fn today() -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}
