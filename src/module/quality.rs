//! Post-run artifact quality checks
//!
//! A module may carry checks that inspect its artifact after a successful
//! run. Each check reports how many items it looked at and how many broke
//! the rule; the check's [`FailurePolicy`] decides whether that many
//! failures rejects the artifact. A rejected artifact is never cached.

use std::fmt;
use std::sync::Arc;

/// Outcome of one check against one artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Items the check examined
    pub checked: u64,
    /// Items that broke the rule
    pub failed: u64,
}

impl CheckReport {
    pub fn new(checked: u64, failed: u64) -> Self {
        Self { checked, failed }
    }

    /// Single pass/fail verdict as a report over one item
    pub fn from_bool(passed: bool) -> Self {
        Self {
            checked: 1,
            failed: u64::from(!passed),
        }
    }
}

/// How many rule failures a check tolerates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FailurePolicy {
    /// Never reject; failures are only logged
    FailNone,
    /// Reject on the first failed item
    FailAny,
    /// Reject once at least this many items failed
    FailCount(u64),
    /// Reject once the failed share of checked items reaches this fraction
    FailPercent(f64),
}

impl FailurePolicy {
    /// True if `report` breaches the policy
    pub fn rejects(&self, report: &CheckReport) -> bool {
        match *self {
            FailurePolicy::FailNone => false,
            FailurePolicy::FailAny => report.failed > 0,
            FailurePolicy::FailCount(threshold) => report.failed >= threshold,
            FailurePolicy::FailPercent(threshold) => {
                report.checked > 0 && (report.failed as f64 / report.checked as f64) >= threshold
            }
        }
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::FailNone
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailNone => write!(f, "FailNone"),
            FailurePolicy::FailAny => write!(f, "FailAny"),
            FailurePolicy::FailCount(n) => write!(f, "FailCount({})", n),
            FailurePolicy::FailPercent(p) => write!(f, "FailPercent({})", p),
        }
    }
}

type CheckFn<A> = dyn Fn(&A) -> anyhow::Result<CheckReport> + Send + Sync;

/// A named rule run against a module's artifact
pub struct ArtifactCheck<A> {
    name: String,
    policy: FailurePolicy,
    rule: Arc<CheckFn<A>>,
}

impl<A> ArtifactCheck<A> {
    pub fn new<F>(name: impl Into<String>, policy: FailurePolicy, rule: F) -> Self
    where
        F: Fn(&A) -> anyhow::Result<CheckReport> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            policy,
            rule: Arc::new(rule),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run the rule against `artifact`
    pub fn inspect(&self, artifact: &A) -> anyhow::Result<CheckReport> {
        (self.rule)(artifact)
    }
}

impl<A> Clone for ArtifactCheck<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            policy: self.policy,
            rule: Arc::clone(&self.rule),
        }
    }
}

impl<A> fmt::Debug for ArtifactCheck<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactCheck")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
