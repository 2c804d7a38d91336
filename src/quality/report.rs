//! Quality verdict types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Failing at this severity vetoes publication outright.
    Error,
    /// Advisory; publication may proceed.
    Warning,
    Info,
}

/// One named structural evaluation of a finished article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Always within [0, 100].
    pub score: f64,
    pub message: String,
    pub severity: Severity,
}

impl CheckResult {
    pub(crate) fn pass(name: &'static str, score: f64, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            score: score.clamp(0.0, 100.0),
            message: message.into(),
            severity: Severity::Info,
        }
    }

    pub(crate) fn pass_with_warning(
        name: &'static str,
        score: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::pass(name, score, message)
        }
    }

    pub(crate) fn fail(
        name: &'static str,
        score: f64,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            score: score.clamp(0.0, 100.0),
            message: message.into(),
            severity,
        }
    }

    /// A failing error-severity check vetoes publication regardless of the
    /// aggregate score.
    pub fn is_blocker(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }
}

/// Aggregate verdict for one article.
///
/// Returned as data in every case; a bad article is a normal negative
/// verdict, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// Weighted average of all check scores, in [0, 100].
    pub score: f64,
    /// Whether the weighted score met the configured threshold.
    pub passed: bool,
    pub threshold: f64,
    pub checks: Vec<CheckResult>,
}

impl QualityReport {
    pub fn blockers(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.is_blocker())
    }

    pub fn has_blockers(&self) -> bool {
        self.checks.iter().any(CheckResult::is_blocker)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| c.severity == Severity::Warning)
    }

    /// Threshold met and no blocker present.
    pub fn is_publishable(&self) -> bool {
        self.passed && !self.has_blockers()
    }
}
