//! Post-hoc quality gate for finished articles.
//!
//! Eight independent structural checks, each contributing a fixed weight to a
//! 0-100 aggregate score. The verdict is data, never an error: a failing
//! error-severity check is surfaced as a blocker that vetoes publication
//! regardless of the aggregate, warnings are advisory.

pub(crate) mod analysis;
mod article;
mod checks;
mod gate;
mod report;

pub use article::{Article, ArticleMeta};
pub use gate::{QualityConfig, QualityGate, QualityWeights};
pub use report::{CheckResult, QualityReport, Severity};
