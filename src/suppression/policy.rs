//! Policy evaluation over aggregated suppressions (spec §4.6).
//!
//! Evaluation is pure: a [`SecurityPolicy`] plus a slice of [`Suppression`]
//! values produces [`PolicyViolation`]s with no I/O. Enrichment that needs
//! I/O (e.g. git blame to backfill `age_days`/`author`) is an optional
//! pre-step a caller runs before invoking `evaluate`.

use crate::core::types::{Severity, Suppression};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-repo suppression policy (spec §4.6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// A suppression older than this is a violation. `None` disables the check.
    pub max_age_days: Option<u64>,
    /// Severities for which a missing `reason` is a violation.
    #[serde(default)]
    pub require_reason_severities: HashSet<Severity>,
    /// Rule IDs that require an explicit `metadata["approved_by"]` entry.
    #[serde(default)]
    pub require_approval_rules: HashSet<String>,
    /// Regex-free substring patterns; a suppression whose `syntax` contains
    /// one is always a violation (e.g. a blanket `# nosec` with no rule id).
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
}

/// The reason a single suppression violated policy (spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    TooOld { age_days: u64, max_age_days: u64 },
    MissingReason,
    MissingApproval { rule_id: String },
    BlockedPattern { pattern: String },
}

/// One policy violation, tied back to the offending suppression's location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyViolation {
    pub tool: String,
    pub file: std::path::PathBuf,
    pub line: usize,
    pub rule_id: Option<String>,
    pub kind: ViolationKind,
}

impl SecurityPolicy {
    /// Produce every violation in `suppressions` against this policy
    /// (spec §4.6). Pure: no I/O, deterministic ordering (input order).
    pub fn evaluate(&self, suppressions: &[Suppression]) -> Vec<PolicyViolation> {
        let mut violations = Vec::new();

        for suppression in suppressions {
            if let Some(max_age) = self.max_age_days {
                if let Some(age) = suppression.age_days {
                    if age > max_age {
                        violations.push(self.violation(
                            suppression,
                            ViolationKind::TooOld {
                                age_days: age,
                                max_age_days: max_age,
                            },
                        ));
                    }
                }
            }

            let severity_requires_reason = suppression
                .severity
                .is_some_and(|s| self.require_reason_severities.contains(&s));
            if severity_requires_reason && suppression.reason.is_none() {
                violations.push(self.violation(suppression, ViolationKind::MissingReason));
            }

            if let Some(rule_id) = &suppression.rule_id {
                if self.require_approval_rules.contains(rule_id)
                    && !suppression.metadata.contains_key("approved_by")
                {
                    violations.push(self.violation(
                        suppression,
                        ViolationKind::MissingApproval {
                            rule_id: rule_id.clone(),
                        },
                    ));
                }
            }

            for pattern in &self.blocked_patterns {
                if suppression.syntax.contains(pattern.as_str()) {
                    violations.push(self.violation(
                        suppression,
                        ViolationKind::BlockedPattern {
                            pattern: pattern.clone(),
                        },
                    ));
                }
            }
        }

        violations
    }

    fn violation(&self, suppression: &Suppression, kind: ViolationKind) -> PolicyViolation {
        PolicyViolation {
            tool: suppression.tool.clone(),
            file: suppression.file.clone(),
            line: suppression.line,
            rule_id: suppression.rule_id.clone(),
            kind,
        }
    }
}
