//! The uniform issue/result/report model (spec §3).
//!
//! Every category runner and the security sub-orchestrator ultimately produce
//! [`Issue`] values; the [`Orchestrator`](crate::orchestrator::Orchestrator)
//! assembles them into an [`AssessmentReport`]. None of these types know how
//! to render themselves — rendering is a collaborator's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Ordered severity. Declaration order is the ranking order: `Info < Low <
/// Medium < High < Critical`. Threshold comparisons ("fail on severity >=
/// T") rely on the derived `Ord` impl, never on string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Default remediation-time estimate used by the workflow planner when an
    /// issue carries no `estimated_time` of its own (spec §4.3 step 8).
    pub fn default_estimate(self) -> Duration {
        match self {
            Severity::Critical => Duration::from_secs(30 * 60),
            Severity::High => Duration::from_secs(15 * 60),
            Severity::Medium => Duration::from_secs(5 * 60),
            Severity::Low => Duration::from_secs(2 * 60),
            Severity::Info => Duration::from_secs(60),
        }
    }

    /// Penalty applied to `overall_health` per issue of this severity
    /// (spec §4.3 step 9).
    pub fn health_penalty(self) -> f64 {
        match self {
            Severity::Critical => 0.10,
            Severity::High => 0.05,
            Severity::Medium => 0.02,
            Severity::Low => 0.01,
            Severity::Info => 0.0,
        }
    }
}

/// The closed category tag set (spec §3). Unknown categories are rejected by
/// the [`Registry`](crate::registry::Registry), not by this type — `Category`
/// itself is exhaustive, so "unknown" manifests as a parse error on the
/// string form, not as a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Format,
    Lint,
    Security,
    StaticAnalysis,
    Performance,
    Dependencies,
    Dates,
    Maturity,
    RepoStatus,
    Tools,
    Schema,
    Typecheck,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Format,
        Category::Lint,
        Category::Security,
        Category::StaticAnalysis,
        Category::Performance,
        Category::Dependencies,
        Category::Dates,
        Category::Maturity,
        Category::RepoStatus,
        Category::Tools,
        Category::Schema,
        Category::Typecheck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Format => "format",
            Category::Lint => "lint",
            Category::Security => "security",
            Category::StaticAnalysis => "static-analysis",
            Category::Performance => "performance",
            Category::Dependencies => "dependencies",
            Category::Dates => "dates",
            Category::Maturity => "maturity",
            Category::RepoStatus => "repo-status",
            Category::Tools => "tools",
            Category::Schema => "schema",
            Category::Typecheck => "typecheck",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name one of the closed set of
/// categories. Registries and the priority-string parser both surface this.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "format" => Ok(Category::Format),
            "lint" => Ok(Category::Lint),
            "security" => Ok(Category::Security),
            "static-analysis" => Ok(Category::StaticAnalysis),
            "performance" => Ok(Category::Performance),
            "dependencies" => Ok(Category::Dependencies),
            "dates" => Ok(Category::Dates),
            "maturity" => Ok(Category::Maturity),
            "repo-status" => Ok(Category::RepoStatus),
            "tools" => Ok(Category::Tools),
            "schema" => Ok(Category::Schema),
            "typecheck" => Ok(Category::Typecheck),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// A single finding, produced by a runner (or promoted from the security
/// sub-orchestrator). `change_related` and `lines_modified` are populated
/// only by the orchestrator (spec §3 invariant) — runners always leave them
/// at their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
    pub category: Category,
    pub sub_category: String,
    pub auto_fixable: bool,
    pub estimated_time: Option<Duration>,
    #[serde(default)]
    pub change_related: bool,
    #[serde(default)]
    pub lines_modified: Vec<usize>,
}

impl Issue {
    pub fn new(category: Category, severity: Severity, file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: 0,
            column: 0,
            severity,
            message: message.into(),
            category,
            sub_category: String::new(),
            auto_fixable: false,
            estimated_time: None,
            change_related: false,
            lines_modified: Vec::new(),
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = sub_category.into();
        self
    }

    pub fn auto_fixable(mut self, value: bool) -> Self {
        self.auto_fixable = value;
        self
    }

    /// The estimate the workflow planner should use: the issue's own, or the
    /// severity default (spec §4.3 step 8 / §4.7).
    pub fn effective_estimate(&self) -> Duration {
        self.estimated_time.unwrap_or_else(|| self.severity.default_estimate())
    }
}

/// A suppression extracted from a source comment, or synthesized by a policy
/// promotion (spec §3, §4.6). `tool` and `file` are required; a missing
/// `reason` is itself a legitimate finding, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suppression {
    pub tool: String,
    pub rule_id: Option<String>,
    pub file: PathBuf,
    pub line: usize,
    pub column: Option<usize>,
    pub syntax: String,
    pub reason: Option<String>,
    pub severity: Option<Severity>,
    pub age_days: Option<u64>,
    pub author: Option<String>,
    pub commit: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Mode a runner is invoked in (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Check,
    Fix,
    NoOp,
}

/// Inputs to a single `RunAssessment` call (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    pub priority_string: Option<String>,
    pub selected_categories: Option<Vec<Category>>,
    pub include_files: Vec<String>,
    pub exclude_files: Vec<String>,
    pub force_include: Vec<String>,
    pub mode: Mode,
    /// Zero means "no timeout".
    pub timeout: Duration,
    /// `0` means "derive from `concurrency_percent`".
    pub concurrency: usize,
    pub concurrency_percent: u8,
    pub fail_on_severity: Severity,
    pub track_suppressions: bool,
    pub extended: bool,
    pub no_ignore: bool,
    /// Catch-all for tool-specific knobs the core does not interpret itself
    /// (per-tool timeouts, dimension filters, noise-filter patterns, ...).
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            priority_string: None,
            selected_categories: None,
            include_files: Vec::new(),
            exclude_files: Vec::new(),
            force_include: Vec::new(),
            mode: Mode::Check,
            timeout: Duration::ZERO,
            concurrency: 0,
            concurrency_percent: 50,
            fail_on_severity: Severity::High,
            track_suppressions: false,
            extended: false,
            no_ignore: false,
            extra: HashMap::new(),
        }
    }
}

/// What a runner hands back to the orchestrator (spec §3).
///
/// `success=true` means the runner completed its work (issues may still be
/// non-empty). `success=false, error=""` is "skipped"; `success=false,
/// error != ""` is "errored". See [`crate::orchestrator`] for the status
/// mapping that normalizes these encodings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub command_name: String,
    pub category: Category,
    pub success: bool,
    pub execution_time: Duration,
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub metrics: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub error: String,
}

impl AssessmentResult {
    pub fn success(category: Category, command_name: impl Into<String>, issues: Vec<Issue>) -> Self {
        Self {
            command_name: command_name.into(),
            category,
            success: true,
            execution_time: Duration::ZERO,
            issues,
            metrics: HashMap::new(),
            error: String::new(),
        }
    }

    pub fn skipped(category: Category, command_name: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut metrics = HashMap::new();
        metrics.insert("status".to_string(), serde_json::json!("skipped"));
        metrics.insert("reason".to_string(), serde_json::json!(reason.into()));
        Self {
            command_name: command_name.into(),
            category,
            success: true,
            execution_time: Duration::ZERO,
            issues: Vec::new(),
            metrics,
            error: String::new(),
        }
    }

    pub fn errored(category: Category, command_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            category,
            success: false,
            execution_time: Duration::ZERO,
            issues: Vec::new(),
            metrics: HashMap::new(),
            error: error.into(),
        }
    }

    /// Extract and remove the private `_suppressions` metric, if present
    /// (spec §4.3 step 6).
    pub fn take_suppressions(&mut self) -> Option<Vec<Suppression>> {
        let value = self.metrics.remove("_suppressions")?;
        serde_json::from_value(value).ok()
    }
}

/// Status a [`CategoryResult`] is normalized to (spec §4.3 step 5, §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Success,
    Skipped,
    Error,
}

/// A suppression report attached to a category result once
/// `_suppressions` has been promoted (spec §4.3 step 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionReport {
    pub suppressions: Vec<Suppression>,
    pub summary: crate::suppression::SuppressionSummary,
}

/// Orchestrator-assembled per-category result (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub priority: i32,
    pub parallelizable: bool,
    pub status: CategoryStatus,
    pub issues: Vec<Issue>,
    pub issue_count: usize,
    pub estimated_time: Duration,
    pub metrics: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppression_report: Option<SuppressionReport>,
}

/// Scope a change-context collaborator reported the modified set against
/// (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeScope {
    Wip,
    Staged,
    Branch,
    Commit,
}

/// Working-tree change set used to annotate issues as change-related
/// (spec §3, §6). Produced by an external collaborator; the core tolerates
/// its absence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeContext {
    pub modified_files: Vec<PathBuf>,
    pub modified_lines: HashMap<PathBuf, Vec<usize>>,
    pub total_changes: usize,
    pub change_scope: ChangeScope,
    pub git_sha: Option<String>,
    pub branch: Option<String>,
}

/// One bucket of same-priority-file issues the workflow planner groups
/// together for parallel remediation (spec §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelGroup {
    pub file: PathBuf,
    pub issue_count: usize,
}

/// One priority-ordered bucket of categories (spec §4.3 step 8, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub priority: i32,
    pub categories: Vec<Category>,
    pub description: String,
    pub estimated_time: Duration,
    pub parallel_groups: Vec<ParallelGroup>,
}

/// The assembled workflow (spec §3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowPlan {
    pub phases: Vec<Phase>,
    pub total_time: Duration,
}

impl WorkflowPlan {
    pub fn parallel_group_count(&self) -> usize {
        self.phases.iter().map(|p| p.parallel_groups.len()).sum()
    }
}

/// Top-level health/count rollup (spec §3, §4.3 step 9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub overall_health: f64,
    pub critical_issues: usize,
    pub total_issues: usize,
    pub estimated_time: Duration,
    pub parallel_groups: usize,
    pub categories_with_issues: usize,
}

/// Metadata carried alongside the report (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tool_name: String,
    pub version: String,
    pub target: PathBuf,
    pub execution_time: Duration,
    pub commands_run: Vec<String>,
    pub fail_on: Severity,
    pub change_context: Option<ChangeContext>,
}

/// Extended discovery info, populated only when `AssessmentConfig.extended`
/// is set (spec §3: "workplan? (extended discovery info)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPlan {
    pub ordered_categories: Vec<Category>,
    pub available_categories: Vec<Category>,
}

/// The fully assembled report (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub metadata: ReportMetadata,
    pub summary: Summary,
    pub categories: HashMap<String, CategoryResult>,
    pub workflow: WorkflowPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workplan: Option<WorkPlan>,
}

impl AssessmentReport {
    /// Whether any issue meets or exceeds `metadata.fail_on` (spec §6, §8).
    pub fn should_fail(&self) -> bool {
        let threshold = self.metadata.fail_on;
        self.categories
            .values()
            .flat_map(|c| c.issues.iter())
            .any(|i| i.severity >= threshold)
    }
}
