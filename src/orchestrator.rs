//! The top-level orchestrator: sequencing, worker pool, timeouts,
//! summary, and report assembly (spec §4.3).

use crate::change_context;
use crate::core::traits::{CancellationToken, ChangeCollaborator, Runner};
use crate::core::types::{
    AssessmentConfig, AssessmentReport, Category, CategoryResult, CategoryStatus, ReportMetadata,
    Summary, SuppressionReport, WorkPlan,
};
use crate::errors::ConfigError;
use crate::pool::{resolve_worker_count, run_bounded};
use crate::priority::PriorityManager;
use crate::registry::Registry;
use crate::suppression::generate_summary;
use crate::workflow::{self, CategoryContribution};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub const TOOL_NAME: &str = "assesscore";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Orchestrator {
    registry: Arc<Registry>,
    change_collaborator: Option<Arc<dyn ChangeCollaborator>>,
}

impl Orchestrator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry, change_collaborator: None }
    }

    pub fn with_change_collaborator(mut self, collaborator: Arc<dyn ChangeCollaborator>) -> Self {
        self.change_collaborator = Some(collaborator);
        self
    }

    /// `RunAssessment` (spec §4.3). The only error this can return is a
    /// fatal [`ConfigError`] from an invalid priority string (spec §7);
    /// every other failure is recorded inside the returned report.
    pub fn run_assessment(&self, target: &Path, config: &AssessmentConfig) -> Result<AssessmentReport, ConfigError> {
        let overall_start = Instant::now();

        // Step 1: change context collection (best-effort, non-fatal).
        let change_context = self.change_collaborator.as_ref().and_then(|c| c.collect(target));

        // Step 2: priority resolution.
        let priority_manager = match &config.priority_string {
            Some(raw) => PriorityManager::parse(raw)?,
            None => PriorityManager::new(),
        };
        let available = self.registry.available(target);
        let selected: Vec<Category> = match &config.selected_categories {
            Some(wanted) => available.iter().copied().filter(|c| wanted.contains(c)).collect(),
            None => available.clone(),
        };
        let ordered_categories = priority_manager.ordered(&selected);
        log::debug!("ordered categories for {}: {:?}", target.display(), ordered_categories);

        // Step 3: worker-pool sizing.
        let worker_count = resolve_worker_count(config.concurrency, config.concurrency_percent);
        log::info!(
            "assessing {} with {} categories across {} worker(s)",
            target.display(),
            ordered_categories.len(),
            worker_count
        );

        // Step 4/5/6: execution, status mapping, suppression promotion.
        struct Job {
            category: Category,
            runner: Arc<dyn Runner>,
            priority: i32,
        }
        let jobs: Vec<Job> = ordered_categories
            .iter()
            .filter_map(|category| {
                self.registry.get(*category).map(|runner| Job {
                    category: *category,
                    runner,
                    priority: priority_manager.priority_of(*category),
                })
            })
            .collect();

        let mut commands_run = Vec::new();
        for job in &jobs {
            commands_run.push(job.category.as_str().to_string());
        }

        let executed: Vec<(Category, i32, bool, CategoryResult)> = run_bounded(jobs, worker_count, |job| {
            let span = tracing::debug_span!("category_job", category = job.category.as_str());
            let _entered = span.enter();

            let (token, _watcher) = CancellationToken::with_timeout(config.timeout);
            let started = Instant::now();

            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                job.runner.assess(&token, target, config)
            }));

            let parallelizable = job.runner.can_run_in_parallel();

            let mut category_result = match outcome {
                Ok(Ok(mut result)) => {
                    let status = if result.success {
                        CategoryStatus::Success
                    } else if result.error.is_empty() {
                        CategoryStatus::Skipped
                    } else {
                        CategoryStatus::Error
                    };
                    let suppression_report = if config.track_suppressions {
                        result.take_suppressions().map(|suppressions| SuppressionReport {
                            summary: generate_summary(&suppressions),
                            suppressions,
                        })
                    } else {
                        result.metrics.remove("_suppressions");
                        None
                    };
                    CategoryResult {
                        category: job.category,
                        priority: job.priority,
                        parallelizable,
                        status,
                        issue_count: result.issues.len(),
                        issues: result.issues,
                        estimated_time: if result.execution_time.is_zero() {
                            started.elapsed()
                        } else {
                            result.execution_time
                        },
                        metrics: result.metrics,
                        error: if result.error.is_empty() { None } else { Some(result.error) },
                        suppression_report,
                    }
                }
                Ok(Err(err)) => {
                    log::warn!("{} runner failed: {err}", job.category.as_str());
                    CategoryResult {
                        category: job.category,
                        priority: job.priority,
                        parallelizable,
                        status: CategoryStatus::Error,
                        issues: Vec::new(),
                        issue_count: 0,
                        estimated_time: started.elapsed(),
                        metrics: HashMap::new(),
                        error: Some(err.to_string()),
                        suppression_report: None,
                    }
                }
                Err(panic) => {
                    let message = crate::observability::take_last_panic_message()
                        .unwrap_or_else(|| "runner thread panicked".to_string());
                    let _ = panic;
                    log::error!("{} runner panicked: {message}", job.category.as_str());
                    CategoryResult {
                        category: job.category,
                        priority: job.priority,
                        parallelizable,
                        status: CategoryStatus::Error,
                        issues: Vec::new(),
                        issue_count: 0,
                        estimated_time: started.elapsed(),
                        metrics: HashMap::new(),
                        error: Some(message),
                        suppression_report: None,
                    }
                }
            };

            if category_result.status == CategoryStatus::Success {
                if let Some(change) = &change_context {
                    change_context::annotate(&mut category_result.issues, target, change);
                    category_result.issue_count = category_result.issues.len();
                }
            }

            (job.category, job.priority, job.runner.can_run_in_parallel(), category_result)
        });

        // Step 8: workflow planning.
        let contributions: Vec<CategoryContribution<'_>> = executed
            .iter()
            .map(|(category, priority, _parallel, result)| CategoryContribution {
                category: *category,
                priority: *priority,
                status: result.status,
                issues: &result.issues,
            })
            .collect();
        let workflow_plan = workflow::plan(&contributions);

        // Step 9: summary.
        let mut categories: HashMap<String, CategoryResult> = HashMap::new();
        let mut total_issues = 0usize;
        let mut critical_issues = 0usize;
        let mut overall_health = 1.0f64;
        let mut categories_with_issues = 0usize;

        for (category, _priority, _parallel, result) in executed {
            total_issues += result.issue_count;
            for issue in &result.issues {
                overall_health -= issue.severity.health_penalty();
                if issue.severity == crate::core::types::Severity::Critical {
                    critical_issues += 1;
                }
            }
            if result.issue_count > 0 {
                categories_with_issues += 1;
            }
            categories.insert(category.as_str().to_string(), result);
        }
        let overall_health = overall_health.max(0.0);

        let summary = Summary {
            overall_health,
            critical_issues,
            total_issues,
            estimated_time: workflow_plan.total_time,
            parallel_groups: workflow_plan.parallel_group_count(),
            categories_with_issues,
        };

        let metadata = ReportMetadata {
            tool_name: TOOL_NAME.to_string(),
            version: TOOL_VERSION.to_string(),
            target: target.to_path_buf(),
            execution_time: overall_start.elapsed(),
            commands_run,
            fail_on: config.fail_on_severity,
            change_context,
        };

        let workplan = config.extended.then(|| WorkPlan {
            ordered_categories: ordered_categories.clone(),
            available_categories: available,
        });

        log::info!(
            "assessment of {} complete: {} issue(s), health {:.2}, {:?} elapsed",
            target.display(),
            summary.total_issues,
            summary.overall_health,
            overall_start.elapsed()
        );

        Ok(AssessmentReport { metadata, summary, categories, workflow: workflow_plan, workplan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AssessmentResult, Issue, Mode, Severity};
    use std::time::Duration;

    struct FixedRunner {
        category: Category,
        issues: Vec<Issue>,
        delay: Duration,
    }

    impl Runner for FixedRunner {
        fn assess(
            &self,
            _cancel: &CancellationToken,
            _target: &Path,
            _config: &AssessmentConfig,
        ) -> Result<AssessmentResult, crate::errors::CoreError> {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            Ok(AssessmentResult::success(self.category, self.category.as_str(), self.issues.clone()))
        }
        fn category(&self) -> Category {
            self.category
        }
        fn estimated_time(&self, _target: &Path) -> Duration {
            Duration::ZERO
        }
        fn is_available(&self, _target: &Path) -> bool {
            true
        }
    }

    struct SlowRunner {
        category: Category,
        delay: Duration,
    }

    impl Runner for SlowRunner {
        fn assess(
            &self,
            cancel: &CancellationToken,
            _target: &Path,
            _config: &AssessmentConfig,
        ) -> Result<AssessmentResult, crate::errors::CoreError> {
            let waited = Instant::now();
            while waited.elapsed() < self.delay {
                if cancel.is_cancelled() {
                    return Err(crate::errors::CoreError::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(5));
            }
            Ok(AssessmentResult::success(self.category, self.category.as_str(), Vec::new()))
        }
        fn category(&self) -> Category {
            self.category
        }
        fn estimated_time(&self, _target: &Path) -> Duration {
            Duration::ZERO
        }
        fn is_available(&self, _target: &Path) -> bool {
            true
        }
    }

    fn issue(category: Category, severity: Severity, file: &str) -> Issue {
        Issue::new(category, severity, file, "m")
    }

    #[test]
    fn priority_swap_reorders_phases() {
        let mut registry = Registry::new();
        registry.register(Arc::new(FixedRunner {
            category: Category::Format,
            issues: vec![issue(Category::Format, Severity::Low, "a.rs")],
            delay: Duration::ZERO,
        }));
        registry.register(Arc::new(FixedRunner {
            category: Category::Lint,
            issues: vec![issue(Category::Lint, Severity::Low, "b.rs")],
            delay: Duration::ZERO,
        }));

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let mut config = AssessmentConfig::default();
        config.priority_string = Some("lint=1,format=2".to_string());
        config.mode = Mode::Check;

        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();
        assert_eq!(report.workflow.phases[0].priority, 1);
        assert_eq!(report.workflow.phases[0].categories, vec![Category::Lint]);
        assert_eq!(report.workflow.phases[1].priority, 2);
        assert_eq!(report.workflow.phases[1].categories, vec![Category::Format]);
    }

    #[test]
    fn timeout_manifests_as_error_status() {
        let mut registry = Registry::new();
        registry.register(Arc::new(SlowRunner { category: Category::Security, delay: Duration::from_millis(200) }));

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let mut config = AssessmentConfig::default();
        config.timeout = Duration::from_millis(50);
        config.concurrency = 1;

        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();
        assert_eq!(report.categories["security"].status, CategoryStatus::Error);
    }

    #[test]
    fn selected_categories_filters_the_set() {
        let mut registry = Registry::new();
        registry.register(Arc::new(FixedRunner { category: Category::Format, issues: vec![], delay: Duration::ZERO }));
        registry.register(Arc::new(FixedRunner { category: Category::Lint, issues: vec![], delay: Duration::ZERO }));

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let mut config = AssessmentConfig::default();
        config.selected_categories = Some(vec![Category::Lint]);

        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();
        assert_eq!(report.categories.len(), 1);
        assert!(report.categories.contains_key("lint"));
    }

    #[test]
    fn health_calculation_matches_spec_example() {
        let mut registry = Registry::new();
        registry.register(Arc::new(FixedRunner {
            category: Category::Security,
            issues: vec![
                issue(Category::Security, Severity::High, "a.go"),
                issue(Category::Security, Severity::Critical, "b.go"),
            ],
            delay: Duration::ZERO,
        }));

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let config = AssessmentConfig::default();
        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();
        assert!(report.summary.overall_health >= 0.85 && report.summary.overall_health <= 0.86);
    }

    #[test]
    fn no_issues_yields_full_health() {
        let registry = Registry::new();
        let orchestrator = Orchestrator::new(Arc::new(registry));
        let config = AssessmentConfig::default();
        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();
        assert_eq!(report.summary.overall_health, 1.0);
    }

    #[test]
    fn invalid_priority_string_is_the_only_fatal_error() {
        let registry = Registry::new();
        let orchestrator = Orchestrator::new(Arc::new(registry));
        let mut config = AssessmentConfig::default();
        config.priority_string = Some("not-a-category=1".to_string());
        assert!(orchestrator.run_assessment(Path::new("."), &config).is_err());
    }

    #[test]
    fn invariants_hold_across_categories() {
        let mut registry = Registry::new();
        registry.register(Arc::new(FixedRunner {
            category: Category::Format,
            issues: vec![issue(Category::Format, Severity::Critical, "a.rs")],
            delay: Duration::ZERO,
        }));
        registry.register(Arc::new(FixedRunner {
            category: Category::Lint,
            issues: vec![issue(Category::Lint, Severity::Low, "b.rs")],
            delay: Duration::ZERO,
        }));

        let orchestrator = Orchestrator::new(Arc::new(registry));
        let config = AssessmentConfig::default();
        let report = orchestrator.run_assessment(Path::new("."), &config).unwrap();

        let mut total = 0;
        let mut critical = 0;
        for result in report.categories.values() {
            assert_eq!(result.issue_count, result.issues.len());
            total += result.issue_count;
            critical += result.issues.iter().filter(|i| i.severity == Severity::Critical).count();
        }
        assert_eq!(report.summary.total_issues, total);
        assert_eq!(report.summary.critical_issues, critical);
    }
}
