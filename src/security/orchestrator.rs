//! The security sub-orchestrator's run algorithm (spec §4.5).

use super::noise::NoiseFilter;
use super::promotion::{apply_promotions, PromotionRule, PromotionStats};
use super::registry::ToolRegistry;
use super::sharding::{discover_shards, shards_for_include_files};
use crate::core::traits::{CancellationToken, SecurityTool, ToolDimension};
use crate::core::types::{Issue, Suppression};
use crate::errors::CoreError;
use crate::pool::{resolve_worker_count, run_bounded};
use crate::suppression::generate_summary;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Inputs the category's `security` runner hands to the sub-orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SecurityOrchestratorConfig {
    pub dimensions: Option<Vec<ToolDimension>>,
    pub name_filter: Option<String>,
    pub concurrency: usize,
    pub concurrency_percent: u8,
    /// Zero means no timeout.
    pub global_timeout: Duration,
    /// Zero means no per-tool timeout; overrides `global_timeout` only when
    /// both are set and the per-tool value is smaller (spec §5).
    pub per_tool_timeout: Duration,
    pub no_ignore: bool,
    pub include_files: Vec<PathBuf>,
    pub noise_filter: NoiseFilter,
    pub promotion_rules: Vec<PromotionRule>,
}

/// What the sub-orchestrator hands back to the `security` category runner,
/// already shaped for `AssessmentResult.metrics` (spec §4.5: "shards, pool
/// size, tools started, suppressions found, suppression summary").
#[derive(Debug, Clone)]
pub struct SecurityOrchestratorOutput {
    pub issues: Vec<Issue>,
    pub suppressions: Vec<Suppression>,
    pub shard_count: usize,
    pub pool_size: usize,
    pub tools_started: usize,
    pub promotion_stats: PromotionStats,
}

/// Effective timeout for one tool invocation: `min(global, per-tool)` when
/// both are set, else whichever is set, else none (spec §5).
fn effective_timeout(global: Duration, per_tool: Duration) -> Duration {
    match (global.is_zero(), per_tool.is_zero()) {
        (true, true) => Duration::ZERO,
        (true, false) => per_tool,
        (false, true) => global,
        (false, false) => global.min(per_tool),
    }
}

pub struct SecurityOrchestrator {
    registry: ToolRegistry,
}

impl SecurityOrchestrator {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Run every selected adapter concurrently (spec §4.5): code-dimension
    /// tools are additionally sharded across package directories, each
    /// shard running in the bounded pool; vuln/secrets tools run once
    /// against the whole target.
    pub fn run(
        &self,
        parent_cancel: &CancellationToken,
        target: &Path,
        config: &SecurityOrchestratorConfig,
    ) -> Result<SecurityOrchestratorOutput, CoreError> {
        let dimensions = config.dimensions.as_deref();
        let selected = self.registry.select(dimensions, config.name_filter.as_deref());
        let tools_started = selected.len();

        let timeout = effective_timeout(config.global_timeout, config.per_tool_timeout);

        let shards = if config.include_files.is_empty() {
            discover_shards(target, config.no_ignore)
        } else {
            shards_for_include_files(target, &config.include_files)
        };

        let pool_size = resolve_worker_count(config.concurrency, config.concurrency_percent)
            .min(shards.len().max(1));
        log::info!(
            "security scan of {}: {} tool(s) started across {} shard(s), pool size {}",
            target.display(),
            tools_started,
            shards.len(),
            pool_size
        );

        // Build the flat job list: (tool, shard) for code-dimension tools,
        // (tool, whole-target) for everything else, run concurrently.
        struct Job {
            tool: std::sync::Arc<dyn SecurityTool>,
            shard: Option<PathBuf>,
        }

        let mut jobs = Vec::new();
        for tool in &selected {
            if tool.dimension() == ToolDimension::Code {
                for shard in &shards {
                    jobs.push(Job { tool: tool.clone(), shard: Some(shard.clone()) });
                }
            } else {
                jobs.push(Job { tool: tool.clone(), shard: None });
            }
        }

        let worker_count = resolve_worker_count(config.concurrency, config.concurrency_percent);

        let results: Vec<(Vec<Issue>, Vec<Suppression>)> = run_bounded(jobs, worker_count, |job| {
            let span = tracing::debug_span!("security_tool_job", tool = job.tool.name(), shard = ?job.shard);
            let _entered = span.enter();

            let (token, _watcher) = CancellationToken::with_timeout(timeout);
            if parent_cancel.is_cancelled() {
                token.cancel();
            }
            let shard_target = match &job.shard {
                Some(shard) => target.join(shard),
                None => target.to_path_buf(),
            };
            match job.tool.run_with_suppressions(&token, &shard_target) {
                Ok((issues, suppressions)) => (issues, suppressions),
                Err(err) => {
                    log::warn!("security tool '{}' failed on shard {:?}, skipping: {err}", job.tool.name(), job.shard);
                    (Vec::new(), Vec::new())
                }
            }
        });

        let mut issues: Vec<Issue> = Vec::new();
        let mut suppressions: Vec<Suppression> = Vec::new();
        for (job_issues, job_suppressions) in results {
            issues.extend(job_issues);
            suppressions.extend(job_suppressions);
        }

        if !config.include_files.is_empty() {
            issues.retain(|issue| config.include_files.iter().any(|f| f == &issue.file));
        }

        issues = config.noise_filter.filter(issues);

        let (issues, mut promoted, promotion_stats) = apply_promotions(issues, &config.promotion_rules);
        suppressions.append(&mut promoted);

        Ok(SecurityOrchestratorOutput {
            issues,
            suppressions,
            shard_count: shards.len(),
            pool_size,
            tools_started,
            promotion_stats,
        })
    }
}

impl SecurityOrchestratorOutput {
    pub fn suppression_summary(&self) -> crate::suppression::SuppressionSummary {
        generate_summary(&self.suppressions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, Severity};
    use std::sync::Arc;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    struct DelayTool {
        name: &'static str,
        dimension: ToolDimension,
        delay: StdDuration,
    }

    impl SecurityTool for DelayTool {
        fn name(&self) -> &str {
            self.name
        }
        fn dimension(&self) -> ToolDimension {
            self.dimension
        }
        fn is_available(&self) -> bool {
            true
        }
        fn run(&self, _cancel: &CancellationToken, target: &Path) -> Result<Vec<Issue>, CoreError> {
            std::thread::sleep(self.delay);
            Ok(vec![Issue::new(Category::Security, Severity::High, target.join("f.go"), self.name)])
        }
    }

    #[test]
    fn concurrent_tools_complete_faster_than_sequential_sum() {
        let tmp = TempDir::new().unwrap();
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DelayTool { name: "a", dimension: ToolDimension::Vuln, delay: StdDuration::from_millis(150) }));
        registry.register(Arc::new(DelayTool { name: "b", dimension: ToolDimension::Secrets, delay: StdDuration::from_millis(150) }));

        let orchestrator = SecurityOrchestrator::new(registry);
        let config = SecurityOrchestratorConfig { concurrency: 2, ..Default::default() };
        let cancel = CancellationToken::new();

        let start = std::time::Instant::now();
        let output = orchestrator.run(&cancel, tmp.path(), &config).unwrap();
        let elapsed = start.elapsed();

        assert_eq!(output.issues.len(), 2);
        assert_eq!(output.tools_started, 2);
        assert!(elapsed < StdDuration::from_millis(280), "elapsed={elapsed:?}");
    }

    #[test]
    fn dimension_filter_excludes_non_matching_tools() {
        let tmp = TempDir::new().unwrap();
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(DelayTool { name: "a", dimension: ToolDimension::Vuln, delay: StdDuration::ZERO }));
        registry.register(Arc::new(DelayTool { name: "b", dimension: ToolDimension::Secrets, delay: StdDuration::ZERO }));

        let orchestrator = SecurityOrchestrator::new(registry);
        let config = SecurityOrchestratorConfig {
            dimensions: Some(vec![ToolDimension::Vuln]),
            concurrency: 1,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let output = orchestrator.run(&cancel, tmp.path(), &config).unwrap();
        assert_eq!(output.tools_started, 1);
        assert_eq!(output.issues.len(), 1);
    }

    #[test]
    fn noise_filter_drops_fixture_issues() {
        struct FixtureTool;
        impl SecurityTool for FixtureTool {
            fn name(&self) -> &str {
                "fixture-tool"
            }
            fn dimension(&self) -> ToolDimension {
                ToolDimension::Secrets
            }
            fn is_available(&self) -> bool {
                true
            }
            fn run(&self, _cancel: &CancellationToken, _target: &Path) -> Result<Vec<Issue>, CoreError> {
                Ok(vec![
                    Issue::new(Category::Security, Severity::High, "tests/fixtures/secret.txt", "m"),
                    Issue::new(Category::Security, Severity::High, "src/real.txt", "m"),
                ])
            }
        }

        let tmp = TempDir::new().unwrap();
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixtureTool));
        let orchestrator = SecurityOrchestrator::new(registry);
        let config = SecurityOrchestratorConfig { concurrency: 1, ..Default::default() };
        let cancel = CancellationToken::new();
        let output = orchestrator.run(&cancel, tmp.path(), &config).unwrap();
        assert_eq!(output.issues.len(), 1);
    }

    #[test]
    fn effective_timeout_prefers_smaller_of_global_and_per_tool() {
        assert_eq!(
            effective_timeout(StdDuration::from_secs(10), StdDuration::from_secs(5)),
            StdDuration::from_secs(5)
        );
        assert_eq!(
            effective_timeout(StdDuration::ZERO, StdDuration::from_secs(5)),
            StdDuration::from_secs(5)
        );
        assert_eq!(effective_timeout(StdDuration::ZERO, StdDuration::ZERO), StdDuration::ZERO);
    }
}
