//! The `security` category runner (spec §4.5): delegates to the
//! [`crate::security::SecurityOrchestrator`] and surfaces its suppressions
//! through the private `_suppressions` metric the top-level orchestrator
//! promotes (spec §4.3 step 6).

use crate::core::traits::{CancellationToken, Runner};
use crate::core::types::{AssessmentConfig, AssessmentResult, Category, Mode};
use crate::errors::CoreError;
use crate::security::orchestrator::SecurityOrchestratorConfig;
use crate::security::{SecurityOrchestrator, ToolRegistry};
use std::path::Path;
use std::time::{Duration, Instant};

pub struct SecurityRunner {
    registry: ToolRegistry,
}

impl SecurityRunner {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    fn build_sub_config(&self, config: &AssessmentConfig) -> SecurityOrchestratorConfig {
        let per_tool_timeout = config
            .extra
            .get("security_per_tool_timeout_secs")
            .and_then(|v| v.as_u64())
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);

        let name_filter = config
            .extra
            .get("security_tool_filter")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        SecurityOrchestratorConfig {
            dimensions: None,
            name_filter,
            concurrency: config.concurrency,
            concurrency_percent: config.concurrency_percent,
            global_timeout: config.timeout,
            per_tool_timeout,
            no_ignore: config.no_ignore,
            include_files: config.include_files.iter().map(std::path::PathBuf::from).collect(),
            noise_filter: Default::default(),
            promotion_rules: Vec::new(),
        }
    }
}

impl Runner for SecurityRunner {
    fn assess(
        &self,
        cancel: &CancellationToken,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult, CoreError> {
        let start = Instant::now();
        let sub_config = self.build_sub_config(config);
        let orchestrator = SecurityOrchestrator::new(self.registry.clone());
        let output = orchestrator.run(cancel, target, &sub_config)?;

        let mut result = AssessmentResult::success(Category::Security, "security", output.issues);
        result.execution_time = start.elapsed();
        result
            .metrics
            .insert("shard_count".to_string(), serde_json::json!(output.shard_count));
        result
            .metrics
            .insert("pool_size".to_string(), serde_json::json!(output.pool_size));
        result
            .metrics
            .insert("tools_started".to_string(), serde_json::json!(output.tools_started));
        result
            .metrics
            .insert("suppressions_found".to_string(), serde_json::json!(output.suppressions.len()));

        if config.track_suppressions && !output.suppressions.is_empty() {
            result
                .metrics
                .insert("_suppressions".to_string(), serde_json::to_value(&output.suppressions).unwrap());
        }

        Ok(result)
    }

    fn can_run_in_parallel(&self) -> bool {
        true
    }

    fn category(&self) -> Category {
        Category::Security
    }

    fn estimated_time(&self, _target: &Path) -> Duration {
        Duration::from_secs(30)
    }

    fn is_available(&self, _target: &Path) -> bool {
        !self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{SecurityTool, ToolDimension};
    use crate::core::types::{Issue, Severity, Suppression};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct SuppressingTool;
    impl SecurityTool for SuppressingTool {
        fn name(&self) -> &str {
            "stub"
        }
        fn dimension(&self) -> ToolDimension {
            ToolDimension::Vuln
        }
        fn is_available(&self) -> bool {
            true
        }
        fn run(&self, _cancel: &CancellationToken, target: &Path) -> Result<Vec<Issue>, CoreError> {
            Ok(vec![Issue::new(Category::Security, Severity::High, target.join("a.go"), "m")])
        }
        fn run_with_suppressions(
            &self,
            _cancel: &CancellationToken,
            target: &Path,
        ) -> Result<(Vec<Issue>, Vec<Suppression>), CoreError> {
            let suppression = Suppression {
                tool: "gosec".to_string(),
                rule_id: Some("G404".to_string()),
                file: target.join("a.go"),
                line: 10,
                column: None,
                syntax: String::new(),
                reason: Some("intentional".to_string()),
                severity: None,
                age_days: None,
                author: None,
                commit: None,
                metadata: Default::default(),
            };
            Ok((vec![], vec![suppression]))
        }
    }

    #[test]
    fn suppressions_are_surfaced_as_private_metric_when_tracking() {
        let tmp = TempDir::new().unwrap();
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SuppressingTool));
        let runner = SecurityRunner::new(registry);

        let mut config = AssessmentConfig::default();
        config.track_suppressions = true;
        config.mode = Mode::Check;
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &config).unwrap();

        assert!(result.metrics.contains_key("_suppressions"));
        let suppressions: Vec<Suppression> = serde_json::from_value(result.metrics["_suppressions"].clone()).unwrap();
        assert_eq!(suppressions.len(), 1);
    }

    #[test]
    fn suppressions_absent_when_not_tracking() {
        let tmp = TempDir::new().unwrap();
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SuppressingTool));
        let runner = SecurityRunner::new(registry);

        let config = AssessmentConfig::default();
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &config).unwrap();
        assert!(!result.metrics.contains_key("_suppressions"));
    }

    #[test]
    fn unavailable_when_registry_is_empty() {
        let runner = SecurityRunner::new(ToolRegistry::new());
        assert!(!runner.is_available(Path::new(".")));
    }
}
