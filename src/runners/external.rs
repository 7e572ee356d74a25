//! A generic, single-binary category runner (spec §4.1, §4.4).
//!
//! Parameterized over the tool's binary name, its applicable extensions,
//! argv builders for check/fix invocations, and an output parser. This is
//! the shared shape every format/lint/static-analysis/etc. adapter has in
//! common; the specific argv and output schema of any one tool is supplied
//! by the caller, not hard-coded here (spec §1 non-goal).

use crate::core::traits::{CancellationToken, Runner};
use crate::core::types::{AssessmentConfig, AssessmentResult, Category, Issue, Mode};
use crate::errors::CoreError;
use crate::retry::{with_retry, RetryOutcome};
use crate::scoping::{collect_files_with_scope, ScopeConfig};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

type ArgvBuilder = Arc<dyn Fn(&[PathBuf], Mode) -> Vec<String> + Send + Sync>;
type OutputParser = Arc<dyn Fn(&str, &Path) -> Option<Vec<Issue>> + Send + Sync>;

/// A runner that delegates its work to a single external binary.
#[derive(Clone)]
pub struct ExternalToolRunner {
    command_name: String,
    category: Category,
    binary: String,
    extensions: Vec<String>,
    build_args: ArgvBuilder,
    parse_output: OutputParser,
    can_fix: bool,
    per_file_estimate: Duration,
}

impl ExternalToolRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        command_name: impl Into<String>,
        category: Category,
        binary: impl Into<String>,
        extensions: Vec<String>,
        can_fix: bool,
        build_args: impl Fn(&[PathBuf], Mode) -> Vec<String> + Send + Sync + 'static,
        parse_output: impl Fn(&str, &Path) -> Option<Vec<Issue>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            command_name: command_name.into(),
            category,
            binary: binary.into(),
            extensions,
            build_args: Arc::new(build_args),
            parse_output: Arc::new(parse_output),
            can_fix,
            per_file_estimate: Duration::from_millis(50),
        }
    }

    fn applicable_files(&self, target: &Path, config: &AssessmentConfig) -> std::io::Result<Vec<PathBuf>> {
        let scope = ScopeConfig { no_ignore: config.no_ignore };
        let files = collect_files_with_scope(
            target,
            &config.include_files,
            &config.exclude_files,
            &config.force_include,
            &scope,
        )?;
        if self.extensions.is_empty() {
            return Ok(files);
        }
        Ok(files
            .into_iter()
            .filter(|f| {
                f.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
            })
            .collect())
    }

    fn invoke(
        &self,
        cancel: &CancellationToken,
        target: &Path,
        files: &[PathBuf],
        mode: Mode,
    ) -> Result<Vec<Issue>, CoreError> {
        with_retry(&self.command_name, cancel, |_attempt| {
            let args = (self.build_args)(files, mode);
            let output = Command::new(&self.binary)
                .args(&args)
                .current_dir(target)
                .output()
                .map_err(|e| RetryOutcome::Fatal(format!("failed to spawn {}: {e}", self.binary)))?;

            // Exit-code-1-with-findings is success-with-issues (spec §4.4).
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.trim().is_empty() {
                return Ok(Vec::new());
            }
            match (self.parse_output)(&stdout, target) {
                Some(issues) => Ok(issues),
                None => Err(RetryOutcome::Retryable(format!(
                    "{} produced output that failed to parse",
                    self.binary
                ))),
            }
        })
    }
}

impl Runner for ExternalToolRunner {
    fn assess(
        &self,
        cancel: &CancellationToken,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult, CoreError> {
        let start = Instant::now();

        if !self.is_available(target) {
            log::debug!("{} not found on PATH, skipping {}", self.binary, self.command_name);
            return Ok(AssessmentResult::skipped(
                self.category,
                &self.command_name,
                format!("{} not found on PATH", self.binary),
            ));
        }

        let files = self
            .applicable_files(target, config)
            .map_err(|e| CoreError::RunnerFailed {
                category: self.category.as_str().to_string(),
                tool: self.command_name.clone(),
                message: format!("file scoping failed: {e}"),
            })?;

        if files.is_empty() {
            return Ok(AssessmentResult::skipped(self.category, &self.command_name, "no applicable files"));
        }

        let effective_mode = if config.mode == Mode::Fix && !self.can_fix { Mode::Check } else { config.mode };

        let mut issues = self.invoke(cancel, target, &files, effective_mode)?;

        // `fix` mode re-checks after fixing; remaining issues are reported
        // as not auto-fixable (spec §4.4).
        if effective_mode == Mode::Fix {
            issues = self.invoke(cancel, target, &files, Mode::Check)?;
            for issue in &mut issues {
                issue.auto_fixable = false;
            }
        } else {
            for issue in &mut issues {
                issue.auto_fixable = self.can_fix;
            }
        }

        let mut result = AssessmentResult::success(self.category, &self.command_name, issues);
        result.execution_time = start.elapsed();
        Ok(result)
    }

    fn can_run_in_parallel(&self) -> bool {
        true
    }

    fn category(&self) -> Category {
        self.category
    }

    fn estimated_time(&self, target: &Path) -> Duration {
        let count = walkdir::WalkDir::new(target)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count();
        self.per_file_estimate * (count as u32).max(1)
    }

    fn is_available(&self, _target: &Path) -> bool {
        which::which(&self.binary).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Severity;
    use std::fs;
    use tempfile::TempDir;

    fn parse_colon(stdout: &str, _target: &Path) -> Option<Vec<Issue>> {
        // `file:line:col: message`
        let mut issues = Vec::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let mut parts = line.splitn(4, ':');
            let file = parts.next()?;
            let line_no: usize = parts.next()?.parse().ok()?;
            let col: usize = parts.next()?.parse().ok()?;
            let message = parts.next()?;
            issues.push(
                Issue::new(Category::Lint, Severity::Medium, file, format!("stub: {}", message.trim()))
                    .at(line_no, col),
            );
        }
        Some(issues)
    }

    #[test]
    fn missing_binary_is_skipped_not_errored() {
        let tmp = TempDir::new().unwrap();
        let runner = ExternalToolRunner::new(
            "stub-lint",
            Category::Lint,
            "definitely-not-a-real-binary-xyz",
            vec!["rs".to_string()],
            false,
            |_files, _mode| vec![],
            parse_colon,
        );
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &AssessmentConfig::default()).unwrap();
        assert!(result.success);
        assert!(result.issues.is_empty());
        assert_eq!(result.metrics.get("status").and_then(|v| v.as_str()), Some("skipped"));
    }

    #[test]
    fn no_applicable_files_is_skipped() {
        if which::which("echo").is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("readme.md"), "x").unwrap();
        let runner = ExternalToolRunner::new(
            "stub-lint",
            Category::Lint,
            "echo",
            vec!["rs".to_string()],
            false,
            |_files, _mode| vec![],
            parse_colon,
        );
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &AssessmentConfig::default()).unwrap();
        assert!(result.success);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn parses_issues_from_echoed_output() {
        if which::which("echo").is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.rs"), "fn main() {}").unwrap();

        let runner = ExternalToolRunner::new(
            "stub-lint",
            Category::Lint,
            "echo",
            vec!["rs".to_string()],
            false,
            |_files, _mode| vec!["main.rs:3:5:unused variable".to_string()],
            parse_colon,
        );
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &AssessmentConfig::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].line, 3);
        assert!(!result.issues[0].auto_fixable);
    }

    #[test]
    fn non_fixable_tool_treats_fix_mode_as_check() {
        if which::which("echo").is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.rs"), "fn main() {}").unwrap();
        let runner = ExternalToolRunner::new(
            "stub-lint",
            Category::Lint,
            "echo",
            vec!["rs".to_string()],
            false,
            |_files, mode| vec![format!("main.rs:1:1:mode was {:?}", mode)],
            parse_colon,
        );
        let mut config = AssessmentConfig::default();
        config.mode = Mode::Fix;
        let cancel = CancellationToken::new();
        let result = runner.assess(&cancel, tmp.path(), &config).unwrap();
        assert!(result.issues[0].message.contains("Check"));
    }

    #[test]
    fn orchestrator_cancellation_reaches_the_external_tool() {
        if which::which("echo").is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("main.rs"), "fn main() {}").unwrap();
        let runner = ExternalToolRunner::new(
            "stub-lint",
            Category::Lint,
            "echo",
            vec!["rs".to_string()],
            false,
            |_files, _mode| vec!["main.rs:1:1:unused".to_string()],
            parse_colon,
        );
        // An orchestrator-derived token cancelled before `assess` runs must
        // be honored by the external invocation, not a fresh token minted
        // internally (spec §5 depth-first propagation).
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = runner.assess(&cancel, tmp.path(), &AssessmentConfig::default());
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }
}
