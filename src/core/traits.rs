//! The contracts every adapter implements (spec §4.1, §4.5, §6).

use super::types::{AssessmentConfig, AssessmentResult, Category, ChangeContext, Issue};
use crate::errors::CoreError;
use std::path::Path;
use std::time::Duration;

/// The five operations every category runner exposes (spec §4.1).
///
/// Implementors MUST honor cancellation at every I/O or sub-process boundary:
/// `cancel` is an [`AtomicBool`](std::sync::atomic::AtomicBool)-backed
/// cooperative signal, threaded through as `&CancellationToken`.
pub trait Runner: Send + Sync {
    /// Perform the work; honor `cancel` at every I/O / sub-process boundary.
    fn assess(
        &self,
        cancel: &CancellationToken,
        target: &Path,
        config: &AssessmentConfig,
    ) -> Result<AssessmentResult, CoreError>;

    /// Advisory hint; the orchestrator may still serialize if concurrency=1.
    fn can_run_in_parallel(&self) -> bool {
        true
    }

    /// Constant per runner.
    fn category(&self) -> Category;

    /// Best-effort heuristic, used only for UX and workflow estimates.
    fn estimated_time(&self, target: &Path) -> Duration;

    /// Whether prerequisites (binaries, config files) are present.
    fn is_available(&self, target: &Path) -> bool;
}

/// A cooperative cancellation signal shared by every suspension point listed
/// in spec §5: sub-process spawns, file reads, scanner reads, retry-backoff
/// sleeps, and worker-pool waits.
#[derive(Clone)]
pub struct CancellationToken {
    inner: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.inner.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Spawn a child token and a timer that cancels it after `timeout`
    /// (zero means "no timeout"), matching the per-category derived context
    /// of spec §4.3 step 4 / §5.
    pub fn with_timeout(timeout: Duration) -> (Self, Option<std::thread::JoinHandle<()>>) {
        let token = Self::new();
        if timeout.is_zero() {
            return (token, None);
        }
        let watcher_token = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(timeout);
            watcher_token.cancel();
        });
        (token, Some(handle))
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// The dimension a security tool adapter scans (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolDimension {
    Code,
    Vuln,
    Secrets,
}

impl ToolDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolDimension::Code => "code",
            ToolDimension::Vuln => "vuln",
            ToolDimension::Secrets => "secrets",
        }
    }
}

/// Minimal interface every security adapter implements (spec §4.5).
pub trait SecurityTool: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> ToolDimension;
    fn is_available(&self) -> bool;
    fn run(&self, cancel: &CancellationToken, target: &Path) -> Result<Vec<Issue>, CoreError>;

    /// Adapters that can additionally surface suppressions override this;
    /// the default delegates to `run` and reports no suppressions.
    fn run_with_suppressions(
        &self,
        cancel: &CancellationToken,
        target: &Path,
    ) -> Result<(Vec<Issue>, Vec<super::types::Suppression>), CoreError> {
        self.run(cancel, target).map(|issues| (issues, Vec::new()))
    }
}

/// The external collaborator that discovers modified files/lines from a
/// working tree (spec §4.3 step 1, §6). The core tolerates its absence or
/// failure — both are non-fatal.
pub trait ChangeCollaborator: Send + Sync {
    fn collect(&self, target: &Path) -> Option<ChangeContext>;
}
