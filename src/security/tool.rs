//! A generic, command-backed [`SecurityTool`] implementation.
//!
//! This is the one place the core touches an actual external binary for the
//! security category, and it deliberately knows nothing about any specific
//! tool's argv shape or output schema beyond the three output shapes spec
//! §4.5/§9 describe (a single JSON object, a JSON array, or NDJSON) — the
//! detailed argv construction for a particular scanner is an explicit
//! non-goal (spec §1) left to a collaborator that supplies `args` and a
//! `parse` callback.

use crate::core::traits::{CancellationToken, SecurityTool, ToolDimension};
use crate::core::types::Issue;
use crate::errors::CoreError;
use crate::retry::{with_retry, RetryOutcome};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

/// How to interpret an invocation's stdout (spec §4.5, §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputShape {
    /// A single balanced `{...}` object, possibly surrounded by noise.
    JsonObject,
    /// A JSON array document.
    JsonArray,
    /// One JSON value per line.
    Ndjson,
}

type IssueParser = Arc<dyn Fn(&str) -> Option<Vec<Issue>> + Send + Sync>;

/// A security adapter that shells out to `binary` with `args`, applying the
/// shared retry/back-off policy to malformed non-empty output (spec §4.4
/// extended to security tools by §4.5/§9) and delegating interpretation of
/// successful output to `parse`.
#[derive(Clone)]
pub struct CommandSecurityTool {
    name: String,
    dimension: ToolDimension,
    binary: String,
    args: Vec<String>,
    shape: OutputShape,
    parse: IssueParser,
}

impl CommandSecurityTool {
    pub fn new(
        name: impl Into<String>,
        dimension: ToolDimension,
        binary: impl Into<String>,
        args: Vec<String>,
        shape: OutputShape,
        parse: impl Fn(&str) -> Option<Vec<Issue>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            dimension,
            binary: binary.into(),
            args,
            shape,
            parse: Arc::new(parse),
        }
    }
}

impl SecurityTool for CommandSecurityTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> ToolDimension {
        self.dimension
    }

    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn run(&self, cancel: &CancellationToken, target: &Path) -> Result<Vec<Issue>, CoreError> {
        with_retry(&self.name, cancel, |_attempt| {
            if cancel.is_cancelled() {
                return Err(RetryOutcome::Fatal("cancelled".to_string()));
            }
            let output = Command::new(&self.binary)
                .args(&self.args)
                .current_dir(target)
                .output()
                .map_err(|e| RetryOutcome::Fatal(format!("failed to spawn {}: {e}", self.binary)))?;

            // Exit-code-1-with-findings is success-with-issues (spec §4.4);
            // only a genuinely empty stdout with a non-zero exit and no
            // findings signature is treated as a hard failure.
            let stdout = String::from_utf8_lossy(&output.stdout);
            if stdout.trim().is_empty() {
                if output.status.success() {
                    return Ok(Vec::new());
                }
                return Err(RetryOutcome::Fatal(format!(
                    "{} exited with {} and no output",
                    self.binary, output.status
                )));
            }

            match (self.parse)(&stdout) {
                Some(issues) => Ok(issues),
                None => Err(RetryOutcome::Retryable(format!(
                    "{} produced output that failed to parse as {:?}",
                    self.name, self.shape
                ))),
            }
        })
    }
}
