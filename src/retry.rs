//! Bounded retry with exponential back-off for transient tool-output parse
//! failures (spec §4.4, §4.5, §7, §9).
//!
//! Malformed *non-empty* tool output is retried up to twice, with delays of
//! 200 ms then 400 ms, before being recorded as a runner error. This is the
//! one retry policy in the core; every collaborator that parses external
//! process output shares it rather than re-implementing back-off.

use crate::core::traits::CancellationToken;
use std::time::Duration;

/// Delays between attempts, in order (spec §4.4: "200 ms -> 400 ms, max two
/// retries"). The first attempt has no delay.
const BACKOFF: &[Duration] = &[Duration::from_millis(200), Duration::from_millis(400)];

/// Run `attempt` up to `1 + BACKOFF.len()` times total. `attempt` returns
/// `Ok(T)` on success, or `Err(Some(message))` for a malformed-output
/// failure that should be retried, or `Err(None)` for a failure that should
/// not be retried (propagated immediately).
///
/// Honors `cancel` during the back-off sleep (spec §5: "every sleep in the
/// retry back-off" is a suspension point).
pub fn with_retry<T>(
    tool: &str,
    cancel: &CancellationToken,
    mut attempt: impl FnMut(u32) -> Result<T, RetryOutcome>,
) -> Result<T, crate::errors::CoreError> {
    let mut last_message = String::new();
    for (index, delay) in std::iter::once(None)
        .chain(BACKOFF.iter().map(|d| Some(*d)))
        .enumerate()
    {
        if let Some(delay) = delay {
            if cancel.is_cancelled() {
                return Err(crate::errors::CoreError::Cancelled);
            }
            std::thread::sleep(delay);
        }
        if cancel.is_cancelled() {
            return Err(crate::errors::CoreError::Cancelled);
        }
        match attempt(index as u32) {
            Ok(value) => return Ok(value),
            Err(RetryOutcome::Retryable(message)) => {
                log::trace!("{tool} produced malformed output on attempt {}: {message}", index + 1);
                last_message = message;
                continue;
            }
            Err(RetryOutcome::Fatal(message)) => {
                return Err(crate::errors::CoreError::RunnerFailed {
                    category: String::new(),
                    tool: tool.to_string(),
                    message,
                });
            }
        }
    }
    log::warn!("{tool} exhausted all retry attempts, recording as a runner error");
    Err(crate::errors::CoreError::ParseExhausted {
        tool: tool.to_string(),
        attempts: (BACKOFF.len() + 1) as u32,
        message: last_message,
    })
}

/// What an `attempt` closure reports on failure.
pub enum RetryOutcome {
    /// Malformed output; worth retrying.
    Retryable(String),
    /// Not a parse problem (e.g. binary vanished mid-run); retrying won't help.
    Fatal(String),
}
