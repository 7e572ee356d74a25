//! A panic hook that captures enough context to turn a worker-thread panic
//! into an actionable [`crate::errors::CoreError`] rather than a bare
//! unwind trace, and a pool boundary (the orchestrator's job runner) that
//! catches it (spec §5, SPEC_FULL §10.1).

use std::panic::PanicHookInfo;
use std::sync::{Mutex, OnceLock};

static LAST_PANIC: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn storage() -> &'static Mutex<Option<String>> {
    LAST_PANIC.get_or_init(|| Mutex::new(None))
}

fn format_panic(info: &PanicHookInfo<'_>) -> String {
    let message = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    match info.location() {
        Some(location) => format!("{message} at {}:{}:{}", location.file(), location.line(), location.column()),
        None => message,
    }
}

/// Install the custom panic hook. Idempotent: subsequent calls replace the
/// previous hook rather than chaining (matches `std::panic::set_hook`'s
/// own semantics).
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = format_panic(info);
        *storage().lock().unwrap() = Some(message.clone());
        tracing::error!(panic = %message, "worker thread panicked");
    }));
}

/// Retrieve and clear the last captured panic message, if any. The
/// orchestrator's job runner calls this after joining a panicked worker
/// thread to build a [`crate::errors::CoreError::RunnerFailed`] message
/// instead of a generic "thread panicked" string.
pub fn take_last_panic_message() -> Option<String> {
    storage().lock().unwrap().take()
}
