//! Structured logging and crash reporting (SPEC_FULL §10.1), grounded in
//! the teacher's `observability` module conventions.

pub mod panic_hook;
pub mod tracing_setup;

pub use panic_hook::{install_panic_hook, take_last_panic_message};
pub use tracing_setup::init_tracing;
