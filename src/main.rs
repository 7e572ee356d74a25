//! `assesscore` CLI entry point.
//!
//! The detailed flag surface, configuration-file loading beyond what the
//! core consumes, and output rendering are explicit non-goals of the core
//! (spec §1) — collaborator concerns. This binary supplies the thinnest
//! possible collaborator: enough flags to exercise [`Orchestrator`] end to
//! end, and a JSON dump of the resulting [`AssessmentReport`] as the single
//! fallback renderer.

use anyhow::{Context, Result};
use assesscore::core::types::{AssessmentConfig, Category, Mode, Severity};
use assesscore::observability::{init_tracing, install_panic_hook};
use assesscore::{Orchestrator, Registry};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Orchestrate category runners against a target directory and print the
/// resulting assessment report as JSON.
#[derive(Parser, Debug)]
#[command(name = "assesscore", version, about)]
struct Cli {
    /// Directory to assess.
    #[arg(default_value = ".")]
    target: PathBuf,

    /// Comma-separated `category=priority` overrides (spec §4.2).
    #[arg(long)]
    priority: Option<String>,

    /// Restrict to these categories (comma-separated).
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// check, fix, or no-op.
    #[arg(long, default_value = "check")]
    mode: String,

    /// Per-category timeout in seconds; 0 means no timeout.
    #[arg(long, default_value_t = 0)]
    timeout_secs: u64,

    /// Explicit worker count; 0 derives from `concurrency-percent`.
    #[arg(long, default_value_t = 0)]
    concurrency: usize,

    #[arg(long, default_value_t = 50)]
    concurrency_percent: u8,

    /// Fail-on severity threshold (info/low/medium/high/critical).
    #[arg(long, default_value = "high")]
    fail_on: String,

    #[arg(long)]
    track_suppressions: bool,

    #[arg(long)]
    no_ignore: bool,
}

fn parse_severity(raw: &str) -> Result<Severity> {
    match raw.to_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        "critical" => Ok(Severity::Critical),
        other => anyhow::bail!("unknown severity: {other}"),
    }
}

fn parse_mode(raw: &str) -> Result<Mode> {
    match raw.to_lowercase().as_str() {
        "check" => Ok(Mode::Check),
        "fix" => Ok(Mode::Fix),
        "no-op" | "noop" => Ok(Mode::NoOp),
        other => anyhow::bail!("unknown mode: {other}"),
    }
}

/// Production collaborators register their runners here at startup
/// (spec §4.1: "populated during module initialization"). The core itself
/// ships no concrete tool wrappers (spec §1 non-goal), so this registry is
/// empty until a deployment wires its own runners in.
fn build_registry() -> Registry {
    Registry::new()
}

fn main() -> Result<()> {
    install_panic_hook();
    init_tracing();

    let cli = Cli::parse();

    let mut config = AssessmentConfig {
        priority_string: cli.priority,
        selected_categories: cli
            .categories
            .map(|names| {
                names
                    .iter()
                    .map(|n| Category::from_str(n.trim()))
                    .collect::<Result<Vec<_>, _>>()
                    .context("invalid --categories entry")
            })
            .transpose()?,
        mode: parse_mode(&cli.mode)?,
        timeout: Duration::from_secs(cli.timeout_secs),
        concurrency: cli.concurrency,
        concurrency_percent: cli.concurrency_percent,
        fail_on_severity: parse_severity(&cli.fail_on)?,
        track_suppressions: cli.track_suppressions,
        no_ignore: cli.no_ignore,
        ..AssessmentConfig::default()
    };
    config.extended = false;

    let registry = Arc::new(build_registry());
    let orchestrator = Orchestrator::new(registry);

    let report = orchestrator
        .run_assessment(&cli.target, &config)
        .context("assessment configuration was invalid")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.should_fail() {
        std::process::exit(1);
    }
    Ok(())
}
