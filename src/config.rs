//! Loading and caching of `<target>/.goneat/assess.yaml` (spec §6, §7,
//! SPEC_FULL §10.3).
//!
//! Unrecognized top-level keys reject the file — "rejected" means the
//! caller gets no overrides, not a fatal [`ConfigError`] (spec §6: "returns
//! 'no overrides'"; contrast with the priority-string parse error, the only
//! fatal class per spec §7). A missing file is normal and also yields no
//! overrides.
//!
//! Loaded overlays are cached in a process-wide, write-once-per-key
//! concurrent map keyed by the canonicalized target path, so repeated
//! `RunAssessment` calls against the same target in one process don't
//! re-read and re-parse the file.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const RECOGNIZED_TOP_LEVEL_KEYS: &[&str] = &["version", "lint", "typecheck"];

/// The subset of `assess.yaml` the core itself consumes (spec §6). Tool
/// wrappers (shfmt, shellcheck, actionlint, checkmake, the TypeScript
/// typechecker) interpret their own sub-sections; the core only validates
/// the top-level key set and hands the raw value through.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AssessYaml {
    pub version: Option<u32>,
    #[serde(default)]
    pub lint: serde_yaml::Value,
    #[serde(default)]
    pub typecheck: serde_yaml::Value,
}

static CACHE: Lazy<DashMap<PathBuf, Arc<Option<AssessYaml>>>> = Lazy::new(DashMap::new);

fn reject_unrecognized_keys(raw: &serde_yaml::Value) -> Result<(), Vec<String>> {
    let serde_yaml::Value::Mapping(mapping) = raw else {
        return Ok(());
    };
    let unrecognized: Vec<String> = mapping
        .keys()
        .filter_map(|k| k.as_str())
        .filter(|k| !RECOGNIZED_TOP_LEVEL_KEYS.contains(k))
        .map(|k| k.to_string())
        .collect();
    if unrecognized.is_empty() {
        Ok(())
    } else {
        Err(unrecognized)
    }
}

/// Load `<target>/.goneat/assess.yaml`, returning `None` when the file is
/// missing or carries unrecognized keys (spec §6). Canonicalization makes
/// the cache key stable regardless of how `target` was spelled by the
/// caller.
pub fn load(target: &Path) -> Option<AssessYaml> {
    let canonical = target.canonicalize().unwrap_or_else(|_| target.to_path_buf());

    if let Some(cached) = CACHE.get(&canonical) {
        return (**cached).clone();
    }

    let loaded = load_uncached(&canonical);
    CACHE.insert(canonical, Arc::new(loaded.clone()));
    loaded
}

fn load_uncached(target: &Path) -> Option<AssessYaml> {
    let path = target.join(".goneat").join("assess.yaml");
    let contents = std::fs::read_to_string(path).ok()?;

    let raw: serde_yaml::Value = serde_yaml::from_str(&contents).ok()?;
    if reject_unrecognized_keys(&raw).is_err() {
        return None;
    }

    serde_yaml::from_value(raw).ok()
}

/// Test-only escape hatch: clear the process-wide cache so tests using
/// distinct `TempDir`s don't see each other's entries leak across runs
/// that happen to canonicalize to the same path (not expected in
/// practice, but keeps the cache deterministic under `cargo test`'s
/// parallel harness).
#[cfg(test)]
pub fn clear_cache_for_tests() {
    CACHE.clear();
}
