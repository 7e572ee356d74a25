//! Noise filter: optionally drop issues whose path matches fixture
//! patterns (spec §4.5).

use crate::core::types::Issue;

const DEFAULT_PATTERNS: &[&str] = &["tests/fixtures/", "test-fixtures/"];

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    patterns: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl NoiseFilter {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    pub fn disabled() -> Self {
        Self { patterns: Vec::new() }
    }

    pub fn is_noise(&self, issue: &Issue) -> bool {
        let path = issue.file.to_string_lossy().replace('\\', "/");
        self.patterns.iter().any(|pattern| path.contains(pattern.as_str()))
    }

    /// Drop issues matching a fixture pattern, preserving relative order.
    pub fn filter(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if self.patterns.is_empty() {
            return issues;
        }
        issues.into_iter().filter(|issue| !self.is_noise(issue)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Category, Severity};

    fn issue(file: &str) -> Issue {
        Issue::new(Category::Security, Severity::High, file, "m")
    }

    #[test]
    fn default_patterns_drop_fixture_issues() {
        let filter = NoiseFilter::default();
        let issues = vec![issue("tests/fixtures/bad.go"), issue("main.go")];
        let filtered = filter.filter(issues);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].file.to_string_lossy(), "main.go");
    }

    #[test]
    fn disabled_filter_passes_everything_through() {
        let filter = NoiseFilter::disabled();
        let issues = vec![issue("tests/fixtures/bad.go")];
        assert_eq!(filter.filter(issues).len(), 1);
    }
}
