//! Extraction from source comments (spec §4.6).
//!
//! One regex family per tool. For a given source file, the families whose
//! extensions match (plus `semgrep`, which is language-agnostic) are
//! applied line by line; each match emits one [`Suppression`].

use crate::core::types::Suppression;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

struct ToolFamily {
    tool: &'static str,
    extensions: &'static [&'static str],
    regex: &'static Lazy<Regex>,
}

// `// #nosec G101 -- reason text` (optionally no rule id / no reason).
static GOSEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#nosec\b(?:\s+(?P<rule>G\d+))?(?:\s*--\s*(?P<reason>.+))?").unwrap()
});

// `# nosec` / `# nosec B101 -- reason`.
static BANDIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\s*nosec\b(?:\s+(?P<rule>B\d+))?(?:\s*--\s*(?P<reason>.+))?").unwrap()
});

// `# noqa` / `# noqa: E501 reason`.
static RUFF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\s*noqa\b(?::\s*(?P<rule>[A-Z]\d+(?:,\s*[A-Z]\d+)*))?(?:\s+(?P<reason>.+))?").unwrap()
});

// `// nosemgrep: rule-id` / `# nosemgrep: rule-id -- reason`.
static SEMGREP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"nosemgrep\b(?::\s*(?P<rule>[\w.-]+))?(?:\s*--\s*(?P<reason>.+))?").unwrap()
});

// `// biome-ignore lint/suspicious/noExplicitAny: reason`.
static BIOME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"biome-ignore\s+(?P<rule>[\w./-]+)(?::\s*(?P<reason>.+))?").unwrap()
});

// `// eslint-disable-next-line rule-name -- reason` / `// eslint-disable-line rule-name`.
static ESLINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"eslint-disable(?:-next-line|-line)?(?:\s+(?P<rule>[\w,\s-]+?))?(?:\s*--\s*(?P<reason>.+))?$").unwrap()
});

// `// shellcheck disable=SC2086 -- reason`.
static SHELLCHECK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"shellcheck\s+disable=(?P<rule>SC\d+(?:,SC\d+)*)(?:\s*--\s*(?P<reason>.+))?").unwrap()
});

static FAMILIES: &[ToolFamily] = &[
    ToolFamily { tool: "gosec", extensions: &["go"], regex: &GOSEC },
    ToolFamily { tool: "bandit", extensions: &["py", "pyw"], regex: &BANDIT },
    ToolFamily { tool: "ruff", extensions: &["py", "pyw"], regex: &RUFF },
    ToolFamily {
        tool: "biome",
        extensions: &["js", "jsx", "ts", "tsx"],
        regex: &BIOME,
    },
    ToolFamily {
        tool: "eslint",
        extensions: &["js", "jsx", "ts", "tsx"],
        regex: &ESLINT,
    },
    ToolFamily { tool: "shellcheck", extensions: &["sh", "bash"], regex: &SHELLCHECK },
    // semgrep has no extension filter: it applies across languages.
    ToolFamily { tool: "semgrep", extensions: &[], regex: &SEMGREP },
];

fn extension_of(file: &Path) -> Option<String> {
    file.extension().map(|e| e.to_string_lossy().to_lowercase())
}

fn applies_to(family: &ToolFamily, extension: Option<&str>) -> bool {
    family.extensions.is_empty() || extension.is_some_and(|ext| family.extensions.contains(&ext))
}

/// Select the tool families applicable to `file`'s extension, scan
/// `contents` line by line, and emit one [`Suppression`] per match
/// (spec §4.6).
pub fn parse_suppressions(file: &Path, contents: &str) -> Vec<Suppression> {
    let extension = extension_of(file);
    let applicable: Vec<&ToolFamily> = FAMILIES
        .iter()
        .filter(|family| applies_to(family, extension.as_deref()))
        .collect();

    if applicable.is_empty() {
        return Vec::new();
    }

    let mut suppressions = Vec::new();
    for (zero_based_line, line) in contents.lines().enumerate() {
        for family in &applicable {
            if let Some(captures) = family.regex.captures(line) {
                let rule_id = captures
                    .name("rule")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                let reason = captures
                    .name("reason")
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                suppressions.push(Suppression {
                    tool: family.tool.to_string(),
                    rule_id,
                    file: normalize(file),
                    line: zero_based_line + 1,
                    column: None,
                    syntax: line.trim().to_string(),
                    reason,
                    severity: None,
                    age_days: None,
                    author: None,
                    commit: None,
                    metadata: Default::default(),
                });
            }
        }
    }
    suppressions
}

fn normalize(file: &Path) -> PathBuf {
    PathBuf::from(file.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gosec_capture_rule_and_reason() {
        let contents = "x := exec.Command(cmd) // #nosec G204 -- validated upstream\n";
        let suppressions = parse_suppressions(Path::new("main.go"), contents);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].tool, "gosec");
        assert_eq!(suppressions[0].rule_id.as_deref(), Some("G204"));
        assert_eq!(suppressions[0].reason.as_deref(), Some("validated upstream"));
        assert_eq!(suppressions[0].line, 1);
    }

    #[test]
    fn bandit_without_reason_is_legitimate() {
        let contents = "subprocess.call(cmd)  # nosec B603\n";
        let suppressions = parse_suppressions(Path::new("app.py"), contents);
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].tool, "bandit");
        assert_eq!(suppressions[0].rule_id.as_deref(), Some("B603"));
        assert!(suppressions[0].reason.is_none());
    }

    #[test]
    fn ruff_and_noqa_share_python_extension() {
        let contents = "import os  # noqa: F401\n";
        let suppressions = parse_suppressions(Path::new("app.py"), contents);
        assert!(suppressions.iter().any(|s| s.tool == "ruff"));
    }

    #[test]
    fn semgrep_applies_regardless_of_extension() {
        let contents = "eval(x) // nosemgrep: no-eval\n";
        let suppressions = parse_suppressions(Path::new("main.go"), contents);
        assert!(suppressions.iter().any(|s| s.tool == "semgrep" && s.rule_id.as_deref() == Some("no-eval")));
    }

    #[test]
    fn unrelated_extension_yields_nothing() {
        let contents = "# nosec\n";
        let suppressions = parse_suppressions(Path::new("README.md"), contents);
        assert!(suppressions.is_empty());
    }
}
