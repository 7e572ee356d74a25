//! Layered, gitignore-syntax-subset ignore matching (spec §6).
//!
//! Search order: repo-root, then each ancestor directory up to the
//! filesystem root, then the user-global ignore file. The first layer that
//! produces a verdict (ignored or explicitly re-admitted via `!pattern`)
//! wins; later layers are not consulted once an earlier layer has spoken.
//! Within a single layer, patterns are evaluated in file order and the last
//! matching line wins, matching ordinary gitignore semantics.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct IgnoreLine {
    pattern: String,
    negate: bool,
}

#[derive(Debug, Clone, Default)]
struct IgnoreLayer {
    lines: Vec<IgnoreLine>,
}

impl IgnoreLayer {
    fn parse(contents: &str) -> Self {
        let mut lines = Vec::new();
        for raw in contents.lines() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (negate, pattern) = if let Some(rest) = trimmed.strip_prefix('!') {
                (true, rest.to_string())
            } else {
                (false, trimmed.to_string())
            };
            lines.push(IgnoreLine { pattern, negate });
        }
        Self { lines }
    }

    fn from_file(path: &Path) -> Option<Self> {
        std::fs::read_to_string(path).ok().map(|c| Self::parse(&c))
    }

    /// Returns `Some(ignored)` if this layer has an opinion, `None` if no
    /// pattern in the layer matched at all.
    fn verdict(&self, relative_path: &str) -> Option<bool> {
        let mut verdict = None;
        for line in &self.lines {
            if Self::pattern_matches(&line.pattern, relative_path) {
                verdict = Some(!line.negate);
            }
        }
        verdict
    }

    fn pattern_matches(pattern: &str, relative_path: &str) -> bool {
        // Directory pattern: "prefix/" matches prefix and everything under it.
        if let Some(prefix) = pattern.strip_suffix('/') {
            return relative_path == prefix || relative_path.starts_with(&format!("{prefix}/"));
        }
        // "**/suffix" matches suffix anywhere in the tree.
        if let Some(suffix) = pattern.strip_prefix("**/") {
            return relative_path == suffix || relative_path.ends_with(&format!("/{suffix}"));
        }
        if let Ok(glob) = glob::Pattern::new(pattern) {
            if glob.matches(relative_path) {
                return true;
            }
            // A bare basename pattern ("*.log", "TODO") also matches nested
            // occurrences, mirroring gitignore's no-slash-means-anywhere rule.
            if !pattern.contains('/') {
                if let Some(basename) = Path::new(relative_path).file_name().and_then(|n| n.to_str()) {
                    return glob.matches(basename);
                }
            }
        }
        false
    }
}

/// The assembled set of layers for one `collectFilesWithScope` call.
#[derive(Debug, Clone, Default)]
pub struct LayeredIgnore {
    layers: Vec<IgnoreLayer>,
}

impl LayeredIgnore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the layer stack for files scoped under `root` (spec §6):
    /// repo-root, then each ancestor up to the filesystem root, then the
    /// user-global ignore file.
    pub fn load(root: &Path) -> Self {
        let mut layers = Vec::new();

        if let Some(layer) = IgnoreLayer::from_file(&root.join(".goneatignore")) {
            layers.push(layer);
        }

        let mut ancestor = root.parent();
        while let Some(dir) = ancestor {
            if let Some(layer) = IgnoreLayer::from_file(&dir.join(".goneatignore")) {
                layers.push(layer);
            }
            ancestor = dir.parent();
        }

        if let Some(layer) = user_global_layer() {
            layers.push(layer);
        }

        Self { layers }
    }

    /// `true` if the relative path is ignored once layering and negation
    /// are applied.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        for layer in &self.layers {
            if let Some(ignored) = layer.verdict(relative_path) {
                return ignored;
            }
        }
        false
    }
}

fn user_global_layer() -> Option<IgnoreLayer> {
    let path: PathBuf = if let Ok(home) = std::env::var("GONEAT_HOME") {
        PathBuf::from(home).join(".goneatignore")
    } else {
        dirs::home_dir()?.join(".goneat").join(".goneatignore")
    };
    IgnoreLayer::from_file(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_pattern_matches_recursively() {
        let layer = IgnoreLayer::parse("vendor/\n");
        assert_eq!(layer.verdict("vendor"), Some(true));
        assert_eq!(layer.verdict("vendor/dep.rs"), Some(true));
        assert_eq!(layer.verdict("src/lib.rs"), None);
    }

    #[test]
    fn negation_re_admits() {
        let layer = IgnoreLayer::parse("*.log\n!important.log\n");
        assert_eq!(layer.verdict("debug.log"), Some(true));
        assert_eq!(layer.verdict("important.log"), Some(false));
    }

    #[test]
    fn later_line_wins_within_a_layer() {
        let layer = IgnoreLayer::parse("*.rs\n!keep.rs\n*.rs\n");
        assert_eq!(layer.verdict("keep.rs"), Some(true));
    }

    #[test]
    fn first_layer_with_an_opinion_wins() {
        let layered = LayeredIgnore {
            layers: vec![IgnoreLayer::parse("!important.log\n"), IgnoreLayer::parse("*.log\n")],
        };
        assert!(!layered.is_ignored("important.log"));
    }
}
