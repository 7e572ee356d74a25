//! `collectFilesWithScope` and the layered ignore matcher (spec §4.8, §6).

pub mod ignore_file;

use ignore_file::LayeredIgnore;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// doublestar-style glob match against a relative, forward-slash path. The
/// `glob` crate's `Pattern` supports `**` recursive segments, which is all
/// spec §4.8 requires.
fn glob_match(pattern: &str, relative_path: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(relative_path))
        .unwrap_or(false)
}

fn to_forward_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Does `relative_path` match `pattern`, also trying the pattern with its
/// leading `**/` stripped (spec §4.8: "to handle root-level files that some
/// glob implementations do not match")?
fn include_match(pattern: &str, relative_path: &str) -> bool {
    if glob_match(pattern, relative_path) {
        return true;
    }
    if let Some(stripped) = pattern.strip_prefix("**/") {
        return glob_match(stripped, relative_path);
    }
    false
}

/// Force-include match: doublestar match on the full path or the basename;
/// `prefix/**` admits `prefix` itself and everything under it (spec §4.8).
fn force_include_match(pattern: &str, relative_path: &str) -> bool {
    if glob_match(pattern, relative_path) {
        return true;
    }
    if let Some(basename) = Path::new(relative_path).file_name().and_then(|n| n.to_str()) {
        if glob_match(pattern, basename) {
            return true;
        }
    }
    if let Some(prefix) = pattern.strip_suffix("/**") {
        if relative_path == prefix || relative_path.starts_with(&format!("{prefix}/")) {
            return true;
        }
    }
    false
}

/// Configuration knobs `collectFilesWithScope` honors beyond the raw
/// include/exclude/force-include lists (spec §4.8).
#[derive(Debug, Clone, Default)]
pub struct ScopeConfig {
    pub no_ignore: bool,
}

/// `collectFilesWithScope(root, includes, excludes, config)` (spec §4.8).
///
/// Returns relative, de-duplicated, lexicographically sorted file paths.
pub fn collect_files_with_scope(
    root: &Path,
    includes: &[String],
    excludes: &[String],
    force_include: &[String],
    config: &ScopeConfig,
) -> std::io::Result<Vec<PathBuf>> {
    let ignore = if config.no_ignore {
        LayeredIgnore::empty()
    } else {
        LayeredIgnore::load(root)
    };

    let mut all_files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => continue,
        };
        if relative.file_name().and_then(|n| n.to_str()) == Some(".goneatignore") {
            continue;
        }
        all_files.push(relative);
    }

    let mut scoped: Vec<PathBuf> = all_files
        .into_iter()
        .filter(|relative| {
            let relative_str = to_forward_slash(relative);

            if relative_str.ends_with(".orig") {
                return false;
            }

            if !includes.is_empty() && !includes.iter().any(|p| include_match(p, &relative_str)) {
                return false;
            }

            if excludes.iter().any(|p| glob_match(p, &relative_str)) {
                return false;
            }

            let force_included = force_include.iter().any(|p| force_include_match(p, &relative_str));
            if !force_included && ignore.is_ignored(&relative_str) {
                return false;
            }

            true
        })
        .collect();

    scoped.sort();
    scoped.dedup();
    Ok(scoped)
}

/// Distinguish "scoped to an explicit set of files" from "target is a
/// directory" (spec §4.4): `include_files` entries that name an existing
/// file directly (rather than a glob) are treated as anchors.
pub fn is_explicit_file_anchor(pattern: &str) -> bool {
    !pattern.contains('*') && !pattern.contains('?')
}

/// Substring match used for `exclude_files` anchors against a normalized,
/// forward-slash path (spec §4.4).
pub fn exclude_anchor_matches(anchor: &str, relative_path: &Path) -> bool {
    to_forward_slash(relative_path).contains(anchor)
}
