//! Annotating issues with change context (spec §3, §4.3 step 7, §8).

use crate::core::types::{ChangeContext, Issue};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn canonicalize_best_effort(target: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() { path.to_path_buf() } else { target.join(path) };
    joined.canonicalize().unwrap_or(joined)
}

/// Annotate `issues` in place: for each issue, resolve its file to an
/// absolute path and test membership in the modified-files set; if present,
/// set `change_related=true` and copy the file's modified-line numbers into
/// `lines_modified` (spec §4.3 step 7).
///
/// Falls back to a basename match when the absolute-path resolution is
/// ambiguous, per the single-file-target note in spec §9.
pub fn annotate(issues: &mut [Issue], target: &Path, change: &ChangeContext) {
    let modified_abs: HashSet<PathBuf> = change
        .modified_files
        .iter()
        .map(|p| canonicalize_best_effort(target, p))
        .collect();

    let modified_basenames: HashSet<&std::ffi::OsStr> = change
        .modified_files
        .iter()
        .filter_map(|p| p.file_name())
        .collect();

    for issue in issues.iter_mut() {
        let issue_abs = canonicalize_best_effort(target, &issue.file);
        let matched_file = change
            .modified_files
            .iter()
            .find(|modified| canonicalize_best_effort(target, modified) == issue_abs)
            .cloned()
            .or_else(|| {
                let basename = issue.file.file_name()?;
                if modified_basenames.contains(basename) {
                    change
                        .modified_files
                        .iter()
                        .find(|modified| modified.file_name() == Some(basename))
                        .cloned()
                } else {
                    None
                }
            });

        if modified_abs.contains(&issue_abs) || matched_file.is_some() {
            issue.change_related = true;
            if let Some(modified) = matched_file {
                if let Some(lines) = change.modified_lines.get(&modified) {
                    issue.lines_modified = lines.clone();
                }
            }
        }
    }
}
