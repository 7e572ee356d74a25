//! Directory sharding for the code scanner (spec §4.5, §9): enumerate
//! package directories so a multi-module repo can be scanned in bounded
//! parallel chunks instead of one monolithic invocation.

use crate::scoping::ignore_file::LayeredIgnore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories always excluded from shard discovery regardless of the
/// ignore-pattern heuristic in use (spec §9 open question: "the spec treats
/// the exact heuristic as unspecified but requires that standard noise
/// directories ... are always excluded").
const ALWAYS_EXCLUDED: &[&str] = &[".git", "vendor", "node_modules", "target", "dist", "build", ".venv"];

fn is_always_excluded(dir_name: &str) -> bool {
    ALWAYS_EXCLUDED.contains(&dir_name)
}

/// A single manifest filename that marks a directory as a shard root. The
/// core treats "package directory" generically: any directory containing
/// one of these is a shard boundary, mirroring a Go-style multi-module
/// layout (one `go.mod` per sub-project) without hard-coding a single
/// ecosystem.
const MANIFEST_MARKERS: &[&str] = &["go.mod", "Cargo.toml", "package.json", "pyproject.toml"];

/// Enumerate shard root directories under `root`, honoring the layered
/// ignore matcher and always-excluded noise directories (spec §4.5, §9).
/// `root` itself is always included as a shard even if it carries no
/// manifest marker, so single-module repos still get exactly one shard.
pub fn discover_shards(root: &Path, no_ignore: bool) -> Vec<PathBuf> {
    let ignore = if no_ignore { LayeredIgnore::empty() } else { LayeredIgnore::load(root) };

    let mut shards: HashSet<PathBuf> = HashSet::new();
    shards.insert(PathBuf::from("."));

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !is_always_excluded(&name)
        })
    {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else { continue };
        if !MANIFEST_MARKERS.contains(&name) {
            continue;
        }
        let Some(parent) = entry.path().parent() else { continue };
        let Ok(relative) = parent.strip_prefix(root) else { continue };
        let relative_str = relative.to_string_lossy().replace('\\', "/");
        if !no_ignore && !relative_str.is_empty() && ignore.is_ignored(&relative_str) {
            continue;
        }
        let shard = if relative.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            relative.to_path_buf()
        };
        shards.insert(shard);
    }

    let mut shards: Vec<PathBuf> = shards.into_iter().collect();
    shards.sort();
    shards
}

/// When scoping to specific include files, reduce shards to the
/// directories containing those files (spec §4.5: "prevents dir-level
/// noise").
pub fn shards_for_include_files(root: &Path, include_files: &[PathBuf]) -> Vec<PathBuf> {
    let mut shards: HashSet<PathBuf> = HashSet::new();
    for file in include_files {
        let absolute = if file.is_absolute() { file.clone() } else { root.join(file) };
        let parent = absolute.parent().unwrap_or(root);
        let relative = parent.strip_prefix(root).unwrap_or(parent).to_path_buf();
        let shard = if relative.as_os_str().is_empty() { PathBuf::from(".") } else { relative };
        shards.insert(shard);
    }
    let mut shards: Vec<PathBuf> = shards.into_iter().collect();
    shards.sort();
    shards
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn single_module_repo_yields_root_shard() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "main.go", "package main");
        let shards = discover_shards(tmp.path(), false);
        assert_eq!(shards, vec![PathBuf::from(".")]);
    }

    #[test]
    fn multi_module_repo_yields_one_shard_per_manifest() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "go.mod", "module root");
        write(tmp.path(), "services/api/go.mod", "module api");
        write(tmp.path(), "services/worker/go.mod", "module worker");
        let shards = discover_shards(tmp.path(), false);
        assert_eq!(
            shards,
            vec![
                PathBuf::from("."),
                PathBuf::from("services/api"),
                PathBuf::from("services/worker"),
            ]
        );
    }

    #[test]
    fn noise_directories_are_always_excluded() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "go.mod", "module root");
        write(tmp.path(), "vendor/pkg/go.mod", "module vendored");
        write(tmp.path(), "node_modules/dep/package.json", "{}");
        let shards = discover_shards(tmp.path(), false);
        assert_eq!(shards, vec![PathBuf::from(".")]);
    }

    #[test]
    fn ignored_directories_are_excluded_unless_no_ignore() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), ".goneatignore", "generated/\n");
        write(tmp.path(), "go.mod", "module root");
        write(tmp.path(), "generated/go.mod", "module generated");

        let shards = discover_shards(tmp.path(), false);
        assert_eq!(shards, vec![PathBuf::from(".")]);

        let shards = discover_shards(tmp.path(), true);
        assert_eq!(shards, vec![PathBuf::from("."), PathBuf::from("generated")]);
    }

    #[test]
    fn include_files_reduce_shards_to_their_directories() {
        let tmp = TempDir::new().unwrap();
        let include = vec![PathBuf::from("services/api/main.go")];
        let shards = shards_for_include_files(tmp.path(), &include);
        assert_eq!(shards, vec![PathBuf::from("services/api")]);
    }
}
