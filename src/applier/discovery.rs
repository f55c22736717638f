//! # Config File Discovery
//!
//! Finds the `*.yaml` documents directly inside a config directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List `*.yaml` files directly inside `dir`, sorted by file name
///
/// Symlinks are followed. Subdirectories are not descended into and `*.yml` files are
/// ignored.
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_yaml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        let is_yaml = entry.path().extension().is_some_and(|ext| ext == "yaml");
        if entry.file_type().is_file() && is_yaml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_finds_only_top_level_yaml_sorted() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.yaml"), "bindings: []").unwrap();
        fs::write(dir.path().join("a.yaml"), "bindings: []").unwrap();
        fs::write(dir.path().join("c.yml"), "bindings: []").unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.yaml"), "bindings: []").unwrap();

        let files = find_yaml_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.yaml", "b.yaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_follows_symlinked_files() {
        let shared = tempdir().unwrap();
        fs::write(shared.path().join("base.yaml"), "bindings: []").unwrap();
        fs::create_dir(shared.path().join("extra")).unwrap();
        fs::write(shared.path().join("extra").join("nested.yaml"), "bindings: []").unwrap();

        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(shared.path().join("base.yaml"), dir.path().join("base.yaml"))
            .unwrap();
        std::os::unix::fs::symlink(shared.path().join("extra"), dir.path().join("extra.yaml"))
            .unwrap();

        let files = find_yaml_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("base.yaml")]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        assert!(find_yaml_files(dir.path()).unwrap().is_empty());
    }
}
