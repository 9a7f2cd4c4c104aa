//! Finding the documents a run should touch.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use mdmend_types::{MendError, Result};

/// Walks directories for files with the wanted extensions, skipping
/// directories whose name matches an exclude glob.
pub struct Discovery {
    excludes: GlobSet,
    extensions: Vec<String>,
}

impl Discovery {
    pub fn new(exclude_dirs: &[String], extensions: &[&str]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_dirs {
            let glob = Glob::new(pattern)
                .map_err(|e| MendError::Settings(format!("bad exclude pattern '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let excludes = builder
            .build()
            .map_err(|e| MendError::Settings(format!("exclude patterns: {e}")))?;
        Ok(Self {
            excludes,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        })
    }

    /// Files under `inputs`, sorted and without duplicates. Files named
    /// directly are taken as-is, whatever their extension.
    pub fn collect(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        for input in inputs {
            let meta = fs::metadata(input)?;
            if meta.is_dir() {
                self.walk(input, &mut found)?;
            } else {
                found.push(input.clone());
            }
        }
        found.sort();
        found.dedup();
        Ok(found)
    }

    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if self.is_excluded(&path) {
                    tracing::debug!(path = %path.display(), "Skipping excluded directory");
                    continue;
                }
                self.walk(&path, found)?;
            } else if self.wants(&path) && path.is_file() {
                found.push(path);
            }
        }
        Ok(())
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        dir.file_name().is_some_and(|name| self.excludes.is_match(name))
    }

    fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x\n").unwrap();
    }

    fn excludes(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn finds_markdown_sorted_and_skips_excluded() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "b.md");
        touch(root, "a.MD");
        touch(root, "notes.txt");
        touch(root, "docs/guide.md");
        touch(root, "node_modules/pkg/readme.md");
        touch(root, ".git/info.md");

        let discovery = Discovery::new(&excludes(&["node_modules", ".git"]), &["md"]).unwrap();
        let files = discovery.collect(&[root.to_path_buf()]).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a.MD", "b.md", "docs/guide.md"]);
    }

    #[test]
    fn exclude_patterns_are_globs() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "vendor-x/a.md");
        touch(dir.path(), "keep/b.md");
        let discovery = Discovery::new(&excludes(&["vendor*"]), &["md"]).unwrap();
        let files = discovery.collect(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![dir.path().join("keep/b.md")]);
    }

    #[test]
    fn explicit_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "script.txt");
        let file = dir.path().join("script.txt");
        let discovery = Discovery::new(&[], &["md"]).unwrap();
        assert_eq!(discovery.collect(&[file.clone(), file.clone()]).unwrap(), vec![file]);
    }

    #[test]
    fn extra_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "run.ps1");
        touch(dir.path(), "readme.md");
        let discovery = Discovery::new(&[], &["md", "ps1"]).unwrap();
        assert_eq!(discovery.collect(&[dir.path().to_path_buf()]).unwrap().len(), 2);
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let discovery = Discovery::new(&[], &["md"]).unwrap();
        assert!(discovery.collect(&[dir.path().join("absent")]).is_err());
    }

    #[test]
    fn bad_glob_is_rejected() {
        assert!(Discovery::new(&excludes(&["[unclosed"]), &["md"]).is_err());
    }
}
