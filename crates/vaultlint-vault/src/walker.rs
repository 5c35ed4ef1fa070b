//! # Note Discovery
//!
//! Finds the markdown notes under a vault directory, in lexicographic path
//! order.
//!
//! Excluded:
//!
//! - anything under a path segment that starts with `.` or is a skip
//!   directory (`templates`);
//! - files named in the skip-file set (`Dashboard.md`);
//! - every markdown file that shares a directory with an `index.md`, other
//!   than the `index.md` itself. Such a directory is a project folder and
//!   only its index is a note.
//!
//! The walk is two-phase. The first phase collects every candidate and the
//! directories holding an `index.md`; the second filters project siblings.
//! Whether a sibling is excluded therefore never depends on the order in
//! which the directory was read.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[".obsidian", "templates"];

/// File names never treated as notes.
pub const SKIP_FILES: &[&str] = &["Dashboard.md"];

/// Name of the note that represents a project folder.
pub const PROJECT_INDEX: &str = "index.md";

const NOTE_EXTENSION: &str = "md";

/// Enumerates the notes under a root directory.
///
/// Each call to [`DocumentWalker::paths`] walks the tree again, so a walker
/// can be reused.
#[derive(Debug, Clone)]
pub struct DocumentWalker {
    root: PathBuf,
}

impl DocumentWalker {
    /// Walk the tree under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory being walked.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Note paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> {
        let candidates = self.candidates();
        let project_dirs: HashSet<PathBuf> = candidates
            .iter()
            .filter(|p| p.file_name() == Some(OsStr::new(PROJECT_INDEX)))
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect();

        candidates.into_iter().filter(move |path| {
            let is_index = path.file_name() == Some(OsStr::new(PROJECT_INDEX));
            let in_project = path.parent().is_some_and(|dir| project_dirs.contains(dir));
            if in_project && !is_index {
                tracing::debug!(path = %path.display(), "skipping project page");
                return false;
            }
            true
        })
    }

    /// Phase one: every markdown file outside skipped segments.
    fn candidates(&self) -> Vec<PathBuf> {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_segment(e));

        let mut candidates = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_note(entry.path()) {
                        candidates.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("error accessing entry under {}: {e}", self.root.display());
                }
            }
        }
        candidates
    }
}

fn is_skipped_segment(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    let skipped = name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref());
    if skipped {
        tracing::debug!(path = %entry.path().display(), "skipping hidden or excluded path");
    }
    skipped
}

fn is_note(path: &Path) -> bool {
    if path.extension() != Some(OsStr::new(NOTE_EXTENSION)) {
        return false;
    }
    let skipped = path
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| SKIP_FILES.contains(&name));
    if skipped {
        tracing::debug!(path = %path.display(), "skipping generated file");
    }
    !skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# note\n").unwrap();
    }

    fn relative_paths(root: &Path) -> Vec<String> {
        DocumentWalker::new(root)
            .paths()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn lists_notes_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.md");
        touch(dir.path(), "a/z.md");
        touch(dir.path(), "a.md");
        touch(dir.path(), "a/b/c.md");
        assert_eq!(relative_paths(dir.path()), vec!["a/b/c.md", "a/z.md", "a.md", "b.md"]);
    }

    #[test]
    fn ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "note.md");
        touch(dir.path(), "image.png");
        touch(dir.path(), "notes.MD.txt");
        assert_eq!(relative_paths(dir.path()), vec!["note.md"]);
    }

    #[test]
    fn skips_hidden_and_template_directories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".obsidian/workspace.md");
        touch(dir.path(), ".trash/old.md");
        touch(dir.path(), "templates/research.md");
        touch(dir.path(), "nested/templates/plan.md");
        touch(dir.path(), ".hidden.md");
        touch(dir.path(), "kept.md");
        assert_eq!(relative_paths(dir.path()), vec!["kept.md"]);
    }

    #[test]
    fn skips_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Dashboard.md");
        touch(dir.path(), "concepts/Dashboard.md");
        touch(dir.path(), "concepts/real.md");
        assert_eq!(relative_paths(dir.path()), vec!["concepts/real.md"]);
    }

    #[test]
    fn project_folder_yields_only_its_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("projects/sample")).unwrap();
        fs::write(dir.path().join("projects/sample/index.md"), "---\ntype: project\n---\n").unwrap();
        fs::write(dir.path().join("projects/sample/overview.md"), "# Overview\n").unwrap();
        fs::write(dir.path().join("projects/sample/architecture.md"), "# Architecture\n").unwrap();

        assert_eq!(relative_paths(dir.path()), vec!["projects/sample/index.md"]);
    }

    #[test]
    fn project_rule_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "projects/sample/index.md");
        touch(dir.path(), "projects/sample/aaa.md");
        touch(dir.path(), "projects/sample/sub/deep.md");
        touch(dir.path(), "projects/other.md");
        assert_eq!(
            relative_paths(dir.path()),
            vec!["projects/other.md", "projects/sample/index.md", "projects/sample/sub/deep.md"]
        );
    }

    #[test]
    fn walker_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "one.md");
        touch(dir.path(), "two.md");
        let walker = DocumentWalker::new(dir.path());
        let first: Vec<_> = walker.paths().collect();
        let second: Vec<_> = walker.paths().collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let walker = DocumentWalker::new(dir.path().join("absent"));
        assert_eq!(walker.paths().count(), 0);
    }
}
