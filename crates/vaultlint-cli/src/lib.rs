//! # vaultlint-cli: Command-Line Interface
//!
//! Provides the `vaultlint` binary.
//!
//! ## Subcommands
//!
//! - `vaultlint validate`: Validate note frontmatter across a vault.
//! - `vaultlint dashboard`: Generate `Dashboard.md`, or check that it is
//!   current.
//!
//! ```bash
//! vaultlint validate
//! vaultlint validate vault/research --schema meta_schema.yml --tags meta_tags.yml
//! vaultlint dashboard --check
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation logic lives in the library
//!   crates.
//! - Handlers return the process exit code: 0 on success, 1 on findings.

pub mod dashboard;
pub mod validate;

use std::path::{Path, PathBuf};

/// File whose presence marks the repository root.
pub const REPO_ROOT_MARKER: &str = "meta_schema.yml";

/// Resolve a path that may be relative to the repository root.
///
/// If the path is absolute, returns it as-is. If relative and the file
/// exists relative to `repo_root`, uses that. Otherwise returns the path
/// relative to the current directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}

/// Resolve a path for a file that may not exist yet.
///
/// Relative paths land under `repo_root` when their parent directory exists
/// there.
pub fn resolve_output_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    match repo_relative.parent() {
        Some(parent) if parent.is_dir() => repo_relative,
        _ => path.to_path_buf(),
    }
}

/// Walk up from `start` to the first directory holding [`REPO_ROOT_MARKER`].
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(REPO_ROOT_MARKER).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_path_absolute_path_returned_as_is() {
        let result = resolve_path(Path::new("/absolute/vault"), Path::new("/some/repo"));
        assert_eq!(result, PathBuf::from("/absolute/vault"));
    }

    #[test]
    fn resolve_path_prefers_repo_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("meta_tags.yml"), b"plan: Plans\n").unwrap();
        let result = resolve_path(Path::new("meta_tags.yml"), dir.path());
        assert_eq!(result, dir.path().join("meta_tags.yml"));
    }

    #[test]
    fn resolve_path_falls_back_to_relative() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_path(Path::new("nonexistent.yml"), dir.path());
        assert_eq!(result, PathBuf::from("nonexistent.yml"));
    }

    #[test]
    fn resolve_output_path_uses_existing_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vault")).unwrap();
        let result = resolve_output_path(Path::new("vault/Dashboard.md"), dir.path());
        assert_eq!(result, dir.path().join("vault/Dashboard.md"));

        let result = resolve_output_path(Path::new("elsewhere/Dashboard.md"), dir.path());
        assert_eq!(result, PathBuf::from("elsewhere/Dashboard.md"));
    }

    #[test]
    fn find_repo_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPO_ROOT_MARKER), b"type: object\n").unwrap();
        let nested = dir.path().join("vault/research");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_repo_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_repo_root_none_without_marker() {
        // Relative ancestors end at the test's working directory, the crate
        // directory, which holds no marker.
        assert!(!Path::new(REPO_ROOT_MARKER).exists());
        assert_eq!(find_repo_root(Path::new("no-such-vault/research")), None);
    }
}
