//! # Validate Subcommand
//!
//! Validates every note under a vault directory and prints a per-file
//! report followed by totals. Exits 1 when any error was found; warnings
//! alone never fail the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vaultlint_vault::validate_directory;

use crate::resolve_path;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory to validate.
    #[arg(default_value = "vault/")]
    pub directory: PathBuf,

    /// Path to the schema file.
    #[arg(long, default_value = "meta_schema.yml")]
    pub schema: PathBuf,

    /// Path to the tag vocabulary file.
    #[arg(long, default_value = "meta_tags.yml")]
    pub tags: PathBuf,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, repo_root: &Path) -> Result<u8> {
    let directory = resolve_path(&args.directory, repo_root);
    let schema = resolve_path(&args.schema, repo_root);
    let tags = resolve_path(&args.tags, repo_root);

    tracing::debug!(
        directory = %directory.display(),
        schema = %schema.display(),
        tags = %tags.display(),
        "validating vault"
    );

    let summary = validate_directory(&directory, &schema, &tags)
        .with_context(|| format!("loading validation config for {}", directory.display()))?;

    Ok(if summary.total_errors() > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn repo_root() -> PathBuf {
        let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        dir.pop();
        dir.pop();
        dir
    }

    fn args(directory: &Path) -> ValidateArgs {
        ValidateArgs {
            directory: directory.to_path_buf(),
            schema: PathBuf::from("meta_schema.yml"),
            tags: PathBuf::from("meta_tags.yml"),
        }
    }

    #[test]
    fn clean_vault_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("concept.md"),
            "---\ntype: concept\ntags: [concept]\nstatus: draft\ncreated: 2025-01-15\n\
             revised: 2025-01-15\nrevision: 1\nai_generated: true\n---\n",
        )
        .unwrap();
        assert_eq!(run_validate(&args(dir.path()), &repo_root()).unwrap(), 0);
    }

    #[test]
    fn errors_exit_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bare.md"), "# nothing\n").unwrap();
        assert_eq!(run_validate(&args(dir.path()), &repo_root()).unwrap(), 1);
    }

    #[test]
    fn warnings_alone_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("drift.md"),
            "---\ntype: moc\ntags: [galaxy/api]\nstatus: draft\ncreated: 2025-01-15\n\
             revised: 2025-01-15\nrevision: 1\nai_generated: true\n---\n",
        )
        .unwrap();
        assert_eq!(run_validate(&args(dir.path()), &repo_root()).unwrap(), 0);
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = args(dir.path());
        bad.tags = dir.path().join("missing.yml");
        let err = run_validate(&bad, &repo_root()).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yml"));
    }
}
