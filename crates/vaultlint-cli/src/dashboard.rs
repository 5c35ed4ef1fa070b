//! # Dashboard Subcommand
//!
//! Generates `Dashboard.md` from an ordered list of sections, each a label
//! and a tag. Every section becomes a heading followed by a `dataview`
//! query over notes carrying that tag.
//!
//! ```bash
//! # Write vault/Dashboard.md:
//! vaultlint dashboard
//!
//! # Exit 1 if the file on disk differs from what would be generated:
//! vaultlint dashboard --check
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::{resolve_output_path, resolve_path};

/// Arguments for the dashboard subcommand.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Check that the dashboard matches the generated content instead of
    /// writing it.
    #[arg(long)]
    pub check: bool,

    /// Path to the section config JSON.
    #[arg(long, default_value = "dashboard_sections.json")]
    pub config: PathBuf,

    /// Path to the dashboard file.
    #[arg(long, default_value = "vault/Dashboard.md")]
    pub output: PathBuf,
}

/// One dashboard section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardSection {
    /// Heading text.
    pub label: String,
    /// Tag queried, without the leading `#`.
    pub tag: String,
}

/// Read the section list from a JSON file.
pub fn load_sections(path: &Path) -> Result<Vec<DashboardSection>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading dashboard config: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing dashboard config: {}", path.display()))
}

/// Render the dashboard.
pub fn generate_dashboard(sections: &[DashboardSection]) -> String {
    let blocks: Vec<String> = sections
        .iter()
        .map(|section| {
            format!(
                "## {label}\n\
                 ```dataview\n\
                 \n\
                 TABLE status, revised, revision\n\
                 \n\
                 FROM #{tag}\n\
                 \n\
                 WHERE status != \"archived\"\n\
                 \n\
                 SORT revised DESC\n\
                 \n\
                 ```",
                label = section.label,
                tag = section.tag,
            )
        })
        .collect();
    format!("{}\n", blocks.join("\n\n"))
}

/// Whether the file at `output` holds exactly the generated dashboard.
///
/// A missing file is out of date.
pub fn check_dashboard(sections: &[DashboardSection], output: &Path) -> Result<bool> {
    let expected = generate_dashboard(sections);
    match std::fs::read_to_string(output) {
        Ok(actual) => Ok(actual == expected),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("reading dashboard: {}", output.display())),
    }
}

/// Execute the dashboard subcommand.
pub fn run_dashboard(args: &DashboardArgs, repo_root: &Path) -> Result<u8> {
    let config = resolve_path(&args.config, repo_root);
    let output = resolve_output_path(&args.output, repo_root);
    let sections = load_sections(&config)?;

    tracing::debug!(
        config = %config.display(),
        output = %output.display(),
        sections = sections.len(),
        "rendering dashboard"
    );

    if args.check {
        if check_dashboard(&sections, &output)? {
            println!("Dashboard.md is up to date.");
            Ok(0)
        } else {
            println!("Dashboard.md is out of date. Run 'vaultlint dashboard' to regenerate.");
            Ok(1)
        }
    } else {
        std::fs::write(&output, generate_dashboard(&sections))
            .with_context(|| format!("writing dashboard: {}", output.display()))?;
        println!("Wrote {}", output.display());
        Ok(0)
    }
}
