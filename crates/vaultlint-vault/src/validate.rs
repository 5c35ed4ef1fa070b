//! # File and Directory Validation
//!
//! [`validate_file`] turns one note into a [`ValidationReport`]. Problems
//! with the file itself (unreadable, no metadata block, unparsable block)
//! become a single error for that file; they never abort a run.
//!
//! [`validate_directory`] loads the configuration, walks a vault and prints
//! a report. Only configuration failures are returned as `Err`.

use std::fmt;
use std::path::{Path, PathBuf};

use vaultlint_core::ConfigError;
use vaultlint_schema::{load_merged_schema, validate_record, MergedSchema, ValidationReport};

use crate::frontmatter::parse_frontmatter;
use crate::walker::DocumentWalker;

/// Validate one note file.
pub fn validate_file(path: &Path, schema: &MergedSchema) -> ValidationReport {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return ValidationReport::single_error(format!("failed to read: {e}")),
    };

    match parse_frontmatter(&text) {
        Ok(Some(record)) => validate_record(&record, schema),
        Ok(None) => ValidationReport::single_error("no frontmatter found"),
        Err(e) => ValidationReport::single_error(format!("failed to parse frontmatter: {e}")),
    }
}

/// Findings for one file that had any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The note, as yielded by the walker.
    pub path: PathBuf,
    /// What was found.
    pub report: ValidationReport,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}:", self.path.display())?;
        for e in &self.report.errors {
            writeln!(f, "  ERROR  {e}")?;
        }
        for w in &self.report.warnings {
            writeln!(f, "  WARN   {w}")?;
        }
        Ok(())
    }
}

/// Outcome of validating a whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryReport {
    /// Notes validated.
    pub files_checked: usize,
    /// Per-file findings, in walk order. Clean files are omitted.
    pub files: Vec<FileReport>,
}

impl DirectoryReport {
    /// Total errors across all files.
    pub fn total_errors(&self) -> usize {
        self.files.iter().map(|f| f.report.errors.len()).sum()
    }

    /// Total warnings across all files.
    pub fn total_warnings(&self) -> usize {
        self.files.iter().map(|f| f.report.warnings.len()).sum()
    }

    /// `(errors, warnings)`.
    pub fn totals(&self) -> (usize, usize) {
        (self.total_errors(), self.total_warnings())
    }
}

impl fmt::Display for DirectoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(f, "{file}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(
            f,
            "Files: {}  Errors: {}  Warnings: {}",
            self.files_checked,
            self.total_errors(),
            self.total_warnings()
        )
    }
}

/// Validate every note under `root` against an already-loaded schema.
pub fn validate_tree(root: &Path, schema: &MergedSchema) -> DirectoryReport {
    let mut summary = DirectoryReport::default();

    for path in DocumentWalker::new(root).paths() {
        summary.files_checked += 1;
        let report = validate_file(&path, schema);
        tracing::debug!(
            path = %path.display(),
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validated note"
        );
        if !report.is_clean() {
            summary.files.push(FileReport { path, report });
        }
    }

    summary
}

/// Load the tag vocabulary and schema, validate every note under `root`,
/// and print the report to stdout.
///
/// # Errors
///
/// Returns [`ConfigError`] if either configuration file cannot be loaded.
/// Individual notes never cause an `Err`.
pub fn validate_directory(
    root: &Path,
    schema_path: &Path,
    tags_path: &Path,
) -> Result<DirectoryReport, ConfigError> {
    let schema = load_merged_schema(schema_path, tags_path)?;
    let summary = validate_tree(root, &schema);
    print!("{summary}");

    let (errors, warnings) = summary.totals();
    tracing::info!(
        root = %root.display(),
        files = summary.files_checked,
        errors,
        warnings,
        "validation complete"
    );
    Ok(summary)
}
