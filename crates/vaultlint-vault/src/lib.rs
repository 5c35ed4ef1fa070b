//! # vaultlint-vault: Vault Traversal and Reporting
//!
//! Connects the validation engine in `vaultlint-schema` to files on disk.
//!
//! - [`frontmatter`] extracts the metadata block of a note and resolves
//!   unquoted top-level dates, timestamps and YAML 1.1 booleans.
//! - [`walker`] finds the notes in a vault, honouring hidden and template
//!   directories and the project-folder convention.
//! - [`validate`] runs the pipeline per file and across a tree, producing
//!   the human-readable report.

pub mod frontmatter;
pub mod validate;
pub mod walker;

pub use frontmatter::{parse_frontmatter, resolve_timestamp, split_frontmatter, FrontmatterError};
pub use validate::{validate_directory, validate_file, validate_tree, DirectoryReport, FileReport};
pub use walker::{DocumentWalker, PROJECT_INDEX, SKIP_DIRS, SKIP_FILES};
