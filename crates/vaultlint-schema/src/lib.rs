//! # vaultlint-schema: Frontmatter Validation Engine
//!
//! Loads the tag vocabulary and the note schema, merges them, and runs the
//! validation pipeline over one metadata record at a time.
//!
//! ## Loading (`loader`)
//!
//! [`load_merged_schema`] reads both configuration files fresh and returns
//! a [`MergedSchema`]. The schema file carries an empty placeholder for the
//! tag enum; the vocabulary is spliced in before the document is compiled.
//!
//! ## Structural Validation (`node`, `structural`)
//!
//! The merged document compiles into a tree of [`Constraint`] nodes that a
//! small recursive evaluator interprets. Conditional requirements keyed on
//! `type` and `subtype` are ordinary `if`/`then` nodes in that tree.
//!
//! ## Field-Level Checkers
//!
//! - [`check_dates`] rejects date-shaped strings that are not dates.
//! - [`check_wiki_links`] rejects `[[ ]]` style links.
//! - [`check_tag_coherence`] warns when tags do not reflect the note type.
//!
//! [`validate_record`] runs all of them in order and returns a
//! [`ValidationReport`].
//!
//! ## Crate Policy
//!
//! - Depends only on `vaultlint-core` internally.
//! - Checkers never fail: malformed input yields findings, never `Err`.
//! - Only configuration loading returns [`vaultlint_core::ConfigError`].

pub mod coherence;
pub mod dates;
pub mod loader;
pub mod node;
pub mod pipeline;
pub mod report;
pub mod structural;
pub mod wiki_links;

pub use coherence::{check_tag_coherence, expected_tag, tag_matches, TYPE_TAG_MAP};
pub use dates::{check_dates, is_iso_date, DATE_FIELDS};
pub use loader::{load_merged_schema, load_schema, load_tags, MergedSchema};
pub use node::{CompileError, Constraint, JsonType, SchemaNode};
pub use pipeline::validate_record;
pub use report::ValidationReport;
pub use structural::{FieldPath, PathSegment, Violation};
pub use wiki_links::{check_wiki_links, LinkArity, WIKI_LINK_FIELDS};
