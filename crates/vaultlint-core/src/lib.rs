//! # vaultlint-core: Foundational Types for vaultlint
//!
//! The leaf of the vaultlint crate graph. Defines the metadata record types
//! that flow between the frontmatter loader and the validation pipeline,
//! plus the configuration error type shared by every loader.
//!
//! ## Key Design Principles
//!
//! 1. **Two record shapes.** A [`RawRecord`] is what the YAML loader hands
//!    over: field values may be native temporal values. A [`Record`] is what
//!    every checker consumes: plain JSON values only. [`preprocess`] is the
//!    single bridge between the two.
//!
//! 2. **Field order is preserved.** Both shapes keep the order in which the
//!    fields appeared in the document.
//!
//! 3. **Configuration failures are typed.** [`ConfigError`] is fatal to a
//!    run; per-document findings are never errors at this layer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vaultlint-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod record;
pub mod temporal;

pub use error::ConfigError;
pub use record::{preprocess, RawRecord, RawValue, Record};
pub use temporal::TemporalValue;
