//! Error and warning channels produced for one document.

/// Findings for a single document.
///
/// `errors` mean the document is non-compliant. `warnings` flag likely
/// metadata drift and never fail a run on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Must-fix findings, each prefixed by a field path.
    pub errors: Vec<String>,
    /// Advisory findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// A report holding a single error and no warnings.
    pub fn single_error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    /// True when there are neither errors nor warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Append another report's findings, keeping their order.
    pub fn absorb(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
