pub mod naming;
pub mod semantic;

// Re-exports for concise imports
pub use naming::check_naming_conventions;
pub use semantic::validate_document;

use crate::diagnostics::{has_errors, Diagnostic};

/// The owned output of a validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

/// Sink for findings while a pass walks the tree.
pub trait ValidationReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl ValidationReporter for ValidationResult {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no error-severity diagnostic was reported.
    pub fn is_valid(&self) -> bool {
        !has_errors(&self.diagnostics)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
