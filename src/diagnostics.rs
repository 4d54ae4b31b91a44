//! RCL Diagnostics - the shared vocabulary of compiler findings.
//!
//! Every pass reports problems as [`Diagnostic`] values instead of returning
//! errors: a diagnostic never interrupts a pass, and only `error` severity can
//! fail a compilation. Construction goes through the factory functions in
//! [`builders`], which always fill a hint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Range;

pub mod builders;
pub mod codes;

pub use builders::*;
pub use codes::{Category, ErrorCode};

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// A literal edit that resolves a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickFix {
    pub label: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

/// One problem found during compilation.
///
/// # Examples
///
/// ```rust
/// use rcl_compiler::diagnostics::{missing_display_name, Category, ErrorCode, Severity};
/// let diag = missing_display_name("Coffee", None);
/// assert_eq!(diag.code, ErrorCode::MissingDisplayName);
/// assert_eq!(diag.category, Category::Semantic);
/// assert_eq!(diag.severity, Severity::Error);
/// assert!(diag.hint.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub category: Category,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_fixes: Vec<QuickFix>,
}

/// The reduced shape for collaborators that only show a message at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalDiagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub severity: Severity,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Diagnostic {
    /// An error-severity diagnostic whose category follows from `code`.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category: code.category(),
            code,
            message: message.into(),
            range: None,
            file: None,
            hint: None,
            quick_fixes: Vec::new(),
        }
    }

    pub fn at(mut self, range: Option<Range>) -> Self {
        self.range = range;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_fix(mut self, label: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.quick_fixes.push(QuickFix {
            label: label.into(),
            replacement: replacement.into(),
            range: self.range,
        });
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn to_minimal(&self) -> MinimalDiagnostic {
        MinimalDiagnostic {
            message: self.message.clone(),
            range: self.range,
            severity: self.severity,
        }
    }

    fn sort_key(&self) -> (&str, usize, usize) {
        let (line, column) = self
            .range
            .map(|r| (r.start.line, r.start.column))
            .unwrap_or((0, 0));
        (self.file.as_deref().unwrap_or(""), line, column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(range) = self.range {
            write!(f, " (line {}, col {})", range.start.line, range.start.column)?;
        }
        Ok(())
    }
}

/// Sorts diagnostics by file, then start line, then start column.
///
/// The sort is stable, so diagnostics at the same location keep the order in
/// which they were reported. Diagnostics without a range sort first.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// True if any diagnostic has error severity.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;
    use crate::ast::Range;

    fn at(line: usize, column: usize, code: ErrorCode) -> Diagnostic {
        Diagnostic::new(code, format!("{line}:{column}")).at(Some(Range::point(line, column)))
    }

    #[test]
    fn sorting_is_by_file_line_column_and_stable() {
        let mut diags = vec![
            at(5, 1, ErrorCode::EmptyFlowSection),
            at(2, 9, ErrorCode::MissingFlowStart),
            Diagnostic::new(ErrorCode::MissingRequiredField, "no range"),
            at(2, 3, ErrorCode::UndefinedStateReference),
            at(2, 3, ErrorCode::DuplicateDefinition),
            at(1, 1, ErrorCode::InternalError).in_file("b.rcl"),
        ];
        sort_diagnostics(&mut diags);
        let codes: Vec<_> = diags.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes,
            vec!["RCL101", "RCL201", "RCL102", "RCL106", "RCL105", "RCL901"]
        );
    }

    #[test]
    fn minimal_keeps_message_range_and_severity() {
        let diag = at(3, 4, ErrorCode::MissingFlowStart)
            .with_severity(Severity::Warning)
            .with_hint("ignored");
        let minimal = diag.to_minimal();
        assert_eq!(minimal.message, "3:4");
        assert_eq!(minimal.range, Some(Range::point(3, 4)));
        assert_eq!(minimal.severity, Severity::Warning);
    }

    #[test]
    fn serializes_in_camel_case_with_stable_code() {
        let diag = missing_flow_start("Order", Some(Range::point(4, 1)));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["code"], "RCL106");
        assert_eq!(json["category"], "Semantic");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["quickFixes"][0]["label"], "Add start state");
    }

    #[test]
    fn display_includes_code_and_location() {
        let diag = at(7, 2, ErrorCode::MissingDisplayName);
        assert_eq!(diag.to_string(), "error[RCL104]: 7:2 (line 7, col 2)");
    }
}
