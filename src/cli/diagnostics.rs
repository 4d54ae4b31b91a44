//! Terminal rendering of compiler diagnostics.
//!
//! Diagnostics carry 1-based line/column ranges. When the source text is
//! known, the range is turned into a byte span and miette draws a snippet;
//! otherwise only the header, location and hint are shown.

use std::fmt;

use miette::{
    GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode, SourceSpan,
};

use crate::ast::{Position, Range};
use crate::diagnostics::{Diagnostic, Severity};

// ============================================================================
// REPORT ADAPTER
// ============================================================================

/// Adapts a [`Diagnostic`] to miette's reporting protocol.
#[derive(Debug)]
pub struct DiagnosticReport<'a> {
    diagnostic: &'a Diagnostic,
    source: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
}

impl<'a> DiagnosticReport<'a> {
    pub fn new(diagnostic: &'a Diagnostic, source: Option<&str>) -> Self {
        let name = diagnostic.file.clone().unwrap_or_else(|| "<input>".into());
        let span = match (source, diagnostic.range) {
            (Some(text), Some(range)) => to_span(text, range),
            _ => None,
        };
        let source = match (source, span) {
            (Some(text), Some(_)) => Some(NamedSource::new(name, text.to_string())),
            _ => None,
        };
        Self {
            diagnostic,
            source,
            span,
        }
    }
}

impl fmt::Display for DiagnosticReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic.message)?;
        // Without a snippet the location would be lost.
        if self.span.is_none() {
            if let Some(range) = self.diagnostic.range {
                write!(f, " (line {}, col {})", range.start.line, range.start.column)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticReport<'_> {}

impl miette::Diagnostic for DiagnosticReport<'_> {
    fn code<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        Some(Box::new(format!(
            "{}::{}",
            self.diagnostic.code.as_str(),
            self.diagnostic.code.name()
        )))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diagnostic.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        })
    }

    fn help<'b>(&'b self) -> Option<Box<dyn fmt::Display + 'b>> {
        let hint = self.diagnostic.hint.as_deref()?;
        match self.diagnostic.quick_fixes.first() {
            Some(fix) => Some(Box::new(format!(
                "{hint}\n{}:\n{}",
                fix.label, fix.replacement
            ))),
            None => Some(Box::new(hint)),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source.as_ref().map(|s| s as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some("here".to_string()),
            span,
        ))))
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Renders one diagnostic to a string.
///
/// `source` is the document text, if it travelled with the AST.
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&str>, color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme).with_width(120);
    let report = DiagnosticReport::new(diagnostic, source);
    let mut out = String::new();
    if handler.render_report(&mut out, &report).is_err() {
        // The handler only fails on a broken formatter; fall back to the
        // one-line form.
        return format!("{diagnostic}\n");
    }
    out
}

/// Prints every diagnostic to standard error.
pub fn print_diagnostics(diagnostics: &[Diagnostic], source: Option<&str>, color: bool) {
    for diagnostic in diagnostics {
        eprint!("{}", render_diagnostic(diagnostic, source, color));
    }
}

// ============================================================================
// SPAN CONVERSION
// ============================================================================

/// Converts a 1-based line/column range into a byte span of `source`.
/// A zero-width range still gets a one-character span so it can be labelled.
pub fn to_span(source: &str, range: Range) -> Option<SourceSpan> {
    let start = byte_offset(source, range.start)?;
    let end = byte_offset(source, range.end).unwrap_or(start).max(start);
    let len = if end > start {
        end - start
    } else {
        source[start..].chars().next().map_or(0, char::len_utf8)
    };
    Some(SourceSpan::new(start.into(), len))
}

fn byte_offset(source: &str, position: Position) -> Option<usize> {
    if position.line == 0 {
        return None;
    }
    let mut line_start = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        if index + 1 == position.line {
            let content = line.trim_end_matches(['\n', '\r']);
            let column = position.column.saturating_sub(1);
            let within = content
                .char_indices()
                .nth(column)
                .map_or(content.len(), |(offset, _)| offset);
            return Some(line_start + within);
        }
        line_start += line.len();
    }
    None
}
