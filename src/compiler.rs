//! Compilation orchestration.
//!
//! [`Compiler::compile`] runs the validator, the extractor and the flow
//! compiler over one document, merges their diagnostics behind the parser's,
//! and decides success. It is the only place where "diagnostics exist"
//! becomes a yes/no answer.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::agent::{extract_agent, AgentConfig};
use crate::ast::{kinds, Document};
use crate::config::CompilerOptions;
use crate::diagnostics::{
    empty_messages_section, has_errors, internal_error, sort_diagnostics, Category, Diagnostic,
};
use crate::extraction::content::NormalizedContent;
use crate::extraction::{extract_messages, ExtractOptions, ExtractionResult};
use crate::flow::{compile_flows, FlowDefinition};
use crate::validation::{check_naming_conventions, validate_document};

// ============================================================================
// INPUT / OUTPUT TYPES
// ============================================================================

/// One parsed document as handed over by the parsing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub ast: Document,
    /// Parse-level diagnostics, merged ahead of the compiler's own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    /// Original source text, used only to render snippets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SourceDocument {
    pub fn new(ast: Document) -> Self {
        Self {
            uri: None,
            ast,
            diagnostics: Vec::new(),
            source: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_parse_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// The final artifact of a successful compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledAgent {
    pub agent: AgentConfig,
    pub messages: IndexMap<String, NormalizedContent>,
    pub flows: IndexMap<String, FlowDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationResult {
    /// True iff no error-severity diagnostic was produced.
    pub success: bool,
    /// Sorted by file, line, column.
    pub diagnostics: Vec<Diagnostic>,
    /// Present iff `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CompiledAgent>,
}

impl CompilationResult {
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::for_diagnostics(&self.diagnostics)
    }
}

// ============================================================================
// EXIT CODES
// ============================================================================

/// Process exit codes for the command-line boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Syntax,
    Semantic,
    Io,
    Output,
    Usage,
    Internal,
}

impl ExitCode {
    pub const fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Syntax => 1,
            ExitCode::Semantic => 2,
            ExitCode::Io => 3,
            ExitCode::Output => 4,
            ExitCode::Usage => 64,
            ExitCode::Internal => 70,
        }
    }

    /// Rank used when several failures compete for the exit code.
    const fn precedence(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Semantic => 1,
            ExitCode::Syntax => 2,
            ExitCode::Output => 3,
            ExitCode::Io => 4,
            ExitCode::Usage => 5,
            ExitCode::Internal => 6,
        }
    }

    /// The more severe of two exit codes.
    pub fn worst(self, other: ExitCode) -> ExitCode {
        if other.precedence() > self.precedence() {
            other
        } else {
            self
        }
    }

    /// Maps error-severity diagnostics to an exit code.
    ///
    /// Internal beats IO, IO beats Syntax, and Syntax beats the
    /// semantic-family categories. Warnings and info never count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rcl_compiler::compiler::ExitCode;
    /// use rcl_compiler::diagnostics::{missing_display_name, missing_identifier};
    ///
    /// let both = vec![missing_display_name("A", None), missing_identifier("flow", None)];
    /// assert_eq!(ExitCode::for_diagnostics(&both), ExitCode::Syntax);
    /// assert_eq!(ExitCode::for_diagnostics(&[]), ExitCode::Success);
    /// ```
    pub fn for_diagnostics(diagnostics: &[Diagnostic]) -> ExitCode {
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| match d.category {
                Category::Internal => ExitCode::Internal,
                Category::IO => ExitCode::Io,
                Category::Syntax => ExitCode::Syntax,
                Category::Semantic
                | Category::Reference
                | Category::Type
                | Category::Validation => ExitCode::Semantic,
            })
            .fold(ExitCode::Success, ExitCode::worst)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compiles one document.
    ///
    /// The passes only read the document, and each returns its own result;
    /// the compiled output is assembled only when no error was reported.
    #[tracing::instrument(skip_all, fields(uri = input.uri.as_deref().unwrap_or("<memory>")))]
    pub fn compile(&self, input: &SourceDocument) -> CompilationResult {
        let doc = &input.ast;

        let mut diagnostics = input.diagnostics.clone();
        diagnostics.extend(validate_document(doc).into_diagnostics());
        if self.options.naming_conventions {
            diagnostics.extend(check_naming_conventions(doc).into_diagnostics());
        }

        let extraction = extract_messages(
            doc,
            &ExtractOptions {
                scan_depth: self.options.effective_scan_depth(),
            },
        );
        let flows = compile_flows(doc);
        diagnostics.extend(empty_message_sections(doc));

        let data = if has_errors(&diagnostics) {
            None
        } else {
            assemble(doc, extraction, flows, &mut diagnostics)
        };

        if let Some(uri) = &input.uri {
            for diagnostic in &mut diagnostics {
                diagnostic.file.get_or_insert_with(|| uri.clone());
            }
        }
        sort_diagnostics(&mut diagnostics);

        let success = data.is_some();
        tracing::debug!(
            success,
            diagnostics = diagnostics.len(),
            "compilation finished"
        );
        CompilationResult {
            success,
            diagnostics,
            data,
        }
    }

    /// Compiles independent documents in parallel. Results keep input order.
    pub fn compile_workspace(&self, inputs: &[SourceDocument]) -> Vec<CompilationResult> {
        inputs.par_iter().map(|input| self.compile(input)).collect()
    }
}

/// A `messages` section that declares no message is a boundary error here,
/// not a validator finding.
fn empty_message_sections(doc: &Document) -> Vec<Diagnostic> {
    doc.gather(kinds::MESSAGES)
        .into_iter()
        .filter(|section| {
            !section
                .child_sections()
                .any(|s| kinds::is_message_tag(&s.section_type))
        })
        .map(|section| empty_messages_section(section.range))
        .collect()
}

/// Builds the artifact and checks the invariants validation promises.
/// A broken invariant is a compiler defect, reported as an internal error.
fn assemble(
    doc: &Document,
    extraction: ExtractionResult,
    flows: IndexMap<String, FlowDefinition>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<CompiledAgent> {
    let mut sound = true;

    for (id, flow) in &flows {
        if !flow.has_valid_initial() {
            diagnostics.push(internal_error(
                &format!(
                    "flow '{id}' compiled with initial state '{}' that it does not declare",
                    flow.initial
                ),
                None,
            ));
            sound = false;
        }
    }

    let agent = extract_agent(doc);
    if agent.is_none() {
        diagnostics.push(internal_error("validated document has no agent section", None));
        sound = false;
    }

    let mut messages = IndexMap::new();
    for message in extraction.messages {
        messages.entry(message.id).or_insert(message.content);
    }

    match agent {
        Some(agent) if sound => Some(CompiledAgent {
            agent,
            messages,
            flows,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{file_not_found, internal_error, missing_display_name, Severity};

    #[test]
    fn exit_code_precedence() {
        let semantic = missing_display_name("A", None);
        let io = file_not_found("x");
        let internal = internal_error("boom", None);
        assert_eq!(
            ExitCode::for_diagnostics(&[semantic.clone(), io.clone()]),
            ExitCode::Io
        );
        assert_eq!(
            ExitCode::for_diagnostics(&[io, internal, semantic.clone()]),
            ExitCode::Internal
        );
        assert_eq!(
            ExitCode::for_diagnostics(&[semantic.with_severity(Severity::Warning)]),
            ExitCode::Success
        );
    }

    #[test]
    fn codes_match_the_cli_contract() {
        let codes: Vec<u8> = [
            ExitCode::Success,
            ExitCode::Syntax,
            ExitCode::Semantic,
            ExitCode::Io,
            ExitCode::Output,
            ExitCode::Usage,
            ExitCode::Internal,
        ]
        .iter()
        .map(|c| c.code())
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 64, 70]);
    }
}
