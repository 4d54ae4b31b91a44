//! User-facing output for the CLI: colored status lines and the compiled
//! artifacts written to disk.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::compiler::CompiledAgent;
use crate::config::OutputFormat;
use crate::errors::RclError;

// ============================================================================
// TERMINAL
// ============================================================================

/// Color is used only when asked for and stderr is a terminal.
pub fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !atty::is(atty::Stream::Stderr) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

impl Status {
    fn color(self) -> Color {
        match self {
            Status::Ok => Color::Green,
            Status::Warn => Color::Yellow,
            Status::Fail => Color::Red,
        }
    }
}

/// Prints `label message` to stderr with a bold, colored label.
pub fn print_status(choice: ColorChoice, status: Status, label: &str, message: &str) {
    let mut stderr = StandardStream::stderr(choice);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(status.color())).set_bold(true));
    let _ = write!(stderr, "{label:>12}");
    let _ = stderr.reset();
    let _ = writeln!(stderr, " {message}");
}

/// Prints a boundary error with its cause chain.
pub fn print_error(choice: ColorChoice, error: &RclError) {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    print_status(choice, Status::Fail, "error", &message);
}

// ============================================================================
// ARTIFACTS
// ============================================================================

pub fn to_json(value: &impl serde::Serialize, pretty: bool) -> Result<String, RclError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

/// Renders the compiled agent as an ES module.
///
/// ```js
/// export const agent = { ... };
/// export const messages = { ... };
/// export const flows = { ... };
/// export default { agent, messages, flows };
/// ```
pub fn to_javascript(compiled: &CompiledAgent) -> Result<String, RclError> {
    let agent = serde_json::to_string_pretty(&compiled.agent)?;
    let messages = serde_json::to_string_pretty(&compiled.messages)?;
    let flows = serde_json::to_string_pretty(&compiled.flows)?;
    Ok(format!(
        "// Generated by rclc. Do not edit.\n\n\
         export const agent = {agent};\n\n\
         export const messages = {messages};\n\n\
         export const flows = {flows};\n\n\
         export default {{ agent, messages, flows }};\n"
    ))
}

/// Writes the requested artifacts for one compiled source into `dir`.
/// Returns the written paths.
pub fn write_artifacts(
    compiled: &CompiledAgent,
    dir: &Path,
    stem: &str,
    format: OutputFormat,
    pretty: bool,
) -> Result<Vec<PathBuf>, RclError> {
    fs::create_dir_all(dir).map_err(|source| RclError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    if format.wants_json() {
        let path = dir.join(format!("{stem}.json"));
        write_file(&path, &to_json(compiled, pretty)?)?;
        written.push(path);
    }
    if format.wants_js() {
        let path = dir.join(format!("{stem}.js"));
        write_file(&path, &to_javascript(compiled)?)?;
        written.push(path);
    }
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<(), RclError> {
    tracing::debug!(path = %path.display(), bytes = content.len(), "writing artifact");
    fs::write(path, content).map_err(|source| RclError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentConfig;
    use indexmap::IndexMap;

    fn compiled() -> CompiledAgent {
        CompiledAgent {
            agent: AgentConfig {
                name: "Coffee".into(),
                display_name: "Coffee Shop".into(),
                description: None,
                properties: IndexMap::new(),
            },
            messages: IndexMap::new(),
            flows: IndexMap::new(),
        }
    }

    #[test]
    fn javascript_module_exports_all_parts() {
        let js = to_javascript(&compiled()).unwrap();
        assert!(js.contains("export const agent = {"));
        assert!(js.contains("\"displayName\": \"Coffee Shop\""));
        assert!(js.contains("export const messages = {};"));
        assert!(js.ends_with("export default { agent, messages, flows };\n"));
    }

    #[test]
    fn writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let written =
            write_artifacts(&compiled(), dir.path(), "coffee", OutputFormat::Both, false).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join("coffee.json"), dir.path().join("coffee.js")]
        );
        let json = fs::read_to_string(dir.path().join("coffee.json")).unwrap();
        assert!(json.starts_with("{\"agent\":"));
    }
}
