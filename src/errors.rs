//! Boundary failures.
//!
//! Compiler passes never fail: they report [`crate::diagnostics::Diagnostic`]
//! values. The errors here come from the edges of the tool, where files are
//! read, configuration is loaded and output is written.

use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::compiler::ExitCode;
use crate::diagnostics::{file_not_found, file_read_error, Diagnostic};

#[derive(Error, MietteDiagnostic, Debug)]
pub enum RclError {
    #[error("file not found: {}", path.display())]
    #[diagnostic(code(rcl::io::not_found), help("Check that the path exists"))]
    NotFound { path: PathBuf },

    #[error("could not read {}", path.display())]
    #[diagnostic(code(rcl::io::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid source document", path.display())]
    #[diagnostic(
        code(rcl::io::decode),
        help("Source documents are JSON objects with an `ast` field")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to walk {}", path.display())]
    #[diagnostic(code(rcl::io::walk))]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid configuration in {}", path.display())]
    #[diagnostic(code(rcl::config))]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("could not write {}", path.display())]
    #[diagnostic(code(rcl::output::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not serialize compiled output")]
    #[diagnostic(code(rcl::output::serialize))]
    Serialize(#[from] serde_json::Error),
}

impl RclError {
    /// Classifies an I/O failure on an input path.
    pub fn read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            RclError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RclError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// The IO diagnostic for input-side failures. Output failures have none:
    /// they happen after compilation and are reported only by exit code.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            RclError::NotFound { path } => Some(file_not_found(&path.display().to_string())),
            RclError::Read { path, source } => Some(file_read_error(
                &path.display().to_string(),
                &source.to_string(),
            )),
            RclError::Decode { path, source } => Some(file_read_error(
                &path.display().to_string(),
                &source.to_string(),
            )),
            RclError::Walk { path, source } => Some(file_read_error(
                &path.display().to_string(),
                &source.to_string(),
            )),
            RclError::Config { path, source } => Some(file_read_error(
                &path.display().to_string(),
                &source.to_string(),
            )),
            RclError::Write { .. } | RclError::Serialize(_) => None,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            RclError::Write { .. } | RclError::Serialize(_) => ExitCode::Output,
            _ => ExitCode::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Category, ErrorCode};

    #[test]
    fn missing_file_becomes_not_found() {
        let err = RclError::read(
            Path::new("agent.ast.json"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, RclError::NotFound { .. }));
        let diag = err.to_diagnostic().unwrap();
        assert_eq!(diag.code, ErrorCode::FileNotFound);
        assert_eq!(diag.category, Category::IO);
        assert_eq!(err.exit_code(), ExitCode::Io);
    }

    #[test]
    fn write_failures_map_to_output_exit_code() {
        let err = RclError::Write {
            path: PathBuf::from("out/agent.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_diagnostic().is_none());
        assert_eq!(err.exit_code(), ExitCode::Output);
        assert_eq!(err.exit_code().code(), 4);
    }
}
