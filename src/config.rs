//! Project configuration.
//!
//! An optional `rclc.yaml` next to the sources (or passed with `--config`)
//! sets compiler and output defaults. Command-line flags override it.
//!
//! ```yaml
//! compiler:
//!   namingConventions: true
//!   scanDepth: 12
//! output:
//!   format: both
//!   pretty: true
//!   outDir: dist
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::RclError;

/// File name looked up when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "rclc.yaml";

/// Upper bound for the extractor's fallback scan.
pub const MAX_SCAN_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Run the naming-convention pass (warnings and info only).
    pub naming_conventions: bool,
    /// Depth limit of the extractor's fallback scan, capped at [`MAX_SCAN_DEPTH`].
    pub scan_depth: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            naming_conventions: false,
            scan_depth: MAX_SCAN_DEPTH,
        }
    }
}

impl CompilerOptions {
    pub fn effective_scan_depth(&self) -> usize {
        self.scan_depth.min(MAX_SCAN_DEPTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Js,
    Both,
}

impl OutputFormat {
    pub fn wants_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn wants_js(&self) -> bool {
        matches!(self, OutputFormat::Js | OutputFormat::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    /// Directory for compiled files. Defaults to the source's directory.
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    pub compiler: CompilerOptions,
    pub output: OutputOptions,
}

impl ProjectConfig {
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, RclError> {
        // An empty file deserializes as YAML null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| RclError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, RclError> {
        let content = fs::read_to_string(path).map_err(|e| RclError::read(path, e))?;
        Self::from_yaml(&content, path)
    }

    /// Loads `rclc.yaml` from `dir` if present, else the defaults.
    pub fn discover(dir: &Path) -> Result<Self, RclError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "loading project config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
