//! Source discovery and loading.
//!
//! Inputs are parsed documents serialized as JSON (`*.ast.json`). A file
//! path is taken as-is; a directory is walked recursively.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::compiler::SourceDocument;
use crate::errors::RclError;

/// Suffix of parsed source documents.
pub const SOURCE_SUFFIX: &str = ".ast.json";

/// Returns the source documents under `root`.
///
/// The returned list is sorted so that compilation order, and therefore
/// output order, is deterministic.
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>, RclError> {
    if !root.exists() {
        return Err(RclError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| RclError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_source_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered sources");
    Ok(files)
}

pub fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(SOURCE_SUFFIX))
}

/// Reads and decodes one source document. A document without a `uri`
/// takes its path.
pub fn load_source(path: &Path) -> Result<SourceDocument, RclError> {
    let content = fs::read_to_string(path).map_err(|e| RclError::read(path, e))?;
    let mut document: SourceDocument =
        serde_json::from_str(&content).map_err(|source| RclError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    if document.uri.is_none() {
        document.uri = Some(path.display().to_string());
    }
    Ok(document)
}

/// The output base name for a source: `coffee.ast.json` becomes `coffee`.
pub fn output_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("agent");
    name.strip_suffix(SOURCE_SUFFIX)
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_sorted_and_filters_by_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.ast.json"), "{}").unwrap();
        fs::write(dir.path().join("nested/a.ast.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        let files = discover_sources(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("b.ast.json"), PathBuf::from("nested/a.ast.json")]
        );
    }

    #[test]
    fn missing_root_is_not_found() {
        let err = discover_sources(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, RclError::NotFound { .. }));
    }

    #[test]
    fn load_fills_uri_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("coffee.ast.json");
        fs::write(&good, r#"{"ast": {"sections": []}}"#).unwrap();
        let doc = load_source(&good).unwrap();
        assert_eq!(doc.uri.as_deref(), Some(good.display().to_string().as_str()));

        let bad = dir.path().join("bad.ast.json");
        fs::write(&bad, "not json").unwrap();
        assert!(matches!(load_source(&bad), Err(RclError::Decode { .. })));
    }

    #[test]
    fn stems() {
        assert_eq!(output_stem(Path::new("dir/coffee.ast.json")), "coffee");
        assert_eq!(output_stem(Path::new("coffee.json")), "coffee");
        assert_eq!(output_stem(Path::new("coffee")), "coffee");
    }
}
