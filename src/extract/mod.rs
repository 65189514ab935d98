//! Signature extraction from code and documentation
//!
//! This module recovers structured, comparable records from two sides:
//! - Code files (tree-sitter for Python, regex patterns for JS/TS)
//! - Documentation files (Markdown and reStructuredText)

pub mod code;
pub mod doc;

pub use code::{
    ClassSignature, CodeExtractor, FunctionSignature, Language, Parameter, ParseResult,
};
pub use doc::{DocExtractor, DocFormat, DocItemKind, DocParseResult, DocumentedItem, ParamDoc};

use std::path::{Path, PathBuf};
use tracing::warn;

/// Recursively list files under `root`, skipping any file whose full path
/// contains one of the exclude patterns as a substring.
pub(crate) fn walk_files(root: &Path, exclude_patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path_str = entry.path().to_string_lossy();
        if exclude_patterns.iter().any(|p| path_str.contains(p.as_str())) {
            continue;
        }

        files.push(entry.path().to_path_buf());
    }

    files
}

/// 1-based line number of a byte offset
pub(crate) fn line_of_offset(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_files_excludes_by_substring() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("src/app.py"), "x = 1\n").unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "var x;\n").unwrap();

        let files = walk_files(dir.path(), &["node_modules".to_string()]);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.py"));
    }

    #[test]
    fn test_line_of_offset() {
        let source = "a\nb\nc";
        assert_eq!(line_of_offset(source, 0), 1);
        assert_eq!(line_of_offset(source, 2), 2);
        assert_eq!(line_of_offset(source, 4), 3);
    }
}
