//! Documented-item extraction
//!
//! Two strategies, chosen by file extension:
//! - Markdown: heading patterns, bullet parameter lists, fenced code blocks
//! - reStructuredText: directive blocks with underlined section titles

use super::{line_of_offset, walk_files};
use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Supported documentation formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Markdown,
    Rst,
}

impl DocFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(DocFormat::Markdown),
            "rst" => Some(DocFormat::Rst),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocFormat::Markdown => write!(f, "markdown"),
            DocFormat::Rst => write!(f, "rst"),
        }
    }
}

/// Kind of documented item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocItemKind {
    Function,
    Class,
    Method,
    ApiEndpoint,
}

impl std::fmt::Display for DocItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocItemKind::Function => write!(f, "function"),
            DocItemKind::Class => write!(f, "class"),
            DocItemKind::Method => write!(f, "method"),
            DocItemKind::ApiEndpoint => write!(f, "api_endpoint"),
        }
    }
}

/// A documented parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    /// Parameter name
    pub name: String,
    /// Declared type, empty when the docs give none
    #[serde(rename = "type")]
    pub type_name: String,
    /// Prose description
    pub description: String,
}

/// A documented function, class, method, or API endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentedItem {
    /// Item name as written in the docs
    pub name: String,
    /// File the item was documented in
    pub filepath: String,
    /// 1-based line of the heading or directive
    pub line_number: usize,
    /// Kind of item
    pub doc_type: DocItemKind,
    /// Prose description following the heading
    pub description: Option<String>,
    /// Documented parameters
    pub parameters: Vec<ParamDoc>,
    /// Documented return type
    pub return_type: Option<String>,
    /// Usage examples
    pub examples: Vec<String>,
    /// Whether the docs mark the item deprecated
    pub deprecated: bool,
    /// Version the item was documented since
    pub since_version: Option<String>,
}

impl DocumentedItem {
    /// Create a bare item
    pub fn new(name: &str, filepath: &str, line_number: usize, doc_type: DocItemKind) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            line_number,
            doc_type,
            description: None,
            parameters: Vec::new(),
            return_type: None,
            examples: Vec::new(),
            deprecated: false,
            since_version: None,
        }
    }
}

/// Result of extracting one documentation file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocParseResult {
    /// File the result came from
    pub filepath: String,
    /// Detected format
    pub format: DocFormat,
    /// Documented items
    pub items: Vec<DocumentedItem>,
    /// Section heading titles, structure only
    pub sections: Vec<String>,
    /// Non-fatal per-file errors
    pub errors: Vec<String>,
}

impl DocParseResult {
    /// Create an empty result for a file
    pub fn new(filepath: &str, format: DocFormat) -> Self {
        Self {
            filepath: filepath.to_string(),
            format,
            items: Vec::new(),
            sections: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Extracts documented items, dispatching per format
pub struct DocExtractor {
    markdown: MarkdownExtractor,
    rst: RstExtractor,
}

impl DocExtractor {
    /// Create a new doc extractor
    pub fn new() -> Self {
        Self {
            markdown: MarkdownExtractor,
            rst: RstExtractor,
        }
    }

    /// Extract documented items from a file on disk.
    ///
    /// Returns `None` for unsupported extensions. An unreadable file
    /// yields a result carrying an error entry, never a hard failure.
    pub fn extract_file(&self, path: &Path) -> Option<DocParseResult> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let format = DocFormat::from_extension(ext)?;
        let filepath = path.to_string_lossy().to_string();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let mut result = DocParseResult::new(&filepath, format);
                result.errors.push(format!("Read error: {}", e));
                return Some(result);
            }
        };

        Some(self.extract_source(&filepath, format, &content))
    }

    /// Extract documented items from in-memory content
    pub fn extract_source(&self, filepath: &str, format: DocFormat, content: &str) -> DocParseResult {
        match format {
            DocFormat::Markdown => self.markdown.extract(filepath, content),
            DocFormat::Rst => self.rst.extract(filepath, content),
        }
    }

    /// Extract every supported file under a directory.
    ///
    /// Exclusion is by substring containment over the full path string.
    pub fn extract_directory(
        &self,
        root: &Path,
        exclude_patterns: &[String],
    ) -> Vec<DocParseResult> {
        let mut results = Vec::new();
        for path in walk_files(root, exclude_patterns) {
            if let Some(result) = self.extract_file(&path) {
                results.push(result);
            }
        }
        debug!("Extracted {} doc files under {:?}", results.len(), root);
        results
    }
}

impl Default for DocExtractor {
    fn default() -> Self {
        Self::new()
    }
}

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}\s+(.+)$").unwrap());

static FUNC_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,4}\s+`?(\w+(?:\.\w+)?)\s*\(([^)]*)\)`?").unwrap());

static API_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^#{1,4}\s+(GET|POST|PUT|DELETE|PATCH)\s+`?([/\w{}:-]+)`?").unwrap()
});

static DEPRECATED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\*?\*?deprecated\*?\*?").unwrap());

static SINCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@since\s+v?([\d.]+)").unwrap());

static PARAM_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-*]\s+`?(\w+)`?\s*(?:\(([^)]+)\))?\s*[-:]\s*(.+)").unwrap());

static NEXT_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n#{1,6}\s").unwrap());

static FENCE_PY_FUNC: Lazy<Regex> = Lazy::new(|| Regex::new(r"def\s+(\w+)\s*\(([^)]*)\)").unwrap());

static FENCE_JS_FUNC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:function\s+(\w+)|const\s+(\w+)\s*=)").unwrap());

/// Markdown strategy
struct MarkdownExtractor;

impl MarkdownExtractor {
    fn extract(&self, filepath: &str, content: &str) -> DocParseResult {
        let mut result = DocParseResult::new(filepath, DocFormat::Markdown);
        let lines: Vec<&str> = content.lines().collect();

        for caps in SECTION_HEADER.captures_iter(content) {
            result.sections.push(caps[1].trim().to_string());
        }

        for caps in FUNC_HEADER.captures_iter(content) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let line = line_of_offset(content, m.start());
            let name = &caps[1];

            let window = char_window(content, m.start(), 500);

            let mut item = DocumentedItem::new(name, filepath, line, DocItemKind::Function);
            item.description = following_description(&lines, line);
            item.parameters = bullet_parameters(content, m.end());
            item.deprecated = DEPRECATED_MARKER.is_match(window);
            item.since_version = SINCE_MARKER.captures(window).map(|c| c[1].to_string());
            result.items.push(item);
        }

        for caps in API_HEADER.captures_iter(content) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let line = line_of_offset(content, m.start());
            let name = format!("{} {}", &caps[1], &caps[2]);

            let mut item = DocumentedItem::new(&name, filepath, line, DocItemKind::ApiEndpoint);
            item.description = following_description(&lines, line);
            result.items.push(item);
        }

        self.scan_code_fences(content, filepath, &mut result);

        result
    }

    /// Function-like constructs inside recognized code fences become
    /// lightly-documented items, unless the name is already documented.
    fn scan_code_fences(&self, content: &str, filepath: &str, result: &mut DocParseResult) {
        let mut in_block = false;
        let mut lang: Option<String> = None;
        let mut buf = String::new();
        let mut block_start = 0usize;

        for (event, range) in Parser::new(content).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_block = true;
                    buf.clear();
                    block_start = range.start;
                    lang = match kind {
                        CodeBlockKind::Fenced(fence_lang) if !fence_lang.is_empty() => {
                            Some(fence_lang.to_string())
                        }
                        _ => None,
                    };
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_block = false;
                    let line = line_of_offset(content, block_start);
                    self.scan_fence(lang.take().as_deref(), &buf, filepath, line, result);
                }
                Event::Text(text) if in_block => buf.push_str(&text),
                _ => {}
            }
        }
    }

    fn scan_fence(
        &self,
        lang: Option<&str>,
        code: &str,
        filepath: &str,
        line: usize,
        result: &mut DocParseResult,
    ) {
        match lang {
            Some("python") | Some("py") => {
                for caps in FENCE_PY_FUNC.captures_iter(code) {
                    let name = &caps[1];
                    if result.items.iter().any(|i| i.name == name) {
                        continue;
                    }
                    let mut item =
                        DocumentedItem::new(name, filepath, line, DocItemKind::Function);
                    item.description = Some("Documented in code example".to_string());
                    result.items.push(item);
                }
            }
            Some("javascript") | Some("js") | Some("typescript") | Some("ts") => {
                for caps in FENCE_JS_FUNC.captures_iter(code) {
                    let name = match caps.get(1).or_else(|| caps.get(2)) {
                        Some(g) => g.as_str(),
                        None => continue,
                    };
                    if result.items.iter().any(|i| i.name == name) {
                        continue;
                    }
                    let mut item =
                        DocumentedItem::new(name, filepath, line, DocItemKind::Function);
                    item.description = Some("Documented in code example".to_string());
                    result.items.push(item);
                }
            }
            _ => {}
        }
    }
}

/// Description = the run of non-empty, non-fenced lines immediately after
/// a heading, up to 10 lines, stopping at the next heading or at a blank
/// line once at least one line has been captured.
fn following_description(lines: &[&str], heading_line: usize) -> Option<String> {
    let mut collected: Vec<String> = Vec::new();
    let end = (heading_line + 10).min(lines.len());

    for line in lines.iter().take(end).skip(heading_line) {
        let line = line.trim();
        if line.starts_with('#') {
            break;
        }
        if !line.is_empty() && !line.starts_with("```") {
            collected.push(line.to_string());
        } else if !collected.is_empty() {
            break;
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join(" "))
    }
}

/// Parameters are parsed from a bullet list bounded by the heading and
/// the next heading (or end of document).
fn bullet_parameters(content: &str, from: usize) -> Vec<ParamDoc> {
    let section_end = NEXT_HEADING
        .find(&content[from..])
        .map(|m| from + m.start())
        .unwrap_or(content.len());
    let section = &content[from..section_end];

    PARAM_BULLET
        .captures_iter(section)
        .map(|caps| ParamDoc {
            name: caps[1].to_string(),
            type_name: caps
                .get(2)
                .map(|g| g.as_str().to_string())
                .unwrap_or_default(),
            description: caps[3].trim().to_string(),
        })
        .collect()
}

/// A slice of up to `len` bytes starting at `start`, clipped back to a
/// character boundary.
fn char_window(content: &str, start: usize, len: usize) -> &str {
    let mut end = (start + len).min(content.len());
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[start..end]
}

static RST_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\.\.\s+(function|class|method|py:function|py:class|py:method)::\s+(.+)$")
        .unwrap()
});

static RST_DEPRECATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\.\.\s+deprecated::").unwrap());

static RST_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\.\.\s+versionadded::\s+(.+)$").unwrap());

static RST_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.+)\n([=\-~^]+)$").unwrap());

static DOTTED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+(?:\.\w+)?").unwrap());

/// reStructuredText strategy
struct RstExtractor;

impl RstExtractor {
    fn extract(&self, filepath: &str, content: &str) -> DocParseResult {
        let mut result = DocParseResult::new(filepath, DocFormat::Rst);
        let lines: Vec<&str> = content.lines().collect();

        // A title only counts as a section when its underline is at
        // least as long as the title text.
        for caps in RST_SECTION.captures_iter(content) {
            let title = caps[1].trim().to_string();
            if caps[2].len() >= title.len() {
                result.sections.push(title);
            }
        }

        for caps in RST_DIRECTIVE.captures_iter(content) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let line = line_of_offset(content, m.start());
            let directive = caps[1].trim_start_matches("py:").to_string();
            let signature = caps[2].trim().to_string();

            let name = DOTTED_NAME
                .find(&signature)
                .map(|m| m.as_str())
                .unwrap_or(&signature);
            let kind = match directive.as_str() {
                "class" => DocItemKind::Class,
                "method" => DocItemKind::Method,
                _ => DocItemKind::Function,
            };

            let window = char_window(content, m.start(), 500);

            let mut item = DocumentedItem::new(name, filepath, line, kind);
            item.description = indented_block(&lines, line);
            item.deprecated = RST_DEPRECATED.is_match(window);
            item.since_version = RST_VERSION.captures(window).map(|c| c[1].trim().to_string());
            result.items.push(item);
        }

        result
    }
}

/// Description = the indented block after a directive, up to 20 lines,
/// tolerant of blank lines inside the block, terminated by a dedented
/// non-blank line.
fn indented_block(lines: &[&str], directive_line: usize) -> Option<String> {
    let mut collected: Vec<String> = Vec::new();
    let end = (directive_line + 20).min(lines.len());

    for line in lines.iter().take(end).skip(directive_line) {
        if line.starts_with("   ") || line.starts_with('\t') {
            let text = line.trim();
            if !text.is_empty() && !text.starts_with(':') {
                collected.push(text.to_string());
            }
        } else if !collected.is_empty() && line.trim().is_empty() {
            continue;
        } else if !collected.is_empty() {
            break;
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_markdown(content: &str) -> DocParseResult {
        DocExtractor::new().extract_source("api.md", DocFormat::Markdown, content)
    }

    fn extract_rst(content: &str) -> DocParseResult {
        DocExtractor::new().extract_source("api.rst", DocFormat::Rst, content)
    }

    #[test]
    fn test_markdown_function_heading() {
        let result = extract_markdown(
            r#"# API Reference

## `connect(host, port)`

Opens a connection to the server.

- `host` (str) - Server hostname
- `port` (int) - Server port

## Other
"#,
        );

        assert_eq!(result.items.len(), 1);
        let item = &result.items[0];
        assert_eq!(item.name, "connect");
        assert_eq!(item.doc_type, DocItemKind::Function);
        assert_eq!(item.line_number, 3);
        assert_eq!(
            item.description.as_deref(),
            Some("Opens a connection to the server.")
        );
        assert_eq!(item.parameters.len(), 2);
        assert_eq!(item.parameters[0].name, "host");
        assert_eq!(item.parameters[0].type_name, "str");
        assert_eq!(item.parameters[1].name, "port");

        assert!(result
            .sections
            .iter()
            .any(|s| s == "API Reference"));
    }

    #[test]
    fn test_markdown_deprecated_and_since() {
        let result = extract_markdown(
            r#"### old_login(user)

**Deprecated**: use `login` instead.

@since v1.2.0
"#,
        );

        let item = &result.items[0];
        assert!(item.deprecated);
        assert_eq!(item.since_version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_markdown_api_endpoint() {
        let result = extract_markdown(
            r#"## GET /users/{id}

Fetch a user by id.
"#,
        );

        let item = &result.items[0];
        assert_eq!(item.name, "GET /users/{id}");
        assert_eq!(item.doc_type, DocItemKind::ApiEndpoint);
        assert_eq!(item.description.as_deref(), Some("Fetch a user by id."));
    }

    #[test]
    fn test_markdown_code_fence_items() {
        let result = extract_markdown(
            r#"# Examples

```python
def helper(x):
    return x
```

```text
def ignored(y): ...
```
"#,
        );

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].name, "helper");
        assert_eq!(
            result.items[0].description.as_deref(),
            Some("Documented in code example")
        );
    }

    #[test]
    fn test_markdown_fence_does_not_shadow_heading_item() {
        let result = extract_markdown(
            r#"## `helper(x)`

Real documentation.

```python
def helper(x):
    return x
```
"#,
        );

        assert_eq!(result.items.len(), 1);
        assert_eq!(
            result.items[0].description.as_deref(),
            Some("Real documentation.")
        );
    }

    #[test]
    fn test_rst_directive() {
        let result = extract_rst(
            r#"API
===

.. py:function:: connect(host, port)

   Opens a connection to the server.
   Retries on failure.

.. deprecated:: 1.2
"#,
        );

        assert_eq!(result.sections, vec!["API"]);
        assert_eq!(result.items.len(), 1);

        let item = &result.items[0];
        assert_eq!(item.name, "connect");
        assert_eq!(item.doc_type, DocItemKind::Function);
        assert_eq!(
            item.description.as_deref(),
            Some("Opens a connection to the server. Retries on failure.")
        );
        assert!(item.deprecated);
    }

    #[test]
    fn test_rst_short_underline_is_not_a_section() {
        let result = extract_rst("A Long Title\n===\n\ntext\n");
        assert!(result.sections.is_empty());
    }

    #[test]
    fn test_rst_method_directive_keeps_qualified_name() {
        let result = extract_rst(".. method:: Connection.close()\n\n   Closes the connection.\n");

        let item = &result.items[0];
        assert_eq!(item.name, "Connection.close");
        assert_eq!(item.doc_type, DocItemKind::Method);
    }

    #[test]
    fn test_extract_directory_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "## `f(x)`\n\nDoes f.\n").unwrap();
        std::fs::write(dir.path().join("b.rst"), ".. function:: g(y)\n\n   Does g.\n").unwrap();
        std::fs::write(dir.path().join("c.adoc"), "== h\n").unwrap();

        let extractor = DocExtractor::new();
        let results = extractor.extract_directory(dir.path(), &[]);

        assert_eq!(results.len(), 2);
        let formats: Vec<DocFormat> = results.iter().map(|r| r.format).collect();
        assert!(formats.contains(&DocFormat::Markdown));
        assert!(formats.contains(&DocFormat::Rst));
    }
}
