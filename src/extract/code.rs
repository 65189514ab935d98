//! Code signature extraction
//!
//! Two strategies, chosen by file extension:
//! - Python: full syntax tree via tree-sitter
//! - JavaScript/TypeScript: best-effort regex patterns, no parser dependency

use super::{line_of_offset, walk_files};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::debug;

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "jsx" | "mjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => write!(f, "python"),
            Language::JavaScript => write!(f, "javascript"),
            Language::TypeScript => write!(f, "typescript"),
        }
    }
}

/// A single function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Type annotation, as written in source
    pub type_hint: Option<String>,
    /// Default value, as written in source
    pub default: Option<String>,
}

impl Parameter {
    /// Create a parameter with no type hint or default
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_hint: None,
            default: None,
        }
    }
}

/// A function or method signature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// File the function was found in
    pub filepath: String,
    /// 1-based line of the definition
    pub line_number: usize,
    /// Parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Return type annotation, as written in source
    pub return_type: Option<String>,
    /// Leading docstring or block comment
    pub docstring: Option<String>,
    /// Whether the definition uses the async form
    pub is_async: bool,
    /// Whether this is a method on a class
    pub is_method: bool,
    /// Owning class name, for methods
    pub class_name: Option<String>,
    /// Decorator/annotation text, order preserved
    pub decorators: Vec<String>,
}

impl FunctionSignature {
    /// Create a signature with empty parameter and decorator lists
    pub fn new(name: &str, filepath: &str, line_number: usize) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            line_number,
            parameters: Vec::new(),
            return_type: None,
            docstring: None,
            is_async: false,
            is_method: false,
            class_name: None,
            decorators: Vec::new(),
        }
    }

    /// `Class.method` for methods, the bare name otherwise.
    /// This is the canonical matching key.
    pub fn full_name(&self) -> String {
        match &self.class_name {
            Some(class) => format!("{}.{}", class, self.name),
            None => self.name.clone(),
        }
    }
}

/// A class definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSignature {
    /// Class name
    pub name: String,
    /// File the class was found in
    pub filepath: String,
    /// 1-based line of the definition
    pub line_number: usize,
    /// Base classes in declaration order, as written in source
    pub bases: Vec<String>,
    /// Leading docstring or block comment
    pub docstring: Option<String>,
    /// Methods defined directly in the class body
    pub methods: Vec<FunctionSignature>,
    /// Decorator text, order preserved
    pub decorators: Vec<String>,
}

impl ClassSignature {
    /// Create a class signature with empty lists
    pub fn new(name: &str, filepath: &str, line_number: usize) -> Self {
        Self {
            name: name.to_string(),
            filepath: filepath.to_string(),
            line_number,
            bases: Vec::new(),
            docstring: None,
            methods: Vec::new(),
            decorators: Vec::new(),
        }
    }
}

/// Result of extracting one code file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    /// File the result came from
    pub filepath: String,
    /// Detected language
    pub language: Language,
    /// Top-level functions (methods live under their class)
    pub functions: Vec<FunctionSignature>,
    /// All classes, regardless of nesting depth
    pub classes: Vec<ClassSignature>,
    /// Explicitly exported names
    pub exports: Vec<String>,
    /// Non-fatal per-file errors
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Create an empty result for a file
    pub fn new(filepath: &str, language: Language) -> Self {
        Self {
            filepath: filepath.to_string(),
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            exports: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Extracts code signatures, dispatching per language
pub struct CodeExtractor {
    python: PythonExtractor,
    pattern: PatternExtractor,
}

impl CodeExtractor {
    /// Create a new code extractor
    pub fn new() -> Result<Self> {
        Ok(Self {
            python: PythonExtractor::new()?,
            pattern: PatternExtractor,
        })
    }

    /// Extract signatures from a file on disk.
    ///
    /// Returns `None` for unsupported extensions. An unreadable file
    /// yields a result carrying an error entry, never a hard failure.
    pub fn extract_file(&mut self, path: &Path) -> Option<ParseResult> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let language = Language::from_extension(ext)?;
        let filepath = path.to_string_lossy().to_string();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                let mut result = ParseResult::new(&filepath, language);
                result.errors.push(format!("Read error: {}", e));
                return Some(result);
            }
        };

        Some(self.extract_source(&filepath, language, &content))
    }

    /// Extract signatures from in-memory source
    pub fn extract_source(
        &mut self,
        filepath: &str,
        language: Language,
        content: &str,
    ) -> ParseResult {
        match language {
            Language::Python => self.python.extract(filepath, content),
            Language::JavaScript | Language::TypeScript => {
                self.pattern.extract(filepath, language, content)
            }
        }
    }

    /// Extract every supported file under a directory.
    ///
    /// Exclusion is by substring containment over the full path string.
    pub fn extract_directory(
        &mut self,
        root: &Path,
        exclude_patterns: &[String],
    ) -> Vec<ParseResult> {
        let mut results = Vec::new();
        for path in walk_files(root, exclude_patterns) {
            if let Some(result) = self.extract_file(&path) {
                results.push(result);
            }
        }
        debug!("Extracted {} code files under {:?}", results.len(), root);
        results
    }
}

/// Structural strategy: parses Python with tree-sitter
struct PythonExtractor {
    parser: tree_sitter::Parser,
}

impl PythonExtractor {
    fn new() -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parser
            .set_language(&language)
            .context("Failed to set Python language")?;
        Ok(Self { parser })
    }

    fn extract(&mut self, filepath: &str, source: &str) -> ParseResult {
        let mut result = ParseResult::new(filepath, Language::Python);

        let tree = match self.parser.parse(source, None) {
            Some(tree) => tree,
            None => {
                result
                    .errors
                    .push("Parse error: parser produced no tree".to_string());
                return result;
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root).unwrap_or(1);
            result
                .errors
                .push(format!("Syntax error near line {}", line));
            return result;
        }

        // Top-level functions: only direct children of the module node.
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    if let Some(func) = self.parse_function(child, source, filepath, None, &[]) {
                        result.functions.push(func);
                    }
                }
                "decorated_definition" => {
                    let decorators = decorator_texts(child, source);
                    if let Some(def) = child.child_by_field_name("definition") {
                        if def.kind() == "function_definition" {
                            if let Some(func) =
                                self.parse_function(def, source, filepath, None, &decorators)
                            {
                                result.functions.push(func);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        // Classes at any nesting depth: breadth-first worklist over the tree.
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            if node.kind() == "class_definition" {
                if let Some(class) = self.parse_class(node, source, filepath) {
                    result.classes.push(class);
                }
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                queue.push_back(child);
            }
        }

        result
    }

    fn parse_function(
        &self,
        node: tree_sitter::Node,
        source: &str,
        filepath: &str,
        class_name: Option<&str>,
        decorators: &[String],
    ) -> Option<FunctionSignature> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, source)?;
        let line = node.start_position().row + 1;

        let mut func = FunctionSignature::new(name, filepath, line);
        func.class_name = class_name.map(str::to_string);
        func.is_method = class_name.is_some();
        func.decorators = decorators.to_vec();

        let mut cursor = node.walk();
        func.is_async = node.children(&mut cursor).any(|c| c.kind() == "async");

        // Defaults bind to the trailing parameters by position.
        let (mut params, defaults) = self.collect_parameters(node, source);
        let offset = params.len() - defaults.len();
        for (i, default) in defaults.into_iter().enumerate() {
            params[offset + i].default = Some(default);
        }
        func.parameters = params;

        func.return_type = node
            .child_by_field_name("return_type")
            .and_then(|n| node_text(n, source))
            .map(str::to_string);
        func.docstring = docstring_of(node, source);

        Some(func)
    }

    /// Parameter names/types in declaration order, plus default-value
    /// texts in their own order. Splat parameters and separators are not
    /// modeled.
    fn collect_parameters(
        &self,
        node: tree_sitter::Node,
        source: &str,
    ) -> (Vec<Parameter>, Vec<String>) {
        let mut params = Vec::new();
        let mut defaults = Vec::new();

        let list = match node.child_by_field_name("parameters") {
            Some(list) => list,
            None => return (params, defaults),
        };

        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "identifier" => {
                    if let Some(name) = node_text(child, source) {
                        params.push(Parameter::new(name));
                    }
                }
                "typed_parameter" => {
                    let inner = child.named_child(0);
                    if inner.map(|n| n.kind()) != Some("identifier") {
                        continue;
                    }
                    let name = inner.and_then(|n| node_text(n, source));
                    if let Some(name) = name {
                        let mut param = Parameter::new(name);
                        param.type_hint = child
                            .child_by_field_name("type")
                            .and_then(|n| node_text(n, source))
                            .map(str::to_string);
                        params.push(param);
                    }
                }
                "default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .and_then(|n| node_text(n, source));
                    if let Some(name) = name {
                        params.push(Parameter::new(name));
                        if let Some(value) = child
                            .child_by_field_name("value")
                            .and_then(|n| node_text(n, source))
                        {
                            defaults.push(value.to_string());
                        }
                    }
                }
                "typed_default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .and_then(|n| node_text(n, source));
                    if let Some(name) = name {
                        let mut param = Parameter::new(name);
                        param.type_hint = child
                            .child_by_field_name("type")
                            .and_then(|n| node_text(n, source))
                            .map(str::to_string);
                        params.push(param);
                        if let Some(value) = child
                            .child_by_field_name("value")
                            .and_then(|n| node_text(n, source))
                        {
                            defaults.push(value.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        (params, defaults)
    }

    fn parse_class(
        &self,
        node: tree_sitter::Node,
        source: &str,
        filepath: &str,
    ) -> Option<ClassSignature> {
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, source)?;
        let line = node.start_position().row + 1;

        let mut class = ClassSignature::new(name, filepath, line);

        if let Some(parent) = node.parent() {
            if parent.kind() == "decorated_definition" {
                class.decorators = decorator_texts(parent, source);
            }
        }

        // Positional bases only; keyword arguments (metaclass=...) are
        // not base classes.
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for child in superclasses.children(&mut cursor) {
                if child.is_named()
                    && child.kind() != "keyword_argument"
                    && child.kind() != "comment"
                {
                    if let Some(text) = node_text(child, source) {
                        class.bases.push(text.to_string());
                    }
                }
            }
        }

        class.docstring = docstring_of(node, source);

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for item in body.children(&mut cursor) {
                match item.kind() {
                    "function_definition" => {
                        if let Some(method) =
                            self.parse_function(item, source, filepath, Some(name), &[])
                        {
                            class.methods.push(method);
                        }
                    }
                    "decorated_definition" => {
                        let decorators = decorator_texts(item, source);
                        if let Some(def) = item.child_by_field_name("definition") {
                            if def.kind() == "function_definition" {
                                if let Some(method) = self.parse_function(
                                    def,
                                    source,
                                    filepath,
                                    Some(name),
                                    &decorators,
                                ) {
                                    class.methods.push(method);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(class)
    }
}

fn node_text<'s>(node: tree_sitter::Node, source: &'s str) -> Option<&'s str> {
    node.utf8_text(source.as_bytes()).ok()
}

/// Decorator expressions of a decorated_definition, without the leading `@`
fn decorator_texts(node: tree_sitter::Node, source: &str) -> Vec<String> {
    let mut decorators = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            if let Some(text) = node_text(child, source) {
                decorators.push(text.trim_start_matches('@').trim().to_string());
            }
        }
    }
    decorators
}

/// Docstring = the leading string-literal expression of the body, if any.
/// No fallback heuristics.
fn docstring_of(node: tree_sitter::Node, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;

    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let mut inner_cursor = first.walk();
    for inner in first.children(&mut inner_cursor) {
        if inner.kind() == "string" {
            let text = node_text(inner, source)?;
            return Some(strip_string_quotes(text));
        }
    }

    None
}

fn strip_string_quotes(raw: &str) -> String {
    let s = raw.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if s.starts_with(delim) && s.ends_with(delim) && s.len() >= 2 * delim.len() {
            return s[delim.len()..s.len() - delim.len()].trim().to_string();
        }
    }
    s.trim().to_string()
}

/// First line carrying a syntax error, for the per-file error entry
fn first_error_line(root: tree_sitter::Node) -> Option<usize> {
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            queue.push_back(child);
        }
    }
    None
}

// Pattern strategy: ordered, independent patterns over raw text.
// (1) named function declarations, (2) arrow assignments bound to a
// name, (3) method shorthand inside a class body.
static FUNCTION_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?m)^(?:export\s+)?(?:async\s+)?function\s+(\w+)\s*\(([^)]*)\)(?:\s*:\s*([^{]+))?")
            .unwrap(),
        Regex::new(r"(?m)^(?:export\s+)?(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?\(([^)]*)\)(?:\s*:\s*([^=]+))?\s*=>")
            .unwrap(),
        Regex::new(r"(?m)^\s+(?:async\s+)?(\w+)\s*\(([^)]*)\)(?:\s*:\s*([^{]+))?\s*\{").unwrap(),
    ]
});

static CLASS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:export\s+)?class\s+(\w+)(?:\s+extends\s+(\w+))?").unwrap());

static BLOCK_COMMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*\*\s*([\s\S]*?)\s*\*/").unwrap());

static EXPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:const|let|var|function|class)\s+(\w+)").unwrap()
});

/// Pattern strategy: JS/TS extraction without a parser dependency
struct PatternExtractor;

impl PatternExtractor {
    fn extract(&self, filepath: &str, language: Language, source: &str) -> ParseResult {
        let mut result = ParseResult::new(filepath, language);

        // Trailing block comments, indexed by the line they end on.
        let mut comments: HashMap<usize, String> = HashMap::new();
        for caps in BLOCK_COMMENT_PATTERN.captures_iter(source) {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let end_line = line_of_offset(source, whole);
            if let Some(body) = caps.get(1) {
                comments.insert(end_line, body.as_str().trim().to_string());
            }
        }

        // Patterns run in order; a later pattern must not re-add an
        // entity an earlier one already found.
        let mut seen: HashSet<(String, usize)> = HashSet::new();
        for pattern in FUNCTION_PATTERNS.iter() {
            for caps in pattern.captures_iter(source) {
                let m = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let line = line_of_offset(source, m.start());
                let name = caps.get(1).map(|g| g.as_str()).unwrap_or_default();
                if name.is_empty() || !seen.insert((name.to_string(), line)) {
                    continue;
                }

                let mut func = FunctionSignature::new(name, filepath, line);
                func.parameters = caps
                    .get(2)
                    .map(|g| split_parameters(g.as_str().trim()))
                    .unwrap_or_default();
                func.return_type = caps
                    .get(3)
                    .map(|g| g.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                func.docstring = comments
                    .get(&line.saturating_sub(1))
                    .or_else(|| comments.get(&line))
                    .cloned();
                func.is_async = window_contains_async(source, m.start());
                result.functions.push(func);
            }
        }

        for caps in CLASS_PATTERN.captures_iter(source) {
            let m = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let line = line_of_offset(source, m.start());
            let name = caps.get(1).map(|g| g.as_str()).unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            let mut class = ClassSignature::new(name, filepath, line);
            if let Some(base) = caps.get(2) {
                class.bases.push(base.as_str().to_string());
            }
            class.docstring = comments.get(&line.saturating_sub(1)).cloned();
            result.classes.push(class);
        }

        for caps in EXPORT_PATTERN.captures_iter(source) {
            if let Some(name) = caps.get(1) {
                result.exports.push(name.as_str().to_string());
            }
        }

        result
    }
}

/// Split a raw parameter string on top-level commas, tracking bracket
/// depth so generics and default-value commas stay intact.
fn split_parameters(params_str: &str) -> Vec<Parameter> {
    if params_str.is_empty() {
        return Vec::new();
    }

    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for ch in params_str.chars() {
        match ch {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .map(|token| parse_parameter(token))
        .collect()
}

/// `name`, optional `: type`, optional `= default`
fn parse_parameter(token: &str) -> Parameter {
    let (head, default) = match token.split_once('=') {
        Some((head, rest)) => (head.trim(), Some(rest.trim().to_string())),
        None => (token.trim(), None),
    };
    let (name, type_hint) = match head.split_once(':') {
        Some((name, ty)) => (name.trim(), Some(ty.trim().to_string())),
        None => (head, None),
    };

    Parameter {
        name: name.to_string(),
        type_hint: type_hint.filter(|t| !t.is_empty()),
        default,
    }
}

/// Async is detected by substring inspection in a short window before
/// the match start.
fn window_contains_async(source: &str, start: usize) -> bool {
    let from = start.saturating_sub(20);
    source.as_bytes()[from..start]
        .windows(5)
        .any(|w| w == b"async")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_python(source: &str) -> ParseResult {
        let mut extractor = CodeExtractor::new().unwrap();
        extractor.extract_source("test.py", Language::Python, source)
    }

    fn extract_js(source: &str) -> ParseResult {
        let mut extractor = CodeExtractor::new().unwrap();
        extractor.extract_source("test.js", Language::JavaScript, source)
    }

    #[test]
    fn test_python_function_signature() {
        let result = extract_python(
            r#"
def greet(name: str, punctuation="!") -> str:
    """Say hello."""
    return f"Hello, {name}{punctuation}"
"#,
        );

        assert!(result.errors.is_empty());
        assert_eq!(result.functions.len(), 1);

        let func = &result.functions[0];
        assert_eq!(func.name, "greet");
        assert_eq!(func.line_number, 2);
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(func.parameters[0].name, "name");
        assert_eq!(func.parameters[0].type_hint.as_deref(), Some("str"));
        assert_eq!(func.parameters[0].default, None);
        assert_eq!(func.parameters[1].name, "punctuation");
        assert_eq!(func.parameters[1].default.as_deref(), Some("\"!\""));
        assert_eq!(func.return_type.as_deref(), Some("str"));
        assert_eq!(func.docstring.as_deref(), Some("Say hello."));
        assert!(!func.is_async);
        assert!(!func.is_method);
    }

    #[test]
    fn test_python_defaults_bind_to_trailing_parameters() {
        let result = extract_python("def f(a, b, c=1, d=2):\n    pass\n");

        let params = &result.functions[0].parameters;
        assert_eq!(params[0].default, None);
        assert_eq!(params[1].default, None);
        assert_eq!(params[2].default.as_deref(), Some("1"));
        assert_eq!(params[3].default.as_deref(), Some("2"));
    }

    #[test]
    fn test_python_async_and_decorators() {
        let result = extract_python(
            r#"
@app.route("/users")
async def list_users(limit: int = 50):
    return []
"#,
        );

        let func = &result.functions[0];
        assert!(func.is_async);
        assert_eq!(func.decorators, vec!["app.route(\"/users\")".to_string()]);
    }

    #[test]
    fn test_python_nested_functions_excluded() {
        let result = extract_python(
            r#"
def outer():
    def inner():
        pass
    return inner
"#,
        );

        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "outer");
    }

    #[test]
    fn test_python_class_with_methods() {
        let result = extract_python(
            r#"
class Greeter(Base, mixins.Loud):
    """Greets people."""

    def __init__(self, name):
        self.name = name

    def greet(self, punctuation="!"):
        """Say hello."""
        return self.name
"#,
        );

        assert_eq!(result.classes.len(), 1);
        let class = &result.classes[0];
        assert_eq!(class.name, "Greeter");
        assert_eq!(class.bases, vec!["Base", "mixins.Loud"]);
        assert_eq!(class.docstring.as_deref(), Some("Greets people."));
        assert_eq!(class.methods.len(), 2);

        let greet = &class.methods[1];
        assert_eq!(greet.full_name(), "Greeter.greet");
        assert!(greet.is_method);
        assert_eq!(greet.class_name.as_deref(), Some("Greeter"));
        assert_eq!(greet.parameters[0].name, "self");
        assert_eq!(greet.parameters[1].default.as_deref(), Some("\"!\""));

        // methods are not top-level functions
        assert!(result.functions.is_empty());
    }

    #[test]
    fn test_python_nested_class_found() {
        let result = extract_python(
            r#"
class Outer:
    class Inner:
        def run(self):
            pass
"#,
        );

        let names: Vec<&str> = result.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
        assert_eq!(result.classes[1].methods[0].full_name(), "Inner.run");
    }

    #[test]
    fn test_python_syntax_error_is_soft() {
        let result = extract_python("def broken(:\n    pass\n");

        assert!(!result.errors.is_empty());
        assert!(result.functions.is_empty());
        assert!(result.classes.is_empty());
    }

    #[test]
    fn test_js_function_patterns_and_dedup() {
        let result = extract_js(
            r#"
export function fetchUser(id, options = {}) {
  return api.get(id, options);
}

const formatName = (first, last) => `${first} ${last}`;

class UserStore extends BaseStore {
  load(id) {
    return this.cache[id];
  }
}
"#,
        );

        let names: Vec<&str> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fetchUser", "formatName", "load"]);

        let fetch = &result.functions[0];
        assert_eq!(fetch.parameters.len(), 2);
        assert_eq!(fetch.parameters[1].name, "options");
        assert_eq!(fetch.parameters[1].default.as_deref(), Some("{}"));

        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.classes[0].bases, vec!["BaseStore"]);
        assert_eq!(result.exports, vec!["fetchUser"]);
    }

    #[test]
    fn test_js_block_comment_as_docstring() {
        let result = extract_js(
            r#"/**
 * Adds two numbers.
 */
function add(a, b) {
  return a + b;
}
"#,
        );

        let func = &result.functions[0];
        assert!(func
            .docstring
            .as_deref()
            .unwrap()
            .contains("Adds two numbers"));
    }

    #[test]
    fn test_js_typed_parameters() {
        let mut extractor = CodeExtractor::new().unwrap();
        let result = extractor.extract_source(
            "test.ts",
            Language::TypeScript,
            "function pick(items: Array<string>, count: number = 1): string[] {\n  return items;\n}\n",
        );

        let func = &result.functions[0];
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(
            func.parameters[0].type_hint.as_deref(),
            Some("Array<string>")
        );
        assert_eq!(func.parameters[1].name, "count");
        assert_eq!(func.parameters[1].type_hint.as_deref(), Some("number"));
        assert_eq!(func.parameters[1].default.as_deref(), Some("1"));
        assert_eq!(func.return_type.as_deref(), Some("string[]"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let source = r#"
class Greeter:
    def greet(self, name="world"):
        """Say hello."""
        return name

def main(argv):
    return 0
"#;
        let first = extract_python(source);
        let second = extract_python(source);

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_extract_directory_skips_unsupported_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "not code").unwrap();
        std::fs::create_dir_all(dir.path().join("venv")).unwrap();
        std::fs::write(dir.path().join("venv/c.py"), "def g():\n    pass\n").unwrap();

        let mut extractor = CodeExtractor::new().unwrap();
        let results = extractor.extract_directory(dir.path(), &["venv".to_string()]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].functions[0].name, "f");
    }
}
