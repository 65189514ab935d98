//! Drift comparison between extracted signatures and documented items
//!
//! Builds name indices over both extraction outputs, matches code items
//! to doc items under a tolerant-but-precise policy, and emits typed
//! issues plus coverage stats.

use super::{ComparisonResult, ComparisonStats, DriftIssue, DriftSeverity, DriftType};
use crate::extract::{
    ClassSignature, CodeExtractor, DocExtractor, DocItemKind, DocParseResult, DocumentedItem,
    FunctionSignature, ParseResult,
};
use anyhow::Result;
use serde_json::json;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Default ignore patterns: constructor/dunder special methods plus the
/// leading-underscore private prefix rule.
pub fn default_ignore_patterns() -> Vec<String> {
    ["__init__", "__str__", "__repr__", "__eq__", "__hash__", "_*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Comparator configuration
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Name patterns excluded from undocumented-ness checks.
    /// A trailing `*` matches by prefix, a leading `*` by suffix,
    /// anything else by exact equality.
    pub ignore_patterns: Vec<String>,
    /// Flag code entities that carry no docstring and match no doc item
    pub require_docstrings: bool,
    /// Compare documented parameter names against the code signature
    pub check_parameters: bool,
    /// Reserved for future return-type checks
    pub check_return_types: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            require_docstrings: true,
            check_parameters: true,
            check_return_types: true,
        }
    }
}

/// Insertion-ordered name index. Re-inserting a key overwrites the value
/// but keeps the original position, which the matching policy depends on
/// (last processed wins, first position kept).
struct NameIndex<'a, T> {
    order: Vec<String>,
    map: HashMap<String, &'a T>,
}

impl<'a, T> NameIndex<'a, T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: &'a T) {
        if !self.map.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.map.insert(key, value);
    }

    fn get(&self, key: &str) -> Option<&'a T> {
        self.map.get(key).copied()
    }

    fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn iter<'s>(&'s self) -> impl Iterator<Item = (&'s str, &'a T)> + 's {
        self.order
            .iter()
            .filter_map(|key| self.map.get(key).map(|value| (key.as_str(), *value)))
    }
}

/// Compares code signatures with documented items
pub struct DriftComparator {
    config: CompareConfig,
}

impl DriftComparator {
    /// Create a comparator with the default configuration
    pub fn new() -> Self {
        Self {
            config: CompareConfig::default(),
        }
    }

    /// Create a comparator with a custom configuration
    pub fn with_config(config: CompareConfig) -> Self {
        Self { config }
    }

    /// Compare extraction outputs and emit typed issues.
    ///
    /// Pure function of its inputs; no state is retained between
    /// invocations.
    pub fn compare(
        &self,
        code_results: &[ParseResult],
        doc_results: &[DocParseResult],
    ) -> ComparisonResult {
        let mut result = ComparisonResult::default();

        let (functions, short_names) = index_functions(code_results);
        let classes = index_classes(code_results);
        let docs = index_doc_items(doc_results);

        let mut matched_docs: HashSet<String> = HashSet::new();

        for (name, func) in functions.iter() {
            if self.should_ignore(name) {
                continue;
            }

            if let Some(doc_item) = find_doc_item(name, &docs) {
                matched_docs.insert(doc_item.name.clone());
                self.check_function_drift(func, doc_item, &mut result);
            } else if func.docstring.is_none() && self.config.require_docstrings {
                result.add_issue(
                    DriftIssue::new(
                        DriftType::UndocumentedFunction,
                        undocumented_severity(func),
                        &format!("Function '{}' is not documented", name),
                        name,
                    )
                    .at_code(&func.filepath, func.line_number)
                    .with_suggestion(&format!("Add documentation for {}() in your docs", name)),
                );
            }
        }

        for (name, class) in classes.iter() {
            if self.should_ignore(name) {
                continue;
            }

            if let Some(doc_item) = find_doc_item(name, &docs) {
                matched_docs.insert(doc_item.name.clone());
                self.check_class_drift(class, doc_item, &mut result);
            } else if class.docstring.is_none() && self.config.require_docstrings {
                result.add_issue(
                    DriftIssue::new(
                        DriftType::UndocumentedClass,
                        DriftSeverity::Warning,
                        &format!("Class '{}' is not documented", name),
                        name,
                    )
                    .at_code(&class.filepath, class.line_number)
                    .with_suggestion(&format!("Add documentation for class {}", name)),
                );
            }
        }

        // Doc items never matched by any code entity, and whose name is
        // not a raw code name either, are the highest-confidence signal.
        for (name, doc_item) in docs.iter() {
            if matched_docs.contains(name) {
                continue;
            }
            if functions.contains(name) || short_names.contains_key(name) || classes.contains(name)
            {
                continue;
            }
            if is_external_reference(doc_item) {
                continue;
            }

            result.add_issue(
                DriftIssue::new(
                    DriftType::MissingFromCode,
                    DriftSeverity::Critical,
                    &format!("Documented item '{}' not found in code", name),
                    name,
                )
                .at_doc(&doc_item.filepath, doc_item.line_number)
                .with_suggestion(&format!(
                    "Remove or update documentation for '{}' - it may have been renamed or deleted",
                    name
                )),
            );
        }

        result.stats = ComparisonStats {
            total_functions: functions.len(),
            total_classes: classes.len(),
            total_documented: docs.len(),
            matched: matched_docs.len(),
            undocumented: (functions.len() + classes.len()).saturating_sub(matched_docs.len()),
        };

        result
    }

    /// A name is ignored if any configured pattern matches.
    fn should_ignore(&self, name: &str) -> bool {
        self.config.ignore_patterns.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                name.starts_with(prefix)
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name == pattern
            }
        })
    }

    fn check_function_drift(
        &self,
        func: &FunctionSignature,
        doc_item: &DocumentedItem,
        result: &mut ComparisonResult,
    ) {
        if self.config.check_parameters && !doc_item.parameters.is_empty() {
            let doc_params: BTreeSet<&str> =
                doc_item.parameters.iter().map(|p| p.name.as_str()).collect();
            let code_params: BTreeSet<&str> = func
                .parameters
                .iter()
                .map(|p| p.name.as_str())
                .filter(|name| *name != "self")
                .collect();

            let missing_in_docs: Vec<&str> =
                code_params.difference(&doc_params).copied().collect();
            if !missing_in_docs.is_empty() {
                result.add_issue(
                    DriftIssue::new(
                        DriftType::ParameterMismatch,
                        DriftSeverity::Warning,
                        &format!(
                            "Parameters {:?} not documented for '{}'",
                            missing_in_docs,
                            func.full_name()
                        ),
                        &func.full_name(),
                    )
                    .at_code(&func.filepath, func.line_number)
                    .at_doc(&doc_item.filepath, doc_item.line_number)
                    .with_detail("missing_params", json!(missing_in_docs))
                    .with_suggestion(&format!(
                        "Add documentation for parameters: {}",
                        missing_in_docs.join(", ")
                    )),
                );
            }

            // Docs referencing a removed parameter outrank an omission.
            let extra_in_docs: Vec<&str> = doc_params.difference(&code_params).copied().collect();
            if !extra_in_docs.is_empty() {
                result.add_issue(
                    DriftIssue::new(
                        DriftType::ParameterMismatch,
                        DriftSeverity::Critical,
                        &format!(
                            "Documented parameters {:?} don't exist in '{}'",
                            extra_in_docs,
                            func.full_name()
                        ),
                        &func.full_name(),
                    )
                    .at_code(&func.filepath, func.line_number)
                    .at_doc(&doc_item.filepath, doc_item.line_number)
                    .with_detail("extra_params", json!(extra_in_docs))
                    .with_suggestion(&format!(
                        "Remove documentation for deleted parameters: {}",
                        extra_in_docs.join(", ")
                    )),
                );
            }
        }

        if doc_item.deprecated && !has_deprecation_marker(&func.decorators) {
            result.add_issue(
                DriftIssue::new(
                    DriftType::MissingDeprecationNotice,
                    DriftSeverity::Info,
                    &format!(
                        "'{}' is marked deprecated in docs but not in code",
                        func.full_name()
                    ),
                    &func.full_name(),
                )
                .at_code(&func.filepath, func.line_number)
                .with_suggestion("Add a deprecation decorator to the function"),
            );
        }
    }

    fn check_class_drift(
        &self,
        class: &ClassSignature,
        doc_item: &DocumentedItem,
        result: &mut ComparisonResult,
    ) {
        if doc_item.deprecated && !has_deprecation_marker(&class.decorators) {
            result.add_issue(
                DriftIssue::new(
                    DriftType::MissingDeprecationNotice,
                    DriftSeverity::Info,
                    &format!(
                        "Class '{}' is marked deprecated in docs but not in code",
                        class.name
                    ),
                    &class.name,
                )
                .at_code(&class.filepath, class.line_number),
            );
        }
    }
}

impl Default for DriftComparator {
    fn default() -> Self {
        Self::new()
    }
}

/// Function index keyed by full qualified name, plus a bare-name alias
/// map for methods (last processed wins on collisions).
fn index_functions<'a>(
    results: &'a [ParseResult],
) -> (
    NameIndex<'a, FunctionSignature>,
    HashMap<String, &'a FunctionSignature>,
) {
    let mut index = NameIndex::new();
    let mut short_names: HashMap<String, &'a FunctionSignature> = HashMap::new();

    for result in results {
        for func in &result.functions {
            index.insert(func.full_name(), func);
            if func.class_name.is_some() {
                short_names.insert(func.name.clone(), func);
            }
        }
        for class in &result.classes {
            for method in &class.methods {
                index.insert(method.full_name(), method);
                short_names.insert(method.name.clone(), method);
            }
        }
    }

    (index, short_names)
}

fn index_classes(results: &[ParseResult]) -> NameIndex<'_, ClassSignature> {
    let mut index = NameIndex::new();
    for result in results {
        for class in &result.classes {
            index.insert(class.name.clone(), class);
        }
    }
    index
}

fn index_doc_items(results: &[DocParseResult]) -> NameIndex<'_, DocumentedItem> {
    let mut index = NameIndex::new();
    for result in results {
        for item in &result.items {
            index.insert(item.name.clone(), item);
        }
    }
    index
}

/// Matching policy: exact name, then unqualified suffix, then a
/// case-insensitive scan. The first successful step wins. Among
/// case-insensitive collisions the lexicographically-first doc name is
/// chosen, so the fallback stays deterministic.
fn find_doc_item<'a>(
    name: &str,
    docs: &NameIndex<'a, DocumentedItem>,
) -> Option<&'a DocumentedItem> {
    if let Some(item) = docs.get(name) {
        return Some(item);
    }

    if let Some((_, short)) = name.rsplit_once('.') {
        if let Some(item) = docs.get(short) {
            return Some(item);
        }
    }

    let lower = name.to_lowercase();
    docs.iter()
        .filter(|(doc_name, _)| doc_name.to_lowercase() == lower)
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, item)| item)
}

/// Public-API surfaces are held to the highest bar.
fn undocumented_severity(func: &FunctionSignature) -> DriftSeverity {
    if func.name.starts_with('_') {
        return DriftSeverity::Info;
    }
    let marks_api = func.decorators.iter().any(|d| {
        let d = d.to_lowercase();
        d.contains("api") || d.contains("public")
    });
    if marks_api {
        DriftSeverity::Critical
    } else {
        DriftSeverity::Warning
    }
}

fn has_deprecation_marker(decorators: &[String]) -> bool {
    decorators
        .iter()
        .any(|d| d.to_lowercase().contains("deprecat"))
}

/// A documented item intentionally not expected in the code under scan.
fn is_external_reference(doc_item: &DocumentedItem) -> bool {
    if doc_item.doc_type == DocItemKind::ApiEndpoint {
        return true;
    }
    if let Some(description) = &doc_item.description {
        let description = description.to_lowercase();
        return ["external", "third-party", "library", "package"]
            .iter()
            .any(|hint| description.contains(hint));
    }
    false
}

/// Convenience entry point: extract both directories, then compare.
pub fn compare_paths(
    code_path: &Path,
    docs_path: &Path,
    config: CompareConfig,
    exclude_patterns: &[String],
) -> Result<ComparisonResult> {
    let mut code_extractor = CodeExtractor::new()?;
    let doc_extractor = DocExtractor::new();

    let code_results = code_extractor.extract_directory(code_path, exclude_patterns);
    let doc_results = doc_extractor.extract_directory(docs_path, exclude_patterns);

    Ok(DriftComparator::with_config(config).compare(&code_results, &doc_results))
}
