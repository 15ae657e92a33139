//! Validation engine
//!
//! Built-in lint rules over the parsed block tree plus independent raw-text
//! scans. The tree walk catches structural and semantic issues; the raw
//! scans catch delimiter problems the tolerant parser silently absorbs.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::LinterConfig;
use crate::parser::{parse_document, Block};
use crate::validation::diagnostics::{Diagnostic, DiagnosticKind, ValidationResult};
use crate::validation::extensions::{ContentTransform, CustomRule};

/// Block kinds that are legitimately empty
const EMPTY_EXEMPT_BLOCKS: &[&str] = &["core/spacer", "core/separator"];

/// Per-name attribute sanity checks
type AttributeCheck = fn(&Block, &str, &mut ValidationResult);

const ATTRIBUTE_CHECKS: &[(&str, AttributeCheck)] = &[
    ("core/image", check_image_attributes),
    ("core/heading", check_heading_attributes),
    ("core/columns", check_columns_attributes),
];

fn opener_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!-- wp:([a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s+(?:\{[^}]*\}\s+)?-->")
            .expect("hard-coded pattern")
    })
}

fn closer_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!-- /wp:([a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?)\s*-->")
            .expect("hard-coded pattern")
    })
}

fn attrs_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<!-- wp:[a-z][a-z0-9_-]*(?:/[a-z][a-z0-9_-]*)?\s+(\{[^}]*\})\s*/?-->")
            .expect("hard-coded pattern")
    })
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9-]*(?:/[a-z][a-z0-9-]*)?$").expect("hard-coded pattern")
    })
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("hard-coded pattern"))
}

/// Result of one lint run
#[derive(Debug)]
pub struct LintOutcome {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// Document content after all registered transforms
    pub content: String,
}

impl LintOutcome {
    /// Overall pass; warnings never affect this
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The lint rule engine.
///
/// Holds configuration and registered extensions; each call to [`lint`]
/// collects a fresh set of diagnostics, so one instance can serve any
/// number of independent documents.
///
/// [`lint`]: Linter::lint
pub struct Linter {
    config: LinterConfig,
    custom_rules: Vec<CustomRule>,
    transforms: Vec<ContentTransform>,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(LinterConfig::default())
    }
}

impl Linter {
    pub fn new(config: LinterConfig) -> Self {
        Self {
            config,
            custom_rules: Vec::new(),
            transforms: Vec::new(),
        }
    }

    pub fn config(&self) -> &LinterConfig {
        &self.config
    }

    /// Register a custom rule, run after the built-in rules in order
    pub fn add_rule(&mut self, rule: CustomRule) {
        self.custom_rules.push(rule);
    }

    /// Register a content transform, run after all validation in order
    pub fn add_transform(&mut self, transform: ContentTransform) {
        self.transforms.push(transform);
    }

    /// Lint one document
    pub fn lint(&self, content: &str) -> LintOutcome {
        let mut result = ValidationResult::new();
        let blocks = parse_document(content);

        self.validate_block_count(&blocks, &mut result);
        let mut parents = Vec::new();
        self.validate_blocks(&blocks, 1, &mut parents, &mut result);
        self.check_unclosed_blocks(content, &mut result);
        self.check_orphaned_closers(content, &mut result);
        if self.config.check_malformed_json {
            self.check_malformed_json(content, &mut result);
        }

        for rule in &self.custom_rules {
            match rule(content, &blocks, &self.config) {
                Ok(findings) => {
                    result.errors.extend(findings.errors);
                    result.warnings.extend(findings.warnings);
                }
                Err(reason) => result.add_error(Diagnostic::new(
                    DiagnosticKind::CustomValidatorError,
                    format!("Custom validator failed: {reason}"),
                )),
            }
        }

        let mut content_out = content.to_string();
        for transform in &self.transforms {
            match transform(&content_out, &result.errors, &result.warnings) {
                Ok(next) => content_out = next,
                Err(reason) => result.add_warning(Diagnostic::new(
                    DiagnosticKind::PostValidationCallbackError,
                    format!("Post-validation callback failed: {reason}"),
                )),
            }
        }

        log::debug!(
            "lint finished: {} errors, {} warnings",
            result.errors.len(),
            result.warnings.len()
        );

        LintOutcome {
            errors: result.errors,
            warnings: result.warnings,
            content: content_out,
        }
    }

    fn validate_block_count(&self, blocks: &[Block], result: &mut ValidationResult) {
        let count: usize = blocks.iter().map(Block::named_count).sum();
        if count > self.config.max_block_count {
            result.add_error(Diagnostic::new(
                DiagnosticKind::MaxBlocksExceeded {
                    count,
                    max: self.config.max_block_count,
                },
                format!(
                    "Total block count ({count}) exceeds maximum ({})",
                    self.config.max_block_count
                ),
            ));
        }
    }

    fn validate_blocks(
        &self,
        blocks: &[Block],
        depth: usize,
        parents: &mut Vec<String>,
        result: &mut ValidationResult,
    ) {
        for block in blocks {
            if let Some(name) = &block.name {
                self.validate_block(block, name, depth, parents, result);
            }

            if !block.inner_blocks.is_empty() {
                let pushed = if let Some(name) = &block.name {
                    parents.push(name.clone());
                    true
                } else {
                    false
                };
                self.validate_blocks(&block.inner_blocks, depth + 1, parents, result);
                if pushed {
                    parents.pop();
                }
            }
        }
    }

    fn validate_block(
        &self,
        block: &Block,
        name: &str,
        depth: usize,
        parents: &[String],
        result: &mut ValidationResult,
    ) {
        if depth > self.config.max_nesting_depth {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::MaxDepthExceeded {
                        depth,
                        max: self.config.max_nesting_depth,
                    },
                    format!(
                        "Block '{name}' exceeds maximum nesting depth of {}",
                        self.config.max_nesting_depth
                    ),
                )
                .with_block(name),
            );
        }

        self.validate_block_name(name, result);

        if !block.attrs.is_empty() {
            self.validate_attributes(block, name, result);
        }

        if self.config.check_empty_blocks {
            self.check_empty_block(block, name, result);
        }

        if self.config.validate_parent_child_relationships {
            self.validate_ancestor_constraint(name, parents, result);
        }
    }

    fn validate_block_name(&self, name: &str, result: &mut ValidationResult) {
        if self.config.validate_namespaces && !name_pattern().is_match(name) {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::InvalidBlockName,
                    format!("Invalid block name format: '{name}'"),
                )
                .with_block(name),
            );
            // Invalid names skip the remaining per-name checks.
            return;
        }

        if !self.config.allowed_blocks.is_empty() && !self.config.allowed_blocks.contains(name) {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::ForbiddenBlock,
                    format!("Block '{name}' is not in the allowed blocks list"),
                )
                .with_block(name),
            );
        }

        if self.config.forbidden_blocks.contains(name) {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::ForbiddenBlock,
                    format!("Block '{name}' is forbidden"),
                )
                .with_block(name),
            );
        }

        if name.starts_with("core/") && !self.config.core_blocks.contains(name) {
            result.add_warning(
                Diagnostic::new(
                    DiagnosticKind::UnknownCoreBlock,
                    format!("Unknown core block: '{name}'"),
                )
                .with_block(name),
            );
        }
    }

    fn validate_attributes(&self, block: &Block, name: &str, result: &mut ValidationResult) {
        if let Ok(serialized) = serde_json::to_string(&block.attrs) {
            let size = serialized.len();
            if size > self.config.max_attribute_size {
                result.add_error(
                    Diagnostic::new(
                        DiagnosticKind::AttributeSizeExceeded {
                            size,
                            max: self.config.max_attribute_size,
                        },
                        format!("Attributes for block '{name}' exceed maximum size"),
                    )
                    .with_block(name),
                );
            }
        }

        for (checked_name, check) in ATTRIBUTE_CHECKS {
            if *checked_name == name {
                check(block, name, result);
            }
        }
    }

    fn check_empty_block(&self, block: &Block, name: &str, result: &mut ValidationResult) {
        let stripped = tag_pattern().replace_all(&block.inner_html, "");
        let has_content = !stripped.trim().is_empty()
            || !block.inner_blocks.is_empty()
            || !block.attrs.is_empty();

        if !has_content && !EMPTY_EXEMPT_BLOCKS.contains(&name) {
            result.add_warning(
                Diagnostic::new(
                    DiagnosticKind::EmptyBlock,
                    format!("Empty block found: '{name}'"),
                )
                .with_block(name),
            );
        }
    }

    fn validate_ancestor_constraint(
        &self,
        name: &str,
        parents: &[String],
        result: &mut ValidationResult,
    ) {
        let Some(required) = self.config.parent_child_relationships.get(name) else {
            return;
        };

        let satisfied = parents.iter().any(|parent| required.contains(parent));
        if !satisfied {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::InvalidParentChildRelationship {
                        required_parents: required.clone(),
                        current_parents: parents.to_vec(),
                    },
                    format!(
                        "Block '{name}' requires a parent block of type: {}",
                        required.join(", ")
                    ),
                )
                .with_block(name),
            );
        }
    }

    /// Count opener vs closer occurrences per name directly in the raw
    /// text, bypassing the tolerant tree builder
    fn check_unclosed_blocks(&self, content: &str, result: &mut ValidationResult) {
        let mut order: Vec<String> = Vec::new();
        let mut opened: HashMap<String, usize> = HashMap::new();
        for caps in opener_pattern().captures_iter(content) {
            let name = caps[1].to_string();
            if !opened.contains_key(&name) {
                order.push(name.clone());
            }
            *opened.entry(name).or_insert(0) += 1;
        }

        let mut closed: HashMap<String, usize> = HashMap::new();
        for caps in closer_pattern().captures_iter(content) {
            *closed.entry(caps[1].to_string()).or_insert(0) += 1;
        }

        for name in order {
            let opened_count = opened[&name];
            let closed_count = closed.get(&name).copied().unwrap_or(0);
            if opened_count > closed_count {
                result.add_error(
                    Diagnostic::new(
                        DiagnosticKind::UnclosedBlock {
                            opened: opened_count,
                            closed: closed_count,
                        },
                        format!(
                            "Unclosed block found: '{name}' (opened {opened_count} times, closed {closed_count} times)"
                        ),
                    )
                    .with_block(name),
                );
            }
        }
    }

    /// Flag closers with no matching opener earlier in the raw text
    fn check_orphaned_closers(&self, content: &str, result: &mut ValidationResult) {
        let openers: Vec<(String, usize)> = opener_pattern()
            .captures_iter(content)
            .map(|caps| {
                let m = caps.get(0).expect("whole match");
                (caps[1].to_string(), m.start())
            })
            .collect();

        for caps in closer_pattern().captures_iter(content) {
            let m = caps.get(0).expect("whole match");
            let name = &caps[1];
            let position = m.start();

            let has_opener = openers
                .iter()
                .any(|(opener, start)| opener == name && *start < position);
            if !has_opener {
                result.add_warning(
                    Diagnostic::new(
                        DiagnosticKind::OrphanedCloser { position },
                        format!("Closing tag without opening tag: '{name}'"),
                    )
                    .with_block(name),
                );
            }
        }
    }

    /// Re-extract each opener's attribute payload and parse it strictly.
    /// The tokenizer tolerates the same failure; this rule does not.
    fn check_malformed_json(&self, content: &str, result: &mut ValidationResult) {
        for caps in attrs_pattern().captures_iter(content) {
            let payload = caps.get(1).expect("payload group");
            if let Err(parse_error) = serde_json::from_str::<Value>(payload.as_str()) {
                result.add_error(Diagnostic::new(
                    DiagnosticKind::MalformedJsonAttributes {
                        position: payload.start(),
                        json_text: payload.as_str().to_string(),
                        parse_error: parse_error.to_string(),
                    },
                    format!("Malformed JSON in block attributes: {parse_error}"),
                ));
            }
        }
    }
}

fn check_image_attributes(block: &Block, name: &str, result: &mut ValidationResult) {
    if attr_is_empty(block.attrs.get("url")) && attr_is_empty(block.attrs.get("id")) {
        result.add_warning(
            Diagnostic::new(
                DiagnosticKind::MissingRequiredAttribute,
                "Image block missing 'url' or 'id' attribute",
            )
            .with_block(name),
        );
    }
}

fn check_heading_attributes(block: &Block, name: &str, result: &mut ValidationResult) {
    if let Some(level) = block.attrs.get("level") {
        let in_range = numeric_value(level).is_some_and(|n| (1.0..=6.0).contains(&n));
        if !in_range {
            result.add_error(
                Diagnostic::new(
                    DiagnosticKind::InvalidAttributeValue,
                    format!("Invalid heading level: {}", value_display(level)),
                )
                .with_block(name),
            );
        }
    }
}

fn check_columns_attributes(block: &Block, name: &str, result: &mut ValidationResult) {
    if let Some(columns) = block.attrs.get("columns") {
        let in_range = numeric_value(columns).is_some_and(|n| (1.0..=6.0).contains(&n));
        if !in_range {
            result.add_warning(
                Diagnostic::new(
                    DiagnosticKind::InvalidAttributeValue,
                    format!("Unusual column count: {}", value_display(columns)),
                )
                .with_block(name),
            );
        }
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Absent, null, empty-string, zero, false, and empty containers all count
/// as missing
fn attr_is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn value_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::extensions::RuleFindings;

    fn lint_default(content: &str) -> LintOutcome {
        Linter::default().lint(content)
    }

    #[test]
    fn clean_document_passes() {
        let outcome =
            lint_default("<!-- wp:core/paragraph -->Hello<!-- /wp:core/paragraph -->");
        assert!(outcome.passed());
        assert!(outcome.errors.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn empty_block_is_warned() {
        let outcome = lint_default("<!-- wp:core/paragraph --><!-- /wp:core/paragraph -->");
        assert!(outcome.passed());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, DiagnosticKind::EmptyBlock);
    }

    #[test]
    fn empty_exempt_blocks_are_not_warned() {
        let outcome = lint_default("<!-- wp:core/separator --><!-- /wp:core/separator -->");
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn markup_with_only_tags_counts_as_empty() {
        let outcome =
            lint_default("<!-- wp:core/paragraph --><p></p><!-- /wp:core/paragraph -->");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, DiagnosticKind::EmptyBlock);
    }

    #[test]
    fn forbidden_block_is_an_error() {
        let mut config = LinterConfig::default();
        config.forbidden_blocks.insert("core/html".to_string());
        let outcome = Linter::new(config)
            .lint("<!-- wp:core/html -->x<!-- /wp:core/html -->");
        assert!(!outcome.passed());
        assert_eq!(outcome.errors[0].kind, DiagnosticKind::ForbiddenBlock);
    }

    #[test]
    fn allow_list_rejects_other_blocks() {
        let mut config = LinterConfig::default();
        config.allowed_blocks.insert("core/paragraph".to_string());
        let outcome =
            Linter::new(config).lint("<!-- wp:core/quote -->q<!-- /wp:core/quote -->");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, DiagnosticKind::ForbiddenBlock);
        assert!(outcome.errors[0].message.contains("allowed blocks list"));
    }

    #[test]
    fn invalid_name_short_circuits_name_checks() {
        // Underscores pass the tokenizer but fail the name-syntax rule; the
        // unknown-core warning must not also fire.
        let outcome = lint_default("<!-- wp:core/bad_name -->x<!-- /wp:core/bad_name -->");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, DiagnosticKind::InvalidBlockName);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn name_syntax_tolerated_when_namespace_validation_off() {
        let config = LinterConfig {
            validate_namespaces: false,
            ..LinterConfig::default()
        };
        let outcome =
            Linter::new(config).lint("<!-- wp:core/bad_name -->x<!-- /wp:core/bad_name -->");
        assert!(outcome.errors.is_empty());
        // The unknown-core warning still applies.
        assert_eq!(outcome.warnings[0].kind, DiagnosticKind::UnknownCoreBlock);
    }

    #[test]
    fn unknown_core_block_is_warned() {
        let outcome = lint_default("<!-- wp:core/madeup -->x<!-- /wp:core/madeup -->");
        assert!(outcome.passed());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, DiagnosticKind::UnknownCoreBlock);
    }

    #[test]
    fn third_party_namespace_is_not_core_checked() {
        let outcome = lint_default("<!-- wp:myplugin/widget -->x<!-- /wp:myplugin/widget -->");
        assert!(outcome.warnings.is_empty());
        assert!(outcome.passed());
    }

    #[test]
    fn heading_level_out_of_range_is_an_error() {
        let outcome = lint_default(
            r#"<!-- wp:core/heading {"level":9} -->H<!-- /wp:core/heading -->"#,
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].kind,
            DiagnosticKind::InvalidAttributeValue
        );
        assert!(outcome.errors[0].message.contains('9'));
    }

    #[test]
    fn heading_level_in_range_is_fine() {
        let outcome = lint_default(
            r#"<!-- wp:core/heading {"level":3} -->H<!-- /wp:core/heading -->"#,
        );
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn heading_level_numeric_string_is_accepted() {
        let outcome = lint_default(
            r#"<!-- wp:core/heading {"level":"2"} -->H<!-- /wp:core/heading -->"#,
        );
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn unusual_column_count_is_a_warning() {
        let outcome = lint_default(
            r#"<!-- wp:core/columns {"columns":9} -->x<!-- /wp:core/columns -->"#,
        );
        assert!(outcome.passed());
        assert_eq!(
            outcome.warnings[0].kind,
            DiagnosticKind::InvalidAttributeValue
        );
    }

    #[test]
    fn image_without_url_or_id_is_warned() {
        let outcome = lint_default(r#"<!-- wp:core/image {"alt":"x"} /-->"#);
        assert_eq!(
            outcome.warnings[0].kind,
            DiagnosticKind::MissingRequiredAttribute
        );
    }

    #[test]
    fn void_image_with_url_is_clean() {
        let outcome = lint_default(r#"<!-- wp:core/image {"url":"x.png"} /-->"#);
        assert!(outcome.errors.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn attribute_size_limit() {
        let config = LinterConfig {
            max_attribute_size: 16,
            ..LinterConfig::default()
        };
        let outcome = Linter::new(config).lint(
            r#"<!-- wp:core/paragraph {"text":"a very long attribute value"} -->x<!-- /wp:core/paragraph -->"#,
        );
        assert!(outcome
            .errors
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::AttributeSizeExceeded { .. })));
    }

    #[test]
    fn block_count_limit() {
        let config = LinterConfig {
            max_block_count: 2,
            ..LinterConfig::default()
        };
        let doc = "<!-- wp:core/separator --><!-- /wp:core/separator -->".repeat(3);
        let outcome = Linter::new(config).lint(&doc);
        assert!(outcome.errors.iter().any(|d| matches!(
            d.kind,
            DiagnosticKind::MaxBlocksExceeded { count: 3, max: 2 }
        )));
    }

    #[test]
    fn nesting_depth_limit() {
        let config = LinterConfig {
            max_nesting_depth: 2,
            ..LinterConfig::default()
        };
        let doc = "<!-- wp:core/group --><!-- wp:core/group --><!-- wp:core/group -->x\
                   <!-- /wp:core/group --><!-- /wp:core/group --><!-- /wp:core/group -->";
        let outcome = Linter::new(config).lint(doc);
        let depth_errors: Vec<_> = outcome
            .errors
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::MaxDepthExceeded { .. }))
            .collect();
        assert_eq!(depth_errors.len(), 1);
        assert_eq!(
            depth_errors[0].kind,
            DiagnosticKind::MaxDepthExceeded { depth: 3, max: 2 }
        );
    }

    #[test]
    fn ancestor_requirement_violated() {
        let outcome = lint_default("<!-- wp:core/column -->x<!-- /wp:core/column -->");
        let error = outcome
            .errors
            .iter()
            .find(|d| matches!(d.kind, DiagnosticKind::InvalidParentChildRelationship { .. }))
            .expect("ancestor error");
        assert!(error.message.contains("core/columns"));
    }

    #[test]
    fn ancestor_anywhere_in_chain_satisfies() {
        // The required ancestor is the grandparent, not the direct parent.
        let doc = "<!-- wp:core/columns --><!-- wp:core/group -->\
                   <!-- wp:core/column -->x<!-- /wp:core/column -->\
                   <!-- /wp:core/group --><!-- /wp:core/columns -->";
        let outcome = lint_default(doc);
        assert!(!outcome
            .errors
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::InvalidParentChildRelationship { .. })));
    }

    #[test]
    fn ancestor_check_can_be_disabled() {
        let config = LinterConfig {
            validate_parent_child_relationships: false,
            ..LinterConfig::default()
        };
        let outcome =
            Linter::new(config).lint("<!-- wp:core/column -->x<!-- /wp:core/column -->");
        assert!(outcome.passed());
    }

    #[test]
    fn unclosed_block_counts_reported() {
        let doc = "<!-- wp:core/group -->a<!-- wp:core/group -->b<!-- /wp:core/group -->";
        let outcome = lint_default(doc);
        let unclosed = outcome
            .errors
            .iter()
            .find(|d| matches!(d.kind, DiagnosticKind::UnclosedBlock { .. }))
            .expect("unclosed error");
        assert_eq!(
            unclosed.kind,
            DiagnosticKind::UnclosedBlock {
                opened: 2,
                closed: 1
            }
        );
        assert_eq!(unclosed.block.as_deref(), Some("core/group"));
    }

    #[test]
    fn orphaned_closer_is_warned_with_position() {
        let doc = "text <!-- /wp:core/group -->";
        let outcome = lint_default(doc);
        let orphan = outcome
            .warnings
            .iter()
            .find(|d| matches!(d.kind, DiagnosticKind::OrphanedCloser { .. }))
            .expect("orphan warning");
        assert_eq!(orphan.kind, DiagnosticKind::OrphanedCloser { position: 5 });
    }

    #[test]
    fn closer_after_opener_is_not_orphaned() {
        let doc = "<!-- wp:core/group -->x<!-- /wp:core/group -->";
        let outcome = lint_default(doc);
        assert!(!outcome
            .warnings
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::OrphanedCloser { .. })));
    }

    #[test]
    fn malformed_json_is_a_hard_error_despite_tolerant_parse() {
        let outcome = lint_default("<!-- wp:core/foo {bad json} -->");
        let malformed = outcome
            .errors
            .iter()
            .find(|d| matches!(d.kind, DiagnosticKind::MalformedJsonAttributes { .. }))
            .expect("malformed json error");
        if let DiagnosticKind::MalformedJsonAttributes { json_text, .. } = &malformed.kind {
            assert_eq!(json_text, "{bad json}");
        }
    }

    #[test]
    fn malformed_json_check_can_be_disabled() {
        let config = LinterConfig {
            check_malformed_json: false,
            ..LinterConfig::default()
        };
        let outcome = Linter::new(config).lint("<!-- wp:core/foo {bad json} -->");
        assert!(!outcome
            .errors
            .iter()
            .any(|d| matches!(d.kind, DiagnosticKind::MalformedJsonAttributes { .. })));
    }

    #[test]
    fn empty_check_can_be_disabled() {
        let config = LinterConfig {
            check_empty_blocks: false,
            ..LinterConfig::default()
        };
        let outcome =
            Linter::new(config).lint("<!-- wp:core/paragraph --><!-- /wp:core/paragraph -->");
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn custom_rule_contributes_findings() {
        fn flag_everything(
            _content: &str,
            blocks: &[Block],
            _config: &LinterConfig,
        ) -> Result<RuleFindings, String> {
            let mut findings = RuleFindings::default();
            if !blocks.is_empty() {
                findings
                    .warnings
                    .push(Diagnostic::new(DiagnosticKind::EmptyBlock, "house rule"));
            }
            Ok(findings)
        }

        let mut linter = Linter::default();
        linter.add_rule(flag_everything);
        let outcome = linter.lint("plain text");
        assert!(outcome.warnings.iter().any(|d| d.message == "house rule"));
    }

    #[test]
    fn failing_custom_rule_does_not_abort_later_rules() {
        fn broken(
            _content: &str,
            _blocks: &[Block],
            _config: &LinterConfig,
        ) -> Result<RuleFindings, String> {
            Err("boom".to_string())
        }
        fn working(
            _content: &str,
            _blocks: &[Block],
            _config: &LinterConfig,
        ) -> Result<RuleFindings, String> {
            let mut findings = RuleFindings::default();
            findings
                .warnings
                .push(Diagnostic::new(DiagnosticKind::EmptyBlock, "still ran"));
            Ok(findings)
        }

        let mut linter = Linter::default();
        linter.add_rule(broken);
        linter.add_rule(working);
        let outcome = linter.lint("x");
        assert!(outcome
            .errors
            .iter()
            .any(|d| d.kind == DiagnosticKind::CustomValidatorError
                && d.message.contains("boom")));
        assert!(outcome.warnings.iter().any(|d| d.message == "still ran"));
    }

    #[test]
    fn transforms_shape_content_in_order() {
        fn upper(
            content: &str,
            _errors: &[Diagnostic],
            _warnings: &[Diagnostic],
        ) -> Result<String, String> {
            Ok(content.to_uppercase())
        }
        fn exclaim(
            content: &str,
            _errors: &[Diagnostic],
            _warnings: &[Diagnostic],
        ) -> Result<String, String> {
            Ok(format!("{content}!"))
        }

        let mut linter = Linter::default();
        linter.add_transform(upper);
        linter.add_transform(exclaim);
        let outcome = linter.lint("abc");
        assert_eq!(outcome.content, "ABC!");
    }

    #[test]
    fn failing_transform_warns_and_keeps_diagnostics() {
        fn broken(
            _content: &str,
            _errors: &[Diagnostic],
            _warnings: &[Diagnostic],
        ) -> Result<String, String> {
            Err("no output".to_string())
        }

        let mut linter = Linter::default();
        linter.add_transform(broken);
        let outcome = linter.lint("<!-- wp:core/paragraph --><!-- /wp:core/paragraph -->");
        // The empty-block warning collected before the transform survives.
        assert!(outcome
            .warnings
            .iter()
            .any(|d| d.kind == DiagnosticKind::EmptyBlock));
        assert!(outcome
            .warnings
            .iter()
            .any(|d| d.kind == DiagnosticKind::PostValidationCallbackError));
        assert_eq!(
            outcome.content,
            "<!-- wp:core/paragraph --><!-- /wp:core/paragraph -->"
        );
    }
}
