//! Extension points
//!
//! Pluggable rules and content transforms, run after the built-in rules.
//! Both are plain function types registered in order on the [`Linter`];
//! a failure in one becomes a single diagnostic and never aborts the rest.
//!
//! [`Linter`]: crate::validation::Linter

use crate::config::LinterConfig;
use crate::parser::Block;
use crate::validation::diagnostics::Diagnostic;

/// Findings contributed by one custom rule
#[derive(Debug, Default)]
pub struct RuleFindings {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// A pluggable validation rule.
///
/// Receives the raw document, the parsed tree, and the active configuration.
/// Returning `Err` surfaces one `custom_validator_error` diagnostic.
pub type CustomRule = fn(&str, &[Block], &LinterConfig) -> Result<RuleFindings, String>;

/// A post-validation content transform.
///
/// Receives the current content and the already-collected errors and
/// warnings, and returns possibly-modified content for downstream use.
/// Transforms never alter the collected diagnostics; returning `Err`
/// surfaces one `post_validation_callback_error` warning.
pub type ContentTransform = fn(&str, &[Diagnostic], &[Diagnostic]) -> Result<String, String>;
