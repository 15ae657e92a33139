//! Block Linter
//!
//! A standalone validator for Gutenberg-style block markup that does not
//! require WordPress.
//!
//! This library provides:
//! - Tolerant block-comment tokenization and tree building
//! - A rule-based validation engine with structured diagnostics
//! - Pluggable custom rules and post-validation content transforms
//! - Configuration management

pub mod config;
pub mod parser;
pub mod validation;

// Re-exports for clean public API
pub use config::LinterConfig;
pub use parser::{parse_document, Block};
pub use validation::{Diagnostic, DiagnosticKind, LintOutcome, Linter};
