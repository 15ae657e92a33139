//! Validation
//!
//! Rule engine, diagnostic model, and extension points, separated from
//! parsing and CLI concerns.

pub mod diagnostics;
pub mod engine;
pub mod extensions;

pub use diagnostics::{Diagnostic, DiagnosticKind, ValidationResult};
pub use engine::{LintOutcome, Linter};
pub use extensions::{ContentTransform, CustomRule, RuleFindings};
