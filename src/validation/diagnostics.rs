//! Diagnostic model
//!
//! Structured findings produced by the lint rules. The kinds form a small
//! closed taxonomy; payload fields live on the variant that needs them.

/// What a diagnostic is about, with kind-specific structured fields
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// Total named-block count exceeds the configured maximum
    MaxBlocksExceeded { count: usize, max: usize },
    /// A block is nested deeper than the configured maximum
    MaxDepthExceeded { depth: usize, max: usize },
    /// Block name does not match the `segment` or `segment/segment` syntax
    InvalidBlockName,
    /// Block name fails the allow-list or appears on the deny-list
    ForbiddenBlock,
    /// Name under `core/` that is not in the reference set of known blocks
    UnknownCoreBlock,
    /// Serialized attributes exceed the configured byte maximum
    AttributeSizeExceeded { size: usize, max: usize },
    /// A block-specific required attribute is absent or empty
    MissingRequiredAttribute,
    /// A block-specific attribute has an out-of-range or invalid value
    InvalidAttributeValue,
    /// A block with no content, children, or attributes
    EmptyBlock,
    /// A block missing its required ancestor anywhere in the chain
    InvalidParentChildRelationship {
        required_parents: Vec<String>,
        current_parents: Vec<String>,
    },
    /// More openers than closers for a name in the raw text
    UnclosedBlock { opened: usize, closed: usize },
    /// A closer with no earlier matching opener in the raw text
    OrphanedCloser { position: usize },
    /// An attribute payload the strict JSON parse rejects
    MalformedJsonAttributes {
        position: usize,
        json_text: String,
        parse_error: String,
    },
    /// A pluggable rule returned a failure
    CustomValidatorError,
    /// A content transform returned a failure
    PostValidationCallbackError,
}

impl DiagnosticKind {
    /// Stable machine-readable code for report output
    pub fn code(&self) -> &'static str {
        match self {
            Self::MaxBlocksExceeded { .. } => "max_blocks_exceeded",
            Self::MaxDepthExceeded { .. } => "max_depth_exceeded",
            Self::InvalidBlockName => "invalid_block_name",
            Self::ForbiddenBlock => "forbidden_block",
            Self::UnknownCoreBlock => "unknown_core_block",
            Self::AttributeSizeExceeded { .. } => "attribute_size_exceeded",
            Self::MissingRequiredAttribute => "missing_required_attribute",
            Self::InvalidAttributeValue => "invalid_attribute_value",
            Self::EmptyBlock => "empty_block",
            Self::InvalidParentChildRelationship { .. } => "invalid_parent_child_relationship",
            Self::UnclosedBlock { .. } => "unclosed_block",
            Self::OrphanedCloser { .. } => "orphaned_closer",
            Self::MalformedJsonAttributes { .. } => "malformed_json_attributes",
            Self::CustomValidatorError => "custom_validator_error",
            Self::PostValidationCallbackError => "post_validation_callback_error",
        }
    }
}

/// One validation finding; error or warning is decided by which sequence
/// of the [`ValidationResult`] it lands in
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Name of the offending block, when one is identifiable
    pub block: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            block: None,
        }
    }

    pub fn with_block(mut self, block: impl Into<String>) -> Self {
        self.block = Some(block.into());
        self
    }
}

/// Ordered error and warning sequences for one lint run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    pub fn add_warning(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }

    /// Warnings never affect the outcome
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
