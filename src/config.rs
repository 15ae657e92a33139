//! Configuration management for the block linter.
//!
//! Handles:
//! - Command-line argument parsing
//! - JSON configuration-file loading
//! - Default limits, reference block set, and ancestor requirements

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

/// Command-line arguments for the block linter
#[derive(Debug, Parser)]
#[command(name = "block-lint")]
#[command(about = "Standalone linter for Gutenberg-style block markup")]
#[command(version)]
pub struct Args {
    /// File to lint; reads stdin when omitted
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Immutable settings for one linter instance.
///
/// Every field has a default, so a configuration file only needs to name
/// the options it changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    /// Maximum block nesting depth; the top level counts as depth 1
    pub max_nesting_depth: usize,
    /// Maximum total number of named blocks in a document
    pub max_block_count: usize,
    /// Maximum serialized attribute payload size in bytes, per block
    pub max_attribute_size: usize,
    /// When non-empty, only these block names are permitted
    pub allowed_blocks: HashSet<String>,
    /// Block names that are always rejected
    pub forbidden_blocks: HashSet<String>,
    pub check_empty_blocks: bool,
    pub validate_namespaces: bool,
    pub validate_parent_child_relationships: bool,
    pub check_malformed_json: bool,
    /// Reference set of known `core/` block names
    pub core_blocks: HashSet<String>,
    /// Block name to the set of acceptable ancestor names
    pub parent_child_relationships: HashMap<String, Vec<String>>,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 10,
            max_block_count: 1000,
            max_attribute_size: 10_000,
            allowed_blocks: HashSet::new(),
            forbidden_blocks: HashSet::new(),
            check_empty_blocks: true,
            validate_namespaces: true,
            validate_parent_child_relationships: true,
            check_malformed_json: true,
            core_blocks: default_core_blocks(),
            parent_child_relationships: default_parent_child_relationships(),
        }
    }
}

impl LinterConfig {
    /// Load configuration from a JSON file; unspecified fields keep their
    /// defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// The known core block names
fn default_core_blocks() -> HashSet<String> {
    [
        "core/paragraph",
        "core/heading",
        "core/list",
        "core/quote",
        "core/image",
        "core/gallery",
        "core/video",
        "core/audio",
        "core/columns",
        "core/column",
        "core/group",
        "core/button",
        "core/buttons",
        "core/separator",
        "core/spacer",
        "core/code",
        "core/preformatted",
        "core/pullquote",
        "core/table",
        "core/verse",
        "core/embed",
        "core/file",
        "core/media-text",
        "core/more",
        "core/nextpage",
        "core/block",
        "core/html",
        "core/shortcode",
        "core/archives",
        "core/categories",
        "core/latest-comments",
        "core/latest-posts",
        "core/calendar",
        "core/rss",
        "core/search",
        "core/tag-cloud",
        "core/navigation",
        "core/navigation-link",
        "core/site-logo",
        "core/site-title",
        "core/site-tagline",
        "core/query",
        "core/post-template",
        "core/post-title",
        "core/post-content",
        "core/post-excerpt",
        "core/post-featured-image",
        "core/post-date",
        "core/post-author",
        "core/post-terms",
        "core/loginout",
        "core/social-links",
        "core/social-link",
        "core/navigation-submenu",
        "core/comments",
        "core/comment-template",
        "core/comment-author-name",
        "core/comment-date",
        "core/comment-content",
        "core/comment-reply-link",
        "core/comments-title",
        "core/comments-pagination",
        "core/comments-pagination-previous",
        "core/comments-pagination-numbers",
        "core/comments-pagination-next",
        "core/post-comments-form",
        "core/query-pagination",
        "core/query-pagination-previous",
        "core/query-pagination-numbers",
        "core/query-pagination-next",
        "core/query-no-results",
        "core/query-title",
        "core/term-description",
        "core/archive-title",
        "core/cover",
        "core/template-part",
        "core/pattern",
        "core/widget-area",
        "core/legacy-widget",
        "core/avatar",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Blocks that require a specific ancestor somewhere in their chain
fn default_parent_child_relationships() -> HashMap<String, Vec<String>> {
    let entries: &[(&str, &[&str])] = &[
        ("core/column", &["core/columns"]),
        (
            "core/navigation-link",
            &["core/navigation", "core/navigation-submenu"],
        ),
        ("core/navigation-submenu", &["core/navigation"]),
        ("core/social-link", &["core/social-links"]),
        ("core/button", &["core/buttons"]),
        ("core/post-template", &["core/query"]),
        ("core/query-pagination", &["core/query"]),
        ("core/query-pagination-previous", &["core/query-pagination"]),
        ("core/query-pagination-numbers", &["core/query-pagination"]),
        ("core/query-pagination-next", &["core/query-pagination"]),
        ("core/query-no-results", &["core/query"]),
        ("core/comment-template", &["core/comments"]),
        ("core/comment-author-name", &["core/comment-template"]),
        ("core/comment-date", &["core/comment-template"]),
        ("core/comment-content", &["core/comment-template"]),
        ("core/comment-reply-link", &["core/comment-template"]),
        ("core/comments-pagination", &["core/comments"]),
        (
            "core/comments-pagination-previous",
            &["core/comments-pagination"],
        ),
        (
            "core/comments-pagination-numbers",
            &["core/comments-pagination"],
        ),
        (
            "core/comments-pagination-next",
            &["core/comments-pagination"],
        ),
        ("core/post-comments-form", &["core/comments"]),
        ("core/comments-title", &["core/comments"]),
    ];

    entries
        .iter()
        .map(|(name, parents)| {
            (
                name.to_string(),
                parents.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect()
}
