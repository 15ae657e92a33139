//! Block tree nodes
//!
//! Clean, minimal types representing the parsed block tree.
//! No validation logic or I/O concerns - pure data representation.

use serde_json::{Map, Value};

/// A node in the parsed block tree.
///
/// A node with a name is a structured block; a node without one is a
/// freeform span of literal text sitting between blocks. `inner_content`
/// interleaves literal substrings (`Some`) with exactly one `None`
/// placeholder per entry of `inner_blocks`, in document order, so the
/// block's source span can be reconstructed child by child.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Fully qualified block name; `None` for freeform text
    pub name: Option<String>,
    /// Attributes decoded from the opener's JSON payload
    pub attrs: Map<String, Value>,
    /// Nested blocks, each exclusively owned by this block
    pub inner_blocks: Vec<Block>,
    /// Literal markup belonging to this block, children excluded
    pub inner_html: String,
    /// Literal spans and child placeholders in document order
    pub inner_content: Vec<Option<String>>,
}

impl Block {
    /// Create an empty named block skeleton
    pub fn named(name: String, attrs: Map<String, Value>) -> Self {
        Self {
            name: Some(name),
            attrs,
            inner_blocks: Vec::new(),
            inner_html: String::new(),
            inner_content: Vec::new(),
        }
    }

    /// Create a freeform node holding literal text
    pub fn freeform(text: String) -> Self {
        Self {
            name: None,
            attrs: Map::new(),
            inner_blocks: Vec::new(),
            inner_html: text.clone(),
            inner_content: vec![Some(text)],
        }
    }

    pub fn is_freeform(&self) -> bool {
        self.name.is_none()
    }

    /// Count this block and all named descendants; freeform nodes count zero
    pub fn named_count(&self) -> usize {
        let own = usize::from(!self.is_freeform());
        own + self
            .inner_blocks
            .iter()
            .map(Block::named_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeform_node_holds_its_text() {
        let node = Block::freeform("hello".to_string());
        assert!(node.is_freeform());
        assert_eq!(node.inner_html, "hello");
        assert_eq!(node.inner_content, vec![Some("hello".to_string())]);
    }

    #[test]
    fn named_block_starts_empty() {
        let block = Block::named("core/group".to_string(), Map::new());
        assert!(!block.is_freeform());
        assert!(block.inner_blocks.is_empty());
        assert!(block.inner_content.is_empty());
    }

    #[test]
    fn named_count_ignores_freeform() {
        let mut parent = Block::named("core/group".to_string(), Map::new());
        parent
            .inner_blocks
            .push(Block::named("core/paragraph".to_string(), Map::new()));
        assert_eq!(parent.named_count(), 2);
        assert_eq!(Block::freeform("x".to_string()).named_count(), 0);
    }
}
