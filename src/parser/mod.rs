//! Block parser
//!
//! Tolerant parsing of documents with embedded block comments.
//! A stack machine consumes delimiter tokens and builds an owned tree
//! bottom-up; malformed structure degrades to freeform text, never an error.

pub mod ast;
pub mod lexer;

pub use ast::Block;
pub use lexer::{next_token, BlockToken, TokenKind};

/// Parse a complete document into top-level blocks and freeform spans
///
/// This is the main entry point for parsing. It never fails: text that does
/// not form well-nested blocks is preserved as freeform nodes.
pub fn parse_document(document: &str) -> Vec<Block> {
    TreeBuilder::new(document).run()
}

/// An in-progress block on the builder stack
struct StackFrame {
    block: Block,
    /// Byte offset of the opener delimiter
    token_start: usize,
    /// Offset just past the most recently consumed literal span or child
    prev_offset: usize,
    /// Start of freeform text preceding the opener, if any
    leading_html_start: Option<usize>,
}

/// Stack machine turning the token stream into a block tree
struct TreeBuilder<'a> {
    document: &'a str,
    offset: usize,
    output: Vec<Block>,
    stack: Vec<StackFrame>,
}

impl<'a> TreeBuilder<'a> {
    fn new(document: &'a str) -> Self {
        Self {
            document,
            offset: 0,
            output: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Block> {
        while self.step() {}
        self.output
    }

    /// Consume one token; returns false when parsing is finished
    fn step(&mut self) -> bool {
        let stack_depth = self.stack.len();

        let Some(token) = next_token(self.document, self.offset) else {
            match stack_depth {
                0 => self.add_freeform(),
                1 => self.add_block_from_stack(None),
                _ => {
                    // Unclosed nesting: unwind top-down, each frame becoming
                    // a top-level block.
                    while !self.stack.is_empty() {
                        self.add_block_from_stack(None);
                    }
                }
            }
            return false;
        };

        // Literal text between the cursor and the token.
        let leading_html_start = (token.start > self.offset).then_some(self.offset);

        match token.kind {
            TokenKind::Void => {
                let block = Block::named(token.name, token.attrs);
                if stack_depth == 0 {
                    if let Some(start) = leading_html_start {
                        self.output
                            .push(Block::freeform(self.document[start..token.start].to_string()));
                    }
                    self.output.push(block);
                } else {
                    self.add_inner_block(block, token.start, token.length, None);
                }
                self.offset = token.start + token.length;
                true
            }

            TokenKind::Opener => {
                self.stack.push(StackFrame {
                    block: Block::named(token.name, token.attrs),
                    token_start: token.start,
                    prev_offset: token.start + token.length,
                    leading_html_start,
                });
                self.offset = token.start + token.length;
                true
            }

            TokenKind::Closer => {
                if stack_depth == 0 {
                    // A closer with nothing open ends structured parsing;
                    // the remainder is preserved verbatim.
                    self.add_freeform();
                    return false;
                }

                if stack_depth == 1 {
                    self.add_block_from_stack(Some(token.start));
                    self.offset = token.start + token.length;
                    return true;
                }

                // Close the top frame and attach it one level up. The
                // closer's name is deliberately not checked against the
                // frame being closed.
                let mut frame = self.stack.pop().expect("depth checked above");
                let html = &self.document[frame.prev_offset..token.start];
                frame.block.inner_html.push_str(html);
                frame.block.inner_content.push(Some(html.to_string()));
                self.add_inner_block(
                    frame.block,
                    frame.token_start,
                    token.length,
                    Some(token.start + token.length),
                );
                self.offset = token.start + token.length;
                true
            }
        }
    }

    /// Flush everything from the cursor to the end of input as freeform
    fn add_freeform(&mut self) {
        let remaining = &self.document[self.offset..];
        if remaining.is_empty() {
            return;
        }
        self.output.push(Block::freeform(remaining.to_string()));
    }

    /// Attach a finished block as a child of the current top frame
    fn add_inner_block(
        &mut self,
        block: Block,
        token_start: usize,
        token_length: usize,
        last_offset: Option<usize>,
    ) {
        let parent = self.stack.last_mut().expect("caller ensures a parent");
        let html = &self.document[parent.prev_offset..token_start];
        if !html.is_empty() {
            parent.block.inner_html.push_str(html);
            parent.block.inner_content.push(Some(html.to_string()));
        }
        parent.block.inner_blocks.push(block);
        parent.block.inner_content.push(None);
        parent.prev_offset = last_offset.unwrap_or(token_start + token_length);
    }

    /// Pop the top frame and emit it as top-level output, preceded by any
    /// freeform text recorded before its opener
    fn add_block_from_stack(&mut self, end_offset: Option<usize>) {
        let frame = self.stack.pop().expect("caller ensures a frame");
        let html = match end_offset {
            Some(end) => &self.document[frame.prev_offset..end],
            None => &self.document[frame.prev_offset..],
        };

        let mut block = frame.block;
        if !html.is_empty() {
            block.inner_html.push_str(html);
            block.inner_content.push(Some(html.to_string()));
        }

        if let Some(start) = frame.leading_html_start {
            self.output
                .push(Block::freeform(self.document[start..frame.token_start].to_string()));
        }
        self.output.push(block);
    }
}
