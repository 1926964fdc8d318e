//! Line-oriented Markdown to HTML conversion for the Tincture pipeline.
//!
//! # Scope
//!
//! This crate implements:
//! - **Blocks**: fenced code, `:::class` fences, blockquotes, nested
//!   ordered and unordered lists, pipe tables with alignment and footer,
//!   raw HTML passthrough, headings, horizontal rules and paragraphs
//! - **Inline**: code spans, images, links, emphasis, strikethrough, mark,
//!   superscript, subscript and heading ids
//!
//! Every line becomes its own block; there is no paragraph continuation,
//! no setext headings and no indented code.

/// Block-level state machine.
pub mod block;
/// Inline substitutions.
pub mod inline;
/// List items and nesting.
pub mod list;
/// Pipe tables.
pub mod table;

pub use block::MarkdownEngine;
pub use inline::{InlineFormatter, escape_html};
pub use list::{Glyph, ListItem, ListKind};
pub use table::Alignment;

use tincture_common::codec::PlaceholderCodec;
use tincture_common::log::Logger;

/// Markdown rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Render one paragraph line right after a table as its `<tfoot>`.
    pub table_footer: bool,
    /// Spaces per list nesting level.
    pub list_indent: usize,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            table_footer: true,
            list_indent: 3,
        }
    }
}

/// Render `markdown` with default options and the placeholder codec.
#[must_use]
pub fn markdown_to_html(markdown: &str, logger: &dyn Logger) -> String {
    MarkdownEngine::new(MarkdownOptions::default(), &PlaceholderCodec, logger).render(markdown)
}
