//! HTML fragment handling for the Tincture pipeline.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer**: start tags, end tags, text, with comments and
//!   declarations dropped
//! - **Tree builder**: a stack of open elements under the synthetic
//!   `div#rootContainer`, with void elements and a fixed fallback tree for
//!   unbalanced input
//! - **Serializer**: tree back to HTML with merged inline and computed styles
//!
//! # Not Implemented
//!
//! - Implied end tags and error recovery
//! - Character reference decoding
//! - Raw text elements (`script`, `style` bodies are tokenized like any text)

/// Tree construction.
pub mod parser;
/// Tree to HTML text.
pub mod serializer;
/// Regex tokenizer.
pub mod tokenizer;

pub use parser::{
    HtmlError, HtmlParser, VOID_ELEMENTS, fallback_tree, html_to_ast, is_void_element,
    try_html_to_ast,
};
pub use serializer::{ERROR_HTML, MAX_DEPTH, SerializeError, ast_to_html, try_ast_to_html};
pub use tokenizer::{Attribute, Token, tokenize};
