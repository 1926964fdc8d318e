//! Stack-based tree builder for HTML fragments.
//!
//! Tokens are walked with an explicit stack of open elements whose bottom
//! entry is always the synthetic `div#rootContainer`. The fragment is
//! well-formed only if the stack is back to that single entry at end of
//! input; anything else is reported as an [`HtmlError`] and replaced with a
//! fixed fallback tree by [`html_to_ast`].

use tincture_common::log::Logger;
use tincture_dom::{DomTree, ElementData, NodeId, NodeKind, ROOT_ID, ROOT_TAG, parse_declarations};

use crate::tokenizer::{Attribute, Token, tokenize};

const LOG_TAG: &str = "HTML";

/// Elements that never have children and never take a closing tag.
pub const VOID_ELEMENTS: [&str; 12] = [
    "br", "hr", "img", "input", "link", "meta", "base", "area", "source", "track", "col", "embed",
];

/// Whether `tag` is in the built-in void element set.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Why a fragment could not be turned into a balanced tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HtmlError {
    /// Input ended while an element was still open.
    #[error("unclosed tag <{tag}>")]
    UnclosedTag {
        /// Innermost element left open.
        tag: String,
    },
    /// A closing tag did not match the innermost open element.
    #[error("closing tag </{found}> does not match open element <{expected}>")]
    MismatchedClosingTag {
        /// Innermost open element.
        expected: String,
        /// Tag that was closed instead.
        found: String,
    },
    /// A closing tag arrived with no element open.
    #[error("closing tag </{tag}> has no open element")]
    UnexpectedClosingTag {
        /// Tag that was closed.
        tag: String,
    },
}

/// Parse an HTML fragment, returning the fallback tree if it is malformed.
///
/// The failure is logged at error severity; this function never fails.
#[must_use]
pub fn html_to_ast(html: &str, logger: &dyn Logger) -> DomTree {
    match try_html_to_ast(html, logger) {
        Ok(tree) => tree,
        Err(err) => {
            logger.error(LOG_TAG, &format!("malformed HTML, using fallback: {err}"));
            fallback_tree()
        }
    }
}

/// Parse an HTML fragment, reporting why it is malformed.
///
/// Malformed `style` declarations are skipped and logged at debug severity.
///
/// # Errors
///
/// Returns an [`HtmlError`] if the open-element stack is not balanced.
pub fn try_html_to_ast(html: &str, logger: &dyn Logger) -> Result<DomTree, HtmlError> {
    let tree = HtmlParser::new(tokenize(html), logger).run()?;
    Ok(adopt_root_container(&tree).unwrap_or(tree))
}

/// The fixed tree returned for malformed input:
/// `div#rootContainer > h1 "Malformed HTML"`.
#[must_use]
pub fn fallback_tree() -> DomTree {
    let mut tree = DomTree::new();
    let heading = tree.append_element(NodeId::ROOT, ElementData::new("h1"));
    let _ = tree.append_text(heading, "Malformed HTML");
    tree
}

/// Tree builder over a token list.
pub struct HtmlParser<'a> {
    tokens: Vec<Token>,
    logger: &'a dyn Logger,
    tree: DomTree,
    /// Open elements; the root is always at the bottom.
    stack: Vec<(NodeId, String)>,
}

impl<'a> HtmlParser<'a> {
    /// Create a parser for `tokens`.
    #[must_use]
    pub fn new(tokens: Vec<Token>, logger: &'a dyn Logger) -> Self {
        Self {
            tokens,
            logger,
            tree: DomTree::new(),
            stack: vec![(NodeId::ROOT, ROOT_TAG.to_string())],
        }
    }

    /// Build the tree.
    ///
    /// # Errors
    ///
    /// Returns an [`HtmlError`] on the first unbalanced tag.
    pub fn run(mut self) -> Result<DomTree, HtmlError> {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            match token {
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => self.open_element(name, &attributes, self_closing),
                Token::EndTag { name } => self.close_element(&name)?,
                Token::Text(text) => self.insert_text(text),
            }
        }

        if self.stack.len() > 1 {
            let tag = self.stack.pop().map(|(_, tag)| tag).unwrap_or_default();
            return Err(HtmlError::UnclosedTag { tag });
        }
        Ok(self.tree)
    }

    fn current(&self) -> NodeId {
        self.stack.last().map_or(NodeId::ROOT, |(id, _)| *id)
    }

    fn open_element(&mut self, name: String, attributes: &[Attribute], self_closing: bool) {
        let element = self.element_from_attributes(&name, attributes);
        let parent = self.current();
        let id = self.tree.append_element(parent, element);
        if !self_closing && !is_void_element(&name) {
            self.stack.push((id, name));
        }
    }

    fn close_element(&mut self, name: &str) -> Result<(), HtmlError> {
        if is_void_element(name) {
            self.logger
                .debug(LOG_TAG, &format!("ignoring closing tag for void element </{name}>"));
            return Ok(());
        }
        if self.stack.len() == 1 {
            return Err(HtmlError::UnexpectedClosingTag {
                tag: name.to_string(),
            });
        }
        let (_, open) = &self.stack[self.stack.len() - 1];
        if open != name {
            return Err(HtmlError::MismatchedClosingTag {
                expected: open.clone(),
                found: name.to_string(),
            });
        }
        let _ = self.stack.pop();
        Ok(())
    }

    fn insert_text(&mut self, text: String) {
        // Indentation between tags is formatting, not content.
        if text.trim().is_empty() && text.contains('\n') {
            return;
        }
        let parent = self.current();
        let _ = self.tree.append_text(parent, text);
    }

    /// Split `style`, `class` and `id` out of the attribute list.
    fn element_from_attributes(&self, tag: &str, attributes: &[Attribute]) -> ElementData {
        let mut element = ElementData::new(tag);
        for attr in attributes {
            match attr.name.as_str() {
                "style" => {
                    let (style, rejected) = parse_declarations(&attr.value);
                    for decl in rejected {
                        self.logger.debug(
                            LOG_TAG,
                            &format!("skipping malformed inline declaration '{decl}' on <{tag}>"),
                        );
                    }
                    element.inline_style.merge(&style);
                }
                "class" => element
                    .class_list
                    .extend(attr.value.split_whitespace().map(str::to_string)),
                "id" => element.id = Some(attr.value.clone()),
                _ => {
                    let _ = element
                        .custom_attrs
                        .insert(attr.name.clone(), attr.value.clone());
                }
            }
        }
        element
    }
}

/// If the fragment is a single `div#rootContainer`, rebuild the tree with
/// that element as the root so serialized output re-parses to itself.
fn adopt_root_container(tree: &DomTree) -> Option<DomTree> {
    let significant: Vec<NodeId> = tree
        .children(NodeId::ROOT)
        .iter()
        .copied()
        .filter(|&c| tree.as_text(c).is_none_or(|t| !t.trim().is_empty()))
        .collect();
    let [only] = significant.as_slice() else {
        return None;
    };
    let element = tree.as_element(*only)?;
    if element.tag != ROOT_TAG || element.id.as_deref() != Some(ROOT_ID) {
        return None;
    }

    let mut adopted = DomTree::with_root(element.clone());
    copy_children(tree, *only, &mut adopted, NodeId::ROOT);
    Some(adopted)
}

fn copy_children(from: &DomTree, source: NodeId, to: &mut DomTree, target: NodeId) {
    for &child in from.children(source) {
        let Some(node) = from.get(child) else { continue };
        let copied = to.alloc(node.kind.clone());
        to.append_child(target, copied);
        if matches!(node.kind, NodeKind::Element(_)) {
            copy_children(from, child, to, copied);
        }
    }
}
