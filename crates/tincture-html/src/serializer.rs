//! Styled tree to HTML text.
//!
//! Text nodes are emitted verbatim. Elements emit a merged `style`
//! attribute (computed declarations overridden by inline ones), then `class`,
//! `id` and the remaining attributes in source order. Void elements get no
//! closing tag so the output parses back to the same tree.

use std::fmt::Write;

use tincture_common::log::Logger;
use tincture_dom::{DomTree, ElementData, NodeId, NodeKind};

use crate::parser::is_void_element;

const LOG_TAG: &str = "Serializer";

/// Nesting depth past which serialization gives up.
pub const MAX_DEPTH: usize = 512;

/// Markup returned when serialization fails.
pub const ERROR_HTML: &str = r#"<div class="tincture-error">Error rendering HTML</div>"#;

/// Why a tree could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    /// A child list referenced a node that is not in the arena.
    #[error("node {0:?} is missing from the tree")]
    MissingNode(NodeId),
    /// The tree nests deeper than [`MAX_DEPTH`].
    #[error("tree is nested deeper than {limit} levels")]
    TooDeep {
        /// The depth limit that was exceeded.
        limit: usize,
    },
}

/// Serialize the whole tree, root element included.
///
/// On failure the error is logged and [`ERROR_HTML`] is returned instead.
#[must_use]
pub fn ast_to_html(tree: &DomTree, logger: &dyn Logger) -> String {
    match try_ast_to_html(tree) {
        Ok(html) => html,
        Err(err) => {
            logger.error(LOG_TAG, &format!("failed to serialize tree: {err}"));
            ERROR_HTML.to_string()
        }
    }
}

/// Serialize the whole tree, root element included.
///
/// # Errors
///
/// Returns a [`SerializeError`] for dangling node ids or excessive depth.
pub fn try_ast_to_html(tree: &DomTree) -> Result<String, SerializeError> {
    let mut out = String::new();
    write_node(tree, tree.root(), 0, &mut out)?;
    Ok(out)
}

fn write_node(
    tree: &DomTree,
    id: NodeId,
    depth: usize,
    out: &mut String,
) -> Result<(), SerializeError> {
    if depth > MAX_DEPTH {
        return Err(SerializeError::TooDeep { limit: MAX_DEPTH });
    }
    let node = tree.get(id).ok_or(SerializeError::MissingNode(id))?;

    match &node.kind {
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::Element(data) => {
            write_open_tag(data, out);
            if is_void_element(&data.tag) {
                return Ok(());
            }
            for &child in &node.children {
                write_node(tree, child, depth + 1, out)?;
            }
            let _ = write!(out, "</{}>", data.tag);
        }
    }
    Ok(())
}

fn write_open_tag(data: &ElementData, out: &mut String) {
    let _ = write!(out, "<{}", data.tag);

    let mut style = data.computed_style.clone();
    style.merge(&data.inline_style);
    if !style.is_empty() {
        write_attribute(out, "style", &style.to_css_text());
    }
    if !data.class_list.is_empty() {
        write_attribute(out, "class", &data.class_list.join(" "));
    }
    if let Some(id) = &data.id {
        write_attribute(out, "id", id);
    }
    for (name, value) in &data.custom_attrs {
        write_attribute(out, name, value);
    }

    out.push('>');
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        let _ = write!(out, " {name}");
    } else {
        let escaped = value.replace('&', "&amp;").replace('"', "&quot;");
        let _ = write!(out, " {name}=\"{escaped}\"");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_common::log::{MemoryLogger, Severity};
    use tincture_dom::StyleMap;

    #[test]
    fn test_attribute_order_and_style_merge() {
        let mut tree = DomTree::new();
        let mut p = ElementData::new("p");
        p.computed_style = [("color", "red"), ("marginTop", "1px")].into_iter().collect::<StyleMap>();
        p.inline_style = [("color", "blue")].into_iter().collect::<StyleMap>();
        p.class_list = vec!["a".to_string(), "b".to_string()];
        p.id = Some("intro".to_string());
        let _ = p.custom_attrs.insert("title".to_string(), "say \"hi\"".to_string());
        let _ = p.custom_attrs.insert("hidden".to_string(), String::new());
        let p = tree.append_element(NodeId::ROOT, p);
        let _ = tree.append_text(p, "x");

        assert_eq!(
            try_ast_to_html(&tree).unwrap(),
            "<div id=\"rootContainer\"><p style=\"color: blue; margin-top: 1px;\" class=\"a b\" \
             id=\"intro\" title=\"say &quot;hi&quot;\" hidden>x</p></div>"
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let mut tree = DomTree::new();
        let _ = tree.append_element(NodeId::ROOT, ElementData::new("br"));
        assert_eq!(
            try_ast_to_html(&tree).unwrap(),
            "<div id=\"rootContainer\"><br></div>"
        );
    }

    #[test]
    fn test_too_deep_falls_back() {
        let mut tree = DomTree::new();
        let mut parent = NodeId::ROOT;
        for _ in 0..=MAX_DEPTH {
            parent = tree.append_element(parent, ElementData::new("div"));
        }
        let logger = MemoryLogger::new();
        assert_eq!(ast_to_html(&tree, &logger), ERROR_HTML);
        assert!(logger.has(Severity::Error, LOG_TAG));
    }
}
