//! JSON view of the tree.
//!
//! The serialized shape is
//! `{element, attributes: {id, classList, inlineStyle, ...custom}, computedStyle, children}`
//! for elements and `{element: "text", text}` for text nodes.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{DomTree, NodeId, NodeKind};

/// Borrowed, serializable view of one subtree.
#[derive(Debug, Clone, Copy)]
pub struct AstView<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> AstView<'a> {
    /// View the subtree of `tree` rooted at `id`.
    #[must_use]
    pub const fn new(tree: &'a DomTree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl Serialize for AstView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Some(node) = self.tree.get(self.id) else {
            return serializer.serialize_none();
        };

        match &node.kind {
            NodeKind::Text(text) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("element", "text")?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            NodeKind::Element(data) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("element", &data.tag)?;
                map.serialize_entry("attributes", &Attributes(data))?;
                if !data.computed_style.is_empty() {
                    map.serialize_entry("computedStyle", &data.computed_style)?;
                }
                map.serialize_entry(
                    "children",
                    &Children {
                        tree: self.tree,
                        ids: &node.children,
                    },
                )?;
                map.end()
            }
        }
    }
}

struct Attributes<'a>(&'a crate::ElementData);

impl Serialize for Attributes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.0;
        let mut map = serializer.serialize_map(None)?;
        if let Some(id) = &data.id {
            map.serialize_entry("id", id)?;
        }
        map.serialize_entry("classList", &data.class_list)?;
        map.serialize_entry("inlineStyle", &data.inline_style)?;
        for (name, value) in &data.custom_attrs {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct Children<'a> {
    tree: &'a DomTree,
    ids: &'a [NodeId],
}

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.ids.len()))?;
        for &id in self.ids {
            seq.serialize_element(&AstView::new(self.tree, id))?;
        }
        seq.end()
    }
}
