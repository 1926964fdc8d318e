//! Styled element tree for the Tincture pipeline.
//!
//! This crate provides an arena-based tree of element and text nodes. Every
//! tree has exactly one synthetic root element, `div#rootContainer`, stored at
//! [`NodeId::ROOT`].
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships.
//! Parents own their children top-down through the `children` lists; the
//! `parent` field is a lookup-only back-reference.

mod ast;
mod style;

pub use ast::AstView;
pub use style::{StyleMap, parse_declarations, to_kebab_case};

use indexmap::IndexMap;

/// Map of custom attribute names to values, in source order.
pub type AttributesMap = IndexMap<String, String>;

/// Tag name of the synthetic root element.
pub const ROOT_TAG: &str = "div";

/// Id of the synthetic root element.
pub const ROOT_ID: &str = "rootContainer";

/// A type-safe index into the tree.
///
/// Allocation order is document order for parsed trees, so comparing ids
/// compares document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root container is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Element or text payload.
    pub kind: NodeKind,
    /// Lookup-only back-reference; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// An element with its attributes and styles.
    Element(ElementData),
    /// A run of text, kept verbatim.
    Text(String),
}

/// Element-specific data.
///
/// The `style`, `class` and `id` attributes are split out of the generic
/// attribute list when the element is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag: String,
    /// Value of the `id` attribute.
    pub id: Option<String>,
    /// Tokens of the `class` attribute, in source order.
    pub class_list: Vec<String>,
    /// Declarations from the `style` attribute.
    pub inline_style: StyleMap,
    /// Every other attribute.
    pub custom_attrs: AttributesMap,
    /// Declarations applied by the cascade.
    pub computed_style: StyleMap,
}

impl ElementData {
    /// Create a bare element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// The synthetic `div#rootContainer` element.
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: Some(ROOT_ID.to_string()),
            ..Self::new(ROOT_TAG)
        }
    }

    /// Whether the element carries the given class token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.class_list.iter().any(|c| c == class)
    }

    /// Look up an attribute by name, including `id` and `class`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.class_list.is_empty() => Some(self.class_list.join(" ")),
            "class" => None,
            "style" if !self.inline_style.is_empty() => Some(self.inline_style.to_css_text()),
            "style" => None,
            _ => self.custom_attrs.get(name).cloned(),
        }
    }
}

/// Arena-based tree with O(1) node access and parent lookup.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the `div#rootContainer` root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(ElementData::root())
    }

    /// Create a tree whose root is the given element.
    #[must_use]
    pub fn with_root(root: ElementData) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so this is only true for a corrupted tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Allocate an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        let id = self.alloc(NodeKind::Element(element));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = self.alloc(NodeKind::Text(text.into()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, skipping text.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// Position of `id` among its parent's element children, with the
    /// number of element siblings (itself included).
    ///
    /// `None` for the root or for text nodes.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<(usize, usize)> {
        let _ = self.as_element(id)?;
        let parent = self.parent(id)?;
        let siblings: Vec<NodeId> = self.element_children(parent).collect();
        let index = siblings.iter().position(|&s| s == id)?;
        Some((index, siblings.len()))
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Every descendant of `id` in document (pre-)order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.kind {
            NodeKind::Text(s) => Some(s.as_str()),
            NodeKind::Element(_) => None,
        })
    }

    /// The first element whose id attribute equals `id`, in document order.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(NodeId::ROOT)
            .chain(self.descendants(NodeId::ROOT))
            .find(|&n| {
                self.as_element(n)
                    .is_some_and(|e| e.id.as_deref() == Some(id))
            })
    }

    /// Concatenated text of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.as_text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.as_text(n))
            .collect()
    }

    /// JSON-serializable view of the subtree rooted at `id`.
    #[must_use]
    pub const fn view(&self, id: NodeId) -> AstView<'_> {
        AstView::new(self, id)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Print a debug outline of the subtree rooted at `id`.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else { return };
    match &node.kind {
        NodeKind::Element(data) => {
            let mut label = data.tag.clone();
            if let Some(el_id) = &data.id {
                label.push('#');
                label.push_str(el_id);
            }
            for class in &data.class_list {
                label.push('.');
                label.push_str(class);
            }
            if data.computed_style.is_empty() {
                println!("{prefix}<{label}>");
            } else {
                println!("{prefix}<{label}> {{ {} }}", data.computed_style.to_css_text());
            }
        }
        NodeKind::Text(text) => {
            let display = text.replace('\n', "\\n");
            println!("{prefix}\"{display}\"");
        }
    }
    for &child_id in &node.children {
        print_tree(tree, child_id, indent + 1);
    }
}
