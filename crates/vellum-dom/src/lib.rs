//! Element tree for the Vellum layout engine.
//!
//! This crate provides an arena-based document tree loosely following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), carrying only what
//! styling and layout need: tag identity, attributes, dynamic pseudo-class
//! state, and ordered parent/child/sibling structure.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow
//! checker issues. Parents are stored as plain indices — there are no
//! owning back-references anywhere. Tag names are interned through the
//! shared [`StringInterner`] so selector matching compares integers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use vellum_common::{StringId, StringInterner};

/// Map of attribute names to values for an element.
///
/// [§ 4.9.2 Interface `NamedNodeMap`](https://dom.spec.whatwg.org/#interface-namednodemap)
///
/// Keys are stored lowercased; insertion order is irrelevant to styling.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the document tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing
/// issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// Dynamic pseudo-class state attached to an element.
///
/// [Selectors Level 4 § 4.3 User action pseudo-classes](https://www.w3.org/TR/selectors-4/#useraction-pseudos)
///
/// The engine flips these bits in response to mouse events; selector
/// matching consults them for `:hover`, `:active`, `:focus`, `:link`, and
/// `:visited`. A compact bitset rather than a field per state — elements
/// are numerous, states are five.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PseudoClassSet(u8);

impl PseudoClassSet {
    /// `:hover` — "while the user designates an element with a pointing device"
    pub const HOVER: Self = Self(1);
    /// `:active` — "while an element is being activated by the user"
    pub const ACTIVE: Self = Self(1 << 1);
    /// `:focus` — "while an element has the focus"
    pub const FOCUS: Self = Self(1 << 2);
    /// `:link` — an unvisited link
    pub const LINK: Self = Self(1 << 3);
    /// `:visited` — a visited link (set by the embedder, never the engine)
    pub const VISITED: Self = Self(1 << 4);

    /// True if all bits of `other` are set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub const fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// True if no state is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
///
/// The tag is held as an interned id; resolve it through the tree's
/// interner when a string is needed. The pseudo-class set is the only
/// mutable dynamic state an element carries — everything else is fixed
/// once parsing finishes.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Interned, lowercased local name.
    pub tag: StringId,
    /// "An element has an associated attribute list" — keys lowercased.
    pub attrs: AttributesMap,
    /// Dynamic `:hover`/`:active`/`:focus`/`:link`/`:visited` state.
    pub pseudo_states: PseudoClassSet,
}

impl ElementData {
    /// Returns the element's id attribute value if present.
    ///
    /// [HTML § 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// [HTML § 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    /// "The class attribute, if specified, must have a value that is a set
    /// of space-separated tokens."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attrs
            .get("class")
            .map_or_else(HashSet::new, |classlist| {
                classlist.split_ascii_whitespace().collect()
            })
    }

    /// Attribute accessor with a lowercased key.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Arena-based document tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// All nodes live in one contiguous vector, addressed by index. The tree
/// shares the engine context's string interner so tag ids are comparable
/// with ids interned by the selector compiler.
#[derive(Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
    /// Shared tag-name interner.
    interner: Arc<StringInterner>,
}

impl std::fmt::Debug for DomTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl DomTree {
    /// Create a new document tree with just the Document node at the root.
    #[must_use]
    pub fn new(interner: Arc<StringInterner>) -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![document],
            interner,
        }
    }

    /// The shared tag-name interner.
    #[must_use]
    pub fn interner(&self) -> &Arc<StringInterner> {
        &self.interner
    }

    /// Get the root document node ID.
    #[must_use]
    pub fn root(&self) -> NodeId {
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

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node in the arena and return its ID.
    ///
    /// The node is not yet attached to the tree (no parent, no siblings).
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate an element node, interning its (lowercased) tag name.
    pub fn alloc_element(&mut self, tag_name: &str, attrs: AttributesMap) -> NodeId {
        let tag = self.interner.intern(&tag_name.to_ascii_lowercase());
        self.alloc(NodeType::Element(ElementData {
            tag,
            attrs,
            pseudo_states: PseudoClassSet::default(),
        }))
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Insert a node as the first child of `parent`.
    ///
    /// Used when materializing `:before` pseudo-element content at the
    /// leading edge of its owner.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.insert(0, child);
        self.nodes[child.0].parent = Some(parent);
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

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).and_then(|p| siblings.get(p)).copied()
    }

    /// [§ 4.2.5 Ancestor](https://dom.spec.whatwg.org/#concept-tree-ancestor)
    ///
    /// Returns an iterator over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Returns an iterator over preceding siblings, from immediately before
    /// to the first child of the parent.
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Returns an iterator over all descendants of a node in document order
    /// (depth-first, pre-order). Does not include the starting node.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Resolve an element's tag name back to a string.
    ///
    /// Returns an empty string for non-element nodes.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> String {
        self.as_element(id)
            .map(|e| self.interner.resolve(e.tag))
            .unwrap_or_default()
    }

    /// True if the node is an element with the given (lowercase) tag name.
    #[must_use]
    pub fn is_tag(&self, id: NodeId, tag_name: &str) -> bool {
        self.as_element(id)
            .is_some_and(|e| self.interner.get(tag_name) == Some(e.tag))
    }

    /// Concatenated text of all descendant text nodes, in tree order.
    ///
    /// Used to pull the contents out of `<style>` and `<title>` elements.
    #[must_use]
    pub fn collect_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.as_text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// [HTML § 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [HTML § 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's
    /// children that is either a body element or a frameset element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .find(|&&id| self.is_tag(id, "body") || self.is_tag(id, "frameset"))
            .copied()
    }
}

/// Iterator that walks up the tree from a node to the root.
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

/// Iterator that walks backwards through siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Iterator that walks the tree in document order (depth-first, pre-order).
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    /// Stack of nodes to visit (children are pushed in reverse order so we
    /// process them left-to-right).
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> DomTree {
        DomTree::new(Arc::new(StringInterner::new()))
    }

    #[test]
    fn append_and_traverse() {
        let mut dom = tree();
        let html = dom.alloc_element("html", AttributesMap::new());
        let body = dom.alloc_element("body", AttributesMap::new());
        let p = dom.alloc_element("p", AttributesMap::new());
        dom.append_child(NodeId::ROOT, html);
        dom.append_child(html, body);
        dom.append_child(body, p);

        assert_eq!(dom.document_element(), Some(html));
        assert_eq!(dom.body(), Some(body));
        assert_eq!(dom.parent(p), Some(body));
        let ancestors: Vec<_> = dom.ancestors(p).collect();
        assert_eq!(ancestors, vec![body, html, NodeId::ROOT]);
    }

    #[test]
    fn siblings_reflect_order() {
        let mut dom = tree();
        let body = dom.alloc_element("body", AttributesMap::new());
        dom.append_child(NodeId::ROOT, body);
        let a = dom.alloc_element("a", AttributesMap::new());
        let b = dom.alloc_element("b", AttributesMap::new());
        let c = dom.alloc_element("c", AttributesMap::new());
        dom.append_child(body, a);
        dom.append_child(body, b);
        dom.append_child(body, c);

        assert_eq!(dom.next_sibling(a), Some(b));
        assert_eq!(dom.prev_sibling(c), Some(b));
        let preceding: Vec<_> = dom.preceding_siblings(c).collect();
        assert_eq!(preceding, vec![b, a]);
    }

    #[test]
    fn prepend_puts_child_first() {
        let mut dom = tree();
        let div = dom.alloc_element("div", AttributesMap::new());
        dom.append_child(NodeId::ROOT, div);
        let existing = dom.alloc(NodeType::Text("x".into()));
        dom.append_child(div, existing);
        let before = dom.alloc_element("x-before", AttributesMap::new());
        dom.prepend_child(div, before);

        assert_eq!(dom.children(div), &[before, existing]);
        assert_eq!(dom.prev_sibling(existing), Some(before));
    }

    #[test]
    fn pseudo_state_bits() {
        let mut states = PseudoClassSet::default();
        assert!(states.is_empty());
        states.insert(PseudoClassSet::HOVER);
        states.insert(PseudoClassSet::LINK);
        assert!(states.contains(PseudoClassSet::HOVER));
        assert!(!states.contains(PseudoClassSet::ACTIVE));
        states.remove(PseudoClassSet::HOVER);
        assert!(!states.contains(PseudoClassSet::HOVER));
        assert!(states.contains(PseudoClassSet::LINK));
    }

    #[test]
    fn collect_text_concatenates_descendants() {
        let mut dom = tree();
        let style = dom.alloc_element("style", AttributesMap::new());
        dom.append_child(NodeId::ROOT, style);
        let t1 = dom.alloc(NodeType::Text("p { color".into()));
        let t2 = dom.alloc(NodeType::Text(": red }".into()));
        dom.append_child(style, t1);
        dom.append_child(style, t2);
        assert_eq!(dom.collect_text(style), "p { color: red }");
    }

    #[test]
    fn tag_ids_are_shared_with_interner() {
        let interner = Arc::new(StringInterner::new());
        let mut dom = DomTree::new(Arc::clone(&interner));
        let div = dom.alloc_element("DIV", AttributesMap::new());
        // Tag names are lowercased before interning.
        assert_eq!(interner.get("div"), dom.as_element(div).map(|e| e.tag));
        assert!(dom.is_tag(div, "div"));
    }
}
