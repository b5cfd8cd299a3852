//! Arena-backed tree of document nodes.

/// Index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node is, plus its payload for strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The parse root. Holds record items, like a record.
    Document,
    /// `{ ... }` - an ordered sequence of record items.
    Record,
    /// `[ ... ]` - an ordered sequence of values.
    Array,
    /// A leaf holding decoded text (escape sequences already resolved).
    String(String),
    /// A key/value pair inside a record or document. Exactly two children:
    /// the key (always a String) and the value.
    RecordItem,
}

/// Whether a kind may sit in a value slot (record-item value, array element).
fn is_value_kind(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::String(_) | NodeKind::Record | NodeKind::Array
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed syntax tree rooted at a Document node.
///
/// The arena owns every node; `NodeId`s are plain indices. Parent links are
/// set exactly once, at attachment, and exist only for upward walks (merge
/// paths); the canonical ownership direction is parent to children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

/// Checkpoint for speculative construction, see [`Tree::mark`].
#[derive(Debug, Clone, Copy)]
pub struct TreeMark(usize);

impl Tree {
    /// Create a tree containing only the Document root.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The Document root.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Allocate a detached String node.
    pub fn add_string(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::String(text.into()))
    }

    /// Allocate a detached, empty Record node.
    pub fn add_record(&mut self) -> NodeId {
        self.push(NodeKind::Record)
    }

    /// Allocate a detached, empty Array node.
    pub fn add_array(&mut self) -> NodeId {
        self.push(NodeKind::Array)
    }

    /// Allocate a RecordItem owning `key` and `value`.
    ///
    /// Panics if `key` is not a detached String node or `value` is not a
    /// detached String, Record or Array node.
    pub fn add_item(&mut self, key: NodeId, value: NodeId) -> NodeId {
        assert!(
            matches!(self.kind(key), NodeKind::String(_)),
            "record item key must be a string node"
        );
        assert!(
            is_value_kind(self.kind(value)),
            "record item value must be a string, record or array node"
        );
        let id = self.push(NodeKind::RecordItem);
        self.attach_to(id, key);
        self.attach_to(id, value);
        id
    }

    /// Attach a detached node as the last child of `parent`.
    ///
    /// Panics if the child already has a parent or its kind is not allowed
    /// under the parent kind (records and documents hold record items,
    /// arrays hold values; record items are assembled via [`Tree::add_item`]).
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        let allowed = match self.kind(parent) {
            NodeKind::Document | NodeKind::Record => {
                matches!(self.kind(child), NodeKind::RecordItem)
            }
            NodeKind::Array => is_value_kind(self.kind(child)),
            NodeKind::RecordItem | NodeKind::String(_) => false,
        };
        assert!(allowed, "node kind not allowed under this parent");
        self.attach_to(parent, child);
    }

    fn attach_to(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.nodes[child.index()].parent.is_none(),
            "node is already attached"
        );
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// The kind of a node.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// The parent of a node, if attached.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// The children of a node, in order.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The payload of a String node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::String(text) => Some(text),
            _ => None,
        }
    }

    /// The key node of a RecordItem.
    pub fn item_key(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::RecordItem => self.children(id).first().copied(),
            _ => None,
        }
    }

    /// The value node of a RecordItem.
    pub fn item_value(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::RecordItem => self.children(id).get(1).copied(),
            _ => None,
        }
    }

    /// Position of `id` inside its parent Array. `None` when the parent is
    /// not an array.
    pub fn array_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        if !matches!(self.kind(parent), NodeKind::Array) {
            return None;
        }
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Replace the value of a RecordItem in place.
    ///
    /// This is the one sanctioned structural mutation; layered-configuration
    /// merge passes use it to swap one value for another. The old value is
    /// detached and `value` takes its slot.
    pub fn replace_item_value(&mut self, item: NodeId, value: NodeId) {
        assert!(
            matches!(self.kind(item), NodeKind::RecordItem),
            "not a record item"
        );
        assert!(
            is_value_kind(self.kind(value)),
            "replacement must be a string, record or array node"
        );
        assert!(
            self.nodes[value.index()].parent.is_none(),
            "replacement is already attached"
        );
        let old = self.nodes[item.index()].children[1];
        self.nodes[old.index()].parent = None;
        self.nodes[value.index()].parent = Some(item);
        self.nodes[item.index()].children[1] = value;
    }

    /// Checkpoint the arena for speculative construction.
    pub fn mark(&self) -> TreeMark {
        TreeMark(self.nodes.len())
    }

    /// Discard every node allocated after `mark`.
    ///
    /// Callers must not retain ids handed out after the mark and must not
    /// have attached a post-mark node to a surviving one.
    pub fn rollback(&mut self, mark: TreeMark) {
        debug_assert!(
            self.nodes[..mark.0]
                .iter()
                .all(|n| n.children.iter().all(|c| c.index() < mark.0)),
            "surviving node references a discarded child"
        );
        self.nodes.truncate(mark.0);
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
