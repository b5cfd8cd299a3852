//! Merge-path computation and preorder traversal.
//!
//! When documents are layered, records merge key by key while arrays replace
//! wholesale. A node's merge path is the sequence of record keys locating it,
//! and exists only for nodes that participate in that key-by-key merging.

use crate::{NodeId, NodeKind, Tree};

impl Tree {
    /// Whether `id` has a merge path.
    ///
    /// String, Record and Array nodes qualify, unless their ancestor chain
    /// passes through an Array (array contents are never independently
    /// addressable) or, for a String, it is the key half of its record item
    /// rather than the value half. The Document root qualifies with the
    /// empty path.
    pub fn has_path(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::RecordItem => return false,
            NodeKind::String(_) => {
                let Some(parent) = self.parent(id) else {
                    return false;
                };
                if self.item_value(parent) != Some(id) {
                    return false;
                }
            }
            NodeKind::Document | NodeKind::Record | NodeKind::Array => {}
        }

        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if matches!(self.kind(node), NodeKind::Array) {
                return false;
            }
            cursor = self.parent(node);
        }
        true
    }

    /// The sequence of keys locating `id`, outermost first.
    ///
    /// Returns `None` exactly when [`Tree::has_path`] is false. The path is
    /// built by walking parents, collecting each record-item key, then
    /// reversing.
    pub fn merge_path(&self, id: NodeId) -> Option<Vec<&str>> {
        if !self.has_path(id) {
            return None;
        }

        let mut keys = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if matches!(self.kind(node), NodeKind::RecordItem) {
                let key = self.item_key(node)?;
                keys.push(self.text(key)?);
            }
            cursor = self.parent(node);
        }
        keys.reverse();
        Some(keys)
    }

    /// Iterate the subtree rooted at `id` in preorder: each node before its
    /// children, children in order. String nodes are leaves.
    pub fn preorder(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Preorder iterator over a subtree, see [`Tree::preorder`].
pub struct Preorder<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the tree for `{ a { b "x" }, c [ "y" "z" ] }` and returns the
    /// ids of the interesting nodes.
    struct Fixture {
        tree: Tree,
        inner_record: NodeId,
        x: NodeId,
        x_key: NodeId,
        array: NodeId,
        y: NodeId,
        z: NodeId,
    }

    fn fixture() -> Fixture {
        let mut tree = Tree::new();

        let inner_record = tree.add_record();
        let x_key = tree.add_string("b");
        let x = tree.add_string("x");
        let inner_item = tree.add_item(x_key, x);
        tree.attach(inner_record, inner_item);
        let a_key = tree.add_string("a");
        let a_item = tree.add_item(a_key, inner_record);
        let root = tree.root();
        tree.attach(root, a_item);

        let array = tree.add_array();
        let y = tree.add_string("y");
        let z = tree.add_string("z");
        tree.attach(array, y);
        tree.attach(array, z);
        let c_key = tree.add_string("c");
        let c_item = tree.add_item(c_key, array);
        tree.attach(root, c_item);

        Fixture {
            tree,
            inner_record,
            x,
            x_key,
            array,
            y,
            z,
        }
    }

    #[test]
    fn test_nested_value_path() {
        let f = fixture();
        assert_eq!(f.tree.merge_path(f.x), Some(vec!["a", "b"]));
        assert_eq!(f.tree.merge_path(f.inner_record), Some(vec!["a"]));
    }

    #[test]
    fn test_document_has_empty_path() {
        let f = fixture();
        assert_eq!(f.tree.merge_path(f.tree.root()), Some(vec![]));
    }

    #[test]
    fn test_array_has_path_but_elements_do_not() {
        let f = fixture();
        assert_eq!(f.tree.merge_path(f.array), Some(vec!["c"]));
        assert!(!f.tree.has_path(f.y));
        assert!(!f.tree.has_path(f.z));
        assert_eq!(f.tree.merge_path(f.y), None);
    }

    #[test]
    fn test_keys_and_items_have_no_path() {
        let f = fixture();
        assert!(!f.tree.has_path(f.x_key));
        for item in f.tree.children(f.tree.root()) {
            assert!(!f.tree.has_path(*item));
        }
    }

    #[test]
    fn test_nothing_below_an_array_has_a_path() {
        // c [ { k v } ] - the record and everything in it sit under an
        // array, so none of them are addressable.
        let mut tree = Tree::new();
        let array = tree.add_array();
        let record = tree.add_record();
        let key = tree.add_string("k");
        let value = tree.add_string("v");
        let item = tree.add_item(key, value);
        tree.attach(record, item);
        tree.attach(array, record);
        let c_key = tree.add_string("c");
        let c_item = tree.add_item(c_key, array);
        let root = tree.root();
        tree.attach(root, c_item);

        assert!(!tree.has_path(record));
        assert!(!tree.has_path(value));
        assert_eq!(tree.merge_path(array), Some(vec!["c"]));
    }

    #[test]
    fn test_replacement_value_takes_over_the_path() {
        let mut f = fixture();
        let a_item = f.tree.children(f.tree.root())[0];
        let replacement = f.tree.add_string("patched");
        f.tree.replace_item_value(a_item, replacement);

        assert_eq!(f.tree.merge_path(replacement), Some(vec!["a"]));
        assert!(!f.tree.has_path(f.inner_record));
    }

    #[test]
    fn test_preorder_order() {
        let f = fixture();
        let order: Vec<NodeId> = f.tree.preorder(f.tree.root()).collect();
        // Document first, then each item's subtree in child order.
        assert_eq!(order[0], f.tree.root());
        let pos = |id: NodeId| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(f.x_key) < pos(f.x));
        assert!(pos(f.x) < pos(f.array));
        assert!(pos(f.y) < pos(f.z));
        assert_eq!(order.len(), f.tree.node_count());
    }

    #[test]
    fn test_preorder_of_string_is_single_node() {
        let f = fixture();
        assert_eq!(f.tree.preorder(f.x).collect::<Vec<_>>(), vec![f.x]);
    }

    #[test]
    fn test_addressable_pairs_via_preorder() {
        // The enumeration an external decoder performs: every (path, node)
        // pair in the document.
        let f = fixture();
        let paths: Vec<Vec<&str>> = f
            .tree
            .preorder(f.tree.root())
            .filter_map(|id| f.tree.merge_path(id))
            .collect();
        assert_eq!(
            paths,
            vec![
                vec![],
                vec!["a"],
                vec!["a", "b"],
                vec!["c"],
            ]
        );
    }
}
