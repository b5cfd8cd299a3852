//! Syntax tree for the Quill configuration format.
//!
//! A parsed document is a [`Tree`]: an arena of nodes rooted at a Document
//! node, with ownership running strictly parent to children and non-owning
//! parent links kept for upward walks. The tree also carries the merge-path
//! computation used by layered-configuration consumers, a preorder traversal,
//! and a pretty printer for diagnostics.

mod tree;
pub use tree::{NodeId, NodeKind, Tree, TreeMark};

mod path;
pub use path::Preorder;

mod print;
pub use print::pretty;
