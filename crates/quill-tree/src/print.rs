//! Tree diagrams for debugging and tests.

use crate::{NodeId, NodeKind, Tree};

/// Render the subtree rooted at `id` as an indented tree diagram, one line
/// per node. String nodes are shown with their decoded payload.
pub fn pretty(tree: &Tree, id: NodeId) -> String {
    let mut lines = Vec::new();
    render(tree, id, "", true, &mut lines);
    lines.join("\n")
}

fn render(tree: &Tree, id: NodeId, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let label = match tree.kind(id) {
        NodeKind::Document => "Document".to_string(),
        NodeKind::Record => "Record".to_string(),
        NodeKind::Array => "Array".to_string(),
        NodeKind::RecordItem => "RecordItem".to_string(),
        NodeKind::String(text) => format!("String {text:?}"),
    };
    let connector = if is_last { "`- " } else { "|- " };
    lines.push(format!("{prefix}{connector}{label}"));

    let child_prefix = if is_last {
        format!("{prefix}   ")
    } else {
        format!("{prefix}|  ")
    };
    let children = tree.children(id);
    for (i, &child) in children.iter().enumerate() {
        render(tree, child, &child_prefix, i + 1 == children.len(), lines);
    }
}
