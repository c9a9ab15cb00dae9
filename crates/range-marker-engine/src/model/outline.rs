//! Indented, human-readable dump of a tree used by tests and the CLI's
//! `--outline` flag.

use std::fmt::Write;

use super::node::{BoundaryMark, NodeKind};
use super::tree::Tree;
use super::NodeId;

/// One line per node, two spaces of indent per level.
///
/// ```text
/// #fragment
///   p
///     span.underline
///       "Hello"
///     " world"
/// ```
pub fn outline(tree: &Tree) -> String {
    let mut out = String::new();
    write_node(tree, tree.root(), 0, &mut out);
    out.truncate(out.trim_end().len());
    out
}

fn write_node(tree: &Tree, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let label = match tree.kind(id) {
        NodeKind::Fragment => "#fragment".to_string(),
        NodeKind::Text { content, .. } => format!("{content:?}"),
        NodeKind::Comment(body) => format!("<!--{body}-->"),
        NodeKind::Element(el) => {
            let mut label = el.tag.clone();
            for class in el.classes.iter() {
                label.push('.');
                label.push_str(class);
            }
            for (key, value) in &el.attributes {
                let _ = write!(label, "[{key}={value}]");
            }
            label
        }
    };
    let mark = match tree.mark(id) {
        BoundaryMark::None => "",
        BoundaryMark::Start => " @start",
        BoundaryMark::End => " @end",
        BoundaryMark::Both => " @both",
    };
    let _ = writeln!(out, "{indent}{label}{mark}");
    for &child in tree.children(id) {
        write_node(tree, child, depth + 1, out);
    }
}
