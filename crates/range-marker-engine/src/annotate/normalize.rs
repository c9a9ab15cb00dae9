use std::collections::VecDeque;

use super::fragment::{escape_text, is_atomic, is_wrapper};
use crate::model::{AnnotationOptions, BoundaryMark, NodeId, NodeKind, Tree};

/// Clean up a mutated tree before rendering.
///
/// Breadth first from the root: clears boundary marks, escapes each text node
/// once, drops empty text and empty wrappers, merges adjacent wrappers of the
/// same shape and joins adjacent text. Children of atomic nodes and comments
/// are not visited.
pub fn normalize(tree: &mut Tree, options: &AnnotationOptions) {
    let mut queue = VecDeque::from([tree.root()]);
    let mut merged = 0;
    while let Some(id) = queue.pop_front() {
        tree.set_mark(id, BoundaryMark::None);
        escape_text(tree, id);
        if matches!(tree.kind(id), NodeKind::Comment(_)) || is_atomic(tree, id, options) {
            continue;
        }
        merged += merge_children(tree, id, options);
        queue.extend(tree.children(id).iter().copied());
    }
    tree.clear_marks();
    log::debug!("normalized tree, {merged} siblings merged away");
}

/// Single left-to-right pass over `parent`'s children. Returns how many
/// children were absorbed or dropped.
fn merge_children(tree: &mut Tree, parent: NodeId, options: &AnnotationOptions) -> usize {
    let mut removed = 0;
    let mut index = 0;
    while let Some(&current) = tree.children(parent).get(index) {
        if is_empty_text(tree, current) || is_empty_wrapper(tree, current, options) {
            tree.detach(current);
            removed += 1;
            continue;
        }
        let Some(&next) = tree.children(parent).get(index + 1) else {
            break;
        };
        if is_empty_text(tree, next) || is_empty_wrapper(tree, next, options) {
            tree.detach(next);
            removed += 1;
        } else if same_wrapper(tree, current, next, options) {
            let moved = tree.take_children(next);
            tree.detach(next);
            tree.append_all(current, &moved);
            removed += 1;
        } else if let Some(joined) = joined_text(tree, current, next) {
            tree.set_text(current, joined);
            tree.detach(next);
            removed += 1;
        } else {
            index += 1;
        }
    }
    removed
}

fn is_empty_text(tree: &Tree, id: NodeId) -> bool {
    tree.text(id).is_some_and(str::is_empty)
}

fn is_empty_wrapper(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> bool {
    is_wrapper(tree, id, options) && tree.children(id).is_empty()
}

/// Two labelled wrappers with set-equal classes and equal other attributes.
fn same_wrapper(tree: &Tree, left: NodeId, right: NodeId, options: &AnnotationOptions) -> bool {
    if !is_wrapper(tree, left, options) || !is_wrapper(tree, right, options) {
        return false;
    }
    match (tree.element(left), tree.element(right)) {
        (Some(a), Some(b)) => !a.classes.is_empty() && a.same_shape(b),
        _ => false,
    }
}

fn joined_text(tree: &Tree, left: NodeId, right: NodeId) -> Option<String> {
    match (tree.kind(left), tree.kind(right)) {
        (
            NodeKind::Text {
                content: a,
                escaped: ea,
            },
            NodeKind::Text {
                content: b,
                escaped: eb,
            },
        ) if ea == eb => Some(format!("{a}{b}")),
        _ => None,
    }
}
