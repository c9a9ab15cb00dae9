use super::corridor::{Selection, collect, selection};
use super::fragment::{is_wrapper, isolate_chars, isolate_within, nearest_wrapper_with, wrap};
use super::locate::Corridor;
use crate::error::AnnotateError;
use crate::model::{AnnotationOptions, ClassList, Element, NodeId, Tree};

/// Add `label` to every leaf in the located corridor.
///
/// Leaves already under a wrapper carrying `label` are left alone, so the label
/// is never nested or duplicated. A leaf whose covered part sits directly in a
/// wrapper gets the label on its own fragment of that wrapper; any other leaf is
/// wrapped in a new element. Returns the number of leaves that changed.
pub fn apply_status(
    tree: &mut Tree,
    corridor: &Corridor,
    label: &str,
    options: &AnnotationOptions,
) -> Result<usize, AnnotateError> {
    let mut changed = 0;
    for leaf in collect(tree, options)? {
        let Some(selected) = selection(tree, &leaf, corridor) else {
            continue;
        };
        if nearest_wrapper_with(tree, leaf.node, label, options).is_some() {
            log::trace!("{} already carries {label}", leaf.node);
            continue;
        }

        let target = match selected {
            Selection::Chars(range) => isolate_chars(tree, leaf.node, range),
            Selection::Whole => leaf.node,
        };
        label_node(tree, target, label, options)?;
        changed += 1;
    }
    log::debug!("applied {label} to {changed} leaves");
    Ok(changed)
}

fn label_node(
    tree: &mut Tree,
    target: NodeId,
    label: &str,
    options: &AnnotationOptions,
) -> Result<(), AnnotateError> {
    let parent = tree
        .parent(target)
        .ok_or_else(|| AnnotateError::UnexpectedNodeKind {
            node: target,
            kind: tree.kind(target).name(),
        })?;

    if is_wrapper(tree, parent, options) {
        isolate_within(tree, target, parent);
        if let Some(el) = tree.element_mut(parent) {
            el.classes.push(label);
        }
    } else {
        let element =
            Element::new(options.wrapper_tag.as_str()).with_classes(ClassList::from_iter([label]));
        wrap(tree, target, element);
    }
    Ok(())
}
