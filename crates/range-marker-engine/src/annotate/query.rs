use super::corridor::{collect, selection};
use super::fragment::{content_preorder, is_wrapper, nearest_wrapper_with};
use super::locate::Corridor;
use crate::error::AnnotateError;
use crate::model::{AnnotationOptions, ClassList, Tree};

/// Whether any covered leaf of the corridor already sits under `label`.
///
/// Read only. Walks the leaves in document order and stops at the first match.
/// Must run on a freshly located tree.
pub fn has_status(
    tree: &Tree,
    corridor: &Corridor,
    label: &str,
    options: &AnnotationOptions,
) -> Result<bool, AnnotateError> {
    let leaves = collect(tree, options)?;
    for leaf in leaves.iter().rev() {
        if selection(tree, leaf, corridor).is_none() {
            continue;
        }
        if nearest_wrapper_with(tree, leaf.node, label, options).is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Every class carried by a wrapper enclosing a covered leaf, in the order first seen.
pub fn corridor_labels(
    tree: &Tree,
    corridor: &Corridor,
    options: &AnnotationOptions,
) -> Result<ClassList, AnnotateError> {
    let leaves = collect(tree, options)?;
    let mut labels = ClassList::new();
    for leaf in leaves.iter().rev() {
        if selection(tree, leaf, corridor).is_none() {
            continue;
        }
        for ancestor in tree.ancestors(leaf.node) {
            if !is_wrapper(tree, ancestor, options) {
                continue;
            }
            if let Some(el) = tree.element(ancestor) {
                for class in el.classes.iter() {
                    labels.push(class);
                }
            }
        }
    }
    Ok(labels)
}

/// Concatenated text of every text node under a wrapper carrying `label`.
pub fn covered_text(tree: &Tree, label: &str, options: &AnnotationOptions) -> String {
    content_preorder(tree, options)
        .into_iter()
        .filter(|&id| nearest_wrapper_with(tree, id, label, options).is_some())
        .filter_map(|id| tree.text(id))
        .collect()
}
