//! Corridor walk: the leaves between the start and end marks.
//!
//! Children are visited last-to-first. Edits made while handling a leaf only
//! touch that leaf and the nodes around it, so the leaves still waiting to be
//! handled (all earlier in the document) keep their handles and offsets.

use std::ops::Range;

use super::fragment::{is_layout_whitespace, is_leaf};
use super::locate::Corridor;
use crate::error::AnnotateError;
use crate::model::{AnnotationOptions, BoundaryMark, NodeId, NodeKind, Tree, char_len};

/// Where a corridor leaf sits relative to the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafRole {
    /// Holds the start boundary.
    Start,
    /// Holds the end boundary.
    End,
    /// Holds both boundaries.
    Both,
    /// Entirely between the boundaries.
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorLeaf {
    pub node: NodeId,
    pub role: LeafRole,
}

/// The part of a leaf the corridor covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Character range of a text leaf.
    Chars(Range<usize>),
    /// An atomic leaf, always taken whole.
    Whole,
}

/// Corridor leaves in reverse document order.
pub fn collect(tree: &Tree, options: &AnnotationOptions) -> Result<Vec<CorridorLeaf>, AnnotateError> {
    Walk::new(tree, options, false).run()
}

/// Like [`collect`], with layout whitespace strictly between the marks
/// reported as [`LeafRole::Inner`].
pub fn collect_with_layout(
    tree: &Tree,
    options: &AnnotationOptions,
) -> Result<Vec<CorridorLeaf>, AnnotateError> {
    Walk::new(tree, options, true).run()
}

struct Walk<'a> {
    tree: &'a Tree,
    options: &'a AnnotationOptions,
    layout: bool,
    inside: bool,
    leaves: Vec<CorridorLeaf>,
}

impl<'a> Walk<'a> {
    fn new(tree: &'a Tree, options: &'a AnnotationOptions, layout: bool) -> Self {
        Self {
            tree,
            options,
            layout,
            inside: false,
            leaves: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<CorridorLeaf>, AnnotateError> {
        let root = self.tree.root();
        if self.tree.mark(root) != BoundaryMark::None {
            return Err(AnnotateError::UnexpectedNodeKind {
                node: root,
                kind: self.tree.kind(root).name(),
            });
        }
        self.walk(root)?;
        Ok(self.leaves)
    }

    fn walk(&mut self, id: NodeId) -> Result<(), AnnotateError> {
        let tree = self.tree;
        for &child in tree.children(id).iter().rev() {
            let mark = tree.mark(child);
            if is_corridor_leaf(tree, child, self.options) {
                let role = match mark {
                    BoundaryMark::Both => Some(LeafRole::Both),
                    BoundaryMark::End => {
                        self.inside = true;
                        Some(LeafRole::End)
                    }
                    BoundaryMark::Start => {
                        self.inside = false;
                        Some(LeafRole::Start)
                    }
                    BoundaryMark::None => self.inside.then_some(LeafRole::Inner),
                };
                if let Some(role) = role {
                    self.leaves.push(CorridorLeaf { node: child, role });
                }
                continue;
            }
            if self.layout
                && self.inside
                && mark == BoundaryMark::None
                && tree.text(child).is_some_and(is_layout_whitespace)
            {
                self.leaves.push(CorridorLeaf {
                    node: child,
                    role: LeafRole::Inner,
                });
                continue;
            }

            match tree.kind(child) {
                NodeKind::Fragment => {
                    return Err(AnnotateError::UnexpectedNodeKind {
                        node: child,
                        kind: "fragment",
                    });
                }
                NodeKind::Element(_) | NodeKind::Comment(_) | NodeKind::Text { .. } => {
                    // Containers, comments and layout text: the mark spans the whole node.
                    if mark.closes_corridor() {
                        self.inside = true;
                    }
                    self.walk(child)?;
                    if mark.opens_corridor() {
                        self.inside = false;
                    }
                }
            }
        }
        Ok(())
    }
}

fn is_corridor_leaf(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> bool {
    is_leaf(tree, id, options) && !tree.text(id).is_some_and(is_layout_whitespace)
}

/// The part of `leaf` the corridor covers, or `None` when that part is empty.
pub fn selection(tree: &Tree, leaf: &CorridorLeaf, corridor: &Corridor) -> Option<Selection> {
    let Some(text) = tree.text(leaf.node) else {
        return Some(Selection::Whole);
    };
    let len = char_len(text);
    let range = match leaf.role {
        LeafRole::Both => corridor.start_offset..corridor.end_offset,
        LeafRole::Start => corridor.start_offset..len,
        LeafRole::End => 0..corridor.end_offset,
        LeafRole::Inner => 0..len,
    };
    let range = range.start.min(len)..range.end.min(len);
    (!range.is_empty()).then_some(Selection::Chars(range))
}
