//! Range locator: resolve a host selection onto the tree and place the
//! corridor's boundary marks.

use std::ops::Range;

use super::fragment::{content_preorder, is_atomic};
use crate::error::RangeError;
use crate::model::{AnnotationOptions, BoundaryMark, NodeId, NodeKind, NodePath, Tree, char_len};

/// One endpoint of a host selection.
///
/// On a text node `offset` counts characters; on an element (or the fragment
/// root) it is a child index, naming the boundary before that child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPoint {
    pub path: NodePath,
    pub offset: usize,
}

impl HostPoint {
    pub fn new(path: NodePath, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRange {
    pub start: HostPoint,
    pub end: HostPoint,
}

impl HostRange {
    pub fn new(start: HostPoint, end: HostPoint) -> Self {
        Self { start, end }
    }

    /// Both endpoints inside the same text node.
    pub fn within(path: NodePath, chars: Range<usize>) -> Self {
        Self {
            start: HostPoint::new(path.clone(), chars.start),
            end: HostPoint::new(path, chars.end),
        }
    }

    /// Map a range of characters over the fragment's concatenated text onto
    /// text-node endpoints.
    ///
    /// A start that falls exactly at the end of a text node moves to the
    /// beginning of the next one; an end at the beginning of a node stays at the
    /// end of the previous one. Returns `None` for an empty range or one that
    /// runs past the text.
    pub fn from_char_range(
        tree: &Tree,
        chars: Range<usize>,
        options: &AnnotationOptions,
    ) -> Option<HostRange> {
        if chars.start >= chars.end {
            return None;
        }
        let mut start = None;
        let mut end = None;
        let mut seen = 0;
        for id in content_preorder(tree, options) {
            let Some(text) = tree.text(id) else {
                continue;
            };
            let len = char_len(text);
            if start.is_none() && chars.start < seen + len {
                start = Some(HostPoint::new(tree.path_of(id)?, chars.start - seen));
            }
            if chars.end > seen && chars.end <= seen + len {
                end = Some(HostPoint::new(tree.path_of(id)?, chars.end - seen));
                break;
            }
            seen += len;
        }
        Some(HostRange::new(start?, end?))
    }
}

/// Saved outcome of a locate: the two marked nodes and leaf-local offsets.
///
/// The offsets are captured once and never re-read from the host range, because
/// the engine's own splits invalidate host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corridor {
    pub start: NodeId,
    pub end: NodeId,
    /// Character offset into `start` when it is a text node, otherwise 0.
    pub start_offset: usize,
    /// Character offset into `end` when it is a text node, otherwise 0.
    pub end_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Start,
    End,
}

/// Resolve `range` onto `tree` and mark the corridor's boundary nodes.
///
/// Any marks from an earlier cycle are cleared first; on error no marks are set.
pub fn locate(
    tree: &mut Tree,
    range: &HostRange,
    options: &AnnotationOptions,
) -> Result<Corridor, RangeError> {
    tree.clear_marks();
    if range.start == range.end {
        return Err(RangeError::Collapsed);
    }

    let (start, start_offset) = resolve(tree, &range.start, Side::Start, options)?;
    let (end, end_offset) = resolve(tree, &range.end, Side::End, options)?;

    if start == end {
        if tree.is_text(start) && start_offset >= end_offset {
            return Err(if start_offset == end_offset {
                RangeError::Collapsed
            } else {
                RangeError::Reversed
            });
        }
        tree.set_mark(start, BoundaryMark::Both);
    } else {
        let start_path = path_of(tree, start)?;
        let end_path = path_of(tree, end)?;
        if start_path > end_path && !end_path.is_ancestor_of(&start_path) {
            return Err(RangeError::Reversed);
        }
        tree.set_mark(start, BoundaryMark::Start);
        tree.set_mark(end, tree.mark(end).merge(BoundaryMark::End));
    }

    log::debug!(
        "located corridor {start}:{start_offset} .. {end}:{end_offset} ({} marked)",
        tree.marked_nodes().len()
    );
    Ok(Corridor {
        start,
        end,
        start_offset,
        end_offset,
    })
}

fn path_of(tree: &Tree, id: NodeId) -> Result<NodePath, RangeError> {
    tree.path_of(id).ok_or_else(|| RangeError::OutsideRoot {
        path: NodePath::root(),
    })
}

/// Resolve one endpoint to a node and a leaf-local offset.
fn resolve(
    tree: &Tree,
    point: &HostPoint,
    side: Side,
    options: &AnnotationOptions,
) -> Result<(NodeId, usize), RangeError> {
    let node = tree
        .resolve_path(&point.path)
        .ok_or_else(|| RangeError::OutsideRoot {
            path: point.path.clone(),
        })?;

    if let Some(atomic) = outermost_atomic(tree, node, options) {
        return Ok(whole(tree, atomic, side));
    }

    match tree.kind(node) {
        NodeKind::Text { content, .. } => {
            let len = char_len(content);
            if point.offset > len {
                return Err(RangeError::OffsetOutOfBounds {
                    path: point.path.clone(),
                    offset: point.offset,
                    len,
                });
            }
            Ok((node, point.offset))
        }
        NodeKind::Comment(_) => Ok(whole(tree, node, side)),
        NodeKind::Element(_) | NodeKind::Fragment => {
            let children = tree.children(node);
            let len = children.len();
            if point.offset > len {
                return Err(RangeError::OffsetOutOfBounds {
                    path: point.path.clone(),
                    offset: point.offset,
                    len,
                });
            }
            let resolved = match side {
                Side::Start if point.offset < len => Some(children[point.offset]),
                Side::Start => next_in_document(tree, node),
                Side::End if point.offset > 0 => Some(children[point.offset - 1]),
                Side::End => previous_in_document(tree, node),
            };
            let resolved = resolved.ok_or_else(|| RangeError::NoNeighbour {
                path: point.path.clone(),
                side: match side {
                    Side::Start => "after",
                    Side::End => "before",
                },
            })?;
            Ok(whole(tree, resolved, side))
        }
    }
}

/// Offsets covering all of `id` from the given side.
fn whole(tree: &Tree, id: NodeId, side: Side) -> (NodeId, usize) {
    match (side, tree.text(id)) {
        (Side::End, Some(text)) => (id, char_len(text)),
        _ => (id, 0),
    }
}

/// The atomic node furthest from the root among `id` and its ancestors.
fn outermost_atomic(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> Option<NodeId> {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .filter(|&n| is_atomic(tree, n, options))
        .last()
}

/// The first node after `id`'s whole subtree.
fn next_in_document(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    while let Some(parent) = tree.parent(current) {
        let index = tree.sibling_index(current);
        if let Some(&next) = tree.children(parent).get(index + 1) {
            return Some(next);
        }
        current = parent;
    }
    None
}

/// The closest node ending before `id` starts.
fn previous_in_document(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    while let Some(parent) = tree.parent(current) {
        let index = tree.sibling_index(current);
        if index > 0 {
            return Some(tree.children(parent)[index - 1]);
        }
        current = parent;
    }
    None
}
