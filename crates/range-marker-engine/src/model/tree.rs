use std::ops::Range;

use super::node::{BoundaryMark, Element, NodeData, NodeId, NodeKind};
use super::path::NodePath;

/// Arena-backed content tree.
///
/// Nodes own their children by handle; the parent link and sibling index are a
/// side table kept consistent by every splice. Detached nodes stay in the arena
/// until the tree is dropped, which is fine for the single-cycle lifetime of a
/// tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Fragment)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Whether `id` was issued by this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.data_mut(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.kind_mut(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Replace a text node's content. No-op for other kinds.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let NodeKind::Text { content, .. } = self.kind_mut(id) {
            *content = text.into();
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text { .. })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.data(id).sibling_index
    }

    pub fn mark(&self, id: NodeId) -> BoundaryMark {
        self.data(id).mark
    }

    pub fn set_mark(&mut self, id: NodeId, mark: BoundaryMark) {
        self.data_mut(id).mark = mark;
    }

    /// Attached nodes currently carrying a boundary mark, in document order.
    pub fn marked_nodes(&self) -> Vec<(NodeId, BoundaryMark)> {
        self.preorder(self.root)
            .into_iter()
            .filter_map(|id| match self.mark(id) {
                BoundaryMark::None => None,
                mark => Some((id, mark)),
            })
            .collect()
    }

    /// Reset every mark in the arena, attached or not.
    pub fn clear_marks(&mut self) {
        for node in &mut self.nodes {
            node.mark = BoundaryMark::None;
        }
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.create(NodeKind::text(content))
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let end = self.children(parent).len();
        self.splice(parent, end..end, &[child]);
    }

    /// Replace `range` of `parent`'s children with `replacement` (all detached).
    ///
    /// Removed nodes are detached and returned in order. Parent links and sibling
    /// indices of the whole child list are recomputed before returning.
    pub fn splice(
        &mut self,
        parent: NodeId,
        range: Range<usize>,
        replacement: &[NodeId],
    ) -> Vec<NodeId> {
        debug_assert!(
            replacement.iter().all(|&id| self.parent(id).is_none()),
            "splice replacement must be detached"
        );
        let removed: Vec<NodeId> = self
            .data_mut(parent)
            .children
            .splice(range, replacement.iter().copied())
            .collect();
        for &id in &removed {
            let data = self.data_mut(id);
            data.parent = None;
            data.sibling_index = 0;
        }
        self.reindex(parent);
        log::trace!(
            "splice under {parent}: removed {} inserted {}",
            removed.len(),
            replacement.len()
        );
        removed
    }

    fn reindex(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.data_mut(parent).children);
        for (index, &child) in children.iter().enumerate() {
            let data = self.data_mut(child);
            data.parent = Some(parent);
            data.sibling_index = index;
        }
        self.data_mut(parent).children = children;
    }

    /// Remove `id` from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            let index = self.sibling_index(id);
            self.splice(parent, index..index + 1, &[]);
        }
    }

    /// Put `replacement` where `id` sits in its parent; `id` becomes detached.
    pub fn replace(&mut self, id: NodeId, replacement: &[NodeId]) {
        if let Some(parent) = self.parent(id) {
            let index = self.sibling_index(id);
            self.splice(parent, index..index + 1, replacement);
        }
    }

    pub fn insert_before(&mut self, anchor: NodeId, nodes: &[NodeId]) {
        if let Some(parent) = self.parent(anchor) {
            let index = self.sibling_index(anchor);
            self.splice(parent, index..index, nodes);
        }
    }

    pub fn insert_after(&mut self, anchor: NodeId, nodes: &[NodeId]) {
        if let Some(parent) = self.parent(anchor) {
            let index = self.sibling_index(anchor) + 1;
            self.splice(parent, index..index, nodes);
        }
    }

    /// Append detached nodes after `parent`'s last child.
    pub fn append_all(&mut self, parent: NodeId, nodes: &[NodeId]) {
        let end = self.children(parent).len();
        self.splice(parent, end..end, nodes);
    }

    /// Detach and return all children of `id`.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let len = self.children(id).len();
        self.splice(id, 0..len, &[])
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `id` is the root or hangs below it.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && (id == self.root || self.ancestors(id).any(|a| a == self.root))
    }

    /// Every node in `from`'s subtree in document order, `from` included.
    pub fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of `id`'s subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        self.preorder(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    pub fn resolve_path(&self, path: &NodePath) -> Option<NodeId> {
        path.steps()
            .iter()
            .try_fold(self.root, |id, &step| self.children(id).get(step).copied())
    }

    /// Path of an attached node; `None` for detached nodes.
    pub fn path_of(&self, id: NodeId) -> Option<NodePath> {
        if !self.is_attached(id) {
            return None;
        }
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            steps.push(self.sibling_index(current));
            current = parent;
        }
        steps.reverse();
        Some(NodePath(steps))
    }

    /// Checks that every parent link and sibling index agrees with the child lists.
    pub fn check_links(&self) -> Result<(), String> {
        for id in self.preorder(self.root) {
            for (index, &child) in self.children(id).iter().enumerate() {
                if self.parent(child) != Some(id) {
                    return Err(format!("{child} lists parent {:?}, expected {id}", self.parent(child)));
                }
                if self.sibling_index(child) != index {
                    return Err(format!(
                        "{child} has sibling index {}, expected {index}",
                        self.sibling_index(child)
                    ));
                }
            }
        }
        Ok(())
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let p = tree.create_element(Element::new("p"));
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append(tree.root(), p);
        tree.append(p, a);
        tree.append(p, b);
        (tree, p, a, b)
    }

    #[test]
    fn splice_keeps_indices_consistent() {
        let (mut tree, p, a, b) = sample();
        let c = tree.create_text("c");
        tree.insert_before(b, &[c]);

        assert_eq!(tree.children(p), &[a, c, b]);
        assert_eq!(tree.sibling_index(b), 2);
        assert_eq!(tree.parent(c), Some(p));
        tree.check_links().unwrap();
    }

    #[test]
    fn replace_detaches_old_node() {
        let (mut tree, p, a, b) = sample();
        let x = tree.create_text("x");
        let y = tree.create_text("y");
        tree.replace(a, &[x, y]);

        assert_eq!(tree.children(p), &[x, y, b]);
        assert_eq!(tree.parent(a), None);
        assert!(!tree.is_attached(a));
        tree.check_links().unwrap();
    }

    #[test]
    fn paths_round_trip() {
        let (tree, _, _, b) = sample();
        let path = tree.path_of(b).unwrap();
        assert_eq!(path.to_string(), "0/1");
        assert_eq!(tree.resolve_path(&path), Some(b));
        assert_eq!(tree.resolve_path(&"0/5".parse().unwrap()), None);
    }

    #[test]
    fn text_content_concatenates_in_document_order() {
        let (tree, p, _, _) = sample();
        assert_eq!(tree.text_content(p), "ab");
    }

    #[test]
    fn take_children_empties_parent() {
        let (mut tree, p, a, b) = sample();
        let taken = tree.take_children(p);
        assert_eq!(taken, vec![a, b]);
        assert!(tree.children(p).is_empty());
        assert_eq!(tree.parent(a), None);
    }
}
