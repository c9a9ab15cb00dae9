//! Structural primitives shared by the application and removal engines:
//! classifying nodes, splitting text runs, splitting elements around a child and
//! (un)wrapping.

use std::ops::Range;

use crate::model::{AnnotationOptions, Element, NodeId, NodeKind, Tree, char_len, char_slice};

pub fn is_atomic(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> bool {
    tree.element(id)
        .is_some_and(|el| options.atomic.matches(el))
}

/// Text or atomic element: the unit every corridor walk stops at.
pub fn is_leaf(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> bool {
    tree.is_text(id) || is_atomic(tree, id, options)
}

/// A status wrapper: a non-root, non-atomic element with the configured wrapper tag.
pub fn is_wrapper(tree: &Tree, id: NodeId, options: &AnnotationOptions) -> bool {
    id != tree.root()
        && tree
            .element(id)
            .is_some_and(|el| el.tag == options.wrapper_tag && !options.atomic.matches(el))
}

/// Whitespace-only text containing a line break. Formatting between block
/// elements, never annotated.
pub fn is_layout_whitespace(text: &str) -> bool {
    text.contains('\n') && text.chars().all(char::is_whitespace)
}

/// Nearest wrapper ancestor of `id` whose classes include `label`.
pub fn nearest_wrapper_with(
    tree: &Tree,
    id: NodeId,
    label: &str,
    options: &AnnotationOptions,
) -> Option<NodeId> {
    tree.ancestors(id).find(|&ancestor| {
        is_wrapper(tree, ancestor, options)
            && tree
                .element(ancestor)
                .is_some_and(|el| el.classes.contains(label))
    })
}

/// Document-order walk that never enters an atomic node's children.
pub fn content_preorder(tree: &Tree, options: &AnnotationOptions) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        out.push(id);
        if is_atomic(tree, id, options) {
            continue;
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    out
}

/// Split text `leaf` so that the characters in `range` sit in a node of their own.
///
/// The leaf keeps the selected characters; non-empty prefix and suffix become
/// new siblings. Returns the node holding `range`.
pub fn isolate_chars(tree: &mut Tree, leaf: NodeId, range: Range<usize>) -> NodeId {
    let Some(content) = tree.text(leaf) else {
        return leaf;
    };
    let len = char_len(content);
    if range.start == 0 && range.end >= len {
        return leaf;
    }
    let prefix = char_slice(content, 0, range.start).to_string();
    let middle = char_slice(content, range.start, range.end).to_string();
    let suffix = char_slice(content, range.end, len).to_string();

    tree.set_text(leaf, middle);
    if !prefix.is_empty() {
        let node = tree.create_text(prefix);
        tree.insert_before(leaf, &[node]);
    }
    if !suffix.is_empty() {
        let node = tree.create_text(suffix);
        tree.insert_after(leaf, &[node]);
    }
    leaf
}

/// Split element `parent` into up to three siblings so `child` is its only child.
///
/// Children before and after `child` move into shallow copies of `parent`
/// placed on either side; empty copies are never created. `parent` itself keeps
/// `child`. The root is never split.
pub fn split_around(tree: &mut Tree, parent: NodeId, child: NodeId) {
    if parent == tree.root() {
        return;
    }
    let Some(shape) = tree.element(parent).cloned() else {
        return;
    };
    let index = tree.sibling_index(child);
    let len = tree.children(parent).len();

    if index + 1 < len {
        let moved = tree.splice(parent, index + 1..len, &[]);
        let right = tree.create_element(shape.clone());
        tree.append_all(right, &moved);
        tree.insert_after(parent, &[right]);
    }
    if index > 0 {
        let moved = tree.splice(parent, 0..index, &[]);
        let left = tree.create_element(shape);
        tree.append_all(left, &moved);
        tree.insert_before(parent, &[left]);
    }
}

/// Split every element from `node`'s parent up to and including `ancestor` so
/// that `ancestor` contains nothing but the chain leading to `node`.
pub fn isolate_within(tree: &mut Tree, node: NodeId, ancestor: NodeId) {
    let mut current = node;
    while let Some(parent) = tree.parent(current) {
        if parent == tree.root() {
            break;
        }
        split_around(tree, parent, current);
        if parent == ancestor {
            break;
        }
        current = parent;
    }
}

/// Put `node` inside a new element built from `element`, at `node`'s position.
pub fn wrap(tree: &mut Tree, node: NodeId, element: Element) -> NodeId {
    let wrapper = tree.create_element(element);
    tree.replace(node, &[wrapper]);
    tree.append(wrapper, node);
    wrapper
}

/// Replace `wrapper` with its own children, in order.
pub fn unwrap(tree: &mut Tree, wrapper: NodeId) {
    let children = tree.take_children(wrapper);
    tree.replace(wrapper, &children);
}

/// Drop `label` from `wrapper`; unwrap it when no class or attribute remains.
pub fn strip_label(tree: &mut Tree, wrapper: NodeId, label: &str) {
    let Some(el) = tree.element_mut(wrapper) else {
        return;
    };
    el.classes.remove(label);
    if el.classes.is_empty() && el.attributes.is_empty() {
        unwrap(tree, wrapper);
    }
}

/// Escape a text node's content for markup, once.
pub fn escape_text(tree: &mut Tree, id: NodeId) {
    if let NodeKind::Text { content, escaped } = tree.kind_mut(id)
        && !*escaped
    {
        *content = html_escape::encode_text(content.as_str()).into_owned();
        *escaped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_fragment, render};
    use crate::model::ClassList;
    use pretty_assertions::assert_eq;

    fn first_text(tree: &Tree) -> NodeId {
        tree.preorder(tree.root())
            .into_iter()
            .find(|&id| tree.is_text(id))
            .unwrap()
    }

    #[test]
    fn isolate_chars_splits_into_three() {
        let mut tree = parse_fragment("<p>Hello world</p>").unwrap();
        let text = first_text(&tree);
        let middle = isolate_chars(&mut tree, text, 2..7);
        assert_eq!(tree.text(middle), Some("llo w"));
        let p = tree.parent(middle).unwrap();
        assert_eq!(tree.children(p).len(), 3);
        tree.check_links().unwrap();
    }

    #[test]
    fn isolate_chars_whole_text_is_untouched() {
        let mut tree = parse_fragment("<p>abc</p>").unwrap();
        let text = first_text(&tree);
        assert_eq!(isolate_chars(&mut tree, text, 0..3), text);
        assert_eq!(render(&tree), "<p>abc</p>");
    }

    #[test]
    fn split_around_keeps_other_classes_on_each_side() {
        let mut tree = parse_fragment(r#"<p><span class="a">x<b>y</b>z</span></p>"#).unwrap();
        let p = tree.children(tree.root())[0];
        let span = tree.children(p)[0];
        let b = tree.children(span)[1];
        split_around(&mut tree, span, b);
        assert_eq!(
            render(&tree),
            r#"<p><span class="a">x</span><span class="a"><b>y</b></span><span class="a">z</span></p>"#
        );
        tree.check_links().unwrap();
    }

    #[test]
    fn isolate_within_splits_every_level() {
        let mut tree =
            parse_fragment(r#"<span class="u">a<span class="b">bc</span>d</span>"#).unwrap();
        let outer = tree.children(tree.root())[0];
        let inner = tree.children(outer)[1];
        let text = tree.children(inner)[0];
        let c = isolate_chars(&mut tree, text, 1..2);
        isolate_within(&mut tree, c, outer);
        assert_eq!(
            render(&tree),
            concat!(
                r#"<span class="u">a<span class="b">b</span></span>"#,
                r#"<span class="u"><span class="b">c</span></span>"#,
                r#"<span class="u">d</span>"#,
            )
        );
    }

    #[test]
    fn strip_label_unwraps_bare_wrapper() {
        let mut tree = parse_fragment(r#"<p><span class="u">x</span></p>"#).unwrap();
        let p = tree.children(tree.root())[0];
        let span = tree.children(p)[0];
        strip_label(&mut tree, span, "u");
        assert_eq!(render(&tree), "<p>x</p>");
    }

    #[test]
    fn strip_label_keeps_wrapper_with_other_classes() {
        let mut tree = parse_fragment(r#"<span class="u b">x</span>"#).unwrap();
        let span = tree.children(tree.root())[0];
        strip_label(&mut tree, span, "u");
        assert_eq!(render(&tree), r#"<span class="b">x</span>"#);
    }

    #[test]
    fn wrap_inserts_at_node_position() {
        let mut tree = parse_fragment("<p>a<i>b</i>c</p>").unwrap();
        let p = tree.children(tree.root())[0];
        let i = tree.children(p)[1];
        wrap(
            &mut tree,
            i,
            Element::new("span").with_classes(ClassList::parse("u")),
        );
        assert_eq!(render(&tree), r#"<p>a<span class="u"><i>b</i></span>c</p>"#);
    }

    #[test]
    fn wrapper_and_leaf_classification() {
        let options = AnnotationOptions::default();
        let tree = parse_fragment(r#"<span>t</span><img src="x"><span class="ql-formula">f</span>"#)
            .unwrap();
        let [span, img, formula] = tree.children(tree.root()) else {
            panic!("expected three top-level nodes");
        };
        assert!(is_wrapper(&tree, *span, &options));
        assert!(!is_wrapper(&tree, *formula, &options));
        assert!(is_leaf(&tree, *img, &options));
        assert!(is_leaf(&tree, *formula, &options));
        assert!(!is_wrapper(&tree, tree.root(), &options));
    }

    #[test]
    fn layout_whitespace_needs_a_line_break() {
        assert!(is_layout_whitespace("\n  "));
        assert!(!is_layout_whitespace(" "));
        assert!(!is_layout_whitespace("a\n"));
    }
}
