use super::corridor::{Selection, collect_with_layout, selection};
use super::fragment::{
    content_preorder, is_wrapper, isolate_chars, isolate_within, nearest_wrapper_with,
    strip_label,
};
use super::locate::Corridor;
use crate::error::AnnotateError;
use crate::model::{AnnotationOptions, NodeId, Tree};

/// Remove `label` from every leaf in the located corridor.
///
/// Text leaves, atomic leaves and layout whitespace between the marks are
/// handled the same way: the covered part is isolated, every element between
/// it and the labelled wrapper is split around it and only the isolated wrapper
/// fragment loses the label. Fragments outside
/// the corridor keep it. Positions without the label are left untouched, so
/// removing twice is the same as removing once. Returns the number of leaves
/// that changed.
pub fn remove_status(
    tree: &mut Tree,
    corridor: &Corridor,
    label: &str,
    options: &AnnotationOptions,
) -> Result<usize, AnnotateError> {
    let mut changed = 0;
    for leaf in collect_with_layout(tree, options)? {
        let Some(selected) = selection(tree, &leaf, corridor) else {
            continue;
        };
        if nearest_wrapper_with(tree, leaf.node, label, options).is_none() {
            continue;
        }

        let target = match selected {
            Selection::Chars(range) => isolate_chars(tree, leaf.node, range),
            Selection::Whole => leaf.node,
        };
        unlabel(tree, target, label, options);
        changed += 1;
    }
    log::debug!("removed {label} from {changed} leaves");
    Ok(changed)
}

/// Strip `label` from every wrapper around `target`, splitting each one so the
/// rest of its content keeps the label.
fn unlabel(tree: &mut Tree, target: NodeId, label: &str, options: &AnnotationOptions) {
    while let Some(wrapper) = nearest_wrapper_with(tree, target, label, options) {
        isolate_within(tree, target, wrapper);
        strip_label(tree, wrapper, label);
    }
}

/// Remove `label` from every wrapper in the fragment, whatever the selection.
/// Returns the number of wrappers touched.
pub fn strip_everywhere(tree: &mut Tree, label: &str, options: &AnnotationOptions) -> usize {
    let wrappers: Vec<NodeId> = content_preorder(tree, options)
        .into_iter()
        .filter(|&id| {
            is_wrapper(tree, id, options)
                && tree.element(id).is_some_and(|el| el.classes.contains(label))
        })
        .collect();
    for &wrapper in &wrappers {
        strip_label(tree, wrapper, label);
    }
    log::debug!("stripped {label} from {} wrappers", wrappers.len());
    wrappers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::locate::{HostPoint, HostRange, locate};
    use crate::markup::{parse_fragment, render};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn remove(markup: &str, chars: std::ops::Range<usize>, label: &str) -> String {
        let options = AnnotationOptions::default();
        let mut tree = parse_fragment(markup).unwrap();
        let range = HostRange::from_char_range(&tree, chars, &options).unwrap();
        let corridor = locate(&mut tree, &range, &options).unwrap();
        remove_status(&mut tree, &corridor, label, &options).unwrap();
        tree.check_links().unwrap();
        render(&tree)
    }

    #[rstest]
    #[case::whole(
        r#"<p><span class="u">Hello</span> world</p>"#,
        0..5,
        "<p>Hello world</p>"
    )]
    #[case::middle(
        r#"<p><span class="u">Hello</span></p>"#,
        1..4,
        r#"<p><span class="u">H</span>ell<span class="u">o</span></p>"#
    )]
    #[case::keeps_other_classes(
        r#"<p><span class="u b">Hello</span></p>"#,
        0..5,
        r#"<p><span class="b">Hello</span></p>"#
    )]
    #[case::through_inner_element(
        r#"<p><span class="u">a<b>bc</b>d</span></p>"#,
        1..2,
        r#"<p><span class="u">a</span><b>b</b><span class="u"><b>c</b>d</span></p>"#
    )]
    #[case::layout_whitespace_inside_wrapper(
        "<p><span class=\"u\"><b>x</b>\n<b>y</b></span></p>",
        0..3,
        "<p><b>x</b>\n<b>y</b></p>"
    )]
    #[case::nested_duplicates(
        r#"<p><span class="u">a<span class="u">b</span></span></p>"#,
        1..2,
        r#"<p><span class="u">a</span>b</p>"#
    )]
    fn removes_label(#[case] markup: &str, #[case] chars: std::ops::Range<usize>, #[case] expected: &str) {
        assert_eq!(remove(markup, chars, "u"), expected);
    }

    #[test]
    fn never_applied_label_is_a_no_op() {
        let markup = r#"<p><span class="b">Hello</span> world</p>"#;
        assert_eq!(remove(markup, 0..8, "u"), markup);
    }

    #[test]
    fn atomic_leaf_is_extracted_from_wrapper() {
        let options = AnnotationOptions::default();
        let mut tree = parse_fragment(r#"<p><span class="u">a<img src="x">b</span></p>"#).unwrap();
        let range = HostRange::new(
            HostPoint::new("0/0".parse().unwrap(), 1),
            HostPoint::new("0/0".parse().unwrap(), 2),
        );
        let corridor = locate(&mut tree, &range, &options).unwrap();
        remove_status(&mut tree, &corridor, "u", &options).unwrap();
        assert_eq!(
            render(&tree),
            r#"<p><span class="u">a</span><img src="x"><span class="u">b</span></p>"#
        );
    }

    #[test]
    fn strip_everywhere_ignores_selection() {
        let options = AnnotationOptions::default();
        let mut tree = parse_fragment(
            r#"<p><span class="c">a</span>b<span class="c u">c</span></p><span class="c">d</span>"#,
        )
        .unwrap();
        assert_eq!(strip_everywhere(&mut tree, "c", &options), 3);
        assert_eq!(render(&tree), r#"<p>ab<span class="u">c</span></p>d"#);
    }
}
