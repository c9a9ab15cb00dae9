//! Properties every annotation cycle must hold, checked over a small corpus of
//! fragments and selections.

use std::ops::Range;

use range_marker_engine::annotate::fragment::is_wrapper;
use range_marker_engine::{
    Action, Annotator, HostRange, Outcome, StatusClass, Tree, parse_fragment,
};
use rstest::rstest;

const FORMULA: &str = r#"<span class="ql-formula">E=mc<sup>2</sup></span>"#;

fn run(annotator: &Annotator, markup: &str, chars: Range<usize>, action: &Action) -> String {
    let tree = parse_fragment(markup).unwrap();
    let range = HostRange::from_char_range(&tree, chars, annotator.options()).unwrap();
    match annotator.run(markup, &range, action).unwrap() {
        Outcome::Updated(updated) => updated,
        Outcome::Unchanged => markup.to_string(),
    }
}

fn query(annotator: &Annotator, markup: &str, chars: Range<usize>, label: &str) -> bool {
    let mut tree = parse_fragment(markup).unwrap();
    let range = HostRange::from_char_range(&tree, chars, annotator.options()).unwrap();
    let corridor = annotator.locate(&mut tree, &range).unwrap();
    annotator
        .has_status(&tree, &corridor, &StatusClass::new(label))
        .unwrap()
}

/// Parses `markup` and checks structural invariants of the result.
fn check_tree(annotator: &Annotator, markup: &str) -> Tree {
    let tree = parse_fragment(markup).unwrap();
    tree.check_links().unwrap();
    for id in tree.preorder(tree.root()) {
        for pair in tree.children(id).windows(2) {
            let [left, right] = [pair[0], pair[1]];
            if !is_wrapper(&tree, left, annotator.options())
                || !is_wrapper(&tree, right, annotator.options())
            {
                continue;
            }
            let (Some(a), Some(b)) = (tree.element(left), tree.element(right)) else {
                continue;
            };
            assert!(
                a.classes.is_empty() || !a.classes.same_set(&b.classes),
                "adjacent wrappers share classes {} in {markup}",
                a.classes
            );
        }
    }
    tree
}

fn text_of(markup: &str) -> String {
    let tree = parse_fragment(markup).unwrap();
    tree.text_content(tree.root())
}

#[rstest]
#[case("<p>Hello world</p>", 0..5)]
#[case("<p>Hello world</p>", 3..11)]
#[case("<p>one <b>two</b> three</p><p>four <i>five</i></p>", 2..9)]
#[case("<p>one <b>two</b> three</p><p>four <i>five</i></p>", 0..22)]
#[case("<p>one <b>two</b> three</p><p>four <i>five</i></p>", 8..20)]
#[case(r#"<p>x <span class="ql-formula">E=mc<sup>2</sup></span> y <img src="a.png"> z</p>"#, 1..4)]
#[case(r#"<p>x <span class="ql-formula">E=mc<sup>2</sup></span> y <img src="a.png"> z</p>"#, 0..7)]
#[case(r#"<p><span class="rtm-underline">already</span> under <span class="rtm-mark-1">lined</span></p>"#, 3..16)]
#[case(r#"<p><span class="rtm-underline">already</span> under <span class="rtm-mark-1">lined</span></p>"#, 0..19)]
#[case("<ul>\n<li>alpha</li>\n<li>beta &amp; gamma</li>\n</ul>", 1..10)]
#[case("<ul>\n<li>alpha</li>\n<li>beta &amp; gamma</li>\n</ul>", 3..19)]
fn cycle_properties(
    #[case] markup: &str,
    #[case] chars: Range<usize>,
    #[values("rtm-underline", "rtm-mark-1")] label: &str,
) {
    let annotator = Annotator::default();
    let original_text = text_of(markup);

    // Round trip: applied label is found again after render and re-parse.
    let applied = run(&annotator, markup, chars.clone(), &Action::apply(label));
    check_tree(&annotator, &applied);
    assert!(query(&annotator, &applied, chars.clone(), label));
    assert_eq!(text_of(&applied), original_text);

    // Inverse: removing over the same corridor restores the text and clears the label.
    let removed = run(&annotator, &applied, chars.clone(), &Action::remove(label));
    check_tree(&annotator, &removed);
    assert!(!query(&annotator, &removed, chars.clone(), label));
    assert_eq!(text_of(&removed), original_text);

    // Idempotent removal.
    let removed_again = run(&annotator, &removed, chars.clone(), &Action::remove(label));
    assert_eq!(removed_again, removed);

    // Applying twice changes nothing the second time.
    let applied_again = run(&annotator, &applied, chars, &Action::apply(label));
    assert_eq!(applied_again, applied);

    // Atomic content is never split or rewritten.
    if markup.contains(FORMULA) {
        assert!(applied.contains(FORMULA));
        assert!(removed.contains(FORMULA));
    }
}

#[rstest]
#[case("<p>Hello world</p>", 0..5)]
#[case("<p>one <b>two</b> three</p><p>four <i>five</i></p>", 2..20)]
#[case(r#"<p><span class="rtm-underline">already</span> under</p>"#, 0..13)]
fn overlapping_labels_are_independent(#[case] markup: &str, #[case] chars: Range<usize>) {
    let annotator = Annotator::default();
    let inner = chars.start + 1..chars.end - 1;

    let both = run(&annotator, markup, chars.clone(), &Action::apply("rtm-mark-1"));
    let both = run(&annotator, &both, inner.clone(), &Action::apply("rtm-underline"));
    check_tree(&annotator, &both);

    let comment_only = run(&annotator, &both, inner.clone(), &Action::remove("rtm-underline"));
    check_tree(&annotator, &comment_only);
    assert!(query(&annotator, &comment_only, chars.clone(), "rtm-mark-1"));
    assert!(!query(&annotator, &comment_only, inner, "rtm-underline"));

    let tree = parse_fragment(&comment_only).unwrap();
    let covered = annotator.covered_text(&tree, &StatusClass::new("rtm-mark-1"));
    let text: String = text_of(markup).chars().skip(chars.start).take(chars.len()).collect();
    assert_eq!(covered, text);
}
