use std::io;

use super::{SerializeError, is_void_element};
use crate::model::{NodeId, NodeKind, Tree};

/// Render the fragment's children to markup.
///
/// Text the normalizer already escaped is written verbatim; any other text is
/// escaped here, so every text node is escaped exactly once.
pub fn render(tree: &Tree) -> String {
    let mut out = String::new();
    for &child in tree.children(tree.root()) {
        render_node(tree, child, &mut out);
    }
    out
}

/// Render into an [`io::Write`] sink.
pub fn write_markup<W: io::Write>(tree: &Tree, mut sink: W) -> Result<(), SerializeError> {
    sink.write_all(render(tree).as_bytes())?;
    sink.flush()?;
    Ok(())
}

fn render_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Fragment => {
            for &child in tree.children(id) {
                render_node(tree, child, out);
            }
        }
        NodeKind::Text { content, escaped } => {
            if *escaped {
                out.push_str(content);
            } else {
                out.push_str(&html_escape::encode_text(content));
            }
        }
        NodeKind::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            if !el.classes.is_empty() {
                push_attribute(out, "class", &el.classes.to_string());
            }
            for (key, value) in &el.attributes {
                push_attribute(out, key, value);
            }
            out.push('>');
            let children = tree.children(id);
            if children.is_empty() && is_void_element(&el.tag) {
                return;
            }
            for &child in children {
                render_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_fragment;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<p>Hello <b>world</b></p>")]
    #[case(r#"<p><span class="a b">x</span><img src="i.png">y</p>"#)]
    #[case("<div><!-- keep --><br>tail</div>")]
    #[case("a &lt; b &amp; c")]
    fn render_round_trips(#[case] markup: &str) {
        let tree = parse_fragment(markup).unwrap();
        assert_eq!(render(&tree), markup);
    }

    #[test]
    fn class_renders_before_other_attributes() {
        let tree = parse_fragment(r#"<span title="t" class="u">x</span>"#).unwrap();
        assert_eq!(render(&tree), r#"<span class="u" title="t">x</span>"#);
    }

    #[test]
    fn escaped_text_is_not_escaped_twice() {
        let mut tree = Tree::new();
        let text = tree.create(NodeKind::Text {
            content: "&lt;".to_string(),
            escaped: true,
        });
        tree.append(tree.root(), text);
        assert_eq!(render(&tree), "&lt;");
    }

    #[test]
    fn write_markup_fills_sink() {
        let tree = parse_fragment("<p>x</p>").unwrap();
        let mut sink = Vec::new();
        write_markup(&tree, &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), "<p>x</p>");
    }
}
