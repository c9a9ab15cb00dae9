use std::sync::OnceLock;

use regex::Regex;

use super::lexer::{TokenKind, lex};
use super::{MarkupError, is_void_element};
use crate::model::{ClassList, Element, NodeId, NodeKind, Tree};

fn tag_name_regex() -> &'static Regex {
    static TAG_NAME: OnceLock<Regex> = OnceLock::new();
    TAG_NAME.get_or_init(|| {
        Regex::new(r"^</?([A-Za-z][A-Za-z0-9:_-]*)").expect("Invalid tag name regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Invalid attribute regex")
    })
}

/// Parse a markup fragment into a fresh [`Tree`].
///
/// Entities in text and attribute values are decoded, so text nodes hold the
/// logical (unescaped) content. End tags must close the innermost open element;
/// void elements and `/>` tags never take children.
pub fn parse_fragment(input: &str) -> Result<Tree, MarkupError> {
    let mut tree = Tree::new();
    // (element, tag, byte offset of its start tag)
    let mut open: Vec<(NodeId, String, usize)> = Vec::new();

    for token in lex(input) {
        let parent = open.last().map(|(id, _, _)| *id).unwrap_or(tree.root());
        match token.kind {
            TokenKind::Text => {
                let decoded = html_escape::decode_html_entities(token.text);
                push_text(&mut tree, parent, &decoded);
            }
            TokenKind::Comment => {
                let body = &token.text[4..token.text.len() - 3];
                let comment = tree.create(NodeKind::Comment(body.to_string()));
                tree.append(parent, comment);
            }
            TokenKind::Declaration => {
                log::debug!("skipping declaration {:?}", token.text);
            }
            TokenKind::StartTag => {
                let (element, self_closing) = parse_start_tag(token.text, token.span.start)?;
                let tag = element.tag.clone();
                let id = tree.create_element(element);
                tree.append(parent, id);
                if !self_closing && !is_void_element(&tag) {
                    open.push((id, tag, token.span.start));
                }
            }
            TokenKind::EndTag => {
                let name = tag_name(token.text, token.span.start)?;
                match open.last() {
                    Some((_, tag, _)) if *tag == name => {
                        open.pop();
                    }
                    _ if is_void_element(&name) => {
                        log::debug!("ignoring end tag for void element </{name}>");
                    }
                    Some((_, tag, _)) => {
                        return Err(MarkupError::MismatchedEndTag {
                            expected: tag.clone(),
                            found: name,
                            offset: token.span.start,
                        });
                    }
                    None => {
                        return Err(MarkupError::UnexpectedEndTag {
                            tag: name,
                            offset: token.span.start,
                        });
                    }
                }
            }
        }
    }

    if let Some((_, tag, offset)) = open.pop() {
        return Err(MarkupError::UnclosedElement { tag, offset });
    }

    Ok(tree)
}

/// Append text to `parent`, extending a trailing text node instead of adding a sibling.
fn push_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(&last) = tree.children(parent).last()
        && let NodeKind::Text { content, .. } = tree.kind_mut(last)
    {
        content.push_str(text);
        return;
    }
    let node = tree.create_text(text);
    tree.append(parent, node);
}

fn tag_name(raw: &str, offset: usize) -> Result<String, MarkupError> {
    tag_name_regex()
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
        .ok_or_else(|| MarkupError::MalformedTag {
            text: raw.to_string(),
            offset,
        })
}

fn parse_start_tag(raw: &str, offset: usize) -> Result<(Element, bool), MarkupError> {
    let name_end = tag_name_regex()
        .find(raw)
        .map(|m| m.end())
        .ok_or_else(|| MarkupError::MalformedTag {
            text: raw.to_string(),
            offset,
        })?;
    let mut element = Element::new(tag_name(raw, offset)?);

    let mut body = raw[name_end..raw.len() - 1].trim_end();
    let self_closing = body.ends_with('/');
    if self_closing {
        body = &body[..body.len() - 1];
    }

    for caps in attribute_regex().captures_iter(body) {
        let Some(key) = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()) else {
            continue;
        };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
            .unwrap_or_default();
        if key == "class" {
            element.classes = ClassList::parse(&value);
        } else {
            element.attributes.entry(key).or_insert(value);
        }
    }

    Ok((element, self_closing))
}
