//! Markup boundary: turn a fragment string into a [`Tree`](crate::model::Tree)
//! and render a tree back to markup.
//!
//! `render(parse_fragment(m))` reproduces `m` up to attribute order, quoting and
//! entity spelling.

pub mod lexer;
pub mod parser;
pub mod render;

pub use parser::parse_fragment;
pub use render::{render, write_markup};

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("end tag </{found}> at byte {offset} does not close <{expected}>")]
    MismatchedEndTag {
        expected: String,
        found: String,
        offset: usize,
    },
    #[error("end tag </{tag}> at byte {offset} has no open element")]
    UnexpectedEndTag { tag: String, offset: usize },
    #[error("<{tag}> opened at byte {offset} is never closed")]
    UnclosedElement { tag: String, offset: usize },
    #[error("malformed tag {text:?} at byte {offset}")]
    MalformedTag { text: String, offset: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("failed to write markup: {0}")]
    Io(#[from] std::io::Error),
}
